use crate::error::{Result, StrataError};
use crate::siteconfig::directives::{DEFAULT_KEY, LevelConfig, SelectorSet, SiteConfig, SiteConfigBuilder};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::io::Read;
use std::path::Path;

/// A start URL entry: a bare pattern or a pattern bound to a selectors key
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawStartUrl {
    Pattern(String),
    Rule {
        url: String,
        #[serde(default = "default_key")]
        selectors_key: String,
    },
}

/// A level given as a bare selector string or as a full object
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawLevel {
    Selector(String),
    Full(LevelConfig),
}

impl From<RawLevel> for LevelConfig {
    fn from(raw: RawLevel) -> Self {
        match raw {
            RawLevel::Selector(selector) => LevelConfig::new(selector),
            RawLevel::Full(config) => config,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawMinIndexedLevel {
    Uniform(u32),
    PerKey(HashMap<String, u32>),
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(default)]
    start_urls: Vec<RawStartUrl>,
    selectors: BTreeMap<String, Value>,
    #[serde(default)]
    selectors_exclude: Vec<String>,
    #[serde(default, deserialize_with = "explicit_null")]
    strip_chars: Option<Option<String>>,
    #[serde(default)]
    keep_tags: Vec<String>,
    #[serde(default)]
    min_indexed_level: Option<RawMinIndexedLevel>,
}

/// Keeps an explicit `null` apart from an absent key
fn explicit_null<'de, D>(deserializer: D) -> std::result::Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

fn default_key() -> String {
    DEFAULT_KEY.to_string()
}

/// JSON site configuration parser
#[derive(Debug)]
pub struct ConfigParser;

impl ConfigParser {
    /// Parse a configuration file
    pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<SiteConfig> {
        let content = std::fs::read_to_string(&path).map_err(|e| {
            StrataError::ConfigError(format!("Cannot open file {}: {}", path.as_ref().display(), e))
        })?;
        Self::parse_str(&content)
    }

    /// Parse configuration from a reader
    pub fn parse_reader<R: Read>(mut reader: R) -> Result<SiteConfig> {
        let mut content = String::new();
        reader.read_to_string(&mut content)?;
        Self::parse_str(&content)
    }

    /// Parse configuration from a JSON string
    pub fn parse_str(content: &str) -> Result<SiteConfig> {
        let raw: RawConfig = serde_json::from_str(content)?;
        build(raw)
    }
}

fn build(raw: RawConfig) -> Result<SiteConfig> {
    let mut builder = SiteConfigBuilder::new()
        .keep_tags(raw.keep_tags)
        .selectors_exclude(raw.selectors_exclude);

    if let Some(strip_chars) = raw.strip_chars {
        builder = builder.strip_chars(strip_chars.as_deref());
    }

    for start_url in raw.start_urls {
        builder = match start_url {
            RawStartUrl::Pattern(url) => builder.start_url(url, DEFAULT_KEY),
            RawStartUrl::Rule { url, selectors_key } => builder.start_url(url, selectors_key),
        };
    }

    for (key, set) in parse_selectors(raw.selectors)? {
        builder = builder.selectors(key, set);
    }

    match raw.min_indexed_level {
        Some(RawMinIndexedLevel::Uniform(level)) => builder = builder.min_indexed_level(DEFAULT_KEY, level),
        Some(RawMinIndexedLevel::PerKey(levels)) => {
            for (key, level) in levels {
                builder = builder.min_indexed_level(key, level);
            }
        }
        None => {}
    }

    builder.build()
}

/// A map holding a `"default"` object that is not itself a level is a map of sets;
/// anything else is a single set used as the default
fn is_keyed_sets(selectors: &BTreeMap<String, Value>) -> bool {
    selectors
        .get(DEFAULT_KEY)
        .and_then(Value::as_object)
        .is_some_and(|default| !default.contains_key("selector"))
}

fn parse_selectors(selectors: BTreeMap<String, Value>) -> Result<Vec<(String, SelectorSet)>> {
    if !is_keyed_sets(&selectors) {
        return Ok(vec![(DEFAULT_KEY.to_string(), parse_set(DEFAULT_KEY, selectors)?)]);
    }

    selectors
        .into_iter()
        .map(|(key, value)| {
            let levels: BTreeMap<String, Value> = serde_json::from_value(value).map_err(|e| {
                StrataError::ConfigError(format!("Selectors set '{}' must be an object: {}", key, e))
            })?;
            let set = parse_set(&key, levels)?;
            Ok((key, set))
        })
        .collect()
}

fn parse_set(key: &str, levels: BTreeMap<String, Value>) -> Result<SelectorSet> {
    levels
        .into_iter()
        .map(|(level, value)| {
            let raw: RawLevel = serde_json::from_value(value).map_err(|e| {
                StrataError::ConfigError(format!("Invalid level '{}' in selectors set '{}': {}", level, key, e))
            })?;
            Ok((level, LevelConfig::from(raw)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::siteconfig::SelectorKind;
    use crate::siteconfig::directives::DEFAULT_STRIP_CHARS;

    #[test]
    fn test_parse_single_set() {
        let config = ConfigParser::parse_str(
            r##"{
                "start_urls": ["https://example.com/"],
                "selectors": {
                    "lvl0": "h1",
                    "lvl1": {"selector": "h2", "strip_chars": "#"},
                    "text": ".content p"
                }
            }"##,
        )
        .unwrap();

        let set = config.selector_set("default").unwrap();
        assert_eq!(set.len(), 3);
        assert_eq!(set.get("lvl0").unwrap().selector, "h1");
        assert_eq!(set.get("lvl1").unwrap().strip_chars.as_deref(), Some("#"));
        assert_eq!(config.start_urls()[0].selectors_key(), "default");
        assert_eq!(config.strip_chars(), Some(DEFAULT_STRIP_CHARS));
    }

    #[test]
    fn test_parse_keyed_sets() {
        let config = ConfigParser::parse_str(
            r#"{
                "start_urls": [
                    {"url": "https://example.com/api/", "selectors_key": "api"},
                    "https://example.com/"
                ],
                "selectors": {
                    "default": {"lvl0": "h1"},
                    "api": {"lvl0": {"selector": "//h1[@class='api']", "type": "xpath"}}
                },
                "min_indexed_level": {"default": 0, "api": 1}
            }"#,
        )
        .unwrap();

        let api = config.selector_set("api").unwrap();
        assert_eq!(api.get("lvl0").unwrap().kind, SelectorKind::XPath);
        assert_eq!(config.resolve_selectors_key(Some("https://example.com/api/x")), "api");
        assert_eq!(config.resolve_min_indexed_level(Some("https://example.com/api/x")), 1);
    }

    #[test]
    fn test_parse_level_options() {
        let config = ConfigParser::parse_str(
            r#"{
                "selectors": {
                    "text": {
                        "selector": "article p",
                        "classname_exclude": ["hidden", "admonition"],
                        "keep_tags": {"em": ["class"], "code": []},
                        "default_value": "none",
                        "global": true
                    },
                    "description": {"selector": "meta[name=description]", "meta_tag": true}
                },
                "keep_tags": ["em", "code"],
                "selectors_exclude": [".sidebar"],
                "strip_chars": null,
                "min_indexed_level": 2
            }"#,
        )
        .unwrap();

        let set = config.selector_set("default").unwrap();
        let text = set.get("text").unwrap();
        assert_eq!(text.classname_exclude.as_ref().unwrap().len(), 2);
        assert_eq!(set.allowed_attrs("text", "em"), Some(&["class".to_string()][..]));
        assert_eq!(text.default_value.as_deref(), Some("none"));
        assert!(text.global);
        assert!(set.uses_meta_content("description"));
        assert_eq!(config.keep_tags(), &["em".to_string(), "code".to_string()][..]);
        assert_eq!(config.selectors_exclude(), &[".sidebar".to_string()][..]);
        assert_eq!(config.strip_chars(), None);
        assert_eq!(config.resolve_min_indexed_level(None), 2);
    }

    #[test]
    fn test_single_set_with_default_level() {
        let config = ConfigParser::parse_str(r#"{"selectors": {"default": {"selector": "h1"}}}"#).unwrap();
        let set = config.selector_set("default").unwrap();
        assert_eq!(set.get("default").unwrap().selector, "h1");
    }

    #[test]
    fn test_invalid_level_shape() {
        let result = ConfigParser::parse_str(r#"{"selectors": {"lvl0": 42}}"#);
        assert!(matches!(result, Err(StrataError::ConfigError(_))));
    }

    #[test]
    fn test_missing_selectors() {
        let result = ConfigParser::parse_str(r#"{"start_urls": []}"#);
        assert!(matches!(result, Err(StrataError::Json(_))));
    }

    #[test]
    fn test_invalid_start_url_pattern() {
        let result = ConfigParser::parse_str(r#"{"start_urls": ["(unclosed"], "selectors": {}}"#);
        assert!(matches!(result, Err(StrataError::InvalidUrlPattern { .. })));
    }

    #[test]
    fn test_parse_reader() {
        let json = r#"{"selectors": {"lvl0": "h1"}}"#;
        let config = ConfigParser::parse_reader(json.as_bytes()).unwrap();
        assert!(config.selector_set("default").unwrap().get("lvl0").is_some());
    }
}
