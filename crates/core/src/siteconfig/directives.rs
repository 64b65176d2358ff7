use crate::error::{Result, StrataError};
use regex::Regex;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};

/// Key of the selectors set used when nothing more specific applies.
pub const DEFAULT_KEY: &str = "default";

/// Characters stripped from both ends of extracted text unless overridden.
pub const DEFAULT_STRIP_CHARS: &str = " .,;:§¶";

/// Language of a level's selector expression
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectorKind {
    #[default]
    Css,
    XPath,
}

/// Extraction rules for one level of a selectors set
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    /// Selector expression; empty disables the level
    pub selector: String,
    /// How `selector` is evaluated
    #[serde(rename = "type")]
    pub kind: SelectorKind,
    /// Overrides the site-wide strip characters
    pub strip_chars: Option<String>,
    /// Class-name substrings whose elements are skipped with their subtree
    pub classname_exclude: Option<Vec<String>>,
    /// Tags whose markup is kept, mapped to the attributes kept on them
    pub keep_tags: Option<HashMap<String, Vec<String>>>,
    /// Read text from the `content` attribute instead of the element text
    pub meta_tag: bool,
    /// Value used when the selector yields nothing
    pub default_value: Option<String>,
    /// Value applies to every record of the page
    pub global: bool,
}

impl LevelConfig {
    /// Create a CSS level
    pub fn new(selector: impl Into<String>) -> Self {
        Self { selector: selector.into(), ..Default::default() }
    }

    /// Create a path-query level
    pub fn xpath(selector: impl Into<String>) -> Self {
        Self { selector: selector.into(), kind: SelectorKind::XPath, ..Default::default() }
    }

    pub fn strip_chars(mut self, chars: impl Into<String>) -> Self {
        self.strip_chars = Some(chars.into());
        self
    }

    pub fn exclude_classes<I, S>(mut self, classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.classname_exclude = Some(classes.into_iter().map(Into::into).collect());
        self
    }

    /// Keep `tag` markup with only `attrs` on it. An empty list keeps the bare tag.
    pub fn keep_tag<I, S>(mut self, tag: impl Into<String>, attrs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keep_tags
            .get_or_insert_with(HashMap::new)
            .insert(tag.into(), attrs.into_iter().map(Into::into).collect());
        self
    }

    pub fn meta_tag(mut self) -> Self {
        self.meta_tag = true;
        self
    }

    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn global(mut self) -> Self {
        self.global = true;
        self
    }

    /// Check if this level has a selector to evaluate
    pub fn is_enabled(&self) -> bool {
        !self.selector.trim().is_empty()
    }
}

/// All level configs of one site section, keyed by level name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectorSet {
    levels: BTreeMap<String, LevelConfig>,
}

impl SelectorSet {
    pub const fn new() -> Self {
        Self { levels: BTreeMap::new() }
    }

    /// Add or replace a level
    pub fn level(mut self, name: impl Into<String>, config: LevelConfig) -> Self {
        self.insert(name, config);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, config: LevelConfig) {
        self.levels.insert(name.into(), config);
    }

    pub fn get(&self, level: &str) -> Option<&LevelConfig> {
        self.levels.get(level)
    }

    /// Levels in name order
    pub fn levels(&self) -> impl Iterator<Item = (&str, &LevelConfig)> {
        self.levels.iter().map(|(name, config)| (name.as_str(), config))
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Class-name substrings excluded at `level`, if any
    pub fn classnames_to_skip(&self, level: &str) -> Option<&[String]> {
        self.get(level)?.classname_exclude.as_deref()
    }

    /// Attributes kept on `tag` markup at `level`, or `None` when the markup is dropped
    pub fn allowed_attrs(&self, level: &str, tag: &str) -> Option<&[String]> {
        self.get(level)?.keep_tags.as_ref()?.get(tag).map(Vec::as_slice)
    }

    /// Whether `level` reads the `content` attribute instead of text
    pub fn uses_meta_content(&self, level: &str) -> bool {
        self.get(level).is_some_and(|config| config.meta_tag)
    }

    /// Strip characters configured on `level` itself
    pub fn level_strip_chars(&self, level: &str) -> Option<&str> {
        self.get(level)?.strip_chars.as_deref()
    }
}

impl<K: Into<String>> FromIterator<(K, LevelConfig)> for SelectorSet {
    fn from_iter<T: IntoIterator<Item = (K, LevelConfig)>>(iter: T) -> Self {
        Self { levels: iter.into_iter().map(|(k, v)| (k.into(), v)).collect() }
    }
}

/// A start URL pattern mapped to a selectors set
#[derive(Debug, Clone)]
pub struct StartUrlRule {
    pattern: Regex,
    selectors_key: String,
}

impl StartUrlRule {
    /// Compile a rule
    ///
    /// # Errors
    ///
    /// Returns [`StrataError::InvalidUrlPattern`] if `pattern` is not a valid regex.
    pub fn new(pattern: &str, selectors_key: impl Into<String>) -> Result<Self> {
        let pattern = Regex::new(pattern)
            .map_err(|source| StrataError::InvalidUrlPattern { pattern: pattern.to_string(), source })?;
        Ok(Self { pattern, selectors_key: selectors_key.into() })
    }

    /// Unanchored search of the pattern in `url`
    pub fn matches(&self, url: &str) -> bool {
        self.pattern.is_match(url)
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn selectors_key(&self) -> &str {
        &self.selectors_key
    }
}

/// Site configuration shared read-only by every extraction of a crawl
///
/// Built with [`SiteConfig::builder`] or loaded from JSON with
/// [`crate::siteconfig::ConfigParser`]. A `"default"` selectors set always exists.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub(crate) strip_chars: Option<String>,
    pub(crate) keep_tags: Vec<String>,
    pub(crate) start_urls: Vec<StartUrlRule>,
    pub(crate) selectors: HashMap<String, SelectorSet>,
    pub(crate) selectors_exclude: Vec<String>,
    pub(crate) min_indexed_level: HashMap<String, u32>,
}

impl SiteConfig {
    pub fn builder() -> SiteConfigBuilder {
        SiteConfigBuilder::new()
    }

    /// Site-wide strip characters
    pub fn strip_chars(&self) -> Option<&str> {
        self.strip_chars.as_deref()
    }

    /// Tags whose escaped opening/closing literals are restored after assembly
    pub fn keep_tags(&self) -> &[String] {
        &self.keep_tags
    }

    pub fn start_urls(&self) -> &[StartUrlRule] {
        &self.start_urls
    }

    /// CSS selectors removed from every page before extraction
    pub fn selectors_exclude(&self) -> &[String] {
        &self.selectors_exclude
    }

    /// Selectors set registered under `key`, without fallback
    pub fn selector_set(&self, key: &str) -> Option<&SelectorSet> {
        self.selectors.get(key)
    }

    /// Registered selectors keys
    pub fn selector_keys(&self) -> impl Iterator<Item = &str> {
        self.selectors.keys().map(String::as_str)
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            strip_chars: Some(DEFAULT_STRIP_CHARS.to_string()),
            keep_tags: Vec::new(),
            start_urls: Vec::new(),
            selectors: HashMap::from([(DEFAULT_KEY.to_string(), SelectorSet::new())]),
            selectors_exclude: Vec::new(),
            min_indexed_level: HashMap::new(),
        }
    }
}

/// Builder for SiteConfig
#[derive(Debug, Default)]
pub struct SiteConfigBuilder {
    strip_chars: Option<Option<String>>,
    keep_tags: Vec<String>,
    start_urls: Vec<(String, String)>,
    selectors: HashMap<String, SelectorSet>,
    selectors_exclude: Vec<String>,
    min_indexed_level: HashMap<String, u32>,
}

impl SiteConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Site-wide strip characters; `None` strips whitespace only
    pub fn strip_chars(mut self, chars: Option<&str>) -> Self {
        self.strip_chars = Some(chars.map(str::to_string));
        self
    }

    pub fn keep_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keep_tags.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Append a start URL rule; rules are matched in the order added
    pub fn start_url(mut self, pattern: impl Into<String>, selectors_key: impl Into<String>) -> Self {
        self.start_urls.push((pattern.into(), selectors_key.into()));
        self
    }

    pub fn selectors(mut self, key: impl Into<String>, set: SelectorSet) -> Self {
        self.selectors.insert(key.into(), set);
        self
    }

    pub fn selectors_exclude<I, S>(mut self, selectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selectors_exclude.extend(selectors.into_iter().map(Into::into));
        self
    }

    pub fn min_indexed_level(mut self, key: impl Into<String>, level: u32) -> Self {
        self.min_indexed_level.insert(key.into(), level);
        self
    }

    /// Compile start URL patterns and build the config
    ///
    /// # Errors
    ///
    /// Returns [`StrataError::InvalidUrlPattern`] for the first pattern that fails to compile.
    pub fn build(self) -> Result<SiteConfig> {
        let start_urls = self
            .start_urls
            .iter()
            .map(|(pattern, key)| StartUrlRule::new(pattern, key.as_str()))
            .collect::<Result<Vec<_>>>()?;

        let mut selectors = self.selectors;
        selectors.entry(DEFAULT_KEY.to_string()).or_default();

        Ok(SiteConfig {
            strip_chars: self.strip_chars.unwrap_or_else(|| Some(DEFAULT_STRIP_CHARS.to_string())),
            keep_tags: self.keep_tags,
            start_urls,
            selectors,
            selectors_exclude: self.selectors_exclude,
            min_indexed_level: self.min_indexed_level,
        })
    }
}
