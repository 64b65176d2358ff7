use crate::siteconfig::directives::{DEFAULT_KEY, SelectorSet, SiteConfig};

/// Returned only if a config somehow lacks its `"default"` set
static EMPTY_SET: SelectorSet = SelectorSet::new();

impl SiteConfig {
    /// Selectors key of the first start URL rule matching `url`
    ///
    /// Rules are tried in declared order. Falls back to `"default"` when
    /// `url` is `None` or nothing matches.
    pub fn resolve_selectors_key(&self, url: Option<&str>) -> &str {
        let Some(url) = url else {
            return DEFAULT_KEY;
        };

        self.start_urls
            .iter()
            .find(|rule| rule.matches(url))
            .map_or(DEFAULT_KEY, |rule| rule.selectors_key())
    }

    /// Selectors set for `url`, or the `"default"` set when its key is unknown
    pub fn resolve_selector_set(&self, url: Option<&str>) -> &SelectorSet {
        let key = self.resolve_selectors_key(url);

        self.selectors
            .get(key)
            .or_else(|| self.selectors.get(DEFAULT_KEY))
            .unwrap_or(&EMPTY_SET)
    }

    /// Minimum heading depth a page at `url` must reach to be indexable
    pub fn resolve_min_indexed_level(&self, url: Option<&str>) -> u32 {
        let key = self.resolve_selectors_key(url);

        self.min_indexed_level
            .get(key)
            .or_else(|| self.min_indexed_level.get(DEFAULT_KEY))
            .copied()
            .unwrap_or(0)
    }

    /// Strip characters for `level`: the level override, else the site default
    pub fn resolve_strip_chars<'a>(&'a self, level: &str, selectors: &'a SelectorSet) -> Option<&'a str> {
        selectors.level_strip_chars(level).or(self.strip_chars.as_deref())
    }
}
