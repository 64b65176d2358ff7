//! Main extraction API.
//!
//! [`Extractor`] ties configuration resolution, document loading, exclusion,
//! the extraction walker and text assembly together for one site
//! configuration. It holds that configuration read-only, so one instance (or
//! clones sharing the same `Arc`) can serve any number of threads.
//!
//! # Example
//!
//! ```rust
//! use strata_core::{Extractor, LevelConfig, SelectorSet, SiteConfig};
//!
//! let config = SiteConfig::builder()
//!     .selectors(
//!         "default",
//!         SelectorSet::new()
//!             .level("lvl0", LevelConfig::new("h1"))
//!             .level("text", LevelConfig::new("article p")),
//!     )
//!     .selectors_exclude([".sidebar"])
//!     .build()
//!     .unwrap();
//!
//! let html = b"<h1>Guide</h1><article><p>First.</p><p class=\"sidebar\">Ad</p></article>";
//! let page = Extractor::new(config).extract_page(html, Some("utf-8"), None).unwrap();
//!
//! assert_eq!(page.value("lvl0").unwrap().to_string(), "Guide");
//! assert_eq!(page.value("text").unwrap().to_string(), "First");
//! ```

use crate::Result;
use crate::dom_tree::TreeNode;
use crate::encoding::{self, Body};
use crate::extract::{Fragments, itertext};
use crate::parse::{Document, Matched, Selection};
use crate::postprocess::Assembler;
use crate::record::{Extracted, LevelRecord, PageRecord};
use crate::scoring::level_weight;
use crate::siteconfig::{SelectorSet, SiteConfig};
use std::sync::Arc;

/// Extraction engine bound to one site configuration.
#[derive(Debug, Clone, Default)]
pub struct Extractor {
    config: Arc<SiteConfig>,
}

impl Extractor {
    pub fn new(config: SiteConfig) -> Self {
        Self { config: Arc::new(config) }
    }

    /// Creates an extractor sharing an already loaded configuration.
    pub fn with_shared(config: Arc<SiteConfig>) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn resolve_selectors_key(&self, url: Option<&str>) -> &str {
        self.config.resolve_selectors_key(url)
    }

    pub fn resolve_selector_set(&self, url: Option<&str>) -> &SelectorSet {
        self.config.resolve_selector_set(url)
    }

    pub fn resolve_min_indexed_level(&self, url: Option<&str>) -> u32 {
        self.config.resolve_min_indexed_level(url)
    }

    /// Decodes a body with its declared encoding, keeping the raw bytes when that fails.
    pub fn load(&self, raw: &[u8], declared_encoding: Option<&str>) -> Body {
        encoding::load(raw, declared_encoding)
    }

    /// Decodes and parses a body, retrying from the raw bytes on failure.
    ///
    /// # Errors
    ///
    /// Returns [`crate::StrataError::UnparseableDocument`] when the fallback
    /// parse fails too.
    pub fn parse(&self, raw: &[u8], declared_encoding: Option<&str>) -> Result<Document> {
        Document::from_response(raw, declared_encoding)
    }

    /// Removes the configured `selectors_exclude` subtrees from `doc`.
    pub fn remove_excluded(&self, doc: &mut Document) -> Result<usize> {
        doc.remove_excluded(self.config.selectors_exclude())
    }

    /// Lazily walks `node` for `level`.
    pub fn itertext<'a, 's>(&self, node: TreeNode<'a>, level: &'s str, selectors: &'s SelectorSet) -> Fragments<'a, 's> {
        itertext(node, level, selectors)
    }

    pub fn get_text(
        &self, value: &Matched<'_>, strip_chars: Option<&str>, level: &str, selectors: &SelectorSet,
    ) -> Option<String> {
        self.assembler().get_text(value, strip_chars, level, selectors)
    }

    pub fn get_text_from_nodes(
        &self, selection: &Selection<'_>, strip_chars: Option<&str>, level: &str, selectors: &SelectorSet,
    ) -> Option<Extracted> {
        self.assembler().get_text_from_nodes(selection, strip_chars, level, selectors)
    }

    /// Restores the escaped literals of the configured keep tags.
    pub fn unescape(&self, text: &str) -> String {
        self.assembler().unescape(text)
    }

    /// Extracts the value of one level from an already cleaned document.
    ///
    /// A level that is missing or has an empty selector yields its
    /// `default_value`, as does a selector producing nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the level's selector cannot be compiled.
    pub fn extract_level(&self, doc: &Document, level: &str, selectors: &SelectorSet) -> Result<Option<Extracted>> {
        let Some(config) = selectors.get(level) else {
            return Ok(None);
        };
        let fallback = || config.default_value.clone().map(Extracted::Text);

        if !config.is_enabled() {
            return Ok(fallback());
        }

        let selection = doc.evaluate(&config.selector, config.kind)?;
        let strip_chars = self.config.resolve_strip_chars(level, selectors);
        let value = self.get_text_from_nodes(&selection, strip_chars, level, selectors);

        Ok(value.or_else(fallback))
    }

    /// Runs the whole pipeline for one page.
    ///
    /// Resolves the selectors set for `url`, parses the body, removes the
    /// excluded subtrees, then extracts and weighs every level of the set.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be parsed or a configured
    /// selector is invalid.
    pub fn extract_page(&self, raw: &[u8], declared_encoding: Option<&str>, url: Option<&str>) -> Result<PageRecord> {
        let selectors_key = self.resolve_selectors_key(url);
        let selectors = self.resolve_selector_set(url);
        let min_indexed_level = self.resolve_min_indexed_level(url);
        tracing::debug!(url, selectors_key, min_indexed_level, levels = selectors.len(), "resolved selectors");

        let mut doc = self.parse(raw, declared_encoding)?;
        self.remove_excluded(&mut doc)?;

        let levels = selectors
            .levels()
            .map(|(level, config)| {
                Ok(LevelRecord {
                    level: level.to_string(),
                    weight: level_weight(level),
                    global: config.global,
                    value: self.extract_level(&doc, level, selectors)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(PageRecord {
            url: url.map(str::to_string),
            selectors_key: selectors_key.to_string(),
            min_indexed_level,
            levels,
        })
    }

    fn assembler(&self) -> Assembler<'_> {
        Assembler::new(self.config.keep_tags())
    }
}

/// Convenience function extracting a page with a one-off configuration.
pub fn extract_page(config: SiteConfig, raw: &[u8], declared_encoding: Option<&str>, url: Option<&str>) -> Result<PageRecord> {
    Extractor::new(config).extract_page(raw, declared_encoding, url)
}
