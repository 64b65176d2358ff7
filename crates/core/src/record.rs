//! Extraction output for one page.
//!
//! A [`PageRecord`] lists every level of the resolved selectors set with its
//! weight and extracted value, together with the resolution that selected it.

use crate::Result;
use crate::parse::Scalar;
use crate::scoring::level_depth;
use serde::Serialize;

/// Output format options for a PageRecord.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Structured JSON.
    Json,
    /// One line per level.
    PlainText,
}

/// Value extracted for one level.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Extracted {
    /// Normalized text, possibly with kept markup wrappers.
    Text(String),
    /// A value computed by a path query, passed through unchanged.
    Scalar(Scalar),
}

impl Extracted {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Scalar(_) => None,
        }
    }
}

impl std::fmt::Display for Extracted {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(text) | Self::Scalar(Scalar::String(text)) => f.write_str(text),
            Self::Scalar(Scalar::Number(n)) => write!(f, "{}", n),
            Self::Scalar(Scalar::Boolean(b)) => write!(f, "{}", b),
        }
    }
}

/// One level of a page record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelRecord {
    /// Level name from the selectors set.
    pub level: String,
    /// Ranking weight derived from the level name.
    pub weight: i64,
    /// Whether the value applies to every record of the page.
    pub global: bool,
    /// Extracted value, `None` when nothing survived trimming.
    pub value: Option<Extracted>,
}

/// The complete result of extracting one page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageRecord {
    /// Source URL if known.
    pub url: Option<String>,
    /// Key of the selectors set used.
    pub selectors_key: String,
    /// Minimum heading depth required for the page to be indexed.
    pub min_indexed_level: u32,
    /// Levels in name order.
    pub levels: Vec<LevelRecord>,
}

impl PageRecord {
    /// Value extracted for `level`.
    pub fn value(&self, level: &str) -> Option<&Extracted> {
        self.levels.iter().find(|record| record.level == level)?.value.as_ref()
    }

    /// Whether the page carries enough content to be indexed.
    ///
    /// With a minimum of 0 any extracted value is enough. Otherwise some
    /// `lvlN` level with `N >= min_indexed_level` must have a value.
    pub fn is_indexable(&self) -> bool {
        let mut filled = self.levels.iter().filter(|record| record.value.is_some());

        if self.min_indexed_level == 0 {
            return filled.next().is_some();
        }

        filled.any(|record| level_depth(&record.level).is_some_and(|depth| depth >= self.min_indexed_level))
    }

    /// Converts the record to the specified format.
    pub fn to_format(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&self.to_json()?)?),
            OutputFormat::PlainText => Ok(self.to_text()),
        }
    }

    /// Gets the record as structured JSON.
    pub fn to_json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Renders `level [weight]: value` lines, `-` standing for no value.
    pub fn to_text(&self) -> String {
        let mut lines = Vec::with_capacity(self.levels.len() + 1);

        lines.push(format!(
            "# {} ({}, min level {})",
            self.url.as_deref().unwrap_or("-"),
            self.selectors_key,
            self.min_indexed_level
        ));

        for record in &self.levels {
            let value = record.value.as_ref().map_or_else(|| "-".to_string(), ToString::to_string);
            let global = if record.global { " global" } else { "" };
            lines.push(format!("{} [{}{}]: {}", record.level, record.weight, global, value));
        }

        lines.join("\n")
    }
}
