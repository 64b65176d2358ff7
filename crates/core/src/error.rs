//! Error types for Strata operations.
//!
//! This module defines the main error type [`StrataError`] which represents
//! every failure the extraction engine reports upward. Missing configuration
//! keys are deliberately absent from this list: a level or attribute lookup
//! that finds nothing resolves to a disabled feature, never to an error.
//!
//! # Example
//!
//! ```rust
//! use strata_core::{Document, StrataError};
//!
//! match Document::from_response(b"   ", Some("utf-8")) {
//!     Ok(_) => println!("parsed"),
//!     Err(StrataError::UnparseableDocument(reason)) => println!("skipping page: {}", reason),
//!     Err(e) => println!("Error: {}", e),
//! }
//! ```

use thiserror::Error;

/// Main error type for extraction operations.
#[derive(Error, Debug)]
pub enum StrataError {
    /// The document could not be parsed, even from its raw bytes.
    ///
    /// Returned by the fallback parse path; the page should be skipped.
    #[error("Unparseable document: {0}")]
    UnparseableDocument(String),

    /// A selector expression the engine cannot compile.
    ///
    /// Covers both CSS selectors and path queries after translation.
    #[error("Invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },

    /// A path query outside the supported subset.
    #[error("Unsupported XPath expression: {0}")]
    UnsupportedXPath(String),

    /// A start URL pattern that is not a valid regular expression.
    #[error("Invalid start URL pattern '{pattern}': {source}")]
    InvalidUrlPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Malformed configuration document.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Configuration JSON could not be deserialized.
    #[error("Invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// File read errors.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for StrataError.
pub type Result<T> = std::result::Result<T, StrataError>;
