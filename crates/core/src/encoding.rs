//! Character decoding of downloaded response bodies.
//!
//! Two paths exist. The strict path honours the encoding declared by the
//! fetch layer and refuses malformed input. The sniffing path looks at the
//! bytes themselves (BOM, `<meta charset>`, XML declaration) and decodes
//! lossily; it is only used when the strict path has already failed.

use encoding_rs::{Encoding, UTF_8};
use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

/// Number of leading bytes inspected for charset declarations.
const SNIFF_WINDOW: usize = 1024;

/// Match `<meta charset="...">` and `<meta ... content="...; charset=...">`
#[allow(clippy::expect_used)]
static META_CHARSET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]+charset\s*=\s*["']?([^"'\s>;]+)"#).expect("valid regex")
});

/// Match `<?xml version="1.0" encoding="..."?>`
#[allow(clippy::expect_used)]
static XML_ENCODING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)^\s*<\?xml[^>]*encoding\s*=\s*["']([^"']+)["']"#).expect("valid regex")
});

/// A response body after the decode attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    /// Body decoded with the declared encoding.
    Text(String),
    /// Decoding failed; the untouched raw bytes.
    Bytes(Vec<u8>),
}

impl Body {
    /// Returns the decoded text, if decoding succeeded.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Body::Text(text) => Some(text),
            Body::Bytes(_) => None,
        }
    }
}

/// Decodes `raw` with the declared encoding label, without replacement.
///
/// Returns `None` when the label is absent or unknown, or when the bytes are
/// malformed for that encoding.
pub fn decode_declared<'a>(raw: &'a [u8], declared: Option<&str>) -> Option<Cow<'a, str>> {
    let encoding = Encoding::for_label(declared?.trim().as_bytes())?;
    encoding.decode_without_bom_handling_and_without_replacement(raw)
}

/// Decodes `raw` with the declared encoding, or hands back the raw bytes.
pub fn load(raw: &[u8], declared: Option<&str>) -> Body {
    match decode_declared(raw, declared) {
        Some(text) => Body::Text(text.into_owned()),
        None => {
            tracing::warn!(encoding = ?declared, bytes = raw.len(), "could not decode body, keeping raw bytes");
            Body::Bytes(raw.to_vec())
        }
    }
}

/// Detects the character encoding from the body itself.
///
/// Checks the XML declaration, then `<meta>` charset declarations, in the
/// first kilobyte. Defaults to UTF-8. A UTF-16 declaration cannot describe
/// ASCII-compatible markup, so it is read as UTF-8.
pub fn sniff_encoding(raw: &[u8]) -> &'static Encoding {
    let head = String::from_utf8_lossy(&raw[..raw.len().min(SNIFF_WINDOW)]);

    [&*XML_ENCODING_RE, &*META_CHARSET_RE]
        .iter()
        .find_map(|re| re.captures(&head))
        .and_then(|caps| caps.get(1))
        .and_then(|m| Encoding::for_label(m.as_str().as_bytes()))
        .map(Encoding::output_encoding)
        .unwrap_or(UTF_8)
}

/// Decodes `raw` with a sniffed encoding, replacing malformed sequences.
///
/// A byte order mark takes precedence over any declaration.
pub fn decode_sniffed(raw: &[u8]) -> String {
    let (decoded, used, had_errors) = sniff_encoding(raw).decode(raw);
    if had_errors {
        tracing::debug!(encoding = used.name(), "replaced malformed sequences while sniffing");
    }
    decoded.into_owned()
}
