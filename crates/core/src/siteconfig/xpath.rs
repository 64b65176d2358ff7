//! Path-query support on top of the CSS engine.
//!
//! Site configurations mostly use simple location paths. Those are
//! translated to an equivalent CSS selector plus a projection (elements,
//! their text nodes, or an attribute), optionally wrapped in a scalar
//! function. Supported grammar:
//!
//! ```text
//! query      := path | ("count" | "boolean" | "string") "(" path ")"
//! path       := ("/" | "//" | ".//") step (("/" | "//") step)* [ "/" ("text()" | "@" name) ]
//! step       := (name | "*") [ "[" integer "]" ] predicate*
//! predicate  := "[" ( "@" name | "@" name "=" literal
//!                   | "contains(@" name "," literal ")" ) "]"
//! ```

use crate::error::{Result, StrataError};
use regex::Regex;
use std::sync::LazyLock;

#[allow(clippy::expect_used)]
static NAME_TEST_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\*|[A-Za-z_][\w.-]*)").expect("valid regex"));

#[allow(clippy::expect_used)]
static HAS_ATTR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^@([\w:.-]+)$").expect("valid regex"));

#[allow(clippy::expect_used)]
static ATTR_EQUALS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^@([\w:.-]+)\s*=\s*(?:'([^']*)'|"([^"]*)")$"#).expect("valid regex")
});

#[allow(clippy::expect_used)]
static ATTR_CONTAINS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^contains\(\s*@([\w:.-]+)\s*,\s*(?:'([^']*)'|"([^"]*)")\s*\)$"#).expect("valid regex")
});

#[allow(clippy::expect_used)]
static POSITION_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^([1-9]\d*)$").expect("valid regex"));

/// What a query hands back for each selected element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Projection {
    Elements,
    /// Each direct text node of the element
    Text,
    /// The named attribute value, for elements carrying it
    Attribute(String),
}

/// Function turning the selected items into a single value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarFn {
    Count,
    Boolean,
    String,
}

/// A path query compiled to CSS
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XPathQuery {
    css: String,
    projection: Projection,
    scalar: Option<ScalarFn>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Child,
    Descendant,
}

impl XPathQuery {
    /// Compile `expression`
    ///
    /// # Errors
    ///
    /// Returns [`StrataError::UnsupportedXPath`] for anything outside the supported subset.
    pub fn compile(expression: &str) -> Result<Self> {
        let trimmed = expression.trim();
        let (scalar, path) = split_scalar_fn(trimmed);
        let (css, projection) = translate_path(path).ok_or_else(|| unsupported(expression))?;

        Ok(Self { css, projection, scalar })
    }

    /// Equivalent CSS selector for the element steps
    pub fn css(&self) -> &str {
        &self.css
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn scalar(&self) -> Option<ScalarFn> {
        self.scalar
    }
}

fn unsupported(expression: &str) -> StrataError {
    StrataError::UnsupportedXPath(expression.to_string())
}

fn split_scalar_fn(expression: &str) -> (Option<ScalarFn>, &str) {
    for (name, function) in [("count(", ScalarFn::Count), ("boolean(", ScalarFn::Boolean), ("string(", ScalarFn::String)]
    {
        if let Some(inner) = expression.strip_prefix(name).and_then(|rest| rest.strip_suffix(')')) {
            return (Some(function), inner.trim());
        }
    }
    (None, expression)
}

fn translate_path(path: &str) -> Option<(String, Projection)> {
    let mut rest = path.strip_prefix('.').unwrap_or(path);
    let absolute = !rest.starts_with("//");
    if !rest.starts_with('/') {
        return None;
    }

    let mut compounds: Vec<(Axis, String)> = Vec::new();
    let mut projection = Projection::Elements;

    while !rest.is_empty() {
        let (axis, after_axis) = match rest.strip_prefix("//") {
            Some(after) => (Axis::Descendant, after),
            None => (Axis::Child, rest.strip_prefix('/')?),
        };

        let (step, remainder) = split_step(after_axis)?;
        rest = remainder;

        if step == "text()" || step.starts_with('@') {
            if !rest.is_empty() || axis != Axis::Child || compounds.is_empty() {
                return None;
            }
            projection = match step.strip_prefix('@') {
                Some(name) if HAS_ATTR_RE.is_match(step) => Projection::Attribute(name.to_string()),
                Some(_) => return None,
                None => Projection::Text,
            };
            break;
        }

        compounds.push((axis, translate_step(step)?));
    }

    if compounds.is_empty() {
        return None;
    }

    let mut css = String::new();
    for (index, (axis, compound)) in compounds.iter().enumerate() {
        match (index, axis) {
            (0, Axis::Child) if absolute => {
                css.push_str(compound);
                css.push_str(":root");
            }
            (0, _) => css.push_str(compound),
            (_, Axis::Child) => {
                css.push_str(" > ");
                css.push_str(compound);
            }
            (_, Axis::Descendant) => {
                css.push(' ');
                css.push_str(compound);
            }
        }
    }

    Some((css, projection))
}

/// Split off one step, honouring brackets and quotes
fn split_step(input: &str) -> Option<(&str, &str)> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;

    for (index, ch) in input.char_indices() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(ch),
            (None, '[') => depth += 1,
            (None, ']') => depth = depth.checked_sub(1)?,
            (None, '/') if depth == 0 => {
                return (index > 0).then(|| (&input[..index], &input[index..]));
            }
            _ => {}
        }
    }

    (quote.is_none() && depth == 0 && !input.is_empty()).then_some((input, ""))
}

fn translate_step(step: &str) -> Option<String> {
    let name = NAME_TEST_RE.find(step)?.as_str();
    let mut compound = name.to_lowercase();
    let mut predicates = &step[name.len()..];

    let mut first = true;
    while !predicates.is_empty() {
        let body_end = find_predicate_end(predicates)?;
        let body = predicates[1..body_end].trim();
        predicates = &predicates[body_end + 1..];
        compound.push_str(&translate_predicate(body, name == "*", first)?);
        first = false;
    }

    Some(compound)
}

fn find_predicate_end(predicates: &str) -> Option<usize> {
    if !predicates.starts_with('[') {
        return None;
    }
    let mut quote: Option<char> = None;
    for (index, ch) in predicates.char_indices().skip(1) {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(ch),
            (None, ']') => return Some(index),
            _ => {}
        }
    }
    None
}

/// A position only maps to CSS when it counts siblings, so it must come
/// before any filtering predicate.
fn translate_predicate(body: &str, wildcard: bool, first: bool) -> Option<String> {
    if let Some(caps) = POSITION_RE.captures(body) {
        if !first {
            return None;
        }
        let pseudo = if wildcard { "nth-child" } else { "nth-of-type" };
        return Some(format!(":{}({})", pseudo, &caps[1]));
    }

    if let Some(caps) = HAS_ATTR_RE.captures(body) {
        return Some(format!("[{}]", &caps[1]));
    }

    if let Some(caps) = ATTR_EQUALS_RE.captures(body) {
        let value = caps.get(2).or_else(|| caps.get(3)).map_or("", |m| m.as_str());
        return Some(format!("[{}=\"{}\"]", &caps[1], css_escape(value)));
    }

    if let Some(caps) = ATTR_CONTAINS_RE.captures(body) {
        let value = caps.get(2).or_else(|| caps.get(3)).map_or("", |m| m.as_str());
        return Some(format!("[{}*=\"{}\"]", &caps[1], css_escape(value)));
    }

    None
}

fn css_escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
