//! HTML parsing, selector evaluation and subtree exclusion.
//!
//! This module provides the [`Document`] type wrapping a parsed page, and the
//! [`Selection`] union returned when a selector is evaluated against it.
//!
//! # Example
//!
//! ```rust
//! use strata_core::{Document, Selection, SelectorKind};
//!
//! let html = r#"
//!     <html>
//!         <body>
//!             <h1>Title</h1>
//!             <p class="content">Paragraph</p>
//!         </body>
//!     </html>
//! "#;
//!
//! let doc = Document::parse(html).unwrap();
//! let paragraphs = doc.evaluate("p.content", SelectorKind::Css).unwrap();
//! assert!(matches!(paragraphs, Selection::Nodes(ref nodes) if nodes.len() == 1));
//! ```

use scraper::{ElementRef, Html, Selector};
use serde::Serialize;

use crate::dom_tree::TreeNode;
use crate::encoding::{decode_declared, decode_sniffed};
use crate::siteconfig::SelectorKind;
use crate::{Result, StrataError};

/// A single item of a selector result.
#[derive(Debug, Clone)]
pub enum Matched<'a> {
    /// An element of the document.
    Node(TreeNode<'a>),
    /// A literal string, from queries ending in `text()` or `@attr`.
    Text(String),
}

/// A value computed by a query rather than selected from the tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Number(f64),
    Boolean(bool),
    String(String),
}

/// Result of evaluating a selector expression.
#[derive(Debug, Clone)]
pub enum Selection<'a> {
    /// Zero or more selected items, in document order.
    Nodes(Vec<Matched<'a>>),
    /// A count, boolean or string computed by the query.
    Scalar(Scalar),
}

/// Represents a parsed HTML document.
///
/// The tree is owned by one extraction pass. [`Document::remove_excluded`]
/// needs `&mut self`, so exclusion always completes before any selection
/// borrows the tree.
#[derive(Debug)]
pub struct Document {
    html: Html,
}

impl Document {
    /// Parses already-decoded HTML.
    ///
    /// # Errors
    ///
    /// Returns [`StrataError::UnparseableDocument`] when the text is blank,
    /// or when it carries an XML encoding declaration that contradicts the
    /// fact that it has already been decoded.
    pub fn parse(html: &str) -> Result<Self> {
        if html.trim().is_empty() {
            return Err(StrataError::UnparseableDocument("document is empty".to_string()));
        }
        if declares_xml_encoding(html) {
            return Err(StrataError::UnparseableDocument(
                "decoded text carries an encoding declaration".to_string(),
            ));
        }

        Ok(Self { html: Html::parse_document(html) })
    }

    /// Parses a document straight from its raw bytes, sniffing the encoding.
    ///
    /// # Errors
    ///
    /// Returns [`StrataError::UnparseableDocument`] when nothing parseable
    /// remains after decoding.
    pub fn parse_bytes(raw: &[u8]) -> Result<Self> {
        let text = decode_sniffed(raw);
        if text.trim().is_empty() {
            return Err(StrataError::UnparseableDocument("document is empty".to_string()));
        }

        Ok(Self { html: Html::parse_document(&text) })
    }

    /// Decodes then parses a response body, falling back to the raw bytes.
    ///
    /// The declared encoding is tried first. If decoding or parsing fails
    /// the raw bytes are parsed directly; a failure there is final.
    pub fn from_response(raw: &[u8], declared_encoding: Option<&str>) -> Result<Self> {
        let decoded = decode_declared(raw, declared_encoding)
            .ok_or_else(|| StrataError::UnparseableDocument("body does not decode".to_string()))
            .and_then(|text| Self::parse(&text));

        match decoded {
            Ok(doc) => Ok(doc),
            Err(err) => {
                tracing::debug!(encoding = ?declared_encoding, error = %err, "retrying parse from raw bytes");
                Self::parse_bytes(raw)
            }
        }
    }

    /// Gets the underlying `scraper::Html` instance.
    pub fn html(&self) -> &Html {
        &self.html
    }

    /// The document root.
    pub fn root(&self) -> TreeNode<'_> {
        TreeNode::new(self.html.tree.root())
    }

    /// Selects elements using a CSS selector.
    ///
    /// # Errors
    ///
    /// Returns [`StrataError::InvalidSelector`] if the selector is invalid.
    pub fn select(&self, selector: &str) -> Result<Vec<TreeNode<'_>>> {
        let sel = compile_css(selector)?;
        Ok(self.matching(&sel).into_iter().map(|el| TreeNode::new(*el)).collect())
    }

    /// Evaluates a selector expression against the whole document.
    ///
    /// CSS expressions always produce [`Selection::Nodes`]. Path queries may
    /// produce literal strings (`text()`, `@attr`) or scalars (`count`,
    /// `boolean`, `string`).
    pub fn evaluate(&self, expression: &str, kind: SelectorKind) -> Result<Selection<'_>> {
        match kind {
            SelectorKind::Css => {
                let nodes = self.select(expression)?;
                Ok(Selection::Nodes(nodes.into_iter().map(Matched::Node).collect()))
            }
            SelectorKind::XPath => self.evaluate_xpath(expression),
        }
    }

    /// Elements attached to the tree that match `sel`, in document order.
    ///
    /// Walks from the root so detached subtrees are never visited.
    fn matching(&self, sel: &Selector) -> Vec<ElementRef<'_>> {
        self.html
            .tree
            .root()
            .descendants()
            .filter_map(ElementRef::wrap)
            .filter(|el| sel.matches(el))
            .collect()
    }

    #[cfg(feature = "xpath")]
    fn evaluate_xpath(&self, expression: &str) -> Result<Selection<'_>> {
        use crate::siteconfig::xpath::{Projection, ScalarFn, XPathQuery};

        let query = XPathQuery::compile(expression)?;
        let sel = compile_css(query.css())?;
        let elements = self.matching(&sel).into_iter();

        let items: Vec<Matched<'_>> = match query.projection() {
            Projection::Elements => elements.map(|el| Matched::Node(TreeNode::new(*el))).collect(),
            Projection::Text => elements.flat_map(direct_text).map(Matched::Text).collect(),
            Projection::Attribute(name) => elements
                .filter_map(|el| el.value().attr(name).map(|v| Matched::Text(v.to_string())))
                .collect(),
        };

        Ok(match query.scalar() {
            None => Selection::Nodes(items),
            Some(ScalarFn::Count) => Selection::Scalar(Scalar::Number(items.len() as f64)),
            Some(ScalarFn::Boolean) => Selection::Scalar(Scalar::Boolean(!items.is_empty())),
            Some(ScalarFn::String) => {
                let value = match items.first() {
                    Some(Matched::Node(node)) => node.text_content(),
                    Some(Matched::Text(text)) => text.clone(),
                    None => String::new(),
                };
                Selection::Scalar(Scalar::String(value))
            }
        })
    }

    #[cfg(not(feature = "xpath"))]
    fn evaluate_xpath(&self, expression: &str) -> Result<Selection<'_>> {
        Err(StrataError::UnsupportedXPath(expression.to_string()))
    }

    /// Removes every element matching any of `selectors`, with its subtree.
    ///
    /// Selectors are applied in order against the current tree, so a later
    /// selector cannot match inside a subtree an earlier one removed. A
    /// selector matching nothing is a no-op. Returns the number of elements
    /// detached.
    ///
    /// # Errors
    ///
    /// Returns [`StrataError::InvalidSelector`] if a selector is invalid; the
    /// selectors before it have already been applied.
    pub fn remove_excluded<S: AsRef<str>>(&mut self, selectors: &[S]) -> Result<usize> {
        let mut removed = 0;

        for selector in selectors {
            let selector = selector.as_ref();
            let sel = compile_css(selector)?;
            let ids: Vec<_> = self.matching(&sel).into_iter().map(|el| el.id()).collect();

            for id in &ids {
                if let Some(mut node) = self.html.tree.get_mut(*id) {
                    node.detach();
                }
            }

            tracing::debug!(selector, matches = ids.len(), "excluded subtrees");
            removed += ids.len();
        }

        Ok(removed)
    }
}

fn compile_css(selector: &str) -> Result<Selector> {
    Selector::parse(selector)
        .map_err(|e| StrataError::InvalidSelector { selector: selector.to_string(), reason: e.to_string() })
}

/// Direct text-node children of an element, each as its own string.
#[cfg(feature = "xpath")]
fn direct_text(el: ElementRef<'_>) -> Vec<String> {
    el.children()
        .filter_map(|child| child.value().as_text().map(|t| String::from(&**t)))
        .collect()
}

fn declares_xml_encoding(html: &str) -> bool {
    let head = html.trim_start();
    head.starts_with("<?xml")
        && head
            .split_once("?>")
            .is_some_and(|(decl, _)| decl.contains("encoding"))
}
