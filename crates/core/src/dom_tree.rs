//! Element-tree view with the text/tail model.
//!
//! `scraper` stores text as sibling nodes. The extraction walker reasons in
//! terms of an element tree where every node carries:
//!
//! - **text**: the text before its first non-text child
//! - **tail**: the text after its closing tag, up to the next non-text sibling
//! - **children**: its non-text children (elements, comments, ...) in order
//!
//! ```html
//! <p>A<b>B</b>C</p>
//! ```
//!
//! Here `p` has text `A` and one child `b`, `b` has text `B` and tail `C`.

use std::borrow::Cow;
use std::iter;

use ego_tree::NodeRef;
use scraper::Node;

/// What a tree node is, as far as extraction is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// A tagged element.
    Element,
    /// The document or fragment root.
    Root,
    /// Comments, doctypes and processing instructions.
    Other,
}

/// A borrowed node of a parsed document.
#[derive(Debug, Clone, Copy)]
pub struct TreeNode<'a> {
    node: NodeRef<'a, Node>,
}

impl<'a> TreeNode<'a> {
    pub fn new(node: NodeRef<'a, Node>) -> Self {
        Self { node }
    }

    /// The underlying `ego_tree` node.
    pub fn node_ref(&self) -> NodeRef<'a, Node> {
        self.node
    }

    pub fn kind(&self) -> NodeKind {
        match self.node.value() {
            Node::Element(_) => NodeKind::Element,
            Node::Document | Node::Fragment => NodeKind::Root,
            _ => NodeKind::Other,
        }
    }

    /// Lowercase tag name, for elements only.
    pub fn tag(&self) -> Option<&'a str> {
        self.node.value().as_element().map(|el| el.name())
    }

    /// Value of an attribute, if present.
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.node.value().as_element().and_then(|el| el.attr(name))
    }

    /// Attributes in source order.
    pub fn attrs(&self) -> Vec<(&'a str, &'a str)> {
        self.node
            .value()
            .as_element()
            .map(|el| el.attrs().collect())
            .unwrap_or_default()
    }

    /// Text before the first non-text child, `None` when there is none.
    pub fn text(&self) -> Option<Cow<'a, str>> {
        leading_text(self.node.children())
    }

    /// Text following this node up to the next non-text sibling.
    pub fn tail(&self) -> Option<Cow<'a, str>> {
        leading_text(iter::successors(self.node.next_sibling(), |n| n.next_sibling()))
    }

    /// Non-text children in document order.
    pub fn children(&self) -> impl Iterator<Item = TreeNode<'a>> + use<'a> {
        self.node
            .children()
            .filter(|child| !child.value().is_text())
            .map(TreeNode::new)
    }

    /// Every text node below this one, concatenated in document order.
    pub fn text_content(&self) -> String {
        self.node
            .descendants()
            .filter_map(|n| n.value().as_text().map(|t| &**t))
            .collect()
    }
}

/// Concatenates the run of text nodes at the start of `nodes`.
fn leading_text<'a>(nodes: impl Iterator<Item = NodeRef<'a, Node>>) -> Option<Cow<'a, str>> {
    let mut text: Option<Cow<'a, str>> = None;

    for node in nodes {
        let Some(chunk) = node.value().as_text() else {
            break;
        };
        let chunk: &'a str = chunk;
        match text.as_mut() {
            None => text = Some(Cow::Borrowed(chunk)),
            Some(existing) => existing.to_mut().push_str(chunk),
        }
    }

    text
}
