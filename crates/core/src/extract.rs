//! The extraction walker.
//!
//! [`Fragments`] walks a subtree depth-first in document order and yields the
//! text (or minimal markup wrappers) to index under one level. For every node:
//!
//! 1. Comments, doctypes and processing instructions yield nothing.
//! 2. Nodes whose `class` attribute contains an excluded class name are
//!    skipped together with their whole subtree.
//! 3. A node yields its own content when it has inline text or is an `img`
//!    or `meta` element. In meta-tag mode the content is the `content`
//!    attribute instead of the text.
//! 4. When the level keeps the node's tag, the content is wrapped in a
//!    rebuilt tag carrying only the allowed attributes.
//! 5. Children are walked in order; after each child's subtree, the child's
//!    tail text is yielded.
//!
//! The tail of the starting node itself belongs to its parent and is never
//! yielded.

use std::borrow::Cow;

use crate::dom_tree::{NodeKind, TreeNode};
use crate::siteconfig::SelectorSet;

/// Tags yielded even without inline text.
const ALWAYS_EMITTED_TAGS: &[&str] = &["img", "meta"];

#[derive(Debug, Clone, Copy)]
enum Frame<'a> {
    Enter(TreeNode<'a>),
    Tail(TreeNode<'a>),
}

/// Lazy sequence of text fragments for one level.
///
/// Finite and not restartable; build a new one to walk again.
#[derive(Debug, Clone)]
pub struct Fragments<'a, 's> {
    stack: Vec<Frame<'a>>,
    level: &'s str,
    selectors: &'s SelectorSet,
}

impl<'a, 's> Fragments<'a, 's> {
    pub fn new(node: TreeNode<'a>, level: &'s str, selectors: &'s SelectorSet) -> Self {
        Self { stack: vec![Frame::Enter(node)], level, selectors }
    }

    /// Handles one node: queues its children and returns its own content.
    fn enter(&mut self, node: TreeNode<'a>) -> Option<Cow<'a, str>> {
        let tag = match node.kind() {
            NodeKind::Element => node.tag(),
            NodeKind::Root => None,
            NodeKind::Other => return None,
        };

        if will_skip_node(node, self.level, self.selectors) {
            return None;
        }

        let children: Vec<_> = node.children().collect();
        for child in children.into_iter().rev() {
            self.stack.push(Frame::Tail(child));
            self.stack.push(Frame::Enter(child));
        }

        let text = node.text().filter(|text| !text.is_empty());
        if text.is_none() && !tag.is_some_and(|tag| ALWAYS_EMITTED_TAGS.contains(&tag)) {
            return None;
        }

        let content = if self.selectors.uses_meta_content(self.level) {
            Cow::Borrowed(meta_content(node))
        } else {
            text.unwrap_or_default()
        };

        let allowed = tag.and_then(|tag| Some((tag, self.selectors.allowed_attrs(self.level, tag)?)));
        match allowed {
            Some((tag, allowed)) => Some(Cow::Owned(wrap(node, tag, allowed, &content))),
            None => Some(content),
        }
    }
}

impl<'a> Iterator for Fragments<'a, '_> {
    type Item = Cow<'a, str>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(frame) = self.stack.pop() {
            let fragment = match frame {
                Frame::Enter(node) => self.enter(node),
                Frame::Tail(node) => node.tail().filter(|tail| !tail.is_empty()),
            };
            if fragment.is_some() {
                return fragment;
            }
        }
        None
    }
}

/// Walk `node` for `level`.
pub fn itertext<'a, 's>(node: TreeNode<'a>, level: &'s str, selectors: &'s SelectorSet) -> Fragments<'a, 's> {
    Fragments::new(node, level, selectors)
}

/// Whether the node's class attribute contains an excluded class name.
///
/// Matching is by substring: an exclusion of `foo` also skips `foo-bar`.
pub fn will_skip_node(node: TreeNode<'_>, level: &str, selectors: &SelectorSet) -> bool {
    let Some(classnames) = selectors.classnames_to_skip(level) else {
        return false;
    };

    let class_attr = node.attr("class").unwrap_or("");
    classnames.iter().any(|name| class_attr.contains(name.as_str()))
}

/// The `content` attribute, empty when absent.
pub fn meta_content<'a>(node: TreeNode<'a>) -> &'a str {
    node.attr("content").unwrap_or("")
}

/// Rebuild `<tag k='v'>content</tag>` with only the allowed attributes.
fn wrap(node: TreeNode<'_>, tag: &str, allowed: &[String], content: &str) -> String {
    let attrs = node
        .attrs()
        .into_iter()
        .filter(|(name, _)| allowed.iter().any(|allowed| allowed == name))
        .map(|(name, value)| format!(" {}='{}'", name, value))
        .collect::<Vec<_>>()
        .join(" ");

    format!("<{tag}{attrs}>{content}</{tag}>")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Document;
    use crate::siteconfig::LevelConfig;

    fn fragments(html: &str, css: &str, level: &str, selectors: &SelectorSet) -> Vec<String> {
        let doc = Document::parse(html).unwrap();
        let node = doc.select(css).unwrap()[0];
        itertext(node, level, selectors).map(Cow::into_owned).collect()
    }

    fn plain() -> SelectorSet {
        SelectorSet::new().level("text", LevelConfig::new("p"))
    }

    #[test]
    fn test_tail_interleaving() {
        let result = fragments("<p>A<b>B</b>C</p>", "p", "text", &plain());
        assert_eq!(result, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_preorder_with_nested_tails() {
        let html = "<div>1<p>2<i>3</i>4</p>5<span>6</span>7</div>";
        let result = fragments(html, "div", "text", &plain());
        assert_eq!(result, vec!["1", "2", "3", "4", "5", "6", "7"]);
    }

    #[test]
    fn test_own_tail_is_not_yielded() {
        let result = fragments("<div><b>B</b>after</div>", "b", "text", &plain());
        assert_eq!(result, vec!["B"]);
    }

    #[test]
    fn test_unknown_level_is_unrestricted() {
        let result = fragments(r#"<p class="hidden">A<em>B</em></p>"#, "p", "missing", &plain());
        assert_eq!(result, vec!["A", "B"]);
    }

    #[test]
    fn test_class_exclusion_skips_subtree_but_keeps_tail() {
        let set = SelectorSet::new().level("text", LevelConfig::new("div").exclude_classes(["hidden"]));
        let html = r#"<div>A<span class="hidden">B<em class="shown">C</em></span>D</div>"#;
        let result = fragments(html, "div", "text", &set);
        assert_eq!(result, vec!["A", "D"]);
    }

    #[test]
    fn test_class_exclusion_matches_substring() {
        let set = SelectorSet::new().level("text", LevelConfig::new("div").exclude_classes(["foo"]));
        let html = r#"<div>A<span class="x foo-bar">B</span></div>"#;
        assert_eq!(fragments(html, "div", "text", &set), vec!["A"]);
    }

    #[test]
    fn test_excluded_start_node_yields_nothing() {
        let set = SelectorSet::new().level("text", LevelConfig::new("p").exclude_classes(["skip"]));
        let result = fragments(r#"<p class="skip">A<b>B</b>C</p>"#, "p", "text", &set);
        assert!(result.is_empty());
    }

    #[test]
    fn test_keep_tags_wrapper() {
        let set = SelectorSet::new().level("text", LevelConfig::new("em").keep_tag("em", ["class"]));
        let result = fragments(r#"<em class="x" id="y">hi</em>"#, "em", "text", &set);
        assert_eq!(result, vec!["<em class='x'>hi</em>"]);
    }

    #[test]
    fn test_keep_tags_without_attributes() {
        let set = SelectorSet::new().level("text", LevelConfig::new("p").keep_tag("code", Vec::<String>::new()));
        let result = fragments(r#"<p>use <code class="lang">x</code> here</p>"#, "p", "text", &set);
        assert_eq!(result, vec!["use ", "<code>x</code>", " here"]);
    }

    #[test]
    fn test_keep_tags_preserve_attribute_order() {
        let set =
            SelectorSet::new().level("text", LevelConfig::new("a").keep_tag("a", ["title", "href"]));
        let result = fragments(r#"<a href="/x" id="i" title="t">link</a>"#, "a", "text", &set);
        assert_eq!(result, vec!["<a href='/x'  title='t'>link</a>"]);
    }

    #[test]
    fn test_img_is_emitted_without_text() {
        let set = SelectorSet::new().level("text", LevelConfig::new("p").keep_tag("img", ["src"]));
        let result = fragments(r#"<p>see <img src="a.png" alt="x"> below</p>"#, "p", "text", &set);
        assert_eq!(result, vec!["see ", "<img src='a.png'></img>", " below"]);
    }

    #[test]
    fn test_img_without_keep_tags_yields_empty_fragment() {
        let result = fragments(r#"<p>see <img src="a.png"> below</p>"#, "p", "text", &plain());
        assert_eq!(result, vec!["see ", "", " below"]);
    }

    #[test]
    fn test_meta_tag_mode() {
        let set = SelectorSet::new().level("description", LevelConfig::new("meta").meta_tag());
        let html = r#"<html><head><meta name="description" content="desc"></head><body></body></html>"#;
        assert_eq!(fragments(html, "meta[name=description]", "description", &set), vec!["desc"]);
    }

    #[test]
    fn test_meta_tag_mode_missing_content() {
        let set = SelectorSet::new().level("description", LevelConfig::new("meta").meta_tag());
        let html = r#"<html><head><meta name="description"></head><body></body></html>"#;
        assert_eq!(fragments(html, "meta", "description", &set), vec![""]);
    }

    #[test]
    fn test_meta_tag_mode_ignores_text() {
        let set = SelectorSet::new().level("summary", LevelConfig::new("div").meta_tag());
        let html = r#"<div content="from attribute">from text</div>"#;
        assert_eq!(fragments(html, "div", "summary", &set), vec!["from attribute"]);
    }

    #[test]
    fn test_comments_are_skipped_but_tail_kept() {
        let result = fragments("<p>A<!-- hidden -->B</p>", "p", "text", &plain());
        assert_eq!(result, vec!["A", "B"]);
    }

    #[test]
    fn test_walk_from_document_root() {
        let doc = Document::parse("<html><body><h1>Title</h1><p>Body</p></body></html>").unwrap();
        let set = plain();
        let result: Vec<_> = itertext(doc.root(), "text", &set).collect();
        assert_eq!(result, vec!["Title", "Body"]);
    }

    #[test]
    fn test_sequence_is_lazy_and_finite() {
        let set = plain();
        let doc = Document::parse("<p>A<b>B</b>C</p>").unwrap();
        let node = doc.select("p").unwrap()[0];
        let mut walker = itertext(node, "text", &set);

        assert_eq!(walker.next().as_deref(), Some("A"));
        assert_eq!(walker.by_ref().count(), 2);
        assert_eq!(walker.next(), None);
    }
}
