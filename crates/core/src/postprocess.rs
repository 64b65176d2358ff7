//! Text assembly: joining walker fragments into one normalized value.

use crate::extract::itertext;
use crate::parse::{Matched, Selection};
use crate::record::Extracted;
use crate::siteconfig::SelectorSet;

/// Whitespace always trimmed from assembled text.
const WHITESPACE: &[char] = &[' ', '\t', '\n', '\r', '\x0c'];

/// Joins and normalizes extracted fragments.
///
/// Holds the tags whose escaped literals are restored after assembly.
#[derive(Debug, Clone, Copy)]
pub struct Assembler<'a> {
    keep_tags: &'a [String],
}

impl<'a> Assembler<'a> {
    pub fn new(keep_tags: &'a [String]) -> Self {
        Self { keep_tags }
    }

    /// Assemble the text of one selected item.
    ///
    /// Literal strings are used as they are; nodes are walked for `level`.
    /// Surrounding whitespace is always trimmed, then `strip_chars` when
    /// given. Returns `None` when nothing is left.
    pub fn get_text(
        &self, value: &Matched<'_>, strip_chars: Option<&str>, level: &str, selectors: &SelectorSet,
    ) -> Option<String> {
        let text = match value {
            Matched::Text(text) => text.clone(),
            Matched::Node(node) => itertext(*node, level, selectors).fold(String::new(), |mut text, fragment| {
                text.push(' ');
                text.push_str(&fragment);
                text
            }),
        };

        let mut text = text.trim_matches(WHITESPACE);
        if let Some(chars) = strip_chars {
            text = text.trim_matches(|c: char| chars.contains(c));
        }

        if text.is_empty() { None } else { Some(self.unescape(text)) }
    }

    /// Assemble a whole selection.
    ///
    /// Scalars pass through unchanged. Items are assembled one by one and
    /// the non-empty ones joined with a single space.
    pub fn get_text_from_nodes(
        &self, selection: &Selection<'_>, strip_chars: Option<&str>, level: &str, selectors: &SelectorSet,
    ) -> Option<Extracted> {
        let items = match selection {
            Selection::Scalar(scalar) => return Some(Extracted::Scalar(scalar.clone())),
            Selection::Nodes(items) => items,
        };

        let text = items
            .iter()
            .filter_map(|item| self.get_text(item, strip_chars, level, selectors))
            .collect::<Vec<_>>()
            .join(" ");

        if text.is_empty() { None } else { Some(Extracted::Text(self.unescape(&text))) }
    }

    /// Restore escaped `<tag>` and `</tag>` literals of kept tags, then `&amp;`.
    ///
    /// No other entity is decoded.
    pub fn unescape(&self, text: &str) -> String {
        let mut text = text.to_string();

        for tag in self.keep_tags {
            text = text
                .replace(&format!("&lt;{}&gt;", tag), &format!("<{}>", tag))
                .replace(&format!("&lt;/{}&gt;", tag), &format!("</{}>", tag));
        }

        text.replace("&amp;", "&")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Document;
    use crate::parse::Scalar;
    use crate::siteconfig::LevelConfig;

    fn selectors() -> SelectorSet {
        SelectorSet::new().level("text", LevelConfig::new("p"))
    }

    fn nodes<'a>(doc: &'a Document, css: &str) -> Selection<'a> {
        Selection::Nodes(doc.select(css).unwrap().into_iter().map(Matched::Node).collect())
    }

    #[test]
    fn test_get_text_joins_fragments() {
        let doc = Document::parse("<p>A<b>B</b>C</p>").unwrap();
        let node = Matched::Node(doc.select("p").unwrap()[0]);
        let text = Assembler::new(&[]).get_text(&node, None, "text", &selectors());
        assert_eq!(text.as_deref(), Some("A B C"));
    }

    #[test]
    fn test_get_text_literal_is_used_as_is() {
        let value = Matched::Text("  ¶ Section title.  ".to_string());
        let text = Assembler::new(&[]).get_text(&value, Some(" .¶"), "text", &selectors());
        assert_eq!(text.as_deref(), Some("Section title"));
    }

    #[test]
    fn test_get_text_whitespace_only_is_none() {
        let doc = Document::parse("<p> \n\t </p>").unwrap();
        let node = Matched::Node(doc.select("p").unwrap()[0]);
        assert_eq!(Assembler::new(&[]).get_text(&node, None, "text", &selectors()), None);
    }

    #[test]
    fn test_get_text_strip_chars_to_empty_is_none() {
        let value = Matched::Text(" ... ".to_string());
        assert_eq!(Assembler::new(&[]).get_text(&value, Some("."), "text", &selectors()), None);
    }

    #[test]
    fn test_get_text_from_empty_selection() {
        let selection = Selection::Nodes(Vec::new());
        assert_eq!(Assembler::new(&[]).get_text_from_nodes(&selection, None, "text", &selectors()), None);
    }

    #[test]
    fn test_get_text_from_scalar_passes_through() {
        let selection = Selection::Scalar(Scalar::Number(4.0));
        let result = Assembler::new(&[]).get_text_from_nodes(&selection, Some("4"), "text", &selectors());
        assert_eq!(result, Some(Extracted::Scalar(Scalar::Number(4.0))));

        let selection = Selection::Scalar(Scalar::Boolean(false));
        let result = Assembler::new(&[]).get_text_from_nodes(&selection, None, "text", &selectors());
        assert_eq!(result, Some(Extracted::Scalar(Scalar::Boolean(false))));
    }

    #[test]
    fn test_get_text_from_nodes_drops_empty_items() {
        let doc = Document::parse("<p>one</p><p>  </p><p>two.</p>").unwrap();
        let selection = nodes(&doc, "p");
        let result = Assembler::new(&[]).get_text_from_nodes(&selection, Some("."), "text", &selectors());
        assert_eq!(result, Some(Extracted::Text("one two".to_string())));
    }

    #[test]
    fn test_get_text_from_nodes_all_empty_is_none() {
        let doc = Document::parse("<p> </p><p></p>").unwrap();
        let selection = nodes(&doc, "p");
        assert_eq!(Assembler::new(&[]).get_text_from_nodes(&selection, None, "text", &selectors()), None);
    }

    #[test]
    fn test_unescape_only_kept_tags() {
        let keep = vec!["mark".to_string()];
        let assembler = Assembler::new(&keep);
        let text = assembler.unescape("&lt;mark&gt;hit&lt;/mark&gt; &lt;b&gt;no&lt;/b&gt; &lt;mark class&gt; &amp;");
        assert_eq!(text, "<mark>hit</mark> &lt;b&gt;no&lt;/b&gt; &lt;mark class&gt; &");
    }

    #[test]
    fn test_unescape_without_keep_tags() {
        assert_eq!(Assembler::new(&[]).unescape("a &lt;em&gt; &amp;quot;"), "a &lt;em&gt; &quot;");
    }

    #[test]
    fn test_kept_markup_survives_assembly() {
        let keep = vec!["em".to_string()];
        let set = SelectorSet::new().level("text", LevelConfig::new("p").keep_tag("em", ["class"]));
        let doc = Document::parse(r#"<p>An <em class="x" id="y">important</em> word.</p>"#).unwrap();
        let selection = nodes(&doc, "p");

        let result = Assembler::new(&keep).get_text_from_nodes(&selection, Some(" ."), "text", &set);
        assert_eq!(result, Some(Extracted::Text("An  <em class='x'>important</em>  word".to_string())));
    }
}
