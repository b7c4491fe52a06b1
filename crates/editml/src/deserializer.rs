//! Markup to tree deserialization.
//!
//! Builds an editable tree from an HTML fragment via the stream parser, then
//! normalizes it for editing:
//! - `href`/`src` values are copied into shadow attributes so later edits can
//!   tell a user-modified target from the original,
//! - whitespace-only and `&nbsp;`-only blocks become a block holding a filler
//!   `<br>`, keeping the block focusable,
//! - under [`RendererQuirks::LegacyAnchorWorkaround`], empty `<a name>`
//!   anchors become zero-width image placeholders (some renderers strip empty
//!   anchors outright).
//!
//! Nothing here raises: mismatched end tags are dropped, unclosed elements
//! close at end of input, and unknown markup passes into the tree as-is.

use crate::dom::Node;
use crate::entities::decode_entities;
use crate::stream::{TokenTransform, parse_html};
use crate::tag::ParsedTag;

/// Shadow copy of the original `href`, stamped at deserialize time.
pub const ORIGINAL_HREF_ATTR: &str = "data-original-href";
/// Shadow copy of the original `src`, stamped at deserialize time.
pub const ORIGINAL_SRC_ATTR: &str = "data-original-src";
/// Marks the filler `<br>` representing an intentionally empty block.
pub const FILLER_ATTR: &str = "data-filler";
/// Carries the anchor name on a placeholder image.
pub const ANCHOR_NAME_ATTR: &str = "data-anchor-name";
/// CSS class identifying anchor placeholder images.
pub const ANCHOR_MARKER_CLASS: &str = "anchor-marker";

/// Renderer-specific rewrites, selected explicitly by the caller. The core
/// never sniffs its environment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RendererQuirks {
    #[default]
    None,
    /// Replace empty named anchors with image placeholders.
    LegacyAnchorWorkaround,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Deserializer {
    quirks: RendererQuirks,
}

impl Deserializer {
    pub fn new(quirks: RendererQuirks) -> Self {
        Self { quirks }
    }

    /// Parse `html` and replace `target`'s children with the result. `target`
    /// must be a fragment or element node; leaf targets are left untouched.
    pub fn deserialize(&self, html: &str, target: &mut Node) {
        let Some(children) = target.children_mut() else {
            return;
        };
        let mut builder = TreeBuilder::new();
        parse_html(html, &mut builder);
        let mut built = builder.finish();
        for node in &mut built {
            normalize(node, self.quirks);
        }
        children.clear();
        children.extend(built);
    }
}

/// Stream transform that assembles tokens into a tree with an open-element
/// stack. Replacement strings are unused here; the transform is run for its
/// side effect.
struct TreeBuilder {
    finished: Vec<Node>,
    open: Vec<Node>,
}

impl TreeBuilder {
    fn new() -> Self {
        Self {
            finished: Vec::new(),
            open: Vec::new(),
        }
    }

    fn append(&mut self, node: Node) {
        match self.open.last_mut() {
            Some(parent) => parent.append_child(node),
            None => self.finished.push(node),
        }
    }

    fn close_top(&mut self) {
        if let Some(closed) = self.open.pop() {
            self.append(closed);
        }
    }

    fn finish(mut self) -> Vec<Node> {
        // Unclosed elements close implicitly at end of input.
        while !self.open.is_empty() {
            self.close_top();
        }
        self.finished
    }
}

impl TokenTransform for TreeBuilder {
    fn on_tag_start(&mut self, tag: &ParsedTag, _raw: &str) -> String {
        let mut element = Node::element(&tag.name.to_ascii_lowercase());
        for (key, attribute) in &tag.attributes {
            let value = attribute.value.as_deref().map(decode_entities);
            element.set_attribute(key, value.as_deref());
        }
        stamp_shadow_attributes(&mut element);

        if crate::dom::is_void_element(&tag.name) {
            self.append(element);
        } else {
            self.open.push(element);
        }
        String::new()
    }

    fn on_tag_end(&mut self, name: &str, _raw: &str) -> String {
        // Only close if a matching element is actually open; a stray end tag
        // must not collapse unrelated ancestors.
        let matching = self
            .open
            .iter()
            .rposition(|node| node.is_element_named(name));
        match matching {
            Some(depth) => {
                while self.open.len() > depth {
                    self.close_top();
                }
            }
            None => {
                log::debug!(target: "editml.deserialize", "dropping unmatched </{name}>");
            }
        }
        String::new()
    }

    fn on_processing_tag(&mut self, raw: &str) -> String {
        if let Some(body) = raw
            .strip_prefix("<!--")
            .map(|r| r.strip_suffix("-->").unwrap_or(r))
        {
            self.append(Node::Comment {
                id: crate::dom::Id(0),
                text: body.to_string(),
            });
        } else {
            // Doctypes and processing instructions have no place in an
            // editable fragment.
            log::debug!(target: "editml.deserialize", "dropping {raw}");
        }
        String::new()
    }

    fn on_html_text(&mut self, text: &str) -> String {
        self.append(Node::text(&decode_entities(text)));
        String::new()
    }
}

fn stamp_shadow_attributes(element: &mut Node) {
    let shadow = if element.is_element_named("a") || element.is_element_named("area") {
        element
            .get_attribute("href")
            .map(|href| (ORIGINAL_HREF_ATTR, href.to_string()))
    } else if element.is_element_named("img") || element.is_element_named("input") {
        element
            .get_attribute("src")
            .map(|src| (ORIGINAL_SRC_ATTR, src.to_string()))
    } else {
        None
    };
    if let Some((name, value)) = shadow {
        if !element.has_attribute(name) {
            element.set_attribute(name, Some(&value));
        }
    }
}

fn normalize(node: &mut Node, quirks: RendererQuirks) {
    if let Some(children) = node.children_mut() {
        for child in children.iter_mut() {
            normalize(child, quirks);
        }
        if quirks == RendererQuirks::LegacyAnchorWorkaround {
            for child in children.iter_mut() {
                if let Some(anchor_name) = empty_named_anchor(child) {
                    log::debug!(
                        target: "editml.deserialize",
                        "replacing empty anchor {anchor_name:?} with placeholder"
                    );
                    *child = anchor_placeholder(&anchor_name);
                }
            }
        }
    }

    let Node::Element { name, children, .. } = node else {
        return;
    };
    if crate::dom::is_block_element(name) && is_visually_empty(children) {
        let mut filler = Node::element("br");
        filler.set_attribute(FILLER_ATTR, None);
        children.clear();
        children.push(filler);
    }
}

/// Empty or whitespace-only content (U+00A0 from a decoded `&nbsp;` counts as
/// whitespace here). A block like that would be unfocusable in an editor.
fn is_visually_empty(children: &[Node]) -> bool {
    children.iter().all(|child| match child {
        Node::Text { text, .. } => text.chars().all(char::is_whitespace),
        _ => false,
    })
}

fn empty_named_anchor(node: &Node) -> Option<String> {
    if !node.is_element_named("a") || node.has_attribute("href") {
        return None;
    }
    let name = node.get_attribute("name")?;
    is_visually_empty(node.children()).then(|| name.to_string())
}

fn anchor_placeholder(anchor_name: &str) -> Node {
    let mut img = Node::element("img");
    img.set_attribute("class", Some(ANCHOR_MARKER_CLASS));
    img.set_attribute(ANCHOR_NAME_ATTR, Some(anchor_name));
    img
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Node;

    fn deserialize(html: &str) -> Node {
        deserialize_with(html, RendererQuirks::None)
    }

    fn deserialize_with(html: &str, quirks: RendererQuirks) -> Node {
        let mut root = Node::fragment();
        Deserializer::new(quirks).deserialize(html, &mut root);
        root
    }

    #[test]
    fn builds_nested_elements_and_text() {
        let root = deserialize("<p>hello <b>world</b></p>");
        let p = &root.children()[0];
        assert!(p.is_element_named("p"));
        assert!(matches!(&p.children()[0], Node::Text { text, .. } if text == "hello "));
        let b = &p.children()[1];
        assert!(b.is_element_named("b"));
        assert!(matches!(&b.children()[0], Node::Text { text, .. } if text == "world"));
    }

    #[test]
    fn text_entities_are_decoded() {
        let root = deserialize("<p>a &amp; b&nbsp;c</p>");
        let p = &root.children()[0];
        assert!(matches!(
            &p.children()[0],
            Node::Text { text, .. } if text == "a & b\u{00A0}c"
        ));
    }

    #[test]
    fn href_gets_a_shadow_attribute() {
        let root = deserialize("<a href=\"https://example.com\">x</a>");
        let a = &root.children()[0];
        assert_eq!(a.get_attribute("href"), Some("https://example.com"));
        assert_eq!(
            a.get_attribute(ORIGINAL_HREF_ATTR),
            Some("https://example.com")
        );
    }

    #[test]
    fn src_gets_a_shadow_attribute() {
        let root = deserialize("<img src=\"pic.png\">");
        let img = &root.children()[0];
        assert_eq!(img.get_attribute("src"), Some("pic.png"));
        assert_eq!(img.get_attribute(ORIGINAL_SRC_ATTR), Some("pic.png"));
    }

    #[test]
    fn existing_shadow_attribute_is_not_overwritten() {
        let root = deserialize(
            "<a href=\"new\" data-original-href=\"old\">x</a>",
        );
        let a = &root.children()[0];
        assert_eq!(a.get_attribute("href"), Some("new"));
        assert_eq!(a.get_attribute(ORIGINAL_HREF_ATTR), Some("old"));
    }

    #[test]
    fn nbsp_only_block_becomes_filler_break() {
        let root = deserialize("<p>&nbsp;</p>");
        let p = &root.children()[0];
        assert_eq!(p.children().len(), 1);
        let filler = &p.children()[0];
        assert!(filler.is_element_named("br"));
        assert!(filler.has_attribute(FILLER_ATTR));
    }

    #[test]
    fn whitespace_only_block_becomes_filler_break() {
        let root = deserialize("<h1> \n\t </h1>");
        let h1 = &root.children()[0];
        assert!(h1.children()[0].has_attribute(FILLER_ATTR));
    }

    #[test]
    fn empty_block_becomes_filler_break() {
        let root = deserialize("<p></p>");
        let p = &root.children()[0];
        assert!(p.children()[0].has_attribute(FILLER_ATTR));
    }

    #[test]
    fn non_empty_block_is_left_alone() {
        let root = deserialize("<p>text</p>");
        let p = &root.children()[0];
        assert!(matches!(&p.children()[0], Node::Text { text, .. } if text == "text"));
    }

    #[test]
    fn anchor_workaround_is_off_by_default() {
        let root = deserialize("<p><a name=\"top\"></a>x</p>");
        let a = &root.children()[0].children()[0];
        assert!(a.is_element_named("a"));
        assert_eq!(a.get_attribute("name"), Some("top"));
    }

    #[test]
    fn anchor_workaround_replaces_empty_named_anchors() {
        let root = deserialize_with(
            "<p><a name=\"top\"></a>x</p>",
            RendererQuirks::LegacyAnchorWorkaround,
        );
        let placeholder = &root.children()[0].children()[0];
        assert!(placeholder.is_element_named("img"));
        assert_eq!(placeholder.get_attribute("class"), Some(ANCHOR_MARKER_CLASS));
        assert_eq!(placeholder.get_attribute(ANCHOR_NAME_ATTR), Some("top"));
    }

    #[test]
    fn anchor_workaround_keeps_anchors_with_href_or_content() {
        let root = deserialize_with(
            "<p><a name=\"n\" href=\"x\">link</a><a name=\"m\">text</a></p>",
            RendererQuirks::LegacyAnchorWorkaround,
        );
        let p = &root.children()[0];
        assert!(p.children()[0].is_element_named("a"));
        assert!(p.children()[1].is_element_named("a"));
    }

    #[test]
    fn unmatched_end_tags_are_dropped() {
        let root = deserialize("<p>a</b>b</p>");
        let p = &root.children()[0];
        assert!(p.is_element_named("p"));
        assert_eq!(p.children().len(), 2, "both text runs stay inside <p>");
    }

    #[test]
    fn unclosed_elements_close_at_end_of_input() {
        let root = deserialize("<div><p>dangling");
        let div = &root.children()[0];
        assert!(div.is_element_named("div"));
        let p = &div.children()[0];
        assert!(matches!(&p.children()[0], Node::Text { text, .. } if text == "dangling"));
    }

    #[test]
    fn comments_become_comment_nodes_and_doctypes_are_dropped() {
        let root = deserialize("<!DOCTYPE html><p><!-- note -->x</p>");
        assert_eq!(root.children().len(), 1);
        let p = &root.children()[0];
        assert!(matches!(&p.children()[0], Node::Comment { text, .. } if text == " note "));
    }

    #[test]
    fn element_names_are_lowercased() {
        let root = deserialize("<DiV><P>x</P></DiV>");
        let div = &root.children()[0];
        assert_eq!(div.name(), Some("div"));
        assert_eq!(div.children()[0].name(), Some("p"));
    }

    #[test]
    fn deserialize_replaces_existing_children() {
        let mut root = Node::fragment();
        root.append_child(Node::text("stale"));
        Deserializer::default().deserialize("<p>fresh</p>", &mut root);
        assert_eq!(root.children().len(), 1);
        assert!(root.children()[0].is_element_named("p"));
    }
}
