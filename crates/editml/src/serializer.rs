//! HTML/XHTML fragment serialization.
//!
//! Both serializers apply the same canonicalization on top of the tree:
//! - every top-level element is followed by a single newline,
//! - non-breaking spaces encode as `&nbsp;`, `<`/`>`/`&` in text as entities,
//! - direct `<tr>` children of a `<table>` are wrapped in a synthesized
//!   `<tbody>`,
//! - empty block elements serialize with a `&nbsp;` placeholder so the block
//!   stays visible and editable after a round trip,
//! - internal editing attributes (shadow href/src copies, filler markers,
//!   anchor placeholders) are translated back to plain markup.
//!
//! The two dialects differ only in void-element output: `<br>` for HTML,
//! `<br />` or `<br></br>` for XHTML depending on [`SerializeOptions`].

use crate::deserializer::{
    ANCHOR_MARKER_CLASS, ANCHOR_NAME_ATTR, FILLER_ATTR, ORIGINAL_HREF_ATTR, ORIGINAL_SRC_ATTR,
};
use crate::dom::{Node, is_block_element, is_void_element};
use crate::entities::{encode_attribute, encode_text};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SerializeOptions {
    /// Emit empty elements as `<br />` instead of `<br></br>`.
    pub use_short_tags: bool,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self {
            use_short_tags: true,
        }
    }
}

pub trait MarkupSerializer {
    /// Serialize the children of `root` (the fragment node) to markup.
    fn serialize(&self, root: &Node) -> String;
}

/// HTML4/5-style output: void elements stay unclosed (`<br>`), valueless
/// attributes stay bare.
#[derive(Clone, Copy, Debug, Default)]
pub struct HtmlSerializer;

impl MarkupSerializer for HtmlSerializer {
    fn serialize(&self, root: &Node) -> String {
        serialize_fragment(root, Dialect::Html)
    }
}

/// XHTML-style output: every element is closed, valueless attributes expand
/// to `name="name"`.
#[derive(Clone, Copy, Debug, Default)]
pub struct XhtmlSerializer {
    pub options: SerializeOptions,
}

impl XhtmlSerializer {
    pub fn new(options: SerializeOptions) -> Self {
        Self { options }
    }
}

impl MarkupSerializer for XhtmlSerializer {
    fn serialize(&self, root: &Node) -> String {
        serialize_fragment(
            root,
            Dialect::Xhtml {
                short_tags: self.options.use_short_tags,
            },
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Dialect {
    Html,
    Xhtml { short_tags: bool },
}

fn serialize_fragment(root: &Node, dialect: Dialect) -> String {
    let mut out = String::new();
    for child in root.children() {
        write_node(&mut out, child, dialect);
        if matches!(child, Node::Element { .. }) {
            out.push('\n');
        }
    }
    out
}

fn write_node(out: &mut String, node: &Node, dialect: Dialect) {
    match node {
        Node::Fragment { children, .. } => {
            for child in children {
                write_node(out, child, dialect);
            }
        }
        Node::Element { .. } => write_element(out, node, dialect),
        Node::Text { text, .. } => out.push_str(&encode_text(text)),
        Node::Comment { text, .. } => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
    }
}

fn write_element(out: &mut String, node: &Node, dialect: Dialect) {
    let Node::Element {
        name,
        attributes,
        children,
        ..
    } = node
    else {
        return;
    };

    // A filler break stands in for "this block is intentionally empty";
    // on the wire that is the `&nbsp;` placeholder, not a real <br>.
    if node.is_element_named("br") && node.has_attribute(FILLER_ATTR) {
        out.push_str("&nbsp;");
        return;
    }

    // Anchor placeholders reduce back to the named anchor they replaced.
    if is_anchor_placeholder(node) {
        let anchor_name = node.get_attribute(ANCHOR_NAME_ATTR).unwrap_or_default();
        out.push('<');
        out.push_str("a name=\"");
        out.push_str(&encode_attribute(anchor_name));
        out.push_str("\"></a>");
        return;
    }

    out.push('<');
    out.push_str(name);
    for (attr_name, value) in attributes {
        if is_internal_attribute(attr_name) {
            continue;
        }
        out.push(' ');
        out.push_str(attr_name);
        match (value, dialect) {
            (Some(value), _) => {
                out.push_str("=\"");
                out.push_str(&encode_attribute(value));
                out.push('"');
            }
            // XHTML has no bare attribute form.
            (None, Dialect::Xhtml { .. }) => {
                out.push_str("=\"");
                out.push_str(attr_name);
                out.push('"');
            }
            (None, Dialect::Html) => {}
        }
    }

    if children.is_empty() && is_void_element(name) {
        match dialect {
            Dialect::Html => out.push('>'),
            Dialect::Xhtml { short_tags: true } => out.push_str(" />"),
            Dialect::Xhtml { short_tags: false } => {
                out.push('>');
                write_end_tag(out, name);
            }
        }
        return;
    }

    out.push('>');

    if children.is_empty() && is_block_element(name) {
        // Guarantee visible, focusable empty blocks after the round trip.
        out.push_str("&nbsp;");
    } else if name.eq_ignore_ascii_case("table") {
        write_table_children(out, children, dialect);
    } else {
        for child in children {
            write_node(out, child, dialect);
        }
    }

    write_end_tag(out, name);
}

fn write_end_tag(out: &mut String, name: &str) {
    out.push_str("</");
    out.push_str(name);
    out.push('>');
}

/// Wrap each maximal run of direct `<tr>` children in a synthesized
/// `<tbody>`; existing section elements pass through unchanged.
fn write_table_children(out: &mut String, children: &[Node], dialect: Dialect) {
    let mut in_tbody = false;
    for child in children {
        if child.is_element_named("tr") {
            if !in_tbody {
                out.push_str("<tbody>");
                in_tbody = true;
            }
            write_node(out, child, dialect);
            continue;
        }
        if in_tbody {
            out.push_str("</tbody>");
            in_tbody = false;
        }
        write_node(out, child, dialect);
    }
    if in_tbody {
        out.push_str("</tbody>");
    }
}

fn is_internal_attribute(name: &str) -> bool {
    name.eq_ignore_ascii_case(ORIGINAL_HREF_ATTR)
        || name.eq_ignore_ascii_case(ORIGINAL_SRC_ATTR)
        || name.eq_ignore_ascii_case(FILLER_ATTR)
        || name.eq_ignore_ascii_case(ANCHOR_NAME_ATTR)
}

fn is_anchor_placeholder(node: &Node) -> bool {
    node.is_element_named("img")
        && node.has_attribute(ANCHOR_NAME_ATTR)
        && node
            .get_attribute("class")
            .is_some_and(|c| c.split_whitespace().any(|t| t == ANCHOR_MARKER_CLASS))
}
