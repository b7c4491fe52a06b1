//! Deterministic tree snapshots and structural equality for tests.
//! Not a public stable format; intended for internal test comparisons.
//!
//! Equivalence rules:
//! - Node kinds must match.
//! - Element names must match; attribute list order is significant.
//! - Text and comments must match exactly (post entity decode).
//! - Node ids can be ignored by options (the default).

use crate::dom::Node;
use std::fmt::{self, Write};
use std::sync::OnceLock;

#[derive(Clone, Copy, Debug)]
pub struct SnapshotOptions {
    pub ignore_ids: bool,
}

impl Default for SnapshotOptions {
    fn default() -> Self {
        Self { ignore_ids: true }
    }
}

#[derive(Debug)]
pub struct DomSnapshot {
    lines: Vec<String>,
}

impl DomSnapshot {
    pub fn new(root: &Node, options: SnapshotOptions) -> Self {
        let mut lines = Vec::new();
        walk_snapshot(root, &options, 0, &mut lines);
        Self { lines }
    }

    pub fn as_lines(&self) -> &[String] {
        &self.lines
    }

    pub fn render(&self) -> String {
        self.lines.join("\n")
    }
}

#[derive(Debug)]
pub struct DomMismatch<'a> {
    path: String,
    detail: String,
    expected: String,
    actual: String,
    expected_node: &'a Node,
    actual_node: &'a Node,
    options: SnapshotOptions,
    expected_subtree: OnceLock<String>,
    actual_subtree: OnceLock<String>,
}

impl fmt::Display for DomMismatch<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let expected_subtree = self
            .expected_subtree
            .get_or_init(|| DomSnapshot::new(self.expected_node, self.options).render());
        let actual_subtree = self
            .actual_subtree
            .get_or_init(|| DomSnapshot::new(self.actual_node, self.options).render());
        writeln!(f, "tree mismatch at {}: {}", self.path, self.detail)?;
        writeln!(f, "expected: {}", self.expected)?;
        writeln!(f, "actual:   {}", self.actual)?;
        writeln!(f, "expected subtree:\n{expected_subtree}")?;
        writeln!(f, "actual subtree:\n{actual_subtree}")?;
        Ok(())
    }
}

impl std::error::Error for DomMismatch<'_> {}

pub fn assert_dom_eq(expected: &Node, actual: &Node, options: SnapshotOptions) {
    if let Err(mismatch) = compare_dom(expected, actual, options) {
        panic!("{mismatch}");
    }
}

pub fn compare_dom<'a>(
    expected: &'a Node,
    actual: &'a Node,
    options: SnapshotOptions,
) -> Result<(), Box<DomMismatch<'a>>> {
    let mut path = vec![node_label(expected)];
    compare_nodes(expected, actual, &options, &mut path)
}

fn compare_nodes<'a>(
    expected: &'a Node,
    actual: &'a Node,
    options: &SnapshotOptions,
    path: &mut Vec<String>,
) -> Result<(), Box<DomMismatch<'a>>> {
    if !options.ignore_ids && expected.id() != actual.id() {
        return Err(Box::new(mismatch(path, "node id", expected, actual, options)));
    }
    match (expected, actual) {
        (Node::Fragment { .. }, Node::Fragment { .. }) => {
            compare_children(expected, actual, options, path)
        }
        (
            Node::Element {
                name: expected_name,
                attributes: expected_attrs,
                ..
            },
            Node::Element {
                name: actual_name,
                attributes: actual_attrs,
                ..
            },
        ) => {
            if expected_name != actual_name {
                return Err(Box::new(mismatch(
                    path,
                    "element name",
                    expected,
                    actual,
                    options,
                )));
            }
            if expected_attrs.len() != actual_attrs.len() {
                return Err(Box::new(mismatch(
                    path,
                    "attribute count",
                    expected,
                    actual,
                    options,
                )));
            }
            for (i, (exp, act)) in expected_attrs.iter().zip(actual_attrs.iter()).enumerate() {
                if exp != act {
                    return Err(Box::new(mismatch(
                        path,
                        &format!("attribute at index {i}"),
                        expected,
                        actual,
                        options,
                    )));
                }
            }
            compare_children(expected, actual, options, path)
        }
        (
            Node::Text {
                text: expected_text,
                ..
            },
            Node::Text {
                text: actual_text, ..
            },
        ) => {
            if expected_text != actual_text {
                return Err(Box::new(mismatch(path, "text", expected, actual, options)));
            }
            Ok(())
        }
        (
            Node::Comment {
                text: expected_text,
                ..
            },
            Node::Comment {
                text: actual_text, ..
            },
        ) => {
            if expected_text != actual_text {
                return Err(Box::new(mismatch(
                    path, "comment", expected, actual, options,
                )));
            }
            Ok(())
        }
        _ => Err(Box::new(mismatch(
            path,
            "node kind",
            expected,
            actual,
            options,
        ))),
    }
}

fn compare_children<'a>(
    expected_parent: &'a Node,
    actual_parent: &'a Node,
    options: &SnapshotOptions,
    path: &mut Vec<String>,
) -> Result<(), Box<DomMismatch<'a>>> {
    let expected = expected_parent.children();
    let actual = actual_parent.children();
    if expected.len() != actual.len() {
        return Err(Box::new(mismatch(
            path,
            &format!(
                "child count (expected {}, actual {})",
                expected.len(),
                actual.len()
            ),
            expected_parent,
            actual_parent,
            options,
        )));
    }
    for (idx, (exp, act)) in expected.iter().zip(actual.iter()).enumerate() {
        path.push(format!("{}[{}]", node_label(exp), idx));
        let result = compare_nodes(exp, act, options, path);
        path.pop();
        result?;
    }
    Ok(())
}

fn mismatch<'a>(
    path: &[String],
    detail: &str,
    expected: &'a Node,
    actual: &'a Node,
    options: &SnapshotOptions,
) -> DomMismatch<'a> {
    let path = format!("/{}", path.join("/"));
    DomMismatch {
        path,
        detail: detail.to_string(),
        expected: truncate_line(format_node_line(expected), 160),
        actual: truncate_line(format_node_line(actual), 160),
        expected_node: expected,
        actual_node: actual,
        options: *options,
        expected_subtree: OnceLock::new(),
        actual_subtree: OnceLock::new(),
    }
}

fn node_label(node: &Node) -> String {
    match node {
        Node::Fragment { .. } => "#fragment".to_string(),
        Node::Element { name, .. } => {
            let mut label = name.clone();
            if let Some(id_value) = node.get_attribute("id").filter(|v| !v.is_empty()) {
                label.push('#');
                write_escaped(&mut label, id_value);
            }
            label
        }
        Node::Text { .. } => "#text".to_string(),
        Node::Comment { .. } => "#comment".to_string(),
    }
}

fn truncate_line(mut line: String, max_len: usize) -> String {
    if line.len() > max_len {
        line.truncate(max_len.saturating_sub(3));
        line.push_str("...");
    }
    line
}

fn walk_snapshot(node: &Node, options: &SnapshotOptions, indent: usize, out: &mut Vec<String>) {
    let mut line = " ".repeat(indent * 2);
    line.push_str(&format_node_line(node));
    if !options.ignore_ids {
        let _ = write!(line, " id={}", node.id().0);
    }
    out.push(line);
    for child in node.children() {
        walk_snapshot(child, options, indent + 1, out);
    }
}

fn format_node_line(node: &Node) -> String {
    let mut out = String::new();
    match node {
        Node::Fragment { .. } => out.push_str("#fragment"),
        Node::Element {
            name, attributes, ..
        } => {
            out.push('<');
            out.push_str(name);
            for (attr, value) in attributes {
                out.push(' ');
                out.push_str(attr);
                if let Some(value) = value {
                    out.push_str("=\"");
                    write_escaped(&mut out, value);
                    out.push('"');
                }
            }
            out.push('>');
        }
        Node::Text { text, .. } => {
            out.push('"');
            write_escaped(&mut out, text);
            out.push('"');
        }
        Node::Comment { text, .. } => {
            out.push_str("<!-- ");
            write_escaped(&mut out, text);
            out.push_str(" -->");
        }
    }
    out
}

fn write_escaped(out: &mut String, value: &str) {
    for ch in value.chars() {
        match ch {
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            _ if ch.is_ascii() => out.push(ch),
            _ => {
                let _ = write!(out, "\\u{{{:X}}}", ch as u32);
            }
        }
    }
}
