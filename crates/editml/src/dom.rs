//! Minimal DOM-like tree the editor core operates on.
//!
//! This is deliberately not a real DOM: no live collections, no events, no
//! layout. Any tree that provides children, tag names and attributes is
//! enough for serialization and table-matrix work, so the core carries its
//! own value-type tree and callers adapt at the edges.

pub type NodeId = u32;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Id(pub NodeId);

#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    Fragment {
        id: Id,
        children: Vec<Node>,
    },
    Element {
        id: Id,
        name: String,
        attributes: Vec<(String, Option<String>)>,
        children: Vec<Node>,
    },
    Text {
        id: Id,
        text: String,
    },
    Comment {
        id: Id,
        text: String,
    },
}

impl Node {
    pub fn fragment() -> Self {
        Node::Fragment {
            id: Id(0),
            children: Vec::new(),
        }
    }

    pub fn element(name: &str) -> Self {
        Node::Element {
            id: Id(0),
            name: name.to_string(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn text(text: &str) -> Self {
        Node::Text {
            id: Id(0),
            text: text.to_string(),
        }
    }

    pub fn id(&self) -> Id {
        match self {
            Node::Fragment { id, .. } => *id,
            Node::Element { id, .. } => *id,
            Node::Text { id, .. } => *id,
            Node::Comment { id, .. } => *id,
        }
    }

    pub fn set_id(&mut self, new_id: Id) {
        match self {
            Node::Fragment { id, .. } => *id = new_id,
            Node::Element { id, .. } => *id = new_id,
            Node::Text { id, .. } => *id = new_id,
            Node::Comment { id, .. } => *id = new_id,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Node::Element { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn is_element_named(&self, target: &str) -> bool {
        matches!(self, Node::Element { name, .. } if name.eq_ignore_ascii_case(target))
    }

    pub fn children(&self) -> &[Node] {
        match self {
            Node::Fragment { children, .. } | Node::Element { children, .. } => children,
            Node::Text { .. } | Node::Comment { .. } => &[],
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Fragment { children, .. } | Node::Element { children, .. } => Some(children),
            _ => None,
        }
    }

    pub fn append_child(&mut self, child: Node) {
        match self {
            Node::Fragment { children, .. } | Node::Element { children, .. } => {
                children.push(child);
            }
            _ => {}
        }
    }

    /// First value for `name`, matched case-insensitively. `None` for leaf
    /// nodes, absent attributes and valueless attributes alike.
    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        let Node::Element { attributes, .. } = self else {
            return None;
        };
        attributes
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .and_then(|(_, v)| v.as_deref())
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        matches!(self, Node::Element { attributes, .. }
            if attributes.iter().any(|(k, _)| k.eq_ignore_ascii_case(name)))
    }

    /// Set or replace `name`; replacement keeps the attribute's position.
    pub fn set_attribute(&mut self, name: &str, value: Option<&str>) {
        let Node::Element { attributes, .. } = self else {
            return;
        };
        let value = value.map(str::to_string);
        if let Some(slot) = attributes
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
        {
            slot.1 = value;
        } else {
            attributes.push((name.to_string(), value));
        }
    }

    pub fn remove_attribute(&mut self, name: &str) {
        if let Node::Element { attributes, .. } = self {
            attributes.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        }
    }

    /// Parse a span attribute (`rowspan`/`colspan`). Absent, empty or
    /// malformed values read as 1; declared zero clamps to 1.
    pub fn span_attribute(&self, name: &str) -> u32 {
        self.get_attribute(name)
            .and_then(|v| v.trim().parse::<u32>().ok())
            .map_or(1, |v| v.max(1))
    }
}

/// Elements with no content model; they never get an end tag in HTML output.
pub fn is_void_element(name: &str) -> bool {
    matches!(
        name.to_ascii_lowercase().as_str(),
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

/// Block-level elements for empty-block placeholder handling.
pub fn is_block_element(name: &str) -> bool {
    matches!(
        name.to_ascii_lowercase().as_str(),
        "p" | "div"
            | "blockquote"
            | "pre"
            | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "li"
            | "td"
            | "th"
            | "caption"
    )
}

pub fn assign_node_ids(root: &mut Node) {
    fn max_id(node: &Node) -> NodeId {
        let mut max = node.id().0;
        for c in node.children() {
            max = max.max(max_id(c));
        }
        max
    }

    fn walk(node: &mut Node, next: &mut NodeId) {
        // only assign if currently unset
        if node.id() == Id(0) {
            node.set_id(Id(*next));
            *next = next.wrapping_add(1);
        }
        if let Some(children) = node.children_mut() {
            for c in children {
                walk(c, next);
            }
        }
    }

    // Fresh ids start past every pre-assigned id so lookups stay unambiguous.
    let mut next = max_id(root).wrapping_add(1).max(1);
    walk(root, &mut next);
}

pub fn find_node_by_id(node: &Node, id: Id) -> Option<&Node> {
    if node.id() == id {
        return Some(node);
    }
    for c in node.children() {
        if let Some(found) = find_node_by_id(c, id) {
            return Some(found);
        }
    }
    None
}

pub fn find_node_by_id_mut(node: &mut Node, id: Id) -> Option<&mut Node> {
    if node.id() == id {
        return Some(node);
    }
    if let Some(children) = node.children_mut() {
        for c in children {
            if let Some(found) = find_node_by_id_mut(c, id) {
                return Some(found);
            }
        }
    }
    None
}
