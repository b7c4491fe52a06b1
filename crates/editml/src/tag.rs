//! Single start-tag parsing.
//!
//! `parse_tag` takes one `<...>` fragment and extracts the tag name and an
//! attribute map. It is the building block the stream parser hands start
//! tags through, but it is also usable on its own for attribute inspection.
//!
//! Contract:
//! - Attribute map keys are ASCII-lowercased; the record keeps the original
//!   casing of both the name and the value.
//! - Values are verbatim source text with surrounding quotes stripped,
//!   except that quoted values invert the minimal `&amp;`/`&quot;` escaping
//!   `canonical()` emits; general entity decoding happens at the tree layer.
//! - Valueless attributes carry `None`.
//! - Duplicate attribute names resolve last-write-wins.
//! - Malformed attribute fragments are skipped; the parser never panics.

use std::collections::BTreeMap;

/// One parsed attribute, original casing preserved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TagAttribute {
    pub name: String,
    pub value: Option<String>,
}

/// A parsed start tag. The map key is the ASCII-lowercased attribute name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedTag {
    pub name: String,
    pub attributes: BTreeMap<String, TagAttribute>,
}

impl ParsedTag {
    pub fn attribute(&self, name: &str) -> Option<&TagAttribute> {
        self.attributes.get(&name.to_ascii_lowercase())
    }

    pub fn attribute_value(&self, name: &str) -> Option<&str> {
        self.attribute(name).and_then(|a| a.value.as_deref())
    }

    /// Render the minimal canonical form `<name key="value" bool>`.
    ///
    /// Values are always double-quoted, with embedded `&` and `"` escaped,
    /// so the output re-parses to an equal attribute map for any value.
    pub fn canonical(&self) -> String {
        let mut out = String::with_capacity(self.name.len() + 2);
        out.push('<');
        out.push_str(&self.name);
        for (key, attribute) in &self.attributes {
            out.push(' ');
            out.push_str(key);
            if let Some(value) = &attribute.value {
                out.push_str("=\"");
                out.push_str(&escape_value(value));
                out.push('"');
            }
        }
        out.push('>');
        out
    }
}

fn is_name_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'-' || c == b'_' || c == b':'
}

// The `&` pass must come first so the `&` of `&quot;` is not re-escaped.
fn escape_value(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}

// Inverse of `escape_value`; `&quot;` first so `&amp;quot;` decodes to the
// literal `&quot;` the source carried.
fn unescape_value(value: &str) -> String {
    value.replace("&quot;", "\"").replace("&amp;", "&")
}

/// Parse one start-tag fragment. Returns `None` when the text is not a
/// well-formed start tag: no leading `<`, no tag name, or an end-tag /
/// markup-declaration / processing-instruction form.
pub fn parse_tag(tag_text: &str) -> Option<ParsedTag> {
    let input = tag_text.trim_start();
    let bytes = input.as_bytes();
    if bytes.first() != Some(&b'<') {
        return None;
    }

    let name_start = 1;
    let mut i = name_start;
    while i < bytes.len() && is_name_char(bytes[i]) {
        i += 1;
    }
    if i == name_start {
        // `</x>`, `<!...>`, `<?...>`, `<>`, bare `<`.
        return None;
    }
    debug_assert!(input.is_char_boundary(i));
    let name = input[name_start..i].to_string();

    let mut attributes = BTreeMap::new();
    let len = bytes.len();

    let skip_whitespace = |i: &mut usize| {
        while *i < len && bytes[*i].is_ascii_whitespace() {
            *i += 1;
        }
    };

    loop {
        skip_whitespace(&mut i);
        if i >= len || bytes[i] == b'>' {
            break;
        }
        if bytes[i] == b'/' {
            // self-closing marker (or stray slash); carries no attribute data
            i += 1;
            continue;
        }
        let attr_start = i;
        while i < len && is_name_char(bytes[i]) {
            i += 1;
        }
        if attr_start == i {
            // not an attribute name; skip the byte and keep going
            i += 1;
            continue;
        }
        debug_assert!(input.is_char_boundary(attr_start));
        debug_assert!(input.is_char_boundary(i));
        let attr_name = &input[attr_start..i];

        skip_whitespace(&mut i);
        let value: Option<String>;
        if i < len && bytes[i] == b'=' {
            i += 1;
            skip_whitespace(&mut i);
            if i < len && (bytes[i] == b'"' || bytes[i] == b'\'') {
                let quote = bytes[i];
                i += 1;
                let vstart = i;
                while i < len && bytes[i] != quote {
                    i += 1;
                }
                debug_assert!(input.is_char_boundary(vstart));
                debug_assert!(input.is_char_boundary(i));
                let raw = &input[vstart..i];
                value = Some(if raw.contains('&') {
                    unescape_value(raw)
                } else {
                    raw.to_string()
                });
                if i < len {
                    i += 1;
                }
            } else {
                let vstart = i;
                while i < len && !bytes[i].is_ascii_whitespace() && bytes[i] != b'>' {
                    if bytes[i] == b'/' && i + 1 < len && bytes[i + 1] == b'>' {
                        break;
                    }
                    i += 1;
                }
                debug_assert!(input.is_char_boundary(vstart));
                debug_assert!(input.is_char_boundary(i));
                value = Some(input[vstart..i].to_string());
            }
        } else {
            value = None;
        }

        attributes.insert(
            attr_name.to_ascii_lowercase(),
            TagAttribute {
                name: attr_name.to_string(),
                value,
            },
        );
    }

    Some(ParsedTag { name, attributes })
}
