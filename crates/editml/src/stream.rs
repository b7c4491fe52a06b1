//! Streaming HTML transform.
//!
//! `parse_html` scans the input left-to-right exactly once, classifies each
//! token (start tag, end tag, processing/comment tag, text run) and hands it
//! to a [`TokenTransform`]. Whatever string the transform returns is appended
//! to the overall result, so the parser is a generic map over the token
//! stream rather than a reporter.
//!
//! Invariants:
//! - No schema or validity checking: unknown tags, mismatched nesting and
//!   unclosed tags pass through; the parser never panics.
//! - Self-closing tags are start tags; no end tags are synthesized here.
//! - Comments and markup declarations reach the transform whole, delimiters
//!   included; their content is not tokenized further.
//! - Slice endpoints always land on UTF-8 char boundaries: slices are cut at
//!   ASCII structural bytes only.

use crate::tag::{ParsedTag, parse_tag};
use memchr::memchr;

const COMMENT_START: &str = "<!--";
const COMMENT_END: &str = "-->";
const PI_START: &str = "<?";
const PI_END: &str = "?>";

/// Per-token replacement callbacks. Defaults reproduce the source text, so
/// an implementation only overrides the token classes it rewrites.
pub trait TokenTransform {
    /// A start tag (self-closing included). `raw` is the verbatim `<...>`
    /// source slice the tag was parsed from.
    fn on_tag_start(&mut self, tag: &ParsedTag, raw: &str) -> String {
        let _ = tag;
        raw.to_string()
    }

    fn on_tag_end(&mut self, name: &str, raw: &str) -> String {
        let _ = name;
        raw.to_string()
    }

    /// A comment (`<!-- -->`), markup declaration (`<!...>`) or processing
    /// instruction (`<?...?>`), delimiters included.
    fn on_processing_tag(&mut self, raw: &str) -> String {
        raw.to_string()
    }

    /// A text run, verbatim (entities included). Inline whitespace and
    /// newlines between tags arrive here too.
    fn on_html_text(&mut self, text: &str) -> String {
        text.to_string()
    }
}

/// Transform that rebuilds the input unchanged.
#[derive(Clone, Copy, Debug, Default)]
pub struct IdentityTransform;

impl TokenTransform for IdentityTransform {}

/// Scan `input` once and concatenate the transform's replacement strings in
/// document order.
pub fn parse_html(input: &str, transform: &mut impl TokenTransform) -> String {
    let bytes = input.as_bytes();
    let len = bytes.len();
    let mut out = String::with_capacity(len);
    let mut i = 0;

    while i < len {
        if bytes[i] != b'<' {
            let end = memchr(b'<', &bytes[i..]).map_or(len, |rel| i + rel);
            debug_assert!(input.is_char_boundary(i));
            debug_assert!(input.is_char_boundary(end));
            log::trace!(target: "editml.stream", "text run {}..{}", i, end);
            out.push_str(&transform.on_html_text(&input[i..end]));
            i = end;
            continue;
        }

        if input[i..].starts_with(COMMENT_START) {
            let body_start = i + COMMENT_START.len();
            let end = match input[body_start..].find(COMMENT_END) {
                Some(rel) => body_start + rel + COMMENT_END.len(),
                // Unterminated comment: pass the remainder through whole.
                None => len,
            };
            log::trace!(target: "editml.stream", "comment {}..{}", i, end);
            out.push_str(&transform.on_processing_tag(&input[i..end]));
            i = end;
            continue;
        }

        if input[i..].starts_with(PI_START) {
            let body_start = i + PI_START.len();
            let end = match input[body_start..].find(PI_END) {
                Some(rel) => body_start + rel + PI_END.len(),
                None => len,
            };
            log::trace!(target: "editml.stream", "processing instruction {}..{}", i, end);
            out.push_str(&transform.on_processing_tag(&input[i..end]));
            i = end;
            continue;
        }

        if i + 1 < len && bytes[i + 1] == b'!' {
            // markup declaration, e.g. <!DOCTYPE html>
            let end = memchr(b'>', &bytes[i..]).map_or(len, |rel| i + rel + 1);
            log::trace!(target: "editml.stream", "markup declaration {}..{}", i, end);
            out.push_str(&transform.on_processing_tag(&input[i..end]));
            i = end;
            continue;
        }

        if i + 1 < len && bytes[i + 1] == b'/' {
            let name_start = i + 2;
            let mut j = name_start;
            while j < len && is_name_char(bytes[j]) {
                j += 1;
            }
            if j > name_start {
                debug_assert!(input.is_char_boundary(j));
                let name = &input[name_start..j];
                while j < len && bytes[j] != b'>' {
                    j += 1;
                }
                let end = (j + 1).min(len);
                log::trace!(target: "editml.stream", "end tag </{}>", name);
                out.push_str(&transform.on_tag_end(name, &input[i..end]));
                i = end;
                continue;
            }
            // `</>` or `</ ...`: not a tag, fall through to text handling.
        }

        let parsed = find_tag_close(bytes, i)
            .and_then(|end| parse_tag(&input[i..end]).map(|tag| (end, tag)));
        match parsed {
            Some((end, tag)) => {
                log::trace!(target: "editml.stream", "start tag <{}>", tag.name);
                out.push_str(&transform.on_tag_start(&tag, &input[i..end]));
                i = end;
            }
            None => {
                // A '<' that opens no recognizable token is plain text up to
                // the next '<'.
                let end = memchr(b'<', &bytes[i + 1..]).map_or(len, |rel| i + 1 + rel);
                debug_assert!(input.is_char_boundary(end));
                out.push_str(&transform.on_html_text(&input[i..end]));
                i = end;
            }
        }
    }

    out
}

fn is_name_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'-' || c == b'_' || c == b':'
}

/// Byte index one past the `>` closing the tag opened at `start`, honoring
/// quoted attribute values that contain `>`. A quote only opens a value when
/// it directly follows `=` (whitespace allowed), matching the tag parser's
/// tokenization; a stray apostrophe mid-value is just a byte.
fn find_tag_close(bytes: &[u8], start: usize) -> Option<usize> {
    debug_assert!(bytes[start] == b'<');
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'>' => return Some(i + 1),
            b'=' => {
                i += 1;
                while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                    i += 1;
                }
                if i < bytes.len() && (bytes[i] == b'"' || bytes[i] == b'\'') {
                    let quote = bytes[i];
                    i += 1;
                    while i < bytes.len() && bytes[i] != quote {
                        i += 1;
                    }
                    if i >= bytes.len() {
                        return None;
                    }
                    i += 1;
                }
            }
            _ => i += 1,
        }
    }
    None
}
