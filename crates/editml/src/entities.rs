//! Minimal entity decoding/encoding for editor content.
//!
//! Contract:
//! - Named entities decoded: `&amp;`, `&lt;`, `&gt;`, `&quot;`, `&apos;`, `&nbsp;`.
//! - Numeric entities decoded only when well-formed and semicolon-terminated:
//!   `&#160;` (decimal) and `&#xA0;` (hex). Only valid Unicode scalar values
//!   decode; everything else passes through unchanged.
//! - Encoding is the serializer's inverse for the required set only: `&`, `<`,
//!   `>` and U+00A0 in text, plus `"` in attribute values. All other
//!   characters are written verbatim.
//!
//! This is intentionally not HTML5-spec-complete. Keep the behavior narrow and
//! stable.

const NAMED: [(&str, char); 6] = [
    ("&amp;", '&'),
    ("&lt;", '<'),
    ("&gt;", '>'),
    ("&quot;", '"'),
    ("&apos;", '\''),
    ("&nbsp;", '\u{00A0}'),
];

// 0x10FFFF and 1114111.
const MAX_HEX_DIGITS: usize = 6;
const MAX_DEC_DIGITS: usize = 7;

/// Find the `;` closing a numeric entity, with a bounded digit scan so
/// adversarial input cannot trigger quadratic rescans.
fn numeric_entity_end(bytes: &[u8], start: usize, max_digits: usize, is_hex: bool) -> Option<usize> {
    let mut digits = 0usize;
    for (offset, &b) in bytes[start..].iter().enumerate() {
        if b == b';' {
            return (digits > 0).then_some(start + offset);
        }
        if digits == max_digits {
            return None;
        }
        let ok = if is_hex {
            b.is_ascii_hexdigit()
        } else {
            b.is_ascii_digit()
        };
        if !ok {
            return None;
        }
        digits += 1;
    }
    None
}

pub(crate) fn decode_entities(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = String::with_capacity(s.len());
    let mut i = 0;
    let mut copy_start = 0;

    'scan: while i < bytes.len() {
        if bytes[i] != b'&' {
            i += 1;
            continue;
        }

        // Flush bytes up to '&' unchanged (preserves UTF-8).
        if copy_start < i {
            out.push_str(&s[copy_start..i]);
        }

        for (name, ch) in NAMED {
            if s[i..].starts_with(name) {
                out.push(ch);
                i += name.len();
                copy_start = i;
                continue 'scan;
            }
        }

        let (digits_start, is_hex, max_digits) =
            if s[i..].starts_with("&#x") || s[i..].starts_with("&#X") {
                (i + 3, true, MAX_HEX_DIGITS)
            } else if s[i..].starts_with("&#") {
                (i + 2, false, MAX_DEC_DIGITS)
            } else {
                // Unknown name; keep the '&' as-is and resume after it.
                out.push('&');
                i += 1;
                copy_start = i;
                continue;
            };

        let Some(end) = numeric_entity_end(bytes, digits_start, max_digits, is_hex) else {
            out.push('&');
            i += 1;
            copy_start = i;
            continue;
        };

        let radix = if is_hex { 16 } else { 10 };
        let decoded = u32::from_str_radix(&s[digits_start..end], radix)
            .ok()
            .and_then(char::from_u32);
        match decoded {
            Some(ch) => out.push(ch),
            // Well-formed but not a scalar value; preserve the sequence whole.
            None => out.push_str(&s[i..=end]),
        }
        i = end + 1;
        copy_start = i;
    }

    if copy_start < bytes.len() {
        out.push_str(&s[copy_start..]);
    }

    out
}

/// Encode text content for markup output: `&`, `<`, `>` and non-breaking
/// spaces become entities, everything else passes through verbatim.
pub(crate) fn encode_text(s: &str) -> String {
    encode(s, false)
}

/// Encode an attribute value for double-quoted markup output.
pub(crate) fn encode_attribute(s: &str) -> String {
    encode(s, true)
}

fn encode(s: &str, quote: bool) -> String {
    let mut out = String::with_capacity(s.len());
    let mut copy_start = 0;
    for (i, ch) in s.char_indices() {
        let replacement = match ch {
            '&' => "&amp;",
            '<' => "&lt;",
            '>' => "&gt;",
            '\u{00A0}' => "&nbsp;",
            '"' if quote => "&quot;",
            _ => continue,
        };
        if copy_start < i {
            out.push_str(&s[copy_start..i]);
        }
        out.push_str(replacement);
        copy_start = i + ch.len_utf8();
    }
    if copy_start == 0 {
        return s.to_string();
    }
    if copy_start < s.len() {
        out.push_str(&s[copy_start..]);
    }
    out
}
