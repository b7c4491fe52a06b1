//! Shared helpers for editml tests: whitespace normalization for semantic
//! markup comparison, fixture tables for table-matrix cases, and line diffs
//! for readable assertion failures.

pub mod fixtures;

/// Normalize markup for semantic comparison: whitespace runs collapse to a
/// single space, whitespace between tags is dropped entirely, and the ends
/// are trimmed. Round trips are compared after this normalization, never
/// byte-for-byte.
pub fn normalize_markup(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(ch) = chars.next() {
        if !ch.is_whitespace() {
            out.push(ch);
            continue;
        }
        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        let between_tags = out.ends_with('>') && chars.peek() == Some(&'<');
        let at_edge = out.is_empty() || chars.peek().is_none();
        if !between_tags && !at_edge {
            out.push(' ');
        }
    }
    out
}

/// Render a focused diff around the first mismatching line.
pub fn diff_lines(expected: &[String], actual: &[String]) -> String {
    use std::fmt::Write;
    let max = expected.len().max(actual.len());
    let missing = "<missing>";
    let mismatch = (0..max).find(|&i| {
        expected.get(i).map(String::as_str).unwrap_or(missing)
            != actual.get(i).map(String::as_str).unwrap_or(missing)
    });
    let mut out = String::new();
    let Some(i) = mismatch else {
        out.push_str("no differences");
        return out;
    };
    let start = i.saturating_sub(2);
    let end = (i + 3).min(max);
    let _ = writeln!(
        &mut out,
        "first mismatch at line {} (showing {}..={}):",
        i + 1,
        start + 1,
        end
    );
    for line_idx in start..end {
        let left = expected.get(line_idx).map(String::as_str).unwrap_or(missing);
        let right = actual.get(line_idx).map(String::as_str).unwrap_or(missing);
        let marker = if line_idx == i { ">" } else { " " };
        let _ = writeln!(&mut out, "{marker} expected: {left}");
        let _ = writeln!(&mut out, "{marker} actual:   {right}");
    }
    out
}
