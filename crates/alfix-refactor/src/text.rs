//! Line and indentation helpers for edit synthesis.

use text_size::{TextRange, TextSize};

/// Indentation step added for one nesting level.
pub const INDENT_UNIT: &str = "    ";

/// Line break used by `text`: CRLF when the document already uses it.
#[must_use]
pub fn newline_for(text: &str) -> &'static str {
    if text.contains("\r\n") {
        "\r\n"
    } else {
        "\n"
    }
}

/// Indentation unit matching `indent`.
#[must_use]
pub fn indent_unit_for(indent: &str) -> &'static str {
    if indent.contains('\t') {
        "\t"
    } else {
        INDENT_UNIT
    }
}

/// Start of the line containing `offset`.
#[must_use]
pub fn line_start(text: &str, offset: TextSize) -> TextSize {
    let offset = usize::from(offset).min(text.len());
    let start = text.as_bytes()[..offset]
        .iter()
        .rposition(|&b| b == b'\n' || b == b'\r')
        .map_or(0, |i| i + 1);
    TextSize::from(start as u32)
}

/// Leading whitespace of the line containing `offset`.
#[must_use]
pub fn line_indent_at_offset(text: &str, offset: TextSize) -> String {
    let start = usize::from(line_start(text, offset));
    let indent_len = text[start..]
        .bytes()
        .take_while(|&b| b == b' ' || b == b'\t')
        .count();
    text[start..start + indent_len].to_string()
}

/// Returns `true` if only whitespace precedes `offset` on its line.
#[must_use]
pub fn is_first_on_line(text: &str, offset: TextSize) -> bool {
    let start = line_start(text, offset);
    text[TextRange::new(start, offset)]
        .bytes()
        .all(|b| b == b' ' || b == b'\t')
}

/// Returns `true` if `text` ends a line right before `offset`.
#[must_use]
pub fn at_line_start(text: &str, offset: TextSize) -> bool {
    let offset = usize::from(offset);
    offset == 0 || matches!(text.as_bytes().get(offset - 1), Some(b'\n' | b'\r'))
}

/// Widens `range` to whole lines when nothing else shares them.
///
/// The start moves back over the indentation and the end moves past
/// trailing blanks and one line break. A side that shares its line with
/// other code stays where it is.
#[must_use]
pub fn whole_lines_range(text: &str, range: TextRange) -> TextRange {
    let start = if is_first_on_line(text, range.start()) {
        line_start(text, range.start())
    } else {
        range.start()
    };

    let bytes = text.as_bytes();
    let mut end = usize::from(range.end());
    while end < bytes.len() && (bytes[end] == b' ' || bytes[end] == b'\t') {
        end += 1;
    }
    let end = match bytes.get(end) {
        Some(b'\r') if bytes.get(end + 1) == Some(&b'\n') => end + 2,
        Some(b'\n' | b'\r') => end + 1,
        None => end,
        Some(_) => usize::from(range.end()),
    };

    TextRange::new(start, TextSize::from(end as u32))
}

/// Re-indents a block of lines from `from_indent` to `to_indent`.
///
/// Lines that start with `from_indent` keep their deeper relative
/// indentation; other lines are trimmed and re-indented.
#[must_use]
pub fn reindent_block(block: &str, from_indent: &str, to_indent: &str, newline: &str) -> String {
    let mut out = Vec::new();
    for line in block.lines() {
        if line.trim().is_empty() {
            out.push(String::new());
        } else if let Some(rest) = line.strip_prefix(from_indent) {
            out.push(format!("{to_indent}{rest}"));
        } else {
            out.push(format!("{to_indent}{}", line.trim_start()));
        }
    }
    out.join(newline)
}

/// Shrinks `range` to exclude surrounding whitespace.
#[must_use]
pub fn trim_range_to_non_whitespace(text: &str, range: TextRange) -> Option<TextRange> {
    let mut start = usize::from(range.start());
    let mut end = usize::from(range.end()).min(text.len());
    if start >= end {
        return None;
    }
    let bytes = text.as_bytes();
    while start < end && bytes[start].is_ascii_whitespace() {
        start += 1;
    }
    while end > start && bytes[end - 1].is_ascii_whitespace() {
        end -= 1;
    }
    if start >= end {
        None
    } else {
        Some(TextRange::new(
            TextSize::from(start as u32),
            TextSize::from(end as u32),
        ))
    }
}

/// Picks `base`, or `base` with the smallest numeric suffix from 2 up, that
/// `is_taken` rejects.
pub fn unique_name(base: &str, mut is_taken: impl FnMut(&str) -> bool) -> String {
    if !is_taken(base) {
        return base.to_string();
    }
    (2u32..)
        .map(|n| format!("{base}{n}"))
        .find(|candidate| !is_taken(candidate))
        .unwrap_or_else(|| base.to_string())
}
