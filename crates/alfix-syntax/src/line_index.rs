//! Offset to line/column conversion.
//!
//! Columns are counted in UTF-16 code units, matching editor positions.

use text_size::{TextRange, TextSize};

/// Zero-based line and UTF-16 column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct LineCol {
    /// Zero-based line.
    pub line: u32,
    /// Zero-based column in UTF-16 code units.
    pub col: u32,
}

/// Line start table for one text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    line_starts: Vec<TextSize>,
    len: TextSize,
}

impl LineIndex {
    /// Builds the index. `\r\n`, `\n` and a lone `\r` all end a line.
    #[must_use]
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![TextSize::from(0)];
        let bytes = text.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'\r' if bytes.get(i + 1) == Some(&b'\n') => {
                    i += 2;
                    line_starts.push(TextSize::from(i as u32));
                    continue;
                }
                b'\r' | b'\n' => line_starts.push(TextSize::from((i + 1) as u32)),
                _ => {}
            }
            i += 1;
        }
        Self {
            line_starts,
            len: TextSize::of(text),
        }
    }

    /// Number of lines (a trailing line break opens an empty last line).
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Start offset of `line`, if it exists.
    #[must_use]
    pub fn line_start(&self, line: u32) -> Option<TextSize> {
        self.line_starts.get(line as usize).copied()
    }

    /// Converts an offset to a line/column pair. Offsets past the end clamp
    /// to the end of the text.
    #[must_use]
    pub fn line_col(&self, text: &str, offset: TextSize) -> LineCol {
        let offset = offset.min(self.len);
        let line = self
            .line_starts
            .partition_point(|start| *start <= offset)
            .saturating_sub(1);
        let start = self.line_starts[line];
        let col = text[TextRange::new(start, offset)]
            .chars()
            .map(|c| c.len_utf16() as u32)
            .sum();
        LineCol {
            line: line as u32,
            col,
        }
    }

    /// Converts a line/column pair back to an offset. A column past the end
    /// of the line clamps to the line end; an unknown line yields `None`.
    #[must_use]
    pub fn offset(&self, text: &str, position: LineCol) -> Option<TextSize> {
        let start = self.line_start(position.line)?;
        let end = self
            .line_start(position.line + 1)
            .unwrap_or(self.len);
        let line_text = &text[TextRange::new(start, end)];

        let mut utf16 = 0u32;
        for (i, c) in line_text.char_indices() {
            if utf16 >= position.col || c == '\r' || c == '\n' {
                return Some(start + TextSize::from(i as u32));
            }
            utf16 += c.len_utf16() as u32;
        }
        Some(end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_col_round_trip_on_mixed_line_endings() {
        let text = "ab\r\ncd\nef";
        let index = LineIndex::new(text);
        assert_eq!(index.line_count(), 3);
        assert_eq!(
            index.line_col(text, TextSize::from(5)),
            LineCol { line: 1, col: 1 }
        );
        assert_eq!(
            index.offset(text, LineCol { line: 2, col: 1 }),
            Some(TextSize::from(8))
        );
    }

    #[test]
    fn test_columns_count_utf16_units() {
        let text = "x := '😀';";
        let index = LineIndex::new(text);
        let semicolon = TextSize::from(text.find(';').unwrap() as u32);
        assert_eq!(index.line_col(text, semicolon).col, 9);
        assert_eq!(index.offset(text, LineCol { line: 0, col: 9 }), Some(semicolon));
    }

    #[test]
    fn test_column_past_line_end_clamps() {
        let text = "ab\ncd";
        let index = LineIndex::new(text);
        assert_eq!(
            index.offset(text, LineCol { line: 0, col: 40 }),
            Some(TextSize::from(2))
        );
        assert_eq!(index.offset(text, LineCol { line: 7, col: 0 }), None);
    }
}
