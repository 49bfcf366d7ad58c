//! Text edits and multi-document change sets.
//!
//! Every edit range is an offset range into the original, unedited text.
//! A batch is applied back to front so earlier edits never shift later ones.

use std::collections::BTreeMap;

use alfix_syntax::DocumentId;
use text_size::{TextRange, TextSize};

use crate::error::EditError;

/// A text edit representing a change to the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    /// The range to replace.
    pub range: TextRange,
    /// The new text.
    pub new_text: String,
}

impl TextEdit {
    /// Inserts `text` at `offset`.
    #[must_use]
    pub fn insert(offset: TextSize, text: impl Into<String>) -> Self {
        Self {
            range: TextRange::empty(offset),
            new_text: text.into(),
        }
    }

    /// Deletes `range`.
    #[must_use]
    pub fn delete(range: TextRange) -> Self {
        Self {
            range,
            new_text: String::new(),
        }
    }

    /// Replaces `range` with `text`.
    #[must_use]
    pub fn replace(range: TextRange, text: impl Into<String>) -> Self {
        Self {
            range,
            new_text: text.into(),
        }
    }

    /// Returns `true` for a pure insertion.
    #[must_use]
    pub fn is_insert(&self) -> bool {
        self.range.is_empty()
    }
}

/// Edits grouped per document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceChange {
    /// Edits by document.
    pub edits: BTreeMap<DocumentId, Vec<TextEdit>>,
}

impl SourceChange {
    /// Creates an empty change.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a change holding `edits` for one document.
    #[must_use]
    pub fn from_edits(document: DocumentId, edits: Vec<TextEdit>) -> Self {
        let mut change = Self::new();
        change.extend(document, edits);
        change
    }

    /// Adds an edit for a document.
    pub fn add_edit(&mut self, document: DocumentId, edit: TextEdit) {
        self.edits.entry(document).or_default().push(edit);
    }

    /// Adds several edits for a document.
    pub fn extend(&mut self, document: DocumentId, edits: impl IntoIterator<Item = TextEdit>) {
        let mut edits = edits.into_iter().peekable();
        if edits.peek().is_some() {
            self.edits.entry(document).or_default().extend(edits);
        }
    }

    /// Edits for one document, in the order they were added.
    #[must_use]
    pub fn edits_for(&self, document: DocumentId) -> &[TextEdit] {
        self.edits.get(&document).map_or(&[], Vec::as_slice)
    }

    /// Returns the total number of edits.
    #[must_use]
    pub fn edit_count(&self) -> usize {
        self.edits.values().map(Vec::len).sum()
    }

    /// Returns `true` if there is nothing to apply.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edit_count() == 0
    }
}

/// Applies a batch of edits computed against `text`.
///
/// Insertions at the same offset keep their batch order. Overlapping edits
/// are rejected instead of producing a corrupted text.
pub fn apply_edits(text: &str, edits: &[TextEdit]) -> Result<String, EditError> {
    let len = TextSize::of(text);
    let mut sorted: Vec<&TextEdit> = edits.iter().collect();
    sorted.sort_by_key(|edit| (edit.range.start(), edit.range.end()));

    for edit in &sorted {
        if edit.range.end() > len {
            return Err(EditError::OutOfBounds {
                range: edit.range,
                len: len.into(),
            });
        }
    }
    for pair in sorted.windows(2) {
        let (first, second) = (pair[0].range, pair[1].range);
        if first.end() > second.start() {
            return Err(EditError::Overlap { first, second });
        }
    }

    let mut result = text.to_string();
    for edit in sorted.iter().rev() {
        result.replace_range(
            usize::from(edit.range.start())..usize::from(edit.range.end()),
            &edit.new_text,
        );
    }
    Ok(result)
}

/// Final offset of byte `within` of the replacement text of `edits[index]`
/// once the whole batch is applied.
#[must_use]
pub fn offset_in_result(edits: &[TextEdit], index: usize, within: TextSize) -> TextSize {
    let target = &edits[index];
    let mut position = i64::from(u32::from(target.range.start() + within));
    for (i, edit) in edits.iter().enumerate() {
        let before = edit.range.start() < target.range.start()
            || (edit.range.start() == target.range.start() && i < index && edit.is_insert());
        if i != index && before {
            position += i64::from(u32::from(TextSize::of(edit.new_text.as_str())))
                - i64::from(u32::from(edit.range.len()));
        }
    }
    TextSize::from(u32::try_from(position).unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(start: u32, end: u32) -> TextRange {
        TextRange::new(start.into(), end.into())
    }

    #[test]
    fn test_apply_uses_original_offsets() {
        let text = "abc def ghi";
        let edits = [
            TextEdit::replace(range(0, 3), "x"),
            TextEdit::insert(7.into(), "!"),
            TextEdit::delete(range(8, 11)),
        ];
        assert_eq!(apply_edits(text, &edits).unwrap(), "x def! ");
    }

    #[test]
    fn test_insertions_at_same_offset_keep_batch_order() {
        let edits = [TextEdit::insert(1.into(), "1"), TextEdit::insert(1.into(), "2")];
        assert_eq!(apply_edits("ab", &edits).unwrap(), "a12b");
    }

    #[test]
    fn test_overlap_is_rejected() {
        let edits = [
            TextEdit::delete(range(0, 4)),
            TextEdit::replace(range(2, 5), "x"),
        ];
        assert_eq!(
            apply_edits("abcdef", &edits),
            Err(EditError::Overlap {
                first: range(0, 4),
                second: range(2, 5)
            })
        );
    }

    #[test]
    fn test_out_of_bounds_is_rejected() {
        let edits = [TextEdit::delete(range(2, 9))];
        assert!(matches!(
            apply_edits("abc", &edits),
            Err(EditError::OutOfBounds { len: 3, .. })
        ));
    }

    #[test]
    fn test_offset_in_result_accounts_for_earlier_edits() {
        let text = "ab cd";
        let edits = [
            TextEdit::insert(0.into(), "xx"),
            TextEdit::replace(range(3, 5), "NAME"),
        ];
        let result = apply_edits(text, &edits).unwrap();
        let offset = offset_in_result(&edits, 1, 0.into());
        assert_eq!(&result[usize::from(offset)..], "NAME");
    }

    #[test]
    fn test_source_change_groups_per_document() {
        let mut change = SourceChange::new();
        change.add_edit(DocumentId(2), TextEdit::insert(0.into(), "a"));
        change.add_edit(DocumentId(1), TextEdit::insert(0.into(), "b"));
        change.extend(DocumentId(1), Vec::new());
        assert_eq!(change.edit_count(), 2);
        assert_eq!(change.edits.keys().copied().collect::<Vec<_>>(), [DocumentId(1), DocumentId(2)]);
        assert!(change.edits_for(DocumentId(3)).is_empty());
    }
}
