//! Conversion of engine offsets and edits to LSP shapes.

use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

use alfix_refactor::SourceChange;
use alfix_syntax::{Document, LineCol, LineIndex};
use anyhow::{anyhow, Context};
use lsp_types::{Location, Position, Range, TextEdit, Uri, WorkspaceEdit};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use text_size::{TextRange, TextSize};

use crate::workspace::ProjectWorkspace;

/// Characters escaped in the path of a `file://` URI.
const PATH: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'[')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

pub(crate) fn path_to_uri(path: &Path) -> anyhow::Result<Uri> {
    let mut raw = path.to_string_lossy().replace('\\', "/");
    if !raw.starts_with('/') {
        raw.insert(0, '/');
    }
    let text = format!("file://{}", utf8_percent_encode(&raw, PATH));
    Uri::from_str(&text).map_err(|err| anyhow!("invalid file URI {text}: {err:?}"))
}

fn position(index: &LineIndex, text: &str, offset: TextSize) -> Position {
    let LineCol { line, col } = index.line_col(text, offset);
    Position::new(line, col)
}

pub(crate) fn range(index: &LineIndex, text: &str, range: TextRange) -> Range {
    Range::new(
        position(index, text, range.start()),
        position(index, text, range.end()),
    )
}

/// Offset of a zero-based position inside `document`.
pub(crate) fn offset(document: &Document, at: LineCol) -> anyhow::Result<TextSize> {
    document
        .line_index()
        .offset(&document.text, at)
        .with_context(|| {
            format!(
                "{} has no line {} ({} lines)",
                document.uri,
                at.line + 1,
                document.line_index().line_count()
            )
        })
}

/// The change as an LSP workspace edit keyed by file URI.
pub(crate) fn workspace_edit(
    project: &ProjectWorkspace,
    change: &SourceChange,
) -> anyhow::Result<WorkspaceEdit> {
    let mut changes = HashMap::new();
    for (id, edits) in &change.edits {
        let document = project.document(*id)?;
        let index = document.line_index();
        let edits = edits
            .iter()
            .map(|edit| TextEdit {
                range: range(&index, &document.text, edit.range),
                new_text: edit.new_text.clone(),
            })
            .collect();
        changes.insert(path_to_uri(project.path(*id)?)?, edits);
    }
    Ok(WorkspaceEdit {
        changes: Some(changes),
        ..WorkspaceEdit::default()
    })
}

/// Location of `offset` in a text that results from applying edits.
pub(crate) fn location_in(path: &Path, text: &str, offset: TextSize) -> anyhow::Result<Location> {
    let index = LineIndex::new(text);
    let at = position(&index, text, offset);
    Ok(Location::new(path_to_uri(path)?, Range::new(at, at)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uri_escapes_spaces() {
        let uri = path_to_uri(Path::new("/work/My App/Sales Mgt.Codeunit.al")).unwrap();
        assert_eq!(uri.as_str(), "file:///work/My%20App/Sales%20Mgt.Codeunit.al");
    }

    #[test]
    fn ranges_count_lines_from_zero() {
        let text = "codeunit 1 A\r\n{\r\n}\r\n";
        let index = LineIndex::new(text);
        let start = TextSize::from(14);
        let converted = range(&index, text, TextRange::at(start, TextSize::from(1)));
        assert_eq!(converted.start, Position::new(1, 0));
        assert_eq!(converted.end, Position::new(1, 1));
    }
}
