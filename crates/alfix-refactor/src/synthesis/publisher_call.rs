use alfix_syntax::{NodeId, SyntaxKind, SyntaxTree};

use crate::edit::TextEdit;
use crate::text::{indent_unit_for, is_first_on_line, line_indent_at_offset, line_start, newline_for};

/// Where a publisher call goes inside a body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublisherPosition {
    /// First statements after `begin`.
    Top,
    /// Last statements, before a trailing `exit` or before `end`.
    Bottom,
}

/// Inserts a call to `publisher` into `block`.
///
/// With `is_handled_used` the call is preceded by `IsHandled := false;`
/// and followed by `if IsHandled then exit;`.
#[must_use]
pub fn insert_publisher_call(
    tree: &SyntaxTree,
    block: NodeId,
    publisher: &str,
    arguments: &[String],
    is_handled_used: bool,
    position: PublisherPosition,
) -> Option<TextEdit> {
    let block = tree.get(block)?;
    if block.kind() != SyntaxKind::Block {
        return None;
    }
    let text = tree.text();
    let newline = newline_for(text);

    let mut lines = Vec::new();
    if is_handled_used {
        lines.push("IsHandled := false;".to_string());
    }
    lines.push(format!("{publisher}({});", arguments.join(", ")));
    if is_handled_used {
        lines.push("if IsHandled then exit;".to_string());
    }

    match position {
        PublisherPosition::Top => {
            let begin = block.token_of_kind(SyntaxKind::KwBegin)?;
            let outer = line_indent_at_offset(text, begin.text_range().start());
            let indent = format!("{outer}{}", indent_unit_for(&outer));
            let inserted: String = lines
                .iter()
                .map(|line| format!("{newline}{indent}{line}"))
                .collect();
            Some(TextEdit::insert(begin.text_range().end(), inserted))
        }
        PublisherPosition::Bottom => {
            let trailing_exit = block
                .child_nodes()
                .last()
                .filter(|stmt| stmt.kind() == SyntaxKind::ExitStatement);
            let (anchor, indent) = if let Some(exit) = trailing_exit {
                let at = exit.text_range().start();
                (at, line_indent_at_offset(text, at))
            } else {
                let end = block.last_child_of_kind(SyntaxKind::KwEnd)?;
                let at = end.text_range().start();
                let outer = line_indent_at_offset(text, at);
                let unit = indent_unit_for(&outer);
                (at, format!("{outer}{unit}"))
            };

            if is_first_on_line(text, anchor) {
                let inserted: String = lines
                    .iter()
                    .map(|line| format!("{indent}{line}{newline}"))
                    .collect();
                Some(TextEdit::insert(line_start(text, anchor), inserted))
            } else {
                let outer = line_indent_at_offset(text, anchor);
                let inserted: String = lines
                    .iter()
                    .map(|line| format!("{newline}{indent}{line}"))
                    .collect();
                Some(TextEdit::insert(anchor, format!("{inserted}{newline}{outer}")))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edit::apply_edits;
    use expect_test::expect;

    fn body(tree: &SyntaxTree) -> NodeId {
        tree.root()
            .collect_descendants(&[SyntaxKind::Block], false)[0]
            .id()
    }

    #[test]
    fn test_top_with_is_handled() {
        let source = "codeunit 1 X
{
    procedure Post(var Doc: Record Item)
    var
        IsHandled: Boolean;
    begin
        Doc.Modify();
    end;
}
";
        let tree = SyntaxTree::parse(source);
        let edit = insert_publisher_call(
            &tree,
            body(&tree),
            "OnBeforePost",
            &["Doc".to_string(), "IsHandled".to_string()],
            true,
            PublisherPosition::Top,
        )
        .unwrap();
        expect![[r#"
            codeunit 1 X
            {
                procedure Post(var Doc: Record Item)
                var
                    IsHandled: Boolean;
                begin
                    IsHandled := false;
                    OnBeforePost(Doc, IsHandled);
                    if IsHandled then exit;
                    Doc.Modify();
                end;
            }
        "#]]
        .assert_eq(&apply_edits(source, &[edit]).unwrap());
    }

    #[test]
    fn test_bottom_before_trailing_exit() {
        let source = "codeunit 1 X\r\n{\r\n    procedure Calc(): Integer\r\n    var\r\n        Result: Integer;\r\n    begin\r\n        Result := 1;\r\n        exit(Result);\r\n    end;\r\n}\r\n";
        let tree = SyntaxTree::parse(source);
        let edit = insert_publisher_call(
            &tree,
            body(&tree),
            "OnAfterCalc",
            &["Result".to_string()],
            false,
            PublisherPosition::Bottom,
        )
        .unwrap();
        let result = apply_edits(source, &[edit]).unwrap();
        assert!(result.contains(
            "        Result := 1;\r\n        OnAfterCalc(Result);\r\n        exit(Result);\r\n"
        ));
    }

    #[test]
    fn test_bottom_before_end() {
        let source = "codeunit 1 X
{
    procedure Run()
    begin
        Foo();
    end;
}
";
        let tree = SyntaxTree::parse(source);
        let edit = insert_publisher_call(
            &tree,
            body(&tree),
            "OnAfterRun",
            &[],
            false,
            PublisherPosition::Bottom,
        )
        .unwrap();
        let result = apply_edits(source, &[edit]).unwrap();
        assert!(result.contains("        Foo();\n        OnAfterRun();\n    end;"));
    }

    #[test]
    fn test_requires_block() {
        let tree = SyntaxTree::parse("codeunit 1 X { }");
        assert!(insert_publisher_call(
            &tree,
            NodeId::ROOT,
            "OnX",
            &[],
            false,
            PublisherPosition::Top
        )
        .is_none());
    }
}
