use alfix_syntax::{NodeId, SyntaxKind, SyntaxTree};

use crate::edit::TextEdit;
use crate::variable::Variable;

/// `a: Integer; var b: Text` for a parameter list.
#[must_use]
pub fn parameter_list_text(parameters: &[Variable]) -> String {
    parameters
        .iter()
        .map(Variable::declaration_text)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Appends `missing` to the parameter list of `method`.
///
/// Returns no edit when there is nothing to add or the method has no
/// parameter list.
#[must_use]
pub fn append_parameters(tree: &SyntaxTree, method: NodeId, missing: &[Variable]) -> Vec<TextEdit> {
    if missing.is_empty() {
        return Vec::new();
    }
    let Some(list) = tree
        .get(method)
        .and_then(|m| m.first_child_of_kind(SyntaxKind::ParameterList))
    else {
        return Vec::new();
    };

    let text = parameter_list_text(missing);
    if let Some(last) = list.last_child_of_kind(SyntaxKind::Parameter) {
        vec![TextEdit::insert(last.text_range().end(), format!("; {text}"))]
    } else if let Some(open) = list.token_of_kind(SyntaxKind::LParen) {
        vec![TextEdit::insert(open.text_range().end(), text)]
    } else {
        Vec::new()
    }
}

/// Names the unnamed return value of `method`: `(): T` and `() : T` both
/// become `() Name: T`.
#[must_use]
pub fn add_return_value_name(tree: &SyntaxTree, method: NodeId, name: &str) -> Option<TextEdit> {
    let ret = tree
        .get(method)?
        .first_child_of_kind(SyntaxKind::ReturnValue)?;
    if ret.name().is_some() {
        return None;
    }
    // The name goes right before the colon, one space after `)`.
    let at = ret
        .token_of_kind(SyntaxKind::Colon)
        .map_or(ret.text_range().start(), |colon| colon.text_range().start());
    let preceded_by_space = usize::from(at)
        .checked_sub(1)
        .and_then(|i| tree.text().as_bytes().get(i))
        .is_some_and(u8::is_ascii_whitespace);
    let text = if preceded_by_space {
        name.to_string()
    } else {
        format!(" {name}")
    };
    Some(TextEdit::insert(at, text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edit::apply_edits;

    fn method(tree: &SyntaxTree, index: usize) -> NodeId {
        tree.root()
            .collect_descendants(&[SyntaxKind::MethodDeclaration], true)[index]
            .id()
    }

    const SOURCE: &str = "codeunit 1 X
{
    procedure A(Qty: Integer): Boolean
    begin
    end;

    procedure B() : Text
    begin
    end;
}";

    #[test]
    fn test_append_after_last_parameter() {
        let tree = SyntaxTree::parse(SOURCE);
        let edits = append_parameters(
            &tree,
            method(&tree, 0),
            &[Variable::new("Name", "Text"), Variable::new("Cust", "Record Customer").with_var(true)],
        );
        let result = apply_edits(SOURCE, &edits).unwrap();
        assert!(result.contains(
            "procedure A(Qty: Integer; Name: Text; var Cust: Record Customer): Boolean"
        ));
    }

    #[test]
    fn test_append_to_empty_list() {
        let tree = SyntaxTree::parse(SOURCE);
        let edits = append_parameters(&tree, method(&tree, 1), &[Variable::new("Flag", "Boolean")]);
        let result = apply_edits(SOURCE, &edits).unwrap();
        assert!(result.contains("procedure B(Flag: Boolean) : Text"));
        assert!(append_parameters(&tree, method(&tree, 1), &[]).is_empty());
    }

    #[test]
    fn test_name_return_value() {
        let tree = SyntaxTree::parse(SOURCE);
        let first = add_return_value_name(&tree, method(&tree, 0), "Ok").unwrap();
        let second = add_return_value_name(&tree, method(&tree, 1), "Result").unwrap();
        let result = apply_edits(SOURCE, &[first, second]).unwrap();
        assert!(result.contains("procedure A(Qty: Integer) Ok: Boolean"));
        assert!(result.contains("procedure B() Result: Text"));
    }
}
