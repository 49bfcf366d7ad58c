use alfix_syntax::{DocumentId, SyntaxKind, SyntaxNode, SyntaxTree};
use text_size::TextRange;

use crate::context::RefactorContext;
use crate::edit::{SourceChange, TextEdit};
use crate::resolve::{lookup_variable, WorkspaceTrees};
use crate::scope::enclosing_method;

use super::{CodeAction, CodeActionKind, RefactoringProvider};

/// Rewrites `Rec.Field := Value;` into `Rec.Validate(Field, Value);`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssignmentToValidateProvider;

/// Receiver, field and value of a field assignment.
struct FieldAssignment<'t> {
    statement: SyntaxNode<'t>,
    receiver: SyntaxNode<'t>,
    field: SyntaxNode<'t>,
    value: SyntaxNode<'t>,
}

fn field_assignment_at(tree: &SyntaxTree, range: TextRange) -> Option<FieldAssignment<'_>> {
    let statement = tree.find_node_at(range.start(), &[SyntaxKind::AssignmentStatement])?;
    let mut operands = statement.child_nodes();
    let target = operands.next()?;
    let value = operands.next()?;
    if target.kind() != SyntaxKind::MemberAccessExpression {
        return None;
    }
    let receiver = target.child_nodes().next()?;
    let field = target.last_child_of_kind(SyntaxKind::IdentifierName)?;
    if receiver.kind() != SyntaxKind::IdentifierName || receiver == field {
        return None;
    }
    Some(FieldAssignment {
        statement,
        receiver,
        field,
        value,
    })
}

fn is_record(trees: &WorkspaceTrees, assignment: &FieldAssignment<'_>) -> bool {
    enclosing_method(assignment.statement)
        .and_then(|method| lookup_variable(trees, method, assignment.receiver.text()))
        .is_some_and(|variable| variable.type_short().eq_ignore_ascii_case("record"))
}

impl RefactoringProvider for AssignmentToValidateProvider {
    fn consider_line(&self, ctx: &RefactorContext<'_>, document: DocumentId, range: TextRange) -> bool {
        ctx.tree(document)
            .is_ok_and(|tree| field_assignment_at(&tree, range).is_some())
    }

    fn create_actions(
        &self,
        ctx: &RefactorContext<'_>,
        document: DocumentId,
        range: TextRange,
    ) -> Vec<CodeAction> {
        let Ok(tree) = ctx.tree(document) else {
            return Vec::new();
        };
        let Some(assignment) = field_assignment_at(&tree, range) else {
            return Vec::new();
        };
        if !is_record(&ctx.trees(), &assignment) {
            tracing::debug!(receiver = assignment.receiver.text(), "receiver is not a record");
            return Vec::new();
        }

        let separator = if assignment.statement.token_of_kind(SyntaxKind::Semicolon).is_some() {
            ";"
        } else {
            ""
        };
        let replacement = format!(
            "{}.Validate({}, {}){separator}",
            assignment.receiver.text(),
            assignment.field.text(),
            assignment.value.text().trim(),
        );
        let change = SourceChange::from_edits(
            document,
            vec![TextEdit::replace(assignment.statement.text_range(), replacement)],
        );
        vec![CodeAction::with_edit(
            "Convert to validate",
            CodeActionKind::RefactorRewrite,
            change,
        )]
    }
}
