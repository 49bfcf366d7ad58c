use alfix_syntax::{names_equal, DocumentId, SyntaxKind, SyntaxNode, SyntaxTree};
use text_size::TextRange;

use crate::context::RefactorContext;
use crate::edit::SourceChange;
use crate::scope::{enclosing_object, globals};
use crate::synthesis::{insert_variable, remove_variable};
use crate::variable::{parse_variable, Variable};

use super::{CodeAction, CodeActionKind, RefactoringProvider};

/// Moves a local declaration into the object's global var section.
#[derive(Debug, Clone, Copy, Default)]
pub struct MoveToGlobalProvider;

fn local_declaration_at(tree: &SyntaxTree, range: TextRange) -> Option<SyntaxNode<'_>> {
    let declaration = tree.find_node_at(
        range.start(),
        &[SyntaxKind::VariableDeclaration, SyntaxKind::VariableDeclarationName],
    )?;
    declaration
        .ancestor_in(&[SyntaxKind::VarSection, SyntaxKind::GlobalVarSection])
        .filter(|section| section.kind() == SyntaxKind::VarSection)
        .map(|_| declaration)
}

impl RefactoringProvider for MoveToGlobalProvider {
    fn consider_line(&self, ctx: &RefactorContext<'_>, document: DocumentId, range: TextRange) -> bool {
        ctx.tree(document)
            .is_ok_and(|tree| local_declaration_at(&tree, range).is_some())
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
        let Some(declaration) = local_declaration_at(&tree, range) else {
            return Vec::new();
        };
        let Some(object) = enclosing_object(declaration) else {
            return Vec::new();
        };
        let local = parse_variable(declaration);
        if globals(object).iter().any(|g| names_equal(&g.name, &local.name)) {
            tracing::debug!(name = %local.name, "global with the same name exists");
            return Vec::new();
        }

        let mut global = Variable::new(local.name.clone(), local.type_name.clone());
        global.member_attributes = local.member_attributes.clone();
        let Some(insert) = insert_variable(&tree, object.id(), &global) else {
            return Vec::new();
        };
        let mut change = SourceChange::from_edits(document, remove_variable(&tree, declaration.id()));
        change.add_edit(document, insert);

        vec![CodeAction::with_edit(
            format!("Move '{}' to global variables", local.name),
            CodeActionKind::RefactorRewrite,
            change,
        )]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::Fixture;

    const SOURCE: &str = "codeunit 50100 Mgt
{
    procedure Run()
    var
        Counter: Integer;
    begin
        Counter := 1;
    end;
}
";

    #[test]
    fn test_moves_only_local_to_new_global_section() {
        let fixture = Fixture::new(SOURCE);
        let actions = fixture.actions(&MoveToGlobalProvider, fixture.range_of("Counter: Integer"));
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].title, "Move 'Counter' to global variables");
        assert_eq!(
            fixture.apply(&actions[0]),
            "codeunit 50100 Mgt
{
    var
        Counter: Integer;

    procedure Run()
    begin
        Counter := 1;
    end;
}
"
        );
    }

    #[test]
    fn test_not_offered_when_global_exists() {
        let source = "codeunit 50100 Mgt
{
    var
        counter: Integer;

    procedure Run()
    var
        Counter: Integer;
    begin
    end;
}
";
        let fixture = Fixture::new(source);
        assert!(fixture
            .actions(&MoveToGlobalProvider, fixture.range_of("Counter: Integer"))
            .is_empty());
    }

    #[test]
    fn test_not_offered_on_global_declaration() {
        let source = "codeunit 50100 Mgt
{
    var
        Total: Decimal;
}
";
        let fixture = Fixture::new(source);
        assert!(fixture
            .actions(&MoveToGlobalProvider, fixture.range_of("Total"))
            .is_empty());
    }
}
