use alfix_syntax::{DocumentId, SyntaxKind, SyntaxNode, SyntaxTree};
use text_size::TextRange;

use crate::context::RefactorContext;
use crate::method_type::classify;
use crate::publisher::PublisherKind;
use crate::text::line_start;

use super::{method_at, name_offset, CodeAction, CodeActionKind, CommandKind, DeferredCommand, RefactoringProvider};

/// Offers OnBefore/OnAfter publishers on a procedure or trigger header.
#[derive(Debug, Clone, Copy, Default)]
pub struct AddPublisherProvider;

/// The method whose declaration line holds `range.start()`.
fn method_on_header(tree: &SyntaxTree, range: TextRange) -> Option<SyntaxNode<'_>> {
    let method = method_at(tree, range.start())?;
    method.first_child_of_kind(SyntaxKind::Block)?;
    let text = tree.text();
    let header = line_start(text, name_offset(method));
    (line_start(text, range.start()) == header).then_some(method)
}

impl RefactoringProvider for AddPublisherProvider {
    fn consider_line(&self, ctx: &RefactorContext<'_>, document: DocumentId, range: TextRange) -> bool {
        ctx.tree(document)
            .is_ok_and(|tree| method_on_header(&tree, range).is_some())
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
        let Some(method) = method_on_header(&tree, range) else {
            return Vec::new();
        };
        if classify(method).is_event_publisher() {
            return Vec::new();
        }
        let offset = name_offset(method);
        [PublisherKind::Before, PublisherKind::After]
            .into_iter()
            .map(|kind| {
                CodeAction::with_command(
                    format!("Add {kind} publisher"),
                    CodeActionKind::RefactorRewrite,
                    DeferredCommand::new(CommandKind::AddPublisher { kind }, document, offset),
                )
            })
            .collect()
    }
}
