//! Add missing parameters to a procedure, or keep its old signature as an overload.

use alfix_syntax::{DocumentId, SyntaxKind, SyntaxNode, SyntaxTree};
use text_size::TextRange;
use tracing::debug;

use crate::context::RefactorContext;
use crate::method_type::classify;
use crate::resolve::{argument_for, lookup_variable, object_reference, WorkspaceTrees};
use crate::scope::{enclosing_method, enclosing_object, procedures_named};
use crate::signature::{find_best_overload, find_exact_overload, OverloadMatch};
use crate::variable::CallArgument;

use super::{name_offset, CodeAction, CodeActionKind, CommandKind, DeferredCommand, RefactoringProvider};

/// Offers signature changes for calls with surplus arguments.
#[derive(Debug, Clone, Copy, Default)]
pub struct AddParametersProvider;

fn invocation_at(tree: &SyntaxTree, range: TextRange) -> Option<SyntaxNode<'_>> {
    tree.find_node_at(range.start(), &[SyntaxKind::InvocationExpression])
}

/// Object kinds a variable of short type `short` can refer to.
fn object_kinds(short: &str) -> Option<&'static [SyntaxKind]> {
    Some(match short.to_ascii_lowercase().as_str() {
        "codeunit" => &[SyntaxKind::CodeunitObject],
        "record" => &[SyntaxKind::TableObject],
        "page" => &[SyntaxKind::PageObject],
        "report" => &[SyntaxKind::ReportObject],
        "query" => &[SyntaxKind::QueryObject],
        "xmlport" => &[SyntaxKind::XmlPortObject],
        _ => return None,
    })
}

struct Target {
    document: DocumentId,
    matched: OverloadMatch,
    name: String,
    offset: text_size::TextSize,
    accepts_parameters: bool,
}

fn call_arguments(
    trees: &WorkspaceTrees,
    caller: SyntaxNode<'_>,
    invocation: SyntaxNode<'_>,
) -> Option<Vec<CallArgument>> {
    invocation
        .first_child_of_kind(SyntaxKind::ArgumentList)?
        .child_nodes()
        .map(|argument| {
            let inferred = argument_for(trees, caller, argument);
            if inferred.is_none() {
                debug!(argument = argument.text(), "argument type unknown");
            }
            inferred
        })
        .collect()
}

fn resolve_target(
    ctx: &RefactorContext<'_>,
    trees: &WorkspaceTrees,
    document: DocumentId,
    invocation: SyntaxNode<'_>,
) -> Option<Target> {
    let caller = enclosing_method(invocation)?;
    let arguments = call_arguments(trees, caller, invocation)?;
    let callee = invocation.child_nodes().next()?;

    let describe = |document: DocumentId, matched: OverloadMatch, tree: &SyntaxTree| {
        let method = tree.node(matched.method);
        Target {
            document,
            name: method.name().unwrap_or_default().to_string(),
            offset: name_offset(method),
            accepts_parameters: classify(method).accepts_new_parameters(),
            matched,
        }
    };

    match callee.kind() {
        SyntaxKind::IdentifierName => {
            let object = enclosing_object(invocation)?;
            let candidates: Vec<_> = procedures_named(object, callee.text())
                .iter()
                .map(SyntaxNode::id)
                .collect();
            let tree = invocation.tree();
            let matched = find_best_overload(tree, &candidates, &arguments, ctx.config)?;
            Some(describe(document, matched, tree))
        }
        SyntaxKind::MemberAccessExpression => {
            let receiver = callee.child_nodes().next()?;
            let member = callee.last_child_of_kind(SyntaxKind::IdentifierName)?;
            if receiver.kind() != SyntaxKind::IdentifierName || receiver == member {
                return None;
            }
            let variable = lookup_variable(trees, caller, receiver.text())?;
            let (short, object_name) = object_reference(&variable.type_name)?;
            let (target_document, object) = trees.find_object(object_kinds(short)?, object_name)?;
            let candidates: Vec<_> = procedures_named(object, member.text())
                .iter()
                .map(SyntaxNode::id)
                .collect();
            let tree = object.tree();
            let matched = find_exact_overload(tree, &candidates, &arguments, ctx.config)?;
            Some(describe(target_document, matched, tree))
        }
        _ => None,
    }
}

impl RefactoringProvider for AddParametersProvider {
    fn consider_line(&self, ctx: &RefactorContext<'_>, document: DocumentId, range: TextRange) -> bool {
        ctx.tree(document)
            .is_ok_and(|tree| invocation_at(&tree, range).is_some_and(|call| enclosing_method(call).is_some()))
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
        let Some(invocation) = invocation_at(&tree, range) else {
            return Vec::new();
        };
        let trees = ctx.trees();
        let Some(target) = resolve_target(ctx, &trees, document, invocation) else {
            return Vec::new();
        };
        if !target.accepts_parameters {
            debug!(method = %target.name, "method does not accept new parameters");
            return Vec::new();
        }

        let command = |kind: CommandKind| DeferredCommand {
            command: kind,
            document: target.document,
            offset: target.offset,
            missing_parameters: target.matched.missing_parameters.clone(),
        };
        let name = &target.name;
        let mut actions = vec![CodeAction::with_command(
            format!("Add parameters to '{name}'"),
            CodeActionKind::QuickFix,
            command(CommandKind::AddParameters),
        )];
        if !target.matched.is_publisher {
            actions.push(CodeAction::with_command(
                format!("Create overload of '{name}'"),
                CodeActionKind::QuickFix,
                command(CommandKind::CreateOverload { obsolete: false }),
            ));
            actions.push(CodeAction::with_command(
                format!("Create overload of '{name}' and mark the old one obsolete"),
                CodeActionKind::QuickFix,
                command(CommandKind::CreateOverload { obsolete: true }),
            ));
        }
        actions
    }
}
