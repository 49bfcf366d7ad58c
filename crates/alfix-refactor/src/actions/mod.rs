//! Code actions offered at a cursor or selection.
//!
//! Providers answer two questions: whether anything could be offered on a
//! line at all (cheap, side-effect free) and which actions exist for a range.
//! Actions that need user input carry a [`DeferredCommand`] that the host
//! hands back to [`execute_command`] once the user picks the action.

mod add_parameters;
mod add_publisher;
mod assignment_to_validate;
mod extract_label;
mod extract_procedure;
mod move_to_global;

use alfix_syntax::{DocumentId, SyntaxKind, SyntaxNode, SyntaxTree};
use serde::{Deserialize, Serialize};
use text_size::{TextRange, TextSize};
use tracing::debug;

use crate::context::RefactorContext;
use crate::edit::SourceChange;
use crate::error::RefactorError;
use crate::publisher::{add_publisher, PublisherKind};
use crate::synthesis::{append_parameters, create_overload};
use crate::variable::Variable;

pub use add_parameters::AddParametersProvider;
pub use add_publisher::AddPublisherProvider;
pub use assignment_to_validate::AssignmentToValidateProvider;
pub use extract_label::ExtractLabelProvider;
pub use extract_procedure::{extract_procedure, ExtractProcedureProvider};
pub use move_to_global::MoveToGlobalProvider;

/// Category of a code action, as editors group them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CodeActionKind {
    /// Fixes code that does not compile as is.
    QuickFix,
    /// Rewrites code in place.
    RefactorRewrite,
    /// Moves code into a new declaration.
    RefactorExtract,
}

impl CodeActionKind {
    /// Editor identifier of the kind.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::QuickFix => "quickfix",
            Self::RefactorRewrite => "refactor.rewrite",
            Self::RefactorExtract => "refactor.extract",
        }
    }
}

/// What a deferred command does when executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CommandKind {
    /// Add an event publisher to the method at the offset.
    AddPublisher {
        /// Before or after the body.
        kind: PublisherKind,
    },
    /// Append the missing parameters to the method at the offset.
    AddParameters,
    /// Keep the old signature of the method at the offset as an overload.
    CreateOverload {
        /// Mark the kept signature `[Obsolete]`.
        obsolete: bool,
    },
    /// Extract the statements between the offset and `end`.
    ExtractProcedure {
        /// End of the selection.
        end: TextSize,
    },
}

/// An action that runs later, addressed by document and offset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeferredCommand {
    /// What to do.
    pub command: CommandKind,
    /// Document holding the target.
    pub document: DocumentId,
    /// Offset of the target inside the document.
    pub offset: TextSize,
    /// Parameters to add, for signature changes.
    #[serde(default)]
    pub missing_parameters: Vec<Variable>,
}

impl DeferredCommand {
    /// Command without parameters.
    #[must_use]
    pub fn new(command: CommandKind, document: DocumentId, offset: TextSize) -> Self {
        Self {
            command,
            document,
            offset,
            missing_parameters: Vec::new(),
        }
    }
}

/// An action offered to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeAction {
    /// Menu title.
    pub title: String,
    /// Category.
    pub kind: CodeActionKind,
    /// Edits computed up front.
    pub edit: Option<SourceChange>,
    /// Work to run once the action is chosen.
    pub command: Option<DeferredCommand>,
}

impl CodeAction {
    /// Action whose edits are already known.
    #[must_use]
    pub fn with_edit(title: impl Into<String>, kind: CodeActionKind, edit: SourceChange) -> Self {
        Self {
            title: title.into(),
            kind,
            edit: Some(edit),
            command: None,
        }
    }

    /// Action that runs `command` when chosen.
    #[must_use]
    pub fn with_command(title: impl Into<String>, kind: CodeActionKind, command: DeferredCommand) -> Self {
        Self {
            title: title.into(),
            kind,
            edit: None,
            command: Some(command),
        }
    }
}

/// Result of an executed command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandResult {
    /// Edits to apply.
    pub change: SourceChange,
    /// Position of a generated name the host should offer to rename,
    /// valid once `change` is applied.
    pub rename: Option<(DocumentId, TextSize)>,
}

impl From<SourceChange> for CommandResult {
    fn from(change: SourceChange) -> Self {
        Self {
            change,
            rename: None,
        }
    }
}

/// Source of code actions.
pub trait RefactoringProvider: Send + Sync {
    /// Returns `true` if actions may exist for `range`. Must not prompt.
    fn consider_line(&self, ctx: &RefactorContext<'_>, document: DocumentId, range: TextRange) -> bool;

    /// Actions for `range`.
    fn create_actions(
        &self,
        ctx: &RefactorContext<'_>,
        document: DocumentId,
        range: TextRange,
    ) -> Vec<CodeAction>;
}

/// Every built-in provider.
#[must_use]
pub fn default_providers() -> Vec<Box<dyn RefactoringProvider>> {
    vec![
        Box::new(AddParametersProvider),
        Box::new(AddPublisherProvider),
        Box::new(MoveToGlobalProvider),
        Box::new(ExtractLabelProvider),
        Box::new(AssignmentToValidateProvider),
        Box::new(ExtractProcedureProvider),
    ]
}

/// Actions of every provider that considers `range`.
#[must_use]
pub fn code_actions(
    ctx: &RefactorContext<'_>,
    providers: &[Box<dyn RefactoringProvider>],
    document: DocumentId,
    range: TextRange,
) -> Vec<CodeAction> {
    providers
        .iter()
        .filter(|provider| provider.consider_line(ctx, document, range))
        .flat_map(|provider| provider.create_actions(ctx, document, range))
        .collect()
}

/// Runs a deferred command against the current workspace state.
pub fn execute_command(
    ctx: &RefactorContext<'_>,
    command: &DeferredCommand,
) -> Result<CommandResult, RefactorError> {
    let tree = ctx.tree(command.document)?;
    let not_found = || RefactorError::TargetNotFound {
        document: command.document,
        offset: command.offset.into(),
    };
    debug!(?command.command, document = %command.document, "executing command");

    match command.command {
        CommandKind::AddPublisher { kind } => {
            let method = method_at(&tree, command.offset).ok_or_else(not_found)?;
            add_publisher(ctx, command.document, method, kind).map(CommandResult::from)
        }
        CommandKind::AddParameters => {
            let method = procedure_at(&tree, command.offset).ok_or_else(not_found)?;
            let edits = append_parameters(&tree, method.id(), &command.missing_parameters);
            non_empty(command.document, edits).ok_or_else(not_found)
        }
        CommandKind::CreateOverload { obsolete } => {
            let method = procedure_at(&tree, command.offset).ok_or_else(not_found)?;
            let edits = create_overload(
                &tree,
                method.id(),
                &command.missing_parameters,
                obsolete,
                ctx.project.version.as_deref(),
            );
            non_empty(command.document, edits).ok_or_else(not_found)
        }
        CommandKind::ExtractProcedure { end } => {
            if end < command.offset {
                return Err(not_found());
            }
            let range = TextRange::new(command.offset, end);
            extract_procedure(ctx, command.document, &tree, range)?.ok_or_else(not_found)
        }
    }
}

fn non_empty(document: DocumentId, edits: Vec<crate::edit::TextEdit>) -> Option<CommandResult> {
    (!edits.is_empty()).then(|| SourceChange::from_edits(document, edits).into())
}

/// Procedure or trigger containing `offset`.
pub(crate) fn method_at(tree: &SyntaxTree, offset: TextSize) -> Option<SyntaxNode<'_>> {
    tree.find_node_at(
        offset,
        &[SyntaxKind::MethodDeclaration, SyntaxKind::TriggerDeclaration],
    )
}

fn procedure_at(tree: &SyntaxTree, offset: TextSize) -> Option<SyntaxNode<'_>> {
    tree.find_node_at(offset, &[SyntaxKind::MethodDeclaration])
}

/// Offset of the name of a procedure or trigger, the anchor of deferred commands.
pub(crate) fn name_offset(method: SyntaxNode<'_>) -> TextSize {
    method
        .first_child_of_kind(SyntaxKind::IdentifierName)
        .map_or(method.text_range().start(), |name| name.text_range().start())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deferred_command_json_shape() {
        let command = DeferredCommand {
            command: CommandKind::CreateOverload { obsolete: true },
            document: DocumentId(3),
            offset: TextSize::from(42),
            missing_parameters: vec![Variable::new("Qty", "Decimal")],
        };
        let json = serde_json::to_value(&command).unwrap();
        assert_eq!(json["command"]["type"], "createOverload");
        assert_eq!(json["command"]["obsolete"], true);
        assert_eq!(json["document"], 3);
        assert_eq!(json["offset"], 42);
        assert_eq!(json["missing_parameters"][0]["name"], "Qty");

        let back: DeferredCommand = serde_json::from_value(json).unwrap();
        assert_eq!(back, command);
    }

    #[test]
    fn test_kind_identifiers() {
        assert_eq!(CodeActionKind::QuickFix.as_str(), "quickfix");
        assert_eq!(CodeActionKind::RefactorExtract.as_str(), "refactor.extract");
    }
}
