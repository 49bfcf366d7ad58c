//! `alfix-refactor` - Signature reconciliation and refactoring edits for AL.
//!
//! This crate turns syntax trees from `alfix-syntax` into text edits:
//!
//! - **Model**: canonical [`Variable`] records and the [`MethodType`] classifier
//! - **Signatures**: scoring call sites against overloads ([`find_best_overload`])
//! - **Synthesis**: var-section, parameter-list, overload and publisher edits
//! - **Actions**: code action providers and deferred commands for editors
//!
//! # Design Principles
//!
//! - **Edits, not rewrites**: every operation returns [`TextEdit`]s against the
//!   text the tree was parsed from; applying them is the host's concern
//! - **Explicit context**: workspace, tree provider, configuration and user
//!   interaction travel in a [`RefactorContext`]
//! - **Ask through a trait**: user decisions go through [`RefactorUi`] so the
//!   same engine runs in editors, the CLI and tests
//!
//! # Example
//!
//! ```
//! use alfix_refactor::synthesis::insert_variable;
//! use alfix_refactor::{apply_edits, Variable};
//! use alfix_syntax::{SyntaxKind, SyntaxTree};
//!
//! let source = "codeunit 50100 Demo\n{\n    procedure Run()\n    begin\n    end;\n}\n";
//! let tree = SyntaxTree::parse(source);
//! let method = tree.root().collect_descendants(&[SyntaxKind::MethodDeclaration], true)[0];
//! let edit = insert_variable(&tree, method.id(), &Variable::new("Total", "Decimal")).unwrap();
//! let result = apply_edits(source, &[edit]).unwrap();
//! assert!(result.contains("    var\n        Total: Decimal;\n    begin"));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]

pub mod actions;
pub mod config;
pub mod context;
pub mod edit;
pub mod error;
pub mod locator;
pub mod method_type;
pub mod project;
pub mod prompt;
pub mod publisher;
pub mod resolve;
pub mod scope;
pub mod signature;
pub mod synthesis;
pub mod text;
pub mod variable;

#[cfg(test)]
mod fixture;

pub use actions::{
    code_actions, default_providers, execute_command, CodeAction, CodeActionKind, CommandKind,
    CommandResult, DeferredCommand, RefactoringProvider,
};
pub use config::{AlfixConfig, LoggingConfig, ProcedureLocation, RefactorConfig};
pub use context::{RefactorContext, Workspace};
pub use edit::{apply_edits, SourceChange, TextEdit};
pub use error::{ConfigError, EditError, RefactorError};
pub use locator::{Access, ProcedureLocator};
pub use method_type::MethodType;
pub use project::ProjectInfo;
pub use prompt::{PickItem, RefactorUi, ScriptedUi, SuppressedUi, TextPrompt};
pub use publisher::{add_publisher, plan_publisher_parameters, PublisherKind, PublisherPlan};
pub use signature::{find_best_overload, find_exact_overload, MatchScore, OverloadMatch};
pub use variable::{CallArgument, ReturnValue, Variable};
