//! `alfix-syntax` - Lexer, parser, and arena syntax tree for AL (Business Central).
//!
//! This crate provides the syntactic layer the refactoring engine consumes:
//!
//! - **Lexer**: Tokenizes source text into a stream of tokens
//! - **Parser**: Builds a syntax tree from tokens, recovering from errors
//! - **Syntax Tree**: Arena of nodes with byte ranges and parent links
//! - **Provider**: Per-document tree cache behind the [`SyntaxTreeProvider`] trait
//!
//! # Design Principles
//!
//! - **Position-exact**: every node knows its range and its full range
//!   including surrounding trivia, so edits can be anchored on the tree
//! - **Error-tolerant**: parsing continues after errors, producing a partial tree
//! - **Arena-backed**: nodes are addressed by [`NodeId`]; parents are lookups
//!
//! # Example
//!
//! ```
//! use alfix_syntax::{SyntaxKind, SyntaxTree};
//!
//! let tree = SyntaxTree::parse("codeunit 50100 Demo { procedure Run() begin end; }");
//! assert!(tree.ok());
//!
//! let methods = tree
//!     .root()
//!     .collect_descendants(&[SyntaxKind::MethodDeclaration], true);
//! assert_eq!(methods[0].name(), Some("Run"));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]

pub mod lexer;
pub mod line_index;
pub mod parser;
pub mod provider;
pub mod syntax;
mod token_kinds;

pub use lexer::{lex, Lexer, Token, TokenKind};
pub use line_index::{LineCol, LineIndex};
pub use provider::{Document, DocumentId, ParsingProvider, SyntaxTreeProvider, TreeCache};
pub use syntax::{names_equal, unquote, NodeId, SyntaxKind, SyntaxNode, SyntaxTree};
