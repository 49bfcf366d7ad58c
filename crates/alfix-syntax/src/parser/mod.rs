//! Parser for AL.
//!
//! This module provides a hand-written recursive descent parser that builds
//! an arena [`SyntaxTree`](crate::syntax::SyntaxTree).
//!
//! # Design
//!
//! - **Error-tolerant**: every input produces a tree; problems are reported
//!   as [`ParseError`]s and parsing resumes at the next statement or member
//! - **Position-exact**: every node carries its byte range and a full range
//!   that includes surrounding trivia, which is what edit synthesis anchors on
//!
//! # Architecture
//!
//! 1. **Lexing**: Tokenize source text (see `lexer` module)
//! 2. **Parsing**: Build a flat stream of events (start node, add token, finish node)
//! 3. **Tree Building**: Convert events into the node arena, computing ranges

#![allow(clippy::module_inception)]

pub mod event;
mod grammar;
mod parser;
mod sink;
mod source;

pub use parser::parse;
pub(crate) use parser::{CompletedMarker, Parser};

/// A parsing error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} at {}..{}", u32::from(.range.start()), u32::from(.range.end()))]
pub struct ParseError {
    /// The error message.
    pub message: String,
    /// The byte range where the error occurred.
    pub range: text_size::TextRange,
}
