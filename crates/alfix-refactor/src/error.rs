//! Error types of the refactoring engine.
//!
//! Not-applicable situations are not errors: they surface as `None` or an
//! empty edit list. The types here cover what a caller must react to.

use std::path::PathBuf;

use alfix_syntax::DocumentId;
use text_size::TextRange;
use thiserror::Error;

/// Failure of a refactoring that was explicitly invoked.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RefactorError {
    /// The user declined a prompt; no edits were produced.
    #[error("refactoring cancelled")]
    Cancelled,
    /// The command refers to a document the workspace does not know.
    #[error("unknown document {0}")]
    UnknownDocument(DocumentId),
    /// The command offset no longer points at a node the command can act on.
    #[error("nothing to refactor at offset {offset} in {document}")]
    TargetNotFound {
        /// Document of the command.
        document: DocumentId,
        /// Offset the command was created for.
        offset: u32,
    },
}

/// Failure while applying a batch of edits to a text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    /// Two edits of the batch touch the same text.
    #[error("overlapping edits at {first:?} and {second:?}")]
    Overlap {
        /// Range of the earlier edit.
        first: TextRange,
        /// Range of the later edit.
        second: TextRange,
    },
    /// An edit reaches past the end of the text.
    #[error("edit {range:?} is outside of a text of length {len}")]
    OutOfBounds {
        /// Offending range.
        range: TextRange,
        /// Length of the text.
        len: u32,
    },
}

/// Failure while loading `alfix.toml` explicitly.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// Config file path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The file is not valid TOML for the expected schema.
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        /// Config file path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: toml::de::Error,
    },
}
