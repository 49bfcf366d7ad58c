//! Flat parser output.
//!
//! The grammar emits events instead of nodes and the sink replays them into
//! the arena. A node opened later can adopt one that is already complete
//! (`a.b(c)` wraps `a` twice); the adopted `Start` records the distance to
//! its new parent.

use crate::syntax::SyntaxKind;

/// One step of the parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Opens a node.
    Start {
        /// Kind of the node.
        kind: SyntaxKind,
        /// Distance to the `Start` of the node that wraps this one.
        forward_parent: Option<u32>,
    },
    /// Attaches the next significant token, preceded by pending trivia.
    Token(SyntaxKind),
    /// Closes the innermost open node.
    Finish,
    /// A slot reserved by a marker, or a `Start` already replayed as a
    /// forward parent.
    Tombstone,
}

impl Event {
    /// `Start` without a forward parent.
    #[must_use]
    pub fn start(kind: SyntaxKind) -> Self {
        Self::Start {
            kind,
            forward_parent: None,
        }
    }
}
