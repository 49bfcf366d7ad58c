//! Syntax tree provider.
//!
//! Refactorings never parse text themselves; they ask a [`SyntaxTreeProvider`]
//! for the tree of a [`Document`]. [`ParsingProvider`] parses with this crate
//! and caches one tree per document version.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use text_size::TextSize;

use crate::line_index::LineIndex;
use crate::syntax::SyntaxTree;

/// Stable identity of a document inside one workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DocumentId(pub u32);

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A source document as seen by the host.
#[derive(Debug, Clone)]
pub struct Document {
    /// Workspace-local identity.
    pub id: DocumentId,
    /// Document URI or path.
    pub uri: String,
    /// Host version; bumped on every change.
    pub version: i32,
    /// Full document text.
    pub text: String,
}

impl Document {
    /// Creates a new document.
    pub fn new(id: DocumentId, uri: impl Into<String>, version: i32, text: impl Into<String>) -> Self {
        Self {
            id,
            uri: uri.into(),
            version,
            text: text.into(),
        }
    }

    /// Returns `true` if the document uses CRLF line endings.
    #[must_use]
    pub fn uses_crlf(&self) -> bool {
        self.text.contains("\r\n")
    }

    /// Builds a line index for the current text.
    #[must_use]
    pub fn line_index(&self) -> LineIndex {
        LineIndex::new(&self.text)
    }

    /// Length of the text.
    #[must_use]
    pub fn len(&self) -> TextSize {
        TextSize::of(self.text.as_str())
    }

    /// Returns `true` for an empty document.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Source of syntax trees for documents.
pub trait SyntaxTreeProvider: Send + Sync {
    /// Returns the tree of `document` at its current version.
    fn tree(&self, document: &Document) -> Arc<SyntaxTree>;
}

/// Per-document cache of parsed trees keyed by version.
#[derive(Default)]
pub struct TreeCache {
    entries: RwLock<FxHashMap<DocumentId, (i32, Arc<SyntaxTree>)>>,
}

impl TreeCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached tree when it was built for `version`.
    pub fn get(&self, id: DocumentId, version: i32) -> Option<Arc<SyntaxTree>> {
        let entries = self.entries.read();
        entries
            .get(&id)
            .filter(|(cached, _)| *cached == version)
            .map(|(_, tree)| Arc::clone(tree))
    }

    /// Stores `tree` for `version`, replacing any other version.
    pub fn insert(&self, id: DocumentId, version: i32, tree: Arc<SyntaxTree>) {
        self.entries.write().insert(id, (version, tree));
    }

    /// Drops the entry of a document.
    pub fn invalidate(&self, id: DocumentId) {
        self.entries.write().remove(&id);
    }

    /// Number of cached documents.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns `true` if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

/// Provider that parses documents with the built-in AL parser.
#[derive(Default)]
pub struct ParsingProvider {
    cache: TreeCache,
}

impl ParsingProvider {
    /// Creates a provider with an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Access to the underlying cache.
    pub fn cache(&self) -> &TreeCache {
        &self.cache
    }

    /// Forgets the tree of a document.
    pub fn invalidate(&self, id: DocumentId) {
        self.cache.invalidate(id);
    }
}

impl SyntaxTreeProvider for ParsingProvider {
    fn tree(&self, document: &Document) -> Arc<SyntaxTree> {
        if let Some(tree) = self.cache.get(document.id, document.version) {
            return tree;
        }

        let tree = Arc::new(SyntaxTree::parse(document.text.as_str()));
        tracing::debug!(
            document = %document.id,
            version = document.version,
            nodes = tree.node_count(),
            errors = tree.errors().len(),
            "parsed document"
        );
        self.cache.insert(document.id, document.version, Arc::clone(&tree));
        tree
    }
}
