//! Everything a refactoring needs, passed explicitly.

use std::sync::Arc;

use alfix_syntax::{Document, DocumentId, SyntaxTree, SyntaxTreeProvider};
use indexmap::IndexMap;

use crate::config::RefactorConfig;
use crate::error::RefactorError;
use crate::project::ProjectInfo;
use crate::prompt::RefactorUi;
use crate::resolve::WorkspaceTrees;

/// Open documents of a workspace, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct Workspace {
    documents: IndexMap<DocumentId, Document>,
    next_id: u32,
}

impl Workspace {
    /// Creates an empty workspace.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a document at version 1 and returns its id.
    pub fn add(&mut self, uri: impl Into<String>, text: impl Into<String>) -> DocumentId {
        let id = DocumentId(self.next_id);
        self.next_id += 1;
        self.documents.insert(id, Document::new(id, uri, 1, text));
        id
    }

    /// Replaces the text of a document and bumps its version.
    pub fn update(&mut self, id: DocumentId, text: impl Into<String>) -> Result<(), RefactorError> {
        let document = self
            .documents
            .get_mut(&id)
            .ok_or(RefactorError::UnknownDocument(id))?;
        document.text = text.into();
        document.version += 1;
        Ok(())
    }

    /// Looks up a document.
    #[must_use]
    pub fn get(&self, id: DocumentId) -> Option<&Document> {
        self.documents.get(&id)
    }

    /// Finds a document by URI (exact match).
    #[must_use]
    pub fn find_by_uri(&self, uri: &str) -> Option<&Document> {
        self.documents.values().find(|d| d.uri == uri)
    }

    /// All documents.
    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        self.documents.values()
    }

    /// Number of documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Returns `true` if there are no documents.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// Per-request view of the workspace, tree source, options and user.
#[derive(Clone, Copy)]
pub struct RefactorContext<'a> {
    /// Documents.
    pub workspace: &'a Workspace,
    /// Tree source.
    pub provider: &'a dyn SyntaxTreeProvider,
    /// Engine options.
    pub config: &'a RefactorConfig,
    /// Project metadata.
    pub project: &'a ProjectInfo,
    /// User interaction.
    pub ui: &'a dyn RefactorUi,
}

impl<'a> RefactorContext<'a> {
    /// Bundles the collaborators of one request.
    #[must_use]
    pub fn new(
        workspace: &'a Workspace,
        provider: &'a dyn SyntaxTreeProvider,
        config: &'a RefactorConfig,
        project: &'a ProjectInfo,
        ui: &'a dyn RefactorUi,
    ) -> Self {
        Self {
            workspace,
            provider,
            config,
            project,
            ui,
        }
    }

    /// A document of the workspace.
    pub fn document(&self, id: DocumentId) -> Result<&'a Document, RefactorError> {
        self.workspace
            .get(id)
            .ok_or(RefactorError::UnknownDocument(id))
    }

    /// Tree of a document at its current version.
    pub fn tree(&self, id: DocumentId) -> Result<Arc<SyntaxTree>, RefactorError> {
        Ok(self.provider.tree(self.document(id)?))
    }

    /// Trees of every document.
    #[must_use]
    pub fn trees(&self) -> WorkspaceTrees {
        WorkspaceTrees::new(
            self.workspace
                .documents()
                .map(|document| (document.id, self.provider.tree(document)))
                .collect(),
        )
    }
}
