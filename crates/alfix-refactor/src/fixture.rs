//! Shared setup for provider unit tests.

use alfix_syntax::{DocumentId, ParsingProvider};
use text_size::{TextRange, TextSize};

use crate::actions::{CodeAction, RefactoringProvider};
use crate::config::RefactorConfig;
use crate::context::{RefactorContext, Workspace};
use crate::edit::apply_edits;
use crate::project::ProjectInfo;
use crate::prompt::{RefactorUi, SuppressedUi};

pub(crate) struct Fixture {
    pub workspace: Workspace,
    pub document: DocumentId,
    pub provider: ParsingProvider,
    pub config: RefactorConfig,
    pub project: ProjectInfo,
}

impl Fixture {
    pub fn new(source: &str) -> Self {
        let mut workspace = Workspace::new();
        let document = workspace.add("test.al", source);
        Self {
            workspace,
            document,
            provider: ParsingProvider::new(),
            config: RefactorConfig::default(),
            project: ProjectInfo::default(),
        }
    }

    pub fn ctx<'a>(&'a self, ui: &'a dyn RefactorUi) -> RefactorContext<'a> {
        RefactorContext::new(&self.workspace, &self.provider, &self.config, &self.project, ui)
    }

    pub fn source(&self) -> &str {
        &self.workspace.get(self.document).unwrap().text
    }

    /// Offset of the first occurrence of `needle`.
    pub fn offset_of(&self, needle: &str) -> TextSize {
        TextSize::from(self.source().find(needle).unwrap() as u32)
    }

    /// Range covering the first occurrence of `needle`.
    pub fn range_of(&self, needle: &str) -> TextRange {
        TextRange::at(self.offset_of(needle), TextSize::of(needle))
    }

    /// Actions of `provider` with a non-prompting host.
    pub fn actions(&self, provider: &dyn RefactoringProvider, range: TextRange) -> Vec<CodeAction> {
        let ui = SuppressedUi;
        let ctx = self.ctx(&ui);
        if !provider.consider_line(&ctx, self.document, range) {
            return Vec::new();
        }
        provider.create_actions(&ctx, self.document, range)
    }

    /// Source after applying the eager edit of `action`.
    pub fn apply(&self, action: &CodeAction) -> String {
        let change = action.edit.as_ref().unwrap();
        apply_edits(self.source(), change.edits_for(self.document)).unwrap()
    }
}
