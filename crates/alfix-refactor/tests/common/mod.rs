//! Shared helpers for alfix-refactor integration tests.

#![allow(dead_code)]

use alfix_refactor::{
    apply_edits, code_actions, default_providers, CodeAction, ProjectInfo, RefactorConfig,
    RefactorContext, RefactorUi, SourceChange, Workspace,
};
use alfix_syntax::{DocumentId, ParsingProvider};
use text_size::{TextRange, TextSize};

/// One workspace document plus everything a refactoring needs.
pub struct Workbench {
    pub workspace: Workspace,
    pub document: DocumentId,
    pub provider: ParsingProvider,
    pub config: RefactorConfig,
    pub project: ProjectInfo,
}

impl Workbench {
    pub fn new(source: &str) -> Self {
        let mut workspace = Workspace::new();
        let document = workspace.add("src/Test.Codeunit.al", source);
        Self {
            workspace,
            document,
            provider: ParsingProvider::new(),
            config: RefactorConfig::default(),
            project: ProjectInfo::default(),
        }
    }

    /// Adds another document and returns its id.
    pub fn add(&mut self, uri: &str, source: &str) -> DocumentId {
        self.workspace.add(uri, source)
    }

    pub fn ctx<'a>(&'a self, ui: &'a dyn RefactorUi) -> RefactorContext<'a> {
        RefactorContext::new(&self.workspace, &self.provider, &self.config, &self.project, ui)
    }

    pub fn source(&self) -> &str {
        &self.workspace.get(self.document).unwrap().text
    }

    pub fn offset_of(&self, needle: &str) -> TextSize {
        let index = self
            .source()
            .find(needle)
            .unwrap_or_else(|| panic!("`{needle}` not in source"));
        TextSize::from(index as u32)
    }

    /// Every action offered with the cursor at the start of `needle`.
    pub fn actions_at(&self, ui: &dyn RefactorUi, needle: &str) -> Vec<CodeAction> {
        let range = TextRange::empty(self.offset_of(needle));
        code_actions(&self.ctx(ui), &default_providers(), self.document, range)
    }

    /// The action titled `title` at `needle`.
    pub fn action(&self, ui: &dyn RefactorUi, needle: &str, title: &str) -> CodeAction {
        let actions = self.actions_at(ui, needle);
        actions
            .iter()
            .find(|action| action.title == title)
            .cloned()
            .unwrap_or_else(|| {
                let titles: Vec<_> = actions.iter().map(|a| a.title.as_str()).collect();
                panic!("no action `{title}` at `{needle}`, got {titles:?}")
            })
    }

    /// Main document text after `change`.
    pub fn apply(&self, change: &SourceChange) -> String {
        apply_edits(self.source(), change.edits_for(self.document)).unwrap()
    }
}
