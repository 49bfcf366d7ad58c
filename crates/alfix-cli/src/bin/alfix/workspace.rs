//! AL sources on disk, loaded into an engine workspace.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use alfix_refactor::config::find_config_file;
use alfix_refactor::project::APP_MANIFEST;
use alfix_refactor::{AlfixConfig, ProjectInfo, RefactorContext, RefactorUi, Workspace};
use alfix_syntax::{Document, DocumentId, ParsingProvider};
use anyhow::Context;
use tracing::debug;

const SOURCE_PATTERNS: [&str; 2] = ["**/*.al", "**/*.AL"];

/// Nearest folder above `file` holding `app.json` or an alfix config,
/// falling back to the folder of `file`.
pub(crate) fn project_root(file: &Path) -> PathBuf {
    let start = file.parent().unwrap_or(file);
    start
        .ancestors()
        .find(|dir| dir.join(APP_MANIFEST).is_file() || find_config_file(dir).is_some())
        .unwrap_or(start)
        .to_path_buf()
}

/// Every AL document of a project plus what the engine needs around it.
pub(crate) struct ProjectWorkspace {
    pub root: PathBuf,
    pub workspace: Workspace,
    pub config: AlfixConfig,
    pub project: ProjectInfo,
    provider: ParsingProvider,
    paths: BTreeMap<DocumentId, PathBuf>,
}

impl ProjectWorkspace {
    /// Reads all `.al` files below `root`.
    pub(crate) fn load(root: &Path, config: AlfixConfig) -> anyhow::Result<Self> {
        let root = root
            .canonicalize()
            .with_context(|| format!("project folder {} not found", root.display()))?;
        let escaped = glob::Pattern::escape(&root.to_string_lossy());

        let mut seen = BTreeSet::new();
        let mut workspace = Workspace::new();
        let mut paths = BTreeMap::new();
        for pattern in SOURCE_PATTERNS {
            for entry in glob::glob(&format!("{escaped}/{pattern}"))? {
                let path = entry?;
                if !path.is_file() || !seen.insert(path.clone()) {
                    continue;
                }
                let text = fs::read_to_string(&path)
                    .with_context(|| format!("failed to read {}", path.display()))?;
                let id = workspace.add(display_uri(&root, &path), text);
                paths.insert(id, path);
            }
        }
        debug!(root = %root.display(), documents = workspace.len(), "workspace loaded");

        let project = ProjectInfo::load(&root);
        Ok(Self {
            root,
            workspace,
            config,
            project,
            provider: ParsingProvider::new(),
            paths,
        })
    }

    /// Id of `file`, reading it when it lies outside the project folder.
    pub(crate) fn open(&mut self, file: &Path) -> anyhow::Result<DocumentId> {
        let file = file
            .canonicalize()
            .with_context(|| format!("{} not found", file.display()))?;
        if let Some((id, _)) = self.paths.iter().find(|(_, path)| **path == file) {
            return Ok(*id);
        }
        let text = fs::read_to_string(&file)
            .with_context(|| format!("failed to read {}", file.display()))?;
        let id = self.workspace.add(display_uri(&self.root, &file), text);
        self.paths.insert(id, file);
        Ok(id)
    }

    pub(crate) fn document(&self, id: DocumentId) -> anyhow::Result<&Document> {
        self.workspace
            .get(id)
            .with_context(|| format!("unknown document {id}"))
    }

    pub(crate) fn path(&self, id: DocumentId) -> anyhow::Result<&Path> {
        self.paths
            .get(&id)
            .map(PathBuf::as_path)
            .with_context(|| format!("no file for document {id}"))
    }

    pub(crate) fn context<'a>(&'a self, ui: &'a dyn RefactorUi) -> RefactorContext<'a> {
        RefactorContext::new(
            &self.workspace,
            &self.provider,
            &self.config.refactor,
            &self.project,
            ui,
        )
    }
}

/// Path relative to the project root with forward slashes.
fn display_uri(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .map(|part| part.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
