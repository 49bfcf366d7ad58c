//! The `actions`, `apply` and `tree` subcommands.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use alfix_refactor::{
    apply_edits, code_actions, default_providers, execute_command, CodeAction, CommandResult,
    SuppressedUi,
};
use alfix_syntax::{DocumentId, LineIndex, SyntaxNode, SyntaxTree};
use anyhow::{anyhow, bail, Context};
use lsp_types::{Location, WorkspaceEdit};
use serde::Serialize;
use text_size::TextRange;
use tracing::debug;

use crate::cli::Target;
use crate::workspace::ProjectWorkspace;
use crate::{lsp, prompt, style};

/// How `apply` hands back its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Output {
    Print,
    Write,
    Json,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ActionEntry<'a> {
    index: usize,
    title: &'a str,
    kind: &'static str,
    deferred: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ApplyOutput<'a> {
    title: &'a str,
    edit: WorkspaceEdit,
    #[serde(skip_serializing_if = "Option::is_none")]
    rename: Option<Location>,
}

fn selection(project: &ProjectWorkspace, document: DocumentId, target: &Target) -> anyhow::Result<TextRange> {
    let doc = project.document(document)?;
    let start = lsp::offset(doc, target.at)?;
    let end = match target.to {
        Some(to) => lsp::offset(doc, to)?,
        None => start,
    };
    Ok(TextRange::new(start.min(end), start.max(end)))
}

pub(crate) fn list_actions(
    mut project: ProjectWorkspace,
    target: &Target,
    json: bool,
) -> anyhow::Result<()> {
    let document = project.open(&target.file)?;
    let range = selection(&project, document, target)?;
    let ui = SuppressedUi;
    let ctx = project.context(&ui);
    let actions = code_actions(&ctx, &default_providers(), document, range);
    debug!(count = actions.len(), ?range, "code actions");

    if json {
        let entries: Vec<ActionEntry<'_>> = actions
            .iter()
            .enumerate()
            .map(|(index, action)| ActionEntry {
                index,
                title: &action.title,
                kind: action.kind.as_str(),
                deferred: action.command.is_some(),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if actions.is_empty() {
        println!("{}", style::warning("No code actions here."));
        return Ok(());
    }
    for (index, action) in actions.iter().enumerate() {
        println!(
            "{} {} {}",
            style::accent(format!("[{index}]")),
            action.title,
            style::dim(format!("({})", action.kind.as_str()))
        );
    }
    Ok(())
}

fn select_action<'a>(actions: &'a [CodeAction], selector: &str) -> anyhow::Result<&'a CodeAction> {
    if actions.is_empty() {
        bail!("no code actions at this position");
    }
    if let Ok(index) = selector.parse::<usize>() {
        return actions
            .get(index)
            .ok_or_else(|| anyhow!("no action with index {index} ({} available)", actions.len()));
    }
    actions
        .iter()
        .find(|action| action.title.eq_ignore_ascii_case(selector.trim()))
        .ok_or_else(|| {
            let titles: Vec<&str> = actions.iter().map(|action| action.title.as_str()).collect();
            anyhow!("no action titled '{selector}'. Available: {}", titles.join(", "))
        })
}

pub(crate) fn apply_action(
    mut project: ProjectWorkspace,
    target: &Target,
    selector: &str,
    output: Output,
    no_input: bool,
) -> anyhow::Result<()> {
    let document = project.open(&target.file)?;
    let range = selection(&project, document, target)?;
    let ui = prompt::select_ui(no_input);
    let ctx = project.context(ui.as_ref());
    let actions = code_actions(&ctx, &default_providers(), document, range);
    let action = select_action(&actions, selector)?;

    let result: CommandResult = match (&action.edit, &action.command) {
        (Some(edit), _) => edit.clone().into(),
        (None, Some(command)) => {
            execute_command(&ctx, command).with_context(|| format!("'{}' failed", action.title))?
        }
        (None, None) => bail!("'{}' has nothing to apply", action.title),
    };

    let mut changed = Vec::new();
    for (id, edits) in &result.change.edits {
        let doc = project.document(*id)?;
        let text = apply_edits(&doc.text, edits)
            .with_context(|| format!("edits for {} do not apply", doc.uri))?;
        changed.push((*id, text));
    }
    let rename = match result.rename {
        Some((id, offset)) => {
            let text = changed
                .iter()
                .find(|(changed_id, _)| *changed_id == id)
                .map_or(project.document(id)?.text.as_str(), |(_, text)| text.as_str());
            Some(lsp::location_in(project.path(id)?, text, offset)?)
        }
        None => None,
    };

    match output {
        Output::Json => {
            let out = ApplyOutput {
                title: &action.title,
                edit: lsp::workspace_edit(&project, &result.change)?,
                rename,
            };
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Output::Write => {
            for (id, text) in &changed {
                let path = project.path(*id)?;
                fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))?;
                println!("{}", style::success(format!("Updated {}", project.document(*id)?.uri)));
            }
            if let Some(location) = rename {
                println!(
                    "Rename the new procedure at line {}, column {}.",
                    location.range.start.line + 1,
                    location.range.start.character + 1
                );
            }
        }
        Output::Print => {
            let headers = changed.len() > 1;
            for (id, text) in &changed {
                if headers {
                    println!("{}", style::accent(format!("==> {} <==", project.document(*id)?.uri)));
                }
                print!("{text}");
            }
        }
    }
    Ok(())
}

/// Indented dump of a tree, tokens with their text.
pub(crate) fn render_tree(tree: &SyntaxTree) -> String {
    fn write_node(out: &mut String, current: SyntaxNode<'_>, depth: usize) {
        let indent = "  ".repeat(depth);
        let range = current.text_range();
        if current.is_token() {
            let _ = writeln!(out, "{indent}{:?}@{range:?} {:?}", current.kind(), current.text());
            return;
        }
        let _ = writeln!(out, "{indent}{:?}@{range:?}", current.kind());
        for child in current.children() {
            write_node(out, child, depth + 1);
        }
    }

    let mut out = String::new();
    write_node(&mut out, tree.root(), 0);
    out
}

pub(crate) fn print_tree(file: &Path) -> anyhow::Result<()> {
    let text = fs::read_to_string(file).with_context(|| format!("failed to read {}", file.display()))?;
    let tree = SyntaxTree::parse(text.as_str());
    print!("{}", render_tree(&tree));

    let index = LineIndex::new(&text);
    for error in tree.errors() {
        let at = index.line_col(&text, error.range.start());
        println!(
            "{}",
            style::warning(format!("{}:{}: {}", at.line + 1, at.col + 1, error.message))
        );
    }
    Ok(())
}
