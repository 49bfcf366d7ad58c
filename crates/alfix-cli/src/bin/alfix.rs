//! CLI entrypoint for alfix.

#[path = "alfix/cli.rs"]
mod cli;
#[path = "alfix/commands.rs"]
mod commands;
#[path = "alfix/lsp.rs"]
mod lsp;
#[path = "alfix/prompt.rs"]
mod prompt;
#[path = "alfix/style.rs"]
mod style;
#[path = "alfix/workspace.rs"]
mod workspace;

use std::path::Path;

use alfix_refactor::AlfixConfig;
use anyhow::Context;
use clap::Parser;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command};
use commands::Output;
use workspace::ProjectWorkspace;

fn main() {
    if let Err(err) = run() {
        eprintln!("{}", style::error(format!("Error: {err:#}")));
        std::process::exit(1);
    }
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let file = match &cli.command {
        Command::Actions { target, .. } | Command::Apply { target, .. } => target.file.as_path(),
        Command::Tree { file } => file.as_path(),
    };
    let file = file
        .canonicalize()
        .with_context(|| format!("{} not found", file.display()))?;
    let root = match &cli.command {
        Command::Actions { target, .. } | Command::Apply { target, .. } => target
            .project
            .clone()
            .unwrap_or_else(|| workspace::project_root(&file)),
        Command::Tree { .. } => workspace::project_root(&file),
    };

    let loaded = AlfixConfig::try_load(&root);
    let level = if cli.verbose {
        "debug".to_string()
    } else {
        loaded
            .as_ref()
            .map_or_else(|_| "warn".to_string(), |config| config.logging.level.clone())
    };
    init_tracing(&level);
    let config = loaded.unwrap_or_else(|err| {
        warn!("{err}; using default configuration");
        AlfixConfig::default()
    });

    match cli.command {
        Command::Actions { target, json } => {
            let project = open_project(&root, config)?;
            commands::list_actions(project, &target, json)
        }
        Command::Apply {
            target,
            action,
            write,
            json,
            no_input,
        } => {
            let output = if json {
                Output::Json
            } else if write {
                Output::Write
            } else {
                Output::Print
            };
            let project = open_project(&root, config)?;
            commands::apply_action(project, &target, &action, output, no_input)
        }
        Command::Tree { .. } => commands::print_tree(&file),
    }
}

fn open_project(root: &Path, config: AlfixConfig) -> anyhow::Result<ProjectWorkspace> {
    ProjectWorkspace::load(root, config)
        .with_context(|| format!("failed to load the AL sources of {}", root.display()))
}
