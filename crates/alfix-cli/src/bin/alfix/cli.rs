//! CLI definitions for alfix.

use std::path::PathBuf;

use alfix_syntax::LineCol;
use clap::{ArgAction, Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "alfix",
    version,
    about = "Refactorings for AL (Business Central) sources",
    after_help = "Examples:\n  alfix actions src/Sales.Codeunit.al --at 12:9\n  alfix apply src/Sales.Codeunit.al --at 12:9 --action 0 --write\n  alfix apply src/Sales.Codeunit.al --at 14:9 --to 16:30 --action \"Extract procedure\" --json\n  alfix tree src/Sales.Codeunit.al"
)]
pub struct Cli {
    /// Log engine decisions to stderr.
    #[arg(long, short, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the code actions offered at a position or selection.
    Actions {
        #[command(flatten)]
        target: Target,
        /// Print the actions as JSON.
        #[arg(long, action = ArgAction::SetTrue)]
        json: bool,
    },
    /// Run one code action and print or write the result.
    #[command(
        after_help = "Without --write the changed documents are printed to stdout.\nWith --json the edits are printed as an LSP WorkspaceEdit."
    )]
    Apply {
        #[command(flatten)]
        target: Target,
        /// Index or title of the action (see `alfix actions`).
        #[arg(long, short)]
        action: String,
        /// Write the changed documents back to disk.
        #[arg(long, action = ArgAction::SetTrue, conflicts_with = "json")]
        write: bool,
        /// Print the edits as an LSP WorkspaceEdit.
        #[arg(long, action = ArgAction::SetTrue)]
        json: bool,
        /// Never prompt; use defaults instead.
        #[arg(long, action = ArgAction::SetTrue)]
        no_input: bool,
    },
    /// Print the syntax tree of a file.
    Tree {
        /// AL source file.
        file: PathBuf,
    },
}

/// Where an action applies.
#[derive(Debug, Clone, Args)]
pub struct Target {
    /// AL source file.
    pub file: PathBuf,
    /// Start position as LINE:COLUMN (1-based).
    #[arg(long, value_parser = parse_position)]
    pub at: LineCol,
    /// End of the selection as LINE:COLUMN (1-based). Defaults to `--at`.
    #[arg(long, value_parser = parse_position)]
    pub to: Option<LineCol>,
    /// Project folder (defaults to the nearest folder with app.json or alfix.toml).
    #[arg(long)]
    pub project: Option<PathBuf>,
}

/// Parses a 1-based `LINE:COLUMN` pair into a zero-based position.
pub fn parse_position(text: &str) -> Result<LineCol, String> {
    let (line, col) = text
        .split_once(':')
        .ok_or_else(|| format!("expected LINE:COLUMN, got '{text}'"))?;
    let line: u32 = line
        .trim()
        .parse()
        .map_err(|err| format!("invalid line '{line}': {err}"))?;
    let col: u32 = col
        .trim()
        .parse()
        .map_err(|err| format!("invalid column '{col}': {err}"))?;
    if line == 0 || col == 0 {
        return Err("line and column start at 1".to_string());
    }
    Ok(LineCol {
        line: line - 1,
        col: col - 1,
    })
}
