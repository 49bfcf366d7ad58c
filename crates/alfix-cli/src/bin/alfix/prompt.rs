//! Interactive answers for refactorings that ask.

use std::io::IsTerminal;

use alfix_refactor::{PickItem, RefactorUi, SuppressedUi, TextPrompt};
use dialoguer::{theme::ColorfulTheme, Input, MultiSelect};
use tracing::warn;

use crate::style;

pub(crate) fn use_dialoguer() -> bool {
    std::io::stdin().is_terminal() && std::io::stdout().is_terminal()
}

/// Prompts on the terminal through dialoguer.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct TerminalUi;

impl RefactorUi for TerminalUi {
    fn pick_many(&self, items: &[PickItem]) -> Option<Vec<usize>> {
        let theme = ColorfulTheme::default();
        let labels: Vec<String> = items
            .iter()
            .map(|item| {
                if item.description.is_empty() {
                    item.label.clone()
                } else {
                    format!("{}  {}", item.label, style::dim(&item.description))
                }
            })
            .collect();
        let defaults: Vec<bool> = items.iter().map(|item| item.picked).collect();
        match MultiSelect::with_theme(&theme)
            .with_prompt("Select the parameters to pass (space toggles, esc cancels)")
            .items(&labels)
            .defaults(&defaults)
            .interact_opt()
        {
            Ok(selection) => selection,
            Err(err) => {
                warn!("selection failed: {err}");
                None
            }
        }
    }

    fn prompt_text(
        &self,
        prompt: &TextPrompt,
        validate: &dyn Fn(&str) -> Option<String>,
    ) -> Option<String> {
        let theme = ColorfulTheme::default();
        let answer = Input::<String>::with_theme(&theme)
            .with_prompt(prompt.prompt.as_str())
            .with_initial_text(prompt.placeholder.as_str())
            .validate_with(|input: &String| -> Result<(), String> {
                validate(input.trim()).map_or(Ok(()), Err)
            })
            .interact_text();
        match answer {
            Ok(text) => Some(text.trim().to_string()),
            Err(err) => {
                warn!("input failed: {err}");
                None
            }
        }
    }
}

/// Terminal prompts when attached to one and allowed, silent defaults otherwise.
pub(crate) fn select_ui(no_input: bool) -> Box<dyn RefactorUi> {
    if !no_input && use_dialoguer() {
        Box::new(TerminalUi)
    } else {
        Box::new(SuppressedUi)
    }
}
