//! User decisions during a refactoring.
//!
//! The engine never talks to a terminal or editor directly; it asks a
//! [`RefactorUi`]. Hosts provide their own implementation, tests use
//! [`ScriptedUi`], and batch runs use [`SuppressedUi`].

use std::collections::VecDeque;

use alfix_syntax::{lex, names_equal, TokenKind};
use parking_lot::Mutex;
use smol_str::SmolStr;
use thiserror::Error;

use crate::scope::ScopeNames;
use crate::text::unique_name;

/// Name proposed for a return value when no one can be asked.
pub const DEFAULT_RETURN_NAME: &str = "ReturnValue";

/// One entry of a multi-select list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickItem {
    /// Main text.
    pub label: String,
    /// Secondary text.
    pub description: String,
    /// Preselected.
    pub picked: bool,
}

/// A free-text question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextPrompt {
    /// Question shown to the user.
    pub prompt: String,
    /// Suggested answer.
    pub placeholder: String,
}

/// Host side of user interaction.
pub trait RefactorUi: Send + Sync {
    /// Lets the user choose any subset of `items`. `None` cancels.
    fn pick_many(&self, items: &[PickItem]) -> Option<Vec<usize>>;

    /// Asks for text. `validate` returns an error message for answers that
    /// must be rejected. `None` cancels.
    fn prompt_text(
        &self,
        prompt: &TextPrompt,
        validate: &dyn Fn(&str) -> Option<String>,
    ) -> Option<String>;

    /// Returns `true` when the user must not be asked; callers then use
    /// their defaults.
    fn is_suppressed(&self) -> bool {
        false
    }
}

/// Interaction that never asks.
#[derive(Debug, Clone, Copy, Default)]
pub struct SuppressedUi;

impl RefactorUi for SuppressedUi {
    fn pick_many(&self, _items: &[PickItem]) -> Option<Vec<usize>> {
        None
    }

    fn prompt_text(
        &self,
        _prompt: &TextPrompt,
        _validate: &dyn Fn(&str) -> Option<String>,
    ) -> Option<String> {
        None
    }

    fn is_suppressed(&self) -> bool {
        true
    }
}

/// A request a [`ScriptedUi`] received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiRequest {
    /// `pick_many` with its items.
    Pick(Vec<PickItem>),
    /// `prompt_text` with the answers the validator rejected.
    Text {
        /// The question.
        prompt: TextPrompt,
        /// Rejected answers with their messages.
        rejected: Vec<(String, String)>,
    },
}

/// Replays scripted answers and records every request.
#[derive(Debug, Default)]
pub struct ScriptedUi {
    picks: Mutex<VecDeque<Option<Vec<usize>>>>,
    texts: Mutex<VecDeque<Option<String>>>,
    requests: Mutex<Vec<UiRequest>>,
}

impl ScriptedUi {
    /// Creates a UI without scripted answers; every question cancels.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues the answer of the next `pick_many`.
    #[must_use]
    pub fn pick(self, answer: Option<Vec<usize>>) -> Self {
        self.picks.lock().push_back(answer);
        self
    }

    /// Queues an answer for `prompt_text`. Rejected answers consume the
    /// next queued one.
    #[must_use]
    pub fn text(self, answer: Option<&str>) -> Self {
        self.texts.lock().push_back(answer.map(str::to_string));
        self
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<UiRequest> {
        self.requests.lock().clone()
    }
}

impl RefactorUi for ScriptedUi {
    fn pick_many(&self, items: &[PickItem]) -> Option<Vec<usize>> {
        self.requests.lock().push(UiRequest::Pick(items.to_vec()));
        self.picks.lock().pop_front().flatten()
    }

    fn prompt_text(
        &self,
        prompt: &TextPrompt,
        validate: &dyn Fn(&str) -> Option<String>,
    ) -> Option<String> {
        let mut rejected = Vec::new();
        let answer = loop {
            let Some(answer) = self.texts.lock().pop_front().flatten() else {
                break None;
            };
            match validate(&answer) {
                Some(message) => rejected.push((answer, message)),
                None => break Some(answer),
            }
        };
        self.requests.lock().push(UiRequest::Text {
            prompt: prompt.clone(),
            rejected,
        });
        answer
    }
}

/// Why a proposed name cannot be used.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameConflict {
    /// Nothing was entered.
    #[error("the name must not be empty")]
    Empty,
    /// The text is not a single identifier.
    #[error("'{0}' is not a valid identifier")]
    NotIdentifier(String),
    /// A local variable already has the name.
    #[error("a local variable named '{0}' already exists")]
    Local(SmolStr),
    /// A parameter already has the name.
    #[error("a parameter named '{0}' already exists")]
    Parameter(SmolStr),
    /// A global variable already has the name.
    #[error("a global variable named '{0}' already exists")]
    Global(SmolStr),
}

fn is_identifier(name: &str) -> bool {
    let tokens = lex(name);
    matches!(
        tokens.as_slice(),
        [token] if matches!(token.kind, TokenKind::Ident | TokenKind::QuotedIdent)
    )
}

/// Checks `name` for use as a new variable inside the scope `names`
/// describes. Comparison ignores case.
pub fn validate_new_name(name: &str, names: &ScopeNames) -> Result<(), NameConflict> {
    if name.trim().is_empty() {
        return Err(NameConflict::Empty);
    }
    if !is_identifier(name) {
        return Err(NameConflict::NotIdentifier(name.to_string()));
    }
    let find = |list: &[SmolStr]| list.iter().find(|taken| names_equal(taken, name)).cloned();
    if let Some(taken) = find(&names.locals) {
        return Err(NameConflict::Local(taken));
    }
    if let Some(taken) = find(&names.parameters) {
        return Err(NameConflict::Parameter(taken));
    }
    if let Some(taken) = find(&names.globals) {
        return Err(NameConflict::Global(taken));
    }
    Ok(())
}

/// Asks for the name of an unnamed return value.
///
/// A suppressed UI gets [`DEFAULT_RETURN_NAME`], with a numeric suffix when
/// that name is taken. `None` means the user cancelled.
pub fn ask_return_name(ui: &dyn RefactorUi, names: &ScopeNames) -> Option<SmolStr> {
    if ui.is_suppressed() {
        let name = unique_name(DEFAULT_RETURN_NAME, |candidate| {
            validate_new_name(candidate, names).is_err()
        });
        return Some(SmolStr::new(name));
    }

    let prompt = TextPrompt {
        prompt: "Name of the return value".to_string(),
        placeholder: DEFAULT_RETURN_NAME.to_string(),
    };
    let validate = |text: &str| validate_new_name(text.trim(), names).err().map(|e| e.to_string());
    ui.prompt_text(&prompt, &validate)
        .map(|answer| SmolStr::new(answer.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names() -> ScopeNames {
        ScopeNames {
            locals: vec!["Total".into()],
            parameters: vec!["ReturnValue".into()],
            globals: vec!["\"Setup Rec\"".into()],
        }
    }

    #[test]
    fn test_validation_reports_collection() {
        let names = names();
        assert_eq!(validate_new_name("", &names), Err(NameConflict::Empty));
        assert_eq!(
            validate_new_name("total", &names),
            Err(NameConflict::Local("Total".into()))
        );
        assert_eq!(
            validate_new_name("RETURNVALUE", &names),
            Err(NameConflict::Parameter("ReturnValue".into()))
        );
        assert_eq!(
            validate_new_name("\"setup rec\"", &names),
            Err(NameConflict::Global("\"Setup Rec\"".into()))
        );
        assert_eq!(
            validate_new_name("two words", &names),
            Err(NameConflict::NotIdentifier("two words".to_string()))
        );
        assert_eq!(validate_new_name("Amount", &names), Ok(()));
    }

    #[test]
    fn test_suppressed_fallback_is_validated() {
        assert_eq!(
            ask_return_name(&SuppressedUi, &names()).as_deref(),
            Some("ReturnValue2")
        );
        assert_eq!(
            ask_return_name(&SuppressedUi, &ScopeNames::default()).as_deref(),
            Some("ReturnValue")
        );
    }

    #[test]
    fn test_scripted_answers_are_validated() {
        let ui = ScriptedUi::new().text(Some("Total")).text(Some(" Amount "));
        assert_eq!(ask_return_name(&ui, &names()).as_deref(), Some("Amount"));
        let requests = ui.requests();
        let [UiRequest::Text { prompt, rejected }] = requests.as_slice() else {
            panic!("unexpected requests {requests:?}");
        };
        assert_eq!(prompt.placeholder, "ReturnValue");
        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0].0, "Total");
    }

    #[test]
    fn test_cancel() {
        let ui = ScriptedUi::new().text(None);
        assert_eq!(ask_return_name(&ui, &names()), None);
        assert_eq!(ScriptedUi::new().pick_many(&[]), None);
    }
}
