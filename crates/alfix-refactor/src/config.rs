//! Workspace configuration loaded from `alfix.toml`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ConfigError;

/// File names searched in the workspace root, first match wins.
pub const CONFIG_FILES: &[&str] = &["alfix.toml", ".alfix.toml"];

/// Where a generated procedure goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProcedureLocation {
    /// Next to the procedure being refactored.
    #[default]
    AfterCurrent,
    /// Among procedures of the same access, sorted by name.
    SortedByName,
}

/// Options of the refactoring engine (`[refactor]` table).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RefactorConfig {
    /// Every new publisher parameter is passed by reference.
    pub publisher_has_var_parameters_only: bool,
    /// Placement of extracted procedures and new publishers.
    pub find_new_procedure_location: ProcedureLocation,
    /// Extracted labels get a `Comment` describing their placeholders.
    pub extract_to_label_creates_comment: bool,
    /// Label comments hold translations, so none is generated.
    pub comments_contain_translations: bool,
    /// Publisher parameter names that are always passed by reference.
    pub var_parameters: Vec<String>,
}

impl Default for RefactorConfig {
    fn default() -> Self {
        Self {
            publisher_has_var_parameters_only: false,
            find_new_procedure_location: ProcedureLocation::AfterCurrent,
            extract_to_label_creates_comment: false,
            comments_contain_translations: false,
            var_parameters: vec!["IsHandled".to_string()],
        }
    }
}

impl RefactorConfig {
    /// Returns `true` if a publisher parameter called `name` is by reference.
    #[must_use]
    pub fn is_var_parameter(&self, name: &str) -> bool {
        self.var_parameters
            .iter()
            .any(|candidate| alfix_syntax::names_equal(candidate, name))
    }
}

/// `[logging]` table, read by the command-line host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

/// Everything `alfix.toml` can hold.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlfixConfig {
    /// Engine options.
    pub refactor: RefactorConfig,
    /// Host logging options.
    pub logging: LoggingConfig,
}

impl AlfixConfig {
    /// Loads the configuration of a workspace root.
    ///
    /// Missing files give the defaults. Unreadable or invalid files are
    /// reported with a warning and also give the defaults.
    #[must_use]
    pub fn load(root: &Path) -> Self {
        match Self::try_load(root) {
            Ok(config) => config,
            Err(err) => {
                warn!("{err}; using default configuration");
                Self::default()
            }
        }
    }

    /// Loads the configuration of a workspace root, reporting failures.
    pub fn try_load(root: &Path) -> Result<Self, ConfigError> {
        let Some(path) = find_config_file(root) else {
            return Ok(Self::default());
        };
        let contents = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse { path, source })
    }

    /// Parses configuration text, falling back to defaults on error.
    #[must_use]
    pub fn from_contents(contents: &str) -> Self {
        match toml::from_str(contents) {
            Ok(config) => config,
            Err(err) => {
                warn!("Failed to parse alfix config: {err}");
                Self::default()
            }
        }
    }
}

/// Path of the configuration file of `root`, if any.
#[must_use]
pub fn find_config_file(root: &Path) -> Option<PathBuf> {
    CONFIG_FILES
        .iter()
        .map(|name| root.join(name))
        .find(|path| path.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AlfixConfig::from_contents("");
        assert_eq!(config, AlfixConfig::default());
        assert!(config.refactor.is_var_parameter("ishandled"));
        assert_eq!(
            config.refactor.find_new_procedure_location,
            ProcedureLocation::AfterCurrent
        );
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_camel_case_keys() {
        let config = AlfixConfig::from_contents(
            r#"
[refactor]
publisherHasVarParametersOnly = true
findNewProcedureLocation = "sortedByName"
extractToLabelCreatesComment = true
varParameters = ["IsHandled", "Skip"]

[logging]
level = "debug"
"#,
        );
        assert!(config.refactor.publisher_has_var_parameters_only);
        assert_eq!(
            config.refactor.find_new_procedure_location,
            ProcedureLocation::SortedByName
        );
        assert!(config.refactor.extract_to_label_creates_comment);
        assert!(!config.refactor.comments_contain_translations);
        assert!(config.refactor.is_var_parameter("Skip"));
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_invalid_contents_fall_back_to_defaults() {
        let config = AlfixConfig::from_contents("[refactor]\nvarParameters = 3\n");
        assert_eq!(config, AlfixConfig::default());
    }
}
