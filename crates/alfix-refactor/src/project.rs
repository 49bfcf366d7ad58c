//! Project metadata from `app.json`.

use std::path::Path;

use serde::Deserialize;
use tracing::{debug, warn};

/// Manifest file of an AL project.
pub const APP_MANIFEST: &str = "app.json";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AppManifest {
    name: Option<String>,
    version: Option<String>,
}

/// What the engine needs to know about the project.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectInfo {
    /// App name.
    pub name: Option<String>,
    /// App version, used by `[Obsolete]` attributes.
    pub version: Option<String>,
}

impl ProjectInfo {
    /// Reads `app.json` from `root`. A missing or invalid manifest gives an
    /// empty project.
    #[must_use]
    pub fn load(root: &Path) -> Self {
        let path = root.join(APP_MANIFEST);
        match std::fs::read_to_string(&path) {
            Ok(contents) => Self::from_json(&contents),
            Err(err) => {
                debug!("no {} in {}: {err}", APP_MANIFEST, root.display());
                Self::default()
            }
        }
    }

    /// Parses manifest text.
    #[must_use]
    pub fn from_json(contents: &str) -> Self {
        match serde_json::from_str::<AppManifest>(contents) {
            Ok(manifest) => Self {
                name: manifest.name,
                version: manifest.version.filter(|v| !v.trim().is_empty()),
            },
            Err(err) => {
                warn!("Failed to parse {APP_MANIFEST}: {err}");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_version() {
        let project = ProjectInfo::from_json(
            r#"{ "id": "0000", "name": "Sales Tools", "publisher": "Me", "version": "1.2.0.0" }"#,
        );
        assert_eq!(project.name.as_deref(), Some("Sales Tools"));
        assert_eq!(project.version.as_deref(), Some("1.2.0.0"));
    }

    #[test]
    fn test_invalid_manifest_has_no_version() {
        assert_eq!(ProjectInfo::from_json("{ version: "), ProjectInfo::default());
        assert_eq!(ProjectInfo::from_json(r#"{ "version": "" }"#).version, None);
    }

    #[test]
    fn test_missing_manifest() {
        let project = ProjectInfo::load(Path::new("/nonexistent/alfix/project"));
        assert_eq!(project, ProjectInfo::default());
    }
}
