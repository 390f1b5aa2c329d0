//! Configuration for an IDE session.
//!
//! Settings can be loaded from environment variables or constructed
//! programmatically.

use runtime_loader::DEFAULT_RUNTIME_BASE;
use std::env;
use std::path::PathBuf;

/// Default file name used when saving a project.
pub const DEFAULT_PROJECT_FILE: &str = "mini-ide-project.json";
/// Default file name used when exporting the preview.
pub const DEFAULT_EXPORT_FILE: &str = "export.html";

/// Runtime configuration for an IDE session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IdeConfig {
    /// Versioned base URL of the hosted runtime distribution
    pub runtime_base: String,
    /// Where `save_project`/`load_project` read and write
    pub project_file: PathBuf,
    /// Where `export_html` writes the composed preview
    pub export_file: PathBuf,
}

impl IdeConfig {
    /// Construct a new `IdeConfig` with explicit values.
    ///
    /// # Arguments
    ///
    /// * `runtime_base` - Base URL the runtime module, script and index hang off
    /// * `project_file` - Default project save location
    /// * `export_file` - Default preview export location
    #[inline]
    #[must_use]
    pub fn new(
        runtime_base: impl Into<String>,
        project_file: impl Into<PathBuf>,
        export_file: impl Into<PathBuf>,
    ) -> Self {
        Self {
            runtime_base: runtime_base.into(),
            project_file: project_file.into(),
            export_file: export_file.into(),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Reads the following environment variables:
    /// - `IDE_RUNTIME_BASE_URL`: runtime base URL (default: the pinned hosted release)
    /// - `IDE_PROJECT_FILE`: project file path (default: `mini-ide-project.json`)
    /// - `IDE_EXPORT_FILE`: export path (default: `export.html`)
    ///
    /// Empty values fall back to the defaults.
    #[inline]
    #[must_use]
    pub fn from_env() -> Self {
        let read = |key: &str, default: &str| {
            env::var(key)
                .ok()
                .filter(|val| !val.trim().is_empty())
                .unwrap_or_else(|| default.to_owned())
        };
        Self::new(
            read("IDE_RUNTIME_BASE_URL", DEFAULT_RUNTIME_BASE),
            read("IDE_PROJECT_FILE", DEFAULT_PROJECT_FILE),
            read("IDE_EXPORT_FILE", DEFAULT_EXPORT_FILE),
        )
    }
}

impl Default for IdeConfig {
    fn default() -> Self {
        Self::new(DEFAULT_RUNTIME_BASE, DEFAULT_PROJECT_FILE, DEFAULT_EXPORT_FILE)
    }
}
