mod diagnostics;
mod policy;

use std::fs;
use std::path::Path;

use config::Config;
use config::ConfigError as ExternalConfigError;
use config::File;
use config::FileFormat;
use directories::ProjectDirs;
use serde::Deserialize;
use thiserror::Error;

pub use crate::diagnostics::DiagnosticSeverity;
pub use crate::diagnostics::DiagnosticsConfig;
pub use crate::policy::AmbiguityPolicy;
pub use crate::policy::OuterCapturePolicy;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration build/deserialize error")]
    Config(#[from] ExternalConfigError),
    #[error("Failed to read pyproject.toml")]
    PyprojectIo(#[from] std::io::Error),
    #[error("Failed to parse pyproject.toml TOML")]
    PyprojectParse(#[from] toml::de::Error),
    #[error("Failed to serialize extracted pyproject data")]
    PyprojectSerialize(#[from] toml::ser::Error),
}

/// The capture marker: the annotation prefix that requests a capture and the
/// module its runtime type is imported from.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MarkerSettings {
    pub name: String,
    pub module: String,
}

impl Default for MarkerSettings {
    fn default() -> Self {
        Self {
            name: "Capture".to_string(),
            module: "capture".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub marker: MarkerSettings,
    /// Module the generated location registry is emitted as.
    pub support_module: String,
    /// Where `capgen generate` writes artifacts, relative to the project root.
    pub output_dir: String,
    pub ambiguity: AmbiguityPolicy,
    pub outer_captures: OuterCapturePolicy,
    /// Extra names a captured expression may read without being flagged.
    pub allowed_names: Vec<String>,
    /// Gitignore-style globs of files to leave out of the program.
    pub exclude: Vec<String>,
    pub diagnostics: DiagnosticsConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            marker: MarkerSettings::default(),
            support_module: "capture_interception".to_string(),
            output_dir: "generated".to_string(),
            ambiguity: AmbiguityPolicy::default(),
            outer_captures: OuterCapturePolicy::default(),
            allowed_names: Vec::new(),
            exclude: Vec::new(),
            diagnostics: DiagnosticsConfig::default(),
        }
    }
}

impl Settings {
    pub fn new(project_root: &Path) -> Result<Self, ConfigError> {
        let user_config_file = ProjectDirs::from("com.github", "capgen", "capgen")
            .map(|proj_dirs| proj_dirs.config_dir().join("capgen.toml"));

        Self::load_from_paths(project_root, user_config_file.as_deref())
    }

    fn load_from_paths(
        project_root: &Path,
        user_config_path: Option<&Path>,
    ) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        if let Some(path) = user_config_path {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(false));
        }

        let pyproject_path = project_root.join("pyproject.toml");
        if pyproject_path.exists() {
            let content = fs::read_to_string(&pyproject_path)?;
            let full_toml_value: toml::Value = toml::from_str(&content)?;

            let tool_table = ["tool", "capgen"]
                .iter()
                .try_fold(&full_toml_value, |current, &key| current.get(key))
                .and_then(|value| value.as_table());

            if let Some(table) = tool_table {
                let extracted = toml::to_string(table)?;
                builder = builder.add_source(File::from_str(&extracted, FileFormat::Toml));
            }
        }

        for name in [".capgen.toml", "capgen.toml"] {
            builder = builder.add_source(
                File::from(project_root.join(name))
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        let settings: Settings = builder.build()?.try_deserialize()?;
        tracing::debug!(?settings, "loaded settings");
        Ok(settings)
    }
}
