use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{BuildstampError, Result};

/// Name of the project-local configuration file.
pub const CONFIG_FILE_NAME: &str = "buildstamp.toml";

/// Represents the complete configuration for buildstamp.
///
/// Contains counter file names, manifest rendering, the packager command and tagging options.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub files: FilesConfig,

    #[serde(default)]
    pub render: RenderSettings,

    #[serde(default)]
    pub packager: PackagerConfig,

    #[serde(default)]
    pub git: GitConfig,
}

fn default_version_file() -> String {
    "VERSION".to_string()
}

fn default_build_number_file() -> String {
    ".build_num".to_string()
}

fn default_audit_log_file() -> String {
    ".version_log".to_string()
}

/// Names of the persisted counter files, relative to the project root.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct FilesConfig {
    #[serde(default = "default_version_file")]
    pub version: String,

    #[serde(default = "default_build_number_file")]
    pub build_number: String,

    #[serde(default = "default_audit_log_file")]
    pub audit_log: String,
}

impl Default for FilesConfig {
    fn default() -> Self {
        FilesConfig {
            version: default_version_file(),
            build_number: default_build_number_file(),
            audit_log: default_audit_log_file(),
        }
    }
}

fn default_version_token() -> String {
    "version".to_string()
}

/// Manifest rendering for the build action.
///
/// Rendering is skipped when no template is configured.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RenderSettings {
    #[serde(default)]
    pub template: Option<String>,

    #[serde(default)]
    pub output: Option<String>,

    /// Token that receives the current semantic version
    #[serde(default = "default_version_token")]
    pub version_token: String,

    /// Static tokens merged into every render
    #[serde(default)]
    pub tokens: BTreeMap<String, String>,
}

impl Default for RenderSettings {
    fn default() -> Self {
        RenderSettings {
            template: None,
            output: None,
            version_token: default_version_token(),
            tokens: BTreeMap::new(),
        }
    }
}

/// External packaging command; skipped when `program` is unset.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct PackagerConfig {
    #[serde(default)]
    pub program: Option<String>,

    #[serde(default)]
    pub args: Vec<String>,
}

fn default_tag_pattern() -> String {
    "v{version}".to_string()
}

fn default_remote() -> String {
    "origin".to_string()
}

/// Options for the `gittag` command.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct GitConfig {
    #[serde(default = "default_tag_pattern")]
    pub tag_pattern: String,

    #[serde(default = "default_remote")]
    pub remote: String,
}

impl Default for GitConfig {
    fn default() -> Self {
        GitConfig {
            tag_pattern: default_tag_pattern(),
            remote: default_remote(),
        }
    }
}

impl Config {
    /// Parse configuration from TOML text
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| BuildstampError::config(e.to_string()))
    }

    /// Validate cross-field constraints
    pub fn validate(&self) -> Result<()> {
        if self.render.template.is_some() && self.render.output.is_none() {
            return Err(BuildstampError::config(
                "render.output is required when render.template is set",
            ));
        }
        if self.render.version_token.trim().is_empty() {
            return Err(BuildstampError::config("render.version_token must not be empty"));
        }
        Ok(())
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `buildstamp.toml` in the project root
/// 3. `buildstamp/config.toml` in the user config directory
/// 4. Default configuration if no file found
///
/// # Arguments
/// * `config_path` - Optional path to custom configuration file
/// * `root` - Project root holding the counter files
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If file exists but cannot be read, parsed or validated
pub fn load_config(config_path: Option<&Path>, root: &Path) -> Result<Config> {
    let path = match resolve_config_path(config_path, root) {
        Some(path) => path,
        None => {
            tracing::debug!("no configuration file found, using defaults");
            return Ok(Config::default());
        }
    };

    tracing::debug!(path = %path.display(), "loading configuration");
    let text = fs::read_to_string(&path).map_err(|e| {
        BuildstampError::config(format!("cannot read {}: {}", path.display(), e))
    })?;
    let config = Config::from_toml(&text)?;
    config.validate()?;
    Ok(config)
}

fn resolve_config_path(config_path: Option<&Path>, root: &Path) -> Option<PathBuf> {
    if let Some(path) = config_path {
        return Some(path.to_path_buf());
    }

    let local = root.join(CONFIG_FILE_NAME);
    if local.exists() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|dir| dir.join("buildstamp").join("config.toml"))
        .filter(|path| path.exists())
}
