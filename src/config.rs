//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/domviz/domviz.toml`
//! 3. Local config: `./.domviz.toml`, or the file given with `--config`
//! 4. Environment variables: `DOMVIZ_*` prefix
//!
//! Command line flags are applied on top by the CLI layer.

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::ApplicationError;
use crate::domain::DEFAULT_ROOT_TAG;
use crate::util::path::expand_path;

/// File name used by the "save" menu entry unless configured otherwise.
pub const DEFAULT_SAVE_FILE: &str = "dom_structure.html";

/// Name of the local config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = ".domviz.toml";

/// Unified configuration for domviz.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Tag of the root element of every new tree (default: html)
    pub root_tag: String,
    /// Snapshot target of the save command (default: dom_structure.html)
    pub save_file: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            root_tag: DEFAULT_ROOT_TAG.to_string(),
            save_file: PathBuf::from(DEFAULT_SAVE_FILE),
        }
    }
}

/// Raw settings for intermediate parsing (`None` means "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub root_tag: Option<String>,
    pub save_file: Option<PathBuf>,
}

/// Get the XDG config directory for domviz.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "domviz").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("domviz.toml"))
}

/// Get the path to the local config file in a directory.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(LOCAL_CONFIG_FILE)
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            root_tag: overlay
                .root_tag
                .clone()
                .unwrap_or_else(|| self.root_tag.clone()),
            save_file: overlay
                .save_file
                .clone()
                .unwrap_or_else(|| self.save_file.clone()),
        }
    }

    /// Expand shell variables and tilde in path-like fields.
    fn expand_paths(&mut self) {
        self.save_file = expand_path(&self.save_file);
    }

    /// Reject settings that cannot produce a valid tree.
    pub fn validate(&self) -> Result<(), ApplicationError> {
        if self.root_tag.trim().is_empty() {
            return Err(ApplicationError::Config {
                message: "root_tag must not be empty".to_string(),
            });
        }
        if self.save_file.as_os_str().is_empty() {
            return Err(ApplicationError::Config {
                message: "save_file must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_config` - Explicit config file; it must exist. When `None`,
    ///   `./.domviz.toml` is used if present.
    pub fn load(local_config: Option<&Path>) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                debug!("loading global config {}", global_path.display());
                current = current.merge_with(&load_raw_settings(&global_path)?);
            }
        }

        // 3. Local config
        match local_config {
            Some(path) => {
                debug!("loading config {}", path.display());
                current = current.merge_with(&load_raw_settings(path)?);
            }
            None => {
                let path = local_config_path(Path::new("."));
                if path.exists() {
                    debug!("loading local config {}", path.display());
                    current = current.merge_with(&load_raw_settings(&path)?);
                }
            }
        }

        // 4. Environment variables
        current = Self::apply_env_overrides(current)?;

        current.expand_paths();
        current.validate()?;
        Ok(current)
    }

    /// Apply DOMVIZ_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("DOMVIZ")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("root_tag") {
            settings.root_tag = val;
        }
        if let Ok(val) = config.get_string("save_file") {
            settings.save_file = PathBuf::from(val);
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# domviz configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/domviz/domviz.toml
#   Local:  ./.domviz.toml (or --config <file>)
#   Env:    DOMVIZ_* environment variables
#   Flags:  domviz menu --root-tag / --save-file

# Tag of the root element of a new tree
# root_tag = "html"

# File written by the "Save DOM to File" menu entry (~ and $VAR are expanded)
# save_file = "dom_structure.html"
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
