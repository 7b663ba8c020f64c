//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Config file: `--config <path>`, else `$XDG_CONFIG_HOME/pdf-bookmark/pdf-bookmark.toml`
//! 3. Environment variables: `PDF_BOOKMARK_*` prefix

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::format::{Item, StrftimeItems};
use config::{Config, ConfigError, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::DEFAULT_MAX_NAME_TREE_DEPTH;

pub const APP_NAME: &str = "pdf-bookmark";
pub const ENV_PREFIX: &str = "PDF_BOOKMARK";

/// How output file names are derived from the input document.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Naming {
    /// `<stem><suffix>.pdf`, `<stem>.txt`
    #[default]
    Suffix,
    /// `<stem>-<timestamp>.pdf`, `<stem>-<timestamp>.txt`
    Timestamp,
}

impl fmt::Display for Naming {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Naming::Suffix => write!(f, "suffix"),
            Naming::Timestamp => write!(f, "timestamp"),
        }
    }
}

/// Unified configuration for pdf-bookmark.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Output naming scheme (default: suffix)
    pub naming: Naming,
    /// Appended to the document stem for written PDFs (default: "-new")
    pub suffix: String,
    /// chrono format string used by the timestamp scheme
    pub timestamp_format: String,
    /// Page offset used when a command omits it
    pub default_offset: i64,
    /// Nesting cap for the named-destination tree
    pub max_name_tree_depth: usize,
    /// Nesting cap when reading an outline
    pub max_outline_depth: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            naming: Naming::Suffix,
            suffix: "-new".into(),
            timestamp_format: "%y%m%d%H%M%S".into(),
            default_offset: 0,
            max_name_tree_depth: DEFAULT_MAX_NAME_TREE_DEPTH,
            max_outline_depth: 64,
        }
    }
}

/// Get the XDG config directory for pdf-bookmark.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join(format!("{APP_NAME}.toml")))
}

impl Settings {
    /// Load settings from defaults, config file and environment.
    ///
    /// An explicit `config_path` must exist; the global file is optional.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ApplicationError> {
        Self::load_with_env(
            config_path,
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
    }

    /// Load with a caller-supplied environment source.
    pub fn load_with_env(
        config_path: Option<&Path>,
        env: Environment,
    ) -> Result<Self, ApplicationError> {
        let defaults = Settings::default();
        let mut builder = Config::builder()
            .set_default("naming", defaults.naming.to_string())
            .map_err(config_err)?
            .set_default("suffix", defaults.suffix.clone())
            .map_err(config_err)?
            .set_default("timestamp_format", defaults.timestamp_format.clone())
            .map_err(config_err)?
            .set_default("default_offset", defaults.default_offset)
            .map_err(config_err)?
            .set_default("max_name_tree_depth", defaults.max_name_tree_depth as i64)
            .map_err(config_err)?
            .set_default("max_outline_depth", defaults.max_outline_depth as i64)
            .map_err(config_err)?;

        match config_path {
            Some(path) => {
                if !path.exists() {
                    return Err(ApplicationError::Config {
                        message: format!("config file not found: {}", path.display()),
                    });
                }
                builder = builder.add_source(File::from(path).required(true));
            }
            None => {
                if let Some(global_path) = global_config_path() {
                    builder = builder.add_source(File::from(global_path).required(false));
                }
            }
        }

        let config = builder.add_source(env).build().map_err(config_err)?;
        let settings: Self = config.try_deserialize().map_err(config_err)?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ApplicationError> {
        if self.max_name_tree_depth == 0 || self.max_outline_depth == 0 {
            return Err(ApplicationError::Config {
                message: "traversal depth limits must be positive".into(),
            });
        }
        if self.naming == Naming::Timestamp && self.timestamp_format.is_empty() {
            return Err(ApplicationError::Config {
                message: "timestamp naming requires a timestamp_format".into(),
            });
        }
        if StrftimeItems::new(&self.timestamp_format).any(|item| matches!(item, Item::Error)) {
            return Err(ApplicationError::Config {
                message: format!("invalid timestamp_format: {:?}", self.timestamp_format),
            });
        }
        Ok(())
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# pdf-bookmark configuration
#
# Locations (by precedence, lowest to highest):
#   File: ~/.config/pdf-bookmark/pdf-bookmark.toml (or --config <path>)
#   Env:  PDF_BOOKMARK_* environment variables (e.g. PDF_BOOKMARK_DEFAULT_OFFSET=2)

# Output naming: "suffix" writes <stem>-new.pdf and <stem>.txt,
# "timestamp" writes <stem>-<timestamp>.pdf and <stem>-<timestamp>.txt
# naming = "suffix"

# Appended to the document name for written PDFs
# suffix = "-new"

# chrono format used by the timestamp naming scheme
# timestamp_format = "%y%m%d%H%M%S"

# Offset added to every imported page number when none is given
# default_offset = 0

# Traversal limits for malformed documents
# max_name_tree_depth = 64
# max_outline_depth = 64
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
