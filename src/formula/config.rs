//! Translator configuration — loads optional ~/.indicator-formula/config.yaml.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::emit::DEFAULT_FIELD_DELIMITER;
use super::functions::{FunctionRule, FunctionTable};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("{name} is a built-in function and cannot be renamed")]
    ReservedFunction { name: String },

    #[error("invalid function name '{name}'")]
    InvalidFunctionName { name: String },

    #[error("function {name} has an empty target")]
    EmptyTarget { name: String },

    #[error("field delimiter must not be empty")]
    EmptyDelimiter,
}

/// Translator configuration loaded from YAML.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FormulaConfig {
    /// Text wrapped around field names in the output.
    #[serde(default = "default_field_delimiter")]
    pub field_delimiter: String,
    /// Extra generic renames, NAME -> target function.
    #[serde(default)]
    pub functions: BTreeMap<String, String>,
}

fn default_field_delimiter() -> String {
    DEFAULT_FIELD_DELIMITER.to_string()
}

impl Default for FormulaConfig {
    fn default() -> Self {
        Self {
            field_delimiter: default_field_delimiter(),
            functions: BTreeMap::new(),
        }
    }
}

impl FormulaConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Built-in table extended with the configured renames.
    ///
    /// Renames may replace built-in renames but never the bespoke functions.
    pub fn function_table(&self) -> Result<FunctionTable, ConfigError> {
        let mut table = FunctionTable::builtin();
        for (name, target) in &self.functions {
            if !is_function_name(name) {
                return Err(ConfigError::InvalidFunctionName { name: name.clone() });
            }
            if target.trim().is_empty() {
                return Err(ConfigError::EmptyTarget { name: name.clone() });
            }
            if table.get(name).is_some_and(FunctionRule::is_bespoke) {
                return Err(ConfigError::ReservedFunction { name: name.clone() });
            }
            table.insert(name.clone(), FunctionRule::rename(target.trim()));
        }
        Ok(table)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.field_delimiter.is_empty() {
            return Err(ConfigError::EmptyDelimiter);
        }
        self.function_table().map(|_| ())
    }
}

fn is_function_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Get the default config file path.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".indicator-formula").join("config.yaml"))
}

/// Load configuration from `path`.
pub fn load_config_from(path: &Path) -> Result<FormulaConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config = FormulaConfig::from_yaml(&content)?;
    config.validate()?;
    Ok(config)
}

/// Load configuration from ~/.indicator-formula/config.yaml.
/// Returns `Ok(None)` if the file doesn't exist.
pub fn load_config() -> Result<Option<FormulaConfig>, ConfigError> {
    match config_path() {
        Some(path) if path.exists() => load_config_from(&path).map(Some),
        _ => Ok(None),
    }
}
