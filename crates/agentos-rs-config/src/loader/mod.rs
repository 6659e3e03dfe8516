//! Config loading: JSON5 files, schema checks, and environment overrides.
//!
//! Precedence (low -> high): compiled defaults, an optional JSON5 file, then
//! the `ALLOWED_COMMANDS` / `MAX_FILE_SIZE` environment variables.

mod env;
mod schema;


use crate::{AgentOsConfig, ConfigError, MAX_CONCURRENT_COMMANDS};
use log::{debug, info};
use serde_json::Value;
use std::fs;
use std::path::Path;

pub use env::{ENV_ALLOWED_COMMANDS, ENV_MAX_FILE_SIZE};

impl AgentOsConfig {
    /// Load a config from a JSON5 file (no environment overrides).
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        info!("loading config from path: {}", path.as_ref().display());
        let contents = fs::read_to_string(path)?;
        let value: Value = json5::from_str(&contents)?;
        config_from_value(value, "config")
    }

    /// Load a config from JSON5 contents (no environment overrides).
    pub fn load_from_str(contents: &str) -> Result<Self, ConfigError> {
        debug!("loading config from raw contents (len={})", contents.len());
        let value: Value = json5::from_str(contents)?;
        config_from_value(value, "config")
    }

    /// Defaults with process environment overrides applied.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_process_env()?;
        Ok(config)
    }

    /// Load an optional JSON5 file, then apply process environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::load_from_path(path)?,
            None => Self::default(),
        };
        config.apply_process_env()?;
        Ok(config)
    }

    /// Apply overrides from the process environment.
    pub fn apply_process_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env(|key| std::env::var(key).ok())
    }

    /// Apply overrides using an arbitrary variable lookup.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        env::apply_overrides(self, lookup)?;
        self.validate()
    }

    /// Validate configuration invariants that cannot be expressed in serde.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.shell.timeout_seconds == 0 {
            return Err(invalid("shell.timeout_seconds", "must be greater than zero"));
        }
        if self.shell.max_output_chars == 0 {
            return Err(invalid("shell.max_output_chars", "must be greater than zero"));
        }
        if let Some(limit) = self.shell.max_concurrent_commands
            && (limit == 0 || limit > MAX_CONCURRENT_COMMANDS)
        {
            return Err(invalid(
                "shell.max_concurrent_commands",
                &format!("must be between 1 and {MAX_CONCURRENT_COMMANDS} when set"),
            ));
        }
        if let Some(entry) = self
            .shell
            .allowed_commands
            .iter()
            .find(|entry| entry.trim().is_empty() || entry.contains(char::is_whitespace))
        {
            return Err(invalid(
                "shell.allowed_commands",
                &format!("command names must be single words: '{entry}'"),
            ));
        }
        self.files.max_file_size_bytes()?;
        Ok(())
    }
}

fn config_from_value(value: Value, label: &str) -> Result<AgentOsConfig, ConfigError> {
    schema::validate_schema(&value, label)?;
    let config: AgentOsConfig = serde_json::from_value(value)?;
    config.validate()?;
    Ok(config)
}

fn invalid(path: &str, message: &str) -> ConfigError {
    ConfigError::InvalidField {
        path: path.to_string(),
        message: message.to_string(),
    }
}
