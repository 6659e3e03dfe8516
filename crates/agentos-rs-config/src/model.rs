//! Configuration schema for AgentOS.

use crate::{ConfigError, parse_size};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root config for the gatekeepers.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct AgentOsConfig {
    #[serde(default, rename = "$schema")]
    pub schema: Option<String>,
    #[serde(default)]
    pub shell: ShellConfig,
    #[serde(default)]
    pub files: FilesConfig,
}

impl AgentOsConfig {
    /// Start building a config programmatically with defaults applied.
    pub fn builder() -> AgentOsConfigBuilder {
        AgentOsConfigBuilder::new()
    }
}

/// Builder for assembling an `AgentOsConfig` in code.
#[derive(Debug, Default, Clone)]
pub struct AgentOsConfigBuilder {
    config: AgentOsConfig,
}

impl AgentOsConfigBuilder {
    /// Create a new builder seeded with default config values.
    pub fn new() -> Self {
        Self {
            config: AgentOsConfig::default(),
        }
    }

    /// Replace the shell gatekeeper configuration.
    pub fn shell(mut self, shell: ShellConfig) -> Self {
        self.config.shell = shell;
        self
    }

    /// Replace the file gatekeeper configuration.
    pub fn files(mut self, files: FilesConfig) -> Self {
        self.config.files = files;
        self
    }

    /// Finalize and return the built `AgentOsConfig`.
    pub fn build(self) -> AgentOsConfig {
        self.config
    }
}

/// Command gatekeeper settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ShellConfig {
    #[serde(default = "default_allowed_commands")]
    pub allowed_commands: Vec<String>,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    #[serde(default = "default_max_output_chars")]
    pub max_output_chars: usize,
    #[serde(default = "default_shell_working_directory")]
    pub working_directory: PathBuf,
    #[serde(default)]
    pub max_concurrent_commands: Option<usize>,
    #[serde(default)]
    pub limits: ShellLimits,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            allowed_commands: default_allowed_commands(),
            timeout_seconds: default_timeout_seconds(),
            max_output_chars: default_max_output_chars(),
            working_directory: default_shell_working_directory(),
            max_concurrent_commands: None,
            limits: ShellLimits::default(),
        }
    }
}

/// Upper bound for `max_concurrent_commands`, the permit limit of a tokio semaphore.
pub const MAX_CONCURRENT_COMMANDS: usize = usize::MAX >> 3;

/// Default whitelist of base commands.
pub const DEFAULT_ALLOWED_COMMANDS: &str =
    "curl,git,ls,cat,head,tail,grep,pwd,whoami,date,echo,find,wc,sort,uniq";

fn default_allowed_commands() -> Vec<String> {
    split_command_list(DEFAULT_ALLOWED_COMMANDS)
}

/// Default command timeout in seconds.
fn default_timeout_seconds() -> u64 {
    30
}

/// Default per-stream output cap in characters.
fn default_max_output_chars() -> usize {
    10_000
}

fn default_shell_working_directory() -> PathBuf {
    std::env::temp_dir().join("agentos_shell")
}

/// Resource limits applied to spawned commands.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ShellLimits {
    #[serde(default)]
    pub cpu_seconds: Option<u64>,
    #[serde(default)]
    pub memory_bytes: Option<u64>,
    #[serde(default)]
    pub nofile: Option<u64>,
    #[serde(default)]
    pub pids: Option<u64>,
}

/// File gatekeeper settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FilesConfig {
    #[serde(default = "default_max_file_size")]
    pub max_file_size: String,
    #[serde(default = "default_files_base_directory")]
    pub base_directory: PathBuf,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            max_file_size: default_max_file_size(),
            base_directory: default_files_base_directory(),
        }
    }
}

impl FilesConfig {
    /// Maximum file size in bytes.
    pub fn max_file_size_bytes(&self) -> Result<u64, ConfigError> {
        parse_size(&self.max_file_size).map_err(|err| ConfigError::InvalidField {
            path: "files.max_file_size".to_string(),
            message: err.to_string(),
        })
    }
}

fn default_max_file_size() -> String {
    "50MB".to_string()
}

fn default_files_base_directory() -> PathBuf {
    std::env::temp_dir().join("agentos_files")
}

/// Split a comma separated command list, trimming entries and dropping empties.
pub fn split_command_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}
