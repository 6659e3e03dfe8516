//! Public SDK surface for AgentOS.
//!
//! This crate re-exports the gatekeeper building blocks and wires them into a
//! tool registry from a single [`AgentOsConfig`].

/// Re-export for convenience.
pub use agentos_rs_config as config;
/// Re-export for convenience.
pub use agentos_rs_protocol as protocol;
/// Re-export for convenience.
pub use agentos_rs_sandbox as sandbox;
/// Re-export for convenience.
pub use agentos_rs_tools as tools;

use agentos_rs_config::{AgentOsConfig, ConfigError};
use agentos_rs_sandbox::{AllowedCommands, CommandGatekeeper, SandboxError};
use agentos_rs_tools::{FileError, FileGatekeeper, FilePolicy, ToolRegistry};
use log::info;
use serde::Serialize;
use std::sync::Arc;

/// Errors raised while building gatekeepers from config.
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("command gatekeeper: {0}")]
    Commands(#[from] SandboxError),
    #[error("file gatekeeper: {0}")]
    Files(#[from] FileError),
}

/// Initialize logging with `env_logger`, honouring `RUST_LOG`.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_logging() {
    let _ = env_logger::builder()
        .format_timestamp_millis()
        .parse_default_env()
        .try_init();
}

/// Effective policies of both gatekeepers.
#[derive(Debug, Clone, Serialize)]
pub struct PolicySummary {
    pub shell: AllowedCommands,
    pub files: FilePolicy,
}

/// The command and file gatekeepers built from one config.
#[derive(Debug, Clone)]
pub struct Gatekeepers {
    pub commands: Arc<CommandGatekeeper>,
    pub files: Arc<FileGatekeeper>,
}

impl Gatekeepers {
    /// Build both gatekeepers, creating their working directories.
    pub fn from_config(config: &AgentOsConfig) -> Result<Self, SetupError> {
        config.validate()?;
        let commands = CommandGatekeeper::from_config(&config.shell)?;
        let files = FileGatekeeper::from_config(&config.files)?;
        info!(
            "gatekeepers ready (commands={}, shell_dir={}, files_dir={})",
            commands.policy().allowed_commands.len(),
            commands.policy().working_directory.display(),
            files.policy().base_directory.display()
        );
        Ok(Self {
            commands: Arc::new(commands),
            files: Arc::new(files),
        })
    }

    /// Registry holding every built-in tool.
    pub fn registry(&self) -> ToolRegistry {
        agentos_rs_tools::builtin_tool_registry(self.commands.clone(), self.files.clone())
    }

    pub fn policy_summary(&self) -> PolicySummary {
        PolicySummary {
            shell: self.commands.list_allowed_commands(),
            files: self.files.policy().clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Gatekeepers, SetupError};
    use agentos_rs_config::AgentOsConfig;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn config_in(dir: &std::path::Path) -> AgentOsConfig {
        let mut config = AgentOsConfig::default();
        config.shell.working_directory = dir.join("shell");
        config.files.base_directory = dir.join("files");
        config
    }

    #[tokio::test]
    async fn registry_routes_to_both_gatekeepers() {
        let temp = tempfile::tempdir().expect("tempdir");
        let gatekeepers = Gatekeepers::from_config(&config_in(temp.path())).expect("setup");
        assert!(temp.path().join("shell").is_dir());
        assert!(temp.path().join("files").is_dir());

        let registry = gatekeepers.registry();
        assert_eq!(registry.list().len(), 9);
        let result = registry
            .invoke(
                "create_file",
                json!({ "filename": "a.json", "content": "{}" }),
            )
            .await;
        assert!(result.success, "{result:?}");
    }

    #[test]
    fn policy_summary_reports_both_sides() {
        let temp = tempfile::tempdir().expect("tempdir");
        let gatekeepers = Gatekeepers::from_config(&config_in(temp.path())).expect("setup");
        let summary = serde_json::to_value(gatekeepers.policy_summary()).expect("json");
        assert_eq!(summary["shell"]["timeout"], json!(30));
        assert_eq!(summary["shell"]["max_output_size"], json!(10_000));
        assert_eq!(summary["files"]["max_file_size_bytes"], json!(50 * 1024 * 1024));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let temp = tempfile::tempdir().expect("tempdir");
        let mut config = config_in(temp.path());
        config.files.max_file_size = "lots".to_string();
        let err = Gatekeepers::from_config(&config).expect_err("invalid size");
        assert!(matches!(err, SetupError::Config(_)), "{err:?}");
    }
}
