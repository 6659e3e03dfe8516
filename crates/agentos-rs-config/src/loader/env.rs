//! Environment variable overrides.

use crate::{AgentOsConfig, ConfigError, parse_size, split_command_list};
use log::{debug, warn};

/// Comma separated list of allowed base commands.
pub const ENV_ALLOWED_COMMANDS: &str = "ALLOWED_COMMANDS";
/// Maximum file size as a size string ("50MB").
pub const ENV_MAX_FILE_SIZE: &str = "MAX_FILE_SIZE";

pub(super) fn apply_overrides<F>(config: &mut AgentOsConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(raw) = lookup(ENV_ALLOWED_COMMANDS) {
        let commands = split_command_list(&raw);
        if commands.is_empty() {
            warn!("{ENV_ALLOWED_COMMANDS} is set but empty; every command will be rejected");
        }
        debug!("allowed commands overridden from env (count={})", commands.len());
        config.shell.allowed_commands = commands;
    }
    if let Some(raw) = lookup(ENV_MAX_FILE_SIZE) {
        parse_size(&raw).map_err(|err| ConfigError::InvalidField {
            path: format!("env:{ENV_MAX_FILE_SIZE}"),
            message: err.to_string(),
        })?;
        debug!("max file size overridden from env");
        config.files.max_file_size = raw.trim().to_string();
    }
    Ok(())
}
