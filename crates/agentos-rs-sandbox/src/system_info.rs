//! Platform metadata plus a few whitelisted diagnostic commands.

use log::debug;
use serde::Serialize;
use std::path::PathBuf;

use crate::gatekeeper::CommandGatekeeper;

/// Timeout for each auxiliary diagnostic command.
pub const AUX_COMMAND_TIMEOUT_SECS: u64 = 5;

/// Inline value reported when the whitelist refuses a diagnostic command.
pub const COMMAND_NOT_ALLOWED: &str = "Command not allowed";

/// Snapshot returned by [`CommandGatekeeper::system_info`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SystemInfo {
    pub platform: String,
    pub platform_release: String,
    pub platform_version: String,
    pub architecture: String,
    pub family: String,
    pub working_directory: PathBuf,
    pub current_user: String,
    pub current_directory: String,
    pub current_date: String,
    pub disk_usage: String,
}

struct Uname {
    sysname: String,
    release: String,
    version: String,
}

#[cfg(unix)]
fn uname() -> Option<Uname> {
    fn field(raw: &[libc::c_char]) -> String {
        let bytes: Vec<u8> = raw
            .iter()
            .take_while(|byte| **byte != 0)
            .map(|byte| *byte as u8)
            .collect();
        String::from_utf8_lossy(&bytes).into_owned()
    }

    let mut buf: libc::utsname = unsafe { std::mem::zeroed() };
    if unsafe { libc::uname(&mut buf) } != 0 {
        return None;
    }
    Some(Uname {
        sysname: field(&buf.sysname),
        release: field(&buf.release),
        version: field(&buf.version),
    })
}

#[cfg(not(unix))]
fn uname() -> Option<Uname> {
    None
}

impl CommandGatekeeper {
    /// Gather platform metadata and diagnostic command output.
    ///
    /// Each diagnostic command passes through the validator and runs with a
    /// short timeout; a failure degrades to an inline message instead of
    /// failing the whole call.
    pub async fn system_info(&self) -> SystemInfo {
        let uname = uname();
        let (platform, platform_release, platform_version) = match uname {
            Some(uname) => (uname.sysname, uname.release, uname.version),
            None => (
                std::env::consts::OS.to_string(),
                String::new(),
                String::new(),
            ),
        };
        SystemInfo {
            platform,
            platform_release,
            platform_version,
            architecture: std::env::consts::ARCH.to_string(),
            family: std::env::consts::FAMILY.to_string(),
            working_directory: self.policy().working_directory.clone(),
            current_user: self.aux_command("whoami").await,
            current_directory: self.aux_command("pwd").await,
            current_date: self.aux_command("date").await,
            disk_usage: self.aux_command("df -h .").await,
        }
    }

    async fn aux_command(&self, command: &str) -> String {
        let validated = match self.validator().validate(command) {
            Ok(validated) => validated,
            Err(_) => return COMMAND_NOT_ALLOWED.to_string(),
        };
        match self
            .run_validated(validated, AUX_COMMAND_TIMEOUT_SECS)
            .await
        {
            Ok(result) if result.succeeded() => result.stdout.trim().to_string(),
            Ok(result) => format!("Error: Command failed with return code {}", result.return_code),
            Err(err) => {
                debug!("diagnostic command failed (command={command}, err={err})");
                format!("Error: {err}")
            }
        }
    }
}
