//! Command gatekeeper: validation, resolution, bounded execution.

use log::{debug, info, warn};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tokio::sync::Semaphore;

use agentos_rs_config::ShellConfig;

use crate::error::SandboxError;
use crate::runner::{CommandRunner, LocalProcessRunner};
use crate::types::{CommandPolicy, CommandResult, CommandSpec, SafetyReport};
use crate::validator::{CommandValidator, base_command};

/// Whitelist and policy constants reported by `list_allowed_commands`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AllowedCommands {
    pub allowed_commands: Vec<String>,
    pub total_commands: usize,
    pub timeout: u64,
    pub max_output_size: usize,
    pub working_directory: PathBuf,
    pub blocked_patterns: Vec<&'static str>,
}

/// Validates and executes shell commands under an immutable [`CommandPolicy`].
pub struct CommandGatekeeper {
    policy: Arc<CommandPolicy>,
    validator: CommandValidator,
    runner: Arc<dyn CommandRunner>,
    permits: Option<Arc<Semaphore>>,
    spawned: AtomicU64,
}

impl std::fmt::Debug for CommandGatekeeper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandGatekeeper")
            .field("policy", &self.policy)
            .field("spawned", &self.spawn_count())
            .finish_non_exhaustive()
    }
}

impl CommandGatekeeper {
    /// Build a gatekeeper from shell config using the local process runner.
    pub fn from_config(config: &ShellConfig) -> Result<Self, SandboxError> {
        Self::new(CommandPolicy::from_config(config)?)
    }

    /// Build a gatekeeper with the local process runner.
    pub fn new(policy: CommandPolicy) -> Result<Self, SandboxError> {
        let runner = Arc::new(LocalProcessRunner::for_char_limit(policy.max_output_chars));
        Self::with_runner(policy, runner)
    }

    /// Build a gatekeeper with a custom runner.
    ///
    /// Creates the working directory if it does not exist.
    pub fn with_runner(
        policy: CommandPolicy,
        runner: Arc<dyn CommandRunner>,
    ) -> Result<Self, SandboxError> {
        if let Some(limit) = policy.max_concurrent_commands
            && (limit == 0 || limit > Semaphore::MAX_PERMITS)
        {
            return Err(SandboxError::InvalidConfig(format!(
                "max_concurrent_commands must be between 1 and {}",
                Semaphore::MAX_PERMITS
            )));
        }
        std::fs::create_dir_all(&policy.working_directory)?;
        let permits = policy
            .max_concurrent_commands
            .map(|limit| Arc::new(Semaphore::new(limit)));
        info!(
            "command gatekeeper ready (allowed={}, timeout_secs={}, max_concurrent={:?}, working_directory={})",
            policy.allowed_commands.len(),
            policy.timeout_seconds,
            policy.max_concurrent_commands,
            policy.working_directory.display()
        );
        let policy = Arc::new(policy);
        Ok(Self {
            validator: CommandValidator::new(policy.clone()),
            policy,
            runner,
            permits,
            spawned: AtomicU64::new(0),
        })
    }

    /// Policy enforced by this gatekeeper.
    pub fn policy(&self) -> &CommandPolicy {
        &self.policy
    }

    /// Validator sharing this gatekeeper's policy.
    pub fn validator(&self) -> &CommandValidator {
        &self.validator
    }

    /// Number of commands handed to the runner so far.
    pub fn spawn_count(&self) -> u64 {
        self.spawned.load(Ordering::SeqCst)
    }

    /// Validate and execute a command.
    ///
    /// A non-zero exit is still `Ok`; check [`CommandResult::succeeded`].
    /// `timeout_override` of `None` or zero uses the policy timeout.
    pub async fn execute(
        &self,
        raw_command: &str,
        timeout_override: Option<u64>,
    ) -> Result<CommandResult, SandboxError> {
        let command = self.validator.validate(raw_command)?;
        let timeout = timeout_override
            .filter(|seconds| *seconds > 0)
            .unwrap_or(self.policy.timeout_seconds);
        self.run_validated(command, timeout).await
    }

    /// Execute a command that already passed validation.
    pub(crate) async fn run_validated(
        &self,
        command: String,
        timeout: u64,
    ) -> Result<CommandResult, SandboxError> {
        let base = base_command(&command).unwrap_or_default().to_string();
        self.resolve(&base)?;

        let _permit = match &self.permits {
            Some(permits) => Some(permits.clone().acquire_owned().await.map_err(|_| {
                SandboxError::ExecutionFailed("command semaphore closed".to_string())
            })?),
            None => None,
        };

        let exec_id = uuid::Uuid::new_v4();
        self.spawned.fetch_add(1, Ordering::SeqCst);
        info!("executing command (exec_id={exec_id}, base={base}, timeout_secs={timeout})");
        let spec = CommandSpec::from_policy(&self.policy, command.clone(), timeout);
        let started = Instant::now();
        let output = self.runner.run(spec).await?;
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        let cap = self.policy.max_output_chars;
        let (stdout, stdout_cut) = truncate_chars(output.stdout, cap);
        let (stderr, stderr_cut) = truncate_chars(output.stderr, cap);
        let result = CommandResult {
            command,
            return_code: output.status_code.unwrap_or(-1),
            stdout,
            stderr,
            output_truncated: output.truncated || stdout_cut || stderr_cut,
            execution_time_ms: elapsed_ms,
            timeout,
        };
        if result.succeeded() {
            info!(
                "command finished (exec_id={exec_id}, exit_code=0, elapsed_ms={elapsed_ms}, truncated={})",
                result.output_truncated
            );
        } else {
            warn!(
                "command failed (exec_id={exec_id}, exit_code={}, elapsed_ms={elapsed_ms})",
                result.return_code
            );
        }
        Ok(result)
    }

    /// Sorted whitelist plus policy constants.
    pub fn list_allowed_commands(&self) -> AllowedCommands {
        let allowed = self.policy.sorted_allowed();
        AllowedCommands {
            total_commands: allowed.len(),
            allowed_commands: allowed,
            timeout: self.policy.timeout_seconds,
            max_output_size: self.policy.max_output_chars,
            working_directory: self.policy.working_directory.clone(),
            blocked_patterns: self.policy.blocked_patterns(),
        }
    }

    /// Dry-run every check without executing anything.
    pub fn check_command_safety(&self, raw_command: &str) -> SafetyReport {
        self.validator.check_safety(raw_command)
    }

    /// Resolve the base command against the sandbox `PATH`.
    fn resolve(&self, base: &str) -> Result<PathBuf, SandboxError> {
        match which::which_in(
            base,
            Some(&self.policy.path_env),
            &self.policy.working_directory,
        ) {
            Ok(path) => {
                debug!("resolved command (base={base}, path={})", path.display());
                Ok(path)
            }
            Err(err) => {
                warn!("command not resolvable (base={base}, err={err})");
                Err(SandboxError::CommandNotFound(base.to_string()))
            }
        }
    }
}

/// Cut `text` to at most `max_chars` characters.
pub(crate) fn truncate_chars(text: String, max_chars: usize) -> (String, bool) {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => {
            let mut text = text;
            text.truncate(byte_idx);
            (text, true)
        }
        None => (text, false),
    }
}

#[cfg(test)]
mod tests {
    use super::{CommandGatekeeper, truncate_chars};
    use crate::{CommandOutput, CommandPolicy, CommandRunner, CommandSpec, SandboxError};
    use agentos_rs_config::ShellConfig;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use tempfile::tempdir;

    #[derive(Default)]
    struct RecordingRunner {
        specs: Mutex<Vec<CommandSpec>>,
        stdout: String,
    }

    #[async_trait]
    impl CommandRunner for RecordingRunner {
        async fn run(&self, spec: CommandSpec) -> Result<CommandOutput, SandboxError> {
            self.specs.lock().push(spec);
            Ok(CommandOutput {
                status_code: Some(0),
                stdout: self.stdout.clone(),
                stderr: String::new(),
                truncated: false,
            })
        }
    }

    fn gatekeeper(
        allowed: &[&str],
        max_output_chars: usize,
        runner: Arc<RecordingRunner>,
    ) -> (CommandGatekeeper, tempfile::TempDir) {
        let dir = tempdir().expect("tempdir");
        let config = ShellConfig {
            allowed_commands: allowed.iter().map(|entry| entry.to_string()).collect(),
            max_output_chars,
            working_directory: dir.path().join("shell"),
            ..ShellConfig::default()
        };
        let policy = CommandPolicy::with_path_env(&config, "/usr/bin:/bin").expect("policy");
        let gatekeeper = CommandGatekeeper::with_runner(policy, runner).expect("gatekeeper");
        (gatekeeper, dir)
    }

    #[test]
    fn truncates_by_characters() {
        assert_eq!(truncate_chars("héllo".to_string(), 2), ("hé".to_string(), true));
        assert_eq!(truncate_chars("abc".to_string(), 3), ("abc".to_string(), false));
    }

    #[tokio::test]
    async fn rejected_commands_never_reach_runner() {
        let runner = Arc::new(RecordingRunner::default());
        let (gatekeeper, _dir) = gatekeeper(&["ls"], 100, runner.clone());
        for command in ["", "rm -rf /", "ls && rm -rf /", "ls `id`", "ls\nid", "ls & id"] {
            assert!(matches!(
                gatekeeper.execute(command, None).await,
                Err(SandboxError::Rejected(_))
            ));
        }
        assert_eq!(gatekeeper.spawn_count(), 0);
        assert!(runner.specs.lock().is_empty());
    }

    #[tokio::test]
    async fn unresolvable_command_is_not_found() {
        let runner = Arc::new(RecordingRunner::default());
        let (gatekeeper, _dir) = gatekeeper(&["agentos-no-such-binary"], 100, runner);
        let err = gatekeeper
            .execute("agentos-no-such-binary --flag", None)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Command not found: agentos-no-such-binary");
        assert_eq!(gatekeeper.spawn_count(), 0);
    }

    #[tokio::test]
    async fn spec_carries_policy_and_timeout_override() {
        let runner = Arc::new(RecordingRunner::default());
        let (gatekeeper, _dir) = gatekeeper(&["ls"], 100, runner.clone());
        let result = gatekeeper.execute("  ls -la ", Some(7)).await.expect("run");
        assert_eq!(result.command, "ls -la");
        assert_eq!(result.timeout, 7);

        gatekeeper.execute("ls", Some(0)).await.expect("run");
        let specs = runner.specs.lock();
        assert_eq!(specs[0].timeout.as_secs(), 7);
        assert_eq!(specs[1].timeout.as_secs(), 30);
        assert_eq!(specs[0].cwd, gatekeeper.policy().working_directory);
        assert_eq!(specs[0].env["USER"], "agentos");
        assert_eq!(gatekeeper.spawn_count(), 2);
    }

    #[tokio::test]
    async fn output_is_capped_per_stream() {
        let runner = Arc::new(RecordingRunner {
            stdout: "x".repeat(25),
            ..RecordingRunner::default()
        });
        let (gatekeeper, _dir) = gatekeeper(&["ls"], 10, runner);
        let result = gatekeeper.execute("ls", None).await.expect("run");
        assert_eq!(result.stdout.len(), 10);
        assert_eq!(result.stderr, "");
        assert!(result.output_truncated);
    }

    #[test]
    fn hand_built_policy_with_huge_limit_is_refused() {
        let dir = tempdir().expect("tempdir");
        let config = ShellConfig {
            working_directory: dir.path().join("shell"),
            ..ShellConfig::default()
        };
        let mut policy = CommandPolicy::with_path_env(&config, "/usr/bin:/bin").expect("policy");
        policy.max_concurrent_commands = Some(usize::MAX);
        let runner = Arc::new(RecordingRunner::default());
        assert!(matches!(
            CommandGatekeeper::with_runner(policy, runner),
            Err(SandboxError::InvalidConfig(_))
        ));
    }

    #[test]
    fn list_reports_sorted_whitelist() {
        let runner = Arc::new(RecordingRunner::default());
        let (gatekeeper, _dir) = gatekeeper(&["pwd", "echo", "ls"], 100, runner);
        let listing = gatekeeper.list_allowed_commands();
        assert_eq!(listing.allowed_commands, vec!["echo", "ls", "pwd"]);
        assert_eq!(listing.total_commands, 3);
        assert_eq!(listing.max_output_size, 100);
        assert_eq!(listing.blocked_patterns[0], "&&");
    }
}
