//! Process runner trait and the local `/bin/sh` implementation.

use async_trait::async_trait;
use log::{debug, error, warn};
use std::process::Stdio;
use tokio::io::AsyncReadExt;
use tokio::process::{Child, Command};

use crate::error::SandboxError;
use crate::types::{CommandOutput, CommandSpec, SANDBOX_SHELL};
use crate::validator::base_command;

#[cfg(unix)]
pub(crate) mod unix;

/// Executes validated commands.
///
/// Implementations receive a spec that already passed validation; they own
/// spawning, the timeout, and killing the process tree when it elapses.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run a command to completion or until its timeout elapses.
    async fn run(&self, spec: CommandSpec) -> Result<CommandOutput, SandboxError>;
}

/// Runs commands on the host through [`SANDBOX_SHELL`] with a cleared
/// environment and a dedicated process group.
#[derive(Debug, Clone)]
pub struct LocalProcessRunner {
    /// Bytes retained per stream; the rest is drained and discarded.
    capture_limit: usize,
}

impl LocalProcessRunner {
    /// Runner retaining at most `capture_limit` bytes per stream.
    pub fn new(capture_limit: usize) -> Self {
        Self {
            capture_limit: capture_limit.max(1),
        }
    }

    /// Runner sized for a character cap (4 bytes per char, plus slack).
    pub fn for_char_limit(max_chars: usize) -> Self {
        Self::new(max_chars.saturating_mul(4).saturating_add(4))
    }
}

impl Default for LocalProcessRunner {
    fn default() -> Self {
        Self::for_char_limit(10_000)
    }
}

#[async_trait]
impl CommandRunner for LocalProcessRunner {
    async fn run(&self, spec: CommandSpec) -> Result<CommandOutput, SandboxError> {
        let base = base_command(&spec.command).unwrap_or_default().to_string();
        debug!(
            "spawning process (base={base}, timeout_secs={}, cwd={})",
            spec.timeout.as_secs(),
            spec.cwd.display()
        );
        let mut command = build_command(&spec);
        let mut child = command
            .spawn()
            .map_err(|err| SandboxError::from_spawn(&base, err))?;
        let pid = child.id();
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let limit = self.capture_limit;

        let outcome = tokio::time::timeout(spec.timeout, async {
            let streams = collect_child_output(stdout, stderr, limit).await?;
            let status = child.wait().await?;
            Ok::<_, SandboxError>((status, streams))
        })
        .await;

        match outcome {
            Ok(Ok((status, (stdout, stderr)))) => Ok(CommandOutput {
                status_code: status.code(),
                truncated: stdout.overflowed || stderr.overflowed,
                stdout: stdout.into_string(),
                stderr: stderr.into_string(),
            }),
            Ok(Err(err)) => {
                terminate(&mut child, pid).await;
                Err(err)
            }
            Err(_) => {
                let seconds = spec.timeout.as_secs();
                error!("process timed out (base={base}, timeout_secs={seconds})");
                terminate(&mut child, pid).await;
                Err(SandboxError::Timeout { seconds })
            }
        }
    }
}

/// Build the shell invocation for a spec.
fn build_command(spec: &CommandSpec) -> Command {
    let mut command = Command::new(SANDBOX_SHELL);
    command.arg("-c").arg(&spec.command);
    command.env_clear();
    command.envs(&spec.env);
    command.current_dir(&spec.cwd);
    command.stdin(Stdio::null());
    command.stdout(Stdio::piped());
    command.stderr(Stdio::piped());
    command.kill_on_drop(true);

    #[cfg(unix)]
    {
        let limits = spec.limits.clone();
        unsafe {
            command.pre_exec(move || unix::prepare_child(&limits));
        }
    }
    command
}

/// Kill the whole process group, then reap the direct child.
async fn terminate(child: &mut Child, pid: Option<u32>) {
    #[cfg(unix)]
    if let Some(pid) = pid
        && let Err(err) = unix::kill_process_group(pid)
    {
        warn!("failed to kill process group (pid={pid}, err={err})");
    }
    #[cfg(not(unix))]
    let _ = pid;

    if let Err(err) = child.kill().await {
        debug!("child already exited before kill (err={err})");
    }
}

/// Bytes captured from one stream, bounded by a retention limit.
#[derive(Debug, Default)]
pub(crate) struct CapturedStream {
    bytes: Vec<u8>,
    limit: usize,
    overflowed: bool,
}

impl CapturedStream {
    fn new(limit: usize) -> Self {
        Self {
            bytes: Vec::new(),
            limit,
            overflowed: false,
        }
    }

    fn push(&mut self, chunk: &[u8]) {
        let room = self.limit.saturating_sub(self.bytes.len());
        if chunk.len() > room {
            self.overflowed = true;
        }
        self.bytes.extend_from_slice(&chunk[..chunk.len().min(room)]);
    }

    fn into_string(self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

/// Drain stdout and stderr concurrently until both reach EOF.
pub(crate) async fn collect_child_output(
    stdout: Option<tokio::process::ChildStdout>,
    stderr: Option<tokio::process::ChildStderr>,
    limit: usize,
) -> Result<(CapturedStream, CapturedStream), SandboxError> {
    let mut stdout_buf = CapturedStream::new(limit);
    let mut stderr_buf = CapturedStream::new(limit);

    let mut stdout_reader = stdout.map(tokio::io::BufReader::new);
    let mut stderr_reader = stderr.map(tokio::io::BufReader::new);

    let mut stdout_done = stdout_reader.is_none();
    let mut stderr_done = stderr_reader.is_none();

    let mut stdout_chunk = vec![0u8; 8192];
    let mut stderr_chunk = vec![0u8; 8192];

    while !stdout_done || !stderr_done {
        tokio::select! {
            read = async {
                match stdout_reader.as_mut() {
                    Some(reader) => reader.read(&mut stdout_chunk).await,
                    None => Ok(0),
                }
            }, if !stdout_done => {
                let read = read?;
                if read == 0 {
                    stdout_done = true;
                } else {
                    stdout_buf.push(&stdout_chunk[..read]);
                }
            }
            read = async {
                match stderr_reader.as_mut() {
                    Some(reader) => reader.read(&mut stderr_chunk).await,
                    None => Ok(0),
                }
            }, if !stderr_done => {
                let read = read?;
                if read == 0 {
                    stderr_done = true;
                } else {
                    stderr_buf.push(&stderr_chunk[..read]);
                }
            }
        }
    }

    Ok((stdout_buf, stderr_buf))
}
