//! Child process setup for unix hosts: process groups and rlimits.

use agentos_rs_config::ShellLimits;

#[cfg(all(target_os = "linux", target_env = "gnu"))]
type Resource = libc::__rlimit_resource_t;
#[cfg(not(all(target_os = "linux", target_env = "gnu")))]
type Resource = libc::c_int;

/// Runs in the forked child before exec.
///
/// Only async-signal-safe calls are allowed here.
pub(crate) fn prepare_child(limits: &ShellLimits) -> Result<(), std::io::Error> {
    if unsafe { libc::setpgid(0, 0) } != 0 {
        return Err(std::io::Error::last_os_error());
    }
    apply_rlimits(limits)
}

/// Apply rlimits based on configured shell limits.
pub(crate) fn apply_rlimits(limits: &ShellLimits) -> Result<(), std::io::Error> {
    fn set(limit: Resource, value: Option<u64>) -> Result<(), std::io::Error> {
        if let Some(value) = value {
            let rlim = libc::rlimit {
                rlim_cur: value as libc::rlim_t,
                rlim_max: value as libc::rlim_t,
            };
            let result = unsafe { libc::setrlimit(limit, &rlim) };
            if result != 0 {
                return Err(std::io::Error::last_os_error());
            }
        }
        Ok(())
    }

    set(libc::RLIMIT_CPU as Resource, limits.cpu_seconds)?;
    set(libc::RLIMIT_AS as Resource, limits.memory_bytes)?;
    set(libc::RLIMIT_NOFILE as Resource, limits.nofile)?;
    set(libc::RLIMIT_NPROC as Resource, limits.pids)?;
    Ok(())
}

/// SIGKILL every process in the group led by `pid`.
///
/// A group that no longer exists is not an error.
pub(crate) fn kill_process_group(pid: u32) -> Result<(), std::io::Error> {
    let pgid = libc::pid_t::try_from(pid)
        .map_err(|_| std::io::Error::other(format!("pid out of range: {pid}")))?;
    if unsafe { libc::killpg(pgid, libc::SIGKILL) } == 0 {
        return Ok(());
    }
    let err = std::io::Error::last_os_error();
    if err.raw_os_error() == Some(libc::ESRCH) {
        Ok(())
    } else {
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::{apply_rlimits, kill_process_group};
    use agentos_rs_config::ShellLimits;

    #[test]
    fn empty_limits_are_a_no_op() {
        apply_rlimits(&ShellLimits::default()).expect("no limits");
    }

    #[test]
    fn killing_missing_group_is_ok() {
        kill_process_group(i32::MAX as u32).expect("missing group");
    }
}
