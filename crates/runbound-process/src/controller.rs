//! Platform process controller
//!
//! Isolates process-group, identity, and exit-status differences behind
//! one set of functions, with one implementation per platform family.
//! Group kill exists only on Unix; elsewhere a kill reaches the direct
//! child alone and descendants it spawned may keep running. That asymmetry
//! is surfaced here rather than emulated.

use std::process::ExitStatus;

use tokio::process::{Child, Command};
use tracing::{debug, warn};

use crate::config::ExecConfig;
use crate::runner::UNDETERMINED_EXIT_CODE;

/// Apply platform specifics before spawn.
///
/// Unix: place the child in its own process group so a kill can reach its
/// descendants, and apply the configured identity before exec.
pub(crate) fn prepare(cmd: &mut Command, config: &ExecConfig) {
    #[cfg(unix)]
    {
        cmd.process_group(0);
        if let Some(credential) = config.credential {
            cmd.uid(credential.uid).gid(credential.gid);
        }
    }
    #[cfg(not(unix))]
    {
        let _ = (cmd, config.credential);
    }
}

/// Hard-kill a started process, best effort.
///
/// Unix: SIGKILL the entire process group (the group id equals the child's
/// pid, established by `prepare`), falling back to the direct child if the
/// group signal fails. Other platforms: kill the direct child only.
pub(crate) fn kill(child: &mut Child, pid: Option<u32>) {
    #[cfg(unix)]
    if let Some(pid) = pid {
        use nix::sys::signal::{killpg, Signal};
        use nix::unistd::Pid;

        match killpg(Pid::from_raw(pid as i32), Signal::SIGKILL) {
            Ok(()) => {
                debug!(pid, "sent SIGKILL to process group");
                return;
            }
            Err(errno) => {
                warn!(pid, %errno, "group kill failed, killing child directly");
            }
        }
    }
    #[cfg(not(unix))]
    let _ = pid;

    match child.start_kill() {
        Ok(()) => debug!("sent kill to child process"),
        Err(error) => warn!(%error, "failed to kill child process"),
    }
}

/// Resolve an exit status to the engine's integer exit code.
///
/// Unix: the reported code for a normal exit, `128 + signal` for a signal
/// death (shell convention), the undetermined sentinel otherwise.
pub(crate) fn exit_code(status: ExitStatus) -> i32 {
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;

        match (status.code(), status.signal()) {
            (Some(code), _) => code,
            (None, Some(signal)) => 128 + signal,
            (None, None) => UNDETERMINED_EXIT_CODE,
        }
    }
    #[cfg(not(unix))]
    {
        status.code().unwrap_or(UNDETERMINED_EXIT_CODE)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use std::os::unix::process::ExitStatusExt;
    use std::process::ExitStatus;

    use super::*;

    #[test]
    fn normal_exit_maps_to_code() {
        // Raw wait status encodes a normal exit code in the high byte.
        assert_eq!(exit_code(ExitStatus::from_raw(0)), 0);
        assert_eq!(exit_code(ExitStatus::from_raw(7 << 8)), 7);
        assert_eq!(exit_code(ExitStatus::from_raw(255 << 8)), 255);
    }

    #[test]
    fn signal_death_maps_to_128_plus_signal() {
        assert_eq!(exit_code(ExitStatus::from_raw(9)), 137);
        assert_eq!(exit_code(ExitStatus::from_raw(15)), 143);
    }
}
