//! Process termination.
//!
//! One best-effort SIGTERM per confirmed action. The controller does not
//! wait for the target to exit; callers re-resolve the inventory to observe
//! the eventual state.

#[cfg(unix)]
use nix::errno::Errno;
#[cfg(unix)]
use nix::sys::signal::{self, Signal};
#[cfg(unix)]
use nix::unistd::Pid;
use tracing::{debug, warn};

#[cfg(not(unix))]
compile_error!("portman-core requires a Unix platform for signal delivery");

/// Outcome of a single termination attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminationOutcome {
    /// The signal was delivered; the process is expected to exit on its own.
    Succeeded,

    /// The process no longer existed at signal time (raced a prior exit).
    /// Informational, not an error.
    AlreadyGone,

    /// The OS refused the signal for lack of privilege.
    Denied,

    /// Any other OS-level failure, carrying the OS-provided detail.
    Unexpected(String),
}

impl TerminationOutcome {
    /// Whether the inventory should be re-resolved after this outcome.
    ///
    /// True when the target's state may have changed; `Denied` and
    /// `Unexpected` leave the process table as it was.
    pub fn triggers_refresh(&self) -> bool {
        matches!(self, Self::Succeeded | Self::AlreadyGone)
    }
}

/// Issues graceful-termination requests to OS processes.
pub struct ProcessTerminator;

impl ProcessTerminator {
    /// Create a new terminator.
    pub fn new() -> Self {
        Self
    }

    /// Request graceful termination of `pid`, gated on an explicit
    /// confirmation obtained by the caller.
    ///
    /// Returns `None` without touching the process when `confirmed` is
    /// false. No retries are performed on any outcome.
    pub fn terminate(
        &self,
        pid: u32,
        process_name: &str,
        confirmed: bool,
    ) -> Option<TerminationOutcome> {
        if !confirmed {
            debug!(pid, process_name, "termination declined");
            return None;
        }

        let outcome = match signal::kill(Pid::from_raw(pid as i32), Signal::SIGTERM) {
            Ok(()) => {
                debug!(pid, process_name, "SIGTERM delivered");
                TerminationOutcome::Succeeded
            }
            Err(Errno::ESRCH) => {
                debug!(pid, process_name, "process already gone");
                TerminationOutcome::AlreadyGone
            }
            Err(Errno::EPERM) => {
                warn!(pid, process_name, "permission denied sending SIGTERM");
                TerminationOutcome::Denied
            }
            Err(err) => {
                warn!(pid, process_name, "SIGTERM failed: {err}");
                TerminationOutcome::Unexpected(err.desc().to_string())
            }
        };

        Some(outcome)
    }
}

impl Default for ProcessTerminator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::{Child, Command, Stdio};

    fn spawn_victim() -> Child {
        Command::new("sleep")
            .arg("30")
            .stdout(Stdio::null())
            .spawn()
            .expect("spawn sleep")
    }

    #[test]
    fn test_declined_confirmation_sends_nothing() {
        let mut child = spawn_victim();
        let terminator = ProcessTerminator::new();

        assert_eq!(terminator.terminate(child.id(), "sleep", false), None);

        // The target must still be running.
        assert!(child.try_wait().expect("try_wait").is_none());

        child.kill().expect("kill");
        child.wait().expect("wait");
    }

    #[test]
    fn test_delivered_signal_reports_succeeded() {
        let mut child = spawn_victim();
        let terminator = ProcessTerminator::new();

        assert_eq!(
            terminator.terminate(child.id(), "sleep", true),
            Some(TerminationOutcome::Succeeded)
        );

        // SIGTERM kills sleep; the exit status reflects the signal.
        let status = child.wait().expect("wait");
        assert!(!status.success());
    }

    #[test]
    fn test_reaped_process_reports_already_gone() {
        let mut child = spawn_victim();
        child.kill().expect("kill");
        child.wait().expect("wait");

        let terminator = ProcessTerminator::new();
        assert_eq!(
            terminator.terminate(child.id(), "sleep", true),
            Some(TerminationOutcome::AlreadyGone)
        );
    }

    #[test]
    fn test_refresh_trigger_classification() {
        assert!(TerminationOutcome::Succeeded.triggers_refresh());
        assert!(TerminationOutcome::AlreadyGone.triggers_refresh());
        assert!(!TerminationOutcome::Denied.triggers_refresh());
        assert!(!TerminationOutcome::Unexpected("EIO".to_string()).triggers_refresh());
    }
}
