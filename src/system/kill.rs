use std::sync::Mutex;

use serde::Serialize;
use sysinfo::{Pid, Process, ProcessRefreshKind, ProcessesToUpdate, Signal, System};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TerminateOutcome {
    /// The termination request was delivered; the process may still be exiting.
    /// `signal` names the mechanism: `SIGTERM`, or `kill` where SIGTERM is
    /// unsupported and the process was stopped outright.
    Requested { pid: u32, signal: &'static str },
    /// Already exited or never existed. Informational, not a caller error.
    NotFound { pid: u32 },
    /// The OS refused the request.
    AccessDenied { pid: u32 },
}

impl TerminateOutcome {
    pub fn message(&self) -> String {
        match self {
            TerminateOutcome::Requested { pid, signal } => format!("Sent {signal} to PID {pid}"),
            TerminateOutcome::NotFound { pid } => format!("No process found with PID {pid}"),
            TerminateOutcome::AccessDenied { pid } => {
                format!("Access denied to terminate process with PID {pid}")
            }
        }
    }
}

/// Sends graceful termination requests. Holds its own process table so a
/// request never waits on a sampling loop.
pub struct ProcessTerminator {
    sys: Mutex<System>,
}

impl Default for ProcessTerminator {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessTerminator {
    pub fn new() -> Self {
        ProcessTerminator {
            sys: Mutex::new(System::new()),
        }
    }

    pub fn terminate(&self, pid: u32) -> TerminateOutcome {
        let mut sys = match self.sys.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let outcome = terminate_process(&mut sys, pid);
        tracing::info!(pid, ?outcome, "termination requested");
        outcome
    }
}

fn lookup(sys: &mut System, pid: Pid) -> bool {
    sys.refresh_processes_specifics(
        ProcessesToUpdate::Some(&[pid]),
        true,
        ProcessRefreshKind::nothing(),
    );
    sys.process(pid).is_some()
}

/// The mechanism that delivered the request, `None` if the OS refused it.
fn send_term(process: &Process) -> Option<&'static str> {
    match process.kill_with(Signal::Term) {
        Some(sent) => sent.then_some("SIGTERM"),
        // SIGTERM unsupported on this platform, kill() is forced
        None => process.kill().then_some("kill"),
    }
}

pub fn terminate_process(sys: &mut System, pid: u32) -> TerminateOutcome {
    let sysinfo_pid = Pid::from_u32(pid);
    if !lookup(sys, sysinfo_pid) {
        return TerminateOutcome::NotFound { pid };
    }
    let Some(process) = sys.process(sysinfo_pid) else {
        return TerminateOutcome::NotFound { pid };
    };

    if let Some(signal) = send_term(process) {
        return TerminateOutcome::Requested { pid, signal };
    }

    // A failed send to a process that has since exited is a race, not a refusal.
    if lookup(sys, sysinfo_pid) {
        TerminateOutcome::AccessDenied { pid }
    } else {
        TerminateOutcome::NotFound { pid }
    }
}
