use std::fmt;
use std::os::unix::process::ExitStatusExt;
use std::process::ExitStatus;

pub mod jobs;
pub mod runner;
pub mod signal;

pub use jobs::{BackgroundJob, RunningProcessSet};
pub use runner::ProcessRunner;

pub type Pid = i32;

#[derive(Debug)]
pub enum ProcessError {
    SpawnFailed { program: String, source: std::io::Error },
    ProcessNotFound(Pid),
    WaitError(String),
    SignalError(String),
}

impl fmt::Display for ProcessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessError::SpawnFailed { program, source } => {
                write!(f, "failed to start '{}': {}", program, source)
            }
            ProcessError::ProcessNotFound(pid) => write!(f, "Process {} not found.", pid),
            ProcessError::WaitError(msg) => write!(f, "wait error: {}", msg),
            ProcessError::SignalError(msg) => write!(f, "Signal error: {}", msg),
        }
    }
}

impl std::error::Error for ProcessError {}

/// How a child finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReport {
    Exited(i32),
    Signaled(i32),
}

impl ExitReport {
    pub fn success(&self) -> bool {
        matches!(self, ExitReport::Exited(0))
    }
}

impl From<ExitStatus> for ExitReport {
    fn from(status: ExitStatus) -> Self {
        match (status.code(), status.signal()) {
            (Some(code), _) => ExitReport::Exited(code),
            (None, Some(sig)) => ExitReport::Signaled(sig),
            // Stopped/continued states are never requested from waitpid.
            (None, None) => ExitReport::Exited(-1),
        }
    }
}

impl fmt::Display for ExitReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitReport::Exited(code) => write!(f, "exited with status {}", code),
            ExitReport::Signaled(sig) => write!(f, "terminated by signal {}", sig),
        }
    }
}
