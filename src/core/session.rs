use crate::history::HistoryStore;
use crate::path::WorkingDirectory;
use crate::process::{ProcessRunner, RunningProcessSet};

/// Everything a command may read or change, threaded through every handler
/// by `&mut`. Only one line is ever dispatched at a time.
#[derive(Debug)]
pub struct Session {
    pub history: HistoryStore,
    pub cwd: WorkingDirectory,
    pub jobs: RunningProcessSet,
    pub runner: ProcessRunner,
    exit_requested: bool,
}

impl Session {
    pub fn new(history: HistoryStore, cwd: WorkingDirectory, runner: ProcessRunner) -> Self {
        Self {
            history,
            cwd,
            jobs: RunningProcessSet::new(),
            runner,
            exit_requested: false,
        }
    }

    pub fn request_exit(&mut self) {
        self.exit_requested = true;
    }

    pub fn exit_requested(&self) -> bool {
        self.exit_requested
    }
}
