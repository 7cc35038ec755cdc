use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use log::debug;

use super::{signal, BackgroundJob, ExitReport, Pid, ProcessError, RunningProcessSet};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Owns every interaction with OS process creation, waiting and termination.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    poll_interval: Duration,
    in_foreground: Arc<AtomicBool>,
}

/// Clears the foreground flag however the wait ends.
struct ForegroundWait<'a>(&'a AtomicBool);

impl<'a> ForegroundWait<'a> {
    fn begin(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for ForegroundWait<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL)
    }
}

impl ProcessRunner {
    pub fn new(poll_interval: Duration) -> Self {
        Self {
            poll_interval,
            in_foreground: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Set for as long as `spawn_foreground` is waiting on a child. Shared
    /// with signal handlers, which run on another thread.
    pub fn foreground_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.in_foreground)
    }

    /// Runs `program` and blocks until it exits, polling at the configured
    /// interval.
    pub fn spawn_foreground(
        &self,
        program: &Path,
        args: &[String],
        cwd: &Path,
    ) -> Result<ExitReport, ProcessError> {
        let mut child = self.spawn(program, args, cwd)?;
        let pid = child.id();
        let _wait = ForegroundWait::begin(&self.in_foreground);
        debug!("waiting for foreground process {}", pid);

        loop {
            match child.try_wait() {
                Ok(Some(status)) => {
                    let report = ExitReport::from(status);
                    debug!("foreground process {} {}", pid, report);
                    return Ok(report);
                }
                Ok(None) => thread::sleep(self.poll_interval),
                Err(e) => return Err(ProcessError::WaitError(format!("process {}: {}", pid, e))),
            }
        }
    }

    /// Starts `program` without waiting. The caller is responsible for
    /// registering the returned job.
    pub fn spawn_background(
        &self,
        program: &Path,
        args: &[String],
        cwd: &Path,
    ) -> Result<BackgroundJob, ProcessError> {
        let child = self.spawn(program, args, cwd)?;
        Ok(BackgroundJob::new(child))
    }

    /// Kills `pid` and waits for it to be reaped. Jobs tracked in `jobs` are
    /// reaped through their handle and removed from the set; any other pid is
    /// reaped with `waitpid`.
    pub fn terminate(
        &self,
        pid: Pid,
        jobs: &mut RunningProcessSet,
    ) -> Result<ExitReport, ProcessError> {
        signal::kill(pid)?;
        debug!("sent SIGKILL to {}", pid);

        if let Some(mut job) = jobs.remove(pid) {
            loop {
                if let Some(report) = job.try_wait()? {
                    return Ok(report);
                }
                thread::sleep(self.poll_interval);
            }
        }

        loop {
            if let Some(report) = signal::try_waitpid(pid)? {
                return Ok(report);
            }
            thread::sleep(self.poll_interval);
        }
    }

    fn spawn(&self, program: &Path, args: &[String], cwd: &Path) -> Result<Child, ProcessError> {
        debug!("spawning {} {:?} in {}", program.display(), args, cwd.display());

        Command::new(program)
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| ProcessError::SpawnFailed {
                program: program.display().to_string(),
                source,
            })
    }
}
