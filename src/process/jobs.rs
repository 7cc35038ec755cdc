use std::collections::BTreeMap;
use std::process::Child;

use log::{debug, warn};

use super::{ExitReport, Pid, ProcessError};

/// A child started without waiting for it.
#[derive(Debug)]
pub struct BackgroundJob {
    pid: Pid,
    child: Child,
}

impl BackgroundJob {
    pub(crate) fn new(child: Child) -> Self {
        Self {
            pid: child.id() as Pid,
            child,
        }
    }

    pub fn pid(&self) -> Pid {
        self.pid
    }

    pub(crate) fn try_wait(&mut self) -> Result<Option<ExitReport>, ProcessError> {
        self.child
            .try_wait()
            .map(|status| status.map(ExitReport::from))
            .map_err(|e| ProcessError::WaitError(format!("process {}: {}", self.pid, e)))
    }
}

/// Background jobs launched by this session, keyed by pid.
#[derive(Debug, Default)]
pub struct RunningProcessSet {
    jobs: BTreeMap<Pid, BackgroundJob>,
}

impl RunningProcessSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, job: BackgroundJob) -> Pid {
        let pid = job.pid();
        debug!("tracking background process {}", pid);
        self.jobs.insert(pid, job);
        pid
    }

    pub fn contains(&self, pid: Pid) -> bool {
        self.jobs.contains_key(&pid)
    }

    pub fn pids(&self) -> Vec<Pid> {
        self.jobs.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub(crate) fn remove(&mut self, pid: Pid) -> Option<BackgroundJob> {
        self.jobs.remove(&pid)
    }

    /// Polls every job once and drops the ones that have exited.
    pub fn reap_finished(&mut self) -> Vec<(Pid, ExitReport)> {
        let mut finished = Vec::new();

        self.jobs.retain(|&pid, job| match job.try_wait() {
            Ok(Some(report)) => {
                finished.push((pid, report));
                false
            }
            Ok(None) => true,
            Err(e) => {
                warn!("dropping background process {}: {}", pid, e);
                false
            }
        });

        finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::Command;
    use std::time::{Duration, Instant};

    fn spawn(program: &str, args: &[&str]) -> BackgroundJob {
        BackgroundJob::new(Command::new(program).args(args).spawn().unwrap())
    }

    #[test]
    fn test_register_and_query() {
        let mut set = RunningProcessSet::new();
        let pid = set.register(spawn("sleep", &["5"]));

        assert!(pid > 0);
        assert!(set.contains(pid));
        assert_eq!(set.pids(), vec![pid]);

        let mut job = set.remove(pid).unwrap();
        assert!(set.is_empty());
        job.child.kill().unwrap();
        job.child.wait().unwrap();
    }

    #[test]
    fn test_reap_finished_removes_exited_jobs() {
        let mut set = RunningProcessSet::new();
        let pid = set.register(spawn("true", &[]));

        let deadline = Instant::now() + Duration::from_secs(5);
        let mut reaped = Vec::new();
        while reaped.is_empty() && Instant::now() < deadline {
            reaped = set.reap_finished();
            std::thread::sleep(Duration::from_millis(10));
        }

        assert_eq!(reaped, vec![(pid, ExitReport::Exited(0))]);
        assert!(!set.contains(pid));
    }
}
