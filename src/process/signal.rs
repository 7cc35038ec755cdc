use std::io;
use std::os::unix::process::ExitStatusExt;
use std::process::ExitStatus;

use libc::{c_int, ECHILD, ESRCH, SIGKILL, WNOHANG};

use super::{ExitReport, Pid, ProcessError};

/// Sends SIGKILL to `pid`.
pub fn kill(pid: Pid) -> Result<(), ProcessError> {
    // pid <= 0 addresses process groups, never a single job.
    if pid <= 0 {
        return Err(ProcessError::ProcessNotFound(pid));
    }

    let res = unsafe { libc::kill(pid, SIGKILL) };
    if res == -1 {
        let err = io::Error::last_os_error();
        return match err.raw_os_error() {
            Some(ESRCH) => Err(ProcessError::ProcessNotFound(pid)),
            _ => Err(ProcessError::SignalError(format!("kill {}: {}", pid, err))),
        };
    }
    Ok(())
}

/// Non-blocking `waitpid`. `Ok(None)` means the child is still running.
pub fn try_waitpid(pid: Pid) -> Result<Option<ExitReport>, ProcessError> {
    let mut status: c_int = 0;
    let res = unsafe { libc::waitpid(pid, &mut status, WNOHANG) };

    match res {
        0 => Ok(None),
        -1 => {
            let err = io::Error::last_os_error();
            match err.raw_os_error() {
                Some(ECHILD) => Err(ProcessError::WaitError(format!(
                    "process {} is not a child of this shell",
                    pid
                ))),
                _ => Err(ProcessError::WaitError(format!("waitpid {}: {}", pid, err))),
            }
        }
        _ => Ok(Some(ExitStatus::from_raw(status).into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::Command;

    #[test]
    fn test_kill_rejects_group_ids() {
        assert!(matches!(kill(0), Err(ProcessError::ProcessNotFound(0))));
        assert!(matches!(kill(-1), Err(ProcessError::ProcessNotFound(-1))));
    }

    #[test]
    fn test_kill_and_reap_child() {
        let child = Command::new("sleep").arg("30").spawn().unwrap();
        let pid = child.id() as Pid;

        kill(pid).unwrap();

        let report = loop {
            if let Some(report) = try_waitpid(pid).unwrap() {
                break report;
            }
            std::thread::sleep(std::time::Duration::from_millis(10));
        };
        assert_eq!(report, ExitReport::Signaled(SIGKILL));
    }

    #[test]
    fn test_waitpid_on_foreign_process() {
        // pid 1 is never our child
        assert!(matches!(try_waitpid(1), Err(ProcessError::WaitError(_))));
    }
}
