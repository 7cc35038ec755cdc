use std::io;
use std::path::Path;
use std::sync::atomic::Ordering;

use log::{debug, warn};
use rustyline::DefaultEditor;

use crate::{
    core::{commands::CommandExecutor, config::Config, Interpreter, Session},
    error::ShellError,
    flags::Flags,
    highlight::SyntaxHighlighter,
    history::{HistoryError, HistoryFile, HistoryStore},
    path::WorkingDirectory,
    process::ProcessRunner,
};

pub const PROMPT: &str = "# ";

pub struct Shell {
    editor: DefaultEditor,
    interpreter: Interpreter,
    history_file: HistoryFile,
    highlighter: SyntaxHighlighter,
    flags: Flags,
}

impl Shell {
    pub fn new(flags: Flags) -> Result<Self, ShellError> {
        let editor = DefaultEditor::new()?;

        let config = Config::load(flags.get_value("config").map(Path::new))?;
        let cwd = WorkingDirectory::from_process()?;
        let history_file = HistoryFile::new(
            config.history_path(flags.get_value("history").map(String::as_str), cwd.current()),
        );

        let mut history = HistoryStore::new();
        if let Err(e) = history_file.load_into(&mut history) {
            warn!("ignoring history file {}: {}", history_file.path().display(), e);
            if !flags.is_set("quiet") {
                eprintln!("Warning: starting with empty history: {}", e);
            }
        }

        let session = Session::new(history, cwd, ProcessRunner::new(config.poll_interval));
        let interpreter = Interpreter::new(session, CommandExecutor::new(config.replay_depth));

        // Ctrl-C during `start` belongs to the child, so stay silent then.
        let in_foreground = interpreter.session().runner.foreground_flag();
        ctrlc::set_handler(move || {
            if !in_foreground.load(Ordering::SeqCst) {
                println!("\nUse 'byebye' to exit the shell");
            }
        })?;

        Ok(Shell {
            editor,
            interpreter,
            history_file,
            highlighter: SyntaxHighlighter::new(),
            flags,
        })
    }

    pub fn run(&mut self) -> Result<(), ShellError> {
        while !self.interpreter.exit_requested() {
            self.report_finished_jobs();

            match self.editor.readline(PROMPT) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        if let Err(e) = self.editor.add_history_entry(line.as_str()) {
                            debug!("line editor rejected history entry: {}", e);
                        }
                    }

                    if let Err(e) = self.interpreter.execute_line(&line, &mut io::stdout()) {
                        eprintln!("{}", self.highlighter.highlight_error(&e.to_string()));
                    }
                }
                Err(rustyline::error::ReadlineError::Interrupted) => continue,
                Err(rustyline::error::ReadlineError::Eof) => break,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    continue;
                }
            }
        }

        self.finish();
        Ok(())
    }

    fn report_finished_jobs(&mut self) {
        let quiet = self.flags.is_set("quiet");
        for notice in finished_job_notices(self.interpreter.session_mut(), quiet) {
            println!("{}", self.highlighter.highlight_notice(&notice));
        }
    }

    fn finish(&self) {
        if let Err(e) = shutdown(self.interpreter.session(), &self.history_file) {
            warn!("failed to save history: {}", e);
            if !self.flags.is_set("quiet") {
                eprintln!("Warning: Couldn't save history: {}", e);
            }
        }
    }
}

/// Reaps finished background jobs and formats one `[pid] <report>` line per
/// job. Jobs are reaped even when `quiet` suppresses the lines.
pub fn finished_job_notices(session: &mut Session, quiet: bool) -> Vec<String> {
    let finished = session.jobs.reap_finished();
    if quiet {
        return Vec::new();
    }
    finished
        .into_iter()
        .map(|(pid, report)| format!("[{}] {}", pid, report))
        .collect()
}

/// Runs once the loop ends, whether through `byebye` or end of input.
pub fn shutdown(session: &Session, history_file: &HistoryFile) -> Result<(), HistoryError> {
    if !session.jobs.is_empty() {
        debug!("leaving {} background processes running", session.jobs.len());
    }
    history_file.save(&session.history)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::commands::test_support::{interpreter, run};
    use std::thread;
    use std::time::Duration;

    fn wait_for_notices(interp: &mut Interpreter, quiet: bool) -> Vec<String> {
        for _ in 0..200 {
            let notices = finished_job_notices(interp.session_mut(), quiet);
            if !notices.is_empty() || interp.session().jobs.is_empty() {
                return notices;
            }
            thread::sleep(Duration::from_millis(10));
        }
        Vec::new()
    }

    #[test]
    fn test_finished_job_notice_text() {
        let dir = tempfile::tempdir().unwrap();
        let mut interp = interpreter(dir.path());

        let (result, out) = run(&mut interp, "background false");
        result.unwrap();
        let pid = out.trim().to_string();

        let notices = wait_for_notices(&mut interp, false);

        assert_eq!(notices, vec![format!("[{}] exited with status 1", pid)]);
        assert!(interp.session().jobs.is_empty());
        assert!(finished_job_notices(interp.session_mut(), false).is_empty());
    }

    #[test]
    fn test_quiet_suppresses_notices_but_still_reaps() {
        let dir = tempfile::tempdir().unwrap();
        let mut interp = interpreter(dir.path());

        run(&mut interp, "background true").0.unwrap();
        for _ in 0..200 {
            if interp.session().jobs.is_empty() {
                break;
            }
            assert!(finished_job_notices(interp.session_mut(), true).is_empty());
            thread::sleep(Duration::from_millis(10));
        }

        assert!(interp.session().jobs.is_empty());
    }

    #[test]
    fn test_shutdown_after_byebye_writes_history() {
        let dir = tempfile::tempdir().unwrap();
        let file = HistoryFile::new(dir.path().join("history.txt"));
        let mut interp = interpreter(dir.path());

        run(&mut interp, "whereami").0.unwrap();
        run(&mut interp, "byebye").0.unwrap();
        assert!(interp.exit_requested());

        shutdown(interp.session(), &file).unwrap();

        assert_eq!(
            std::fs::read_to_string(file.path()).unwrap(),
            "2\n8 whereami 0\n6 byebye 0\n"
        );
    }

    #[test]
    fn test_shutdown_at_end_of_input_writes_history() {
        let dir = tempfile::tempdir().unwrap();
        let file = HistoryFile::new(dir.path().join("history.txt"));
        let mut interp = interpreter(dir.path());

        run(&mut interp, "movetodir /tmp").0.unwrap();
        assert!(!interp.exit_requested());

        shutdown(interp.session(), &file).unwrap();

        let mut reloaded = HistoryStore::new();
        assert_eq!(file.load_into(&mut reloaded).unwrap(), 1);
        assert_eq!(reloaded, interp.session().history);
    }

    #[test]
    fn test_shutdown_reports_unwritable_history() {
        let dir = tempfile::tempdir().unwrap();
        let file = HistoryFile::new(dir.path().join("missing").join("history.txt"));
        let interp = interpreter(dir.path());

        assert!(matches!(
            shutdown(interp.session(), &file),
            Err(HistoryError::Io(_))
        ));
    }
}
