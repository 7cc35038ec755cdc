use std::io::Write;

use log::debug;

use super::commands::{CommandError, CommandExecutor};
use super::Session;
use crate::parser::parse_line;

/// Parse, record, dispatch: everything the shell does with one line apart
/// from reading it.
pub struct Interpreter {
    session: Session,
    executor: CommandExecutor,
}

impl Interpreter {
    pub fn new(session: Session, executor: CommandExecutor) -> Self {
        Self { session, executor }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn set_executor(&mut self, executor: CommandExecutor) {
        self.executor = executor;
    }

    pub fn exit_requested(&self) -> bool {
        self.session.exit_requested()
    }

    /// Blank lines are ignored entirely. Anything else is appended to the
    /// history before it runs, so a failing command is still recorded.
    pub fn execute_line(&mut self, line: &str, out: &mut dyn Write) -> Result<(), CommandError> {
        let Some(parsed) = parse_line(line) else {
            return Ok(());
        };

        let index = self.session.history.append(parsed.command, parsed.arguments);
        debug!("recorded line #{}", index);

        self.executor.execute(&mut self.session, out, index)
    }
}
