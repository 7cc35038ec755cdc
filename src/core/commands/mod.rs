use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;
use std::path::PathBuf;
use std::str::FromStr;

use log::debug;

mod background;
mod byebye;
mod dalek;
mod history;
mod movetodir;
mod replay;
mod start;
mod whereami;

pub use background::{BackgroundCommand, RepeatCommand};
pub use byebye::ByeByeCommand;
pub use dalek::{DalekAllCommand, DalekCommand};
pub use history::HistoryCommand;
pub use movetodir::MoveToDirCommand;
pub use replay::ReplayCommand;
pub use start::StartCommand;
pub use whereami::WhereAmICommand;

use crate::core::Session;
use crate::history::HistoryError;
use crate::process::ProcessError;

pub const DEFAULT_REPLAY_DEPTH: usize = 64;

#[derive(Debug)]
pub enum CommandError {
    MissingArgument { command: &'static str, what: &'static str },
    InvalidFlag { command: &'static str, flag: String },
    UnexpectedArgument { command: &'static str, arg: String },
    NotANumber(String),
    OutOfRange { requested: usize, available: usize },
    DirectoryNotFound(PathBuf),
    DirectoryAccessError { path: PathBuf, source: std::io::Error },
    CommandNotFound(String),
    ReplayDepthExceeded(usize),
    ProcessError(ProcessError),
    HistoryError(HistoryError),
    IoError(std::io::Error),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::MissingArgument { command, what } => {
                write!(f, "{}: missing {}", command, what)
            }
            CommandError::InvalidFlag { command, flag } => {
                write!(f, "{}: invalid flag '{}'", command, flag)
            }
            CommandError::UnexpectedArgument { command, arg } => {
                write!(f, "{}: unexpected argument '{}'", command, arg)
            }
            CommandError::NotANumber(arg) => write!(f, "'{}' is not a valid number", arg),
            CommandError::OutOfRange {
                requested,
                available,
            } => write!(
                f,
                "{} is out of range ({} earlier commands available)",
                requested, available
            ),
            CommandError::DirectoryNotFound(path) => {
                write!(f, "Directory '{}' does not exist.", path.display())
            }
            CommandError::DirectoryAccessError { path, source } => {
                write!(f, "Failed to open directory '{}': {}", path.display(), source)
            }
            CommandError::CommandNotFound(cmd) => write!(f, "Command '{}' does not exist.", cmd),
            CommandError::ReplayDepthExceeded(depth) => {
                write!(f, "replay chain deeper than {} commands", depth)
            }
            CommandError::ProcessError(err) => write!(f, "{}", err),
            CommandError::HistoryError(err) => write!(f, "{}", err),
            CommandError::IoError(err) => write!(f, "IO error: {}", err),
        }
    }
}

impl std::error::Error for CommandError {}

impl From<std::io::Error> for CommandError {
    fn from(err: std::io::Error) -> Self {
        CommandError::IoError(err)
    }
}

impl From<ProcessError> for CommandError {
    fn from(err: ProcessError) -> Self {
        CommandError::ProcessError(err)
    }
}

impl From<HistoryError> for CommandError {
    fn from(err: HistoryError) -> Self {
        CommandError::HistoryError(err)
    }
}

/// What the dispatcher does after a handler returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Done,
    Replay(usize),
}

/// Per-invocation view handed to a handler. `index` is the history record
/// being executed.
pub struct CommandContext<'a> {
    pub session: &'a mut Session,
    pub out: &'a mut dyn Write,
    pub index: usize,
}

pub trait Command {
    fn execute(&self, ctx: &mut CommandContext<'_>, args: &[String]) -> Result<Flow, CommandError>;
}

#[derive(Clone)]
enum CommandType {
    MoveToDir(MoveToDirCommand),
    WhereAmI(WhereAmICommand),
    History(HistoryCommand),
    ByeBye(ByeByeCommand),
    Replay(ReplayCommand),
    Start(StartCommand),
    Background(BackgroundCommand),
    Dalek(DalekCommand),
    Repeat(RepeatCommand),
    DalekAll(DalekAllCommand),
}

impl Command for CommandType {
    fn execute(&self, ctx: &mut CommandContext<'_>, args: &[String]) -> Result<Flow, CommandError> {
        match self {
            CommandType::MoveToDir(cmd) => cmd.execute(ctx, args),
            CommandType::WhereAmI(cmd) => cmd.execute(ctx, args),
            CommandType::History(cmd) => cmd.execute(ctx, args),
            CommandType::ByeBye(cmd) => cmd.execute(ctx, args),
            CommandType::Replay(cmd) => cmd.execute(ctx, args),
            CommandType::Start(cmd) => cmd.execute(ctx, args),
            CommandType::Background(cmd) => cmd.execute(ctx, args),
            CommandType::Dalek(cmd) => cmd.execute(ctx, args),
            CommandType::Repeat(cmd) => cmd.execute(ctx, args),
            CommandType::DalekAll(cmd) => cmd.execute(ctx, args),
        }
    }
}

/// Resolves a history record to a built-in or an external program and runs
/// it. Replays re-enter the dispatcher up to `max_replay_depth` levels deep.
#[derive(Clone)]
pub struct CommandExecutor {
    commands: BTreeMap<String, CommandType>,
    max_replay_depth: usize,
}

impl Default for CommandExecutor {
    fn default() -> Self {
        Self::new(DEFAULT_REPLAY_DEPTH)
    }
}

impl CommandExecutor {
    pub fn new(max_replay_depth: usize) -> Self {
        let mut executor = Self {
            commands: BTreeMap::new(),
            max_replay_depth,
        };

        executor.register("movetodir", CommandType::MoveToDir(MoveToDirCommand));
        executor.register("whereami", CommandType::WhereAmI(WhereAmICommand));
        executor.register("history", CommandType::History(HistoryCommand));
        executor.register("byebye", CommandType::ByeBye(ByeByeCommand));
        executor.register("replay", CommandType::Replay(ReplayCommand));
        executor.register("start", CommandType::Start(StartCommand));
        executor.register("background", CommandType::Background(BackgroundCommand));
        executor.register("dalek", CommandType::Dalek(DalekCommand));
        executor.register("repeat", CommandType::Repeat(RepeatCommand));
        executor.register("dalekall", CommandType::DalekAll(DalekAllCommand));

        executor
    }

    fn register(&mut self, name: &str, command: CommandType) {
        self.commands.insert(name.to_string(), command);
    }

    pub fn is_builtin(&self, command: &str) -> bool {
        self.commands.contains_key(command)
    }

    /// Runs the history record at `index`.
    pub fn execute(
        &self,
        session: &mut Session,
        out: &mut dyn Write,
        index: usize,
    ) -> Result<(), CommandError> {
        self.execute_at_depth(session, out, index, 0)
    }

    fn execute_at_depth(
        &self,
        session: &mut Session,
        out: &mut dyn Write,
        index: usize,
        depth: usize,
    ) -> Result<(), CommandError> {
        if depth > self.max_replay_depth {
            return Err(CommandError::ReplayDepthExceeded(self.max_replay_depth));
        }

        // Cloned so handlers are free to clear the history they came from.
        let record = session.history.get(index)?.clone();
        debug!("dispatching #{} (depth {}): {}", index, depth, record);

        let mut ctx = CommandContext {
            session,
            out,
            index,
        };

        let flow = match self.commands.get(&record.command) {
            Some(cmd) => cmd.execute(&mut ctx, &record.arguments)?,
            None => {
                run_external(&mut ctx, &record.command, &record.arguments)?;
                Flow::Done
            }
        };

        match flow {
            Flow::Done => Ok(()),
            Flow::Replay(target) => self.execute_at_depth(ctx.session, ctx.out, target, depth + 1),
        }
    }
}

/// Unknown names run in the foreground if they name an existing program.
fn run_external(
    ctx: &mut CommandContext<'_>,
    name: &str,
    args: &[String],
) -> Result<(), CommandError> {
    let session = &mut *ctx.session;
    let program = session
        .cwd
        .locate_program(name)
        .ok_or_else(|| CommandError::CommandNotFound(name.to_string()))?;

    let report = session
        .runner
        .spawn_foreground(&program, args, session.cwd.current())?;
    if !report.success() {
        writeln!(ctx.out, "{} {}", name, report)?;
    }
    Ok(())
}

fn require_digits(arg: &str) -> Result<(), CommandError> {
    if arg.is_empty() || !arg.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CommandError::NotANumber(arg.to_string()));
    }
    Ok(())
}

/// Accepts only plain decimal digits, so `-1` and `+1` are rejected.
pub(crate) fn parse_number<T: FromStr>(arg: &str) -> Result<T, CommandError> {
    require_digits(arg)?;
    arg.parse()
        .map_err(|_| CommandError::NotANumber(arg.to_string()))
}

/// Same digit rules as `parse_number`, but a value too large for `usize`
/// becomes `usize::MAX` so callers report it as out of range.
pub(crate) fn parse_saturating(arg: &str) -> Result<usize, CommandError> {
    require_digits(arg)?;
    Ok(arg.parse().unwrap_or(usize::MAX))
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::path::Path;
    use std::time::Duration;

    use super::*;
    use crate::core::Interpreter;
    use crate::history::HistoryStore;
    use crate::path::WorkingDirectory;
    use crate::process::ProcessRunner;

    pub fn interpreter(cwd: &Path) -> Interpreter {
        let session = Session::new(
            HistoryStore::new(),
            WorkingDirectory::new(cwd),
            ProcessRunner::new(Duration::from_millis(10)),
        );
        Interpreter::new(session, CommandExecutor::default())
    }

    /// Executes one line and returns the result with everything it printed.
    pub fn run(interp: &mut Interpreter, line: &str) -> (Result<(), CommandError>, String) {
        let mut out = Vec::new();
        let result = interp.execute_line(line, &mut out);
        (result, String::from_utf8_lossy(&out).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::{interpreter, run};
    use super::*;

    #[test]
    fn test_builtin_detection() {
        let executor = CommandExecutor::default();

        for name in [
            "movetodir",
            "whereami",
            "history",
            "byebye",
            "replay",
            "start",
            "background",
            "dalek",
            "repeat",
            "dalekall",
        ] {
            assert!(executor.is_builtin(name), "{} should be a builtin", name);
        }
        assert!(!executor.is_builtin("cd"));
        assert!(!executor.is_builtin(""));
    }

    #[test]
    fn test_unknown_command() {
        let dir = tempfile::tempdir().unwrap();
        let mut interp = interpreter(dir.path());

        let (result, _) = run(&mut interp, "definitely-not-a-real-program --flag");
        assert!(matches!(result, Err(CommandError::CommandNotFound(ref c)) if c == "definitely-not-a-real-program"));
        // The line is still recorded.
        assert_eq!(interp.session().history.len(), 1);
    }

    #[test]
    fn test_external_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let mut interp = interpreter(dir.path());

        let (result, out) = run(&mut interp, "touch created");
        assert!(result.is_ok());
        assert!(out.is_empty());
        assert!(dir.path().join("created").exists());

        let (result, out) = run(&mut interp, "false");
        assert!(result.is_ok());
        assert_eq!(out, "false exited with status 1\n");
    }

    #[test]
    fn test_replay_depth_limit() {
        let dir = tempfile::tempdir().unwrap();
        let mut interp = interpreter(dir.path());
        interp.set_executor(CommandExecutor::new(2));

        run(&mut interp, "whereami").0.unwrap();
        assert!(run(&mut interp, "replay 0").0.is_ok());
        assert!(run(&mut interp, "replay 0").0.is_ok());

        // replay -> replay -> replay -> whereami
        let (result, _) = run(&mut interp, "replay 0");
        assert!(matches!(result, Err(CommandError::ReplayDepthExceeded(2))));
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number::<usize>("42").unwrap(), 42);
        assert!(matches!(parse_number::<usize>("-1"), Err(CommandError::NotANumber(_))));
        assert!(matches!(parse_number::<usize>("+1"), Err(CommandError::NotANumber(_))));
        assert!(matches!(parse_number::<usize>("1a"), Err(CommandError::NotANumber(_))));
        assert!(matches!(parse_number::<usize>(""), Err(CommandError::NotANumber(_))));
        assert!(matches!(
            parse_number::<i32>("99999999999"),
            Err(CommandError::NotANumber(_))
        ));
    }

    #[test]
    fn test_parse_saturating() {
        assert_eq!(parse_saturating("7").unwrap(), 7);
        assert_eq!(parse_saturating("99999999999999999999999").unwrap(), usize::MAX);
        assert!(matches!(parse_saturating("-1"), Err(CommandError::NotANumber(_))));
        assert!(matches!(parse_saturating("9x"), Err(CommandError::NotANumber(_))));
    }

    #[test]
    fn test_command_error_display() {
        let errors = vec![
            CommandError::MissingArgument {
                command: "replay",
                what: "history offset",
            },
            CommandError::NotANumber("x".to_string()),
            CommandError::CommandNotFound("nope".to_string()),
            CommandError::OutOfRange {
                requested: 5,
                available: 1,
            },
        ];

        for error in errors {
            assert!(!error.to_string().is_empty());
        }
    }
}
