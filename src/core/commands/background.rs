use super::{parse_number, Command, CommandContext, CommandError, Flow};
use crate::process::Pid;

/// Starts a program without waiting and prints its pid.
#[derive(Clone)]
pub struct BackgroundCommand;

impl Command for BackgroundCommand {
    fn execute(&self, ctx: &mut CommandContext<'_>, args: &[String]) -> Result<Flow, CommandError> {
        let (program, program_args) = args.split_first().ok_or(CommandError::MissingArgument {
            command: "background",
            what: "program to run",
        })?;

        let pid = spawn_job(ctx, program, program_args)?;
        writeln!(ctx.out, "{}", pid)?;
        Ok(Flow::Done)
    }
}

/// `repeat n prog [args...]` starts `n` background copies of a program.
#[derive(Clone)]
pub struct RepeatCommand;

impl Command for RepeatCommand {
    fn execute(&self, ctx: &mut CommandContext<'_>, args: &[String]) -> Result<Flow, CommandError> {
        let count = args.first().ok_or(CommandError::MissingArgument {
            command: "repeat",
            what: "repeat count",
        })?;
        let count: usize = parse_number(count)?;
        let (program, program_args) = args[1..].split_first().ok_or(CommandError::MissingArgument {
            command: "repeat",
            what: "program to run",
        })?;

        let mut pids = Vec::with_capacity(count);
        let mut failure = None;
        for _ in 0..count {
            match spawn_job(ctx, program, program_args) {
                Ok(pid) => pids.push(pid.to_string()),
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            }
        }

        if !pids.is_empty() {
            writeln!(ctx.out, "PIDs: {}", pids.join(", "))?;
        }
        match failure {
            Some(e) => Err(e),
            None => Ok(Flow::Done),
        }
    }
}

fn spawn_job(
    ctx: &mut CommandContext<'_>,
    program: &str,
    args: &[String],
) -> Result<Pid, CommandError> {
    let session = &mut *ctx.session;
    let path = session.cwd.resolve_program(program);
    let job = session
        .runner
        .spawn_background(&path, args, session.cwd.current())?;
    Ok(session.jobs.register(job))
}
