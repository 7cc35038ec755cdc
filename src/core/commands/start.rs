use super::{Command, CommandContext, CommandError, Flow};

/// Runs a program in the foreground. Silent on success.
#[derive(Clone)]
pub struct StartCommand;

impl Command for StartCommand {
    fn execute(&self, ctx: &mut CommandContext<'_>, args: &[String]) -> Result<Flow, CommandError> {
        let (program, program_args) = args.split_first().ok_or(CommandError::MissingArgument {
            command: "start",
            what: "program to run",
        })?;

        let session = &mut *ctx.session;
        let path = session.cwd.resolve_program(program);
        let report = session
            .runner
            .spawn_foreground(&path, program_args, session.cwd.current())?;

        if !report.success() {
            writeln!(ctx.out, "{} {}", program, report)?;
        }
        Ok(Flow::Done)
    }
}
