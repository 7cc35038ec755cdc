use super::{Command, CommandContext, CommandError, Flow};

/// `history` lists records newest first; `history -c` clears them.
#[derive(Clone)]
pub struct HistoryCommand;

impl HistoryCommand {
    fn show(&self, ctx: &mut CommandContext<'_>) -> Result<Flow, CommandError> {
        let lines = ctx.session.history.list_reverse();
        if lines.is_empty() {
            writeln!(ctx.out, "No history to print.")?;
        }
        for line in lines {
            writeln!(ctx.out, "{}", line)?;
        }
        Ok(Flow::Done)
    }
}

impl Command for HistoryCommand {
    fn execute(&self, ctx: &mut CommandContext<'_>, args: &[String]) -> Result<Flow, CommandError> {
        match args.first().map(String::as_str) {
            None => self.show(ctx),
            Some("-c") => {
                ctx.session.history.clear();
                Ok(Flow::Done)
            }
            Some(flag) => Err(CommandError::InvalidFlag {
                command: "history",
                flag: flag.to_string(),
            }),
        }
    }
}
