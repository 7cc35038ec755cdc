use super::{Command, CommandContext, CommandError, Flow};

/// Asks the shell to stop once the current line has finished.
#[derive(Clone)]
pub struct ByeByeCommand;

impl Command for ByeByeCommand {
    fn execute(&self, ctx: &mut CommandContext<'_>, _args: &[String]) -> Result<Flow, CommandError> {
        ctx.session.request_exit();
        Ok(Flow::Done)
    }
}
