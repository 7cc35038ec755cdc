use super::{Command, CommandContext, CommandError, Flow};

#[derive(Clone)]
pub struct WhereAmICommand;

impl Command for WhereAmICommand {
    fn execute(&self, ctx: &mut CommandContext<'_>, _args: &[String]) -> Result<Flow, CommandError> {
        writeln!(ctx.out, "{}", ctx.session.cwd.current().display())?;
        Ok(Flow::Done)
    }
}
