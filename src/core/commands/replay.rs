use super::{parse_saturating, Command, CommandContext, CommandError, Flow};

/// `replay n` re-runs the record `n` positions before the one executing
/// (`0` is the immediately preceding record).
#[derive(Clone)]
pub struct ReplayCommand;

impl Command for ReplayCommand {
    fn execute(&self, ctx: &mut CommandContext<'_>, args: &[String]) -> Result<Flow, CommandError> {
        let arg = args.first().ok_or(CommandError::MissingArgument {
            command: "replay",
            what: "history offset",
        })?;
        let offset = parse_saturating(arg)?;

        let target = ctx
            .index
            .checked_sub(offset)
            .and_then(|i| i.checked_sub(1))
            .ok_or(CommandError::OutOfRange {
                requested: offset,
                available: ctx.index,
            })?;

        Ok(Flow::Replay(target))
    }
}
