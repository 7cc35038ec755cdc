use std::fs;
use std::io::ErrorKind;

use log::debug;

use super::{Command, CommandContext, CommandError, Flow};

#[derive(Clone)]
pub struct MoveToDirCommand;

impl Command for MoveToDirCommand {
    fn execute(&self, ctx: &mut CommandContext<'_>, args: &[String]) -> Result<Flow, CommandError> {
        let target = match args {
            [target] => target,
            [] => {
                return Err(CommandError::MissingArgument {
                    command: "movetodir",
                    what: "directory",
                })
            }
            [_, extra, ..] => {
                return Err(CommandError::UnexpectedArgument {
                    command: "movetodir",
                    arg: extra.clone(),
                })
            }
        };

        let resolved = ctx.session.cwd.resolve(target);

        // Must be openable as a directory, not merely exist.
        fs::read_dir(&resolved).map_err(|source| {
            if source.kind() == ErrorKind::NotFound {
                CommandError::DirectoryNotFound(resolved.clone())
            } else {
                CommandError::DirectoryAccessError {
                    path: resolved.clone(),
                    source,
                }
            }
        })?;

        debug!("working directory is now {}", resolved.display());
        ctx.session.cwd.set(resolved);
        Ok(Flow::Done)
    }
}
