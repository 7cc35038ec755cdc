use log::info;

use super::{parse_saturating, Command, CommandContext, CommandError, Flow};
use crate::process::{Pid, ProcessError};

/// `dalek pid` kills a process and waits for it to be reaped.
#[derive(Clone)]
pub struct DalekCommand;

impl Command for DalekCommand {
    fn execute(&self, ctx: &mut CommandContext<'_>, args: &[String]) -> Result<Flow, CommandError> {
        let arg = args.first().ok_or(CommandError::MissingArgument {
            command: "dalek",
            what: "process id",
        })?;
        // No process can carry a pid past `Pid::MAX`.
        let pid = Pid::try_from(parse_saturating(arg)?)
            .map_err(|_| ProcessError::ProcessNotFound(Pid::MAX))?;

        let session = &mut *ctx.session;
        let report = session.runner.terminate(pid, &mut session.jobs)?;
        info!("process {} {}", pid, report);

        writeln!(ctx.out, "Process {} {}", pid, report)?;
        Ok(Flow::Done)
    }
}

/// Terminates every tracked background job.
#[derive(Clone)]
pub struct DalekAllCommand;

impl Command for DalekAllCommand {
    fn execute(&self, ctx: &mut CommandContext<'_>, _args: &[String]) -> Result<Flow, CommandError> {
        let pids = ctx.session.jobs.pids();
        if pids.is_empty() {
            writeln!(ctx.out, "No processes to exterminate.")?;
            return Ok(Flow::Done);
        }

        let listed: Vec<String> = pids.iter().map(Pid::to_string).collect();
        writeln!(
            ctx.out,
            "Exterminating {} processes: {}",
            pids.len(),
            listed.join(" ")
        )?;

        for pid in pids {
            let session = &mut *ctx.session;
            match session.runner.terminate(pid, &mut session.jobs) {
                Ok(report) => writeln!(ctx.out, "Process {} {}", pid, report)?,
                Err(e) => writeln!(ctx.out, "Process {}: {}", pid, e)?,
            }
        }
        Ok(Flow::Done)
    }
}
