use anyhow::Result;

use super::{
    args::{Arguments, Command},
    commands::{
        CommandResult, ProjectContext, check::check, includes::includes, keys::keys,
        lookup::lookup, synth::synth,
    },
};

/// Dispatch to the command handler.
pub fn run(args: &Arguments, ctx: &ProjectContext) -> Result<CommandResult> {
    match &args.command {
        Some(Command::Synth(cmd)) => synth(ctx, cmd),
        Some(Command::Includes(cmd)) => includes(ctx, cmd),
        Some(Command::Keys(cmd)) => keys(ctx, cmd),
        Some(Command::Lookup(cmd)) => lookup(ctx, cmd),
        Some(Command::Check(cmd)) => check(ctx, cmd),
        None => anyhow::bail!("No command provided. Use --help to see available commands."),
    }
}
