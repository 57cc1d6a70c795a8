use anyhow::Result;

use super::{CommandResult, CommandSummary, ProjectContext};
use crate::cli::args::SynthCommand;
use crate::core::synth::synthesize_locale_file;

pub fn synth(ctx: &ProjectContext, cmd: &SynthCommand) -> Result<CommandResult> {
    let file = ctx.locale_file(&cmd.file)?;
    let strict = ctx.snapshot.config.strict && !cmd.loose;
    let text = synthesize_locale_file(ctx.resolver(), &file, ctx.template(), strict)?;
    Ok(CommandResult::new(CommandSummary::Synth(text)))
}
