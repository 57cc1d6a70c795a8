use anyhow::Result;

use super::{CommandResult, CommandSummary, ProjectContext};
use crate::cli::args::FileCommand;
use crate::core::Catalog;

pub fn keys(ctx: &ProjectContext, cmd: &FileCommand) -> Result<CommandResult> {
    let file = ctx.locale_file(&cmd.file)?;
    let details = Catalog::new(ctx.resolver()).details(&file);
    Ok(CommandResult::new(CommandSummary::Keys(details)))
}
