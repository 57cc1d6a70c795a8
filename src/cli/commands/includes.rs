use anyhow::Result;

use super::{CommandResult, CommandSummary, ProjectContext};
use crate::cli::args::FileCommand;
use crate::core::IncludeGraph;

pub fn includes(ctx: &ProjectContext, cmd: &FileCommand) -> Result<CommandResult> {
    let file = ctx.locale_file(&cmd.file)?;
    let graph = IncludeGraph::build(ctx.resolver(), &file);
    Ok(CommandResult::new(CommandSummary::Includes(graph.files)))
}
