use anyhow::Result;
use rayon::prelude::*;

use super::{CommandResult, CommandSummary, LookupOrigin, ProjectContext};
use crate::cli::args::LookupCommand;
use crate::core::{Catalog, FileSystem, backtrack::find_occurrences, line_index::LineIndex};

pub fn lookup(ctx: &ProjectContext, cmd: &LookupCommand) -> Result<CommandResult> {
    let file = ctx.locale_file(&cmd.file)?;
    let mut details = Catalog::new(ctx.resolver()).lookup(&file, &cmd.key);
    details.reverse();

    let origins = details
        .into_par_iter()
        .map(|detail| {
            let location = ctx.fs.read_to_string(&detail.file_name).ok().and_then(|source| {
                let found = find_occurrences(&detail, &source).into_iter().next()?;
                let (line, col) = LineIndex::new(&source).line_col(found.offset);
                Some((line + 1, col + 1))
            });
            LookupOrigin { detail, location }
        })
        .collect();

    Ok(CommandResult::new(CommandSummary::Lookup {
        key: cmd.key.clone(),
        origins,
    }))
}
