use std::path::{Path, PathBuf};

use anyhow::Result;
use colored::Colorize;
use glob::Pattern;
use rayon::prelude::*;
use walkdir::{DirEntry, WalkDir};

use super::{CommandResult, CommandSummary, Issue, IssueKind, ProjectContext};
use crate::cli::args::CheckCommand;
use crate::config::validate_ignores;
use crate::core::{
    LocaleFile, catalog::parse_catalog, include::scan_directives, line_index::LineIndex,
    synth::synthesize_locale_file,
};

/// Directories never worth descending into.
const SKIPPED_DIRS: &[&str] = &["node_modules", ".git"];

pub fn check(ctx: &ProjectContext, cmd: &CheckCommand) -> Result<CommandResult> {
    validate_ignores(&cmd.ignore)?;
    let ignores: Vec<Pattern> = cmd.ignore.iter().filter_map(|p| Pattern::new(p).ok()).collect();

    let files = scan_locale_files(ctx, &ignores);
    let mut issues: Vec<Issue> = files
        .par_iter()
        .flat_map_iter(|path| check_file(ctx, path))
        .collect();
    issues.sort();

    Ok(CommandResult {
        summary: CommandSummary::Check {
            files_checked: files.len(),
        },
        issues,
    })
}

/// Every locale file under the project root, sorted.
fn scan_locale_files(ctx: &ProjectContext, ignores: &[Pattern]) -> Vec<PathBuf> {
    let root = ctx.root();
    let ignored = |path: &Path| {
        let relative = ctx.display_path(path);
        ignores
            .iter()
            .any(|p| p.matches(&relative) || p.matches_path(path))
    };

    let mut files = Vec::new();
    let walker = WalkDir::new(root)
        .into_iter()
        .filter_entry(|entry| !is_skipped_dir(entry) && !ignored(entry.path()));
    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                if ctx.verbose {
                    eprintln!("{} Cannot access path: {}", "warning:".bold().yellow(), e);
                }
                continue;
            }
        };
        if entry.file_type().is_file() && ctx.snapshot.is_locale_module(entry.path()) {
            files.push(entry.into_path());
        }
    }
    files.sort();
    files
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| SKIPPED_DIRS.contains(&name))
}

fn check_file(ctx: &ProjectContext, path: &Path) -> Vec<Issue> {
    let file = LocaleFile::probe(&ctx.fs, path);
    let issue = |line: usize, col: usize, kind: IssueKind| Issue {
        file: path.to_path_buf(),
        line,
        col,
        kind,
    };
    if !file.is_file() {
        return vec![issue(1, 1, IssueKind::ParseError("file cannot be read".to_string()))];
    }

    let mut issues = Vec::new();
    if let Err(err) = parse_catalog(&file.raw_text, &file.path) {
        let (line, col) = err
            .downcast_ref::<serde_yaml::Error>()
            .and_then(serde_yaml::Error::location)
            .map_or((1, 1), |loc| (loc.line(), loc.column()));
        let message = err
            .downcast_ref::<serde_yaml::Error>()
            .map_or_else(|| format!("{:#}", err), ToString::to_string);
        issues.push(issue(line, col, IssueKind::ParseError(message)));
    }

    let index = LineIndex::new(&file.raw_text);
    let mut walk = ctx.resolver().walk();
    for directive in scan_directives(&file.raw_text) {
        if !walk.resolve(&directive.target, &file.directory).is_file() {
            let (line, col) = index.line_col(directive.offset);
            issues.push(issue(
                line + 1,
                col + 1,
                IssueKind::UnresolvedInclude(directive.target.as_str().to_string()),
            ));
        }
    }

    if let Err(err) = synthesize_locale_file(ctx.resolver(), &file, ctx.template(), ctx.snapshot.config.strict) {
        issues.push(issue(1, 1, IssueKind::SynthesisFailed(format!("{:#}", err))));
    }
    issues
}
