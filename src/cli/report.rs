//! Report formatting and printing.
//!
//! Kept apart from the commands so the library stays usable without a
//! terminal.

use std::io::{self, Write};

use colored::Colorize;

use super::commands::{CommandResult, CommandSummary, Issue, LookupOrigin, ProjectContext};
use crate::core::KeyDetail;

/// Success mark for consistent output formatting.
pub const SUCCESS_MARK: &str = "\u{2713}"; // ✓

/// Failure mark for consistent output formatting.
pub const FAILURE_MARK: &str = "\u{2718}"; // ✘

pub fn print(result: &CommandResult, ctx: &ProjectContext) {
    print_to(result, ctx, &mut io::stdout().lock());
}

pub fn print_to<W: Write>(result: &CommandResult, ctx: &ProjectContext, writer: &mut W) {
    match &result.summary {
        CommandSummary::Synth(text) => {
            let _ = write!(writer, "{}", text);
        }
        CommandSummary::Includes(files) => {
            for file in files {
                let _ = writeln!(writer, "{}", ctx.display_path(file));
            }
        }
        CommandSummary::Keys(details) => print_keys(details, ctx, writer),
        CommandSummary::Lookup { key, origins } => print_lookup(key, origins, ctx, writer),
        CommandSummary::Check { files_checked } => {
            if result.issues.is_empty() {
                print_success(*files_checked, writer);
            } else {
                for issue in &result.issues {
                    print_issue(issue, ctx, writer);
                }
                print_summary(result.issues.len(), *files_checked, writer);
            }
        }
    }
}

fn print_keys<W: Write>(details: &[KeyDetail], ctx: &ProjectContext, writer: &mut W) {
    for detail in details {
        let _ = writeln!(
            writer,
            "{}  {}",
            detail.key.bold(),
            ctx.display_path(&detail.file_name).dimmed()
        );
        for line in detail.text.lines() {
            let _ = writeln!(writer, "    {}", line);
        }
    }
}

fn print_lookup<W: Write>(key: &str, origins: &[LookupOrigin], ctx: &ProjectContext, writer: &mut W) {
    if origins.is_empty() {
        let _ = writeln!(
            writer,
            "{} {}",
            FAILURE_MARK.red(),
            format!("No definition of \"{}\"", key).red()
        );
        return;
    }
    for (index, origin) in origins.iter().enumerate() {
        if index > 0 {
            let _ = writeln!(writer);
        }
        let path = ctx.display_path(&origin.detail.file_name);
        let location = match origin.location {
            Some((line, col)) => format!("{}:{}:{}", path, line, col),
            None => path,
        };
        let _ = writeln!(writer, "{} {}", "-->".blue(), location);
        for line in origin.detail.text.lines() {
            let _ = writeln!(writer, "    {}", line);
        }
    }
}

fn print_issue<W: Write>(issue: &Issue, ctx: &ProjectContext, writer: &mut W) {
    let _ = writeln!(writer, "{}: {}", "error".bold().red(), issue.message());
    let _ = writeln!(
        writer,
        "  {} {}:{}:{}",
        "-->".blue(),
        ctx.display_path(&issue.file),
        issue.line,
        issue.col
    );
}

fn print_success<W: Write>(files_checked: usize, writer: &mut W) {
    let _ = writeln!(
        writer,
        "{} {}",
        SUCCESS_MARK.green(),
        format!(
            "Checked {} locale {} - no issues found",
            files_checked,
            if files_checked == 1 { "file" } else { "files" }
        )
        .green()
    );
}

fn print_summary<W: Write>(problems: usize, files_checked: usize, writer: &mut W) {
    let _ = writeln!(writer);
    let _ = writeln!(
        writer,
        "{} {}",
        FAILURE_MARK.red(),
        format!(
            "{} {} in {} locale {}",
            problems,
            if problems == 1 { "problem" } else { "problems" },
            files_checked,
            if files_checked == 1 { "file" } else { "files" }
        )
        .red()
        .bold()
    );
}
