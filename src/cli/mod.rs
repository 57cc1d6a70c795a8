use std::process::ExitCode;

use anyhow::Result;

pub mod args;
pub mod commands;
pub mod exit_status;
pub mod report;
mod run;

pub use args::{Arguments, Command};
pub use exit_status::ExitStatus;

pub fn run_cli(args: Arguments) -> Result<ExitCode> {
    let Some(args) = args.with_command_or_help() else {
        return Ok(ExitStatus::Success.into());
    };

    let ctx = commands::ProjectContext::load(&args.common)?;
    let result = run::run(&args, &ctx)?;
    report::print(&result, &ctx);

    Ok(result.exit_status().into())
}
