use std::process::ExitCode;

use clap::Parser;
use locale_keys::cli::{Arguments, ExitStatus};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let args = Arguments::parse();
    init_tracing(args.verbose());

    match locale_keys::cli::run_cli(args) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitStatus::Error.into()
        }
    }
}

/// `RUST_LOG` wins; otherwise `-v` turns on this crate's debug logs.
fn init_tracing(verbose: bool) {
    let fallback = if verbose { "locale_keys=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)))
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}
