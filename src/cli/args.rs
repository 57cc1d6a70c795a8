//! CLI argument definitions using clap.
//!
//! ## Commands
//!
//! - `synth`: print the declaration module synthesized for a locale file
//! - `includes`: list the files a locale file transitively includes
//! - `keys`: list every key a locale file provides, includes first
//! - `lookup`: find where a key is written and what it says
//! - `check`: validate every locale file of the project

use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Arguments {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl Arguments {
    /// Check if a command was provided, otherwise print help and return None.
    pub fn with_command_or_help(self) -> Option<Self> {
        if self.command.is_none() {
            Self::command().print_help().ok();
            None
        } else {
            Some(self)
        }
    }

    pub fn verbose(&self) -> bool {
        self.common.verbose
    }
}

/// Arguments shared by all commands.
#[derive(Debug, Clone, Default, Args)]
pub struct CommonArgs {
    /// Project root (default: directory of the nearest tsconfig.json)
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Args)]
pub struct SynthCommand {
    /// Locale file
    pub file: PathBuf,

    /// Admit any string as a key, whatever the configuration says
    #[arg(long)]
    pub loose: bool,
}

#[derive(Debug, Args)]
pub struct FileCommand {
    /// Locale file
    pub file: PathBuf,
}

#[derive(Debug, Args)]
pub struct LookupCommand {
    /// Locale file the key is looked up from
    pub file: PathBuf,

    /// Message key
    pub key: String,
}

#[derive(Debug, Args)]
pub struct CheckCommand {
    /// Glob patterns of paths to skip; can be repeated
    #[arg(long)]
    pub ignore: Vec<String>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the declaration module synthesized for a locale file
    Synth(SynthCommand),
    /// List the files a locale file transitively includes
    Includes(FileCommand),
    /// List every key of a locale file and its includes
    Keys(FileCommand),
    /// Show where a key is defined and its text
    Lookup(LookupCommand),
    /// Check every locale file for YAML errors and unresolved includes
    Check(CheckCommand),
}
