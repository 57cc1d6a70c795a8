use std::{cmp::Ordering, path::PathBuf};

use crate::cli::exit_status::ExitStatus;
use crate::core::KeyDetail;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueKind {
    /// The file is not valid YAML.
    ParseError(String),
    /// An include directive names a file that does not exist.
    UnresolvedInclude(String),
    /// The declaration module could not be synthesized.
    SynthesisFailed(String),
}

/// A problem found in one locale file. Lines and columns are 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub file: PathBuf,
    pub line: usize,
    pub col: usize,
    pub kind: IssueKind,
}

impl Issue {
    pub fn message(&self) -> String {
        match &self.kind {
            IssueKind::ParseError(err) => format!("invalid YAML: {}", err),
            IssueKind::UnresolvedInclude(target) => format!("cannot resolve include \"{}\"", target),
            IssueKind::SynthesisFailed(err) => format!("cannot synthesize declarations: {}", err),
        }
    }
}

impl PartialOrd for Issue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Issue {
    fn cmp(&self, other: &Self) -> Ordering {
        (&self.file, self.line, self.col)
            .cmp(&(&other.file, other.line, other.col))
            .then_with(|| self.message().cmp(&other.message()))
    }
}

/// One place a looked-up key is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupOrigin {
    pub detail: KeyDetail,
    /// 1-based position of the first placed value line, if any was placed.
    pub location: Option<(usize, usize)>,
}

#[derive(Debug)]
pub enum CommandSummary {
    Synth(String),
    Includes(Vec<PathBuf>),
    Keys(Vec<KeyDetail>),
    Lookup {
        key: String,
        /// Most specific file first.
        origins: Vec<LookupOrigin>,
    },
    Check {
        files_checked: usize,
    },
}

/// Result of running a command.
#[derive(Debug)]
pub struct CommandResult {
    pub summary: CommandSummary,
    /// Problems found; only `check` reports any.
    pub issues: Vec<Issue>,
}

impl CommandResult {
    pub fn new(summary: CommandSummary) -> Self {
        Self {
            summary,
            issues: Vec::new(),
        }
    }

    pub fn exit_status(&self) -> ExitStatus {
        match &self.summary {
            CommandSummary::Lookup { origins, .. } if origins.is_empty() => ExitStatus::Failure,
            _ => ExitStatus::from_problems(self.issues.len()),
        }
    }
}
