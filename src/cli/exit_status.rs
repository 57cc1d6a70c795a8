use std::process::ExitCode;

/// Exit status for CLI commands, following common conventions for linter tools.
///
/// - `Success` (0): Command completed, nothing to report
/// - `Failure` (1): Command completed but found problems, or a key had no origin
/// - `Error` (2): Command could not run (unreadable file, bad arguments)
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    Failure,
    Error,
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        match status {
            ExitStatus::Success => ExitCode::from(0),
            ExitStatus::Failure => ExitCode::from(1),
            ExitStatus::Error => ExitCode::from(2),
        }
    }
}

impl ExitStatus {
    pub fn from_problems(count: usize) -> Self {
        if count == 0 {
            ExitStatus::Success
        } else {
            ExitStatus::Failure
        }
    }
}
