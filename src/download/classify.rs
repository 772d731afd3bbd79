//! Classification of a finished fetch process.
//!
//! yt-dlp's exit status alone is not trustworthy: a transfer aborted by
//! `--max-filesize` still exits 0. The checks therefore run in a fixed order:
//!
//! 1. size marker in the captured output → [`DownloadFailure::SizeExceeded`]
//! 2. death by SIGKILL → [`DownloadFailure::ProcessKilled`]
//! 3. any other unsuccessful status → [`DownloadFailure::Generic`]
//! 4. otherwise success

use std::fmt;
use std::process::ExitStatus;

use super::DownloadFailure;
use super::constants::SIZE_CEILING_MARKER;

/// Signal number of SIGKILL on every Unix we run on.
const SIGKILL: i32 = 9;

/// How a process ended, reduced to what classification needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReport {
    /// Normal exit with a status code.
    Exited(i32),
    /// Terminated by a signal.
    Signaled(i32),
}

impl ExitReport {
    /// True for a zero exit code.
    #[must_use]
    pub fn success(self) -> bool {
        matches!(self, Self::Exited(0))
    }

    /// True when the process was SIGKILLed.
    #[must_use]
    pub fn killed(self) -> bool {
        matches!(self, Self::Signaled(SIGKILL))
    }
}

impl From<ExitStatus> for ExitReport {
    fn from(status: ExitStatus) -> Self {
        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return Self::Signaled(signal);
            }
        }
        // No code and no signal does not happen on supported platforms; treat as a failure.
        Self::Exited(status.code().unwrap_or(-1))
    }
}

impl fmt::Display for ExitReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exited(code) => write!(f, "exit status: {code}"),
            Self::Signaled(SIGKILL) => write!(f, "signal: killed"),
            Self::Signaled(signal) => write!(f, "signal: {signal}"),
        }
    }
}

/// Classifies a finished fetch from its exit report and combined output.
///
/// `size_limit` is the ceiling string passed to the tool (e.g. `10M`) and only
/// feeds the failure message.
///
/// # Errors
///
/// Returns the [`DownloadFailure`] the precedence rules select.
pub fn classify_exit(
    program: &str,
    exit: ExitReport,
    output: &str,
    size_limit: &str,
) -> Result<(), DownloadFailure> {
    if output.contains(SIZE_CEILING_MARKER) {
        return Err(DownloadFailure::size_exceeded(size_limit));
    }

    if exit.killed() {
        return Err(DownloadFailure::ProcessKilled);
    }

    if !exit.success() {
        return Err(DownloadFailure::generic(
            program,
            exit.to_string(),
            output,
        ));
    }

    Ok(())
}
