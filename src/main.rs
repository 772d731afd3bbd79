//! CLI entry point for plucker.

use std::process::ExitCode;

mod app;
mod cli;

/// Process-level result of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProcessExit {
    /// Every accepted link was delivered (or there were none).
    Success,
    /// Some links were delivered, some failed.
    Partial,
    /// Every accepted link failed.
    Failure,
}

impl From<ProcessExit> for ExitCode {
    fn from(exit: ProcessExit) -> Self {
        match exit {
            ProcessExit::Success => Self::SUCCESS,
            ProcessExit::Failure => Self::from(1),
            ProcessExit::Partial => Self::from(2),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    match app::runtime::run().await {
        Ok(exit) => exit.into(),
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(1)
        }
    }
}
