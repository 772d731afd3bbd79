//! Deadline-bounded execution of the external fetch tool.
//!
//! One [`Orchestrator::download`] call runs one fetch to completion. Inside
//! it three event sources race:
//!
//! - the deadline, anchored at process launch
//! - natural process exit
//! - a 1-second heartbeat that only feeds the logs
//!
//! ```text
//! Idle ──spawn──▶ Running ──exit────▶ Completed(Artifact | classified failure)
//!                    └────deadline──▶ Cancelled(Timeout)   (process group killed)
//! ```
//!
//! The deadline branch is polled first, so an exit that lands in the same
//! instant as the deadline still counts as a timeout.

use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::process::Command;
use tokio::time::{Instant, MissedTickBehavior, interval_at, sleep_until};
use tracing::{debug, info, instrument, warn};

use super::classify::{ExitReport, classify_exit};
use super::command::fetch_args;
use super::constants::{
    DEFAULT_FETCH_PROGRAM, HEARTBEAT_FINAL_STRETCH_SECS, HEARTBEAT_INTERVAL,
    HEARTBEAT_LOG_EVERY_SECS, OUTPUT_CONTAINER, OUTPUT_DRAIN_GRACE,
};
use super::process::{OutputCapture, kill_group, terminate};
use super::{DownloadFailure, DownloadOutcome, DownloadRequest};
use crate::workspace::Workspace;

/// Stand-in deadline for budgets too large to add to an `Instant` (about 30 years).
const UNBOUNDED_DEADLINE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// Runs the fetch tool for one request at a time.
#[derive(Debug, Clone)]
pub struct Orchestrator {
    program: String,
    workspace: Workspace,
}

/// How the race ended.
enum Race {
    Exited(std::io::Result<ExitStatus>),
    DeadlineElapsed,
}

impl Orchestrator {
    /// Creates an orchestrator that writes artifacts into `workspace`.
    pub fn new(program: impl Into<String>, workspace: Workspace) -> Self {
        Self {
            program: program.into(),
            workspace,
        }
    }

    /// Orchestrator using `yt-dlp` from `PATH`.
    #[must_use]
    pub fn with_default_program(workspace: Workspace) -> Self {
        Self::new(DEFAULT_FETCH_PROGRAM, workspace)
    }

    /// The fetch program this orchestrator launches.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Fetches `request.source_url` into the workspace within `request.timeout`.
    ///
    /// Never returns while the fetch process is still running.
    #[instrument(skip(self, request), fields(url = %request.source_url, id = %request.correlation_id))]
    pub async fn download(&self, request: &DownloadRequest) -> DownloadOutcome {
        let output_path = self
            .workspace
            .artifact_path(&request.correlation_id, OUTPUT_CONTAINER);
        let size_limit = request.size_limit_arg();

        let mut command = Command::new(&self.program);
        command
            .args(fetch_args(&request.source_url, &output_path, &size_limit))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(unix)]
        command.process_group(0);

        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(e) => {
                warn!(program = %self.program, error = %e, "failed to launch fetch process");
                return DownloadOutcome::Failure(DownloadFailure::generic(
                    &self.program,
                    e.to_string(),
                    "",
                ));
            }
        };

        let launched = Instant::now();
        let leader = child.id();
        let capture = OutputCapture::start(&mut child);
        let limit_secs = request.timeout.as_secs();
        info!(
            size_limit = %size_limit,
            timeout_secs = limit_secs,
            "starting download"
        );

        let deadline = sleep_until(
            launched
                .checked_add(request.timeout)
                .unwrap_or_else(|| launched + UNBOUNDED_DEADLINE),
        );
        tokio::pin!(deadline);
        let mut ticker = interval_at(launched + HEARTBEAT_INTERVAL, HEARTBEAT_INTERVAL);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut countdown = Countdown::new(limit_secs);

        let race = loop {
            tokio::select! {
                biased;
                () = &mut deadline => break Race::DeadlineElapsed,
                status = child.wait() => break Race::Exited(status),
                _ = ticker.tick() => {
                    if let Some(remaining) = countdown.tick() {
                        info!(remaining_secs = remaining, "downloading");
                    }
                }
            }
        };

        match race {
            Race::DeadlineElapsed => {
                terminate(&mut child).await;
                let output = capture.finish(OUTPUT_DRAIN_GRACE).await;
                warn!(
                    timeout_secs = limit_secs,
                    elapsed_ms = launched.elapsed().as_millis(),
                    %output,
                    "fetch process timed out"
                );
                DownloadOutcome::Failure(DownloadFailure::timeout(limit_secs))
            }
            Race::Exited(Err(e)) => {
                terminate(&mut child).await;
                let output = capture.finish(OUTPUT_DRAIN_GRACE).await;
                warn!(error = %e, %output, "failed to wait on fetch process");
                DownloadOutcome::Failure(DownloadFailure::generic(
                    &self.program,
                    e.to_string(),
                    output,
                ))
            }
            Race::Exited(Ok(status)) => {
                kill_group(leader);
                let output = capture.finish(OUTPUT_DRAIN_GRACE).await;
                let exit = ExitReport::from(status);
                match classify_exit(&self.program, exit, &output, &size_limit) {
                    Ok(()) => {
                        info!(path = %output_path.display(), "download finished");
                        DownloadOutcome::Artifact { path: output_path }
                    }
                    Err(failure) => {
                        match &failure {
                            DownloadFailure::SizeExceeded { .. } => {
                                info!(size_limit = %size_limit, "fetch aborted: file larger than max file size");
                            }
                            _ => warn!(%exit, %output, error = %failure, "fetch failed"),
                        }
                        DownloadOutcome::Failure(failure)
                    }
                }
            }
        }
    }
}

/// Seconds-remaining counter behind the heartbeat log.
///
/// Reports every second in the final stretch and every tenth second otherwise.
#[derive(Debug)]
struct Countdown {
    remaining: u64,
}

impl Countdown {
    fn new(total_secs: u64) -> Self {
        Self {
            remaining: total_secs,
        }
    }

    /// Advances one second; returns the remaining time when it is worth logging.
    fn tick(&mut self) -> Option<u64> {
        self.remaining = self.remaining.saturating_sub(1);
        let remaining = self.remaining;
        if remaining <= HEARTBEAT_FINAL_STRETCH_SECS || remaining % HEARTBEAT_LOG_EVERY_SECS == 0 {
            debug!(remaining, "heartbeat");
            Some(remaining)
        } else {
            None
        }
    }
}
