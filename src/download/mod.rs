//! Fetch orchestration around the external `yt-dlp` tool.
//!
//! This module turns one candidate link into either an artifact in the
//! workspace or a classified [`DownloadFailure`], within a hard deadline.
//!
//! # Features
//!
//! - Size ceiling passed through to the tool (`--max-filesize <N>M`)
//! - Single output container (`mp4`) so the artifact path is known up front
//! - Deadline raced against process exit; the process group is killed on expiry
//! - Exit classification that trusts yt-dlp's size marker over its exit code
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use plucker_core::download::{DownloadOutcome, DownloadRequest, Orchestrator};
//! use plucker_core::workspace::Workspace;
//!
//! # async fn example() {
//! let orchestrator = Orchestrator::with_default_program(Workspace::new("videos"));
//! let request = DownloadRequest::new(
//!     "https://www.tiktok.com/@x/video/1",
//!     "1234",
//!     10.0,
//!     Duration::from_secs(15),
//! );
//! match orchestrator.download(&request).await {
//!     DownloadOutcome::Artifact { path } => println!("saved {}", path.display()),
//!     DownloadOutcome::Failure(failure) => eprintln!("{failure}"),
//! }
//! # }
//! ```

mod classify;
mod command;
pub mod constants;
mod error;
mod orchestrator;
mod process;
mod request;

pub use classify::{ExitReport, classify_exit};
pub use error::{DownloadFailure, ErrorKind};
pub use orchestrator::Orchestrator;
pub use request::{DownloadOutcome, DownloadRequest};
