//! Plucker Core Library
//!
//! This library provides the core functionality for the plucker service,
//! which watches chat messages for links to short-form video, fetches the
//! media with an external tool (`yt-dlp`), and replies with the file.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`parser`] - URL discovery in message text and the domain allow-list
//! - [`download`] - Deadline-bounded fetch orchestration and exit classification
//! - [`workspace`] - The ephemeral scratch directory holding in-flight artifacts
//! - [`pipeline`] - Per-message dispatch and the reply sink seam
//! - [`config`] - Runtime configuration assembled once at startup
//! - [`failure`] - User-facing reply text for classified failures

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod download;
pub mod failure;
pub mod parser;
pub mod pipeline;
pub mod workspace;

// Re-export commonly used types
pub use config::{Config, ConfigError};
pub use download::{
    DownloadFailure, DownloadOutcome, DownloadRequest, ErrorKind, ExitReport, Orchestrator,
    classify_exit,
};
pub use parser::{AllowedDomains, extract_urls};
pub use pipeline::{
    Attachment, AttemptReport, AttemptStatus, DeliveryError, Dispatcher, InboundMessage,
    MessageReport, ReplySink, ReplyTarget,
};
pub use workspace::{Workspace, WorkspaceError};
