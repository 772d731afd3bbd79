//! Error types for the download module.
//!
//! [`ErrorKind`] is the closed set of ways one link can fail on its way to
//! becoming an attachment. [`DownloadFailure`] carries the kind together with
//! the context needed for logs and the user-facing reply.

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// Every way handling a single link can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Transfer aborted by the size ceiling, or the artifact is over it.
    SizeExceeded,
    /// The deadline elapsed before the fetch finished.
    Timeout,
    /// The fetch process was SIGKILLed by something other than us (usually the OOM killer).
    ProcessKilled,
    /// Any other fetch failure.
    GenericFailure,
    /// Host not in the allow-list.
    UnsupportedDomain,
    /// Candidate link did not parse.
    InvalidUrl,
    /// The artifact could not be opened or inspected.
    ArtifactIo,
    /// The reply sink rejected the attachment.
    DeliveryFailure,
}

impl ErrorKind {
    /// Whether the originating conversation hears about this failure.
    ///
    /// Filter rejections are silent; everything past the filter is reported.
    #[must_use]
    pub fn is_user_visible(self) -> bool {
        !matches!(self, Self::UnsupportedDomain | Self::InvalidUrl)
    }
}

/// A classified failure for one download attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DownloadFailure {
    /// yt-dlp reported the size marker, or the artifact on disk is over the ceiling.
    #[error("video download aborted: file is larger than the maximum allowed size ({limit})")]
    SizeExceeded {
        /// The ceiling as passed to the fetch tool, e.g. `10M`.
        limit: String,
    },

    /// The deadline elapsed and the process was killed.
    #[error("video download aborted: process took too long (limit: {limit_secs}s)")]
    Timeout {
        /// The configured deadline in whole seconds.
        limit_secs: u64,
    },

    /// The process died from SIGKILL it did not receive from us.
    #[error("video download failed: process was killed (likely out of memory)")]
    ProcessKilled,

    /// Non-zero exit, other signal, or spawn failure.
    #[error("{program} failed: {status}")]
    Generic {
        /// Fetch program name.
        program: String,
        /// Exit status or OS error text.
        status: String,
        /// Captured combined output, for logs.
        output: String,
    },

    /// The artifact could not be opened or stat'ed.
    #[error("could not open downloaded file {path}: {reason}")]
    ArtifactIo {
        /// Expected artifact location.
        path: PathBuf,
        /// Underlying I/O error text.
        reason: String,
    },

    /// The reply sink refused the attachment.
    #[error("could not send file: {reason}")]
    Delivery {
        /// Sink-provided reason.
        reason: String,
    },
}

impl DownloadFailure {
    /// Creates a size-ceiling failure.
    pub fn size_exceeded(limit: impl Into<String>) -> Self {
        Self::SizeExceeded {
            limit: limit.into(),
        }
    }

    /// Creates a timeout failure.
    #[must_use]
    pub fn timeout(limit_secs: u64) -> Self {
        Self::Timeout { limit_secs }
    }

    /// Creates a generic tool failure.
    pub fn generic(
        program: impl Into<String>,
        status: impl Into<String>,
        output: impl Into<String>,
    ) -> Self {
        Self::Generic {
            program: program.into(),
            status: status.into(),
            output: output.into(),
        }
    }

    /// Creates an artifact I/O failure.
    pub fn artifact_io(path: impl Into<PathBuf>, source: &std::io::Error) -> Self {
        Self::ArtifactIo {
            path: path.into(),
            reason: source.to_string(),
        }
    }

    /// Creates a delivery failure.
    pub fn delivery(reason: impl Into<String>) -> Self {
        Self::Delivery {
            reason: reason.into(),
        }
    }

    /// The closed-set kind of this failure.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::SizeExceeded { .. } => ErrorKind::SizeExceeded,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::ProcessKilled => ErrorKind::ProcessKilled,
            Self::Generic { .. } => ErrorKind::GenericFailure,
            Self::ArtifactIo { .. } => ErrorKind::ArtifactIo,
            Self::Delivery { .. } => ErrorKind::DeliveryFailure,
        }
    }
}
