//! Request and outcome values for a single fetch.

use std::path::PathBuf;
use std::time::Duration;

use super::DownloadFailure;

/// One accepted link from one message, ready to fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadRequest {
    /// The link as it appeared in the message.
    pub source_url: String,
    /// Ties the artifact to its originating message; names the output file.
    pub correlation_id: String,
    /// Size ceiling handed to the fetch tool and re-checked on disk.
    pub max_size_mb: f64,
    /// Wall-clock budget, anchored at process launch.
    pub timeout: Duration,
}

impl DownloadRequest {
    /// Creates a request.
    pub fn new(
        source_url: impl Into<String>,
        correlation_id: impl Into<String>,
        max_size_mb: f64,
        timeout: Duration,
    ) -> Self {
        Self {
            source_url: source_url.into(),
            correlation_id: correlation_id.into(),
            max_size_mb,
            timeout,
        }
    }

    /// The ceiling in the tool's notation, e.g. `10M` or `9.5M`.
    #[must_use]
    pub fn size_limit_arg(&self) -> String {
        format!("{}M", self.max_size_mb)
    }
}

/// Result of one orchestrated fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// The media landed on disk.
    Artifact {
        /// Location inside the workspace.
        path: PathBuf,
    },
    /// The fetch did not produce a usable artifact.
    Failure(DownloadFailure),
}

impl DownloadOutcome {
    /// Returns the artifact path, if any.
    #[must_use]
    pub fn artifact(&self) -> Option<&PathBuf> {
        match self {
            Self::Artifact { path } => Some(path),
            Self::Failure(_) => None,
        }
    }

    /// Returns the failure, if any.
    #[must_use]
    pub fn failure(&self) -> Option<&DownloadFailure> {
        match self {
            Self::Artifact { .. } => None,
            Self::Failure(failure) => Some(failure),
        }
    }
}
