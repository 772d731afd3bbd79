//! Per-message summaries of what the dispatcher did.

use serde::Serialize;

use crate::download::{DownloadFailure, ErrorKind};

/// What happened to one accepted link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AttemptStatus {
    /// The artifact reached the reply sink.
    Delivered {
        /// Artifact size.
        bytes: u64,
    },
    /// The link failed and the user was told why.
    Failed {
        /// Closed-set failure kind.
        kind: ErrorKind,
        /// Failure description, as logged.
        message: String,
    },
}

impl AttemptStatus {
    pub(crate) fn failed(failure: &DownloadFailure) -> Self {
        Self::Failed {
            kind: failure.kind(),
            message: failure.to_string(),
        }
    }

    /// The failure kind, if the attempt failed.
    #[must_use]
    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Delivered { .. } => None,
            Self::Failed { kind, .. } => Some(*kind),
        }
    }
}

/// One accepted link and its fate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttemptReport {
    /// The link as extracted from the message.
    pub url: String,
    /// Result of the attempt.
    #[serde(flatten)]
    pub status: AttemptStatus,
}

/// Summary of one inbound message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MessageReport {
    /// Originating message id.
    pub message_id: String,
    /// Accepted links, in message order.
    pub attempts: Vec<AttemptReport>,
    /// Links rejected by the allow-list (never reported to the user).
    pub skipped: usize,
    /// Set when a workspace failure stopped processing before the last link.
    pub aborted: bool,
}

impl MessageReport {
    pub(crate) fn new(message_id: impl Into<String>) -> Self {
        Self {
            message_id: message_id.into(),
            ..Self::default()
        }
    }

    /// Number of links delivered as attachments.
    #[must_use]
    pub fn delivered(&self) -> usize {
        self.attempts
            .iter()
            .filter(|a| matches!(a.status, AttemptStatus::Delivered { .. }))
            .count()
    }

    /// Number of accepted links that failed.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.attempts.len() - self.delivered()
    }
}
