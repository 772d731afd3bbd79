//! The seam between the pipeline and whatever chat platform hosts it.

use async_trait::async_trait;
use thiserror::Error;
use tokio::fs::File;

/// Identifies the message a reply is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyTarget {
    /// Conversation the message was posted in.
    pub channel_id: String,
    /// The message being replied to.
    pub message_id: String,
}

/// An artifact ready to upload.
#[derive(Debug)]
pub struct Attachment {
    /// Name shown to users; the artifact's base filename.
    pub file_name: String,
    /// Open handle on the artifact.
    pub file: File,
    /// On-disk size, already checked against the ceiling.
    pub size_bytes: u64,
}

/// Errors a sink reports back to the dispatcher.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// The platform refused the reply (too large, missing permission, ...).
    #[error("reply rejected: {reason}")]
    Rejected {
        /// Platform-provided reason.
        reason: String,
    },

    /// Local I/O failed while streaming the attachment.
    #[error("I/O error delivering reply: {0}")]
    Io(#[from] std::io::Error),
}

impl DeliveryError {
    /// Creates a rejection error.
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected {
            reason: reason.into(),
        }
    }
}

/// Destination for replies to inbound messages.
///
/// Implemented by the chat gateway adapter. Both methods reply to `target`;
/// neither is retried by the pipeline.
#[async_trait]
pub trait ReplySink: Send + Sync {
    /// Uploads an attachment as a reply.
    async fn send_attachment(
        &self,
        target: &ReplyTarget,
        attachment: Attachment,
    ) -> Result<(), DeliveryError>;

    /// Posts a plain-text reply.
    async fn send_text(&self, target: &ReplyTarget, text: &str) -> Result<(), DeliveryError>;
}
