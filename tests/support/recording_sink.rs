//! Reply sink that keeps every reply in memory for assertions.

use std::sync::Mutex;

use async_trait::async_trait;
use plucker_core::{Attachment, DeliveryError, ReplySink, ReplyTarget};
use tokio::io::AsyncReadExt;

/// One reply as the sink saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Attachment {
        message_id: String,
        file_name: String,
        body: Vec<u8>,
    },
    Text {
        message_id: String,
        text: String,
    },
}

#[derive(Debug, Default)]
pub struct RecordingSink {
    replies: Mutex<Vec<Reply>>,
    reject_attachments: bool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink whose platform refuses every upload.
    pub fn rejecting_attachments() -> Self {
        Self {
            reject_attachments: true,
            ..Self::default()
        }
    }

    pub fn replies(&self) -> Vec<Reply> {
        self.replies.lock().expect("sink poisoned").clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.replies()
            .into_iter()
            .filter_map(|r| match r {
                Reply::Text { text, .. } => Some(text),
                Reply::Attachment { .. } => None,
            })
            .collect()
    }

    pub fn attachments(&self) -> Vec<(String, Vec<u8>)> {
        self.replies()
            .into_iter()
            .filter_map(|r| match r {
                Reply::Attachment {
                    file_name, body, ..
                } => Some((file_name, body)),
                Reply::Text { .. } => None,
            })
            .collect()
    }
}

#[async_trait]
impl ReplySink for RecordingSink {
    async fn send_attachment(
        &self,
        target: &ReplyTarget,
        mut attachment: Attachment,
    ) -> Result<(), DeliveryError> {
        if self.reject_attachments {
            return Err(DeliveryError::rejected("413 Payload Too Large"));
        }
        let mut body = Vec::new();
        attachment.file.read_to_end(&mut body).await?;
        self.replies.lock().expect("sink poisoned").push(Reply::Attachment {
            message_id: target.message_id.clone(),
            file_name: attachment.file_name,
            body,
        });
        Ok(())
    }

    async fn send_text(&self, target: &ReplyTarget, text: &str) -> Result<(), DeliveryError> {
        self.replies.lock().expect("sink poisoned").push(Reply::Text {
            message_id: target.message_id.clone(),
            text: text.to_string(),
        });
        Ok(())
    }
}
