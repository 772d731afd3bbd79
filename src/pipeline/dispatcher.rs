//! Per-message sequencing of extraction, filtering, download and delivery.

use std::path::Path;
use std::sync::Arc;

use tokio::fs::File;
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument, warn};

use super::report::{AttemptReport, AttemptStatus, MessageReport};
use super::sink::{Attachment, ReplySink, ReplyTarget};
use crate::config::Config;
use crate::download::{DownloadFailure, DownloadOutcome, DownloadRequest, Orchestrator};
use crate::failure::reply_text;
use crate::parser::extract_urls;
use crate::workspace::{Workspace, WorkspaceError};

/// A chat message as delivered by the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// Message id; doubles as the correlation id for its downloads.
    pub id: String,
    /// Conversation the message was posted in.
    pub channel_id: String,
    /// Raw message text.
    pub content: String,
    /// True when the service itself authored the message.
    pub from_self: bool,
}

impl InboundMessage {
    /// Creates a message authored by someone other than the service.
    pub fn new(
        id: impl Into<String>,
        channel_id: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            channel_id: channel_id.into(),
            content: content.into(),
            from_self: false,
        }
    }

    /// Marks the message as authored by the service.
    #[must_use]
    pub fn authored_by_self(mut self) -> Self {
        self.from_self = true;
        self
    }

    fn reply_target(&self) -> ReplyTarget {
        ReplyTarget {
            channel_id: self.channel_id.clone(),
            message_id: self.id.clone(),
        }
    }
}

/// Runs every accepted link of a message through download and delivery.
///
/// Links are handled one after another. The workspace is cleared after each
/// attempt, and a mutex held for the whole message keeps concurrent callers
/// from sharing the directory mid-attempt.
pub struct Dispatcher {
    config: Config,
    workspace: Workspace,
    orchestrator: Orchestrator,
    sink: Arc<dyn ReplySink>,
    workspace_lock: Mutex<()>,
}

impl Dispatcher {
    /// Builds a dispatcher from configuration and a reply sink.
    pub fn new(config: Config, sink: Arc<dyn ReplySink>) -> Self {
        let workspace = Workspace::new(&config.workspace_dir);
        let orchestrator = Orchestrator::new(config.fetch_program.clone(), workspace.clone());
        Self {
            config,
            workspace,
            orchestrator,
            sink,
            workspace_lock: Mutex::new(()),
        }
    }

    /// The configuration this dispatcher runs with.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The workspace this dispatcher owns.
    #[must_use]
    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Creates the workspace and empties it. Call once before the first message.
    ///
    /// Leftovers that cannot be removed are logged; the first attempt's own
    /// clear will retry them.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError::Create`] when the directory cannot be created.
    pub async fn prepare(&self) -> Result<(), WorkspaceError> {
        let _guard = self.workspace_lock.lock().await;
        self.workspace.ensure().await?;
        if let Err(e) = self.workspace.clear().await {
            error!(error = %e, "failed to clear workspace at startup");
        }
        info!(dir = %self.workspace.root().display(), "workspace prepared");
        Ok(())
    }

    /// Handles one inbound message end to end.
    ///
    /// Failures local to one link are reported to the conversation and never
    /// stop its siblings. Only a workspace that cannot be cleared abandons the
    /// rest of the message.
    #[instrument(skip(self, message), fields(message_id = %message.id))]
    pub async fn handle_message(&self, message: &InboundMessage) -> MessageReport {
        let mut report = MessageReport::new(&message.id);
        if message.from_self {
            debug!("ignoring own message");
            return report;
        }

        let urls = extract_urls(&message.content);
        if urls.is_empty() {
            return report;
        }

        let _guard = self.workspace_lock.lock().await;
        let target = message.reply_target();

        for url in urls {
            if let Err(kind) = self.config.allowed_domains.check(&url) {
                debug!(url = %url, ?kind, "skipping link");
                report.skipped += 1;
                continue;
            }

            info!(url = %url, "found supported URL");
            let status = self.attempt(&url, &message.id, &target).await;
            report.attempts.push(AttemptReport { url, status });

            if let Err(e) = self.workspace.clear().await {
                error!(error = %e, "failed to clear workspace, abandoning remaining links");
                report.aborted = true;
                break;
            }
            debug!("workspace cleared after attempt");
        }

        info!(
            delivered = report.delivered(),
            failed = report.failed(),
            skipped = report.skipped,
            "message handled"
        );
        report
    }

    async fn attempt(&self, url: &str, correlation_id: &str, target: &ReplyTarget) -> AttemptStatus {
        let request = DownloadRequest::new(
            url,
            correlation_id,
            self.config.max_file_size_mb,
            self.config.download_timeout,
        );

        let result = match self.orchestrator.download(&request).await {
            DownloadOutcome::Artifact { path } => self.deliver(&path, &request, target).await,
            DownloadOutcome::Failure(failure) => Err(failure),
        };

        match result {
            Ok(bytes) => AttemptStatus::Delivered { bytes },
            Err(failure) => {
                self.report_failure(target, &failure).await;
                AttemptStatus::failed(&failure)
            }
        }
    }

    /// Opens, re-checks and uploads the artifact; returns its size.
    async fn deliver(
        &self,
        path: &Path,
        request: &DownloadRequest,
        target: &ReplyTarget,
    ) -> Result<u64, DownloadFailure> {
        let file = File::open(path).await.map_err(|e| {
            warn!(path = %path.display(), error = %e, "failed to open downloaded file");
            DownloadFailure::artifact_io(path, &e)
        })?;
        let size_bytes = file
            .metadata()
            .await
            .map_err(|e| {
                warn!(path = %path.display(), error = %e, "failed to stat downloaded file");
                DownloadFailure::artifact_io(path, &e)
            })?
            .len();

        // --max-filesize is not enforced for every streaming format.
        let ceiling = self.config.max_file_size_bytes();
        if size_bytes > ceiling {
            warn!(size_bytes, ceiling, "artifact over size ceiling, not sending");
            return Err(DownloadFailure::size_exceeded(request.size_limit_arg()));
        }

        let file_name = path
            .file_name()
            .map_or_else(|| request.correlation_id.clone(), |name| name.to_string_lossy().into_owned());
        let attachment = Attachment {
            file_name,
            file,
            size_bytes,
        };

        self.sink
            .send_attachment(target, attachment)
            .await
            .map_err(|e| {
                warn!(error = %e, "failed to deliver attachment");
                DownloadFailure::delivery(e.to_string())
            })?;

        info!(size_bytes, "attachment delivered");
        Ok(size_bytes)
    }

    async fn report_failure(&self, target: &ReplyTarget, failure: &DownloadFailure) {
        if let Err(e) = self.sink.send_text(target, &reply_text(failure)).await {
            warn!(error = %e, kind = ?failure.kind(), "failed to send failure reply");
        }
    }
}
