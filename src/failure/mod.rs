//! User-facing reply text for classified failures.

use crate::download::{DownloadFailure, ErrorKind};

/// Prefix on replies for failures that happened while fetching.
const FETCH_FAILURE_PREFIX: &str = "Sorry, I couldn't download this video, here's why:";

/// Reply shown when the artifact exists but cannot be read back.
const ARTIFACT_IO_REPLY: &str = "Error: Could not open downloaded file.";

/// Reply shown when the chat platform refuses the attachment.
const DELIVERY_REPLY: &str = "Error: Could not send file.";

/// Text sent back to the originating conversation for `failure`.
///
/// Fetch-side failures explain themselves; local I/O and delivery problems get
/// a fixed short line so paths and platform error bodies stay in the logs.
#[must_use]
pub fn reply_text(failure: &DownloadFailure) -> String {
    match failure.kind() {
        ErrorKind::ArtifactIo => ARTIFACT_IO_REPLY.to_string(),
        ErrorKind::DeliveryFailure => DELIVERY_REPLY.to_string(),
        _ => format!("{FETCH_FAILURE_PREFIX} {failure}"),
    }
}
