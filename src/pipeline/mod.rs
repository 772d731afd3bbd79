//! Message pipeline: from inbound chat text to replies.
//!
//! For every message the [`Dispatcher`] extracts links, drops those outside
//! the allow-list, and runs the rest one by one through the download
//! orchestrator. Each outcome becomes exactly one reply on the
//! [`ReplySink`]: the attachment, or a short explanation of the failure.

mod dispatcher;
mod report;
mod sink;

pub use dispatcher::{Dispatcher, InboundMessage};
pub use report::{AttemptReport, AttemptStatus, MessageReport};
pub use sink::{Attachment, DeliveryError, ReplySink, ReplyTarget};
