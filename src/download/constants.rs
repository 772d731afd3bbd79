//! Constants for the download module (fetch tool flags, timing, markers).

use std::time::Duration;

/// Default fetch program, resolved through `PATH`.
pub const DEFAULT_FETCH_PROGRAM: &str = "yt-dlp";

/// Default size ceiling in megabytes. Matches the free-tier attachment limit of common chat platforms.
pub const DEFAULT_MAX_FILE_SIZE_MB: f64 = 10.0;

/// Default wall-clock budget for one fetch (15 seconds).
pub const DEFAULT_DOWNLOAD_TIMEOUT_SECS: u64 = 15;

/// Longest accepted per-link budget (one hour).
pub const MAX_DOWNLOAD_TIMEOUT_SECS: u64 = 3600;

/// Container every artifact is merged into, and therefore its file extension.
pub const OUTPUT_CONTAINER: &str = "mp4";

/// Text yt-dlp prints when `--max-filesize` aborts a transfer.
///
/// yt-dlp exits 0 in that case, so the text is the only reliable signal.
pub const SIZE_CEILING_MARKER: &str = "File is larger than max-filesize";

/// Period of the time-remaining heartbeat.
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(1);

/// Every heartbeat is logged once this many seconds (or fewer) remain.
pub const HEARTBEAT_FINAL_STRETCH_SECS: u64 = 5;

/// Outside the final stretch, only every Nth second is logged.
pub const HEARTBEAT_LOG_EVERY_SECS: u64 = 10;

/// How long to wait for output pipes to close after a kill before giving up on them.
pub const OUTPUT_DRAIN_GRACE: Duration = Duration::from_secs(1);

/// Bytes in one megabyte as yt-dlp counts them for `--max-filesize <N>M`.
pub const BYTES_PER_MB: f64 = 1024.0 * 1024.0;
