//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

/// Fetch the short-form videos linked in chat messages.
///
/// Each positional argument (or each stdin line) is treated as one chat
/// message. Supported links are fetched with yt-dlp and saved into the output
/// directory; failures are printed as the reply the chat would have received.
#[derive(Parser, Debug)]
#[command(name = "plucker")]
#[command(author, version, about)]
pub struct Args {
    /// Messages to process (reads stdin, one message per line, when omitted)
    pub messages: Vec<String>,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Directory delivered videos are written to
    #[arg(short = 'o', long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Size ceiling in megabytes (overrides MAX_FILE_SIZE_MB)
    #[arg(long)]
    pub max_size_mb: Option<f64>,

    /// Per-link download timeout in seconds (overrides DOWNLOAD_TIMEOUT_SECONDS)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..=plucker_core::download::constants::MAX_DOWNLOAD_TIMEOUT_SECS))]
    pub timeout_secs: Option<u64>,

    /// Scratch directory for in-flight downloads (overrides PLUCKER_WORKSPACE)
    #[arg(long)]
    pub workspace: Option<PathBuf>,

    /// Fetch program to run (overrides YT_DLP_PATH)
    #[arg(long)]
    pub fetch_program: Option<String>,

    /// Channel id attached to every message
    #[arg(long, default_value = "cli")]
    pub channel_id: String,

    /// Prefix for generated message ids (`<prefix>-1`, `<prefix>-2`, ...)
    #[arg(long, default_value = "msg")]
    pub message_id_prefix: String,

    /// Print one JSON report per message instead of plain replies
    #[arg(long)]
    pub json: bool,
}
