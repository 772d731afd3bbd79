//! Argument construction for the external fetch tool.

use std::ffi::OsString;
use std::path::Path;

use super::constants::OUTPUT_CONTAINER;

/// Builds the yt-dlp argument list for one fetch.
///
/// - `--max-filesize`: aborts the transfer once it would exceed the ceiling
/// - `--merge-output-format`: forces a single container so the extension is known up front
/// - `-o`: writes to the computed workspace path
///
/// `--max-filesize` is not enforced for every HLS/DASH stream (X links in
/// particular), which is why the dispatcher re-checks the size on disk.
pub(crate) fn fetch_args(source_url: &str, output_path: &Path, size_limit: &str) -> Vec<OsString> {
    vec![
        "--max-filesize".into(),
        size_limit.into(),
        "--merge-output-format".into(),
        OUTPUT_CONTAINER.into(),
        "-o".into(),
        output_path.as_os_str().to_owned(),
        source_url.into(),
    ]
}
