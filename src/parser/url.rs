//! URL extraction from chat message text.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{error, trace};

/// Pattern for HTTPS links embedded in free text.
///
/// Only `https://` is matched; plain `http://` and relative links never are.
/// The host needs at least one dot, and the tail must end on a character that
/// cannot be sentence punctuation so `see https://x.com/a.` yields `https://x.com/a`.
const URL_PATTERN_SOURCE: &str =
    r"https://[A-Za-z0-9_-]+(?:\.[A-Za-z0-9_-]+)+[A-Za-z0-9_.,@?^=%&:/~+#-]*[A-Za-z0-9_@?^=%&/~+#-]";

static URL_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| compile_pattern(URL_PATTERN_SOURCE));

fn compile_pattern(source: &str) -> Option<Regex> {
    match Regex::new(source) {
        Ok(re) => Some(re),
        Err(e) => {
            // A broken static pattern is a programming defect, not a user error.
            error!(pattern = source, error = %e, "URL pattern failed to compile");
            None
        }
    }
}

/// Extracts every `https://` URL from `input`, in order of first appearance.
///
/// Duplicates are kept verbatim; callers decide whether repeated links matter.
/// Returns an empty vector when nothing matches.
///
/// # Examples
///
/// ```
/// use plucker_core::parser::extract_urls;
///
/// let urls = extract_urls("check this out https://www.tiktok.com/@x/video/1");
/// assert_eq!(urls, vec!["https://www.tiktok.com/@x/video/1"]);
/// ```
#[tracing::instrument(skip(input), fields(input_len = input.len()))]
#[must_use]
pub fn extract_urls(input: &str) -> Vec<String> {
    let Some(pattern) = URL_PATTERN.as_ref() else {
        return Vec::new();
    };
    find_all(pattern, input)
}

fn find_all(pattern: &Regex, input: &str) -> Vec<String> {
    pattern
        .find_iter(input)
        .map(|m| {
            trace!(url = m.as_str(), "found URL candidate");
            m.as_str().to_string()
        })
        .collect()
}
