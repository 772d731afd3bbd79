//! Message parsing: URL discovery and the domain allow-list.
//!
//! Extraction and filtering are deliberately separate steps. The extractor
//! reports every `https://` link in a message; the allow-list then decides
//! which of those are worth handing to the fetch tool.
//!
//! # Example
//!
//! ```
//! use plucker_core::parser::{AllowedDomains, extract_urls};
//!
//! let domains = AllowedDomains::default();
//! let accepted: Vec<_> = extract_urls("https://x.com/a/status/1 https://example.com/v")
//!     .into_iter()
//!     .filter(|url| domains.is_supported(url))
//!     .collect();
//! assert_eq!(accepted, vec!["https://x.com/a/status/1"]);
//! ```

mod domain;
mod url;

pub use domain::{AllowedDomains, DEFAULT_ALLOWED_DOMAINS};
pub use url::extract_urls;
