//! Runtime configuration, assembled once at startup and passed by value.
//!
//! Values come from environment variables (optionally seeded from a `.env`
//! file by the binary). A malformed value never stops the service: it is
//! logged and the default is used instead.
//!
//! | Variable | Default | Meaning |
//! |---|---|---|
//! | `MAX_FILE_SIZE_MB` | `10` | size ceiling, integer or decimal |
//! | `DOWNLOAD_TIMEOUT_SECONDS` | `15` | per-link wall-clock budget, 1 to 3600 |
//! | `YT_DLP_PATH` | `yt-dlp` | fetch program |
//! | `PLUCKER_WORKSPACE` | `videos` | scratch directory |

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use tracing::{info, warn};

use crate::download::constants::{
    DEFAULT_DOWNLOAD_TIMEOUT_SECS, DEFAULT_FETCH_PROGRAM, DEFAULT_MAX_FILE_SIZE_MB,
    MAX_DOWNLOAD_TIMEOUT_SECS,
};
use crate::parser::AllowedDomains;
use crate::workspace::DEFAULT_WORKSPACE_DIR;

/// Environment variable holding the size ceiling in megabytes.
pub const ENV_MAX_FILE_SIZE_MB: &str = "MAX_FILE_SIZE_MB";
/// Environment variable holding the per-link timeout in seconds.
pub const ENV_DOWNLOAD_TIMEOUT_SECONDS: &str = "DOWNLOAD_TIMEOUT_SECONDS";
/// Environment variable overriding the fetch program.
pub const ENV_FETCH_PROGRAM: &str = "YT_DLP_PATH";
/// Environment variable overriding the workspace directory.
pub const ENV_WORKSPACE: &str = "PLUCKER_WORKSPACE";

/// Invalid explicit configuration (e.g. from CLI flags).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Size ceiling must be a positive, finite number.
    #[error("invalid max file size {value}MB: must be a positive number")]
    InvalidMaxFileSize {
        /// Rejected value.
        value: f64,
    },

    /// Timeout must be between one second and one hour.
    #[error(
        "invalid download timeout {value}s: must be between 1 and {max} seconds",
        max = MAX_DOWNLOAD_TIMEOUT_SECS
    )]
    InvalidTimeout {
        /// Rejected value in seconds.
        value: u64,
    },

    /// Fetch program must not be empty.
    #[error("fetch program must not be empty")]
    EmptyFetchProgram,
}

/// Everything the pipeline needs to know, fixed for the life of the process.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Size ceiling in megabytes (MiB, as yt-dlp counts them).
    pub max_file_size_mb: f64,
    /// Wall-clock budget for one fetch.
    pub download_timeout: Duration,
    /// Fetch program name or path.
    pub fetch_program: String,
    /// Scratch directory for in-flight artifacts.
    pub workspace_dir: PathBuf,
    /// Hosts links are accepted from.
    pub allowed_domains: AllowedDomains,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_file_size_mb: DEFAULT_MAX_FILE_SIZE_MB,
            download_timeout: Duration::from_secs(DEFAULT_DOWNLOAD_TIMEOUT_SECS),
            fetch_program: DEFAULT_FETCH_PROGRAM.to_string(),
            workspace_dir: PathBuf::from(DEFAULT_WORKSPACE_DIR),
            allowed_domains: AllowedDomains::default(),
        }
    }
}

impl Config {
    /// Reads configuration from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`, falling back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let max_file_size_mb = match lookup(ENV_MAX_FILE_SIZE_MB) {
            None => defaults.max_file_size_mb,
            Some(raw) => match parse_max_file_size(&raw) {
                Some(value) => {
                    info!(max_file_size_mb = value, "using max file size from environment");
                    value
                }
                None => {
                    warn!(
                        value = %raw,
                        default = defaults.max_file_size_mb,
                        "invalid {ENV_MAX_FILE_SIZE_MB}, using default"
                    );
                    defaults.max_file_size_mb
                }
            },
        };

        let download_timeout = match lookup(ENV_DOWNLOAD_TIMEOUT_SECONDS) {
            None => defaults.download_timeout,
            Some(raw) => match parse_timeout_secs(&raw) {
                Some(secs) => {
                    info!(timeout_secs = secs, "using download timeout from environment");
                    Duration::from_secs(secs)
                }
                None => {
                    warn!(
                        value = %raw,
                        default = DEFAULT_DOWNLOAD_TIMEOUT_SECS,
                        "invalid {ENV_DOWNLOAD_TIMEOUT_SECONDS}, using default"
                    );
                    defaults.download_timeout
                }
            },
        };

        let fetch_program = lookup(ENV_FETCH_PROGRAM)
            .map(|raw| raw.trim().to_string())
            .filter(|program| !program.is_empty())
            .unwrap_or(defaults.fetch_program);

        let workspace_dir = lookup(ENV_WORKSPACE)
            .filter(|dir| !dir.trim().is_empty())
            .map_or(defaults.workspace_dir, PathBuf::from);

        Self {
            max_file_size_mb,
            download_timeout,
            fetch_program,
            workspace_dir,
            allowed_domains: defaults.allowed_domains,
        }
    }

    /// Checks values that bypassed environment parsing (e.g. CLI overrides).
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_valid_size(self.max_file_size_mb) {
            return Err(ConfigError::InvalidMaxFileSize {
                value: self.max_file_size_mb,
            });
        }
        if self.download_timeout < Duration::from_secs(1)
            || self.download_timeout > Duration::from_secs(MAX_DOWNLOAD_TIMEOUT_SECS)
        {
            return Err(ConfigError::InvalidTimeout {
                value: self.download_timeout.as_secs(),
            });
        }
        if self.fetch_program.trim().is_empty() {
            return Err(ConfigError::EmptyFetchProgram);
        }
        Ok(())
    }

    /// The size ceiling in bytes.
    #[must_use]
    pub fn max_file_size_bytes(&self) -> u64 {
        mb_to_bytes(self.max_file_size_mb)
    }
}

/// Converts a megabyte ceiling to bytes, rounding down.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub(crate) fn mb_to_bytes(mb: f64) -> u64 {
    // Validated ceilings are positive and finite; `as` saturates on anything else.
    (mb * crate::download::constants::BYTES_PER_MB) as u64
}

fn is_valid_size(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

fn parse_max_file_size(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| is_valid_size(*value))
}

fn parse_timeout_secs(raw: &str) -> Option<u64> {
    raw.trim()
        .parse::<u64>()
        .ok()
        .filter(|secs| (1..=MAX_DOWNLOAD_TIMEOUT_SECS).contains(secs))
}
