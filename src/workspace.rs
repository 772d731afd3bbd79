//! Ephemeral scratch directory for in-flight artifacts.
//!
//! The directory itself persists for the lifetime of the service; its
//! contents never outlive one download attempt. The dispatcher clears it once
//! at startup and again after every attempt, success or failure, so a stale
//! artifact can never be delivered for the wrong link.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::fs;
use tracing::{debug, instrument};

/// Default workspace location, relative to the working directory.
pub const DEFAULT_WORKSPACE_DIR: &str = "videos";

/// Errors produced while managing the workspace.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    /// The directory could not be created.
    #[error("failed to create workspace {path}: {source}")]
    Create {
        /// Workspace root.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// An entry could not be listed or removed.
    #[error("failed to clear workspace entry {path}: {source}")]
    Clear {
        /// Entry (or root) that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl WorkspaceError {
    fn create(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Create {
            path: path.into(),
            source,
        }
    }

    fn clear(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Clear {
            path: path.into(),
            source,
        }
    }
}

/// Handle to the scratch directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    root: PathBuf,
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new(DEFAULT_WORKSPACE_DIR)
    }
}

impl Workspace {
    /// Creates a handle; touches nothing on disk.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The workspace directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where the artifact for `correlation_id` is written.
    ///
    /// The id is reduced to `[A-Za-z0-9_-]` so it can never escape the workspace.
    #[must_use]
    pub fn artifact_path(&self, correlation_id: &str, extension: &str) -> PathBuf {
        self.root
            .join(format!("{}.{extension}", sanitize_file_stem(correlation_id)))
    }

    /// Creates the directory and any missing parents.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError::Create`] when the directory cannot be created.
    #[instrument(skip(self), fields(dir = %self.root.display()))]
    pub async fn ensure(&self) -> Result<(), WorkspaceError> {
        fs::create_dir_all(&self.root)
            .await
            .map_err(|e| WorkspaceError::create(&self.root, e))?;
        debug!("workspace ready");
        Ok(())
    }

    /// Removes every entry inside the directory, keeping the directory.
    ///
    /// A missing directory counts as already clear.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError::Clear`] on any other I/O failure.
    #[instrument(skip(self), fields(dir = %self.root.display()))]
    pub async fn clear(&self) -> Result<(), WorkspaceError> {
        let mut entries = match fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("workspace missing, nothing to clear");
                return Ok(());
            }
            Err(e) => return Err(WorkspaceError::clear(&self.root, e)),
        };

        let mut removed = 0usize;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| WorkspaceError::clear(&self.root, e))?
        {
            let path = entry.path();
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| WorkspaceError::clear(&path, e))?;
            // file_type() does not follow symlinks, so a link to a directory is unlinked, not traversed.
            let result = if file_type.is_dir() {
                fs::remove_dir_all(&path).await
            } else {
                fs::remove_file(&path).await
            };
            match result {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(WorkspaceError::clear(&path, e)),
            }
        }

        debug!(removed, "workspace cleared");
        Ok(())
    }

    /// True when the directory is missing or has no entries.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError::Clear`] when the directory cannot be listed.
    pub async fn is_empty(&self) -> Result<bool, WorkspaceError> {
        let mut entries = match fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(true),
            Err(e) => return Err(WorkspaceError::clear(&self.root, e)),
        };
        let first = entries
            .next_entry()
            .await
            .map_err(|e| WorkspaceError::clear(&self.root, e))?;
        Ok(first.is_none())
    }
}

fn sanitize_file_stem(id: &str) -> String {
    let stem: String = id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if stem.is_empty() {
        "artifact".to_string()
    } else {
        stem
    }
}
