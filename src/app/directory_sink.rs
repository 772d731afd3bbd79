//! Reply sink that saves attachments into a local directory.
//!
//! Stands in for a chat gateway when plucker runs from the command line:
//! attachments become files, text replies are printed.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use plucker_core::{Attachment, DeliveryError, ReplySink, ReplyTarget};
use tokio::fs::{self, File, OpenOptions};
use tracing::{debug, info};

/// Highest numeric suffix tried before giving up on a free filename.
const MAX_DUPLICATE_SUFFIX: usize = 1000;

pub(crate) struct DirectorySink {
    output_dir: PathBuf,
    echo: bool,
}

impl DirectorySink {
    /// Creates the sink, creating `output_dir` if needed.
    ///
    /// With `echo` set, every reply is also printed to stdout.
    pub(crate) async fn new(output_dir: &Path, echo: bool) -> std::io::Result<Self> {
        fs::create_dir_all(output_dir).await?;
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            echo,
        })
    }
}

#[async_trait]
impl ReplySink for DirectorySink {
    async fn send_attachment(
        &self,
        target: &ReplyTarget,
        mut attachment: Attachment,
    ) -> Result<(), DeliveryError> {
        let (path, mut dest) = create_unique(&self.output_dir, &attachment.file_name).await?;
        let copied = tokio::io::copy(&mut attachment.file, &mut dest).await?;
        dest.sync_all().await?;
        if copied != attachment.size_bytes {
            return Err(DeliveryError::rejected(format!(
                "short copy: {copied} of {} bytes",
                attachment.size_bytes
            )));
        }

        info!(path = %path.display(), bytes = copied, "saved attachment");
        if self.echo {
            println!("[{}] {}", target.message_id, path.display());
        }
        Ok(())
    }

    async fn send_text(&self, target: &ReplyTarget, text: &str) -> Result<(), DeliveryError> {
        debug!(message_id = %target.message_id, "text reply");
        if self.echo {
            println!("[{}] {text}", target.message_id);
        }
        Ok(())
    }
}

/// Creates `dir/name`, or `dir/stem_2.ext`, `dir/stem_3.ext`, ... if taken.
async fn create_unique(dir: &Path, name: &str) -> Result<(PathBuf, File), DeliveryError> {
    let (stem, ext) = match name.rfind('.') {
        Some(pos) if pos > 0 => (&name[..pos], &name[pos..]),
        _ => (name, ""),
    };

    for suffix in 1..=MAX_DUPLICATE_SUFFIX {
        let candidate = if suffix == 1 {
            dir.join(name)
        } else {
            dir.join(format!("{stem}_{suffix}{ext}"))
        };
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&candidate)
            .await
        {
            Ok(file) => return Ok((candidate, file)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {}
            Err(e) => return Err(e.into()),
        }
    }

    Err(DeliveryError::rejected(format!(
        "no free filename for {name} in {}",
        dir.display()
    )))
}
