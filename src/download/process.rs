//! Child-process plumbing for the fetch tool: output capture and forced termination.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Child;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Background readers for a child's stdout and stderr.
///
/// Reading starts immediately so a chatty process never blocks on a full pipe
/// while the orchestrator is waiting on its exit.
pub(crate) struct OutputCapture {
    readers: Vec<(JoinHandle<()>, SharedBuffer)>,
}

/// Bytes read so far from one pipe; survives the reader task being aborted.
type SharedBuffer = Arc<Mutex<Vec<u8>>>;

impl OutputCapture {
    /// Takes the child's piped stdout/stderr and starts draining them.
    pub(crate) fn start(child: &mut Child) -> Self {
        let mut readers = Vec::with_capacity(2);
        if let Some(stdout) = child.stdout.take() {
            readers.push(spawn_reader(stdout));
        }
        if let Some(stderr) = child.stderr.take() {
            readers.push(spawn_reader(stderr));
        }
        Self { readers }
    }

    /// Collects what was captured as one string (stdout first, then stderr).
    ///
    /// A pipe still held open by a straggling helper process after `grace`
    /// stops being read; whatever arrived before that is kept.
    pub(crate) async fn finish(self, grace: Duration) -> String {
        let mut combined = Vec::new();
        for (mut reader, buffer) in self.readers {
            match timeout(grace, &mut reader).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => debug!(error = %e, "output reader task failed"),
                Err(_) => {
                    reader.abort();
                    debug!(grace_ms = grace.as_millis(), "output pipe still open, keeping partial output");
                }
            }
            let bytes = std::mem::take(&mut *buffer.lock().unwrap_or_else(PoisonError::into_inner));
            combined.extend_from_slice(&bytes);
        }
        String::from_utf8_lossy(&combined).into_owned()
    }
}

fn spawn_reader<R>(pipe: R) -> (JoinHandle<()>, SharedBuffer)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let buffer = SharedBuffer::default();
    let handle = tokio::spawn(read_into(pipe, Arc::clone(&buffer)));
    (handle, buffer)
}

async fn read_into<R: AsyncRead + Unpin>(mut pipe: R, buffer: SharedBuffer) {
    let mut chunk = [0u8; 8192];
    loop {
        match pipe.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => {
                buffer
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .extend_from_slice(&chunk[..n]);
            }
            Err(e) => {
                debug!(error = %e, "error reading child output");
                break;
            }
        }
    }
}

/// SIGKILLs the child (and, on Unix, its whole process group) and reaps it.
///
/// The child must have been spawned as the leader of its own process group
/// for the group kill to reach helpers such as ffmpeg.
pub(crate) async fn terminate(child: &mut Child) {
    kill_group(child.id());

    if let Err(e) = child.start_kill() {
        debug!(error = %e, "start_kill failed, child likely already exited");
    }
    match child.wait().await {
        Ok(status) => debug!(%status, "fetch process reaped"),
        Err(e) => warn!(error = %e, "failed to reap fetch process"),
    }
}

/// SIGKILLs the process group led by `leader`, if any member is still alive.
///
/// After a natural exit this takes down helpers that outlived the tool and
/// would otherwise keep its output pipes open. `leader` must be captured
/// before the child is reaped; tokio forgets the pid afterwards.
pub(crate) fn kill_group(leader: Option<u32>) {
    #[cfg(unix)]
    kill_process_group(leader);
    #[cfg(not(unix))]
    let _ = leader;
}

#[cfg(unix)]
fn kill_process_group(leader: Option<u32>) {
    use nix::errno::Errno;
    use nix::sys::signal::{Signal, killpg};
    use nix::unistd::Pid;

    let Some(pid) = leader.and_then(|id| i32::try_from(id).ok()) else {
        return;
    };
    match killpg(Pid::from_raw(pid), Signal::SIGKILL) {
        Ok(()) | Err(Errno::ESRCH) => {}
        Err(e) => warn!(pid, error = %e, "failed to kill fetch process group"),
    }
}
