use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};

use futures::stream::BoxStream;
use futures::StreamExt;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use crate::domain::DownloadEvent;
use crate::utils::command;

const READ_CHUNK: usize = 8 * 1024;

/// Exit code reported when the child ended without one (killed by a signal).
pub const NO_EXIT_CODE: i32 = -1;

#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("could not start {}: {source}", program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Spawns a child process without a shell and relays its output.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }

    /// Starts `program` with `args` passed as discrete arguments. Stdout and
    /// stderr chunks are forwarded as `Progress` in arrival order, followed
    /// by one `Finished`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self, program: &Path, args: &[OsString]) -> Result<ProcessHandle, RunnerError> {
        let mut child = command(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| {
                log::error!("Failed to spawn {}: {}", program.display(), source);
                RunnerError::Spawn {
                    program: program.to_path_buf(),
                    source,
                }
            })?;

        let pid = child.id();
        log::info!("Started {} (pid {:?})", program.display(), pid);

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let (tx, rx) = unbounded_channel();
        let program = program.to_path_buf();

        tokio::spawn(async move {
            let (_, _, status) = tokio::join!(
                forward_output(stdout, tx.clone()),
                forward_output(stderr, tx.clone()),
                child.wait(),
            );
            let finished = match status {
                Ok(status) => finished_event(status),
                Err(e) => {
                    log::error!("Waiting on {} failed: {}", program.display(), e);
                    DownloadEvent::Finished {
                        success: false,
                        code: NO_EXIT_CODE,
                    }
                }
            };
            log::info!("{} exited: {:?}", program.display(), finished);
            let _ = tx.send(finished);
        });

        Ok(ProcessHandle { pid, events: rx })
    }
}

fn finished_event(status: ExitStatus) -> DownloadEvent {
    let code = status.code().unwrap_or(NO_EXIT_CODE);
    DownloadEvent::Finished {
        success: code == 0,
        code,
    }
}

async fn forward_output<R>(reader: Option<R>, tx: UnboundedSender<DownloadEvent>)
where
    R: AsyncRead + Unpin,
{
    let Some(mut reader) = reader else {
        return;
    };
    let mut buf = vec![0u8; READ_CHUNK];
    loop {
        match reader.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => {
                let text = String::from_utf8_lossy(&buf[..n]).into_owned();
                // Keep draining after the receiver is gone so the child never
                // blocks on a full pipe.
                let _ = tx.send(DownloadEvent::Progress { text });
            }
            Err(e) => {
                log::warn!("Reading child output failed: {}", e);
                break;
            }
        }
    }
}

/// One running child process. Owns its event channel until `Finished`.
#[derive(Debug)]
pub struct ProcessHandle {
    pid: Option<u32>,
    events: UnboundedReceiver<DownloadEvent>,
}

impl ProcessHandle {
    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// Next event, or `None` once `Finished` has been delivered.
    pub async fn next_event(&mut self) -> Option<DownloadEvent> {
        self.events.recv().await
    }

    pub fn into_stream(self) -> BoxStream<'static, DownloadEvent> {
        futures::stream::unfold(self, |mut handle| async move {
            let event = handle.next_event().await?;
            Some((event, handle))
        })
        .boxed()
    }
}
