//! Draining of engine output.
//!
//! The engine's stdout and stderr are merged into one line stream by a single
//! reader task. Lines cross a bounded channel to the log sink task, so a slow
//! sink applies backpressure to the reader instead of buffering without limit.
//! Both tasks end when the engine closes its output.

use async_trait::async_trait;
use futures::stream::{self, Stream, StreamExt};
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Tracing target engine output is forwarded to.
pub const ENGINE_LOG_TARGET: &str = "wikilite::engine";

/// Destination of engine output lines.
#[async_trait]
pub trait LogSink: Send + 'static {
    /// Receive one line, without its trailing newline.
    async fn write_line(&mut self, line: &str);

    /// Called once after the last line.
    async fn close(&mut self) {}
}

/// Forwards lines to `tracing`.
#[derive(Debug, Default)]
pub struct TracingSink;

#[async_trait]
impl LogSink for TracingSink {
    async fn write_line(&mut self, line: &str) {
        debug!(target: ENGINE_LOG_TARGET, "{}", line);
    }
}

/// Forwards lines to `tracing` and appends them to a file.
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    file: Option<tokio::fs::File>,
}

impl FileSink {
    /// Open `path` for appending, creating parent directories as needed.
    ///
    /// A file that cannot be opened degrades the sink to tracing only.
    pub async fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if let Err(e) = tokio::fs::create_dir_all(parent).await {
                warn!("Failed to create log directory {}: {}", parent.display(), e);
            }
        }

        let file = match OpenOptions::new().create(true).append(true).open(&path).await {
            Ok(file) => Some(file),
            Err(e) => {
                warn!("Failed to open engine log {}: {}", path.display(), e);
                None
            }
        };
        Self { path, file }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl LogSink for FileSink {
    async fn write_line(&mut self, line: &str) {
        debug!(target: ENGINE_LOG_TARGET, "{}", line);
        if let Some(file) = self.file.as_mut() {
            let written = async {
                file.write_all(line.as_bytes()).await?;
                file.write_all(b"\n").await
            }
            .await;
            if let Err(e) = written {
                warn!("Engine log {} is no longer writable: {}", self.path.display(), e);
                self.file = None;
            }
        }
    }

    async fn close(&mut self) {
        if let Some(file) = self.file.as_mut() {
            if let Err(e) = file.flush().await {
                warn!("Failed to flush engine log {}: {}", self.path.display(), e);
            }
        }
    }
}

/// Read `reader` line by line. Invalid UTF-8 is replaced rather than dropped.
fn lines<R>(reader: R) -> impl Stream<Item = String>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    stream::unfold(BufReader::new(reader), |mut reader| async move {
        let mut buf = Vec::new();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => None,
            Ok(_) => {
                while matches!(buf.last(), Some(b'\n' | b'\r')) {
                    buf.pop();
                }
                Some((String::from_utf8_lossy(&buf).into_owned(), reader))
            }
            Err(e) => {
                warn!("Engine output closed with error: {}", e);
                None
            }
        }
    })
}

/// Handles of the two tasks draining one process.
#[derive(Debug)]
pub struct OutputDrain {
    pub reader: JoinHandle<u64>,
    pub sink: JoinHandle<()>,
}

/// Start draining `stdout` and `stderr` into `sink`.
///
/// Returns immediately; the reader task yields the number of lines read.
pub fn drain<O, E>(
    stdout: Option<O>,
    stderr: Option<E>,
    mut sink: Box<dyn LogSink>,
    capacity: usize,
) -> OutputDrain
where
    O: AsyncRead + Unpin + Send + 'static,
    E: AsyncRead + Unpin + Send + 'static,
{
    let (tx, mut rx) = mpsc::channel::<String>(capacity.max(1));

    let reader = tokio::spawn(async move {
        let stdout = stdout
            .map(|r| lines(r).boxed())
            .unwrap_or_else(|| stream::empty::<String>().boxed());
        let stderr = stderr
            .map(|r| lines(r).boxed())
            .unwrap_or_else(|| stream::empty::<String>().boxed());
        let mut merged = stream::select(stdout, stderr);

        let mut count = 0u64;
        while let Some(line) = merged.next().await {
            count += 1;
            if tx.send(line).await.is_err() {
                break;
            }
        }
        debug!("Engine output closed after {} lines", count);
        count
    });

    let sink = tokio::spawn(async move {
        while let Some(line) = rx.recv().await {
            sink.write_line(&line).await;
        }
        sink.close().await;
    });

    OutputDrain { reader, sink }
}
