use std::collections::VecDeque;
use std::io::ErrorKind;
use std::sync::{Arc, Mutex};

use log::{trace, warn};
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::spawn as TokioSpawn;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputStream {
    Stdout,
    Stderr,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputLine {
    pub stream: OutputStream,
    pub line: String,
}

/// Bounded buffer of the most recent lines printed by the script.
///
/// Clones share the same buffer. Oldest lines are dropped once `capacity` is reached.
#[derive(Debug, Clone)]
pub struct OutputLog {
    capacity: usize,
    lines: Arc<Mutex<VecDeque<OutputLine>>>,
}

impl OutputLog {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            lines: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn push(&self, stream: OutputStream, line: impl Into<String>) {
        if let Ok(mut lines) = self.lines.lock() {
            if lines.len() == self.capacity {
                lines.pop_front();
            }
            lines.push_back(OutputLine {
                stream,
                line: line.into(),
            });
        }
    }

    pub fn snapshot(&self) -> Vec<OutputLine> {
        self.lines
            .lock()
            .map(|lines| lines.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Last `count` lines, optionally restricted to one stream, oldest first.
    pub fn tail(&self, stream: Option<OutputStream>, count: usize) -> Vec<String> {
        let Ok(lines) = self.lines.lock() else {
            return Vec::new();
        };

        let mut tail: Vec<String> = lines
            .iter()
            .rev()
            .filter(|l| stream.is_none_or(|s| l.stream == s))
            .take(count)
            .map(|l| l.line.clone())
            .collect();
        tail.reverse();
        tail
    }

    pub fn len(&self) -> usize {
        self.lines.lock().map(|lines| lines.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.clear();
        }
    }
}

/// Forward every line from a child pipe into the log until the pipe closes.
///
/// Bytes that are not valid UTF-8 are replaced, never treated as the end of
/// output. The pipe is drained until EOF so the script never blocks on a full
/// pipe or dies of SIGPIPE.
pub(crate) fn forward_lines<R>(
    reader: R,
    stream: OutputStream,
    log: OutputLog,
    pid: u32,
) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    TokioSpawn(async move {
        let mut reader = BufReader::new(reader);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => break,
                Ok(_) => {
                    let line = decode_line(&buf);
                    trace!("RealSense {stream:?} (PID {pid}): {line}");
                    log.push(stream, line);
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    // Any other read error leaves the pipe unusable.
                    warn!("Failed to read {stream:?} of PID {pid}: {e}");
                    break;
                }
            }
        }
    })
}

/// Strip the line terminator (`\n` or `\r\n`) and decode lossily.
pub(crate) fn decode_line(raw: &[u8]) -> String {
    let line = raw.strip_suffix(b"\n").unwrap_or(raw);
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    String::from_utf8_lossy(line).into_owned()
}
