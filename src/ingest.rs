//! Ingestion: feeding the line store from a file, a pipe, or in-memory text.
//!
//! A [`LineSource`] delivers lines strictly in arrival order and signals
//! end-of-stream by returning `None`. The [`ingest`] task appends everything
//! to the shared [`LineStore`] and marks it complete, while the UI keeps
//! reading concurrently through the store's range locks.

use crate::error::Result;
use crate::store::LineStore;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt};

const READ_CHUNK: usize = 16 * 1024;

/// Sequential source of lines with an end-of-stream signal.
#[async_trait]
pub trait LineSource: Send {
    /// The next line in arrival order, or `None` at end of stream.
    async fn next_line(&mut self) -> Result<Option<String>>;
}

/// Line source over any async byte stream (file, stdin pipe).
///
/// Reads fixed-size chunks and splits them on newlines with `memchr`; a
/// trailing fragment without a newline is carried over to the next chunk and
/// flushed as a final line at end of stream.
pub struct StreamLineSource<R> {
    reader: R,
    pending: Vec<u8>,
    eof: bool,
}

impl<R: AsyncRead + Unpin + Send> StreamLineSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            pending: Vec::new(),
            eof: false,
        }
    }
}

#[async_trait]
impl<R: AsyncRead + Unpin + Send> LineSource for StreamLineSource<R> {
    async fn next_line(&mut self) -> Result<Option<String>> {
        loop {
            if let Some(newline) = memchr::memchr(b'\n', &self.pending) {
                let mut line: Vec<u8> = self.pending.drain(..=newline).collect();
                line.pop();
                if line.last() == Some(&b'\r') {
                    line.pop();
                }
                return Ok(Some(String::from_utf8_lossy(&line).into_owned()));
            }

            if self.eof {
                if self.pending.is_empty() {
                    return Ok(None);
                }
                let line = String::from_utf8_lossy(&self.pending).into_owned();
                self.pending.clear();
                return Ok(Some(line));
            }

            let mut chunk = [0u8; READ_CHUNK];
            let read = self.reader.read(&mut chunk).await?;
            if read == 0 {
                self.eof = true;
            } else {
                self.pending.extend_from_slice(&chunk[..read]);
            }
        }
    }
}

/// In-memory line source, mainly for tests and `--help` style demos.
pub struct TextSource {
    lines: VecDeque<String>,
}

impl TextSource {
    pub fn new(text: &str) -> Self {
        Self {
            lines: text.lines().map(str::to_owned).collect(),
        }
    }
}

#[async_trait]
impl LineSource for TextSource {
    async fn next_line(&mut self) -> Result<Option<String>> {
        Ok(self.lines.pop_front())
    }
}

/// Open a file as a line source.
pub async fn open_path(path: impl AsRef<Path>) -> Result<StreamLineSource<tokio::fs::File>> {
    let path = path.as_ref();
    let file = tokio::fs::File::open(path)
        .await
        .map_err(|err| crate::error::PagerError::io(format!("open {}", path.display()), err))?;
    Ok(StreamLineSource::new(file))
}

/// Read lines from standard input (piped command output).
pub fn from_stdin() -> StreamLineSource<tokio::io::Stdin> {
    StreamLineSource::new(tokio::io::stdin())
}

/// Drain a source into the store, then mark the store complete.
///
/// This is the single writer of the process; everything else only reads.
pub async fn ingest(mut source: Box<dyn LineSource>, store: Arc<LineStore>) -> Result<()> {
    while let Some(line) = source.next_line().await? {
        store.append(line);
    }
    store.mark_complete();
    log::debug!("ingestion complete: {} lines", store.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stream_source_splits_on_newlines() {
        let mut source = StreamLineSource::new(&b"first\nsecond\r\nthird"[..]);
        assert_eq!(source.next_line().await.unwrap().as_deref(), Some("first"));
        assert_eq!(source.next_line().await.unwrap().as_deref(), Some("second"));
        assert_eq!(source.next_line().await.unwrap().as_deref(), Some("third"));
        assert_eq!(source.next_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn stream_source_handles_empty_input() {
        let mut source = StreamLineSource::new(&b""[..]);
        assert_eq!(source.next_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn stream_source_keeps_empty_lines() {
        let mut source = StreamLineSource::new(&b"a\n\nb\n"[..]);
        assert_eq!(source.next_line().await.unwrap().as_deref(), Some("a"));
        assert_eq!(source.next_line().await.unwrap().as_deref(), Some(""));
        assert_eq!(source.next_line().await.unwrap().as_deref(), Some("b"));
        assert_eq!(source.next_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn ingest_fills_store_in_arrival_order() {
        let store = Arc::new(LineStore::new());
        let source = Box::new(TextSource::new("one\ntwo\nthree"));

        ingest(source, Arc::clone(&store)).await.unwrap();

        assert_eq!(store.len(), 3);
        assert!(store.is_complete());
        let lines = store.get(0..3).unwrap();
        let got: Vec<&str> = lines.iter().map(|l| l.line.raw()).collect();
        assert_eq!(got, vec!["one", "two", "three"]);
    }

    #[tokio::test]
    async fn ingest_from_file() {
        let file = tempfile::NamedTempFile::new().expect("create temp file");
        std::fs::write(file.path(), "log line 1\nlog line 2\n").expect("write contents");

        let store = Arc::new(LineStore::new());
        let source = Box::new(open_path(file.path()).await.unwrap());
        ingest(source, Arc::clone(&store)).await.unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(
            store.get(1..2).unwrap()[0].line.raw(),
            "log line 2"
        );
    }
}
