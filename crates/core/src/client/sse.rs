//! Server-sent event decoding.
//!
//! A line-oriented decoder for `text/event-stream` bodies: `event:` and
//! `data:` fields, `:` comments, CRLF or LF line endings, a blank line ending
//! each frame. `id` and `retry` fields are ignored.

use std::fmt::Display;
use std::pin::Pin;
use tokio_stream::{Stream, StreamExt};
use tracing::debug;

/// Event name used when a frame has no `event:` field.
pub const DEFAULT_EVENT: &str = "message";

/// One dispatched server-sent event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseFrame {
    pub event: String,
    pub data: String,
}

/// Incremental decoder; feed it body chunks as they arrive.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    event: Option<String>,
    data: Vec<String>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume a chunk and return every frame it completes.
    ///
    /// Chunks may split lines, or UTF-8 sequences, anywhere.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<SseFrame> {
        self.buffer.extend_from_slice(chunk);

        let mut frames = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let raw: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&raw);
            let line = line.trim_end_matches('\n').trim_end_matches('\r');
            if let Some(frame) = self.process_line(line) {
                frames.push(frame);
            }
        }
        frames
    }

    /// End of input. A frame without its terminating blank line is dropped.
    ///
    /// Returns `true` if anything was discarded.
    pub fn finish(&mut self) -> bool {
        let discarded = !self.buffer.is_empty() || !self.data.is_empty() || self.event.is_some();
        self.buffer.clear();
        self.data.clear();
        self.event = None;
        discarded
    }

    fn process_line(&mut self, line: &str) -> Option<SseFrame> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        match field {
            "event" => self.event = Some(value.to_string()),
            "data" => self.data.push(value.to_string()),
            _ => {}
        }
        None
    }

    fn dispatch(&mut self) -> Option<SseFrame> {
        let event = self.event.take();
        if self.data.is_empty() {
            return None;
        }
        let data = std::mem::take(&mut self.data).join("\n");
        Some(SseFrame {
            event: event
                .filter(|e| !e.is_empty())
                .unwrap_or_else(|| DEFAULT_EVENT.to_string()),
            data,
        })
    }
}

/// Decode a byte stream into frames.
///
/// A transport error is yielded once and ends the stream.
pub fn frames<S, B, E>(body: S) -> Pin<Box<dyn Stream<Item = Result<SseFrame, String>> + Send>>
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Display + Send + 'static,
{
    let stream = async_stream::stream! {
        let mut decoder = SseDecoder::new();
        tokio::pin!(body);

        while let Some(chunk) = body.next().await {
            match chunk {
                Ok(bytes) => {
                    for frame in decoder.feed(bytes.as_ref()) {
                        yield Ok(frame);
                    }
                }
                Err(e) => {
                    yield Err(e.to_string());
                    return;
                }
            }
        }

        if decoder.finish() {
            debug!("Discarding incomplete frame at end of stream");
        }
    };

    Box::pin(stream)
}
