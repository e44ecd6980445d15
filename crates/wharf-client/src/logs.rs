//! Multiplexed container log decoding.
//!
//! The daemon multiplexes attach/exec output as framed records:
//! `[stream_type (1 byte)][padding (3 bytes)][size (4 bytes BE)][data]`,
//! where stream type 0 = stdin, 1 = stdout, 2 = stderr. Frames are split
//! arbitrarily across chunk boundaries and must be reassembled in order.
//!
//! A TTY-mode container writes raw bytes with no framing; leftover bytes
//! that cannot be a frame are surfaced once as a raw message when the
//! stream ends.

use std::borrow::Cow;
use std::io;

use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, StreamExt};

use crate::pump::MessageSource;

/// Size of the multiplexing header preceding each frame.
const FRAME_HEADER_LEN: usize = 8;

/// Which daemon stream a log message came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogStreamKind {
    /// Container stdin (echoed back by the daemon).
    Stdin,
    /// Container stdout.
    Stdout,
    /// Container stderr.
    Stderr,
    /// Unframed output (TTY mode or trailing unparsable bytes).
    Raw,
}

impl LogStreamKind {
    const fn from_tag(tag: u8) -> Self {
        match tag {
            0 => Self::Stdin,
            1 => Self::Stdout,
            _ => Self::Stderr,
        }
    }
}

/// One line/frame of container or exec output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogMessage {
    /// Originating stream.
    pub kind: LogStreamKind,
    /// Raw frame payload.
    pub content: Bytes,
}

impl LogMessage {
    /// Frame payload as text, lossily decoded.
    #[must_use]
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.content)
    }
}

/// Reads one multiplexed log frame at a time from a chunked byte stream.
pub struct LogMessageStream<S> {
    chunks: S,
    buf: Vec<u8>,
    eof: bool,
    drained: bool,
}

impl<S> LogMessageStream<S>
where
    S: Stream<Item = io::Result<Bytes>> + Unpin + Send,
{
    /// Creates a log reader over a chunk stream.
    pub fn new(chunks: S) -> Self {
        Self {
            chunks,
            buf: Vec::new(),
            eof: false,
            drained: false,
        }
    }

    /// Returns the next log frame, or `None` once the stream is exhausted.
    ///
    /// # Errors
    ///
    /// Returns an error only when the underlying byte stream fails.
    pub async fn next(&mut self) -> io::Result<Option<LogMessage>> {
        loop {
            if let Some((kind, content, frame_len)) = extract_frame(&self.buf) {
                let message = LogMessage { kind, content };
                self.buf.drain(..frame_len);
                return Ok(Some(message));
            }

            if self.eof {
                return Ok(self.drain_trailing());
            }
            match self.chunks.next().await {
                Some(Ok(chunk)) => self.buf.extend_from_slice(&chunk),
                Some(Err(e)) => return Err(e),
                None => self.eof = true,
            }
        }
    }

    /// Handles bytes left after end-of-stream: output that never looked like
    /// a frame is forwarded raw; an incomplete frame tail is dropped.
    fn drain_trailing(&mut self) -> Option<LogMessage> {
        if self.drained || self.buf.is_empty() {
            return None;
        }
        self.drained = true;
        if self.buf.len() < FRAME_HEADER_LEN || self.buf[0] > 2 {
            let content = Bytes::from(std::mem::take(&mut self.buf));
            return Some(LogMessage {
                kind: LogStreamKind::Raw,
                content,
            });
        }
        self.buf.clear();
        None
    }
}

/// Extracts a single complete frame from the front of the buffer.
///
/// Returns the stream kind, payload, and total frame length (header
/// included), or `None` if the buffer does not yet hold a complete frame.
fn extract_frame(buf: &[u8]) -> Option<(LogStreamKind, Bytes, usize)> {
    if buf.len() < FRAME_HEADER_LEN {
        return None;
    }
    let tag = buf[0];
    let size = u32::from_be_bytes([buf[4], buf[5], buf[6], buf[7]]) as usize;
    let frame_len = FRAME_HEADER_LEN + size;
    if buf.len() < frame_len {
        return None;
    }
    Some((
        LogStreamKind::from_tag(tag),
        Bytes::copy_from_slice(&buf[FRAME_HEADER_LEN..frame_len]),
        frame_len,
    ))
}

#[async_trait]
impl<S> MessageSource for LogMessageStream<S>
where
    S: Stream<Item = io::Result<Bytes>> + Unpin + Send,
{
    type Message = LogMessage;

    async fn next_message(&mut self) -> io::Result<Option<LogMessage>> {
        self.next().await
    }
}
