//! Chunked JSON message reader.
//!
//! The daemon delivers streaming responses (build progress, pull/push
//! status, events) as chunked JSON: a sequence of whitespace-separated
//! top-level objects whose boundaries bear no relation to chunk boundaries.
//! One chunk is not always one object, so the reader accumulates bytes until
//! the incremental parser can produce a complete value, then decodes it
//! through the wire naming convention.
//!
//! The reader favors availability over exactness: a structurally invalid
//! value or a message that does not fit the target shape ends the message
//! sequence instead of failing a long-running operation, and a truncated
//! trailing fragment at end-of-stream is not an error.

use std::io;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::pump::MessageSource;
use crate::wire::{self, NamingConvention};

/// Outcome of one incremental parse attempt over the buffered bytes.
enum Step {
    /// A complete top-level value, and how many buffered bytes it consumed.
    Value(Value, usize),
    /// The buffer ends inside a value; more bytes may complete it.
    Incomplete,
    /// The buffer holds something that can never become valid JSON.
    Invalid,
    /// Nothing but whitespace so far.
    Empty,
}

/// Reads one JSON message at a time from a chunked byte stream.
pub struct JsonMessageStream<T, S> {
    chunks: S,
    convention: Arc<dyn NamingConvention>,
    buf: Vec<u8>,
    eof: bool,
    _message: PhantomData<fn() -> T>,
}

impl<T, S> JsonMessageStream<T, S>
where
    T: DeserializeOwned + Send,
    S: Stream<Item = io::Result<Bytes>> + Unpin + Send,
{
    /// Creates a reader over a chunk stream, decoding messages with the
    /// given wire naming convention.
    pub fn new(chunks: S, convention: Arc<dyn NamingConvention>) -> Self {
        Self {
            chunks,
            convention,
            buf: Vec::new(),
            eof: false,
            _message: PhantomData,
        }
    }

    /// Returns the next decoded message, or `None` at end-of-stream.
    ///
    /// An object split across chunk boundaries is retried transparently once
    /// more bytes arrive; an empty or whitespace-only stream yields only
    /// `None`.
    ///
    /// # Errors
    ///
    /// Returns an error only when the underlying byte stream fails; parse
    /// and decode problems end the sequence silently.
    pub async fn next(&mut self) -> io::Result<Option<T>> {
        loop {
            match self.parse_step() {
                Step::Value(value, consumed) => {
                    self.buf.drain(..consumed);
                    return Ok(
                        match wire::from_wire_value::<T>(value, self.convention.as_ref()) {
                            Ok(message) => Some(message),
                            Err(e) => {
                                debug!("skipping undecodable stream message: {e}");
                                None
                            }
                        },
                    );
                }
                Step::Invalid => {
                    debug!("stream contains malformed JSON, ending message sequence");
                    return Ok(None);
                }
                Step::Empty => self.buf.clear(),
                Step::Incomplete => {}
            }

            if self.eof {
                // A truncated trailing fragment is normal termination.
                return Ok(None);
            }
            match self.chunks.next().await {
                Some(Ok(chunk)) => self.buf.extend_from_slice(&chunk),
                Some(Err(e)) => return Err(e),
                None => self.eof = true,
            }
        }
    }

    fn parse_step(&self) -> Step {
        let mut values = serde_json::Deserializer::from_slice(&self.buf).into_iter::<Value>();
        match values.next() {
            Some(Ok(value)) => Step::Value(value, values.byte_offset()),
            Some(Err(e)) if e.is_eof() => Step::Incomplete,
            Some(Err(_)) => Step::Invalid,
            None => Step::Empty,
        }
    }
}

#[async_trait]
impl<T, S> MessageSource for JsonMessageStream<T, S>
where
    T: DeserializeOwned + Send,
    S: Stream<Item = io::Result<Bytes>> + Unpin + Send,
{
    type Message = T;

    async fn next_message(&mut self) -> io::Result<Option<T>> {
        self.next().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ProgressStatus;
    use crate::wire::FirstLetterUppercase;
    use futures::stream;

    fn reader<T: DeserializeOwned + Send>(
        chunks: Vec<&[u8]>,
    ) -> JsonMessageStream<T, impl Stream<Item = io::Result<Bytes>> + Unpin + Send> {
        let chunks: Vec<io::Result<Bytes>> = chunks
            .into_iter()
            .map(|c| Ok(Bytes::copy_from_slice(c)))
            .collect();
        JsonMessageStream::new(stream::iter(chunks), Arc::new(FirstLetterUppercase))
    }

    #[tokio::test]
    async fn empty_stream_yields_end_of_stream() {
        let mut messages = reader::<ProgressStatus>(vec![]);
        assert!(messages.next().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn whitespace_only_stream_yields_end_of_stream() {
        let mut messages = reader::<ProgressStatus>(vec![b"  \r\n  ", b"\n"]);
        assert!(messages.next().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn object_split_across_chunks_is_reassembled() {
        let mut messages = reader::<ProgressStatus>(vec![b"{\"Stream\":\"Step", b" 1/2\"}"]);
        let first = messages.next().await.unwrap().unwrap();
        assert_eq!(first.stream.as_deref(), Some("Step 1/2"));
        assert!(messages.next().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn byte_at_a_time_delivery_yields_all_objects_in_order() {
        let wire = b"{\"Status\":\"a\"} {\"Status\":\"b\"}\n{\"Status\":\"c\"}";
        let chunks: Vec<&[u8]> = wire.chunks(1).collect();
        let mut messages = reader::<ProgressStatus>(chunks);
        let mut seen = Vec::new();
        while let Some(message) = messages.next().await.unwrap() {
            seen.push(message.status.unwrap());
        }
        assert_eq!(seen, ["a", "b", "c"]);
    }

    #[tokio::test]
    async fn several_objects_in_one_chunk_come_out_one_at_a_time() {
        let mut messages =
            reader::<ProgressStatus>(vec![b"{\"Status\":\"a\"}{\"Status\":\"b\"}"]);
        assert_eq!(
            messages.next().await.unwrap().unwrap().status.as_deref(),
            Some("a")
        );
        assert_eq!(
            messages.next().await.unwrap().unwrap().status.as_deref(),
            Some("b")
        );
        assert!(messages.next().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn truncated_trailing_fragment_is_not_an_error() {
        let mut messages = reader::<ProgressStatus>(vec![b"{\"Status\":\"a\"} {\"Stat"]);
        assert_eq!(
            messages.next().await.unwrap().unwrap().status.as_deref(),
            Some("a")
        );
        assert!(messages.next().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn malformed_value_ends_sequence_without_error() {
        let mut messages = reader::<ProgressStatus>(vec![b"{\"Status\":\"a\"} not-json"]);
        assert_eq!(
            messages.next().await.unwrap().unwrap().status.as_deref(),
            Some("a")
        );
        assert!(messages.next().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn shape_mismatch_is_swallowed() {
        // Valid JSON, but not an object the target shape accepts.
        let mut messages = reader::<ContainerIdOnly>(vec![b"{\"Id\": [1, 2]}"]);
        assert!(messages.next().await.unwrap().is_none());
    }

    #[derive(Debug, serde::Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct ContainerIdOnly {
        #[allow(dead_code)]
        id: String,
    }

    #[tokio::test]
    async fn underlying_io_error_is_propagated() {
        let chunks: Vec<io::Result<Bytes>> = vec![
            Ok(Bytes::from_static(b"{\"Status\":\"a\"} ")),
            Err(io::Error::other("connection reset")),
        ];
        let mut messages = JsonMessageStream::<ProgressStatus, _>::new(
            stream::iter(chunks),
            Arc::new(FirstLetterUppercase),
        );
        assert!(messages.next().await.unwrap().is_some());
        assert!(messages.next().await.is_err());
    }
}
