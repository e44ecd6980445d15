//! Daemon response: status, headers, body.

use bytes::Bytes;
use futures::stream::BoxStream;
use futures::{StreamExt, TryStreamExt};
use http_body_util::{BodyExt, BodyStream};
use hyper::body::Incoming;
use hyper::http::HeaderMap;
use hyper::StatusCode;

use crate::error::Result;

/// Decoded body chunks as the daemon flushes them, one `Bytes` per data
/// frame. Chunk boundaries carry no meaning: a JSON object or log frame may
/// be split across any two chunks.
pub type ByteStream = BoxStream<'static, std::io::Result<Bytes>>;

/// One HTTP response from the daemon.
///
/// The response owns the underlying socket (via the body). The body is
/// opened lazily: nothing is read until [`Response::collect`] or the stream
/// returned by [`Response::into_byte_stream`] is consumed. Dropping the
/// response at any point, half-read chunked bodies included, releases the
/// connection.
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Incoming,
}

impl Response {
    pub(crate) fn new(response: hyper::Response<Incoming>) -> Self {
        let (parts, body) = response.into_parts();
        Self {
            status: parts.status,
            headers: parts.headers,
            body,
        }
    }

    /// Response status code.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Response headers.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Drains the whole body into memory and releases the connection.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the connection breaks mid-body.
    pub async fn collect(self) -> Result<Bytes> {
        Ok(self.body.collect().await?.to_bytes())
    }

    /// Converts the body into a stream of raw byte chunks, for chunked
    /// streaming responses (build progress, attach, events).
    ///
    /// Dropping the stream closes the connection; this is the cancellation
    /// primitive for long-lived daemon operations.
    #[must_use]
    pub fn into_byte_stream(self) -> ByteStream {
        TryStreamExt::map_err(BodyStream::new(self.body), std::io::Error::other)
            .try_filter_map(|frame| futures::future::ok(frame.into_data().ok()))
            .boxed()
    }

    /// Closes the connection without reading the body.
    ///
    /// Equivalent to dropping the response; provided so call sites can make
    /// the release explicit.
    pub fn close(self) {
        drop(self);
    }
}

impl std::fmt::Debug for Response {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Response")
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}
