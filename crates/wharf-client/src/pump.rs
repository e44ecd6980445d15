//! Interruptible streaming pump.
//!
//! Long daemon operations (image build, push, pull, log attach, exec
//! output) keep a response stream open for as long as the daemon feels like
//! talking. The pump runs the pull-loop ("while a next message exists,
//! forward it to the sink") and completes in exactly one of three ways:
//!
//! - the stream reaches end-of-stream (normal completion),
//! - the read fails with an I/O error, which is re-raised to the caller,
//! - the caller's [`CancellationToken`] fires, in which case the pump
//!   returns normally; the operation then drops its response, closing the
//!   connection underneath the daemon. Cancellation is not an error.
//!
//! Messages reach the sink in exact arrival order, one at a time, with no
//! batching. Sinks are invoked synchronously from the pull-loop, so they
//! must not block indefinitely.

use std::io;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// A stream of decoded messages: chunked JSON, multiplexed log frames, or
/// anything else that yields one message at a time until end-of-stream.
#[async_trait]
pub trait MessageSource: Send {
    /// Message type produced by this source.
    type Message: Send;

    /// Returns the next message, or `None` at end-of-stream.
    async fn next_message(&mut self) -> io::Result<Option<Self::Message>>;
}

/// Runs the pull-loop until end-of-stream, error, or cancellation.
///
/// # Errors
///
/// Re-raises the source's I/O error, unless the token has fired, in which
/// case the error was induced by our own teardown and the pump completes
/// normally.
pub async fn pump<S, F>(
    mut source: S,
    mut sink: F,
    cancel: &CancellationToken,
) -> io::Result<()>
where
    S: MessageSource,
    F: FnMut(S::Message) + Send,
{
    loop {
        tokio::select! {
            biased;

            () = cancel.cancelled() => {
                debug!("stream cancelled");
                return Ok(());
            }

            message = source.next_message() => match message {
                Ok(Some(message)) => sink(message),
                Ok(None) => return Ok(()),
                Err(e) if cancel.is_cancelled() => {
                    debug!("ignoring read error after cancellation: {e}");
                    return Ok(());
                }
                Err(e) => return Err(e),
            },
        }
    }
}
