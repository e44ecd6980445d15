//! Error types for daemon operations.

use thiserror::Error;
use wharf_transport::TransportError;

/// Result type alias for daemon operations.
pub type Result<T> = std::result::Result<T, DockerError>;

/// Errors that can occur during a daemon operation.
#[derive(Debug, Error)]
pub enum DockerError {
    /// The daemon could not be reached or the connection broke.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The daemon answered with a status code outside the operation's
    /// accepted set. Carries the exact status and the daemon's message body.
    #[error("error response from docker API, status: {status}, message: {message}")]
    Daemon {
        /// HTTP status code returned by the daemon.
        status: u16,
        /// Message body sent alongside the status.
        message: String,
    },

    /// A single-shot JSON response body did not match the expected shape.
    ///
    /// Streamed progress messages never produce this: a malformed progress
    /// chunk ends the message sequence instead of failing the operation.
    #[error("failed to decode docker API response: {0}")]
    Decode(#[source] serde_json::Error),

    /// An image build stream completed without reporting a built image id.
    #[error("docker image build failed")]
    BuildFailed,

    /// The operation was cancelled before it produced a result.
    ///
    /// Only returned by operations that must yield a value (build); pure
    /// streaming operations complete normally on cancellation.
    #[error("operation cancelled")]
    Cancelled,

    /// I/O error outside the transport (spool files, archive unpacking).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
