//! Error types for transport operations.

use thiserror::Error;

/// Result type alias for transport operations.
pub type Result<T> = std::result::Result<T, TransportError>;

/// Errors that can occur while talking to the daemon socket.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The daemon endpoint URI could not be understood.
    #[error("invalid daemon address: {0}")]
    InvalidAddress(String),

    /// The daemon socket could not be reached.
    #[error("connection refused: {0}")]
    ConnectionRefused(String),

    /// TLS material could not be loaded or the handshake failed.
    #[error("TLS error: {0}")]
    Tls(String),

    /// HTTP-level failure: handshake, framing, or a broken connection
    /// mid-transfer.
    #[error("HTTP error: {0}")]
    Http(#[from] hyper::Error),

    /// The request could not be assembled (bad header name/value or URI).
    #[error("invalid request: {0}")]
    Request(#[from] hyper::http::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
