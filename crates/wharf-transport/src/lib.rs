//! # wharf-transport
//!
//! Transport layer for talking to a Docker daemon.
//!
//! This crate provides the connection primitives for the Wharf client:
//!
//! - [`DaemonEndpoint`]: where the daemon lives (`unix://` socket path or
//!   `tcp(s)://host:port`)
//! - [`CertBundle`] / [`TlsContext`]: client certificate material for
//!   TLS-protected TCP endpoints
//! - [`Connection`]: a fluent, single-round-trip HTTP/1.1 request builder
//! - [`Response`]: status, headers, and the (possibly chunked) body stream
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │               wharf-transport                   │
//! │                                                 │
//! │  ┌─────────────┐          ┌─────────────────┐  │
//! │  │    Unix     │          │      TCP        │  │
//! │  │   socket    │          │   (+ rustls)    │  │
//! │  └──────┬──────┘          └────────┬────────┘  │
//! │         │                          │           │
//! │         └──────────┬───────────────┘           │
//! │                    ▼                           │
//! │         hyper http1 handshake                  │
//! │       one connection per request               │
//! └─────────────────────────────────────────────────┘
//! ```
//!
//! Each [`Connection`] performs exactly one round trip; the daemon socket is
//! opened inside [`Connection::request`] and owned by the returned
//! [`Response`]. Dropping the response (or calling [`Response::close`])
//! releases the socket on every exit path, including cancellation of a
//! half-consumed chunked body. No pooling, no retries: retry policy belongs
//! to the caller.

#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod connection;
pub mod endpoint;
pub mod error;
pub mod response;
pub mod tls;

pub use connection::Connection;
pub use endpoint::{DaemonEndpoint, DEFAULT_UNIX_SOCKET};
pub use error::{Result, TransportError};
pub use response::{ByteStream, Response};
pub use tls::{CertBundle, TlsContext};
