//! # wharf-client
//!
//! Client for the Docker Remote API.
//!
//! The centerpiece is [`DockerConnector`]: one method per daemon operation
//! (image build/list/inspect/remove/tag/push/pull, container lifecycle,
//! exec, attach), each performing a single HTTP round trip over
//! [`wharf-transport`](wharf_transport) and translating non-accepted status
//! codes into [`DockerError::Daemon`].
//!
//! Long-running operations (build, push, pull, attach, exec output, events)
//! stream chunked JSON or multiplexed log bytes from the daemon. Those are
//! consumed through [`json_stream::JsonMessageStream`] /
//! [`logs::LogMessageStream`] and driven by [`pump::pump`], which forwards
//! each decoded message to a caller-supplied [`ProgressMonitor`] or
//! [`LogMessageProcessor`] in arrival order and honors a
//! [`CancellationToken`](tokio_util::sync::CancellationToken): cancelling
//! closes the operation's own connection and completes the call without an
//! error.
//!
//! ## Wire naming
//!
//! The daemon capitalizes the first letter of every JSON field
//! (`{"Id": ...}` for a field named `id`). The translation is a pluggable
//! [`wire::NamingConvention`]; every body that crosses the wire goes through
//! it, uniformly, in both directions.
//!
//! ## Example
//!
//! ```no_run
//! use tokio_util::sync::CancellationToken;
//! use wharf_client::{ConnectorConfig, DockerConnector, ProgressMonitor, ProgressStatus};
//!
//! struct PrintProgress;
//!
//! impl ProgressMonitor for PrintProgress {
//!     fn update_progress(&mut self, status: &ProgressStatus) {
//!         if let Some(line) = &status.status {
//!             println!("{line}");
//!         }
//!     }
//! }
//!
//! # async fn example() -> wharf_client::Result<()> {
//! let connector = DockerConnector::new(ConnectorConfig::from_env()?)?;
//! let version = connector.version().await?;
//! println!("daemon {}", version.version.unwrap_or_default());
//!
//! let cancel = CancellationToken::new();
//! connector
//!     .pull("alpine", Some("latest"), None, &mut PrintProgress, &cancel)
//!     .await?;
//! # Ok(())
//! # }
//! ```

#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod connector;
pub mod error;
pub mod exec;
pub mod json_stream;
pub mod logs;
pub mod progress;
pub mod pump;
pub mod types;
pub mod wire;

pub use config::ConnectorConfig;
pub use connector::DockerConnector;
pub use error::{DockerError, Result};
pub use exec::Exec;
pub use logs::{LogMessage, LogStreamKind};
pub use progress::{LogMessageProcessor, ProgressMonitor};
pub use types::ProgressStatus;

// Re-exported so callers configure endpoints without naming the transport
// crate directly.
pub use wharf_transport::{CertBundle, DaemonEndpoint, DEFAULT_UNIX_SOCKET};
