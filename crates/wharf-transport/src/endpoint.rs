//! Daemon endpoint addressing.
//!
//! An endpoint is parsed once from a URI and then consulted per operation to
//! pick the socket kind; it carries no mutable state.

use std::fmt;
use std::path::PathBuf;

use crate::error::{Result, TransportError};

/// URI scheme for Unix domain socket endpoints.
pub const UNIX_SOCKET_SCHEME: &str = "unix";

/// Default daemon endpoint on the local machine.
pub const DEFAULT_UNIX_SOCKET: &str = "unix:///var/run/docker.sock";

/// Default daemon port for plain TCP endpoints.
const DEFAULT_TCP_PORT: u16 = 2375;

/// Default daemon port for TLS endpoints.
const DEFAULT_TLS_PORT: u16 = 2376;

/// Where the daemon listens.
///
/// The scheme of the configured URI decides which transport variant a
/// [`Connection`](crate::Connection) opens:
///
/// - `unix://<path>`: local named socket, raw HTTP/1.1, no TLS
/// - `tcp://` / `http://`: plain TCP
/// - `tcps://` / `https://`: TCP wrapped in TLS
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DaemonEndpoint {
    /// Local Unix domain socket.
    Unix {
        /// Filesystem path of the named socket.
        socket_path: PathBuf,
    },
    /// Remote (or local) TCP endpoint.
    Tcp {
        /// Daemon hostname or address.
        host: String,
        /// Daemon port.
        port: u16,
        /// Whether the socket must be wrapped in TLS.
        tls: bool,
    },
}

impl DaemonEndpoint {
    /// Parses an endpoint URI.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::InvalidAddress`] for unknown schemes, empty
    /// socket paths, missing hosts, or unparsable ports.
    pub fn parse(uri: &str) -> Result<Self> {
        if let Some(path) = uri.strip_prefix("unix://") {
            if path.is_empty() {
                return Err(TransportError::InvalidAddress(uri.to_string()));
            }
            return Ok(Self::Unix {
                socket_path: PathBuf::from(path),
            });
        }

        let (rest, tls) = if let Some(rest) = uri.strip_prefix("tcp://") {
            (rest, false)
        } else if let Some(rest) = uri.strip_prefix("http://") {
            (rest, false)
        } else if let Some(rest) = uri.strip_prefix("tcps://") {
            (rest, true)
        } else if let Some(rest) = uri.strip_prefix("https://") {
            (rest, true)
        } else {
            return Err(TransportError::InvalidAddress(uri.to_string()));
        };

        let rest = rest.trim_end_matches('/');
        let (host, port) = match rest.rsplit_once(':') {
            Some((host, port)) => {
                let port = port
                    .parse::<u16>()
                    .map_err(|_| TransportError::InvalidAddress(uri.to_string()))?;
                (host, port)
            }
            None => (rest, if tls { DEFAULT_TLS_PORT } else { DEFAULT_TCP_PORT }),
        };
        if host.is_empty() {
            return Err(TransportError::InvalidAddress(uri.to_string()));
        }

        Ok(Self::Tcp {
            host: host.to_string(),
            port,
            tls,
        })
    }

    /// The default local daemon endpoint (`unix:///var/run/docker.sock`).
    #[must_use]
    pub fn default_unix() -> Self {
        Self::Unix {
            socket_path: PathBuf::from("/var/run/docker.sock"),
        }
    }

    /// Returns whether this endpoint is a Unix domain socket.
    #[must_use]
    pub const fn is_unix(&self) -> bool {
        matches!(self, Self::Unix { .. })
    }

    /// Value for the HTTP `Host` header of requests to this endpoint.
    #[must_use]
    pub fn host_header(&self) -> String {
        match self {
            Self::Unix { .. } => "localhost".to_string(),
            Self::Tcp { host, port, .. } => format!("{host}:{port}"),
        }
    }

    /// Upgrades a plain TCP endpoint to TLS. No effect on Unix sockets or
    /// endpoints that already require TLS.
    #[must_use]
    pub fn with_tls(self) -> Self {
        match self {
            Self::Tcp { host, port, .. } => Self::Tcp {
                host,
                port,
                tls: true,
            },
            unix => unix,
        }
    }
}

impl fmt::Display for DaemonEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unix { socket_path } => {
                write!(f, "{UNIX_SOCKET_SCHEME}://{}", socket_path.display())
            }
            Self::Tcp {
                host,
                port,
                tls: false,
            } => write!(f, "tcp://{host}:{port}"),
            Self::Tcp {
                host,
                port,
                tls: true,
            } => write!(f, "tcps://{host}:{port}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_unix() {
        let endpoint = DaemonEndpoint::parse("unix:///var/run/docker.sock").unwrap();
        assert_eq!(
            endpoint,
            DaemonEndpoint::Unix {
                socket_path: PathBuf::from("/var/run/docker.sock")
            }
        );
        assert!(endpoint.is_unix());
        assert_eq!(endpoint.host_header(), "localhost");
    }

    #[test]
    fn parse_tcp_with_port() {
        let endpoint = DaemonEndpoint::parse("tcp://192.168.99.100:2376").unwrap();
        assert_eq!(
            endpoint,
            DaemonEndpoint::Tcp {
                host: "192.168.99.100".to_string(),
                port: 2376,
                tls: false,
            }
        );
        assert_eq!(endpoint.host_header(), "192.168.99.100:2376");
    }

    #[test]
    fn parse_tcp_default_ports() {
        assert_eq!(
            DaemonEndpoint::parse("tcp://dockerhost").unwrap(),
            DaemonEndpoint::Tcp {
                host: "dockerhost".to_string(),
                port: 2375,
                tls: false,
            }
        );
        assert_eq!(
            DaemonEndpoint::parse("https://dockerhost").unwrap(),
            DaemonEndpoint::Tcp {
                host: "dockerhost".to_string(),
                port: 2376,
                tls: true,
            }
        );
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(DaemonEndpoint::parse("unix://").is_err());
        assert!(DaemonEndpoint::parse("tcp://:2375").is_err());
        assert!(DaemonEndpoint::parse("tcp://host:notaport").is_err());
        assert!(DaemonEndpoint::parse("ftp://host").is_err());
    }

    #[test]
    fn with_tls_upgrades_tcp_only() {
        let tcp = DaemonEndpoint::parse("tcp://h:2375").unwrap().with_tls();
        assert_eq!(
            tcp,
            DaemonEndpoint::Tcp {
                host: "h".to_string(),
                port: 2375,
                tls: true,
            }
        );
        let unix = DaemonEndpoint::default_unix().with_tls();
        assert!(unix.is_unix());
    }

    #[test]
    fn display_round_trips() {
        for uri in ["unix:///var/run/docker.sock", "tcp://h:2375", "tcps://h:2376"] {
            let endpoint = DaemonEndpoint::parse(uri).unwrap();
            assert_eq!(endpoint.to_string(), uri);
        }
    }
}
