//! Connector configuration.
//!
//! Configuration is consumed, not re-derived: the endpoint URI, certificate
//! directory, and TLS-verify flag are resolved once (explicitly or from the
//! environment) and handed to [`DockerConnector::new`](crate::DockerConnector::new).

use std::path::PathBuf;

use wharf_transport::{DaemonEndpoint, DEFAULT_UNIX_SOCKET};

use crate::error::Result;

/// Environment variable naming the daemon endpoint URI.
pub const DOCKER_HOST_ENV: &str = "DOCKER_HOST";

/// Environment variable carrying the TLS-verify flag.
pub const DOCKER_TLS_VERIFY_ENV: &str = "DOCKER_TLS_VERIFY";

/// Environment variable naming the certificate directory.
pub const DOCKER_CERT_PATH_ENV: &str = "DOCKER_CERT_PATH";

/// Resolved connector configuration.
#[derive(Debug, Clone)]
pub struct ConnectorConfig {
    /// Where the daemon listens.
    pub endpoint: DaemonEndpoint,
    /// Directory holding `ca.pem`/`cert.pem`/`key.pem` for TLS endpoints.
    pub cert_path: Option<PathBuf>,
    /// Whether a plain `tcp://` endpoint must be upgraded to TLS.
    pub tls_verify: bool,
}

impl ConnectorConfig {
    /// Configuration for an explicit endpoint, without TLS material.
    #[must_use]
    pub const fn new(endpoint: DaemonEndpoint) -> Self {
        Self {
            endpoint,
            cert_path: None,
            tls_verify: false,
        }
    }

    /// Sets the certificate directory.
    #[must_use]
    pub fn with_cert_path(mut self, cert_path: impl Into<PathBuf>) -> Self {
        self.cert_path = Some(cert_path.into());
        self
    }

    /// Sets the TLS-verify flag.
    #[must_use]
    pub const fn with_tls_verify(mut self, tls_verify: bool) -> Self {
        self.tls_verify = tls_verify;
        self
    }

    /// Resolves configuration from `DOCKER_HOST`, `DOCKER_TLS_VERIFY`, and
    /// `DOCKER_CERT_PATH`, defaulting to the local Unix socket.
    ///
    /// `DOCKER_TLS_VERIFY` counts as set for any non-empty value other than
    /// `0`.
    ///
    /// # Errors
    ///
    /// Returns an error if `DOCKER_HOST` holds an unparsable URI.
    pub fn from_env() -> Result<Self> {
        let endpoint = match std::env::var(DOCKER_HOST_ENV) {
            Ok(host) if !host.is_empty() => DaemonEndpoint::parse(&host)?,
            _ => DaemonEndpoint::parse(DEFAULT_UNIX_SOCKET)?,
        };
        let tls_verify = std::env::var(DOCKER_TLS_VERIFY_ENV)
            .is_ok_and(|value| !value.is_empty() && value != "0");
        let cert_path = std::env::var(DOCKER_CERT_PATH_ENV)
            .ok()
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);
        Ok(Self {
            endpoint,
            cert_path,
            tls_verify,
        })
    }
}
