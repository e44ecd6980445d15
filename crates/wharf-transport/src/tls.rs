//! TLS client material for TCP daemon endpoints.
//!
//! A [`CertBundle`] is the on-disk certificate directory layout used by
//! Docker Machine style setups: `ca.pem`, `cert.pem`, and `key.pem` in one
//! directory. It is loaded once and compiled into a [`TlsContext`] that the
//! connector owns for its lifetime.

use std::path::Path;
use std::sync::Arc;

use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use rustls::{ClientConfig, RootCertStore};

use crate::error::{Result, TransportError};

/// CA certificate file name inside a certificate directory.
const CA_FILE: &str = "ca.pem";

/// Client certificate file name inside a certificate directory.
const CERT_FILE: &str = "cert.pem";

/// Client key file name inside a certificate directory.
const KEY_FILE: &str = "key.pem";

/// Client certificate/key/CA material for a TLS daemon endpoint.
#[derive(Debug)]
pub struct CertBundle {
    ca: Vec<CertificateDer<'static>>,
    cert: Vec<CertificateDer<'static>>,
    key: PrivateKeyDer<'static>,
}

impl CertBundle {
    /// Loads `ca.pem`, `cert.pem`, and `key.pem` from a certificate
    /// directory.
    ///
    /// # Errors
    ///
    /// Returns an error if a file is missing, unreadable, or contains no
    /// usable PEM material.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let ca = read_certs(&dir.join(CA_FILE))?;
        let cert = read_certs(&dir.join(CERT_FILE))?;
        let key = read_key(&dir.join(KEY_FILE))?;
        Ok(Self { ca, cert, key })
    }

    /// Compiles the bundle into a reusable TLS context.
    ///
    /// The daemon's certificate is validated against the bundle's CA; the
    /// client certificate is presented for mutual authentication.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Tls`] if the material is rejected by the
    /// TLS backend (e.g. a key that does not match the certificate).
    pub fn into_context(self) -> Result<TlsContext> {
        let mut roots = RootCertStore::empty();
        for cert in self.ca {
            roots
                .add(cert)
                .map_err(|e| TransportError::Tls(e.to_string()))?;
        }

        let provider = Arc::new(rustls::crypto::ring::default_provider());
        let config = ClientConfig::builder_with_provider(provider)
            .with_safe_default_protocol_versions()
            .map_err(|e| TransportError::Tls(e.to_string()))?
            .with_root_certificates(roots)
            .with_client_auth_cert(self.cert, self.key)
            .map_err(|e| TransportError::Tls(e.to_string()))?;

        Ok(TlsContext {
            config: Arc::new(config),
        })
    }
}

/// A compiled TLS client configuration, cheap to clone per connection.
#[derive(Clone)]
pub struct TlsContext {
    config: Arc<ClientConfig>,
}

impl TlsContext {
    pub(crate) fn config(&self) -> Arc<ClientConfig> {
        Arc::clone(&self.config)
    }
}

impl std::fmt::Debug for TlsContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TlsContext").finish_non_exhaustive()
    }
}

fn read_certs(path: &Path) -> Result<Vec<CertificateDer<'static>>> {
    let pem = std::fs::read(path)?;
    let certs = rustls_pemfile::certs(&mut pem.as_slice())
        .collect::<std::io::Result<Vec<_>>>()?;
    if certs.is_empty() {
        return Err(TransportError::Tls(format!(
            "no certificates found in {}",
            path.display()
        )));
    }
    Ok(certs)
}

fn read_key(path: &Path) -> Result<PrivateKeyDer<'static>> {
    let pem = std::fs::read(path)?;
    rustls_pemfile::private_key(&mut pem.as_slice())?
        .ok_or_else(|| TransportError::Tls(format!("no private key found in {}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_fails_on_missing_directory() {
        let err = CertBundle::load("/nonexistent/certs").unwrap_err();
        assert!(matches!(err, TransportError::Io(_)));
    }

    #[test]
    fn load_fails_on_empty_pem() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CA_FILE), "not pem at all").unwrap();
        std::fs::write(dir.path().join(CERT_FILE), "").unwrap();
        std::fs::write(dir.path().join(KEY_FILE), "").unwrap();
        let err = CertBundle::load(dir.path()).unwrap_err();
        assert!(matches!(err, TransportError::Tls(_)));
    }
}
