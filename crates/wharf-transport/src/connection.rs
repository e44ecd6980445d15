//! Single-round-trip HTTP connection to the daemon.
//!
//! A [`Connection`] is configured fluently (method, path, query, headers,
//! entity) without performing any I/O, then [`Connection::request`] opens the
//! socket, performs the HTTP/1.1 handshake and exactly one exchange, and
//! hands the socket's lifetime to the returned [`Response`]. There is no
//! reuse: one connection per operation, closed when the response is dropped.

use bytes::Bytes;
use futures::TryStreamExt;
use http_body_util::combinators::BoxBody;
use http_body_util::{BodyExt, Full, StreamBody};
use hyper::body::Frame;
use hyper::header::{CONTENT_LENGTH, HOST};
use hyper::{Method, Request};
use hyper_util::rt::TokioIo;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpStream, UnixStream};
use tokio_rustls::TlsConnector;
use tokio_util::io::ReaderStream;
use tracing::debug;

use crate::endpoint::DaemonEndpoint;
use crate::error::{Result, TransportError};
use crate::response::Response;
use crate::tls::TlsContext;

/// Byte stream a daemon connection rides on, unifying the socket variants.
trait RawStream: AsyncRead + AsyncWrite + Send + Unpin {}

impl<T: AsyncRead + AsyncWrite + Send + Unpin> RawStream for T {}

/// Request body type used on the wire.
type OutBody = BoxBody<Bytes, std::io::Error>;

/// Request entity attached to a connection.
enum Entity {
    None,
    Bytes(Bytes),
    File(tokio::fs::File, u64),
}

/// A fluently-configured request to the daemon.
///
/// Configuration methods perform no I/O; [`Connection::request`] performs
/// exactly one round trip.
pub struct Connection {
    endpoint: DaemonEndpoint,
    tls: Option<TlsContext>,
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    headers: Vec<(String, String)>,
    entity: Entity,
}

impl Connection {
    /// Opens a connection builder against a daemon endpoint.
    ///
    /// `tls` is required when the endpoint demands TLS and ignored for Unix
    /// sockets.
    #[must_use]
    pub fn open(endpoint: DaemonEndpoint, tls: Option<TlsContext>) -> Self {
        Self {
            endpoint,
            tls,
            method: Method::GET,
            path: "/".to_string(),
            query: Vec::new(),
            headers: Vec::new(),
            entity: Entity::None,
        }
    }

    /// Sets the request method.
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Sets the request path.
    #[must_use]
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Appends one query parameter.
    ///
    /// The value is inserted verbatim: callers percent-encode values that
    /// need it (this mirrors the daemon API's use of pre-joined values such
    /// as `ps_args=aux+-o`).
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Appends one request header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.headers.push((name.into(), value.to_string()));
        self
    }

    /// Attaches an in-memory request entity.
    #[must_use]
    pub fn entity(mut self, bytes: impl Into<Bytes>) -> Self {
        self.entity = Entity::Bytes(bytes.into());
        self
    }

    /// Attaches a file entity streamed from disk (used for build archives).
    ///
    /// `len` is sent as `Content-Length`.
    #[must_use]
    pub fn entity_file(mut self, file: tokio::fs::File, len: u64) -> Self {
        self.entity = Entity::File(file, len);
        self
    }

    /// Performs the round trip: connect, handshake, send, await the status
    /// line and headers.
    ///
    /// The response body is left unconsumed; the caller drains or drops it.
    /// All socket resources are released when the returned [`Response`] goes
    /// away, on success and failure paths alike.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] if the socket cannot be opened, the TLS
    /// handshake fails, the request is malformed, or the exchange breaks
    /// mid-transfer. No retries are attempted.
    pub async fn request(self) -> Result<Response> {
        let stream = Self::connect(&self.endpoint, self.tls.as_ref()).await?;
        let io = TokioIo::new(stream);

        let (mut sender, conn) = hyper::client::conn::http1::handshake(io).await?;

        // Drive the connection until the exchange finishes or the response
        // is dropped; an abandoned body surfaces here as a closed transfer.
        tokio::spawn(async move {
            if let Err(e) = conn.await {
                debug!("daemon connection closed: {e}");
            }
        });

        let request = self.build_request()?;
        let response = sender.send_request(request).await?;
        Ok(Response::new(response))
    }

    async fn connect(
        endpoint: &DaemonEndpoint,
        tls: Option<&TlsContext>,
    ) -> Result<Box<dyn RawStream>> {
        match endpoint {
            DaemonEndpoint::Unix { socket_path } => {
                let stream = UnixStream::connect(socket_path).await.map_err(|e| {
                    TransportError::ConnectionRefused(format!(
                        "{}: {e}",
                        socket_path.display()
                    ))
                })?;
                Ok(Box::new(stream))
            }
            DaemonEndpoint::Tcp {
                host,
                port,
                tls: wants_tls,
            } => {
                let stream = TcpStream::connect((host.as_str(), *port))
                    .await
                    .map_err(|e| {
                        TransportError::ConnectionRefused(format!("{host}:{port}: {e}"))
                    })?;
                if *wants_tls || tls.is_some() {
                    let context = tls.ok_or_else(|| {
                        TransportError::Tls(format!(
                            "endpoint {host}:{port} requires TLS but no certificate bundle is configured"
                        ))
                    })?;
                    let server_name = rustls::pki_types::ServerName::try_from(host.clone())
                        .map_err(|e| TransportError::Tls(e.to_string()))?;
                    let connector = TlsConnector::from(context.config());
                    let stream = connector
                        .connect(server_name, stream)
                        .await
                        .map_err(|e| TransportError::Tls(e.to_string()))?;
                    Ok(Box::new(stream))
                } else {
                    Ok(Box::new(stream))
                }
            }
        }
    }

    fn build_request(self) -> Result<Request<OutBody>> {
        let mut uri = format!("http://{}{}", self.endpoint.host_header(), self.path);
        for (i, (key, value)) in self.query.iter().enumerate() {
            uri.push(if i == 0 { '?' } else { '&' });
            uri.push_str(key);
            uri.push('=');
            uri.push_str(value);
        }

        let mut builder = Request::builder()
            .method(self.method.clone())
            .uri(uri)
            .header(HOST, self.endpoint.host_header());
        for (name, value) in &self.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let (builder, body): (_, OutBody) = match self.entity {
            Entity::None => {
                let builder = if self.method == Method::GET || self.method == Method::HEAD {
                    builder
                } else {
                    builder.header(CONTENT_LENGTH, 0)
                };
                (builder, empty_body())
            }
            Entity::Bytes(bytes) => (
                builder.header(CONTENT_LENGTH, bytes.len()),
                Full::new(bytes).map_err(|never| match never {}).boxed(),
            ),
            Entity::File(file, len) => (
                builder.header(CONTENT_LENGTH, len),
                StreamBody::new(ReaderStream::new(file).map_ok(Frame::data)).boxed(),
            ),
        };

        Ok(builder.body(body)?)
    }
}

fn empty_body() -> OutBody {
    Full::new(Bytes::new()).map_err(|never| match never {}).boxed()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_values_are_inserted_verbatim() {
        let conn = Connection::open(DaemonEndpoint::default_unix(), None)
            .method(Method::POST)
            .path("/containers/abc/stop")
            .query("t", 10)
            .query("force", "1");
        let request = conn.build_request().unwrap();
        assert_eq!(
            request.uri().path_and_query().unwrap().as_str(),
            "/containers/abc/stop?t=10&force=1"
        );
    }

    #[test]
    fn entity_sets_content_length() {
        let conn = Connection::open(DaemonEndpoint::default_unix(), None)
            .method(Method::POST)
            .path("/containers/create")
            .entity(&b"{\"Image\":\"alpine\"}"[..]);
        let request = conn.build_request().unwrap();
        assert_eq!(request.headers()[CONTENT_LENGTH], "18");
    }

    #[test]
    fn empty_post_advertises_zero_length() {
        let conn = Connection::open(DaemonEndpoint::default_unix(), None)
            .method(Method::POST)
            .path("/containers/abc/wait");
        let request = conn.build_request().unwrap();
        assert_eq!(request.headers()[CONTENT_LENGTH], "0");
    }

    #[test]
    fn get_has_no_content_length() {
        let conn = Connection::open(DaemonEndpoint::default_unix(), None).path("/info");
        let request = conn.build_request().unwrap();
        assert!(request.headers().get(CONTENT_LENGTH).is_none());
    }

    #[tokio::test]
    async fn connect_refused_surfaces_as_transport_error() {
        let endpoint = DaemonEndpoint::parse("unix:///nonexistent/wharf-test.sock").unwrap();
        let err = Connection::open(endpoint, None)
            .path("/_ping")
            .request()
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::ConnectionRefused(_)));
    }
}
