//! The daemon operation facade.
//!
//! One method per Remote API operation. Every call opens its own
//! [`Connection`], performs a single round trip, checks the status code
//! against the operation's accepted set, and either decodes the JSON body,
//! discards it, or pumps the chunked body to a caller-supplied sink. The
//! connector itself is stateless and reentrant: concurrent operations share
//! nothing.
//!
//! Streaming operations take a [`CancellationToken`]; cancelling completes
//! the call and drops its response, which closes the connection under the
//! daemon. See [`crate::pump`].

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use futures::TryStreamExt;
use hyper::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use wharf_transport::{CertBundle, Connection, DaemonEndpoint, Response, TlsContext};

use crate::config::ConnectorConfig;
use crate::error::{DockerError, Result};
use crate::exec::Exec;
use crate::json_stream::JsonMessageStream;
use crate::logs::LogMessageStream;
use crate::progress::{self, LogMessageProcessor, ProgressMonitor};
use crate::pump::pump;
use crate::types::{
    ContainerCommitted, ContainerConfig, ContainerCreated, ContainerExitStatus, ContainerInfo,
    ContainerProcesses, ContainerResource, Event, ExecConfig, ExecCreated, ExecInfo, ExecStart,
    HostConfig, Image, ImageInfo, ProgressStatus, SystemInfo, Version,
};
use crate::wire::{self, FirstLetterUppercase, NamingConvention};

/// Signal sent by [`DockerConnector::kill_container`] (SIGKILL).
const DEFAULT_KILL_SIGNAL: i32 = 9;

/// Client for the daemon Remote API.
///
/// Owns the daemon endpoint and (for TLS endpoints) the certificate
/// material for its whole lifetime; a fresh connection is opened and closed
/// inside every operation.
pub struct DockerConnector {
    endpoint: DaemonEndpoint,
    tls: Option<TlsContext>,
    convention: Arc<dyn NamingConvention>,
    registry_auth: Option<String>,
}

impl DockerConnector {
    /// Creates a connector from resolved configuration.
    ///
    /// For TCP endpoints with a certificate directory, the bundle is loaded
    /// and compiled once here; `tls_verify` upgrades a plain `tcp://`
    /// endpoint to TLS.
    ///
    /// # Errors
    ///
    /// Returns an error if the certificate bundle cannot be loaded.
    pub fn new(config: ConnectorConfig) -> Result<Self> {
        let endpoint = if config.tls_verify {
            config.endpoint.with_tls()
        } else {
            config.endpoint
        };
        let tls = match (&endpoint, &config.cert_path) {
            (DaemonEndpoint::Tcp { .. }, Some(dir)) => {
                Some(CertBundle::load(dir)?.into_context()?)
            }
            _ => None,
        };
        Ok(Self {
            endpoint,
            tls,
            convention: Arc::new(FirstLetterUppercase),
            registry_auth: None,
        })
    }

    /// Creates a connector from the process environment
    /// (`DOCKER_HOST`, `DOCKER_TLS_VERIFY`, `DOCKER_CERT_PATH`).
    ///
    /// # Errors
    ///
    /// Returns an error for an unparsable `DOCKER_HOST` or unloadable
    /// certificate bundle.
    pub fn from_env() -> Result<Self> {
        Self::new(ConnectorConfig::from_env()?)
    }

    /// Replaces the wire naming convention.
    #[must_use]
    pub fn with_naming_convention(
        mut self,
        convention: impl NamingConvention + 'static,
    ) -> Self {
        self.convention = Arc::new(convention);
        self
    }

    /// Sets registry credentials, passed through verbatim as the
    /// `X-Registry-Auth` / `X-Registry-Config` headers of push, pull, and
    /// build operations.
    #[must_use]
    pub fn with_registry_auth(mut self, auth: &serde_json::Value) -> Self {
        self.registry_auth = Some(BASE64.encode(auth.to_string()));
        self
    }

    /// The endpoint this connector talks to.
    #[must_use]
    pub const fn endpoint(&self) -> &DaemonEndpoint {
        &self.endpoint
    }

    // ------------------------------------------------------------------
    // System operations
    // ------------------------------------------------------------------

    /// Gets system-wide daemon information.
    ///
    /// # Errors
    ///
    /// Returns [`DockerError::Daemon`] for any status other than 200.
    pub async fn system_info(&self) -> Result<SystemInfo> {
        let response = self.connection().method(Method::GET).path("/info").request().await?;
        let response = Self::expect(response, &[200]).await?;
        self.read_json(response).await
    }

    /// Gets the daemon version.
    ///
    /// # Errors
    ///
    /// Returns [`DockerError::Daemon`] for any status other than 200.
    pub async fn version(&self) -> Result<Version> {
        let response = self
            .connection()
            .method(Method::GET)
            .path("/version")
            .request()
            .await?;
        let response = Self::expect(response, &[200]).await?;
        self.read_json(response).await
    }

    /// Pings the daemon.
    ///
    /// # Errors
    ///
    /// Returns [`DockerError::Daemon`] for any status other than 200.
    pub async fn ping(&self) -> Result<()> {
        let response = self
            .connection()
            .method(Method::GET)
            .path("/_ping")
            .request()
            .await?;
        Self::expect(response, &[200]).await?.close();
        Ok(())
    }

    /// Streams daemon events to `on_event` until cancelled or the daemon
    /// closes the stream.
    ///
    /// # Errors
    ///
    /// Returns [`DockerError::Daemon`] for any status other than 200, or an
    /// I/O error if the stream breaks before cancellation.
    pub async fn events<F>(&self, on_event: F, cancel: &CancellationToken) -> Result<()>
    where
        F: FnMut(Event) + Send,
    {
        let response = self
            .connection()
            .method(Method::GET)
            .path("/events")
            .request()
            .await?;
        let response = Self::expect(response, &[200]).await?;
        let messages: JsonMessageStream<Event, _> =
            JsonMessageStream::new(response.into_byte_stream(), Arc::clone(&self.convention));
        pump(messages, on_event, cancel).await?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Image operations
    // ------------------------------------------------------------------

    /// Lists images.
    ///
    /// # Errors
    ///
    /// Returns [`DockerError::Daemon`] for any status other than 200.
    pub async fn list_images(&self) -> Result<Vec<Image>> {
        let response = self
            .connection()
            .method(Method::GET)
            .path("/images/json")
            .request()
            .await?;
        let response = Self::expect(response, &[200]).await?;
        self.read_json(response).await
    }

    /// Gets detailed information about an image, by id or repository name.
    ///
    /// # Errors
    ///
    /// Returns [`DockerError::Daemon`] for any status other than 200.
    pub async fn inspect_image(&self, image: &str) -> Result<ImageInfo> {
        let response = self
            .connection()
            .method(Method::GET)
            .path(format!("/images/{image}/json"))
            .request()
            .await?;
        let response = Self::expect(response, &[200]).await?;
        self.read_json(response).await
    }

    /// Removes an image.
    ///
    /// # Errors
    ///
    /// Returns [`DockerError::Daemon`] for any status other than 200.
    pub async fn remove_image(&self, image: &str, force: bool) -> Result<()> {
        let response = self
            .connection()
            .method(Method::DELETE)
            .path(format!("/images/{image}"))
            .query("force", flag(force))
            .request()
            .await?;
        Self::expect(response, &[200]).await?.close();
        Ok(())
    }

    /// Tags an image into a repository.
    ///
    /// # Errors
    ///
    /// Returns [`DockerError::Daemon`] for any status other than 201.
    pub async fn tag(&self, image: &str, repository: &str, tag: Option<&str>) -> Result<()> {
        let mut connection = self
            .connection()
            .method(Method::POST)
            .path(format!("/images/{image}/tag"))
            .query("repo", repository)
            .query("force", 0)
            .header("Content-Type", "text/plain");
        if let Some(tag) = tag {
            connection = connection.query("tag", tag);
        }
        let response = connection.request().await?;
        Self::expect(response, &[201]).await?.close();
        Ok(())
    }

    /// Pushes a repository to a registry, streaming progress to `monitor`.
    ///
    /// # Errors
    ///
    /// Returns [`DockerError::Daemon`] for any status other than 200, or the
    /// stream's I/O error if the push breaks mid-way. Cancellation completes
    /// without error.
    pub async fn push(
        &self,
        repository: &str,
        tag: Option<&str>,
        registry: Option<&str>,
        monitor: &mut dyn ProgressMonitor,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let full_repo =
            registry.map_or_else(|| repository.to_string(), |r| format!("{r}/{repository}"));
        let mut connection = self
            .connection()
            .method(Method::POST)
            .path(format!("/images/{full_repo}/push"))
            .header("Content-Type", "text/plain");
        if let Some(auth) = &self.registry_auth {
            connection = connection.header("X-Registry-Auth", auth);
        }
        if let Some(tag) = tag {
            connection = connection.query("tag", tag);
        }
        let response = connection.request().await?;
        let response = Self::expect(response, &[200]).await?;
        self.pump_progress(response, monitor, cancel).await
    }

    /// Pulls an image from a registry, streaming progress to `monitor`.
    ///
    /// To pull from a private registry pass its `host:port` as `registry`;
    /// it is joined onto the image name.
    ///
    /// # Errors
    ///
    /// Returns [`DockerError::Daemon`] for any status other than 200, or the
    /// stream's I/O error if the pull breaks mid-way. Cancellation completes
    /// without error.
    pub async fn pull(
        &self,
        image: &str,
        tag: Option<&str>,
        registry: Option<&str>,
        monitor: &mut dyn ProgressMonitor,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let from_image = registry.map_or_else(|| image.to_string(), |r| format!("{r}/{image}"));
        let mut connection = self
            .connection()
            .method(Method::POST)
            .path("/images/create")
            .query("fromImage", from_image)
            .header("Content-Type", "text/plain");
        if let Some(auth) = &self.registry_auth {
            connection = connection.header("X-Registry-Auth", auth);
        }
        if let Some(tag) = tag {
            connection = connection.query("tag", tag);
        }
        let response = connection.request().await?;
        let response = Self::expect(response, &[200]).await?;
        self.pump_progress(response, monitor, cancel).await
    }

    /// Builds an image from a tar archive containing a Dockerfile, streaming
    /// progress to `monitor`. Returns the built image id.
    ///
    /// The archive is supplied by the caller (packing files into a tar
    /// stream is outside this client); `auth` overrides the connector's
    /// registry credentials for base images pulled during the build.
    ///
    /// # Errors
    ///
    /// Returns [`DockerError::Daemon`] for any status other than 200,
    /// [`DockerError::BuildFailed`] if the stream completes without
    /// reporting a built image id, and [`DockerError::Cancelled`] if
    /// cancelled before an id was seen.
    pub async fn build_image(
        &self,
        repository: Option<&str>,
        tar: &Path,
        monitor: &mut dyn ProgressMonitor,
        auth: Option<&serde_json::Value>,
        cancel: &CancellationToken,
    ) -> Result<String> {
        let archive = tokio::fs::File::open(tar).await?;
        let len = archive.metadata().await?.len();
        let auth_json = auth.map_or_else(
            || {
                self.registry_auth
                    .clone()
                    .unwrap_or_else(|| BASE64.encode("{}"))
            },
            |value| BASE64.encode(value.to_string()),
        );

        let mut connection = self
            .connection()
            .method(Method::POST)
            .path("/build")
            .query("rm", 1)
            .query("pull", 1)
            .header("Content-Type", "application/x-compressed-tar")
            .header("X-Registry-Config", auth_json)
            .entity_file(archive, len);
        if let Some(repository) = repository {
            connection = connection.query("t", repository);
        }
        let response = connection.request().await?;
        let response = Self::expect(response, &[200]).await?;

        let messages: JsonMessageStream<ProgressStatus, _> =
            JsonMessageStream::new(response.into_byte_stream(), Arc::clone(&self.convention));
        let mut image_id = None;
        pump(
            messages,
            |status| {
                if let Some(id) = progress::build_image_id(&status) {
                    image_id = Some(id);
                }
                monitor.update_progress(&status);
            },
            cancel,
        )
        .await?;

        match image_id {
            Some(id) => Ok(id),
            None if cancel.is_cancelled() => Err(DockerError::Cancelled),
            None => Err(DockerError::BuildFailed),
        }
    }

    // ------------------------------------------------------------------
    // Container operations
    // ------------------------------------------------------------------

    /// Creates a container.
    ///
    /// # Errors
    ///
    /// Returns [`DockerError::Daemon`] for any status other than 201.
    pub async fn create_container(
        &self,
        config: &ContainerConfig,
        name: Option<&str>,
    ) -> Result<ContainerCreated> {
        let entity = self.json_entity(config)?;
        let mut connection = self
            .connection()
            .method(Method::POST)
            .path("/containers/create")
            .header("Content-Type", "application/json")
            .entity(entity);
        if let Some(name) = name {
            connection = connection.query("name", name);
        }
        let response = connection.request().await?;
        let response = Self::expect(response, &[201]).await?;
        self.read_json(response).await
    }

    /// Starts a container.
    ///
    /// A 200 response is a daemon warning (e.g. a deprecated storage
    /// backend): it is logged and treated as success.
    ///
    /// # Errors
    ///
    /// Returns [`DockerError::Daemon`] for any status other than
    /// 200/204/304.
    pub async fn start_container(
        &self,
        container: &str,
        host_config: Option<&HostConfig>,
    ) -> Result<()> {
        let entity = match host_config {
            Some(config) => self.json_entity(config)?,
            None => b"{}".to_vec(),
        };
        let response = self
            .connection()
            .method(Method::POST)
            .path(format!("/containers/{container}/start"))
            .header("Content-Type", "application/json")
            .entity(entity)
            .request()
            .await?;
        match response.status().as_u16() {
            204 | 304 => {
                response.close();
                Ok(())
            }
            200 => {
                let body = response.collect().await?;
                warn!(
                    container,
                    "daemon returned a warning on container start: {}",
                    String::from_utf8_lossy(&body)
                );
                Ok(())
            }
            _ => Err(Self::daemon_error(response).await),
        }
    }

    /// Stops a container, waiting up to `timeout` before the daemon kills
    /// it. A 304 (already stopped) is success.
    ///
    /// # Errors
    ///
    /// Returns [`DockerError::Daemon`] for any status other than 204/304.
    pub async fn stop_container(&self, container: &str, timeout: Duration) -> Result<()> {
        let response = self
            .connection()
            .method(Method::POST)
            .path(format!("/containers/{container}/stop"))
            .query("t", timeout.as_secs())
            .header("Content-Type", "text/plain")
            .request()
            .await?;
        Self::expect(response, &[204, 304]).await?.close();
        Ok(())
    }

    /// Kills a container with SIGKILL.
    ///
    /// # Errors
    ///
    /// Returns [`DockerError::Daemon`] for any status other than 204.
    pub async fn kill_container(&self, container: &str) -> Result<()> {
        self.kill_container_with_signal(container, DEFAULT_KILL_SIGNAL)
            .await
    }

    /// Kills a container with the given signal number.
    ///
    /// # Errors
    ///
    /// Returns [`DockerError::Daemon`] for any status other than 204.
    pub async fn kill_container_with_signal(&self, container: &str, signal: i32) -> Result<()> {
        let response = self
            .connection()
            .method(Method::POST)
            .path(format!("/containers/{container}/kill"))
            .query("signal", signal)
            .header("Content-Type", "text/plain")
            .request()
            .await?;
        Self::expect(response, &[204]).await?.close();
        Ok(())
    }

    /// Removes a container; `force` kills a running container first,
    /// `remove_volumes` also removes its volumes.
    ///
    /// # Errors
    ///
    /// Returns [`DockerError::Daemon`] for any status other than 204.
    pub async fn remove_container(
        &self,
        container: &str,
        force: bool,
        remove_volumes: bool,
    ) -> Result<()> {
        let response = self
            .connection()
            .method(Method::DELETE)
            .path(format!("/containers/{container}"))
            .query("force", flag(force))
            .query("v", flag(remove_volumes))
            .request()
            .await?;
        Self::expect(response, &[204]).await?.close();
        Ok(())
    }

    /// Blocks until the container stops, then returns its exit code.
    ///
    /// # Errors
    ///
    /// Returns [`DockerError::Daemon`] for any status other than 200.
    pub async fn wait_container(&self, container: &str) -> Result<i64> {
        let response = self
            .connection()
            .method(Method::POST)
            .path(format!("/containers/{container}/wait"))
            .header("Content-Type", "text/plain")
            .request()
            .await?;
        let response = Self::expect(response, &[200]).await?;
        let status: ContainerExitStatus = self.read_json(response).await?;
        Ok(status.status_code)
    }

    /// Gets detailed information about a container.
    ///
    /// # Errors
    ///
    /// Returns [`DockerError::Daemon`] for any status other than 200.
    pub async fn inspect_container(&self, container: &str) -> Result<ContainerInfo> {
        let response = self
            .connection()
            .method(Method::GET)
            .path(format!("/containers/{container}/json"))
            .request()
            .await?;
        let response = Self::expect(response, &[200]).await?;
        self.read_json(response).await
    }

    /// Lists processes running inside a container. Extra `ps` arguments are
    /// percent-encoded individually and joined with `+`.
    ///
    /// # Errors
    ///
    /// Returns [`DockerError::Daemon`] for any status other than 200.
    pub async fn top(&self, container: &str, ps_args: &[&str]) -> Result<ContainerProcesses> {
        let mut connection = self
            .connection()
            .method(Method::GET)
            .path(format!("/containers/{container}/top"))
            .header("Content-Type", "text/plain");
        if !ps_args.is_empty() {
            connection = connection.query("ps_args", join_ps_args(ps_args));
        }
        let response = connection.request().await?;
        let response = Self::expect(response, &[200]).await?;
        self.read_json(response).await
    }

    /// Copies a file or directory out of a container into `host_path`.
    ///
    /// The daemon answers with a tar archive; it is spooled to a temp file
    /// and unpacked from there, because the chunked body confuses streaming
    /// unpackers. The spool file is removed on every path.
    ///
    /// # Errors
    ///
    /// Returns [`DockerError::Daemon`] for any status other than 200, or an
    /// I/O error from spooling/unpacking.
    pub async fn copy(&self, container: &str, path: &str, host_path: &Path) -> Result<()> {
        let entity = self.json_entity(&ContainerResource {
            resource: path.to_string(),
        })?;
        let response = self
            .connection()
            .method(Method::POST)
            .path(format!("/containers/{container}/copy"))
            .header("Content-Type", "application/json")
            .entity(entity)
            .request()
            .await?;
        let response = Self::expect(response, &[200]).await?;

        let spool = tempfile::NamedTempFile::new()?;
        let mut spool_file = tokio::fs::File::from_std(spool.reopen()?);
        let mut chunks = response.into_byte_stream();
        while let Some(chunk) = chunks.try_next().await? {
            spool_file.write_all(&chunk).await?;
        }
        spool_file.flush().await?;

        let destination = host_path.to_path_buf();
        tokio::task::spawn_blocking(move || -> std::io::Result<()> {
            let archive = spool.reopen()?;
            tar::Archive::new(archive).unpack(&destination)?;
            drop(spool);
            Ok(())
        })
        .await
        .map_err(|e| DockerError::Io(std::io::Error::other(e)))??;
        Ok(())
    }

    /// Attaches to a container, pumping its output to `processor`.
    ///
    /// With `stream` set the call follows live output and blocks until the
    /// container exits or `cancel` fires; otherwise it replays the existing
    /// log and returns.
    ///
    /// # Errors
    ///
    /// Returns [`DockerError::Daemon`] for any status other than 200, or the
    /// stream's I/O error. Cancellation completes without error.
    pub async fn attach_container(
        &self,
        container: &str,
        processor: &mut dyn LogMessageProcessor,
        stream: bool,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let response = self
            .connection()
            .method(Method::POST)
            .path(format!("/containers/{container}/attach"))
            .query("stream", flag(stream))
            .query("logs", flag(!stream))
            .query("stdout", 1)
            .query("stderr", 1)
            .header("Content-Type", "text/plain")
            .request()
            .await?;
        let response = Self::expect(response, &[200]).await?;
        self.pump_logs(response, processor, cancel).await
    }

    /// Creates a new image from a container's changes; returns the image id.
    ///
    /// # Errors
    ///
    /// Returns [`DockerError::Daemon`] for any status other than 201.
    pub async fn commit(
        &self,
        container: &str,
        repository: &str,
        tag: Option<&str>,
        comment: Option<&str>,
        author: Option<&str>,
    ) -> Result<String> {
        let mut connection = self
            .connection()
            .method(Method::POST)
            .path("/commit")
            .query("container", container)
            .query("repo", repository)
            .header("Content-Type", "application/json")
            .entity(&b"{}"[..]);
        if let Some(tag) = tag {
            connection = connection.query("tag", tag);
        }
        if let Some(comment) = comment {
            connection = connection.query("comment", urlencoding::encode(comment));
        }
        if let Some(author) = author {
            connection = connection.query("author", urlencoding::encode(author));
        }
        let response = connection.request().await?;
        let response = Self::expect(response, &[201]).await?;
        let committed: ContainerCommitted = self.read_json(response).await?;
        Ok(committed.id)
    }

    // ------------------------------------------------------------------
    // Exec operations
    // ------------------------------------------------------------------

    /// Creates an exec instance in a running container.
    ///
    /// Unless `detach` is set, stdout and stderr are attached so
    /// [`DockerConnector::start_exec`] can stream them.
    ///
    /// # Errors
    ///
    /// Returns [`DockerError::Daemon`] for any non-2xx status.
    pub async fn create_exec(&self, container: &str, detach: bool, cmd: &[&str]) -> Result<Exec> {
        let exec_config = ExecConfig {
            attach_stdout: !detach,
            attach_stderr: !detach,
            cmd: cmd.iter().map(ToString::to_string).collect(),
            ..ExecConfig::default()
        };
        let entity = self.json_entity(&exec_config)?;
        let response = self
            .connection()
            .method(Method::POST)
            .path(format!("/containers/{container}/exec"))
            .header("Content-Type", "application/json")
            .entity(entity)
            .request()
            .await?;
        let response = Self::expect_success(response).await?;
        let created: ExecCreated = self.read_json(response).await?;
        Ok(Exec::new(created.id, exec_config.cmd))
    }

    /// Starts an exec instance.
    ///
    /// Without a `processor` the exec is started detached. With one, the
    /// exec's multiplexed output is pumped to it until the process exits or
    /// `cancel` fires. The documented status for this call is 201, but
    /// daemons answer 200 or 204 in practice, so any 2xx is accepted.
    ///
    /// # Errors
    ///
    /// Returns [`DockerError::Daemon`] for any non-2xx status, or the
    /// stream's I/O error. Cancellation completes without error.
    pub async fn start_exec(
        &self,
        exec_id: &str,
        processor: Option<&mut dyn LogMessageProcessor>,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let entity = self.json_entity(&ExecStart {
            detach: processor.is_none(),
            tty: false,
        })?;
        let response = self
            .connection()
            .method(Method::POST)
            .path(format!("/exec/{exec_id}/start"))
            .header("Content-Type", "application/json")
            .entity(entity)
            .request()
            .await?;
        let response = Self::expect_success(response).await?;
        let status = response.status().as_u16();
        match processor {
            Some(processor) if status != 204 => self.pump_logs(response, processor, cancel).await,
            _ => {
                response.close();
                Ok(())
            }
        }
    }

    /// Gets detailed information about an exec instance.
    ///
    /// # Errors
    ///
    /// Returns [`DockerError::Daemon`] for any status other than 200.
    pub async fn exec_info(&self, exec_id: &str) -> Result<ExecInfo> {
        let response = self
            .connection()
            .method(Method::GET)
            .path(format!("/exec/{exec_id}/json"))
            .request()
            .await?;
        let response = Self::expect(response, &[200]).await?;
        self.read_json(response).await
    }

    // ------------------------------------------------------------------
    // Plumbing
    // ------------------------------------------------------------------

    fn connection(&self) -> Connection {
        Connection::open(self.endpoint.clone(), self.tls.clone())
    }

    /// Accepts the response if its status is in the operation's set,
    /// otherwise turns it into a daemon error.
    async fn expect(response: Response, accepted: &[u16]) -> Result<Response> {
        if accepted.contains(&response.status().as_u16()) {
            Ok(response)
        } else {
            Err(Self::daemon_error(response).await)
        }
    }

    /// Accepts any 2xx response.
    async fn expect_success(response: Response) -> Result<Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(Self::daemon_error(response).await)
        }
    }

    /// Reads the daemon's message body into a typed error, draining the
    /// response so the connection is released either way.
    async fn daemon_error(response: Response) -> DockerError {
        let status = response.status().as_u16();
        let message = match response.collect().await {
            Ok(body) => String::from_utf8_lossy(&body).into_owned(),
            Err(e) => {
                debug!("failed to read daemon error body: {e}");
                String::new()
            }
        };
        DockerError::Daemon { status, message }
    }

    async fn read_json<T: DeserializeOwned>(&self, response: Response) -> Result<T> {
        let body = response.collect().await?;
        wire::decode(&body, self.convention.as_ref()).map_err(DockerError::Decode)
    }

    fn json_entity<T: Serialize>(&self, value: &T) -> Result<Vec<u8>> {
        wire::encode(value, self.convention.as_ref()).map_err(DockerError::Decode)
    }

    async fn pump_progress(
        &self,
        response: Response,
        monitor: &mut dyn ProgressMonitor,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let messages: JsonMessageStream<ProgressStatus, _> =
            JsonMessageStream::new(response.into_byte_stream(), Arc::clone(&self.convention));
        pump(messages, |status| monitor.update_progress(&status), cancel).await?;
        Ok(())
    }

    async fn pump_logs(
        &self,
        response: Response,
        processor: &mut dyn LogMessageProcessor,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let frames = LogMessageStream::new(response.into_byte_stream());
        pump(frames, |message| processor.process(&message), cancel).await?;
        Ok(())
    }
}

impl std::fmt::Debug for DockerConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DockerConnector")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

/// Encodes a boolean query flag the way the daemon expects: `1`/`0`, never
/// `true`/`false`.
const fn flag(value: bool) -> &'static str {
    if value {
        "1"
    } else {
        "0"
    }
}

/// Joins extra `ps` arguments: each percent-encoded, then `+`-separated.
fn join_ps_args(ps_args: &[&str]) -> String {
    ps_args
        .iter()
        .map(|arg| urlencoding::encode(arg).into_owned())
        .collect::<Vec<_>>()
        .join("+")
}
