//! Transport seam between the client and the daemon
//!
//! The client only ever talks to a [`Transport`]: production code binds it to
//! [`ReqwestTransport`], tests bind it to a scripted double. Response bodies
//! are owned byte streams; dropping a [`DaemonResponse`] releases its
//! connection.

use crate::errors::{ClientError, Result};
use async_trait::async_trait;
use bytes::Bytes;
use futures_util::{Stream, StreamExt, TryStreamExt};
use reqwest::{Client, Method, StatusCode, Url};
use std::pin::Pin;
use std::time::Duration;

/// Default loopback TCP port of the model runner
pub const DEFAULT_DAEMON_PORT: u16 = 12434;

/// Loopback address every request is dialed to
const LOOPBACK_HOST: &str = "127.0.0.1";

/// Chunked response body
pub type BodyStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

/// A fully built daemon request
#[derive(Debug, Clone)]
pub struct DaemonRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl DaemonRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Attach a JSON body and its content type
    pub fn with_json_body(mut self, body: Vec<u8>) -> Self {
        self.headers
            .push(("Content-Type".to_string(), "application/json".to_string()));
        self.body = Some(body);
        self
    }

    /// Look up a header value, case-insensitively
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Daemon response: status plus a not-yet-read body
pub struct DaemonResponse {
    pub status: StatusCode,
    body: BodyStream,
}

impl DaemonResponse {
    pub fn new(status: StatusCode, body: BodyStream) -> Self {
        Self { status, body }
    }

    /// Response whose whole body is already in memory
    pub fn from_bytes(status: StatusCode, body: impl Into<Bytes>) -> Self {
        let chunk: Bytes = body.into();
        Self::new(
            status,
            Box::pin(futures_util::stream::iter(vec![Ok::<Bytes, ClientError>(chunk)])),
        )
    }

    pub fn into_body(self) -> BodyStream {
        self.body
    }

    /// Drain the body into memory
    pub async fn bytes(self) -> Result<Vec<u8>> {
        let chunks: Vec<Bytes> = self.body.try_collect().await?;
        Ok(chunks.concat())
    }

    /// Drain the body as (lossy) UTF-8 text
    pub async fn text(self) -> Result<String> {
        let bytes = self.bytes().await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

impl std::fmt::Debug for DaemonResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DaemonResponse")
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

/// Capability to send one request and get one response back
///
/// Implementations must be safe to share between concurrent calls; the
/// client holds no other state.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: DaemonRequest) -> Result<DaemonResponse>;
}

/// HTTP transport dialing the daemon on the loopback interface
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    port: u16,
}

impl ReqwestTransport {
    /// Create transport with default settings
    pub fn new() -> Result<Self> {
        Self::with_config(DEFAULT_DAEMON_PORT, None)
    }

    /// Create transport for a given loopback port and optional timeout
    pub fn with_config(port: u16, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ClientError::wrap("error creating HTTP client", e))?;

        Ok(Self { client, port })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Point a daemon URL at the loopback port, keeping path and query
    fn target(&self, url: &str) -> Result<Url> {
        let mut target =
            Url::parse(url).map_err(|e| ClientError::wrap("error creating request", e))?;
        target
            .set_host(Some(LOOPBACK_HOST))
            .map_err(|e| ClientError::wrap("error creating request", e))?;
        target
            .set_port(Some(self.port))
            .map_err(|_| ClientError::generic(format!("error creating request: cannot set port on {}", url)))?;
        Ok(target)
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: DaemonRequest) -> Result<DaemonResponse> {
        let target = self.target(&request.url)?;

        let mut builder = self.client.request(request.method, target);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_connect() {
                ClientError::ServiceUnavailable
            } else {
                ClientError::Generic {
                    message: e.to_string(),
                    source: Some(Box::new(e)),
                }
            }
        })?;

        let status = response.status();
        let body = response.bytes_stream().map(|chunk| {
            chunk.map_err(|e| ClientError::Generic {
                message: e.to_string(),
                source: Some(Box::new(e)),
            })
        });

        Ok(DaemonResponse::new(status, Box::pin(body)))
    }
}
