// HTTP transport for ubus requests.
//
// A single POST per call, bounded by the caller's timeout, no retries.
// Received responses are handed back untouched (non-2xx included) so the
// protocol client can classify them; only timeouts and connection
// failures are reported here.

use std::future::Future;
use std::time::Duration;

use tracing::trace;
use url::Url;

/// A response that made it back from the device, whatever its status.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Failure to obtain any response at all.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The caller-supplied timeout elapsed.
    #[error("request timed out")]
    Timeout,
    /// DNS failure, refused or reset connection.
    #[error("connection failed: {0}")]
    Connection(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// One-shot POST transport to the device.
///
/// Production code uses [`HttpTransport`]; tests substitute an in-memory
/// implementation that records what the client sends.
pub trait Transport: Send + Sync {
    /// POST a JSON body.
    fn post_json(
        &self,
        url: &Url,
        body: &serde_json::Value,
        timeout: Duration,
    ) -> impl Future<Output = Result<RawResponse, TransportError>> + Send;

    /// POST a form-encoded body (legacy CGI endpoints).
    fn post_form(
        &self,
        url: &Url,
        form: &[(&str, &str)],
        timeout: Duration,
    ) -> impl Future<Output = Result<RawResponse, TransportError>> + Send;
}

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Upper bound applied by the client itself; per-call timeouts are
    /// passed on every request and normally sit below this.
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: concat!("fieldnet/", env!("CARGO_PKG_VERSION")).into(),
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, crate::error::Error> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(&self.user_agent)
            .build()
            .map_err(|e| crate::error::Error::Client(e.to_string()))
    }
}

/// [`Transport`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
}

impl HttpTransport {
    pub fn new(config: &TransportConfig) -> Result<Self, crate::error::Error> {
        Ok(Self {
            http: config.build_client()?,
        })
    }

    /// Wrap a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }

    async fn send(builder: reqwest::RequestBuilder) -> Result<RawResponse, TransportError> {
        let resp = builder.send().await.map_err(classify)?;
        let status = resp.status().as_u16();
        let body = resp.text().await.map_err(classify)?;
        trace!(status, len = body.len(), "received response");
        Ok(RawResponse { status, body })
    }
}

impl Transport for HttpTransport {
    async fn post_json(
        &self,
        url: &Url,
        body: &serde_json::Value,
        timeout: Duration,
    ) -> Result<RawResponse, TransportError> {
        Self::send(self.http.post(url.clone()).json(body).timeout(timeout)).await
    }

    async fn post_form(
        &self,
        url: &Url,
        form: &[(&str, &str)],
        timeout: Duration,
    ) -> Result<RawResponse, TransportError> {
        Self::send(self.http.post(url.clone()).form(form).timeout(timeout)).await
    }
}

fn classify(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Connection(Box::new(err))
    }
}
