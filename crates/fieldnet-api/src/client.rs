// ubus protocol client
//
// Owns the session token and turns calls into JSON-RPC envelopes posted
// to `http://<host>/ubus`. Every response is classified here before the
// caller sees it: HTTP status first, then the ubus result code. Endpoint
// modules (ethernet, wireless, legacy) add typed operations as inherent
// methods in their own files.

use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::{debug, trace, warn};
use url::Url;

use crate::call::UbusCall;
use crate::error::Error;
use crate::models::{self, ACCESS_DENIED, LoginPayload, RpcRequest, RpcResponse};
use crate::session::{Credentials, SessionToken};
use crate::transport::{HttpTransport, RawResponse, Transport, TransportConfig, TransportError};

/// Per-call timeout used unless the caller configures another.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const UBUS_PATH: &str = "/ubus";

/// Session-based client for one device's ubus endpoint.
///
/// The session token is owned state: [`login`](Self::login) replaces it,
/// so it takes `&mut self`. Sharing one client between concurrent
/// sequences of calls is prevented by construction; wrap it in a mutex
/// when several tasks need it.
pub struct UbusClient<T = HttpTransport> {
    transport: T,
    base_url: Url,
    endpoint: Url,
    credentials: Credentials,
    timeout: Duration,
    token: SessionToken,
}

impl UbusClient<HttpTransport> {
    /// Create a client for `host` (`10.0.100.2`, `switch.local:8080`, or a
    /// full `http://` URL) using a fresh `reqwest` transport.
    pub fn new(host: &str, credentials: Credentials) -> Result<Self, Error> {
        let transport = HttpTransport::new(&TransportConfig::default())?;
        Self::with_transport(transport, host, credentials)
    }
}

impl<T: Transport> UbusClient<T> {
    /// Create a client over an arbitrary [`Transport`].
    pub fn with_transport(transport: T, host: &str, credentials: Credentials) -> Result<Self, Error> {
        let base_url = base_url_for_host(host)?;
        let endpoint = base_url.join(UBUS_PATH)?;
        Ok(Self {
            transport,
            base_url,
            endpoint,
            credentials,
            timeout: DEFAULT_TIMEOUT,
            token: SessionToken::sentinel(),
        })
    }

    /// Override the per-call timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn token(&self) -> &SessionToken {
        &self.token
    }

    pub fn is_authenticated(&self) -> bool {
        !self.token.is_sentinel()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    // ── Session ──────────────────────────────────────────────────────

    /// Authenticate with `session.login` and store the returned token.
    ///
    /// The held token is reset to the sentinel first, so a failed login
    /// never leaves a stale session behind.
    pub async fn login(&mut self) -> Result<&SessionToken, Error> {
        self.token = SessionToken::sentinel();
        let args = self.credentials.login_args();
        let body = RpcRequest::call(SessionToken::SENTINEL, "session", "login", &args).to_value();

        debug!(url = %self.endpoint, username = %self.credentials.username, "logging in");

        let resp = match self.transport.post_json(&self.endpoint, &body, self.timeout).await {
            Ok(resp) => resp,
            Err(TransportError::Timeout) => {
                return Err(Error::LoginTimeout {
                    timeout_secs: self.timeout.as_secs(),
                });
            }
            Err(TransportError::Connection(source)) => {
                return Err(Error::Connection {
                    url: self.endpoint.to_string(),
                    source,
                });
            }
        };

        if resp.status >= 400 {
            return Err(Error::Login {
                message: format!("HTTP {}", resp.status),
            });
        }

        let result = RpcResponse::parse(&resp.body)
            .and_then(|envelope| envelope.result(&resp.body))
            .map_err(|e| Error::Login {
                message: e.to_string(),
            })?;

        let token = match result {
            Some(models::RpcResult {
                code: 0,
                payload: Some(payload),
            }) => serde_json::from_value::<LoginPayload>(payload)
                .map(|p| p.ubus_rpc_session)
                .map_err(|e| Error::Login {
                    message: format!("missing session token: {e}"),
                })?,
            Some(models::RpcResult { code, .. }) => {
                return Err(Error::Login {
                    message: format!("ubus result code {code}"),
                });
            }
            None => {
                return Err(Error::Login {
                    message: "response carried no result".into(),
                });
            }
        };

        let token = SessionToken::new(token);
        if token.is_sentinel() {
            return Err(Error::Login {
                message: "device returned the anonymous session".into(),
            });
        }

        debug!("login successful");
        self.token = token;
        Ok(&self.token)
    }

    /// Forget the current session. No device call is made; the token
    /// simply expires on the device side.
    pub fn logout(&mut self) {
        self.token = SessionToken::sentinel();
    }

    // ── Calls ────────────────────────────────────────────────────────

    /// Issue a raw ubus call and return its payload (`Null` when the
    /// device only reported a status).
    pub async fn call(
        &self,
        object: &str,
        method: &str,
        args: serde_json::Value,
    ) -> Result<serde_json::Value, Error> {
        let token = self.session()?;
        let body = RpcRequest::call(token, object, method, &args).to_value();

        debug!(object, method, "ubus call");

        let resp = self.post_json(&body).await?;
        classify_status(resp.status)?;

        let envelope = RpcResponse::parse(&resp.body)?;
        match envelope.result(&resp.body)? {
            Some(result) if result.code == 0 => {
                trace!(object, method, "ubus call succeeded");
                Ok(result.payload.unwrap_or(serde_json::Value::Null))
            }
            Some(result) => {
                warn!(object, method, code = result.code, "ubus call returned error");
                Err(Error::Rpc { code: result.code })
            }
            None => match envelope.error {
                Some(err) if err.code == ACCESS_DENIED => Err(Error::Unauthorized { status: None }),
                Some(err) => {
                    warn!(object, method, code = err.code, message = ?err.message, "json-rpc error");
                    Err(Error::Rpc { code: err.code })
                }
                None => Err(Error::Deserialization {
                    message: "envelope has neither result nor error".into(),
                    body: resp.body,
                }),
            },
        }
    }

    /// Run one typed call.
    pub async fn execute(&self, call: &UbusCall) -> Result<serde_json::Value, Error> {
        self.call(&call.object(), call.method(), call.args()).await
    }

    /// Run typed calls strictly in order, stopping at the first failure.
    pub async fn execute_all(&self, calls: &[UbusCall]) -> Result<(), Error> {
        for call in calls {
            self.execute(call).await?;
        }
        Ok(())
    }

    /// Run one typed call and deserialize its payload.
    pub async fn execute_as<R: DeserializeOwned>(&self, call: &UbusCall) -> Result<R, Error> {
        let payload = self.execute(call).await?;
        serde_json::from_value(payload.clone())
            .map_err(|e| models::deserialization(&e, &payload.to_string()))
    }

    /// `system board`
    pub async fn system_board(&self) -> Result<serde_json::Value, Error> {
        self.execute(&UbusCall::SystemBoard).await
    }

    /// `network.interface.<name> status`
    pub async fn interface_status(&self, interface: &str) -> Result<serde_json::Value, Error> {
        self.execute(&UbusCall::InterfaceStatus {
            interface: interface.to_owned(),
        })
        .await
    }

    /// `network restart`
    pub async fn restart_network(&self) -> Result<(), Error> {
        self.execute(&UbusCall::NetworkRestart).await.map(drop)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// The current token, or `Unauthorized` if no login has succeeded.
    pub(crate) fn session(&self) -> Result<&str, Error> {
        if self.token.is_sentinel() {
            return Err(Error::Unauthorized { status: None });
        }
        Ok(self.token.as_str())
    }

    async fn post_json(&self, body: &serde_json::Value) -> Result<RawResponse, Error> {
        self.transport
            .post_json(&self.endpoint, body, self.timeout)
            .await
            .map_err(|e| self.request_error(e, &self.endpoint))
    }

    /// POST a form to a path on the device (legacy CGI endpoints) with the
    /// same classification as [`call`](Self::call), minus the envelope.
    pub(crate) async fn post_form(
        &self,
        path: &str,
        form: &[(&str, &str)],
    ) -> Result<RawResponse, Error> {
        let url = self.base_url.join(path)?;
        debug!(%url, "legacy form post");
        let resp = self
            .transport
            .post_form(&url, form, self.timeout)
            .await
            .map_err(|e| self.request_error(e, &url))?;
        classify_status(resp.status)?;
        Ok(resp)
    }

    fn request_error(&self, err: TransportError, url: &Url) -> Error {
        match err {
            TransportError::Timeout => Error::RequestTimeout {
                timeout_secs: self.timeout.as_secs(),
            },
            TransportError::Connection(source) => Error::Connection {
                url: url.to_string(),
                source,
            },
        }
    }
}

/// Map an HTTP status onto the error taxonomy. 401 always means the
/// session is gone, whatever the body says.
fn classify_status(status: u16) -> Result<(), Error> {
    match status {
        401 => Err(Error::Unauthorized { status: Some(401) }),
        s if s >= 400 => Err(Error::Status { status: s }),
        _ => Ok(()),
    }
}

/// Normalise a configured host into the device's base URL.
pub fn base_url_for_host(host: &str) -> Result<Url, Error> {
    let host = host.trim().trim_end_matches('/');
    if host.contains("://") {
        Ok(Url::parse(host)?)
    } else {
        Ok(Url::parse(&format!("http://{host}"))?)
    }
}
