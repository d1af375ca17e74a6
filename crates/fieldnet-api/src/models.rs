// ubus wire types
//
// Request envelope plus the payload shapes returned by the wifi queries.
// Payload fields use `#[serde(default)]` liberally because iwinfo and
// hostapd omit keys depending on driver and firmware version.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// JSON-RPC error code rpcd answers with when a session is unknown or expired.
pub const ACCESS_DENIED: i64 = -32002;

// ── Envelope ─────────────────────────────────────────────────────────

/// Outgoing ubus call.
///
/// ```json
/// {"jsonrpc":"2.0","id":1,"method":"call","params":[token, object, method, args]}
/// ```
#[derive(Debug, Serialize)]
pub struct RpcRequest<'a> {
    pub jsonrpc: &'static str,
    pub id: u32,
    pub method: &'static str,
    pub params: (&'a str, &'a str, &'a str, &'a serde_json::Value),
}

impl<'a> RpcRequest<'a> {
    pub fn call(
        token: &'a str,
        object: &'a str,
        method: &'a str,
        args: &'a serde_json::Value,
    ) -> Self {
        Self {
            jsonrpc: "2.0",
            id: 1,
            method: "call",
            params: (token, object, method, args),
        }
    }

    pub fn to_value(&self) -> serde_json::Value {
        serde_json::json!({
            "jsonrpc": self.jsonrpc,
            "id": self.id,
            "method": self.method,
            "params": [self.params.0, self.params.1, self.params.2, self.params.3],
        })
    }
}

/// Incoming envelope. Exactly one of `result` / `error` is expected.
#[derive(Debug, Deserialize)]
pub struct RpcResponse {
    #[serde(default)]
    pub result: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    pub error: Option<RpcErrorObject>,
}

/// JSON-RPC level failure (as opposed to a ubus result code).
#[derive(Debug, Deserialize)]
pub struct RpcErrorObject {
    pub code: i64,
    #[serde(default)]
    pub message: Option<String>,
}

/// The `[code, payload]` tuple from a successful JSON-RPC exchange.
/// `payload` is absent for calls that only report a status (`[0]`).
#[derive(Debug, Clone, PartialEq)]
pub struct RpcResult {
    pub code: i64,
    pub payload: Option<serde_json::Value>,
}

impl RpcResponse {
    pub fn parse(body: &str) -> Result<Self, Error> {
        serde_json::from_str(body).map_err(|e| deserialization(&e, body))
    }

    /// Extract the result tuple; `None` if the envelope only carries `error`.
    pub fn result(&self, body: &str) -> Result<Option<RpcResult>, Error> {
        let Some(result) = self.result.as_ref() else {
            return Ok(None);
        };
        let code = result
            .first()
            .and_then(serde_json::Value::as_i64)
            .ok_or_else(|| Error::Deserialization {
                message: "result tuple has no integer status code".into(),
                body: body.to_owned(),
            })?;
        Ok(Some(RpcResult {
            code,
            payload: result.get(1).cloned(),
        }))
    }
}

pub(crate) fn deserialization(err: &serde_json::Error, body: &str) -> Error {
    let preview: String = body.chars().take(200).collect();
    Error::Deserialization {
        message: format!("{err} (body preview: {preview:?})"),
        body: body.to_owned(),
    }
}

// ── Session ──────────────────────────────────────────────────────────

/// Payload of a successful `session.login`.
#[derive(Debug, Deserialize)]
pub struct LoginPayload {
    pub ubus_rpc_session: String,
    #[serde(default)]
    pub expires: Option<u64>,
}

// ── Wireless ─────────────────────────────────────────────────────────

/// `iwinfo info` for one interface.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WifiInfo {
    #[serde(default)]
    pub ssid: Option<String>,
    #[serde(default)]
    pub channel: Option<u32>,
    /// dBm
    #[serde(default)]
    pub signal: Option<i32>,
    /// dBm
    #[serde(default)]
    pub noise: Option<i32>,
    #[serde(default)]
    pub quality: Option<i32>,
    #[serde(default)]
    pub quality_max: Option<i32>,
    /// Catch-all for driver-specific fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// `iwinfo assoclist` wrapper: `{"results": [...]}`.
#[derive(Debug, Deserialize)]
pub struct AssocList {
    #[serde(default)]
    pub results: Vec<AssocStation>,
}

/// One associated station as reported by iwinfo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssocStation {
    pub mac: String,
    #[serde(default)]
    pub signal: Option<i32>,
    #[serde(default)]
    pub noise: Option<i32>,
    /// Milliseconds since the last frame.
    #[serde(default)]
    pub inactive: Option<u64>,
    #[serde(default)]
    pub rx: Option<StationRate>,
    #[serde(default)]
    pub tx: Option<StationRate>,
}

/// Per-direction rate block inside an iwinfo station (kbit/s).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationRate {
    #[serde(default)]
    pub rate: u64,
    #[serde(default)]
    pub mhz: Option<u32>,
}

/// `hostapd.<iface> get_clients` wrapper.
#[derive(Debug, Deserialize)]
pub struct HostapdClients {
    #[serde(default)]
    pub freq: Option<u32>,
    #[serde(default)]
    pub clients: BTreeMap<String, HostapdClient>,
}

/// One hostapd client, keyed by MAC in [`HostapdClients::clients`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HostapdClient {
    #[serde(default)]
    pub authorized: bool,
    /// bit/s
    #[serde(default)]
    pub rate: RxTx,
    /// Airtime counters, µs.
    #[serde(default)]
    pub airtime: RxTx,
    #[serde(default)]
    pub signal: Option<i32>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct RxTx {
    #[serde(default)]
    pub rx: u64,
    #[serde(default)]
    pub tx: u64,
}
