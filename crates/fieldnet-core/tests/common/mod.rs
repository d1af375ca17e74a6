// In-memory ubus device for orchestration tests.
//
// Records every call with the (paused) tokio clock so tests can check
// ordering, settle/back-off gaps and run serialization. Every call takes
// `LATENCY` of virtual time.

#![allow(dead_code, clippy::unwrap_used)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use fieldnet_api::{Credentials, RawResponse, Transport, TransportError, UbusClient};
use serde_json::{Value, json};
use tokio::time::Instant;
use url::Url;

pub const LATENCY: Duration = Duration::from_millis(10);

pub const TOKEN: &str = "c0ffeec0ffeec0ffeec0ffeec0ffee00";

/// `(object, method, args, forms posted so far)` -> payload.
type Handler = Box<dyn Fn(&str, &str, &Value, usize) -> Option<Value> + Send + Sync>;

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub object: String,
    pub method: String,
    pub args: Value,
    pub started: Instant,
    pub finished: Instant,
}

impl RecordedCall {
    pub fn name(&self) -> String {
        format!("{} {}", self.object, self.method)
    }

    /// `values.proto` of a `uci set`, if any.
    pub fn proto(&self) -> Option<&str> {
        self.args["values"]["proto"].as_str()
    }
}

#[derive(Debug, Clone)]
pub struct RecordedForm {
    pub path: String,
    pub fields: Vec<(String, String)>,
}

#[derive(Debug, Clone, Copy)]
pub enum Reply {
    /// ubus result code.
    Code(i64),
    Timeout,
}

struct Rule {
    object: String,
    method: String,
    reply: Reply,
    remaining: Option<usize>,
}

#[derive(Default)]
struct State {
    calls: Mutex<Vec<RecordedCall>>,
    forms: Mutex<Vec<RecordedForm>>,
    rules: Mutex<Vec<Rule>>,
    handler: Mutex<Option<Handler>>,
}

#[derive(Clone, Default)]
pub struct FakeDevice {
    state: Arc<State>,
}

impl FakeDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer calls with payloads from `handler`; `None` answers `[0]`.
    pub fn with_handler(
        handler: impl Fn(&str, &str, &Value, usize) -> Option<Value> + Send + Sync + 'static,
    ) -> Self {
        let device = Self::default();
        *device.state.handler.lock().unwrap() = Some(Box::new(handler));
        device
    }

    /// Fail every matching call.
    pub fn fail(&self, object: &str, method: &str, reply: Reply) {
        self.push_rule(object, method, reply, None);
    }

    /// Fail the next `times` matching calls.
    pub fn fail_times(&self, object: &str, method: &str, reply: Reply, times: usize) {
        self.push_rule(object, method, reply, Some(times));
    }

    fn push_rule(&self, object: &str, method: &str, reply: Reply, remaining: Option<usize>) {
        self.state.rules.lock().unwrap().push(Rule {
            object: object.into(),
            method: method.into(),
            reply,
            remaining,
        });
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state.calls.lock().unwrap().clone()
    }

    pub fn forms(&self) -> Vec<RecordedForm> {
        self.state.forms.lock().unwrap().clone()
    }

    pub fn count(&self, name: &str) -> usize {
        self.calls().iter().filter(|c| c.name() == name).count()
    }

    fn failure(&self, object: &str, method: &str) -> Option<Reply> {
        let mut rules = self.state.rules.lock().unwrap();
        let rule = rules.iter_mut().find(|r| {
            r.object == object && r.method == method && r.remaining.is_none_or(|n| n > 0)
        })?;
        if let Some(n) = rule.remaining.as_mut() {
            *n -= 1;
        }
        Some(rule.reply)
    }

    fn payload(&self, object: &str, method: &str, args: &Value) -> Option<Value> {
        let forms = self.state.forms.lock().unwrap().len();
        let handler = self.state.handler.lock().unwrap();
        handler.as_ref().and_then(|h| h(object, method, args, forms))
    }
}

fn envelope(result: Value) -> RawResponse {
    RawResponse::new(
        200,
        json!({ "jsonrpc": "2.0", "id": 1, "result": result }).to_string(),
    )
}

impl Transport for FakeDevice {
    async fn post_json(
        &self,
        _url: &Url,
        body: &Value,
        _timeout: Duration,
    ) -> Result<RawResponse, TransportError> {
        let params = &body["params"];
        let object = params[1].as_str().unwrap_or_default().to_owned();
        let method = params[2].as_str().unwrap_or_default().to_owned();
        let args = params[3].clone();

        let started = Instant::now();
        tokio::time::sleep(LATENCY).await;
        let finished = Instant::now();

        let failure = self.failure(&object, &method);
        let payload = self.payload(&object, &method, &args);
        self.state.calls.lock().unwrap().push(RecordedCall {
            object: object.clone(),
            method: method.clone(),
            args,
            started,
            finished,
        });

        match failure {
            Some(Reply::Timeout) => Err(TransportError::Timeout),
            Some(Reply::Code(code)) => Ok(envelope(json!([code]))),
            None if object == "session" && method == "login" => Ok(envelope(json!([
                0,
                { "ubus_rpc_session": TOKEN, "expires": 300 }
            ]))),
            None => Ok(envelope(match payload {
                Some(payload) => json!([0, payload]),
                None => json!([0]),
            })),
        }
    }

    async fn post_form(
        &self,
        url: &Url,
        form: &[(&str, &str)],
        _timeout: Duration,
    ) -> Result<RawResponse, TransportError> {
        tokio::time::sleep(LATENCY).await;
        self.state.forms.lock().unwrap().push(RecordedForm {
            path: url.path().to_owned(),
            fields: form
                .iter()
                .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
                .collect(),
        });
        Ok(RawResponse::new(200, ""))
    }
}

pub fn client(device: &FakeDevice) -> UbusClient<FakeDevice> {
    UbusClient::with_transport(
        device.clone(),
        "10.0.100.2",
        Credentials::new("root", "fieldnet"),
    )
    .unwrap()
}
