//! Scriptable fake of the daemon's RPC endpoint.
//!
//! [`FakeDaemon`] binds an axum server on `127.0.0.1:0` and answers every
//! POST from, in order of precedence:
//!
//! 1. the session-id check, when enabled (`409` plus a fresh token),
//! 2. the queue of [`ScriptedResponse`]s pushed by the test,
//! 3. canned `arguments` registered per RPC method name,
//! 4. a `"method name not recognized"` envelope.
//!
//! Every request is recorded (path, headers, body) for later assertions.
//! The server stops when the [`FakeDaemon`] is dropped.

use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

/// Header carrying the daemon's session token.
pub const SESSION_ID_HEADER: &str = "x-transmission-session-id";

/// One canned HTTP answer.
#[derive(Debug, Clone)]
pub struct ScriptedResponse {
    pub status: StatusCode,
    pub headers: Vec<(HeaderName, HeaderValue)>,
    pub body: String,
}

impl ScriptedResponse {
    /// A `200` with a success envelope wrapping `arguments`.
    pub fn success(arguments: Value) -> Self {
        Self::json(json!({"result": "success", "arguments": arguments}))
    }

    /// A `200` with a domain-error envelope.
    pub fn failure(message: &str) -> Self {
        Self::json(json!({"result": message, "arguments": {}}))
    }

    /// A `200` with an arbitrary JSON body.
    pub fn json(body: Value) -> Self {
        Self {
            status: StatusCode::OK,
            headers: vec![(
                HeaderName::from_static("content-type"),
                HeaderValue::from_static("application/json"),
            )],
            body: body.to_string(),
        }
    }

    /// A `409 Conflict` handing out `token`.
    pub fn conflict(token: &str) -> Self {
        Self {
            status: StatusCode::CONFLICT,
            headers: vec![(
                HeaderName::from_static(SESSION_ID_HEADER),
                HeaderValue::from_str(token).expect("session token must be a valid header value"),
            )],
            body: "<h1>409: Conflict</h1>".to_string(),
        }
    }

    /// A `409 Conflict` with no session header.
    pub fn conflict_without_token() -> Self {
        Self::status(409, "<h1>409: Conflict</h1>")
    }

    /// Any status with a plain-text body.
    pub fn status(code: u16, body: &str) -> Self {
        Self {
            status: StatusCode::from_u16(code).expect("valid HTTP status code"),
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    fn into_http(self) -> Response {
        let mut response = (self.status, self.body).into_response();
        for (name, value) in self.headers {
            response.headers_mut().insert(name, value);
        }
        response
    }
}

/// A request as the fake daemon saw it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        let name = name.to_ascii_lowercase();
        self.headers
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
    }

    /// The session token the client attached, if any.
    pub fn session_id(&self) -> Option<&str> {
        self.header(SESSION_ID_HEADER)
    }

    /// The body parsed as JSON (`Value::Null` when it is not JSON).
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or(Value::Null)
    }

    /// The `method` field of the request envelope.
    pub fn method(&self) -> Option<String> {
        self.json().get("method").and_then(Value::as_str).map(str::to_string)
    }
}

#[derive(Debug, Default)]
enum SessionMode {
    #[default]
    Off,
    /// Accept only this token.
    Fixed(String),
    /// Hand out a new token on every conflict; accept any issued one.
    Rotating { issued: Vec<String> },
}

#[derive(Debug, Default)]
struct DaemonState {
    session: SessionMode,
    script: VecDeque<ScriptedResponse>,
    methods: HashMap<String, Value>,
    requests: Vec<RecordedRequest>,
    delay: Option<Duration>,
}

/// A running fake daemon. Dropping it stops the server.
pub struct FakeDaemon {
    addr: SocketAddr,
    state: Arc<Mutex<DaemonState>>,
    shutdown: CancellationToken,
}

impl FakeDaemon {
    /// Bind on an ephemeral localhost port and start serving.
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind fake daemon");
        let addr = listener.local_addr().expect("listener has a local address");

        let state = Arc::new(Mutex::new(DaemonState::default()));
        let shutdown = CancellationToken::new();

        let app = axum::Router::new()
            .fallback(handle_rpc)
            .with_state(state.clone());
        let stop = shutdown.clone();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app)
                .with_graceful_shutdown(async move { stop.cancelled().await })
                .await;
        });

        Self {
            addr,
            state,
            shutdown,
        }
    }

    /// Base URL of the fake, e.g. `http://127.0.0.1:41234`.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Queue a response; queued responses are served first-in first-out.
    pub fn push(&self, response: ScriptedResponse) -> &Self {
        self.lock().script.push_back(response);
        self
    }

    /// Answer `method` with a success envelope carrying `arguments`
    /// whenever the script queue is empty.
    pub fn on_method(&self, method: &str, arguments: Value) -> &Self {
        self.lock().methods.insert(method.to_string(), arguments);
        self
    }

    /// Require `token` on every request, answering `409` otherwise.
    pub fn require_session_id(&self, token: &str) -> &Self {
        self.lock().session = SessionMode::Fixed(token.to_string());
        self
    }

    /// Issue a new token (`session-1`, `session-2`, ...) on every conflict
    /// and accept any token issued so far.
    pub fn rotate_session_ids(&self) -> &Self {
        self.lock().session = SessionMode::Rotating { issued: Vec::new() };
        self
    }

    /// Every token handed out so far in rotating mode.
    pub fn issued_session_ids(&self) -> Vec<String> {
        match &self.lock().session {
            SessionMode::Rotating { issued } => issued.clone(),
            SessionMode::Fixed(token) => vec![token.clone()],
            SessionMode::Off => Vec::new(),
        }
    }

    /// Wait this long before answering each request.
    pub fn set_delay(&self, delay: Duration) -> &Self {
        self.lock().delay = Some(delay);
        self
    }

    /// All requests received so far, in arrival order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.lock().requests.clone()
    }

    pub fn request_count(&self) -> usize {
        self.lock().requests.len()
    }

    fn lock(&self) -> MutexGuard<'_, DaemonState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Drop for FakeDaemon {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn handle_rpc(
    State(state): State<Arc<Mutex<DaemonState>>>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let recorded = RecordedRequest {
        path: uri.path().to_string(),
        headers: headers
            .iter()
            .map(|(k, v)| {
                (
                    k.as_str().to_string(),
                    v.to_str().unwrap_or_default().to_string(),
                )
            })
            .collect(),
        body: body.to_vec(),
    };

    let (response, delay) = {
        let mut state = state.lock().unwrap_or_else(|e| e.into_inner());
        let response = respond(&mut state, &recorded);
        state.requests.push(recorded);
        (response, state.delay)
    };

    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
    response.into_http()
}

fn respond(state: &mut DaemonState, request: &RecordedRequest) -> ScriptedResponse {
    let presented = request.session_id();
    match &mut state.session {
        SessionMode::Off => {}
        SessionMode::Fixed(token) => {
            if presented != Some(token.as_str()) {
                return ScriptedResponse::conflict(token);
            }
        }
        SessionMode::Rotating { issued } => {
            if !presented.is_some_and(|p| issued.iter().any(|t| t == p)) {
                let token = format!("session-{}", issued.len() + 1);
                issued.push(token.clone());
                return ScriptedResponse::conflict(&token);
            }
        }
    }

    if let Some(scripted) = state.script.pop_front() {
        return scripted;
    }

    match request.method().and_then(|m| state.methods.get(&m)) {
        Some(arguments) => ScriptedResponse::success(arguments.clone()),
        None => ScriptedResponse::failure("method name not recognized"),
    }
}
