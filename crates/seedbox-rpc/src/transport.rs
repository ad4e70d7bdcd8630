//! Session-token HTTP transport.
//!
//! The daemon rejects requests lacking a current session token with
//! `409 Conflict`, handing the token back in `X-Transmission-Session-Id`.
//! [`Transport::execute`] stores that token and re-sends the request once.
//! Later calls attach the stored token up front until the daemon rotates it.

use std::fmt;
use std::sync::RwLock;

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{StatusCode, Url};
use tracing::{debug, trace};
use zeroize::Zeroize;

use crate::context::CallContext;
use crate::error::{Phase, RpcError};

/// Request and response header carrying the session token.
pub const SESSION_ID_HEADER: &str = "X-Transmission-Session-Id";

/// Endpoint path appended to the daemon host when none is configured.
pub const DEFAULT_RPC_PATH: &str = "transmission/rpc";

/// HTTP basic-auth credentials. The password is wiped on drop.
#[derive(Clone, Default)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// The raw password. Only the transport needs this.
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl Drop for Credentials {
    fn drop(&mut self) {
        self.password.zeroize();
    }
}

/// One authenticated POST per call, plus the session-token handshake.
#[derive(Debug)]
pub struct Transport {
    http: reqwest::Client,
    endpoint: Url,
    credentials: Credentials,
    session_id: RwLock<Option<String>>,
}

impl Transport {
    pub fn new(http: reqwest::Client, endpoint: Url, credentials: Credentials) -> Self {
        Self {
            http,
            endpoint,
            credentials,
            session_id: RwLock::new(None),
        }
    }

    /// Fully resolved RPC endpoint URL.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// The token currently attached to outgoing requests.
    pub fn session_id(&self) -> Option<String> {
        self.session_id
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn store_session_id(&self, token: String) {
        *self.session_id.write().unwrap_or_else(|e| e.into_inner()) = Some(token);
    }

    /// Send `body` and return the raw body of a 2xx answer.
    ///
    /// Performs at most two HTTP exchanges: the initial request and, after a
    /// `409` carrying a token, one retry with that token attached. The whole
    /// exchange is raced against `ctx`.
    pub async fn execute(&self, ctx: &CallContext, body: Vec<u8>) -> Result<Vec<u8>, RpcError> {
        ctx.guard(self.exchange(body)).await
    }

    async fn exchange(&self, body: Vec<u8>) -> Result<Vec<u8>, RpcError> {
        let current = self.session_id();
        let mut response = self
            .send(body.clone(), Phase::Initial, current.as_deref())
            .await?;

        if response.status() == StatusCode::CONFLICT {
            let token = response
                .headers()
                .get(SESSION_ID_HEADER)
                .and_then(|v| v.to_str().ok())
                .filter(|v| !v.is_empty())
                .ok_or(RpcError::MissingSessionToken)?
                .to_string();
            debug!(endpoint = %self.endpoint, "daemon issued a new session id, retrying");
            self.store_session_id(token.clone());
            // The retry carries the token this 409 issued, even if another
            // call has stored a newer one in the meantime.
            response = self.send(body, Phase::SessionRetry, Some(&token)).await?;
        }

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|source| RpcError::Connection {
                phase: Phase::ReadBody,
                source,
            })?;

        if !status.is_success() {
            return Err(RpcError::UnexpectedStatus {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }

        trace!(status = status.as_u16(), len = bytes.len(), "daemon answered");
        Ok(bytes.to_vec())
    }

    async fn send(
        &self,
        body: Vec<u8>,
        phase: Phase,
        session_id: Option<&str>,
    ) -> Result<reqwest::Response, RpcError> {
        let mut request = self
            .http
            .post(self.endpoint.clone())
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .basic_auth(&self.credentials.username, Some(&self.credentials.password));

        if let Some(token) = session_id {
            request = request.header(SESSION_ID_HEADER, token);
        }

        request
            .body(body)
            .send()
            .await
            .map_err(|source| RpcError::Connection { phase, source })
    }
}
