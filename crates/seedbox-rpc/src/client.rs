//! Daemon client and the two generic call shapes every method builds on.

use std::fmt;
use std::time::Duration;

use reqwest::Url;
use seedbox_config::DaemonConfig;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::context::CallContext;
use crate::envelope::{decode_response, encode_request};
use crate::error::{Phase, RpcError};
use crate::transport::{Credentials, DEFAULT_RPC_PATH, Transport};

/// Connection parameters for [`Client::new`].
#[derive(Clone)]
pub struct ClientParams {
    /// Daemon base URL, e.g. `http://localhost:9091`.
    pub host: String,
    pub username: String,
    pub password: String,
    /// Endpoint path resolved against `host`.
    pub rpc_path: String,
    /// Per-request HTTP timeout, independent of the call context.
    pub request_timeout: Option<Duration>,
}

impl Default for ClientParams {
    fn default() -> Self {
        Self {
            host: "http://localhost:9091".to_string(),
            username: String::new(),
            password: String::new(),
            rpc_path: DEFAULT_RPC_PATH.to_string(),
            request_timeout: None,
        }
    }
}

impl fmt::Debug for ClientParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let password = if self.password.is_empty() {
            ""
        } else {
            "[REDACTED]"
        };
        f.debug_struct("ClientParams")
            .field("host", &self.host)
            .field("username", &self.username)
            .field("password", &password)
            .field("rpc_path", &self.rpc_path)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

/// Connection parameters from a `[daemon]` config table.
impl From<&DaemonConfig> for ClientParams {
    fn from(daemon: &DaemonConfig) -> Self {
        Self {
            host: daemon.host.clone(),
            username: daemon.username.clone(),
            password: daemon.password.clone(),
            rpc_path: daemon.rpc_path.clone(),
            request_timeout: Some(daemon.request_timeout()),
        }
    }
}

impl ClientParams {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Self::default()
        }
    }

    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = username.into();
        self.password = password.into();
        self
    }

    /// Resolve `rpc_path` against `host`. A host with a path prefix keeps it.
    pub fn endpoint(&self) -> Result<Url, RpcError> {
        let mut base = Url::parse(&self.host)
            .map_err(|e| RpcError::InvalidUrl(format!("{}: {e}", self.host)))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(RpcError::InvalidUrl(format!(
                "{}: scheme must be http or https",
                self.host
            )));
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        base.join(self.rpc_path.trim_start_matches('/'))
            .map_err(|e| RpcError::InvalidUrl(format!("{}: {e}", self.rpc_path)))
    }
}

/// Typed client for one daemon.
///
/// `Client` is `Send + Sync`; share it behind an `Arc` to call from many
/// tasks. The only mutable state is the session token held by the
/// [`Transport`].
#[derive(Debug)]
pub struct Client {
    transport: Transport,
}

impl Client {
    pub fn new(params: ClientParams) -> Result<Self, RpcError> {
        let mut builder =
            reqwest::Client::builder().user_agent(concat!("seedbox/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = params.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(|source| RpcError::Connection {
            phase: Phase::Initial,
            source,
        })?;
        Self::with_http_client(http, params)
    }

    /// Build on a caller-supplied `reqwest::Client` (proxies, TLS roots, ...).
    pub fn with_http_client(http: reqwest::Client, params: ClientParams) -> Result<Self, RpcError> {
        let endpoint = params.endpoint()?;
        let credentials = Credentials::new(params.username, params.password);
        Ok(Self {
            transport: Transport::new(http, endpoint, credentials),
        })
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Call `method` without arguments and decode its result as `R`.
    pub async fn call<R>(&self, ctx: &CallContext, method: &str) -> Result<R, RpcError>
    where
        R: DeserializeOwned,
    {
        self.dispatch::<(), R>(ctx, method, None).await
    }

    /// Call `method` with `params` as its `arguments` and decode the result as `R`.
    pub async fn call_with<P, R>(&self, ctx: &CallContext, method: &str, params: &P) -> Result<R, RpcError>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        self.dispatch(ctx, method, Some(params)).await
    }

    async fn dispatch<P, R>(&self, ctx: &CallContext, method: &str, params: Option<&P>) -> Result<R, RpcError>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        let body = encode_request(method, params)?;
        debug!(method, "calling daemon");
        let response = self.transport.execute(ctx, body).await?;
        decode_response::<R>(method, &response)?.into_result(method)
    }
}
