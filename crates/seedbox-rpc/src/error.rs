//! Error taxonomy for RPC calls.
//!
//! Callers can tell apart the three broad outcomes of a failed call:
//! the daemon rejected the operation ([`RpcError::Domain`]), the daemon
//! could not be reached or answered at the HTTP level
//! ([`RpcError::Connection`], [`RpcError::UnexpectedStatus`], ...), or the
//! daemon answered with something that is not a valid envelope
//! ([`RpcError::Decode`]).

use std::fmt;

/// Which HTTP exchange of a call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// The first request of a call.
    Initial,
    /// The request re-issued after a session-token handshake.
    SessionRetry,
    /// Reading the body of a successful response.
    ReadBody,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Initial => "initial request",
            Phase::SessionRetry => "session retry",
            Phase::ReadBody => "reading response body",
        })
    }
}

/// Errors from a daemon RPC call.
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    #[error("invalid daemon URL: {0}")]
    InvalidUrl(String),

    #[error("connection error during {phase}: {source}")]
    Connection {
        phase: Phase,
        #[source]
        source: reqwest::Error,
    },

    #[error("call cancelled")]
    Cancelled,

    #[error("call deadline exceeded")]
    DeadlineExceeded,

    #[error("daemon answered 409 without a session id header")]
    MissingSessionToken,

    #[error("unexpected {status} status returned: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("failed to encode {method} request: {source}")]
    Encode {
        method: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to decode {method} response: {source}")]
    Decode {
        method: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("daemon rejected {method}: {message}")]
    Domain { method: String, message: String },
}

impl RpcError {
    /// Whether the daemon itself rejected the operation.
    pub fn is_domain(&self) -> bool {
        matches!(self, RpcError::Domain { .. })
    }

    /// The daemon's `result` string, for domain errors.
    pub fn domain_message(&self) -> Option<&str> {
        match self {
            RpcError::Domain { message, .. } => Some(message),
            _ => None,
        }
    }

    /// Whether the caller's context stopped the call.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, RpcError::Cancelled | RpcError::DeadlineExceeded)
    }
}
