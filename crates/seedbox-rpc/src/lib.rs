#![deny(unsafe_code)]

//! Typed client for the Transmission daemon's JSON-RPC control protocol.
//!
//! The client speaks the daemon's HTTP/JSON protocol: every call is a single
//! `POST` carrying a `{method, arguments}` envelope, answered by a
//! `{result, arguments}` envelope. The daemon guards its endpoint with a
//! session token handshake (HTTP 409 + `X-Transmission-Session-Id`), which
//! [`Transport`] performs transparently.
//!
//! ## Layers
//!
//! ```text
//! ┌──────────────────────────────┐
//! │ methods  (torrent-get, ...)  │  one async fn per RPC method
//! └──────────────┬───────────────┘
//!                ▼
//! ┌──────────────────────────────┐
//! │ Client::call / call_with     │  encode → execute → decode
//! └──────────────┬───────────────┘
//!        ┌───────┴────────┐
//!        ▼                ▼
//! ┌─────────────┐  ┌─────────────┐
//! │  envelope   │  │  Transport  │  basic auth + session-token retry
//! └─────────────┘  └─────────────┘
//! ```

// Lets `#[derive(WireFields)]` refer to `::seedbox_rpc` from inside this crate.
extern crate self as seedbox_rpc;

/// HTTP client and typed call helpers.
pub mod client;
/// Cancellation and deadline context threaded through every call.
pub mod context;
/// Request/response envelope codec.
pub mod envelope;
/// Error taxonomy for RPC calls.
pub mod error;
/// Compile-time wire field lists.
pub mod fields;
/// Torrent identifier union.
pub mod ids;
/// One async method per daemon RPC method.
pub mod methods;
/// Session-token HTTP transport.
pub mod transport;
/// Records returned by the daemon.
pub mod types;
/// Small helpers for building call arguments.
pub mod util;

pub use client::{Client, ClientParams};
pub use context::CallContext;
pub use envelope::{NoResult, Outcome};
pub use error::RpcError;
pub use fields::WireFields;
pub use ids::{TorrentId, TorrentIds};
pub use transport::{Credentials, Transport};
pub use types::*;
