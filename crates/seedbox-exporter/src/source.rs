//! The daemon calls a scrape depends on.

use seedbox_rpc::{CallContext, Client, RpcError, Session, SessionStats, TorrentGetArgs, TorrentGetResult};

use crate::BoxFuture;

/// Session fields a scrape reads.
const SESSION_FIELDS: &[&str] = &["version"];

/// Read-only view of a daemon, as seen by the exporter.
///
/// Object-safe so an [`Exporter`](crate::Exporter) can hold any source
/// behind `Arc<dyn MetricsSource>`; tests substitute canned data.
pub trait MetricsSource: Send + Sync {
    fn session_stats<'a>(&'a self, ctx: &'a CallContext) -> BoxFuture<'a, Result<SessionStats, RpcError>>;

    fn session_get<'a>(&'a self, ctx: &'a CallContext) -> BoxFuture<'a, Result<Session, RpcError>>;

    fn torrent_get<'a>(
        &'a self,
        ctx: &'a CallContext,
        args: &'a TorrentGetArgs,
    ) -> BoxFuture<'a, Result<TorrentGetResult, RpcError>>;
}

impl MetricsSource for Client {
    fn session_stats<'a>(&'a self, ctx: &'a CallContext) -> BoxFuture<'a, Result<SessionStats, RpcError>> {
        Box::pin(Client::session_stats(self, ctx))
    }

    fn session_get<'a>(&'a self, ctx: &'a CallContext) -> BoxFuture<'a, Result<Session, RpcError>> {
        Box::pin(Client::session_get(self, ctx, SESSION_FIELDS))
    }

    fn torrent_get<'a>(
        &'a self,
        ctx: &'a CallContext,
        args: &'a TorrentGetArgs,
    ) -> BoxFuture<'a, Result<TorrentGetResult, RpcError>> {
        Box::pin(Client::torrent_get(self, ctx, args))
    }
}
