//! One async method on [`Client`](crate::Client) per daemon RPC method.
//!
//! Each wrapper only picks the method name and the argument/result records;
//! all protocol work happens in [`Client::call`](crate::Client::call) and
//! [`Client::call_with`](crate::Client::call_with).

mod group;
mod queue;
mod session;
mod system;
mod torrent;

use serde::Serialize;

use crate::client::Client;
use crate::context::CallContext;
use crate::envelope::NoResult;
use crate::error::RpcError;
use crate::ids::TorrentIds;

/// Arguments for methods that take nothing but `ids`.
#[derive(Debug, Serialize)]
struct IdsArgs<'a> {
    #[serde(skip_serializing_if = "TorrentIds::is_all")]
    ids: &'a TorrentIds,
}

impl Client {
    async fn call_ids(&self, ctx: &CallContext, method: &str, ids: &TorrentIds) -> Result<(), RpcError> {
        let _: NoResult = self.call_with(ctx, method, &IdsArgs { ids }).await?;
        Ok(())
    }
}
