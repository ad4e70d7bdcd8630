use crate::client::Client;
use crate::context::CallContext;
use crate::error::RpcError;
use crate::ids::TorrentIds;

impl Client {
    pub async fn queue_move_top(&self, ctx: &CallContext, ids: &TorrentIds) -> Result<(), RpcError> {
        self.call_ids(ctx, "queue-move-top", ids).await
    }

    pub async fn queue_move_up(&self, ctx: &CallContext, ids: &TorrentIds) -> Result<(), RpcError> {
        self.call_ids(ctx, "queue-move-up", ids).await
    }

    pub async fn queue_move_down(&self, ctx: &CallContext, ids: &TorrentIds) -> Result<(), RpcError> {
        self.call_ids(ctx, "queue-move-down", ids).await
    }

    pub async fn queue_move_bottom(&self, ctx: &CallContext, ids: &TorrentIds) -> Result<(), RpcError> {
        self.call_ids(ctx, "queue-move-bottom", ids).await
    }
}
