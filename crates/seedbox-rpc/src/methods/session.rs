use crate::client::Client;
use crate::context::CallContext;
use crate::envelope::NoResult;
use crate::error::RpcError;
use crate::types::{Session, SessionGetArgs, SessionSetArgs, SessionStats};

impl Client {
    /// Read the session. `fields` narrows the reply; empty means all.
    pub async fn session_get(&self, ctx: &CallContext, fields: &[&str]) -> Result<Session, RpcError> {
        if fields.is_empty() {
            return self.call(ctx, "session-get").await;
        }
        let args = SessionGetArgs {
            fields: fields.iter().map(|f| f.to_string()).collect(),
        };
        self.call_with(ctx, "session-get", &args).await
    }

    pub async fn session_set(&self, ctx: &CallContext, args: &SessionSetArgs) -> Result<(), RpcError> {
        let _: NoResult = self.call_with(ctx, "session-set", args).await?;
        Ok(())
    }

    pub async fn session_stats(&self, ctx: &CallContext) -> Result<SessionStats, RpcError> {
        self.call(ctx, "session-stats").await
    }

    /// Ask the daemon to shut down.
    pub async fn session_close(&self, ctx: &CallContext) -> Result<(), RpcError> {
        let _: NoResult = self.call(ctx, "session-close").await?;
        Ok(())
    }
}
