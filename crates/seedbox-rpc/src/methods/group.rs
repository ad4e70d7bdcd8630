use crate::client::Client;
use crate::context::CallContext;
use crate::envelope::NoResult;
use crate::error::RpcError;
use crate::types::{GroupGetArgs, GroupGetResult, GroupSetArgs};

impl Client {
    /// List bandwidth groups, optionally only those named.
    pub async fn group_get(&self, ctx: &CallContext, names: &[&str]) -> Result<GroupGetResult, RpcError> {
        let args = GroupGetArgs {
            names: names.iter().map(|n| n.to_string()).collect(),
        };
        self.call_with(ctx, "group-get", &args).await
    }

    pub async fn group_set(&self, ctx: &CallContext, args: &GroupSetArgs) -> Result<(), RpcError> {
        let _: NoResult = self.call_with(ctx, "group-set", args).await?;
        Ok(())
    }
}
