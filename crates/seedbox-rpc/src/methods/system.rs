use crate::client::Client;
use crate::context::CallContext;
use crate::error::RpcError;
use crate::types::{BlocklistUpdateResult, FreeSpaceArgs, FreeSpaceResult, PortTestArgs, PortTestResult};

impl Client {
    /// Re-download the configured blocklist.
    pub async fn blocklist_update(&self, ctx: &CallContext) -> Result<BlocklistUpdateResult, RpcError> {
        self.call(ctx, "blocklist-update").await
    }

    /// Check whether the daemon's peer port is reachable from outside.
    pub async fn port_test(&self, ctx: &CallContext, args: &PortTestArgs) -> Result<PortTestResult, RpcError> {
        self.call_with(ctx, "port-test", args).await
    }

    pub async fn free_space(&self, ctx: &CallContext, path: &str) -> Result<FreeSpaceResult, RpcError> {
        let args = FreeSpaceArgs {
            path: path.to_string(),
        };
        self.call_with(ctx, "free-space", &args).await
    }
}

#[cfg(test)]
mod tests {
    use crate::client::{Client, ClientParams};
    use crate::context::CallContext;
    use crate::types::PortTestArgs;
    use pretty_assertions::assert_eq;
    use seedbox_test_utils::FakeDaemon;
    use serde_json::json;

    #[tokio::test]
    async fn test_system_methods() {
        let fake = FakeDaemon::start().await;
        fake.on_method("blocklist-update", json!({"blocklist-size": 4200}));
        fake.on_method("port-test", json!({"port-is-open": true, "ipProtocol": "ipv4"}));
        fake.on_method(
            "free-space",
            json!({"path": "/srv", "size-bytes": 1000, "total_size": 5000}),
        );
        let client = Client::new(ClientParams::new(fake.url())).unwrap();
        let ctx = CallContext::background();

        assert_eq!(client.blocklist_update(&ctx).await.unwrap().blocklist_size, 4200);

        let port = client
            .port_test(&ctx, &PortTestArgs::default())
            .await
            .unwrap();
        assert!(port.port_is_open);
        assert_eq!(port.ip_protocol.as_deref(), Some("ipv4"));

        let space = client.free_space(&ctx, "/srv").await.unwrap();
        assert_eq!(space.size_bytes, 1000);
        assert_eq!(space.total_size, 5000);

        let sent = fake.requests();
        assert_eq!(sent[0].json(), json!({"method": "blocklist-update"}));
        assert_eq!(sent[1].json()["arguments"], json!({}));
        assert_eq!(sent[2].json()["arguments"], json!({"path": "/srv"}));
    }
}
