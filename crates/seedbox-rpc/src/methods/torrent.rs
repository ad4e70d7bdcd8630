use crate::client::Client;
use crate::context::CallContext;
use crate::envelope::NoResult;
use crate::error::RpcError;
use crate::ids::TorrentIds;
use crate::types::{
    TorrentAddArgs, TorrentAddResult, TorrentGetArgs, TorrentGetRequest, TorrentGetResult,
    TorrentRemoveArgs, TorrentRenamePathArgs, TorrentRenamePathResult, TorrentSetArgs,
    TorrentSetLocationArgs,
};

impl Client {
    pub async fn torrent_start(&self, ctx: &CallContext, ids: &TorrentIds) -> Result<(), RpcError> {
        self.call_ids(ctx, "torrent-start", ids).await
    }

    /// Start, bypassing the download queue.
    pub async fn torrent_start_now(&self, ctx: &CallContext, ids: &TorrentIds) -> Result<(), RpcError> {
        self.call_ids(ctx, "torrent-start-now", ids).await
    }

    pub async fn torrent_stop(&self, ctx: &CallContext, ids: &TorrentIds) -> Result<(), RpcError> {
        self.call_ids(ctx, "torrent-stop", ids).await
    }

    pub async fn torrent_verify(&self, ctx: &CallContext, ids: &TorrentIds) -> Result<(), RpcError> {
        self.call_ids(ctx, "torrent-verify", ids).await
    }

    pub async fn torrent_reannounce(&self, ctx: &CallContext, ids: &TorrentIds) -> Result<(), RpcError> {
        self.call_ids(ctx, "torrent-reannounce", ids).await
    }

    pub async fn torrent_set(&self, ctx: &CallContext, args: &TorrentSetArgs) -> Result<(), RpcError> {
        let _: NoResult = self.call_with(ctx, "torrent-set", args).await?;
        Ok(())
    }

    /// Fetch torrents in `object` format. With no explicit field list every
    /// [`Torrent`](crate::Torrent) field is requested.
    pub async fn torrent_get(&self, ctx: &CallContext, args: &TorrentGetArgs) -> Result<TorrentGetResult, RpcError> {
        self.call_with(ctx, "torrent-get", &TorrentGetRequest::from(args))
            .await
    }

    pub async fn torrent_add(&self, ctx: &CallContext, args: &TorrentAddArgs) -> Result<TorrentAddResult, RpcError> {
        self.call_with(ctx, "torrent-add", args).await
    }

    pub async fn torrent_remove(&self, ctx: &CallContext, args: &TorrentRemoveArgs) -> Result<(), RpcError> {
        let _: NoResult = self.call_with(ctx, "torrent-remove", args).await?;
        Ok(())
    }

    pub async fn torrent_set_location(
        &self,
        ctx: &CallContext,
        args: &TorrentSetLocationArgs,
    ) -> Result<(), RpcError> {
        let _: NoResult = self.call_with(ctx, "torrent-set-location", args).await?;
        Ok(())
    }

    pub async fn torrent_rename_path(
        &self,
        ctx: &CallContext,
        args: &TorrentRenamePathArgs,
    ) -> Result<TorrentRenamePathResult, RpcError> {
        self.call_with(ctx, "torrent-rename-path", args).await
    }
}

#[cfg(test)]
mod tests {
    use crate::client::{Client, ClientParams};
    use crate::context::CallContext;
    use crate::ids::{TorrentId, TorrentIds};
    use crate::types::*;
    use pretty_assertions::assert_eq;
    use seedbox_test_utils::FakeDaemon;
    use serde_json::json;

    async fn setup() -> (FakeDaemon, Client) {
        let fake = FakeDaemon::start().await;
        let client = Client::new(ClientParams::new(fake.url())).unwrap();
        (fake, client)
    }

    #[tokio::test]
    async fn test_start_all_omits_ids() {
        let (fake, client) = setup().await;
        fake.on_method("torrent-start", json!({}));

        client
            .torrent_start(&CallContext::background(), &TorrentIds::ALL)
            .await
            .unwrap();

        assert_eq!(
            fake.requests()[0].json(),
            json!({"method": "torrent-start", "arguments": {}})
        );
    }

    #[tokio::test]
    async fn test_id_methods_use_their_rpc_names() {
        let (fake, client) = setup().await;
        for method in [
            "torrent-start-now",
            "torrent-stop",
            "torrent-verify",
            "torrent-reannounce",
        ] {
            fake.on_method(method, json!({}));
        }

        let ctx = CallContext::background();
        let ids = TorrentIds::new([TorrentId::from(1), TorrentId::from("abc")]);
        client.torrent_start_now(&ctx, &ids).await.unwrap();
        client.torrent_stop(&ctx, &ids).await.unwrap();
        client.torrent_verify(&ctx, &ids).await.unwrap();
        client.torrent_reannounce(&ctx, &ids).await.unwrap();

        let sent: Vec<_> = fake.requests().iter().map(|r| r.json()).collect();
        assert_eq!(sent[0]["method"], "torrent-start-now");
        assert_eq!(sent[1]["method"], "torrent-stop");
        assert_eq!(sent[2]["method"], "torrent-verify");
        assert_eq!(sent[3]["method"], "torrent-reannounce");
        assert!(sent.iter().all(|s| s["arguments"]["ids"] == json!([1, "abc"])));
    }

    #[tokio::test]
    async fn test_torrent_get_decodes_torrents() {
        let (fake, client) = setup().await;
        fake.on_method(
            "torrent-get",
            json!({
                "torrents": [
                    {"id": 1, "name": "a", "hashString": "h1", "status": 6, "rateUpload": 300},
                    {"id": 2, "name": "b", "hashString": "h2", "status": 0}
                ],
                "removed": [7]
            }),
        );

        let result = client
            .torrent_get(
                &CallContext::background(),
                &TorrentGetArgs::new(TorrentIds::RECENTLY_ACTIVE),
            )
            .await
            .unwrap();

        assert_eq!(result.torrents.len(), 2);
        assert_eq!(result.torrents[0].status, TorrentStatus::Seed);
        assert_eq!(result.torrents[0].rate_upload, 300);
        assert_eq!(result.removed, vec![7]);

        let sent = fake.requests()[0].json();
        assert_eq!(sent["arguments"]["ids"], "recently-active");
        assert_eq!(sent["arguments"]["format"], "object");
        assert_eq!(
            sent["arguments"]["fields"].as_array().unwrap().len(),
            Torrent::all_fields().len()
        );
    }

    #[tokio::test]
    async fn test_torrent_add_result() {
        let (fake, client) = setup().await;
        fake.on_method(
            "torrent-add",
            json!({"torrent-added": {"id": 5, "name": "iso", "hashString": "cafe"}}),
        );

        let result = client
            .torrent_add(
                &CallContext::background(),
                &TorrentAddArgs::from_filename("https://example.org/x.torrent"),
            )
            .await
            .unwrap();

        assert!(!result.is_duplicate());
        assert_eq!(result.torrent().unwrap().hash_string, "cafe");
    }

    #[tokio::test]
    async fn test_remove_and_relocate() {
        let (fake, client) = setup().await;
        fake.on_method("torrent-remove", json!({}));
        fake.on_method("torrent-set-location", json!({}));

        let ctx = CallContext::background();
        client
            .torrent_remove(
                &ctx,
                &TorrentRemoveArgs {
                    ids: TorrentIds::new([3]),
                    delete_local_data: false,
                },
            )
            .await
            .unwrap();
        client
            .torrent_set_location(
                &ctx,
                &TorrentSetLocationArgs {
                    ids: TorrentIds::new([3]),
                    location: "/mnt/archive".to_string(),
                    move_data: true,
                },
            )
            .await
            .unwrap();

        let sent = fake.requests();
        assert_eq!(
            sent[0].json()["arguments"],
            json!({"ids": [3], "delete-local-data": false})
        );
        assert_eq!(
            sent[1].json()["arguments"],
            json!({"ids": [3], "location": "/mnt/archive", "move": true})
        );
    }

    #[tokio::test]
    async fn test_rename_path() {
        let (fake, client) = setup().await;
        fake.on_method(
            "torrent-rename-path",
            json!({"id": 4, "path": "old/file.txt", "name": "new.txt"}),
        );

        let result = client
            .torrent_rename_path(
                &CallContext::background(),
                &TorrentRenamePathArgs {
                    ids: TorrentIds::new([4]),
                    path: "old/file.txt".to_string(),
                    name: "new.txt".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(result.name, "new.txt");
    }

    #[tokio::test]
    async fn test_torrent_set_rejected() {
        let (fake, client) = setup().await;
        fake.push(seedbox_test_utils::ScriptedResponse::failure("invalid argument"));

        let err = client
            .torrent_set(&CallContext::background(), &TorrentSetArgs::default())
            .await
            .unwrap_err();
        assert_eq!(err.domain_message(), Some("invalid argument"));
    }
}
