//! End-to-end scrape: real HTTP listener in front of a fake daemon.

use std::sync::Arc;
use std::time::Duration;

use seedbox_exporter::{Exporter, server};
use seedbox_rpc::{Client, ClientParams};
use seedbox_test_utils::tracing_setup::init_test_tracing;
use seedbox_test_utils::{FakeDaemon, TestConfigBuilder};
use serde_json::json;
use tokio_util::sync::CancellationToken;

fn seeded_daemon(daemon: &FakeDaemon) {
    daemon
        .require_session_id("XYZ789")
        .on_method(
            "session-stats",
            json!({
                "downloadSpeed": 4096,
                "uploadSpeed": 128,
                "cumulative-stats": { "downloadedBytes": 10, "uploadedBytes": 20, "sessionCount": 2 }
            }),
        )
        .on_method("session-get", json!({ "version": "4.0.6 (38c164933e)" }))
        .on_method(
            "torrent-get",
            json!({ "torrents": [
                { "hashString": "c9a337562cb0360fd6f5ab40fd2b6b81ad2f1a8f", "name": "big \"quoted\" name", "status": 4, "peersConnected": 12 }
            ]}),
        );
}

#[tokio::test]
async fn test_scrape_over_http() {
    init_test_tracing();

    let daemon = FakeDaemon::start().await;
    seeded_daemon(&daemon);

    let config = TestConfigBuilder::new()
        .daemon_host(&daemon.url())
        .credentials("admin", "secret")
        .torrent_metrics(true)
        .scrape_timeout_secs(5)
        .build();
    config.validate().unwrap();

    let params = ClientParams::new(&config.daemon.host).credentials(&config.daemon.username, &config.daemon.password);
    let client = Client::new(params).unwrap();
    let exporter = Arc::new(Exporter::from_config(Arc::new(client), &config.exporter));

    let listener = server::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = CancellationToken::new();
    let handle = tokio::spawn(server::serve(listener, exporter, shutdown.clone()));

    let resp = reqwest::get(format!("http://{addr}/metrics")).await.unwrap();
    assert!(resp.status().is_success());
    assert_eq!(
        resp.headers()["content-type"],
        "text/plain; version=0.0.4; charset=utf-8"
    );
    let body = resp.text().await.unwrap();

    assert!(body.contains("transmission_download_bytes_per_second 4096\n"));
    assert!(body.contains("transmission_sessions_total 2\n"));
    assert!(body.contains("transmission_version{version=\"4.0.6\"} 1\n"));
    assert!(body.contains("transmission_torrents{status=\"download\"} 1\n"));
    assert!(body.contains(
        "transmission_torrent_peers_connected{hash=\"c9a337562cb0360fd6f5ab40fd2b6b81ad2f1a8f\"} 12\n"
    ));
    assert!(body.contains(r#"name="big \"quoted\" name"} 1"#));

    // One handshake, then the token is reused for the remaining calls.
    let requests = daemon.requests();
    assert_eq!(requests.len(), 4);
    assert!(requests[0].session_id().is_none());
    assert!(requests[1..].iter().all(|r| r.session_id() == Some("XYZ789")));

    shutdown.cancel();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("server drained")
        .unwrap()
        .unwrap();
}

#[tokio::test]
async fn test_unreachable_daemon_gives_empty_scrape() {
    init_test_tracing();

    let config = TestConfigBuilder::new()
        .daemon_host("http://127.0.0.1:1")
        .scrape_timeout_secs(2)
        .build();
    let client = Client::new(ClientParams::new(&config.daemon.host)).unwrap();
    let exporter = Exporter::from_config(Arc::new(client), &config.exporter);

    assert!(exporter.collect().await.is_empty());
}
