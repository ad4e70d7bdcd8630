//! One scrape: query the daemon and build metric families.

use std::sync::Arc;
use std::time::Duration;

use seedbox_config::ExporterConfig;
use seedbox_rpc::{CallContext, SessionStats, Torrent, TorrentGetArgs, TorrentIds, TorrentStatus};
use tracing::{debug, error};

use crate::MetricsSource;
use crate::metrics::*;

/// Torrent fields read when only per-status counts are exported.
const STATUS_FIELDS: &[&str] = &["hashString", "status"];

/// Torrent fields read when per-torrent metrics are exported.
const TORRENT_FIELDS: &[&str] = &[
    "hashString",
    "name",
    "status",
    "rateDownload",
    "rateUpload",
    "totalSize",
    "sizeWhenDone",
    "leftUntilDone",
    "downloadedEver",
    "uploadedEver",
    "corruptEver",
    "peersConnected",
    "peersSendingToUs",
    "peersGettingFromUs",
    "webseedsSendingToUs",
    "secondsDownloading",
    "secondsSeeding",
];

pub const DEFAULT_SCRAPE_TIMEOUT: Duration = Duration::from_secs(30);

/// Turns daemon state into metric families, one scrape per [`collect`](Exporter::collect).
pub struct Exporter {
    source: Arc<dyn MetricsSource>,
    torrent_metrics: bool,
    scrape_timeout: Duration,
}

impl Exporter {
    pub fn new(source: Arc<dyn MetricsSource>) -> Self {
        Self {
            source,
            torrent_metrics: false,
            scrape_timeout: DEFAULT_SCRAPE_TIMEOUT,
        }
    }

    pub fn from_config(source: Arc<dyn MetricsSource>, config: &ExporterConfig) -> Self {
        Self::new(source)
            .with_torrent_metrics(config.torrent_metrics)
            .with_scrape_timeout(config.scrape_timeout())
    }

    /// Also export per-torrent families, labelled by info hash.
    pub fn with_torrent_metrics(mut self, enabled: bool) -> Self {
        self.torrent_metrics = enabled;
        self
    }

    pub fn with_scrape_timeout(mut self, timeout: Duration) -> Self {
        self.scrape_timeout = timeout;
        self
    }

    pub fn torrent_metrics(&self) -> bool {
        self.torrent_metrics
    }

    /// Run one scrape bounded by the configured timeout.
    pub async fn collect(&self) -> Vec<MetricFamily> {
        let ctx = CallContext::with_timeout(self.scrape_timeout);
        self.collect_with(&ctx).await
    }

    /// Run one scrape under `ctx`.
    ///
    /// A failing daemon call is logged and ends the scrape; families
    /// gathered before the failure are still returned.
    pub async fn collect_with(&self, ctx: &CallContext) -> Vec<MetricFamily> {
        let mut families = Vec::new();

        let stats = match self.source.session_stats(ctx).await {
            Ok(stats) => stats,
            Err(e) => {
                error!(error = %e, "error getting session stats from daemon");
                return families;
            }
        };
        families.extend(stats_families(&stats));

        let session = match self.source.session_get(ctx).await {
            Ok(session) => session,
            Err(e) => {
                error!(error = %e, "error getting session from daemon");
                return families;
            }
        };
        families.push(MetricFamily::new(VERSION).with_sample(
            vec![(VERSION_LABEL, session.version.semver().to_string())],
            1.0,
        ));

        let fields = if self.torrent_metrics {
            TORRENT_FIELDS
        } else {
            STATUS_FIELDS
        };
        let args = TorrentGetArgs::new(TorrentIds::All).fields(fields.iter().copied());
        let result = match self.source.torrent_get(ctx, &args).await {
            Ok(result) => result,
            Err(e) => {
                error!(error = %e, "error getting torrents from daemon");
                return families;
            }
        };
        debug!(torrents = result.torrents.len(), "scrape fetched torrents");

        families.push(status_counts(&result.torrents));
        if self.torrent_metrics {
            families.extend(torrent_families(&result.torrents));
        }
        families
    }
}

fn stats_families(stats: &SessionStats) -> Vec<MetricFamily> {
    let cumulative = &stats.cumulative_stats;
    vec![
        MetricFamily::single(DOWNLOADED_BYTES_TOTAL, cumulative.downloaded_bytes as f64),
        MetricFamily::single(UPLOADED_BYTES_TOTAL, cumulative.uploaded_bytes as f64),
        MetricFamily::single(TORRENTS_ADDED_TOTAL, cumulative.files_added as f64),
        MetricFamily::single(SECONDS_ACTIVE_TOTAL, cumulative.seconds_active as f64),
        MetricFamily::single(SESSIONS_TOTAL, cumulative.session_count as f64),
        MetricFamily::single(UPLOAD_BYTES_PER_SECOND, stats.upload_speed as f64),
        MetricFamily::single(DOWNLOAD_BYTES_PER_SECOND, stats.download_speed as f64),
    ]
}

/// Torrent counts for every known status plus `unknown`, zero-filled.
fn status_counts(torrents: &[Torrent]) -> MetricFamily {
    let labels: Vec<&'static str> = TorrentStatus::KNOWN
        .iter()
        .map(|s| s.label())
        .chain(std::iter::once("unknown"))
        .collect();

    let mut counts = vec![0u64; labels.len()];
    for torrent in torrents {
        let label = torrent.status.label();
        if let Some(i) = labels.iter().position(|l| *l == label) {
            counts[i] += 1;
        }
    }

    labels
        .into_iter()
        .zip(counts)
        .fold(MetricFamily::new(TORRENTS), |family, (label, count)| {
            family.with_sample(vec![(STATUS_LABEL, label.to_string())], count as f64)
        })
}

/// Per-torrent families. Each family holds one sample per torrent so the
/// rendered output groups samples under a single `# TYPE` line.
fn torrent_families(torrents: &[Torrent]) -> Vec<MetricFamily> {
    let info = torrents.iter().fold(MetricFamily::new(TORRENT_INFO), |family, t| {
        family.with_sample(
            vec![(HASH_LABEL, t.hash_string.clone()), (NAME_LABEL, t.name.clone())],
            1.0,
        )
    });

    vec![
        per_torrent(TORRENT_DOWNLOAD_BYTES_PER_SECOND, torrents, |t| t.rate_download),
        per_torrent(TORRENT_UPLOAD_BYTES_PER_SECOND, torrents, |t| t.rate_upload),
        per_torrent(TORRENT_TOTAL_SIZE_BYTES, torrents, |t| t.total_size),
        per_torrent(TORRENT_SIZE_WHEN_DONE_BYTES, torrents, |t| t.size_when_done),
        per_torrent(TORRENT_LEFT_UNTIL_DONE_BYTES, torrents, |t| t.left_until_done),
        per_torrent(TORRENT_DOWNLOADED_BYTES_TOTAL, torrents, |t| t.downloaded_ever),
        per_torrent(TORRENT_UPLOADED_BYTES_TOTAL, torrents, |t| t.uploaded_ever),
        per_torrent(TORRENT_CORRUPT_BYTES_TOTAL, torrents, |t| t.corrupt_ever),
        per_torrent(TORRENT_PEERS_CONNECTED, torrents, |t| t.peers_connected),
        per_torrent(TORRENT_PEERS_SENDING_TO_US, torrents, |t| t.peers_sending_to_us),
        per_torrent(TORRENT_PEERS_GETTING_FROM_US, torrents, |t| t.peers_getting_from_us),
        per_torrent(TORRENT_WEBSEEDS_SENDING_TO_US, torrents, |t| t.webseeds_sending_to_us),
        per_torrent(TORRENT_SECONDS_DOWNLOADING_TOTAL, torrents, |t| t.seconds_downloading),
        per_torrent(TORRENT_SECONDS_SEEDING_TOTAL, torrents, |t| t.seconds_seeding),
        per_torrent(TORRENT_STATUS, torrents, |t| t.status.code()),
        info,
    ]
}

fn per_torrent(desc: MetricDesc, torrents: &[Torrent], extract: impl Fn(&Torrent) -> i64) -> MetricFamily {
    torrents.iter().fold(MetricFamily::new(desc), |family, t| {
        family.with_sample(vec![(HASH_LABEL, t.hash_string.clone())], extract(t) as f64)
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use seedbox_rpc::{DaemonVersion, RpcError, Session, Stats, TorrentGetResult};

    use super::*;
    use crate::BoxFuture;
    use pretty_assertions::assert_eq;

    /// Canned daemon answers. A `None` slot fails that call.
    #[derive(Default)]
    struct MockSource {
        stats: Option<SessionStats>,
        session: Option<Session>,
        torrents: Option<Vec<Torrent>>,
        seen_fields: Mutex<Vec<String>>,
    }

    fn domain(method: &str) -> RpcError {
        RpcError::Domain {
            method: method.to_string(),
            message: "daemon unavailable".to_string(),
        }
    }

    impl MetricsSource for MockSource {
        fn session_stats<'a>(
            &'a self,
            _ctx: &'a CallContext,
        ) -> BoxFuture<'a, Result<SessionStats, RpcError>> {
            Box::pin(async move { self.stats.clone().ok_or_else(|| domain("session-stats")) })
        }

        fn session_get<'a>(&'a self, _ctx: &'a CallContext) -> BoxFuture<'a, Result<Session, RpcError>> {
            Box::pin(async move { self.session.clone().ok_or_else(|| domain("session-get")) })
        }

        fn torrent_get<'a>(
            &'a self,
            _ctx: &'a CallContext,
            args: &'a TorrentGetArgs,
        ) -> BoxFuture<'a, Result<TorrentGetResult, RpcError>> {
            Box::pin(async move {
                *self.seen_fields.lock().unwrap() = args.fields.clone();
                self.torrents
                    .clone()
                    .map(|torrents| TorrentGetResult {
                        torrents,
                        ..Default::default()
                    })
                    .ok_or_else(|| domain("torrent-get"))
            })
        }
    }

    fn torrent(hash: &str, name: &str, status: TorrentStatus) -> Torrent {
        Torrent {
            hash_string: hash.to_string(),
            name: name.to_string(),
            status,
            rate_download: 1000,
            rate_upload: 500,
            total_size: 4096,
            size_when_done: 2048,
            left_until_done: 1024,
            downloaded_ever: 3000,
            uploaded_ever: 6000,
            corrupt_ever: 7,
            peers_connected: 5,
            peers_sending_to_us: 2,
            peers_getting_from_us: 3,
            webseeds_sending_to_us: 1,
            seconds_downloading: 60,
            seconds_seeding: 120,
            ..Default::default()
        }
    }

    fn full_source() -> MockSource {
        MockSource {
            stats: Some(SessionStats {
                download_speed: 2048,
                upload_speed: 1024,
                cumulative_stats: Stats {
                    uploaded_bytes: 111,
                    downloaded_bytes: 222,
                    files_added: 3,
                    session_count: 4,
                    seconds_active: 555,
                },
                ..Default::default()
            }),
            session: Some(Session {
                version: DaemonVersion("4.0.0 (38c164933e)".to_string()),
                ..Default::default()
            }),
            torrents: Some(vec![
                torrent("aaa", "t1", TorrentStatus::Seed),
                torrent("bbb", "t2", TorrentStatus::Download),
                torrent("ccc", "t3", TorrentStatus::Seed),
                torrent("ddd", "t4", TorrentStatus::Unknown(42)),
            ]),
            ..Default::default()
        }
    }

    fn find<'a>(families: &'a [MetricFamily], name: &str) -> Option<&'a MetricFamily> {
        families.iter().find(|f| f.name() == name)
    }

    #[tokio::test]
    async fn test_global_metrics() {
        let families = Exporter::new(Arc::new(full_source())).collect().await;

        let single = |name: &str| find(&families, name).and_then(|f| f.value(&[]));
        assert_eq!(single("transmission_downloaded_bytes_total"), Some(222.0));
        assert_eq!(single("transmission_uploaded_bytes_total"), Some(111.0));
        assert_eq!(single("transmission_torrents_added_total"), Some(3.0));
        assert_eq!(single("transmission_seconds_active_total"), Some(555.0));
        assert_eq!(single("transmission_sessions_total"), Some(4.0));
        assert_eq!(single("transmission_upload_bytes_per_second"), Some(1024.0));
        assert_eq!(single("transmission_download_bytes_per_second"), Some(2048.0));

        let version = find(&families, "transmission_version").unwrap();
        assert_eq!(version.value(&[("version", "4.0.0")]), Some(1.0));
    }

    #[tokio::test]
    async fn test_status_counts_are_zero_filled() {
        let families = Exporter::new(Arc::new(full_source())).collect().await;
        let torrents = find(&families, "transmission_torrents").unwrap();

        assert_eq!(torrents.samples.len(), 8);
        assert_eq!(torrents.value(&[("status", "seed")]), Some(2.0));
        assert_eq!(torrents.value(&[("status", "download")]), Some(1.0));
        assert_eq!(torrents.value(&[("status", "unknown")]), Some(1.0));
        for label in ["stopped", "check_wait", "check", "download_wait", "seed_wait"] {
            assert_eq!(torrents.value(&[("status", label)]), Some(0.0), "{label}");
        }
    }

    #[tokio::test]
    async fn test_torrent_metrics_disabled() {
        let source = Arc::new(full_source());
        let families = Exporter::new(source.clone()).collect().await;

        assert!(families.iter().all(|f| !f.name().starts_with("transmission_torrent_")));
        assert_eq!(*source.seen_fields.lock().unwrap(), STATUS_FIELDS);
    }

    #[tokio::test]
    async fn test_torrent_metrics_enabled() {
        let source = Arc::new(full_source());
        let families = Exporter::new(source.clone())
            .with_torrent_metrics(true)
            .collect()
            .await;

        let value = |name: &str, hash: &str| find(&families, name).and_then(|f| f.value(&[("hash", hash)]));
        assert_eq!(value("transmission_torrent_download_bytes_per_second", "aaa"), Some(1000.0));
        assert_eq!(value("transmission_torrent_upload_bytes_per_second", "bbb"), Some(500.0));
        assert_eq!(value("transmission_torrent_total_size_bytes", "aaa"), Some(4096.0));
        assert_eq!(value("transmission_torrent_size_when_done_bytes", "aaa"), Some(2048.0));
        assert_eq!(value("transmission_torrent_left_until_done_bytes", "aaa"), Some(1024.0));
        assert_eq!(value("transmission_torrent_downloaded_bytes_total", "aaa"), Some(3000.0));
        assert_eq!(value("transmission_torrent_uploaded_bytes_total", "aaa"), Some(6000.0));
        assert_eq!(value("transmission_torrent_corrupt_bytes_total", "aaa"), Some(7.0));
        assert_eq!(value("transmission_torrent_peers_connected", "aaa"), Some(5.0));
        assert_eq!(value("transmission_torrent_peers_sending_to_us", "aaa"), Some(2.0));
        assert_eq!(value("transmission_torrent_peers_getting_from_us", "aaa"), Some(3.0));
        assert_eq!(value("transmission_torrent_webseeds_sending_to_us", "aaa"), Some(1.0));
        assert_eq!(value("transmission_torrent_seconds_downloading_total", "aaa"), Some(60.0));
        assert_eq!(value("transmission_torrent_seconds_seeding_total", "aaa"), Some(120.0));
        assert_eq!(value("transmission_torrent_status", "aaa"), Some(6.0));
        assert_eq!(value("transmission_torrent_status", "bbb"), Some(4.0));
        assert_eq!(value("transmission_torrent_status", "ddd"), Some(42.0));

        let info = find(&families, "transmission_torrent_info").unwrap();
        assert_eq!(info.value(&[("hash", "ccc"), ("name", "t3")]), Some(1.0));
        assert_eq!(info.samples.len(), 4);

        assert_eq!(*source.seen_fields.lock().unwrap(), TORRENT_FIELDS);
    }

    #[test_log::test(tokio::test)]
    async fn test_stats_failure_yields_nothing() {
        let source = MockSource {
            stats: None,
            ..full_source()
        };
        let families = Exporter::new(Arc::new(source)).collect().await;
        assert!(families.is_empty());
    }

    #[test_log::test(tokio::test)]
    async fn test_session_failure_keeps_stats() {
        let source = MockSource {
            session: None,
            ..full_source()
        };
        let families = Exporter::new(Arc::new(source)).collect().await;
        assert_eq!(families.len(), 7);
        assert!(find(&families, "transmission_version").is_none());
        assert!(find(&families, "transmission_torrents").is_none());
    }

    #[test_log::test(tokio::test)]
    async fn test_torrent_failure_keeps_version() {
        let source = MockSource {
            torrents: None,
            ..full_source()
        };
        let families = Exporter::new(Arc::new(source)).collect().await;
        assert!(find(&families, "transmission_version").is_some());
        assert!(find(&families, "transmission_torrents").is_none());
    }

    #[tokio::test]
    async fn test_no_torrents() {
        let source = MockSource {
            torrents: Some(Vec::new()),
            ..full_source()
        };
        let families = Exporter::new(Arc::new(source))
            .with_torrent_metrics(true)
            .collect()
            .await;
        let torrents = find(&families, "transmission_torrents").unwrap();
        assert!(torrents.samples.iter().all(|s| s.value == 0.0));
        assert!(find(&families, "transmission_torrent_info").unwrap().samples.is_empty());
    }

    #[test]
    fn test_from_config() {
        let config = ExporterConfig {
            torrent_metrics: true,
            scrape_timeout_secs: 5,
            ..Default::default()
        };
        let exporter = Exporter::from_config(Arc::new(MockSource::default()), &config);
        assert!(exporter.torrent_metrics());
        assert_eq!(exporter.scrape_timeout, Duration::from_secs(5));
    }
}
