use std::fmt;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::fields::WireFields;
use crate::ids::TorrentIds;

/// Torrent activity state as reported in `status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum TorrentStatus {
    #[default]
    Stopped,
    CheckWait,
    Check,
    DownloadWait,
    Download,
    SeedWait,
    Seed,
    /// A code this client does not know.
    Unknown(i64),
}

impl TorrentStatus {
    /// Every known status, in code order.
    pub const KNOWN: [TorrentStatus; 7] = [
        TorrentStatus::Stopped,
        TorrentStatus::CheckWait,
        TorrentStatus::Check,
        TorrentStatus::DownloadWait,
        TorrentStatus::Download,
        TorrentStatus::SeedWait,
        TorrentStatus::Seed,
    ];

    /// Label used for metrics and display; `unknown` for unrecognised codes.
    pub fn label(self) -> &'static str {
        match self {
            TorrentStatus::Stopped => "stopped",
            TorrentStatus::CheckWait => "check_wait",
            TorrentStatus::Check => "check",
            TorrentStatus::DownloadWait => "download_wait",
            TorrentStatus::Download => "download",
            TorrentStatus::SeedWait => "seed_wait",
            TorrentStatus::Seed => "seed",
            TorrentStatus::Unknown(_) => "unknown",
        }
    }

    pub fn code(self) -> i64 {
        self.into()
    }
}

impl From<i64> for TorrentStatus {
    fn from(code: i64) -> Self {
        match code {
            0 => TorrentStatus::Stopped,
            1 => TorrentStatus::CheckWait,
            2 => TorrentStatus::Check,
            3 => TorrentStatus::DownloadWait,
            4 => TorrentStatus::Download,
            5 => TorrentStatus::SeedWait,
            6 => TorrentStatus::Seed,
            other => TorrentStatus::Unknown(other),
        }
    }
}

impl From<TorrentStatus> for i64 {
    fn from(status: TorrentStatus) -> Self {
        match status {
            TorrentStatus::Stopped => 0,
            TorrentStatus::CheckWait => 1,
            TorrentStatus::Check => 2,
            TorrentStatus::DownloadWait => 3,
            TorrentStatus::Download => 4,
            TorrentStatus::SeedWait => 5,
            TorrentStatus::Seed => 6,
            TorrentStatus::Unknown(code) => code,
        }
    }
}

impl fmt::Display for TorrentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One torrent as returned by `torrent-get` in `object` format.
///
/// Field names follow the daemon's camelCase keys; sizes are bytes, rates
/// bytes per second, dates Unix seconds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, WireFields)]
#[serde(rename_all = "camelCase", default)]
pub struct Torrent {
    pub activity_date: i64,
    pub added_date: i64,
    pub availability: Vec<i64>,
    pub bandwidth_priority: i64,
    pub bytes_completed: Vec<i64>,
    pub comment: String,
    pub corrupt_ever: i64,
    pub creator: String,
    pub date_created: i64,
    pub desired_available: i64,
    pub done_date: i64,
    pub download_dir: String,
    pub downloaded_ever: i64,
    pub download_limit: i64,
    pub download_limited: bool,
    pub edit_date: i64,
    pub error: i64,
    pub error_string: String,
    pub eta: i64,
    pub eta_idle: i64,
    pub file_count: i64,
    pub files: Vec<TorrentFile>,
    pub file_stats: Vec<TorrentFileStat>,
    pub group: String,
    pub hash_string: String,
    pub have_unchecked: i64,
    pub have_valid: i64,
    pub honors_session_limits: bool,
    pub id: i64,
    pub is_finished: bool,
    pub is_private: bool,
    pub is_stalled: bool,
    pub labels: Vec<String>,
    pub left_until_done: i64,
    pub magnet_link: String,
    pub max_connected_peers: i64,
    pub metadata_percent_complete: f64,
    pub name: String,
    pub peer_limit: i64,
    pub peers: Vec<Peer>,
    pub peers_connected: i64,
    pub peers_from: Option<PeersFrom>,
    pub peers_getting_from_us: i64,
    pub peers_sending_to_us: i64,
    pub percent_complete: f64,
    pub percent_done: f64,
    pub pieces: String,
    pub piece_count: i64,
    pub piece_size: i64,
    pub priorities: Vec<i64>,
    pub primary_mime_type: String,
    pub queue_position: i64,
    pub rate_download: i64,
    pub rate_upload: i64,
    pub recheck_progress: f64,
    pub seconds_downloading: i64,
    pub seconds_seeding: i64,
    pub seed_idle_limit: i64,
    pub seed_idle_mode: i64,
    pub seed_ratio_limit: f64,
    pub seed_ratio_mode: i64,
    pub sequential_download: bool,
    pub size_when_done: i64,
    pub start_date: i64,
    pub status: TorrentStatus,
    pub torrent_file: String,
    pub total_size: i64,
    pub trackers: Vec<Tracker>,
    pub tracker_list: String,
    pub tracker_stats: Vec<TrackerStat>,
    pub uploaded_ever: i64,
    pub upload_limit: i64,
    pub upload_limited: bool,
    pub upload_ratio: f64,
    /// 0/1 per file on 4.x daemons.
    pub wanted: Vec<i64>,
    pub webseeds: Vec<String>,
    pub webseeds_sending_to_us: i64,
}

static ALL_TORRENT_FIELDS: LazyLock<Vec<&'static str>> = LazyLock::new(Torrent::wire_fields);

impl Torrent {
    /// Every field of [`Torrent`], the default `fields` for `torrent-get`.
    pub fn all_fields() -> &'static [&'static str] {
        &ALL_TORRENT_FIELDS
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TorrentFile {
    pub bytes_completed: i64,
    pub length: i64,
    pub name: String,
    pub begin_piece: i64,
    pub end_piece: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TorrentFileStat {
    pub bytes_completed: i64,
    pub wanted: bool,
    pub priority: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Peer {
    pub address: String,
    pub bytes_to_client: i64,
    pub bytes_to_peer: i64,
    pub client_is_choked: bool,
    pub client_is_interested: bool,
    pub client_name: String,
    pub flag_str: String,
    pub is_downloading_from: bool,
    pub is_encrypted: bool,
    pub is_incoming: bool,
    pub is_uploading_to: bool,
    #[serde(rename = "isUTP")]
    pub is_utp: bool,
    pub peer_id: String,
    pub peer_is_choked: bool,
    pub peer_is_interested: bool,
    pub port: i64,
    pub progress: f64,
    pub rate_to_client: i64,
    pub rate_to_peer: i64,
}

/// Where the torrent's connected peers were discovered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeersFrom {
    #[serde(rename = "fromCache")]
    pub from_cache: i64,
    #[serde(rename = "fromDHT")]
    pub from_dht: i64,
    #[serde(rename = "fromIncoming")]
    pub from_incoming: i64,
    #[serde(rename = "fromLPD")]
    pub from_lpd: i64,
    #[serde(rename = "fromLTEP")]
    pub from_ltep: i64,
    #[serde(rename = "fromPEX")]
    pub from_pex: i64,
    #[serde(rename = "fromTracker")]
    pub from_tracker: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tracker {
    pub announce: String,
    pub id: i64,
    pub scrape: String,
    pub sitename: String,
    pub tier: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrackerStat {
    pub announce: String,
    pub announce_state: i64,
    pub download_count: i64,
    pub downloader_count: i64,
    pub has_announced: bool,
    pub has_scraped: bool,
    pub host: String,
    pub id: i64,
    pub is_backup: bool,
    pub last_announce_peer_count: i64,
    pub last_announce_result: String,
    pub last_announce_start_time: i64,
    pub last_announce_succeeded: bool,
    pub last_announce_time: i64,
    pub last_announce_timed_out: bool,
    pub last_scrape_result: String,
    pub last_scrape_start_time: i64,
    pub last_scrape_succeeded: bool,
    pub last_scrape_time: i64,
    pub last_scrape_timed_out: bool,
    pub leecher_count: i64,
    pub next_announce_time: i64,
    pub next_scrape_time: i64,
    pub scrape: String,
    pub scrape_state: i64,
    pub seeder_count: i64,
    pub sitename: String,
    pub tier: i64,
}

// ── Method arguments and results ────────────────────────────────────────

/// `torrent-set`. Unset fields are left unchanged by the daemon.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TorrentSetArgs {
    #[serde(skip_serializing_if = "TorrentIds::is_all")]
    pub ids: TorrentIds,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bandwidth_priority: Option<i64>,
    /// KB/s.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_limit: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_limited: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub honors_session_limits: Option<bool>,
    #[serde(rename = "peer-limit", skip_serializing_if = "Option::is_none")]
    pub peer_limit: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub queue_position: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed_idle_limit: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed_idle_mode: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed_ratio_limit: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed_ratio_mode: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequential_download: Option<bool>,
    #[serde(rename = "files-wanted", skip_serializing_if = "Vec::is_empty")]
    pub files_wanted: Vec<i64>,
    #[serde(rename = "files-unwanted", skip_serializing_if = "Vec::is_empty")]
    pub files_unwanted: Vec<i64>,
    #[serde(rename = "priority-high", skip_serializing_if = "Vec::is_empty")]
    pub priority_high: Vec<i64>,
    #[serde(rename = "priority-low", skip_serializing_if = "Vec::is_empty")]
    pub priority_low: Vec<i64>,
    #[serde(rename = "priority-normal", skip_serializing_if = "Vec::is_empty")]
    pub priority_normal: Vec<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Announce URLs, one tier per line with blank lines between tiers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracker_list: Option<String>,
    /// KB/s.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upload_limit: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upload_limited: Option<bool>,
}

/// `torrent-get`. An empty `fields` list requests [`Torrent::all_fields`].
#[derive(Debug, Clone, Default)]
pub struct TorrentGetArgs {
    pub ids: TorrentIds,
    pub fields: Vec<String>,
}

impl TorrentGetArgs {
    pub fn new(ids: TorrentIds) -> Self {
        Self {
            ids,
            fields: Vec::new(),
        }
    }

    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }
}

/// Wire form of [`TorrentGetArgs`].
#[derive(Debug, Serialize)]
pub(crate) struct TorrentGetRequest<'a> {
    #[serde(skip_serializing_if = "TorrentIds::is_all")]
    pub ids: &'a TorrentIds,
    pub fields: Vec<&'a str>,
    pub format: &'static str,
}

impl<'a> From<&'a TorrentGetArgs> for TorrentGetRequest<'a> {
    fn from(args: &'a TorrentGetArgs) -> Self {
        let fields = if args.fields.is_empty() {
            Torrent::all_fields().to_vec()
        } else {
            args.fields.iter().map(String::as_str).collect()
        };
        Self {
            ids: &args.ids,
            fields,
            format: "object",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TorrentGetResult {
    pub torrents: Vec<Torrent>,
    /// Ids removed since the last poll; only sent for `recently-active`.
    pub removed: Vec<i64>,
}

/// `torrent-add`. Exactly one of `filename` and `metainfo` must be set.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct TorrentAddArgs {
    /// Path or URL of a `.torrent` file, or a magnet link.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// Base64-encoded `.torrent` contents, see [`crate::util::torrent_base64`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metainfo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cookies: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_dir: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paused: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peer_limit: Option<i64>,
    #[serde(rename = "bandwidthPriority", skip_serializing_if = "Option::is_none")]
    pub bandwidth_priority: Option<i64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub files_wanted: Vec<i64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub files_unwanted: Vec<i64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub priority_high: Vec<i64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub priority_low: Vec<i64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub priority_normal: Vec<i64>,
}

impl TorrentAddArgs {
    pub fn from_filename(filename: impl Into<String>) -> Self {
        Self {
            filename: Some(filename.into()),
            ..Self::default()
        }
    }

    pub fn from_metainfo(metainfo: impl Into<String>) -> Self {
        Self {
            metainfo: Some(metainfo.into()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TorrentInfo {
    pub id: i64,
    pub name: String,
    #[serde(rename = "hashString")]
    pub hash_string: String,
}

/// Either key is set: `torrent-added` for a new torrent, `torrent-duplicate`
/// when the daemon already had it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TorrentAddResult {
    #[serde(rename = "torrent-added")]
    pub torrent_added: Option<TorrentInfo>,
    #[serde(rename = "torrent-duplicate")]
    pub torrent_duplicate: Option<TorrentInfo>,
}

impl TorrentAddResult {
    /// The added or already-present torrent.
    pub fn torrent(&self) -> Option<&TorrentInfo> {
        self.torrent_added.as_ref().or(self.torrent_duplicate.as_ref())
    }

    pub fn is_duplicate(&self) -> bool {
        self.torrent_duplicate.is_some()
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TorrentRemoveArgs {
    #[serde(skip_serializing_if = "TorrentIds::is_all")]
    pub ids: TorrentIds,
    #[serde(rename = "delete-local-data")]
    pub delete_local_data: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TorrentSetLocationArgs {
    #[serde(skip_serializing_if = "TorrentIds::is_all")]
    pub ids: TorrentIds,
    pub location: String,
    /// Move the data; otherwise only look for it at `location`.
    #[serde(rename = "move")]
    pub move_data: bool,
}

/// `torrent-rename-path`. `ids` must name exactly one torrent.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TorrentRenamePathArgs {
    #[serde(skip_serializing_if = "TorrentIds::is_all")]
    pub ids: TorrentIds,
    /// Path of the file or folder inside the torrent.
    pub path: String,
    /// New last path component.
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TorrentRenamePathResult {
    pub id: i64,
    pub path: String,
    pub name: String,
}
