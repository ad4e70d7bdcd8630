//! Metric catalog and the Prometheus text exposition format (0.0.4).

use std::fmt::Write as _;

/// `Content-Type` of a rendered scrape.
pub const TEXT_FORMAT: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Prometheus metric type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Counter,
    Gauge,
}

impl MetricKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Gauge => "gauge",
        }
    }
}

/// Static description of one metric family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricDesc {
    pub name: &'static str,
    pub help: &'static str,
    pub kind: MetricKind,
}

const fn counter(name: &'static str, help: &'static str) -> MetricDesc {
    MetricDesc {
        name,
        help,
        kind: MetricKind::Counter,
    }
}

const fn gauge(name: &'static str, help: &'static str) -> MetricDesc {
    MetricDesc {
        name,
        help,
        kind: MetricKind::Gauge,
    }
}

pub const HASH_LABEL: &str = "hash";
pub const NAME_LABEL: &str = "name";
pub const STATUS_LABEL: &str = "status";
pub const VERSION_LABEL: &str = "version";

// ── Daemon-wide ─────────────────────────────────────────────────────────

pub const DOWNLOADED_BYTES_TOTAL: MetricDesc = counter(
    "transmission_downloaded_bytes_total",
    "Total number of bytes downloaded since Transmission daemon started.",
);
pub const UPLOADED_BYTES_TOTAL: MetricDesc = counter(
    "transmission_uploaded_bytes_total",
    "Total number of bytes uploaded since Transmission daemon started.",
);
pub const TORRENTS_ADDED_TOTAL: MetricDesc = counter(
    "transmission_torrents_added_total",
    "Total number of torrents added since Transmission daemon started.",
);
pub const SECONDS_ACTIVE_TOTAL: MetricDesc = counter(
    "transmission_seconds_active_total",
    "Total number of seconds the Transmission daemon has been active since it started.",
);
pub const SESSIONS_TOTAL: MetricDesc = counter(
    "transmission_sessions_total",
    "Total number of sessions since Transmission daemon started.",
);
pub const UPLOAD_BYTES_PER_SECOND: MetricDesc = gauge(
    "transmission_upload_bytes_per_second",
    "Current aggregated upload speed across all torrents in bytes per second.",
);
pub const DOWNLOAD_BYTES_PER_SECOND: MetricDesc = gauge(
    "transmission_download_bytes_per_second",
    "Current aggregated download speed across all torrents in bytes per second.",
);
pub const VERSION: MetricDesc = gauge(
    "transmission_version",
    "Version of the Transmission daemon. Always has value 1.",
);
pub const TORRENTS: MetricDesc = gauge(
    "transmission_torrents",
    "Number of torrents grouped by status.",
);

// ── Per torrent, labelled by hash ───────────────────────────────────────

pub const TORRENT_DOWNLOAD_BYTES_PER_SECOND: MetricDesc = gauge(
    "transmission_torrent_download_bytes_per_second",
    "Current download speed for this torrent in bytes per second.",
);
pub const TORRENT_UPLOAD_BYTES_PER_SECOND: MetricDesc = gauge(
    "transmission_torrent_upload_bytes_per_second",
    "Current upload speed for this torrent in bytes per second.",
);
pub const TORRENT_TOTAL_SIZE_BYTES: MetricDesc = gauge(
    "transmission_torrent_total_size_bytes",
    "Total size of the torrent in bytes.",
);
pub const TORRENT_SIZE_WHEN_DONE_BYTES: MetricDesc = gauge(
    "transmission_torrent_size_when_done_bytes",
    "Size of the torrent when download completes in bytes. May differ from total size if some files are not selected for download.",
);
pub const TORRENT_LEFT_UNTIL_DONE_BYTES: MetricDesc = gauge(
    "transmission_torrent_left_until_done_bytes",
    "Number of bytes remaining until the torrent download is complete. Only counts wanted data.",
);
pub const TORRENT_DOWNLOADED_BYTES_TOTAL: MetricDesc = counter(
    "transmission_torrent_downloaded_bytes_total",
    "Total number of bytes downloaded for this torrent since it was added.",
);
pub const TORRENT_UPLOADED_BYTES_TOTAL: MetricDesc = counter(
    "transmission_torrent_uploaded_bytes_total",
    "Total number of bytes uploaded for this torrent since it was added.",
);
pub const TORRENT_CORRUPT_BYTES_TOTAL: MetricDesc = counter(
    "transmission_torrent_corrupt_bytes_total",
    "Total number of corrupt bytes recorded for this torrent since it was added.",
);
pub const TORRENT_PEERS_CONNECTED: MetricDesc = gauge(
    "transmission_torrent_peers_connected",
    "Current number of peers connected for this torrent.",
);
pub const TORRENT_PEERS_SENDING_TO_US: MetricDesc = gauge(
    "transmission_torrent_peers_sending_to_us",
    "Current number of connected peers sending data to us for this torrent.",
);
pub const TORRENT_PEERS_GETTING_FROM_US: MetricDesc = gauge(
    "transmission_torrent_peers_getting_from_us",
    "Current number of connected peers receiving data from us for this torrent.",
);
pub const TORRENT_WEBSEEDS_SENDING_TO_US: MetricDesc = gauge(
    "transmission_torrent_webseeds_sending_to_us",
    "Current number of webseeds sending data to us for this torrent.",
);
pub const TORRENT_SECONDS_DOWNLOADING_TOTAL: MetricDesc = counter(
    "transmission_torrent_seconds_downloading_total",
    "Total number of seconds this torrent has spent downloading since it was added.",
);
pub const TORRENT_SECONDS_SEEDING_TOTAL: MetricDesc = counter(
    "transmission_torrent_seconds_seeding_total",
    "Total number of seconds this torrent has spent seeding since it was added.",
);
pub const TORRENT_STATUS: MetricDesc = gauge(
    "transmission_torrent_status",
    "Numeric status code of this torrent (0 stopped through 6 seeding).",
);
pub const TORRENT_INFO: MetricDesc = gauge(
    "transmission_torrent_info",
    "Static information about a Transmission torrent. Always has value 1. Use this metric to join with other torrent-level metrics using the hash and name labels.",
);

// ── Families ────────────────────────────────────────────────────────────

/// One labelled value within a family.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub labels: Vec<(&'static str, String)>,
    pub value: f64,
}

/// A metric family: description plus every sample collected for it.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricFamily {
    pub desc: MetricDesc,
    pub samples: Vec<Sample>,
}

impl MetricFamily {
    pub fn new(desc: MetricDesc) -> Self {
        Self {
            desc,
            samples: Vec::new(),
        }
    }

    /// A family holding a single unlabelled sample.
    pub fn single(desc: MetricDesc, value: f64) -> Self {
        Self::new(desc).with_sample(Vec::new(), value)
    }

    pub fn with_sample(mut self, labels: Vec<(&'static str, String)>, value: f64) -> Self {
        self.push(labels, value);
        self
    }

    pub fn push(&mut self, labels: Vec<(&'static str, String)>, value: f64) {
        self.samples.push(Sample { labels, value });
    }

    pub fn name(&self) -> &'static str {
        self.desc.name
    }

    /// Value of the sample whose labels are exactly `labels`, in order.
    pub fn value(&self, labels: &[(&str, &str)]) -> Option<f64> {
        self.samples
            .iter()
            .find(|s| {
                s.labels.len() == labels.len()
                    && s
                        .labels
                        .iter()
                        .zip(labels)
                        .all(|((k, v), (ek, ev))| k == ek && v == ev)
            })
            .map(|s| s.value)
    }
}

/// Render families in the text exposition format.
///
/// Families without samples are omitted.
pub fn render(families: &[MetricFamily]) -> String {
    let mut out = String::new();
    for family in families.iter().filter(|f| !f.samples.is_empty()) {
        let desc = &family.desc;
        let _ = writeln!(out, "# HELP {} {}", desc.name, escape_help(desc.help));
        let _ = writeln!(out, "# TYPE {} {}", desc.name, desc.kind.as_str());
        for sample in &family.samples {
            out.push_str(desc.name);
            if !sample.labels.is_empty() {
                out.push('{');
                for (i, (key, value)) in sample.labels.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    let _ = write!(out, "{key}=\"{}\"", escape_label_value(value));
                }
                out.push('}');
            }
            out.push(' ');
            out.push_str(&format_value(sample.value));
            out.push('\n');
        }
    }
    out
}

fn escape_help(s: &str) -> String {
    s.replace('\\', "\\\\").replace('\n', "\\n")
}

fn escape_label_value(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out
}

fn format_value(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v.is_infinite() {
        if v > 0.0 { "+Inf" } else { "-Inf" }.to_string()
    } else {
        v.to_string()
    }
}
