//! Torrent identifier union.
//!
//! Methods that act on torrents take an `ids` argument which is one of:
//! absent (every torrent), the string `"recently-active"`, or an array of
//! numeric ids and hash strings. [`TorrentIds`] models exactly those three
//! shapes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize, Serializer};

/// Wire sentinel for torrents changed since the previous poll.
pub const RECENTLY_ACTIVE: &str = "recently-active";

/// A single torrent reference: the daemon's numeric id or the info hash.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TorrentId {
    Id(i64),
    Hash(String),
}

impl From<i64> for TorrentId {
    fn from(id: i64) -> Self {
        TorrentId::Id(id)
    }
}

impl From<i32> for TorrentId {
    fn from(id: i32) -> Self {
        TorrentId::Id(id.into())
    }
}

impl From<&str> for TorrentId {
    fn from(hash: &str) -> Self {
        TorrentId::Hash(hash.to_string())
    }
}

impl From<String> for TorrentId {
    fn from(hash: String) -> Self {
        TorrentId::Hash(hash)
    }
}

impl FromStr for TorrentId {
    type Err = std::convert::Infallible;

    /// Integers become [`TorrentId::Id`], anything else a hash.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.parse::<i64>() {
            Ok(id) => TorrentId::Id(id),
            Err(_) => TorrentId::Hash(s.to_string()),
        })
    }
}

impl fmt::Display for TorrentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TorrentId::Id(id) => write!(f, "{id}"),
            TorrentId::Hash(hash) => f.write_str(hash),
        }
    }
}

/// Which torrents a call targets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TorrentIds {
    /// Every torrent. Encoded by leaving the `ids` key out.
    #[default]
    All,
    /// Torrents changed since the last `torrent-get`.
    RecentlyActive,
    /// An explicit list; order and element types are preserved.
    List(Vec<TorrentId>),
}

impl TorrentIds {
    pub const ALL: TorrentIds = TorrentIds::All;
    pub const RECENTLY_ACTIVE: TorrentIds = TorrentIds::RecentlyActive;

    /// Build an explicit list. An empty iterator gives an empty list, not `All`.
    pub fn new<I, T>(ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<TorrentId>,
    {
        TorrentIds::List(ids.into_iter().map(Into::into).collect())
    }

    /// Used as `skip_serializing_if` so `All` drops the `ids` key.
    pub fn is_all(&self) -> bool {
        matches!(self, TorrentIds::All)
    }
}

impl<T: Into<TorrentId>> FromIterator<T> for TorrentIds {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        TorrentIds::new(iter)
    }
}

impl Serialize for TorrentIds {
    /// `All` serializes as `null` when written outside an arguments record;
    /// inside one the field is skipped before this runs.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            TorrentIds::All => serializer.serialize_none(),
            TorrentIds::RecentlyActive => serializer.serialize_str(RECENTLY_ACTIVE),
            TorrentIds::List(ids) => ids.serialize(serializer),
        }
    }
}
