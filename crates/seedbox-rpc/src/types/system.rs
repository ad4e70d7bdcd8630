use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BlocklistUpdateResult {
    /// Number of rules in the refreshed blocklist.
    #[serde(rename = "blocklist-size")]
    pub blocklist_size: i64,
}

/// `port-test`. Without a protocol the daemon picks one.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PortTestArgs {
    /// `ipv4` or `ipv6`.
    #[serde(rename = "ipProtocol", skip_serializing_if = "Option::is_none")]
    pub ip_protocol: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PortTestResult {
    #[serde(rename = "port-is-open")]
    pub port_is_open: bool,
    #[serde(rename = "ipProtocol")]
    pub ip_protocol: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FreeSpaceArgs {
    pub path: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FreeSpaceResult {
    pub path: String,
    /// Bytes available to the daemon at `path`.
    #[serde(rename = "size-bytes")]
    pub size_bytes: i64,
    /// Capacity of the filesystem holding `path`.
    pub total_size: i64,
}
