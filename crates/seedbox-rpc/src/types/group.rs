use serde::{Deserialize, Serialize};

/// A bandwidth group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Group {
    pub name: String,
    #[serde(rename = "honorsSessionLimits")]
    pub honors_session_limits: bool,
    pub speed_limit_down_enabled: bool,
    /// KB/s.
    pub speed_limit_down: i64,
    pub speed_limit_up_enabled: bool,
    /// KB/s.
    pub speed_limit_up: i64,
}

/// `group-get`. No names means every group.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GroupGetArgs {
    #[serde(rename = "group", skip_serializing_if = "Vec::is_empty")]
    pub names: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GroupGetResult {
    pub group: Vec<Group>,
}

/// `group-set`. Creates the group if it does not exist.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct GroupSetArgs {
    pub name: String,
    #[serde(rename = "honorsSessionLimits", skip_serializing_if = "Option::is_none")]
    pub honors_session_limits: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed_limit_down_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed_limit_down: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed_limit_up_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed_limit_up: Option<i64>,
}

impl GroupSetArgs {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}
