//! Instance records as returned by the crawl service.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

/// Lifecycle status of a tracked instance.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum InstanceStatus {
    /// Never successfully crawled.
    Unknown,
    /// Last crawl succeeded.
    Up,
    /// Last crawl could not reach the instance.
    Down,
    /// Reachable but returned unusable metadata.
    Unhealthy,
    /// Crawling is blocked by the instance.
    Blocked,
}

impl InstanceStatus {
    /// Wire representation.
    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}

/// A federated-network node tracked by the crawl service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    /// Service-assigned identifier.
    pub id: String,
    /// Domain name of the instance.
    pub domain: String,
    /// Current status.
    pub status: InstanceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Software name reported by nodeinfo (e.g. "mastodon").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub software: Option<String>,
    /// Software version reported by nodeinfo.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_peers: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_registrations: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_users: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_users_half_year: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_users_month: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_posts: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_comments: Option<i64>,
}

impl Instance {
    /// Software name with version, e.g. "mastodon 4.2.1".
    pub fn software_label(&self) -> Option<String> {
        match (&self.software, &self.version) {
            (Some(software), Some(version)) => Some(format!("{} {}", software, version)),
            (Some(software), None) => Some(software.clone()),
            (None, _) => None,
        }
    }
}
