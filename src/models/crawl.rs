//! Crawl history records.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{Display, EnumString, IntoStaticStr};
use time::OffsetDateTime;

/// Outcome of a single crawl.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CrawlStatus {
    Completed,
    Failed,
    Blocked,
    Timeout,
    InternalError,
}

impl CrawlStatus {
    /// Wire representation.
    pub fn as_str(&self) -> &'static str {
        self.into()
    }

    /// Whether the crawl produced a usable snapshot.
    pub fn is_success(&self) -> bool {
        matches!(self, CrawlStatus::Completed)
    }
}

/// One historical crawl of an instance.
///
/// The counters mirror the instance snapshot at crawl time and are absent
/// when the crawl did not complete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Crawl {
    pub id: String,
    /// Identifier of the instance this crawl belongs to.
    pub instance_id: String,
    #[serde(with = "time::serde::rfc3339")]
    pub started_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub finished_at: OffsetDateTime,
    pub status: CrawlStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<f64>,
    /// Machine-readable failure code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    /// Human-readable failure description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_peers: Option<i64>,
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
    /// Raw nodeinfo document, passed through uninterpreted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_nodeinfo: Option<Map<String, Value>>,
}

impl Crawl {
    /// Crawl duration in seconds, falling back to the timestamps when the
    /// service omitted `duration_seconds`.
    pub fn elapsed_seconds(&self) -> f64 {
        self.duration_seconds
            .unwrap_or_else(|| (self.finished_at - self.started_at).as_seconds_f64())
    }

    /// Failure text for display, preferring the description over the code.
    pub fn error_text(&self) -> Option<&str> {
        self.error_code_description
            .as_deref()
            .or(self.error_code.as_deref())
    }
}
