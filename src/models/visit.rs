use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Longest `ip_address` accepted as search input.
pub const MAX_IP_LEN: usize = 100;

/// One row per distinct (ip_address, url_visited) pair.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct VisitRecord {
    pub id: i64,
    pub ip_address: String,
    pub visit_time: String,
    pub url_visited: String,
    pub visit_count: i64,
}

/// Row returned by the per-IP history search.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct IpHistoryRow {
    pub ip_address: String,
    pub url_visited: String,
    pub visit_time: String,
}

/// Fixed-width UTC timestamp, so that string comparison in SQL matches
/// chronological order.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Render a stored `visit_time` for display, falling back to the raw value.
pub fn display_timestamp(stored: &str) -> String {
    match stored.parse::<DateTime<Utc>>() {
        Ok(at) => at.format("%Y-%m-%d %H:%M:%S").to_string(),
        Err(_) => stored.to_string(),
    }
}
