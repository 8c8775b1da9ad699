pub mod analytics;
pub mod auth;
pub mod error;
pub mod middleware;
pub mod password;
pub mod reports;
pub mod routes;
pub mod token;
pub mod towers;

use std::sync::Arc;

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use tracing::warn;

use signalscope_db::Database;

use crate::error::ApiError;
use crate::token::TokenService;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    /// None when the store could not be opened at startup — the process
    /// serves in a degraded state and store-backed endpoints return 503.
    pub db: Option<Arc<Database>>,
    pub tokens: TokenService,
    /// Fixed carrier enumeration for the analytics breakdown.
    pub carriers: Vec<String>,
}

impl AppStateInner {
    pub fn db(&self) -> Result<Arc<Database>, ApiError> {
        self.db.clone().ok_or(ApiError::PersistenceUnavailable)
    }
}

/// Fixed-width RFC 3339 with a Z suffix, so lexical order on the stored
/// column is chronological order.
pub(crate) fn format_timestamp(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Rows store RFC 3339, but tolerate SQLite's bare "YYYY-MM-DD HH:MM:SS"
/// form too. A corrupt value is logged and degrades to the epoch rather
/// than failing the whole response.
pub(crate) fn parse_timestamp(raw: &str, context: &str) -> DateTime<Utc> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            warn!("Corrupt created_at '{}' on {}: {}", raw, context, e);
            DateTime::default()
        })
}
