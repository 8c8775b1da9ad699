use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Static reference data — towers are provisioned out-of-band and never
/// written by the API. The id is the externally assigned tower identifier,
/// not a store-internal key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tower {
    pub id: String,
    pub lat: f64,
    pub lng: f64,
    pub operator: String,
    pub height: i64,
    pub tech: Vec<String>,
}

/// A single user-submitted signal observation. Append-only; the timestamp
/// is assigned by the server at insertion, never taken from the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub id: Uuid,
    pub user_id: Uuid,
    pub lat: f64,
    pub lng: f64,
    pub carrier: String,
    pub signal_strength: i64,
    pub device: String,
    pub created_at: DateTime<Utc>,
}
