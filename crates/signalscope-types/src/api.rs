use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::User;

// -- JWT Claims --

/// JWT claims shared between token issuance (auth handlers) and the
/// bearer-auth middleware. Canonical definition lives here in
/// signalscope-types to eliminate duplication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Token envelope returned by both register and login.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub user: User,
}

// -- Reports --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SubmitReportRequest {
    pub lat: f64,
    pub lng: f64,
    pub carrier: String,
    pub signal_strength: i64,
    pub device: String,
}

// -- Analytics --

#[derive(Debug, Serialize, Deserialize)]
pub struct AnalyticsSummary {
    pub towers_by_carrier: BTreeMap<String, i64>,
    pub total_towers: i64,
    pub total_reports: i64,
}
