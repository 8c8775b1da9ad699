use axum::{
    Extension, Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::{error, warn};
use uuid::Uuid;

use signalscope_db::models::ReportRow;
use signalscope_types::api::SubmitReportRequest;
use signalscope_types::models::Report;

use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::{AppState, format_timestamp, parse_timestamp};

/// Response-size bound on the report listing.
const MAX_REPORTS: u32 = 100;

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    pub carrier: Option<String>,
}

/// Authenticated write path. The id and timestamp are server-assigned;
/// coordinates and signal strength are stored as submitted — the full i64
/// range is accepted, never clamped.
pub async fn submit_report(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Json(req): Json<SubmitReportRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.db()?;

    let report = Report {
        id: Uuid::new_v4(),
        user_id,
        lat: req.lat,
        lng: req.lng,
        carrier: req.carrier,
        signal_strength: req.signal_strength,
        device: req.device,
        created_at: Utc::now(),
    };

    let row = ReportRow {
        id: report.id.to_string(),
        user_id: report.user_id.to_string(),
        lat: report.lat,
        lng: report.lng,
        carrier: report.carrier.clone(),
        signal_strength: report.signal_strength,
        device: report.device.clone(),
        created_at: format_timestamp(report.created_at),
    };

    tokio::task::spawn_blocking(move || db.insert_report(&row))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal(e.into())
        })??;

    Ok((StatusCode::CREATED, Json(report)))
}

/// Public read path: newest first, capped at [`MAX_REPORTS`].
pub async fn list_reports(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<Vec<Report>>, ApiError> {
    let db = state.db()?;
    let carrier = query.carrier;

    let rows = tokio::task::spawn_blocking(move || db.list_reports(carrier.as_deref(), MAX_REPORTS))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal(e.into())
        })??;

    let reports = rows
        .into_iter()
        .map(|row| Report {
            id: row.id.parse().unwrap_or_else(|e| {
                warn!("Corrupt report id '{}': {}", row.id, e);
                Uuid::default()
            }),
            user_id: row.user_id.parse().unwrap_or_else(|e| {
                warn!("Corrupt user_id '{}' on report '{}': {}", row.user_id, row.id, e);
                Uuid::default()
            }),
            lat: row.lat,
            lng: row.lng,
            carrier: row.carrier,
            signal_strength: row.signal_strength,
            device: row.device,
            created_at: parse_timestamp(&row.created_at, "report"),
        })
        .collect();

    Ok(Json(reports))
}
