use axum::{
    Json, Router,
    routing::{get, post},
};

use crate::middleware::require_auth;
use crate::{AppState, analytics, auth, reports, towers};

/// The full route table, shared by the server binary and the integration
/// tests. Tower, report-read, and analytics endpoints are intentionally
/// public; only report submission requires a bearer token.
pub fn router(state: AppState) -> Router {
    let public = Router::new()
        .route("/", get(health))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/towers", get(towers::list_towers))
        .route("/reports", get(reports::list_reports))
        .route("/analytics/summary", get(analytics::summary))
        .with_state(state.clone());

    let protected = Router::new()
        .route("/reports", post(reports::submit_report))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ))
        .with_state(state);

    Router::new().merge(public).merge(protected)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok", "service": "SignalScope API" }))
}
