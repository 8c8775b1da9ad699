use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use tracing::error;

use signalscope_types::models::Tower;

use crate::AppState;
use crate::error::ApiError;

/// Response-size bound on the tower listing.
const MAX_TOWERS: u32 = 1000;

/// Operator value meaning "no operator filter".
const ALL_OPERATORS: &str = "All";

#[derive(Debug, Deserialize)]
pub struct TowerQuery {
    pub operator: Option<String>,
    pub tech: Option<String>,
}

/// Public, read-only tower catalog lookup.
pub async fn list_towers(
    State(state): State<AppState>,
    Query(query): Query<TowerQuery>,
) -> Result<Json<Vec<Tower>>, ApiError> {
    let db = state.db()?;

    let operator = query.operator.filter(|o| o != ALL_OPERATORS);
    let tech = query.tech;

    let rows = tokio::task::spawn_blocking(move || {
        db.list_towers(operator.as_deref(), tech.as_deref(), MAX_TOWERS)
    })
    .await
    .map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        ApiError::Internal(e.into())
    })??;

    let towers = rows
        .into_iter()
        .map(|row| {
            let tech: Vec<String> = serde_json::from_str(&row.tech).unwrap_or_else(|e| {
                tracing::warn!("Corrupt tech tags '{}' on tower '{}': {}", row.tech, row.id, e);
                Vec::new()
            });
            Tower {
                id: row.id,
                lat: row.lat,
                lng: row.lng,
                operator: row.operator,
                height: row.height,
                tech,
            }
        })
        .collect();

    Ok(Json(towers))
}
