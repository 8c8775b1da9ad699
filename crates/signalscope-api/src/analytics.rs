use std::collections::{BTreeMap, HashMap};

use axum::{Json, extract::State};
use tracing::error;

use signalscope_types::api::AnalyticsSummary;

use crate::AppState;
use crate::error::ApiError;

/// Coverage rollup: per-carrier tower counts plus unfiltered totals.
///
/// The breakdown is computed only for the configured carrier list — an
/// operator outside the list is invisible here even if towers for it
/// exist, and a listed carrier with no towers reports 0.
pub async fn summary(State(state): State<AppState>) -> Result<Json<AnalyticsSummary>, ApiError> {
    let db = state.db()?;

    let (by_operator, total_towers, total_reports) = tokio::task::spawn_blocking(move || {
        let by_operator = db.count_towers_by_operator()?;
        let total_towers = db.count_towers()?;
        let total_reports = db.count_reports()?;
        Ok::<_, signalscope_db::StoreError>((by_operator, total_towers, total_reports))
    })
    .await
    .map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        ApiError::Internal(e.into())
    })??;

    let counts: HashMap<String, i64> = by_operator.into_iter().collect();
    let towers_by_carrier: BTreeMap<String, i64> = state
        .carriers
        .iter()
        .map(|carrier| (carrier.clone(), counts.get(carrier).copied().unwrap_or(0)))
        .collect();

    Ok(Json(AnalyticsSummary {
        towers_by_carrier,
        total_towers,
        total_reports,
    }))
}
