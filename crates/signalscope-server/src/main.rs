mod config;

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use signalscope_api::token::TokenService;
use signalscope_api::{AppState, AppStateInner, routes};
use signalscope_db::Database;
use signalscope_db::models::TowerRow;
use signalscope_types::models::Tower;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "signalscope=debug,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env()?;

    // An unreachable store must not prevent startup: serve degraded and
    // let store-backed endpoints answer 503 until the next restart.
    let db = match Database::open(&config.db_path) {
        Ok(db) => Some(Arc::new(db)),
        Err(e) => {
            error!("Store unavailable at startup, serving degraded: {e}");
            None
        }
    };

    if let (Some(db), Some(seed)) = (&db, &config.tower_seed) {
        if let Err(e) = seed_towers(db, seed) {
            warn!("Tower seed from {} failed: {e:#}", seed.display());
        }
    }

    let state: AppState = Arc::new(AppStateInner {
        db,
        tokens: TokenService::new(
            &config.jwt_secret,
            chrono::Duration::minutes(config.token_ttl_minutes),
        ),
        carriers: config.carriers.clone(),
    });

    let app = routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("SignalScope API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn seed_towers(db: &Database, path: &Path) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(path)?;
    let towers: Vec<Tower> = serde_json::from_str(&raw)?;

    for tower in &towers {
        db.upsert_tower(&TowerRow {
            id: tower.id.clone(),
            lat: tower.lat,
            lng: tower.lng,
            operator: tower.operator.clone(),
            height: tower.height,
            tech: serde_json::to_string(&tower.tech)?,
        })?;
    }

    info!("Seeded {} towers from {}", towers.len(), path.display());
    Ok(())
}
