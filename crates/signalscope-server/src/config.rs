use std::path::PathBuf;

use anyhow::Context;

/// Process configuration, read from the environment once at startup and
/// injected into the components that need it. Nothing reads env vars after
/// this point.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub jwt_secret: String,
    pub token_ttl_minutes: i64,
    pub carriers: Vec<String>,
    /// Optional JSON file of towers loaded at startup (towers are
    /// otherwise provisioned out-of-band).
    pub tower_seed: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let host = std::env::var("SIGNALSCOPE_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port: u16 = std::env::var("SIGNALSCOPE_PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .context("SIGNALSCOPE_PORT is not a valid port")?;
        let db_path =
            std::env::var("SIGNALSCOPE_DB_PATH").unwrap_or_else(|_| "signalscope.db".into());
        let jwt_secret =
            std::env::var("SIGNALSCOPE_JWT_SECRET").unwrap_or_else(|_| "dev-secret-change-me".into());
        let token_ttl_minutes: i64 = std::env::var("SIGNALSCOPE_TOKEN_TTL_MINUTES")
            .unwrap_or_else(|_| "10080".into())
            .parse()
            .context("SIGNALSCOPE_TOKEN_TTL_MINUTES is not a valid integer")?;
        let carriers = parse_carriers(
            &std::env::var("SIGNALSCOPE_CARRIERS")
                .unwrap_or_else(|_| "Verizon,AT&T,T-Mobile".into()),
        );
        let tower_seed = std::env::var("SIGNALSCOPE_TOWER_SEED").ok().map(PathBuf::from);

        Ok(Self {
            host,
            port,
            db_path: PathBuf::from(db_path),
            jwt_secret,
            token_ttl_minutes,
            carriers,
            tower_seed,
        })
    }
}

fn parse_carriers(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
