/// Database row types — these map directly to SQLite rows.
/// Distinct from signalscope-types API models to keep the DB layer
/// independent.

#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: String,
    pub email: String,
    pub password: String,
    pub name: String,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct TowerRow {
    pub id: String,
    pub lat: f64,
    pub lng: f64,
    pub operator: String,
    pub height: i64,
    /// JSON array of technology tags.
    pub tech: String,
}

#[derive(Debug, Clone)]
pub struct ReportRow {
    pub id: String,
    pub user_id: String,
    pub lat: f64,
    pub lng: f64,
    pub carrier: String,
    pub signal_strength: i64,
    pub device: String,
    pub created_at: String,
}
