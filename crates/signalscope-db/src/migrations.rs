use rusqlite::Connection;
use tracing::info;

use crate::StoreResult;

pub fn run(conn: &Connection) -> StoreResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id          TEXT PRIMARY KEY,
            email       TEXT NOT NULL UNIQUE COLLATE NOCASE,
            password    TEXT NOT NULL,
            name        TEXT NOT NULL,
            created_at  TEXT NOT NULL
        );

        -- Reference data, provisioned out-of-band. `tech` holds a JSON
        -- array of technology tags, e.g. [\"4G\",\"5G\"].
        CREATE TABLE IF NOT EXISTS towers (
            id          TEXT PRIMARY KEY,
            lat         REAL NOT NULL,
            lng         REAL NOT NULL,
            operator    TEXT NOT NULL,
            height      INTEGER NOT NULL,
            tech        TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_towers_operator
            ON towers(operator);

        -- Append-only. user_id is an advisory reference, not a foreign
        -- key constraint.
        CREATE TABLE IF NOT EXISTS reports (
            id               TEXT PRIMARY KEY,
            user_id          TEXT NOT NULL,
            lat              REAL NOT NULL,
            lng              REAL NOT NULL,
            carrier          TEXT NOT NULL,
            signal_strength  INTEGER NOT NULL,
            device           TEXT NOT NULL,
            created_at       TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_reports_created
            ON reports(created_at);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
