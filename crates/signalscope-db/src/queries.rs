use rusqlite::{Connection, OptionalExtension};

use crate::models::{ReportRow, TowerRow, UserRow};
use crate::{Database, StoreError, StoreResult};

impl Database {
    // -- Users --

    /// Insert a new user. The unique index on `email` (COLLATE NOCASE) is
    /// what enforces one-record-per-email, including under concurrent
    /// registration attempts.
    pub fn create_user(
        &self,
        id: &str,
        email: &str,
        password_hash: &str,
        name: &str,
        created_at: &str,
    ) -> StoreResult<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (id, email, password, name, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
                (id, email, password_hash, name, created_at),
            )
            .map_err(|e| match e {
                rusqlite::Error::SqliteFailure(f, _)
                    if f.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
                {
                    StoreError::DuplicateEmail
                }
                other => StoreError::Sqlite(other),
            })?;
            Ok(())
        })
    }

    pub fn find_user_by_email(&self, email: &str) -> StoreResult<Option<UserRow>> {
        self.with_conn(|conn| query_user_by_email(conn, email))
    }

    // -- Towers --

    /// Idempotent insert, used by the out-of-band seed path and by tests.
    pub fn upsert_tower(&self, tower: &TowerRow) -> StoreResult<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT OR REPLACE INTO towers (id, lat, lng, operator, height, tech)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![
                    tower.id,
                    tower.lat,
                    tower.lng,
                    tower.operator,
                    tower.height,
                    tower.tech
                ],
            )?;
            Ok(())
        })
    }

    /// Filtered tower lookup. `operator` must already have the "All"
    /// sentinel stripped; `tech` is a membership test against the JSON tag
    /// array. No ordering guarantee beyond store iteration order.
    pub fn list_towers(
        &self,
        operator: Option<&str>,
        tech: Option<&str>,
        limit: u32,
    ) -> StoreResult<Vec<TowerRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, lat, lng, operator, height, tech FROM towers
                 WHERE (?1 IS NULL OR operator = ?1)
                   AND (?2 IS NULL OR EXISTS (
                       SELECT 1 FROM json_each(towers.tech)
                       WHERE json_each.value = ?2))
                 LIMIT ?3",
            )?;

            let rows = stmt
                .query_map(rusqlite::params![operator, tech, limit], |row| {
                    Ok(TowerRow {
                        id: row.get(0)?,
                        lat: row.get(1)?,
                        lng: row.get(2)?,
                        operator: row.get(3)?,
                        height: row.get(4)?,
                        tech: row.get(5)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    // -- Reports --

    pub fn insert_report(&self, report: &ReportRow) -> StoreResult<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO reports (id, user_id, lat, lng, carrier, signal_strength, device, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                rusqlite::params![
                    report.id,
                    report.user_id,
                    report.lat,
                    report.lng,
                    report.carrier,
                    report.signal_strength,
                    report.device,
                    report.created_at
                ],
            )?;
            Ok(())
        })
    }

    /// Newest-first report listing with an optional carrier filter.
    pub fn list_reports(&self, carrier: Option<&str>, limit: u32) -> StoreResult<Vec<ReportRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, lat, lng, carrier, signal_strength, device, created_at
                 FROM reports
                 WHERE (?1 IS NULL OR carrier = ?1)
                 ORDER BY created_at DESC
                 LIMIT ?2",
            )?;

            let rows = stmt
                .query_map(rusqlite::params![carrier, limit], |row| {
                    Ok(ReportRow {
                        id: row.get(0)?,
                        user_id: row.get(1)?,
                        lat: row.get(2)?,
                        lng: row.get(3)?,
                        carrier: row.get(4)?,
                        signal_strength: row.get(5)?,
                        device: row.get(6)?,
                        created_at: row.get(7)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    // -- Counts --

    pub fn count_towers(&self) -> StoreResult<i64> {
        self.with_conn(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM towers", [], |r| r.get(0))?))
    }

    pub fn count_reports(&self) -> StoreResult<i64> {
        self.with_conn(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM reports", [], |r| r.get(0))?))
    }

    pub fn count_towers_by_operator(&self) -> StoreResult<Vec<(String, i64)>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT operator, COUNT(*) FROM towers GROUP BY operator")?;

            let rows = stmt
                .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
                .collect::<Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }
}

fn query_user_by_email(conn: &Connection, email: &str) -> StoreResult<Option<UserRow>> {
    let mut stmt =
        conn.prepare("SELECT id, email, password, name, created_at FROM users WHERE email = ?1")?;

    let row = stmt
        .query_row([email], |row| {
            Ok(UserRow {
                id: row.get(0)?,
                email: row.get(1)?,
                password: row.get(2)?,
                name: row.get(3)?,
                created_at: row.get(4)?,
            })
        })
        .optional()?;

    Ok(row)
}
