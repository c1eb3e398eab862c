use std::path::Path;

use rusqlite::Connection;

use super::DatabaseError;

/// Numbered schema scripts, applied in order on top of `schema_version`.
const MIGRATIONS: &[(i64, &str)] = &[(1, include_str!("../../resources/migrations/001_initial.sql"))];

/// Session database at `path`, created along with its directory on first use.
pub fn open_database(path: &Path) -> Result<Connection, DatabaseError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    prepare(Connection::open(path)?)
}

/// Throwaway session database; nothing touches disk.
pub fn open_memory_database() -> Result<Connection, DatabaseError> {
    prepare(Connection::open_in_memory()?)
}

fn prepare(conn: Connection) -> Result<Connection, DatabaseError> {
    // Sessions reference patients, so enforcement has to be switched on per connection.
    conn.execute_batch(
        "PRAGMA journal_mode=DELETE;
         PRAGMA foreign_keys=ON;",
    )?;
    run_migrations(&conn)?;
    Ok(conn)
}

/// Apply every script newer than the recorded schema version.
pub fn run_migrations(conn: &Connection) -> Result<(), DatabaseError> {
    let applied = schema_version(conn);
    for &(version, sql) in MIGRATIONS.iter().filter(|(v, _)| *v > applied) {
        tracing::info!(version, "Applying session schema migration");
        conn.execute_batch(sql).map_err(|e| DatabaseError::MigrationFailed {
            version,
            reason: e.to_string(),
        })?;
    }
    Ok(())
}

/// Highest applied version; 0 on a fresh file where the table is missing.
fn schema_version(conn: &Connection) -> i64 {
    conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| {
        row.get::<_, Option<i64>>(0)
    })
    .ok()
    .flatten()
    .unwrap_or(0)
}

pub fn count_tables(conn: &Connection) -> Result<i64, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
        [],
        |row| row.get::<_, i64>(0),
    )?;
    Ok(count)
}
