use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use rusqlite::Connection;

use super::export::export_sessions_csv;
use super::repository::{fetch_session_rows, fetch_sessions, insert_session};
use super::sqlite::{open_database, open_memory_database};
use super::DatabaseError;
use crate::models::{PipelineResult, Session};

/// Persistence seam consumed by the pipeline.
///
/// Implementations keep at most one row per session id and never update or
/// delete sessions.
pub trait SessionStore: Send + Sync {
    /// Persist one run. Returns the stored session with its fresh id.
    fn save(
        &self,
        patient_id: &str,
        input_text: &str,
        result: &PipelineResult,
    ) -> Result<Session, DatabaseError>;

    fn list_sessions(&self) -> Result<Vec<Session>, DatabaseError>;

    /// Write every session to `destination` as CSV and return that path.
    fn export_csv(&self, destination: &Path) -> Result<PathBuf, DatabaseError>;
}

/// SQLite-backed session store.
///
/// The connection sits behind a mutex so concurrent writers serialize; each
/// save is one transaction.
pub struct SqliteSessionStore {
    conn: Mutex<Connection>,
}

impl SqliteSessionStore {
    /// Open (creating if needed) the database file and run migrations.
    pub fn open(path: &Path) -> Result<Self, DatabaseError> {
        let conn = open_database(path)?;
        tracing::info!(path = %path.display(), "Session store ready");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory() -> Result<Self, DatabaseError> {
        Ok(Self {
            conn: Mutex::new(open_memory_database()?),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, DatabaseError> {
        self.conn.lock().map_err(|_| DatabaseError::LockPoisoned)
    }
}

impl SessionStore for SqliteSessionStore {
    fn save(
        &self,
        patient_id: &str,
        input_text: &str,
        result: &PipelineResult,
    ) -> Result<Session, DatabaseError> {
        let conn = self.conn()?;
        let session = insert_session(&conn, patient_id, input_text, result)?;
        tracing::info!(session_id = %session.id, patient_id, "Session saved");
        Ok(session)
    }

    fn list_sessions(&self) -> Result<Vec<Session>, DatabaseError> {
        let conn = self.conn()?;
        fetch_sessions(&conn)
    }

    fn export_csv(&self, destination: &Path) -> Result<PathBuf, DatabaseError> {
        let rows = {
            let conn = self.conn()?;
            fetch_session_rows(&conn)?
        };
        export_sessions_csv(destination, &rows)?;
        tracing::info!(path = %destination.display(), count = rows.len(), "Sessions exported");
        Ok(destination.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use uuid::Uuid;

    use super::*;
    use crate::db::repository::fixtures::sample_result;

    #[test]
    fn save_then_list() {
        let store = SqliteSessionStore::open_in_memory().unwrap();
        let saved = store.save("patient_1", "fever", &sample_result("fever")).unwrap();
        let sessions = store.list_sessions().unwrap();
        assert_eq!(sessions, vec![saved]);
    }

    #[test]
    fn concurrent_saves_all_land() {
        let store = Arc::new(SqliteSessionStore::open_in_memory().unwrap());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    let text = format!("run {i}");
                    store.save("p", &text, &sample_result(&text)).unwrap().id
                })
            })
            .collect();
        let mut ids: Vec<Uuid> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 8);
        assert_eq!(store.list_sessions().unwrap().len(), 8);
    }

    #[test]
    fn export_csv_returns_destination() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteSessionStore::open(&dir.path().join("triage.db")).unwrap();
        store.save("p", "fever, cough", &sample_result("fever, cough")).unwrap();

        let dest = dir.path().join("export.csv");
        let written = store.export_csv(&dest).unwrap();
        assert_eq!(written, dest);

        let content = std::fs::read_to_string(&dest).unwrap();
        assert!(content.starts_with("session_id,patient_id,input_text,result_json,created_at"));
        assert!(content.contains("\"fever, cough\""));
    }
}
