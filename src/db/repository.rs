use chrono::{SecondsFormat, Utc};
use rusqlite::{params, Connection};
use uuid::Uuid;

use super::DatabaseError;
use crate::models::{PipelineResult, Session};

/// Raw session row, as stored and as exported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRow {
    pub session_id: String,
    pub patient_id: String,
    pub input_text: String,
    pub result_json: String,
    pub created_at: String,
}

impl SessionRow {
    pub fn into_session(self) -> Result<Session, DatabaseError> {
        let id = Uuid::parse_str(&self.session_id).map_err(|_| DatabaseError::InvalidId {
            field: "session_id",
            value: self.session_id.clone(),
        })?;
        Ok(Session {
            id,
            patient_id: self.patient_id,
            input_text: self.input_text,
            result: serde_json::from_str(&self.result_json)?,
            created_at: self.created_at,
        })
    }
}

/// Insert one session (and its patient, if new). Returns the fresh session id.
///
/// Patient and session rows are written in a single transaction.
pub fn insert_session(
    conn: &Connection,
    patient_id: &str,
    input_text: &str,
    result: &PipelineResult,
) -> Result<Session, DatabaseError> {
    let session_id = Uuid::new_v4();
    let now = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);
    let result_json = serde_json::to_string(result)?;

    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "INSERT OR IGNORE INTO patients (patient_id, name, created_at) VALUES (?1, ?2, ?3)",
        params![patient_id, patient_id, now],
    )?;
    tx.execute(
        "INSERT INTO sessions (session_id, patient_id, input_text, result_json, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![session_id.to_string(), patient_id, input_text, result_json, now],
    )?;
    tx.commit()?;

    Ok(Session {
        id: session_id,
        patient_id: patient_id.to_string(),
        input_text: input_text.to_string(),
        result: result.clone(),
        created_at: now,
    })
}

/// All session rows in insertion order.
pub fn fetch_session_rows(conn: &Connection) -> Result<Vec<SessionRow>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT session_id, patient_id, input_text, result_json, created_at
         FROM sessions ORDER BY rowid ASC",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(SessionRow {
            session_id: row.get(0)?,
            patient_id: row.get(1)?,
            input_text: row.get(2)?,
            result_json: row.get(3)?,
            created_at: row.get(4)?,
        })
    })?;
    let collected = rows.collect::<Result<Vec<_>, _>>()?;
    Ok(collected)
}

/// All sessions in insertion order, with results parsed back.
pub fn fetch_sessions(conn: &Connection) -> Result<Vec<Session>, DatabaseError> {
    fetch_session_rows(conn)?
        .into_iter()
        .map(SessionRow::into_session)
        .collect()
}
