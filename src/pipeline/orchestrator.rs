use thiserror::Error;

use super::followup::build_followup;
use super::intake::parse_symptoms;
use super::referral::suggest_specialist;
use super::triage::TriageEngine;
use crate::db::{DatabaseError, SessionStore};
use crate::models::{PipelineResult, Session};

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Session persistence failed: {0}")]
    Database(#[from] DatabaseError),

    #[error("Result rendering failed: {0}")]
    Render(#[from] serde_json::Error),
}

/// End-to-end triage run for one input.
///
/// Coordinates: parse → triage → referral → follow-up → persist. Only the
/// persistence step can fail; model trouble is absorbed by the engine.
pub struct Pipeline<S: SessionStore> {
    engine: TriageEngine,
    store: S,
}

impl<S: SessionStore> Pipeline<S> {
    pub fn new(engine: TriageEngine, store: S) -> Self {
        Self { engine, store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn run_once(&self, text: &str, patient_id: &str) -> Result<Session, PipelineError> {
        let parsed = parse_symptoms(text);
        tracing::debug!(patient_id, symptoms = ?parsed.symptoms, duration = ?parsed.duration, "Input parsed");

        let triage = self.engine.triage(&parsed);
        let referral = suggest_specialist(&triage.differential);
        let followup = build_followup(&parsed, &triage);

        let result = PipelineResult {
            parsed,
            triage,
            referral,
            followup,
        };
        let session = self.store.save(patient_id, text, &result)?;
        Ok(session)
    }
}
