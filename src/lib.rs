pub mod config;
pub mod db;
pub mod models;
pub mod pipeline;

use tracing_subscriber::EnvFilter;

use crate::config::ModelSettings;
use crate::db::{SessionStore, SqliteSessionStore};
use crate::pipeline::model::connect;
use crate::pipeline::triage::TriageEngine;
use crate::pipeline::{Pipeline, PipelineError};

/// Fixed demo inputs: (patient id, free-text complaint).
pub const DEMO_INPUTS: &[(&str, &str)] = &[
    ("patient_1", "I have fever and cough for 3 days"),
    ("patient_2", "Sudden chest pain and sweating after exercise"),
    ("patient_3", "Mild abdominal pain and diarrhea"),
];

/// Run the demo: triage every input in `DEMO_INPUTS`, print each session,
/// then export all stored sessions to CSV.
pub fn run() -> Result<(), PipelineError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let store = SqliteSessionStore::open(&config::database_path())?;
    let client = connect(&ModelSettings::from_env());
    let pipeline = Pipeline::new(TriageEngine::new(client), store);

    for (patient_id, text) in DEMO_INPUTS {
        let session = pipeline.run_once(text, patient_id)?;
        println!("Session: {}", session.id);
        println!("{}", serde_json::to_string_pretty(&session.result)?);
        println!();
    }

    let exported = pipeline.store().export_csv(&config::export_path())?;
    println!("Exported: {}", exported.display());
    Ok(())
}
