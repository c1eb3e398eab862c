pub mod intake;
pub mod safety;
pub mod model;
pub mod triage;
pub mod referral;
pub mod followup;
pub mod orchestrator;

pub use orchestrator::{Pipeline, PipelineError};
