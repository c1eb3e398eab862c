use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::intake::ParsedInput;
use super::triage::TriageResult;

/// Specialist suggestion derived from the top condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Referral {
    pub suggested_specialist: String,
    pub notes: String,
}

/// Ordered next steps for the patient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowupPlan {
    pub followup_plan: Vec<String>,
}

/// Everything one pipeline run produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineResult {
    pub parsed: ParsedInput,
    pub triage: TriageResult,
    pub referral: Referral,
    pub followup: FollowupPlan,
}

/// A persisted pipeline run. Append-only: there is no update path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub patient_id: String,
    pub input_text: String,
    pub result: PipelineResult,
    /// RFC 3339, UTC.
    pub created_at: String,
}
