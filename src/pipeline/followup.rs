//! Follow-up plan derived from triage severity.

use crate::models::{FollowupPlan, ParsedInput, Severity, TriageResult};

/// Build the ordered follow-up steps for one triaged input.
pub fn build_followup(_parsed: &ParsedInput, triage: &TriageResult) -> FollowupPlan {
    let first = match triage.severity {
        Severity::Emergency => "Seek immediate emergency care (call local emergency number).",
        Severity::Urgent => "Arrange an urgent appointment with the suggested specialist.",
        Severity::Stable => "Home care and monitoring for 48 hours. Return if worsening.",
    };
    FollowupPlan {
        followup_plan: vec![first.to_string(), "Follow-up in 3-7 days.".to_string()],
    }
}
