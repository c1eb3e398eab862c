use crate::models::ParsedInput;

/// Differential-diagnosis prompt. `{symptoms}` and `{duration}` are replaced
/// literally so the JSON examples keep their braces.
pub const TRIAGE_PROMPT_TEMPLATE: &str = r#"
You are a clinical triage assistant. Given a short free-text patient symptom description and duration, produce a JSON array (only JSON, nothing else) of up to 5 possible conditions ordered by likelihood.
Each array element must be an object with these keys:
  - condition: string (name of likely condition)
  - confidence: number (0.0 - 1.0) representing model's estimated likelihood
  - evidence: short string (1-2 sentences) describing which symptoms or facts support this suggestion

Be concise. Provide real-world plausible conditions but do NOT give definitive diagnoses. If red flags are present (e.g., chest pain, sudden severe headache, loss of consciousness), include them in the evidence and ensure severity is set accordingly in the wrapper.

Examples (the model should mimic this exact JSON format):

Example 1:
Input: symptoms: ["fever","cough"], duration: "3 days"
Output JSON:
[
  {"condition": "Upper respiratory infection", "confidence": 0.75, "evidence": "fever and cough over multiple days consistent with URI"},
  {"condition": "Influenza", "confidence": 0.45, "evidence": "systemic viral symptoms may indicate influenza"},
  {"condition": "COVID-19", "confidence": 0.3, "evidence": "overlapping symptoms possible; test recommended if exposure"}
]

Example 2:
Input: symptoms: ["chest pain","sweating"], duration: "immediate"
Output JSON:
[
  {"condition": "Acute coronary syndrome", "confidence": 0.85, "evidence": "sudden chest pain and sweating are high-risk for ACS"},
  {"condition": "Musculoskeletal chest pain", "confidence": 0.2, "evidence": "mechanical onset possible if related to movement"}
]

Now produce the JSON array for the following input:
symptoms: {symptoms}
duration: {duration}
Respond ONLY with valid JSON (an array as above).
"#;

// Rendered in place of a missing duration instead of a null literal such as "None".
const UNSPECIFIED_DURATION: &str = "unspecified";

/// Build the triage prompt for one parsed input.
pub fn build_triage_prompt(parsed: &ParsedInput) -> String {
    let symptoms = serde_json::to_string(&parsed.symptoms).unwrap_or_else(|_| "[]".to_string());
    let duration = parsed.duration.as_deref().unwrap_or(UNSPECIFIED_DURATION);
    TRIAGE_PROMPT_TEMPLATE
        .replace("{symptoms}", &symptoms)
        .replace("{duration}", duration)
}
