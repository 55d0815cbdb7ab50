use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Canonical lowercase skills, deduplicated. Iteration order is lexicographic.
pub type SkillSet = BTreeSet<String>;

/// Best-effort "N years" estimate. Zero when the text mentions none.
pub type ExperienceYears = u32;

/// Coarse three-tier summary of a 0–100 score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchLabel {
    #[serde(rename = "Strong Match")]
    Strong,
    #[serde(rename = "Moderate Match")]
    Moderate,
    #[serde(rename = "Weak Match")]
    Weak,
}

impl MatchLabel {
    /// Inclusive lower bounds: 90 → Strong, 50 → Moderate.
    pub fn from_score(score: f64) -> Self {
        if score >= 90.0 {
            MatchLabel::Strong
        } else if score >= 50.0 {
            MatchLabel::Moderate
        } else {
            MatchLabel::Weak
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MatchLabel::Strong => "Strong Match",
            MatchLabel::Moderate => "Moderate Match",
            MatchLabel::Weak => "Weak Match",
        }
    }
}

impl fmt::Display for MatchLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sub-scores as percentages, rounded to one decimal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComponentScores {
    pub skills: f64,
    pub semantic: f64,
    pub experience: f64,
}

/// Outcome of scoring one (job description, résumé) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub score: f64, // 0 – 100
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub explanation: String,
    pub component_scores: ComponentScores,
    pub match_label: MatchLabel,
}

/// Completeness heuristics over a single résumé, independent of any job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    pub score: f64, // 0 – 100
    pub issues: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateInput {
    #[serde(default, deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub text: String,
}

/// One row of the ranked batch.
///
/// `error` is set when this candidate could not be scored; the score fields
/// then hold the zero/weak placeholders and the row ranks last.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateResult {
    pub id: String,
    pub anonymized_name: String,
    pub score: f64,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub explanation: String,
    pub component_scores: ComponentScores,
    pub match_label: MatchLabel,
    pub quality_score: f64,
    pub quality_issues: Vec<String>,
    pub gap_message: String,
    pub resume_years: ExperienceYears,
    /// Raw résumé text, echoed back for preview.
    #[serde(default)]
    pub resume_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScreeningReport {
    pub screening_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub semantic_backend: &'static str,
    pub job_skills: Vec<String>,
    pub job_years: ExperienceYears,
    pub results: Vec<CandidateResult>,
}

/// Candidate ids arrive as strings or bare numbers from the upload form.
pub(crate) fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_boundaries() {
        assert_eq!(MatchLabel::from_score(90.0), MatchLabel::Strong);
        assert_eq!(MatchLabel::from_score(89.9999), MatchLabel::Moderate);
        assert_eq!(MatchLabel::from_score(50.0), MatchLabel::Moderate);
        assert_eq!(MatchLabel::from_score(49.9999), MatchLabel::Weak);
        assert_eq!(MatchLabel::from_score(0.0), MatchLabel::Weak);
        assert_eq!(MatchLabel::from_score(100.0), MatchLabel::Strong);
    }

    #[test]
    fn test_label_serializes_as_display_text() {
        let json = serde_json::to_string(&MatchLabel::Moderate).unwrap();
        assert_eq!(json, r#""Moderate Match""#);
        let label: MatchLabel = serde_json::from_str(r#""Strong Match""#).unwrap();
        assert_eq!(label, MatchLabel::Strong);
    }

    #[test]
    fn test_candidate_input_accepts_numeric_id() {
        let input: CandidateInput = serde_json::from_str(r#"{"id": 7, "text": "hi"}"#).unwrap();
        assert_eq!(input.id, "7");
        let input: CandidateInput = serde_json::from_str(r#"{"text": "hi"}"#).unwrap();
        assert_eq!(input.id, "");
    }
}
