//! CSV and plain-text exports of a ranked screening batch.
//!
//! Rows come back from the client, so every field is optional and defaults
//! to an empty/zero value.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::screening::models::deserialize_id;

const BANNER_WIDTH: usize = 60;
const JD_SUMMARY_CHARS: usize = 200;

const CSV_HEADER: [&str; 7] = [
    "Rank",
    "Candidate ID",
    "Score",
    "Match Label",
    "Matched Skills",
    "Missing Skills",
    "Quality Score",
];

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ExportRow {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub anonymized_name: Option<String>,
    pub score: f64,
    pub match_label: Option<String>,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub quality_score: f64,
}

/// One header line plus one line per row, ranks starting at 1. Lines end in CRLF.
pub fn render_csv(rows: &[ExportRow]) -> String {
    let mut out = String::new();
    push_csv_line(&mut out, CSV_HEADER.iter().map(|h| h.to_string()));

    for (idx, row) in rows.iter().enumerate() {
        push_csv_line(
            &mut out,
            [
                (idx + 1).to_string(),
                row.id.clone(),
                format_number(row.score),
                row.match_label.clone().unwrap_or_default(),
                row.matched_skills.join(", "),
                row.missing_skills.join(", "),
                format_number(row.quality_score),
            ],
        );
    }
    out
}

fn push_csv_line(out: &mut String, fields: impl IntoIterator<Item = String>) {
    let line: Vec<String> = fields.into_iter().map(|f| escape_csv_field(&f)).collect();
    out.push_str(&line.join(","));
    out.push_str("\r\n");
}

/// Quotes fields containing a delimiter, quote or line break; inner quotes are doubled.
fn escape_csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Whole numbers keep one decimal ("55.0"), others print as-is ("72.46").
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}

/// Human-readable shortlist report.
pub fn render_report(rows: &[ExportRow], job_description: &str, generated_at: DateTime<Utc>) -> String {
    let rule = "=".repeat(BANNER_WIDTH);
    let mut lines = vec![
        rule.clone(),
        "SmartHire Screening Report".to_string(),
        format!("Generated: {}", generated_at.format("%Y-%m-%d %H:%M:%S")),
        rule.clone(),
        String::new(),
        "Job Description Summary:".to_string(),
        summarize(job_description),
        String::new(),
        format!("Total Candidates Screened: {}", rows.len()),
        String::new(),
        rule.clone(),
        "RANKED CANDIDATES".to_string(),
        rule,
        String::new(),
    ];

    for (idx, row) in rows.iter().enumerate() {
        lines.push(format!(
            "Rank #{}: {}",
            idx + 1,
            row.anonymized_name.as_deref().unwrap_or("Unknown")
        ));
        lines.push(format!(
            "  Score: {:.1} ({})",
            row.score,
            row.match_label.as_deref().unwrap_or("N/A")
        ));
        lines.push(format!("  Matched Skills: {}", join_or_none(&row.matched_skills)));
        lines.push(format!("  Missing Skills: {}", join_or_none(&row.missing_skills)));
        lines.push(format!("  Resume Quality: {:.1}%", row.quality_score));
        lines.push(String::new());
    }

    lines.join("\n")
}

fn summarize(job_description: &str) -> String {
    if job_description.chars().count() > JD_SUMMARY_CHARS {
        let head: String = job_description.chars().take(JD_SUMMARY_CHARS).collect();
        format!("{head}...")
    } else {
        job_description.to_string()
    }
}

fn join_or_none(skills: &[String]) -> String {
    if skills.is_empty() {
        "None".to_string()
    } else {
        skills.join(", ")
    }
}

/// `{prefix}_YYYYmmdd_HHMMSS.{ext}` for Content-Disposition headers.
pub fn attachment_filename(prefix: &str, ext: &str, at: DateTime<Utc>) -> String {
    format!("{prefix}_{}.{ext}", at.format("%Y%m%d_%H%M%S"))
}
