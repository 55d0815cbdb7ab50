//! Axum route handlers for the Screening API.

use anyhow::anyhow;
use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::screening::export::{attachment_filename, render_csv, render_report, ExportRow};
use crate::screening::extract::extract_text;
use crate::screening::models::{
    CandidateInput, ExperienceYears, QualityReport, ScoreResult, ScreeningReport,
};
use crate::screening::quality::check_resume_quality;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct ScreenRequest {
    #[serde(default)]
    pub job_description: String,
    #[serde(default)]
    pub resumes: Vec<CandidateInput>,
}

#[derive(Debug, Deserialize)]
pub struct ScorePairRequest {
    pub job_description: String,
    pub resume_text: String,
}

#[derive(Debug, Deserialize)]
pub struct TextRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct SkillsResponse {
    pub skills: Vec<String>,
    pub years: ExperienceYears,
}

#[derive(Debug, Serialize)]
pub struct ExtractTextResponse {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    #[serde(default)]
    pub results: Vec<ExportRow>,
    #[serde(default)]
    pub job_description: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/screen
///
/// Scores pasted résumés against a job description and returns them ranked.
pub async fn handle_screen(
    State(state): State<AppState>,
    Json(request): Json<ScreenRequest>,
) -> Result<Json<ScreeningReport>, AppError> {
    run_screening(&state, request).await.map(Json)
}

/// POST /api/v1/screen/upload
///
/// Multipart form: `payload` holds the JSON body of `/screen`, every `files`
/// part is a résumé (PDF, DOCX or TXT). Files that yield no text are skipped;
/// a request whose only résumés are such files is rejected with 422.
pub async fn handle_screen_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ScreeningReport>, AppError> {
    let mut request = ScreenRequest::default();
    let mut uploaded = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error("Malformed multipart body", e))?
    {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("payload") => {
                let payload = field
                    .text()
                    .await
                    .map_err(|e| multipart_error("Unreadable payload", e))?;
                // A broken payload screens uploaded files only
                request = serde_json::from_str(&payload).unwrap_or_else(|e| {
                    warn!("Ignoring malformed screening payload: {e}");
                    ScreenRequest::default()
                });
            }
            Some("files") => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| multipart_error(&format!("Unreadable file '{filename}'"), e))?;
                uploaded.push((filename, bytes));
            }
            _ => {}
        }
    }

    let file_count = uploaded.len();
    // PDF and DOCX parsing is CPU-bound
    let texts = tokio::task::spawn_blocking(move || {
        uploaded
            .into_iter()
            .map(|(filename, bytes)| extract_text(&filename, &bytes))
            .filter(|text| !text.trim().is_empty())
            .collect::<Vec<_>>()
    })
    .await
    .map_err(|e| AppError::Internal(anyhow!("extraction task failed: {e}")))?;

    if file_count > 0 && texts.is_empty() && request.resumes.is_empty() {
        return Err(AppError::UnprocessableEntity(format!(
            "None of the {file_count} uploaded file(s) contained extractable text"
        )));
    }

    let first_id = request.resumes.len() + 1;
    request
        .resumes
        .extend(texts.into_iter().enumerate().map(|(i, text)| CandidateInput {
            id: (first_id + i).to_string(),
            text,
        }));

    run_screening(&state, request).await.map(Json)
}

/// POST /api/v1/extract-text
///
/// Plain text of a single uploaded `file` part.
pub async fn handle_extract_text(mut multipart: Multipart) -> Result<Json<ExtractTextResponse>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error("Malformed multipart body", e))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| multipart_error(&format!("Unreadable file '{filename}'"), e))?;
        let text = tokio::task::spawn_blocking(move || extract_text(&filename, &bytes))
            .await
            .map_err(|e| AppError::Internal(anyhow!("extraction task failed: {e}")))?;
        return Ok(Json(ExtractTextResponse { text }));
    }

    Err(AppError::Validation("Missing 'file' part".to_string()))
}

/// POST /api/v1/score
pub async fn handle_score_pair(
    State(state): State<AppState>,
    Json(request): Json<ScorePairRequest>,
) -> Result<Json<ScoreResult>, AppError> {
    let screener = state.screener.clone();
    let result = tokio::task::spawn_blocking(move || {
        screener.score_pair(&request.job_description, &request.resume_text)
    })
    .await
    .map_err(|e| AppError::Internal(anyhow!("scoring task failed: {e}")))??;
    Ok(Json(result))
}

/// POST /api/v1/skills/extract
pub async fn handle_extract_skills(
    State(state): State<AppState>,
    Json(request): Json<TextRequest>,
) -> Json<SkillsResponse> {
    let (skills, years) = state
        .screener
        .extractor()
        .extract_skills_and_experience(&request.text);
    Json(SkillsResponse { skills, years })
}

/// POST /api/v1/quality
pub async fn handle_quality(Json(request): Json<TextRequest>) -> Json<QualityReport> {
    Json(check_resume_quality(&request.text))
}

/// POST /api/v1/export/csv
pub async fn handle_export_csv(Json(request): Json<ExportRequest>) -> Response {
    let filename = attachment_filename("smarthire_results", "csv", Utc::now());
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={filename}"),
            ),
        ],
        render_csv(&request.results),
    )
        .into_response()
}

/// POST /api/v1/export/report
pub async fn handle_export_report(Json(request): Json<ExportRequest>) -> Response {
    let now = Utc::now();
    let filename = attachment_filename("smarthire_report", "txt", now);
    (
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={filename}"),
            ),
        ],
        render_report(&request.results, &request.job_description, now),
    )
        .into_response()
}

// ────────────────────────────────────────────────────────────────────────────
// Shared
// ────────────────────────────────────────────────────────────────────────────

/// Body-limit overruns surface as 413; everything else is a client error.
fn multipart_error(context: &str, e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(format!("{context}: {}", e.body_text()))
    } else {
        AppError::Validation(format!("{context}: {e}"))
    }
}

async fn run_screening(state: &AppState, request: ScreenRequest) -> Result<ScreeningReport, AppError> {
    let max = state.config.max_candidates;
    if request.resumes.len() > max {
        return Err(AppError::Validation(format!(
            "Too many resumes: {} (limit {max})",
            request.resumes.len()
        )));
    }

    info!(candidates = request.resumes.len(), "Screening request received");

    let screener = state.screener.clone();
    tokio::task::spawn_blocking(move || screener.screen(&request.job_description, &request.resumes))
        .await
        .map_err(|e| AppError::Internal(anyhow!("screening task failed: {e}")))
}
