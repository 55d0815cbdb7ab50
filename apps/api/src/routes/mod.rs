pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::screening::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    // Multipart routes carry whole documents; the 2 MB axum default is too small
    let upload_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    Router::new()
        .route("/health", get(health::health_handler))
        // Screening API
        .route("/api/v1/screen", post(handlers::handle_screen))
        .route(
            "/api/v1/screen/upload",
            post(handlers::handle_screen_upload).layer(upload_limit),
        )
        .route("/api/v1/score", post(handlers::handle_score_pair))
        .route("/api/v1/skills/extract", post(handlers::handle_extract_skills))
        .route("/api/v1/quality", post(handlers::handle_quality))
        .route(
            "/api/v1/extract-text",
            post(handlers::handle_extract_text).layer(upload_limit),
        )
        // Export API
        .route("/api/v1/export/csv", post(handlers::handle_export_csv))
        .route("/api/v1/export/report", post(handlers::handle_export_report))
        .with_state(state)
}
