mod config;
mod errors;
mod routes;
mod screening;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::routes::build_router;
use crate::screening::composer::ScoreComposer;
use crate::screening::orchestrator::Screener;
use crate::screening::similarity::SemanticEstimator;
use crate::screening::skills::{SkillExtractor, SkillVocabulary};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed values)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting SmartHire screener v{}", env!("CARGO_PKG_VERSION"));

    // Skill vocabulary: JSON override or the built-in tables
    let vocabulary = match &config.skill_vocabulary_path {
        Some(path) => SkillVocabulary::from_json_file(path)
            .with_context(|| format!("Failed to load skill vocabulary from {}", path.display()))?,
        None => SkillVocabulary::default(),
    };
    let extractor = SkillExtractor::new(vocabulary);
    info!(
        "Skill vocabulary loaded ({} canonical skills, {} synonym groups)",
        extractor.vocabulary().canonical_names().len(),
        extractor.vocabulary().synonyms.len()
    );

    // Similarity backend is resolved once; model loading blocks, so keep it off the runtime
    info!(
        preference = ?config.semantic_backend,
        cache_dir = ?config.embedding_cache_dir,
        "Resolving semantic similarity backend"
    );
    let backend_config = config.clone();
    let estimator = tokio::task::spawn_blocking(move || SemanticEstimator::init(&backend_config))
        .await
        .context("Similarity backend initialization task failed")?;

    let screener = Screener::new(extractor, ScoreComposer::new(estimator));
    info!("Screener ready (semantic backend: {})", screener.semantic_backend());

    // Build app state
    let state = AppState {
        config: config.clone(),
        screener,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict CORS origins once the frontend host is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
