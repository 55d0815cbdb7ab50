use crate::config::Config;
use crate::screening::orchestrator::Screener;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Skill extractor plus score composer. The similarity backend inside was
    /// chosen once at startup and is shared read-only.
    pub screener: Screener,
}
