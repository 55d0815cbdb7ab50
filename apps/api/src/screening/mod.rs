// Screening core: skill extraction, résumé quality, semantic similarity,
// score composition and batch ranking. Exports and file extraction are the
// thin layers the HTTP handlers put around it.

pub mod composer;
pub mod export;
pub mod extract;
pub mod handlers;
pub mod models;
pub mod orchestrator;
pub mod quality;
pub mod similarity;
pub mod skills;
