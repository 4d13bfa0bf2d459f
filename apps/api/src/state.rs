use std::sync::Arc;

use crate::config::Config;
use crate::extraction::RuleExtractor;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub extractor: Arc<RuleExtractor>,
    pub config: Config,
}
