use std::sync::Arc;

use crate::catalog::service::CatalogService;
use crate::config::Config;
use crate::normalizer::Normalizer;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<CatalogService>,
    /// Backed by `LlmClient` in production; tests swap in a canned generator.
    pub normalizer: Normalizer,
    pub config: Config,
}
