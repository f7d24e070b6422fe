mod catalog;
mod config;
mod errors;
mod llm_client;
mod models;
mod normalizer;
mod routes;
mod state;
mod storage;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::catalog::service::{CatalogService, LoadState};
use crate::config::{Config, StorageConfig};
use crate::llm_client::LlmClient;
use crate::normalizer::Normalizer;
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::{GitHubStore, LocalFileStore, PromptStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Promptoviště API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize storage backend and load the catalog
    let store = build_store(&config)?;
    info!("Storage backend: {}", store.describe());

    let catalog = CatalogService::open(store).await;
    match catalog.load_state().await {
        LoadState::Failed { message } => {
            tracing::warn!("Catalog load failed, serving empty until reloaded: {message}")
        }
        LoadState::Missing { location } => {
            tracing::warn!("No prompt document at {location}; the first save will create it")
        }
        state => info!("Catalog ready: {state:?}"),
    }

    // Initialize LLM client
    let llm = LlmClient::new(config.anthropic_api_key.clone())
        .context("failed to build LLM HTTP client")?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);
    let normalizer = Normalizer::new(Arc::new(llm), config.operator_language.clone());

    // Build app state
    let state = AppState {
        catalog: Arc::new(catalog),
        normalizer,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Picks the persistence backend from config.
fn build_store(config: &Config) -> Result<Arc<dyn PromptStore>> {
    Ok(match &config.storage {
        StorageConfig::Local { path } => Arc::new(LocalFileStore::new(path)),
        StorageConfig::GitHub(github) => Arc::new(
            GitHubStore::new(github.clone()).context("failed to build GitHub HTTP client")?,
        ),
    })
}
