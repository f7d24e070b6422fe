pub mod admin;
pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::catalog::handlers;
use crate::normalizer::handlers::handle_normalize;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Catalog
        .route(
            "/api/v1/prompts",
            get(handlers::handle_list).post(handlers::handle_create),
        )
        .route("/api/v1/prompts/export", get(handlers::handle_export))
        .route("/api/v1/prompts/normalize", post(handle_normalize))
        .route(
            "/api/v1/prompts/:id",
            get(handlers::handle_get)
                .put(handlers::handle_update)
                .delete(handlers::handle_delete),
        )
        .route("/api/v1/prompts/:id/draft", get(handlers::handle_edit_draft))
        .route("/api/v1/categories", get(handlers::handle_categories))
        .route("/api/v1/catalog/status", get(handlers::handle_status))
        .route("/api/v1/catalog/reload", post(handlers::handle_reload))
        // Admin gate
        .route("/api/v1/admin/login", post(admin::handle_login))
        .with_state(state)
}
