use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::search::{CategoryFilter, CategorySummary};
use crate::catalog::service::{Listing, LoadState, Mutation, Persistence};
use crate::errors::AppError;
use crate::models::{PromptDraft, PromptView};
use crate::routes::admin::AdminGate;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub category: String,
}

/// Response for every mutation. `persisted: false` means the change is live
/// in this service but did not reach the store.
#[derive(Debug, Serialize)]
pub struct MutationResponse {
    pub prompt: PromptView,
    pub persisted: bool,
    pub warning: Option<String>,
}

impl From<Mutation<PromptView>> for MutationResponse {
    fn from(m: Mutation<PromptView>) -> Self {
        let persisted = m.persistence.is_saved();
        let warning = match m.persistence {
            Persistence::Saved => None,
            Persistence::Failed { message } => {
                Some(format!("change applied but not saved: {message}"))
            }
        };
        Self {
            prompt: m.value,
            persisted,
            warning,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CatalogStatus {
    pub load_state: LoadState,
    pub store: String,
    pub count: usize,
}

/// GET /api/v1/prompts
pub async fn handle_list(
    State(state): State<AppState>,
    Query(params): Query<ListQuery>,
) -> Result<Json<Listing>, AppError> {
    let filter = CategoryFilter::parse(&params.category)
        .ok_or_else(|| AppError::Validation(format!("unknown category '{}'", params.category)))?;
    Ok(Json(state.catalog.list(&params.q, filter).await))
}

/// GET /api/v1/prompts/:id
pub async fn handle_get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PromptView>, AppError> {
    state
        .catalog
        .get(id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("prompt {id} not found")))
}

/// GET /api/v1/prompts/:id/draft
///
/// The record as an editable form, tags joined back into one string.
pub async fn handle_edit_draft(
    _admin: AdminGate,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PromptDraft>, AppError> {
    state
        .catalog
        .draft_for(id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("prompt {id} not found")))
}

/// POST /api/v1/prompts
pub async fn handle_create(
    _admin: AdminGate,
    State(state): State<AppState>,
    Json(draft): Json<PromptDraft>,
) -> Result<(StatusCode, Json<MutationResponse>), AppError> {
    let mutation = state.catalog.add(&draft).await?;
    Ok((StatusCode::CREATED, Json(mutation.into())))
}

/// PUT /api/v1/prompts/:id
pub async fn handle_update(
    _admin: AdminGate,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(draft): Json<PromptDraft>,
) -> Result<Json<MutationResponse>, AppError> {
    let mutation = state.catalog.update(id, &draft).await?;
    Ok(Json(mutation.into()))
}

/// DELETE /api/v1/prompts/:id
pub async fn handle_delete(
    _admin: AdminGate,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MutationResponse>, AppError> {
    let mutation = state.catalog.remove(id).await?;
    Ok(Json(mutation.into()))
}

/// GET /api/v1/prompts/export
pub async fn handle_export(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let document = state.catalog.export().await?;
    let filename = format!(
        "prompty_export_{}.json",
        chrono::Local::now().format("%Y%m%d")
    );
    Ok((
        [
            (header::CONTENT_TYPE, "application/json; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        document,
    ))
}

/// GET /api/v1/categories
pub async fn handle_categories(State(state): State<AppState>) -> Json<Vec<CategorySummary>> {
    Json(state.catalog.summary().await)
}

/// GET /api/v1/catalog/status
pub async fn handle_status(State(state): State<AppState>) -> Json<CatalogStatus> {
    Json(CatalogStatus {
        load_state: state.catalog.load_state().await,
        store: state.catalog.describe_store(),
        count: state.catalog.len().await,
    })
}

/// POST /api/v1/catalog/reload
pub async fn handle_reload(
    _admin: AdminGate,
    State(state): State<AppState>,
) -> Json<CatalogStatus> {
    let load_state = state.catalog.reload().await;
    Json(CatalogStatus {
        load_state,
        store: state.catalog.describe_store(),
        count: state.catalog.len().await,
    })
}
