use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::{PartialRecord, PromptDraft};
use crate::normalizer::NormalizeError;
use crate::routes::admin::AdminGate;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct NormalizeRequest {
    pub raw_text: String,
    /// The form as it currently stands.
    #[serde(default)]
    pub draft: PromptDraft,
}

/// `draft` is the pre-filled form on success and the untouched input draft
/// otherwise; `error` says why no suggestion was applied.
#[derive(Debug, Serialize)]
pub struct NormalizeResponse {
    pub draft: PromptDraft,
    pub suggestion: Option<PartialRecord>,
    pub error: Option<String>,
}

/// POST /api/v1/prompts/normalize
pub async fn handle_normalize(
    _admin: AdminGate,
    State(state): State<AppState>,
    Json(req): Json<NormalizeRequest>,
) -> Result<Json<NormalizeResponse>, AppError> {
    let NormalizeRequest { raw_text, mut draft } = req;

    match state.normalizer.normalize(&raw_text).await {
        Ok(suggestion) => {
            draft.prefill(&suggestion);
            if draft.text.trim().is_empty() {
                draft.text = raw_text;
            }
            Ok(Json(NormalizeResponse {
                draft,
                suggestion: Some(suggestion),
                error: None,
            }))
        }
        Err(NormalizeError::EmptyInput) => {
            Err(AppError::Validation(NormalizeError::EmptyInput.to_string()))
        }
        Err(e) => Ok(Json(NormalizeResponse {
            draft,
            suggestion: None,
            error: Some(e.to_string()),
        })),
    }
}
