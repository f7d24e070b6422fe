//! Admin gate.
//!
//! A single shared passphrase, compared in plaintext. It only decides whether
//! the editing endpoints are reachable; it is not an authentication system.

use axum::{
    async_trait,
    extract::{FromRequestParts, State},
    http::request::Parts,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::AppError;
use crate::state::AppState;

pub const PASSPHRASE_HEADER: &str = "x-admin-passphrase";

/// Extractor that rejects the request unless the admin passphrase header matches.
pub struct AdminGate;

#[async_trait]
impl FromRequestParts<AppState> for AdminGate {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let supplied = parts
            .headers
            .get(PASSPHRASE_HEADER)
            .and_then(|v| v.to_str().ok());
        match supplied {
            Some(p) if p == state.config.admin_passphrase => Ok(AdminGate),
            _ => Err(AppError::Unauthorized),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub passphrase: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub admin: bool,
}

/// POST /api/v1/admin/login
pub async fn handle_login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    if req.passphrase != state.config.admin_passphrase {
        warn!("admin login rejected");
        return Err(AppError::Unauthorized);
    }
    Ok(Json(LoginResponse { admin: true }))
}
