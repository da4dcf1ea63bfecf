use axum::{extract::State, Extension, Json};
use serde::Serialize;

use crate::api::extract::ApiJson;
use crate::api::state::AppState;
use crate::crypto::Claims;
use crate::error::AppError;
use crate::services::{AuthResponse, LoginRequest, Registration};

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: Claims,
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<Registration>,
) -> Result<Json<AuthResponse>, AppError> {
    let response = state.auth.register(req).await?;
    Ok(Json(response))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let response = state.auth.login(req).await?;
    Ok(Json(response))
}

/// GET /api/me (requires auth via middleware)
pub async fn me(Extension(claims): Extension<Claims>) -> Json<MeResponse> {
    Json(MeResponse { user: claims })
}
