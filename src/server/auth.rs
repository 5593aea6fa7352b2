use std::sync::Arc;

use axum::{Json, Router, extract::State, routing::post};

use super::AppState;
use super::dto::{LoginRequest, LoginResponse};
use super::response::{ApiResponse, ApiResult};

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<ApiResponse<LoginResponse>> {
    let token = state.gate.login(&req.username, &req.password)?;
    tracing::info!("User {} logged in", req.username);
    Ok(ApiResponse::success(LoginResponse { token }))
}

pub fn auth_router() -> Router<Arc<AppState>> {
    Router::new().route("/login", post(login))
}
