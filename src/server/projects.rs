use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State, rejection::BytesRejection},
    http::{StatusCode, header::CONTENT_TYPE},
    response::IntoResponse,
    routing::{get, post},
};
use bytes::Bytes;

use super::AppState;
use super::dto::{DeleteParams, PublishParams, UpdateImportRequest};
use super::extract::BearerToken;
use super::response::{ApiError, ApiResponse, ApiResult};
use crate::types::{Import, Version};

const OCTET_STREAM: &str = "application/octet-stream";

fn archive(content: Vec<u8>) -> impl IntoResponse {
    ([(CONTENT_TYPE, OCTET_STREAM)], content)
}

pub async fn get_import(
    State(state): State<Arc<AppState>>,
    token: BearerToken,
    Path(url): Path<String>,
) -> ApiResult<ApiResponse<Import>> {
    let import = state.gate.get(token.as_str(), &url)?;
    Ok(ApiResponse::success(import))
}

pub async fn update_import(
    State(state): State<Arc<AppState>>,
    token: BearerToken,
    Path(url): Path<String>,
    Json(req): Json<UpdateImportRequest>,
) -> ApiResult<ApiResponse<Import>> {
    let current = state.gate.get(token.as_str(), &url)?;
    let import = req.into_import(&current);
    state.gate.update_import(token.as_str(), &import)?;
    Ok(ApiResponse::success(import))
}

pub async fn delete_import(
    State(state): State<Arc<AppState>>,
    token: BearerToken,
    Path(url): Path<String>,
    Query(params): Query<DeleteParams>,
) -> ApiResult<StatusCode> {
    if params.remove {
        state.gate.delete_import(token.as_str(), &url)?;
    } else {
        state.gate.disable_import(token.as_str(), &url)?;
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn enable_import(
    State(state): State<Arc<AppState>>,
    token: BearerToken,
    Path(url): Path<String>,
) -> ApiResult<StatusCode> {
    state.gate.enable_import(token.as_str(), &url)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_versions(
    State(state): State<Arc<AppState>>,
    token: BearerToken,
    Path(url): Path<String>,
) -> ApiResult<ApiResponse<Vec<Version>>> {
    let versions = state.gate.get_versions(token.as_str(), &url)?;
    Ok(ApiResponse::success(versions))
}

pub async fn get_latest_archive(
    State(state): State<Arc<AppState>>,
    token: BearerToken,
    Path(url): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let content = state.gate.get_version_binary(token.as_str(), &url, "")?;
    Ok(archive(content))
}

pub async fn get_version(
    State(state): State<Arc<AppState>>,
    token: BearerToken,
    Path((url, name)): Path<(String, String)>,
) -> ApiResult<ApiResponse<Version>> {
    let version = state.gate.get_version(token.as_str(), &url, &name)?;
    Ok(ApiResponse::success(version))
}

/// Publishes the request body as a new version. When the import does not
/// exist yet it is created with the caller as its only owner.
pub async fn publish_version(
    State(state): State<Arc<AppState>>,
    token: BearerToken,
    Path((url, name)): Path<(String, String)>,
    Query(params): Query<PublishParams>,
    body: Result<Bytes, BytesRejection>,
) -> ApiResult<(StatusCode, ApiResponse<Version>)> {
    let body = body.map_err(ApiError::from)?;
    let identity = state.gate.parse_token(token.as_str())?;

    let mut import = Import::new(&url).private(params.private);
    if let Some(username) = identity.username() {
        import = import.with_owner(username);
    }

    let version = Version::new(&url, &name, params.archive_type());
    state.gate.add(token.as_str(), &import, &version, &body)?;

    tracing::info!("Published {}@{} ({} bytes)", url, name, body.len());
    Ok((StatusCode::CREATED, ApiResponse::success(version)))
}

pub async fn get_version_archive(
    State(state): State<Arc<AppState>>,
    token: BearerToken,
    Path((url, name)): Path<(String, String)>,
) -> ApiResult<impl IntoResponse> {
    let content = state.gate.get_version_binary(token.as_str(), &url, &name)?;
    Ok(archive(content))
}

pub async fn delete_version(
    State(state): State<Arc<AppState>>,
    token: BearerToken,
    Path((url, name)): Path<(String, String)>,
    Query(params): Query<DeleteParams>,
) -> ApiResult<StatusCode> {
    if params.remove {
        state.gate.delete_version(token.as_str(), &url, &name)?;
    } else {
        state.gate.disable_version(token.as_str(), &url, &name)?;
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn enable_version(
    State(state): State<Arc<AppState>>,
    token: BearerToken,
    Path((url, name)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    state.gate.enable_version(token.as_str(), &url, &name)?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn projects_router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/{import}",
            get(get_import).put(update_import).delete(delete_import),
        )
        .route("/{import}/enable", post(enable_import))
        .route("/{import}/versions", get(list_versions))
        .route("/{import}/archive", get(get_latest_archive))
        .route(
            "/{import}/versions/{version}",
            get(get_version)
                .put(publish_version)
                .delete(delete_version),
        )
        .route("/{import}/versions/{version}/archive", get(get_version_archive))
        .route("/{import}/versions/{version}/enable", post(enable_version))
}
