use axum::{
    Json,
    extract::rejection::BytesRejection,
    http::{HeaderValue, StatusCode, header::WWW_AUTHENTICATE},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;

use crate::error::Error;

/// Standard API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    #[must_use]
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// API error that converts to a proper HTTP response
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let status = match &err {
            Error::NotFound | Error::VersionNotFound | Error::UserDoesNotExist => {
                StatusCode::NOT_FOUND
            }
            Error::NotAuthorized | Error::Disabled => StatusCode::FORBIDDEN,
            Error::InvalidSignature
            | Error::TokenExpired
            | Error::MalformedToken
            | Error::PasswordMismatch => StatusCode::UNAUTHORIZED,
            Error::AlreadyExists | Error::UserAlreadyExists => StatusCode::CONFLICT,
            Error::UsernameEmpty
            | Error::PasswordTooShort
            | Error::InvalidArtifactId(_)
            | Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            Error::Database(_)
            | Error::Serialization(_)
            | Error::Io(_)
            | Error::InvalidConnectionString(_)
            | Error::UnknownBackend(_)
            | Error::Config(_)
            | Error::PasswordHash(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("Request failed: {err}");
            return Self::internal("Internal server error");
        }

        Self::new(status, err.to_string())
    }
}

impl From<BytesRejection> for ApiError {
    fn from(rejection: BytesRejection) -> Self {
        Self::new(rejection.status(), rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({ "data": null, "error": self.message });
        let mut response = (self.status, Json(body)).into_response();

        if self.status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                WWW_AUTHENTICATE,
                HeaderValue::from_static("Bearer realm=\"depreg\""),
            );
        }

        response
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
