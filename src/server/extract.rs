use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use super::response::ApiError;

/// The caller's bearer token. Requests without an `Authorization` header get
/// an empty token, which the gate treats as anonymous.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BearerToken(pub String);

impl BearerToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Extracts the token from an `Authorization` header value.
pub fn token_from_header(header: Option<&str>) -> Result<String, ApiError> {
    match header {
        None => Ok(String::new()),
        Some(value) => value
            .strip_prefix("Bearer ")
            .map(|token| token.trim().to_string())
            .ok_or_else(|| ApiError::unauthorized("Invalid authorization scheme")),
    }
}

impl<S: Send + Sync> FromRequestParts<S> for BearerToken {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .map(|value| {
                value
                    .to_str()
                    .map_err(|_| ApiError::unauthorized("Invalid authorization header"))
            })
            .transpose()?;

        token_from_header(header).map(BearerToken)
    }
}
