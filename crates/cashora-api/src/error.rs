//! Error types for cashora-api

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use cashora_core::error::{ErrorCode, ErrorDetails};
use cashora_core::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Core(CoreError::RecordNotFound { .. }) => StatusCode::NOT_FOUND,
            ApiError::Core(CoreError::Unauthorized) => StatusCode::UNAUTHORIZED,
            ApiError::Core(CoreError::InvalidCredentials) => StatusCode::UNAUTHORIZED,
            ApiError::Core(CoreError::DuplicateEntry { .. }) => StatusCode::CONFLICT,
            ApiError::Core(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    pub fn to_details(&self) -> ErrorDetails {
        match self {
            ApiError::Core(error) => error.to_details(),
            ApiError::Unauthorized => ErrorDetails::new(ErrorCode::Unauthorized, self.to_string())
                .with_suggestion("Sign in to the admin console first.".to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        log::debug!("{} -> {}", self, status);
        let body = serde_json::to_string(&self.to_details()).unwrap_or_default();
        (status, [("content-type", "application/json")], body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
