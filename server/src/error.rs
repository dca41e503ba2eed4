//! HTTP mapping of domain errors.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use currex_common::CurrexError;
use currex_fx::FxError;
use serde::Serialize;
use tracing::error;

/// Body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
}

/// A domain error on its way to becoming an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub CurrexError);

/// Result type for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

impl From<CurrexError> for ApiError {
    fn from(err: CurrexError) -> Self {
        Self(err)
    }
}

impl From<FxError> for ApiError {
    fn from(err: FxError) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if self.0.is_internal() {
            error!(code = self.0.error_code(), error = ?self.0, "Request failed");
        }

        let body = ErrorBody {
            message: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_follows_variant() {
        let response =
            ApiError::from(CurrexError::CurrencyNotFound("XYZ".into())).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = ApiError::from(CurrexError::InvalidRate).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = ApiError::from(FxError::Storage("gone".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
