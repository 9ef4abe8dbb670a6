//! HTTP mapping of domain errors

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use biolink_pages::Error;
use serde_json::json;

pub type ApiResult<T> = Result<T, ApiError>;

/// A domain error on its way out as `{ "error": ... }`
#[derive(Debug)]
pub struct ApiError(pub Error);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        Self(e)
    }
}

impl From<biolink_core::Error> for ApiError {
    fn from(e: biolink_core::Error) -> Self {
        Self(e.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("request failed: {}", self.0);
        }
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}
