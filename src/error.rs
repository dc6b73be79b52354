use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

/// Errors surfaced by the fix endpoint.
///
/// The first four variants are client-input errors whose display strings are
/// part of the API contract and returned verbatim with a 400. `Internal`
/// wraps unexpected faults (detector transport failures and the like); its
/// details are logged but never sent to the caller.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid request: JSON body required")]
    MalformedRequest,

    #[error("Invalid request: '{0}' field is required")]
    MissingField(&'static str),

    #[error("Invalid request: '{field}' must be a {expected}")]
    InvalidFieldType {
        field: &'static str,
        expected: &'static str,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("An internal error occurred while processing your request")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(source) = &self {
            error!("internal error while handling request: {source:#}");
        }
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
