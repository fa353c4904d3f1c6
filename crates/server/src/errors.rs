use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use slotql::{CatalogError, EngineError, ExecutionError, StorageError};
use tracing::error;

/// A custom error type for the server application.
///
/// Resolution failures (low confidence, missing parameters) are not errors;
/// they are returned as normal results. This enum covers what is left.
#[derive(Debug)]
pub enum AppError {
    /// Rebuilding the engine failed.
    Engine(EngineError),
    /// Running resolved SQL failed.
    Execution(ExecutionError),
    /// The endpoint needs a warehouse and none is configured.
    StorageUnavailable,
    /// Generic internal server errors.
    Internal(anyhow::Error),
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        AppError::Engine(err)
    }
}

impl From<ExecutionError> for AppError {
    fn from(err: ExecutionError) -> Self {
        AppError::Execution(err)
    }
}

/// Conversion from `anyhow::Error` to `AppError`.
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status_code, error_message) = match self {
            AppError::Engine(err) => {
                error!("EngineError: {:?}", err);
                match err {
                    EngineError::Catalog(CatalogError::Read { .. }) => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        format!("Failed to load catalog: {err}"),
                    ),
                    EngineError::Catalog(_) => (
                        StatusCode::UNPROCESSABLE_ENTITY,
                        format!("Invalid catalog: {err}"),
                    ),
                    EngineError::Config(_) | EngineError::Regex(_) => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Server is not configured correctly.".to_string(),
                    ),
                }
            }
            AppError::Execution(err) => {
                error!("ExecutionError: {:?}", err);
                match err {
                    ExecutionError::NotResolved => (
                        StatusCode::UNPROCESSABLE_ENTITY,
                        "The question did not resolve to a query.".to_string(),
                    ),
                    ExecutionError::Timeout(_) => (StatusCode::GATEWAY_TIMEOUT, err.to_string()),
                    ExecutionError::Storage(StorageError::InvalidTable(e)) => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        format!("Invalid table name: {e}"),
                    ),
                    ExecutionError::Storage(_) | ExecutionError::MalformedRows(_) => {
                        (StatusCode::BAD_GATEWAY, err.to_string())
                    }
                }
            }
            AppError::StorageUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "No storage is configured for query execution.".to_string(),
            ),
            AppError::Internal(err) => {
                error!("Internal server error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred.".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status_code, body).into_response()
    }
}
