use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Missing, mistyped or out-of-range POST fields.
    #[error("Validation fields error")]
    Validation,

    /// A required query parameter was absent or empty.
    #[error("{0}")]
    MissingParams(&'static str),

    #[error("Endpoint is not implemented")]
    NotImplemented,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        Self::Internal(e.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Validation | AppError::MissingParams(_) => StatusCode::BAD_REQUEST,
            AppError::NotImplemented => StatusCode::NOT_IMPLEMENTED,
            AppError::Internal(e) => {
                error!(error = %e, "Request failed");
                let body = Json(json!({ "error": e.to_string() }));
                return (StatusCode::INTERNAL_SERVER_ERROR, body).into_response();
            }
        };

        (status, self.to_string()).into_response()
    }
}
