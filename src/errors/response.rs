use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
    Json,
};
use serde_json::json;
use crate::errors::AppError;

// Converts AppError into a `{"detail": ...}` body with the matching status.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::UserExists => StatusCode::BAD_REQUEST,
            AppError::Login(e) | AppError::UserCreation(e) | AppError::TaskCreation(e) => {
                tracing::error!("[{}] {:?}", self.log_tag().unwrap_or("ERROR"), e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}
