use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DetectorError {
    #[error("Text parameter is required")]
    MissingText,

    #[error("Invalid JSON")]
    InvalidJson,
}

impl From<DetectorError> for AppError {
    fn from(err: DetectorError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl IntoResponse for DetectorError {
    fn into_response(self) -> Response {
        AppError::from(self).into_response()
    }
}
