use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use sea_orm::DbErr;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("User not found: {0}")]
    NotFound(Uuid),

    /// A completed OAuth state that carries no user
    #[error("User not found")]
    MissingUser,

    /// Unknown, used, expired or wrong-stage OAuth state
    #[error("Invalid state")]
    InvalidState,

    #[error("No services requested")]
    NoServicesRequested,

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("OAuth provider error: {0}")]
    Upstream(String),

    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type UserResult<T> = Result<T, UserError>;

impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound(_) | UserError::MissingUser => {
                AppError::NotFound("User not found".to_string())
            }
            UserError::InvalidState | UserError::NoServicesRequested => {
                AppError::BadRequest(err.to_string())
            }
            UserError::Validation(msg) => AppError::BadRequest(msg),
            UserError::Upstream(msg) => AppError::BadGateway(msg),
            UserError::Database(e) => AppError::Database(e),
            UserError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        AppError::from(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (UserError::InvalidState, StatusCode::BAD_REQUEST),
            (UserError::NoServicesRequested, StatusCode::BAD_REQUEST),
            (UserError::MissingUser, StatusCode::NOT_FOUND),
            (UserError::NotFound(Uuid::nil()), StatusCode::NOT_FOUND),
            (UserError::Upstream("token".into()), StatusCode::BAD_GATEWAY),
            (UserError::Internal("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }
}
