use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use sea_orm::DbErr;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Message is required")]
    MessageRequired,

    /// Unknown, or owned by someone else
    #[error("Conversation not found: {0}")]
    ConversationNotFound(Uuid),

    #[error("User not found")]
    UserNotFound,

    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type ChatResult<T> = Result<T, ChatError>;

impl From<ChatError> for AppError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::MessageRequired => AppError::BadRequest(err.to_string()),
            ChatError::ConversationNotFound(_) => {
                AppError::NotFound("Conversation not found".to_string())
            }
            ChatError::UserNotFound => AppError::NotFound(err.to_string()),
            ChatError::Database(e) => AppError::Database(e),
            ChatError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for ChatError {
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
        assert_eq!(
            ChatError::MessageRequired.into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ChatError::ConversationNotFound(Uuid::nil())
                .into_response()
                .status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ChatError::Internal("boom".into()).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
