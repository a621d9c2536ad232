//! JSON body extractor that runs `validator` rules before the handler sees the value.

use crate::errors::AppError;
use axum::extract::{FromRequest, Json, Request};
use serde::de::DeserializeOwned;
use validator::Validate;

/// `Json<T>` followed by `T::validate()`.
///
/// Malformed JSON becomes `INVALID_JSON` (400); failed rules become
/// `VALIDATION_ERROR` (400) with the per-field errors in `details`.
///
/// ```ignore
/// #[derive(Deserialize, Validate)]
/// struct SendMessage {
///     #[validate(length(max = 4000))]
///     message: String,
/// }
///
/// async fn send(ValidatedJson(body): ValidatedJson<SendMessage>) { /* ... */ }
/// ```
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = Json::<T>::from_request(req, state).await?;
        data.validate()?;
        Ok(ValidatedJson(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, body::Body, http::StatusCode, routing::post};
    use serde::Deserialize;
    use tower::ServiceExt;

    #[derive(Deserialize, Validate)]
    struct Prompt {
        #[validate(length(max = 10))]
        text: String,
    }

    async fn echo(ValidatedJson(p): ValidatedJson<Prompt>) -> String {
        p.text
    }

    fn app() -> Router {
        Router::new().route("/", post(echo))
    }

    fn request(body: &'static str) -> Request {
        Request::builder()
            .method("POST")
            .uri("/")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_valid_body_passes() {
        let response = app().oneshot(request(r#"{"text":"hi"}"#)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_rule_violation_is_400() {
        let response = app()
            .oneshot(request(r#"{"text":"far too long for the rule"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_malformed_json_is_400() {
        let response = app().oneshot(request("{not json")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
