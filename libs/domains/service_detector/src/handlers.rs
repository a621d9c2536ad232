use axum::{Json, Router, extract::rejection::JsonRejection, routing::post};
use axum_helpers::ErrorResponse;
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};

use crate::detector::detect_services;
use crate::error::DetectorError;
use crate::models::{DetectedServices, GoogleService};

const LOG_PREVIEW_CHARS: usize = 100;

#[derive(OpenApi)]
#[openapi(
    paths(detect),
    components(schemas(DetectRequest, DetectResponse, DetectedServices, GoogleService, ErrorResponse)),
    tags((name = "detector", description = "Google service intent detection"))
)]
pub struct ApiDoc;

#[derive(Debug, Deserialize, ToSchema)]
pub struct DetectRequest {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DetectResponse {
    pub success: bool,
    pub text: String,
    pub services: DetectedServices,
}

/// `POST /detect-services`
pub fn router() -> Router {
    Router::new().route("/detect-services", post(detect))
}

/// Detect which Google services a piece of text refers to
#[utoipa::path(
    post,
    path = "/api/detect-services",
    tag = "detector",
    request_body = DetectRequest,
    responses(
        (status = 200, description = "Detected services", body = DetectResponse),
        (status = 400, description = "Missing text or malformed JSON", body = ErrorResponse)
    )
)]
async fn detect(
    payload: Result<Json<DetectRequest>, JsonRejection>,
) -> Result<Json<DetectResponse>, DetectorError> {
    let Json(request) = payload.map_err(|_| DetectorError::InvalidJson)?;

    let text = request
        .text
        .filter(|t| !t.trim().is_empty())
        .ok_or(DetectorError::MissingText)?;

    let services = detect_services(&text);

    let preview: String = text.chars().take(LOG_PREVIEW_CHARS).collect();
    tracing::info!(text = %preview, ?services, "Detected services");

    Ok(Json(DetectResponse {
        success: true,
        text,
        services,
    }))
}
