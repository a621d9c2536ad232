use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Lume API",
        version = "0.1.0",
        description = "Chat assistant that asks for Google service consent one service at a time"
    ),
    components(schemas(axum_helpers::ErrorResponse, axum_helpers::HealthResponse))
)]
struct LumeDoc;

/// Every domain's paths merged under one document
pub struct ApiDoc;

impl OpenApi for ApiDoc {
    fn openapi() -> utoipa::openapi::OpenApi {
        let mut doc = LumeDoc::openapi();
        doc.merge(domain_users::auth_handlers::ApiDoc::openapi());
        doc.merge(domain_users::admin_handlers::ApiDoc::openapi());
        doc.merge(domain_chat::ApiDoc::openapi());
        doc.merge(domain_service_detector::ApiDoc::openapi());
        doc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_covers_every_domain() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;

        for path in [
            "/api/oauth/initiate",
            "/oauth/callback",
            "/api/admin/oauth-states/purge",
            "/api/chat/send",
            "/api/admin/messages",
            "/api/detect-services",
        ] {
            assert!(paths.contains_key(path), "missing {}", path);
        }
        assert_eq!(doc.info.title, "Lume API");
    }
}
