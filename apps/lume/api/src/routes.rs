//! Route assembly for the Lume API.

use axum::{
    Router,
    extract::State,
    middleware::from_fn_with_state,
    response::IntoResponse,
    routing::get,
};
use axum_helpers::{
    AppRoutes, HealthCheckFuture, JwtAuth, health_router, jwt_auth_middleware,
    optional_jwt_auth_middleware, run_health_checks,
};
use core_config::AppInfo;
use domain_chat::{ChatRepository, ChatService};
use domain_users::{AdminState, AuthState, OAuthFlowService, UserRepository, UserService};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

/// Wired domain services, ready to be mounted
pub struct Domains<U: UserRepository, C: ChatRepository> {
    pub flow: Arc<OAuthFlowService>,
    pub users: UserService<U>,
    pub chat: ChatService<C>,
    pub jwt: JwtAuth,
    pub frontend_url: String,
}

/// `/api` routes plus the root-level OAuth redirect URIs and `/health`.
///
/// Chat requires a session; everything else sees the session when one is present.
pub fn routes<U, C>(domains: Domains<U, C>, app: AppInfo) -> AppRoutes
where
    U: UserRepository + 'static,
    C: ChatRepository + 'static,
{
    let Domains {
        flow,
        users,
        chat,
        jwt,
        frontend_url,
    } = domains;

    let auth = AuthState {
        flow: Arc::clone(&flow),
        users: users.clone(),
        jwt: jwt.clone(),
        frontend_url,
    };
    let admin = AdminState { flow, users };

    let api = Router::new()
        .merge(domain_users::auth_handlers::api_router(auth.clone()))
        .merge(domain_users::admin_handlers::router(admin))
        .merge(domain_chat::admin_router(chat.clone()))
        .merge(domain_service_detector::handlers::router())
        .layer(from_fn_with_state(jwt.clone(), optional_jwt_auth_middleware))
        .merge(
            domain_chat::router(chat)
                .route_layer(from_fn_with_state(jwt, jwt_auth_middleware)),
        );

    let root = domain_users::auth_handlers::redirect_router(auth).merge(health_router(app));

    AppRoutes::new(api).with_root(root)
}

/// `/ready`: 200 once the database answers, 503 otherwise
pub fn ready_router(db: DatabaseConnection) -> Router {
    Router::new()
        .route("/ready", get(ready_handler))
        .with_state(db)
}

async fn ready_handler(State(db): State<DatabaseConnection>) -> impl IntoResponse {
    let checks: Vec<(&str, HealthCheckFuture<'_>)> = vec![(
        "database",
        Box::pin(async {
            database::postgres::check_health(&db)
                .await
                .map_err(|e| e.to_string())
        }),
    )];

    run_health_checks(checks).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permissions::UserPermissions;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use axum_helpers::JwtConfig;
    use domain_chat::InMemoryChatRepository;
    use domain_users::oauth::providers::OAuthProvider;
    use domain_users::{
        FlowConfig, GoogleProvider, InMemoryOAuthStateRepository,
        InMemoryPermissionRequestRepository, InMemoryUserRepository, User,
    };
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;
    use utoipa::OpenApi;

    struct TestApp {
        app: Router,
        users: InMemoryUserRepository,
        jwt: JwtAuth,
    }

    fn test_app() -> TestApp {
        let users = InMemoryUserRepository::new();
        let provider: Arc<dyn OAuthProvider> = Arc::new(
            GoogleProvider::new("client-id".into(), "client-secret".into()).unwrap(),
        );
        let flow = OAuthFlowService::new(
            Arc::new(users.clone()),
            Arc::new(InMemoryOAuthStateRepository::new()),
            Arc::new(InMemoryPermissionRequestRepository::new()),
            provider,
            FlowConfig::new("http://localhost:8080"),
        );
        let user_service = UserService::new(users.clone());
        let chat = ChatService::new(
            InMemoryChatRepository::new(),
            Arc::new(UserPermissions::new(user_service.clone())),
        );
        let jwt = JwtAuth::new(&JwtConfig::new("routes-test-secret-that-is-long-enough"));

        let domains = Domains {
            flow: Arc::new(flow),
            users: user_service,
            chat,
            jwt: jwt.clone(),
            frontend_url: "http://localhost:3000".into(),
        };
        let routes = routes(domains, core_config::app_info!());
        let app = axum_helpers::create_router::<crate::openapi::ApiDoc>(
            routes,
            &["http://localhost:3000".to_string()],
        )
        .unwrap();

        TestApp { app, users, jwt }
    }

    async fn call(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap_or_default())
    }

    fn post_json(uri: &str, body: Value, auth: Option<&str>) -> Request<Body> {
        let mut request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(auth) = auth {
            request = request.header(header::AUTHORIZATION, auth);
        }
        request.body(Body::from(body.to_string())).unwrap()
    }

    #[tokio::test]
    async fn test_initiate_is_public() {
        let t = test_app();
        let (status, body) = call(
            &t.app,
            post_json("/api/oauth/initiate", json!({"prompt": "Email Bob"}), None),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["detected_services"]["email"], true);
        assert!(
            body["auth_url"]
                .as_str()
                .unwrap()
                .starts_with("https://accounts.google.com/")
        );
    }

    #[tokio::test]
    async fn test_chat_requires_session() {
        let t = test_app();
        let (status, body) = call(
            &t.app,
            post_json("/api/chat/send", json!({"message": "hi"}), None),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn test_chat_uses_stored_permissions() {
        let t = test_app();
        let user = t
            .users
            .create(User::new("g-1", "ada@example.com"))
            .await
            .unwrap();
        let token = t
            .jwt
            .create_session_token(user.id, &user.email, user.name(), &user.roles())
            .unwrap();
        let auth = format!("Bearer {}", token);

        let (status, body) = call(
            &t.app,
            post_json(
                "/api/chat/send",
                json!({"message": "Jot down the wifi password"}),
                Some(&auth),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["requires_permissions"], true);

        let ghost = t
            .jwt
            .create_session_token(uuid::Uuid::now_v7(), "ghost@example.com", "ghost", &[])
            .unwrap();
        let (status, _) = call(
            &t.app,
            post_json(
                "/api/chat/send",
                json!({"message": "hi"}),
                Some(&format!("Bearer {}", ghost)),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_root_routes_and_docs() {
        let t = test_app();

        let (status, body) = call(
            &t.app,
            Request::builder().uri("/health").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["service"], "lume_api");

        let response = t
            .app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/oauth/callback?error=access_denied")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers()[header::LOCATION],
            "http://localhost:3000?error=access_denied"
        );

        let (status, doc) = call(
            &t.app,
            Request::builder()
                .uri("/api-docs/openapi.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(doc["info"]["title"], crate::openapi::ApiDoc::openapi().info.title);
    }

    #[tokio::test]
    async fn test_detector_is_mounted() {
        let t = test_app();
        let (status, body) = call(
            &t.app,
            post_json(
                "/api/detect-services",
                json!({"text": "Add a task and book a meeting"}),
                None,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["services"]["tasks"], true);
        assert_eq!(body["services"]["calendar"], true);
    }
}
