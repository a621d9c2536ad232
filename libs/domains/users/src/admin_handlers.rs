use axum::{
    Json, Router,
    extract::{Query, State},
    routing::{get, post},
};
use axum_helpers::{AdminUser, AppError, ErrorResponse};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{OpenApi, ToSchema};

use crate::models::{UserFilter, UserResponse};
use crate::oauth::flow::OAuthFlowService;
use crate::oauth::permission_requests::{PermissionRequest, PermissionRequestFilter};
use crate::oauth::types::{OAuthState, OAuthStateFilter};
use crate::repository::UserRepository;
use crate::service::UserService;

pub const TAG: &str = "admin";

#[derive(OpenApi)]
#[openapi(
    paths(list_users, list_oauth_states, purge_oauth_states, list_permission_requests),
    components(schemas(
        UserResponse,
        OAuthState,
        PermissionRequest,
        PurgeResponse,
        ErrorResponse
    )),
    tags((name = TAG, description = "Staff-only inspection of users and OAuth records"))
)]
pub struct ApiDoc;

pub struct AdminState<R: UserRepository> {
    pub flow: Arc<OAuthFlowService>,
    pub users: UserService<R>,
}

impl<R: UserRepository> Clone for AdminState<R> {
    fn clone(&self) -> Self {
        Self {
            flow: Arc::clone(&self.flow),
            users: self.users.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PurgeResponse {
    pub deleted: u64,
}

/// `/admin/...` routes; every handler requires the admin role.
pub fn router<R: UserRepository + 'static>(state: AdminState<R>) -> Router {
    Router::new()
        .route("/admin/users", get(list_users::<R>))
        .route("/admin/oauth-states", get(list_oauth_states::<R>))
        .route("/admin/oauth-states/purge", post(purge_oauth_states::<R>))
        .route(
            "/admin/permission-requests",
            get(list_permission_requests::<R>),
        )
        .with_state(state)
}

/// List users
#[utoipa::path(
    get,
    path = "/api/admin/users",
    tag = TAG,
    params(UserFilter),
    responses(
        (status = 200, description = "Users, newest first", body = Vec<UserResponse>),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 403, description = "Admin role required", body = ErrorResponse)
    )
)]
async fn list_users<R: UserRepository>(
    State(state): State<AdminState<R>>,
    _admin: AdminUser,
    Query(filter): Query<UserFilter>,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    Ok(Json(state.users.list_users(filter).await?))
}

/// List OAuth states
#[utoipa::path(
    get,
    path = "/api/admin/oauth-states",
    tag = TAG,
    params(OAuthStateFilter),
    responses(
        (status = 200, description = "OAuth states, newest first", body = Vec<OAuthState>),
        (status = 403, description = "Admin role required", body = ErrorResponse)
    )
)]
async fn list_oauth_states<R: UserRepository>(
    State(state): State<AdminState<R>>,
    _admin: AdminUser,
    Query(filter): Query<OAuthStateFilter>,
) -> Result<Json<Vec<OAuthState>>, AppError> {
    Ok(Json(state.flow.list_states(filter).await?))
}

/// Delete expired OAuth states
#[utoipa::path(
    post,
    path = "/api/admin/oauth-states/purge",
    tag = TAG,
    responses(
        (status = 200, description = "Number of states removed", body = PurgeResponse),
        (status = 403, description = "Admin role required", body = ErrorResponse)
    )
)]
async fn purge_oauth_states<R: UserRepository>(
    State(state): State<AdminState<R>>,
    AdminUser(admin): AdminUser,
) -> Result<Json<PurgeResponse>, AppError> {
    let deleted = state.flow.purge_expired_states().await?;
    tracing::info!(admin = %admin.email, deleted, "Admin purged OAuth states");
    Ok(Json(PurgeResponse { deleted }))
}

/// List service permission requests
#[utoipa::path(
    get,
    path = "/api/admin/permission-requests",
    tag = TAG,
    params(PermissionRequestFilter),
    responses(
        (status = 200, description = "Permission requests, newest first", body = Vec<PermissionRequest>),
        (status = 403, description = "Admin role required", body = ErrorResponse)
    )
)]
async fn list_permission_requests<R: UserRepository>(
    State(state): State<AdminState<R>>,
    _admin: AdminUser,
    Query(filter): Query<PermissionRequestFilter>,
) -> Result<Json<Vec<PermissionRequest>>, AppError> {
    Ok(Json(state.flow.list_permission_requests(filter).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::User;
    use crate::oauth::flow::FlowConfig;
    use crate::oauth::permission_requests::{
        InMemoryPermissionRequestRepository, PermissionRequestRepository,
    };
    use crate::oauth::providers::MockOAuthProvider;
    use crate::oauth::state_store::{InMemoryOAuthStateRepository, OAuthStateRepository};
    use crate::oauth::types::{NewOAuthState, OAuthStage};
    use crate::repository::InMemoryUserRepository;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use axum_helpers::{JwtAuth, JwtConfig, optional_jwt_auth_middleware};
    use chrono::{Duration, Utc};
    use domain_service_detector::{GoogleService, ServiceFlags};
    use http_body_util::BodyExt;
    use tower::ServiceExt;
    use uuid::Uuid;

    struct TestApp {
        app: Router,
        users: InMemoryUserRepository,
        states: InMemoryOAuthStateRepository,
        requests: InMemoryPermissionRequestRepository,
        jwt: JwtAuth,
    }

    fn test_app() -> TestApp {
        let users = InMemoryUserRepository::new();
        let states = InMemoryOAuthStateRepository::new();
        let requests = InMemoryPermissionRequestRepository::new();
        let flow = OAuthFlowService::new(
            Arc::new(users.clone()),
            Arc::new(states.clone()),
            Arc::new(requests.clone()),
            Arc::new(MockOAuthProvider::new()),
            FlowConfig::new("http://localhost:8080"),
        );
        let jwt = JwtAuth::new(&JwtConfig::new("admin-handler-test-secret-0123456789"));

        let app = router(AdminState {
            flow: Arc::new(flow),
            users: UserService::new(users.clone()),
        })
        .layer(axum::middleware::from_fn_with_state(
            jwt.clone(),
            optional_jwt_auth_middleware,
        ));

        TestApp {
            app,
            users,
            states,
            requests,
            jwt,
        }
    }

    fn bearer(jwt: &JwtAuth, roles: &[&str]) -> String {
        let roles: Vec<String> = roles.iter().map(|r| r.to_string()).collect();
        let token = jwt
            .create_session_token(Uuid::now_v7(), "staff@example.com", "staff", &roles)
            .unwrap();
        format!("Bearer {}", token)
    }

    async fn call(
        app: &Router,
        method: &str,
        uri: &str,
        auth: Option<String>,
    ) -> (StatusCode, serde_json::Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(auth) = auth {
            request = request.header(header::AUTHORIZATION, auth);
        }
        let response = app
            .clone()
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap_or_default())
    }

    #[tokio::test]
    async fn test_requires_admin_role() {
        let t = test_app();

        let (status, _) = call(&t.app, "GET", "/admin/users", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = call(
            &t.app,
            "GET",
            "/admin/users",
            Some(bearer(&t.jwt, &["user"])),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "FORBIDDEN");
    }

    #[tokio::test]
    async fn test_list_users_filters_by_service() {
        let t = test_app();
        let mut with_tasks = User::new("g-1", "ada@example.com");
        with_tasks.permissions.set(GoogleService::Tasks, true);
        t.users.create(with_tasks).await.unwrap();
        t.users
            .create(User::new("g-2", "grace@example.com"))
            .await
            .unwrap();

        let admin = Some(bearer(&t.jwt, &["user", "admin"]));
        let (status, body) = call(&t.app, "GET", "/admin/users", admin.clone()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().map(Vec::len), Some(2));

        let (_, body) = call(&t.app, "GET", "/admin/users?service=tasks", admin).await;
        assert_eq!(body.as_array().map(Vec::len), Some(1));
        assert_eq!(body[0]["email"], "ada@example.com");
        assert!(body[0].get("refresh_token").is_none());
    }

    #[tokio::test]
    async fn test_purge_and_list_states() {
        let t = test_app();
        t.states
            .create(NewOAuthState::generate(
                OAuthStage::BasePermissions,
                ServiceFlags::default(),
                600,
            ))
            .await
            .unwrap();
        let mut expired =
            NewOAuthState::generate(OAuthStage::BasePermissions, ServiceFlags::default(), 600);
        expired.expires_at = Utc::now() - Duration::seconds(1);
        t.states.create(expired).await.unwrap();

        let admin = Some(bearer(&t.jwt, &["admin"]));
        let (status, body) = call(&t.app, "POST", "/admin/oauth-states/purge", admin.clone()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["deleted"], 1);

        let (_, body) = call(&t.app, "GET", "/admin/oauth-states?used=false", admin).await;
        assert_eq!(body.as_array().map(Vec::len), Some(1));
        assert!(body[0].get("pkce_verifier").is_none());
    }

    #[tokio::test]
    async fn test_list_permission_requests() {
        let t = test_app();
        let user_id = Uuid::now_v7();
        let now = Utc::now();
        t.requests
            .resolve(user_id, GoogleService::Email, true, now)
            .await
            .unwrap();
        t.requests
            .upsert_pending(user_id, GoogleService::Keep, vec![], now)
            .await
            .unwrap();

        let admin = Some(bearer(&t.jwt, &["admin"]));
        let (status, body) = call(
            &t.app,
            "GET",
            "/admin/permission-requests?granted=true",
            admin,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().map(Vec::len), Some(1));
        assert_eq!(body[0]["service"], "email");
    }
}
