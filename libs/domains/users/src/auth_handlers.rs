//! OAuth, session and service-status endpoints.
//!
//! [`api_router`] is nested under `/api`; [`redirect_router`] holds the Google
//! redirect URIs and is mounted at the root. Neither applies auth middleware:
//! the app layers `optional_jwt_auth_middleware` so the [`CurrentUser`]
//! extractors see the session.

use axum::{
    Json, Router,
    extract::{Query, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{AppendHeaders, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use axum_helpers::{AppError, CurrentUser, ErrorResponse, JwtAuth};
use domain_service_detector::ServiceFlags;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{OpenApi, ToSchema};

use crate::error::UserError;
use crate::models::UserInfo;
use crate::oauth::flow::{
    GrantOutcome, LoginRedirect, OAuthFlowService, ServiceAccess, ServiceConsentRedirect,
    ServiceStatus, TokenStatus,
};
use crate::oauth::types::{OAuthCallbackParams, OAuthStage};
use crate::repository::UserRepository;
use crate::service::UserService;

pub const TAG: &str = "auth";

#[derive(OpenApi)]
#[openapi(
    paths(
        initiate_oauth,
        request_service_permissions,
        user_info,
        logout,
        services_status,
        oauth_callback,
        service_callback,
    ),
    components(schemas(
        InitiateRequest,
        InitiateResponse,
        ServicePermissionsRequest,
        ServicePermissionsResponse,
        UserInfoResponse,
        UserInfo,
        LogoutResponse,
        ServiceStatus,
        ServiceAccess,
        TokenStatus,
        ServiceFlags,
        OAuthStage,
        ErrorResponse
    )),
    tags((name = TAG, description = "Google OAuth and session endpoints"))
)]
pub struct ApiDoc;

pub struct AuthState<R: UserRepository> {
    pub flow: Arc<OAuthFlowService>,
    pub users: UserService<R>,
    pub jwt: JwtAuth,
    /// Where callbacks redirect the browser to
    pub frontend_url: String,
}

impl<R: UserRepository> Clone for AuthState<R> {
    fn clone(&self) -> Self {
        Self {
            flow: Arc::clone(&self.flow),
            users: self.users.clone(),
            jwt: self.jwt.clone(),
            frontend_url: self.frontend_url.clone(),
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct InitiateRequest {
    /// Message the user wants to act on; services found in it are requested after login
    #[serde(default)]
    pub prompt: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct InitiateResponse {
    pub success: bool,
    #[serde(flatten)]
    pub redirect: LoginRedirect,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ServicePermissionsRequest {
    /// Completed base-login state, used when no session cookie is present
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub services: ServiceFlags,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ServicePermissionsResponse {
    pub success: bool,
    #[serde(flatten)]
    pub redirect: ServiceConsentRedirect,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserInfoResponse {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserInfo>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LogoutResponse {
    pub success: bool,
}

/// JSON endpoints, nested under `/api`
pub fn api_router<R: UserRepository + 'static>(state: AuthState<R>) -> Router {
    Router::new()
        .route("/oauth/initiate", post(initiate_oauth::<R>))
        .route(
            "/oauth/request-service-permissions",
            post(request_service_permissions::<R>),
        )
        .route("/user/info", get(user_info::<R>))
        .route("/user/logout", post(logout::<R>))
        .route("/services/status", get(services_status::<R>))
        .with_state(state)
}

/// Google redirect URIs, mounted at the root
pub fn redirect_router<R: UserRepository + 'static>(state: AuthState<R>) -> Router {
    Router::new()
        .route("/oauth/callback", get(oauth_callback::<R>))
        .route("/oauth/service-callback", get(service_callback::<R>))
        .with_state(state)
}

/// `frontend_url?k=v&...` with percent-encoded values
fn frontend_redirect(frontend_url: &str, params: &[(&str, &str)]) -> String {
    let query = params
        .iter()
        .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");
    let separator = if frontend_url.contains('?') { '&' } else { '?' };
    format!("{}{}{}", frontend_url, separator, query)
}

fn redirect_with_error(frontend_url: &str, error: &str) -> Response {
    Redirect::to(&frontend_redirect(frontend_url, &[("error", error)])).into_response()
}

/// Start the base Google login
#[utoipa::path(
    post,
    path = "/api/oauth/initiate",
    tag = TAG,
    request_body = InitiateRequest,
    responses(
        (status = 200, description = "Authorization URL for base permissions", body = InitiateResponse),
        (status = 500, description = "State could not be stored", body = ErrorResponse)
    )
)]
async fn initiate_oauth<R: UserRepository>(
    State(state): State<AuthState<R>>,
    payload: Result<Json<InitiateRequest>, JsonRejection>,
) -> Result<Json<InitiateResponse>, AppError> {
    // An absent or unreadable body is a login without a prompt
    let request = payload.map(|Json(r)| r).unwrap_or_default();
    let redirect = state.flow.initiate(request.prompt.as_deref()).await?;

    Ok(Json(InitiateResponse {
        success: true,
        redirect,
    }))
}

/// Base-permission redirect URI
#[utoipa::path(
    get,
    path = "/oauth/callback",
    tag = TAG,
    params(OAuthCallbackParams),
    responses(
        (status = 303, description = "Back to the frontend with `auth_success` or `error`; sets the session cookie on success")
    )
)]
async fn oauth_callback<R: UserRepository>(
    State(state): State<AuthState<R>>,
    Query(params): Query<OAuthCallbackParams>,
) -> Response {
    if let Some(error) = params.error {
        tracing::warn!(%error, "Google returned an error on base consent");
        return redirect_with_error(&state.frontend_url, &error);
    }
    let (Some(code), Some(oauth_state)) = (params.code, params.state) else {
        return redirect_with_error(&state.frontend_url, "missing_parameters");
    };

    let login = match state.flow.complete_base(&oauth_state, &code).await {
        Ok(login) => login,
        Err(UserError::InvalidState) => {
            tracing::warn!("Base callback with unknown, used or expired state");
            return redirect_with_error(&state.frontend_url, "invalid_state");
        }
        Err(e) => {
            tracing::error!(error = %e, "Base OAuth callback failed");
            return redirect_with_error(&state.frontend_url, "auth_failed");
        }
    };

    let user = &login.user;
    let token = match state
        .jwt
        .create_session_token(user.id, &user.email, user.name(), &user.roles())
    {
        Ok(token) => token,
        Err(e) => {
            tracing::error!("Failed to create session token: {:?}", e);
            return redirect_with_error(&state.frontend_url, "auth_failed");
        }
    };

    let mut params = vec![("auth_success", "true")];
    if login.needs_service_permissions {
        params.push(("state", login.state.as_str()));
        params.push(("needs_service_perms", "true"));
    }

    (
        AppendHeaders([(header::SET_COOKIE, state.jwt.session_cookie(&token))]),
        Redirect::to(&frontend_redirect(&state.frontend_url, &params)),
    )
        .into_response()
}

/// Start incremental consent for the given services
#[utoipa::path(
    post,
    path = "/api/oauth/request-service-permissions",
    tag = TAG,
    request_body = ServicePermissionsRequest,
    responses(
        (status = 200, description = "Authorization URL for the service scopes", body = ServicePermissionsResponse),
        (status = 400, description = "Invalid state or no services requested", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
async fn request_service_permissions<R: UserRepository>(
    State(state): State<AuthState<R>>,
    current: Option<CurrentUser>,
    payload: Result<Json<ServicePermissionsRequest>, JsonRejection>,
) -> Result<Json<ServicePermissionsResponse>, AppError> {
    let Json(request) = payload?;
    let session_user = current.map(|c| c.id()).transpose()?;

    let redirect = state
        .flow
        .request_service_permissions(session_user, request.state.as_deref(), request.services)
        .await?;

    Ok(Json(ServicePermissionsResponse {
        success: true,
        redirect,
    }))
}

/// Service-permission redirect URI
#[utoipa::path(
    get,
    path = "/oauth/service-callback",
    tag = TAG,
    params(OAuthCallbackParams),
    responses(
        (status = 303, description = "Back to the frontend with `service_perms_granted` or `error`")
    )
)]
async fn service_callback<R: UserRepository>(
    State(state): State<AuthState<R>>,
    Query(params): Query<OAuthCallbackParams>,
) -> Response {
    if let Some(error) = params.error {
        tracing::warn!(%error, "Google returned an error on service consent");
        if let Some(oauth_state) = params.state.as_deref()
            && let Err(e) = state.flow.deny_service(oauth_state).await
        {
            tracing::debug!(error = %e, "Could not record denied service permissions");
        }
        return redirect_with_error(&state.frontend_url, &error);
    }
    let (Some(code), Some(oauth_state)) = (params.code, params.state) else {
        return redirect_with_error(&state.frontend_url, "missing_parameters");
    };

    let grant = match state.flow.complete_service(&oauth_state, &code).await {
        Ok(grant) => grant,
        Err(UserError::InvalidState) => {
            tracing::warn!("Service callback with unknown, used or expired state");
            return redirect_with_error(&state.frontend_url, "invalid_state");
        }
        Err(e) => {
            tracing::error!(error = %e, "Service OAuth callback failed");
            return redirect_with_error(&state.frontend_url, "service_perm_failed");
        }
    };

    match grant.outcome() {
        GrantOutcome::All => Redirect::to(&frontend_redirect(
            &state.frontend_url,
            &[("service_perms_granted", "true")],
        ))
        .into_response(),
        GrantOutcome::Partial(denied) => {
            let denied = denied
                .iter()
                .map(|s| s.to_string())
                .collect::<Vec<_>>()
                .join(",");
            Redirect::to(&frontend_redirect(
                &state.frontend_url,
                &[("service_perms_granted", "partial"), ("denied", &denied)],
            ))
            .into_response()
        }
        GrantOutcome::None => redirect_with_error(&state.frontend_url, "service_perm_denied"),
    }
}

/// Current session user, or `authenticated: false`
#[utoipa::path(
    get,
    path = "/api/user/info",
    tag = TAG,
    responses(
        (status = 200, description = "Signed-in user", body = UserInfoResponse),
        (status = 401, description = "No valid session", body = UserInfoResponse)
    )
)]
async fn user_info<R: UserRepository>(
    State(state): State<AuthState<R>>,
    current: Option<CurrentUser>,
) -> Result<Response, AppError> {
    let anonymous = || {
        (
            StatusCode::UNAUTHORIZED,
            Json(UserInfoResponse {
                authenticated: false,
                user: None,
            }),
        )
            .into_response()
    };

    let Some(user_id) = current.and_then(|c| c.0.user_id()) else {
        return Ok(anonymous());
    };
    let Some(user) = state.users.find_user(user_id).await? else {
        return Ok(anonymous());
    };

    Ok(Json(UserInfoResponse {
        authenticated: true,
        user: Some(UserInfo::from(&user)),
    })
    .into_response())
}

/// Clear the session cookie
#[utoipa::path(
    post,
    path = "/api/user/logout",
    tag = TAG,
    responses((status = 200, description = "Session cookie cleared", body = LogoutResponse))
)]
async fn logout<R: UserRepository>(State(state): State<AuthState<R>>) -> Response {
    (
        AppendHeaders([(header::SET_COOKIE, state.jwt.clear_session_cookie())]),
        Json(LogoutResponse { success: true }),
    )
        .into_response()
}

/// Per-service permissions and token state; refreshes an expired token first
#[utoipa::path(
    get,
    path = "/api/services/status",
    tag = TAG,
    responses(
        (status = 200, description = "Service status", body = ServiceStatus),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 502, description = "Token refresh failed", body = ErrorResponse)
    )
)]
async fn services_status<R: UserRepository>(
    State(state): State<AuthState<R>>,
    current: CurrentUser,
) -> Result<Json<ServiceStatus>, AppError> {
    let status = state.flow.service_status(current.id()?).await?;
    Ok(Json(status))
}
