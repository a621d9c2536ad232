use super::jwt::{JwtAuth, SESSION_COOKIE};
use crate::errors::AppError;
use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};

/// Bearer header first, then the session cookie.
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "))
        .map(str::to_string)
        .or_else(|| {
            headers
                .get(header::COOKIE)
                .and_then(|v| v.to_str().ok())
                .and_then(|cookies| {
                    cookies.split(';').find_map(|cookie| {
                        let (name, value) = cookie.trim().split_once('=')?;
                        (name == SESSION_COOKIE && !value.is_empty()).then(|| value.to_string())
                    })
                })
        })
}

/// Rejects the request with 401 unless a valid session token is present.
///
/// On success the [`JwtClaims`](super::JwtClaims) are inserted into the request extensions.
pub async fn jwt_auth_middleware(
    State(auth): State<JwtAuth>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(token) = extract_token(request.headers()) else {
        tracing::debug!("No session token in Authorization header or cookie");
        return Err(AppError::Unauthorized("Authentication required".into()));
    };

    let claims = auth.verify_token(&token).map_err(|e| {
        tracing::debug!("Session token rejected: {}", e);
        AppError::Unauthorized("Invalid or expired session".into())
    })?;

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

/// Like [`jwt_auth_middleware`] but lets anonymous requests through without claims.
pub async fn optional_jwt_auth_middleware(
    State(auth): State<JwtAuth>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(claims) = extract_token(request.headers()).and_then(|t| auth.verify_token(&t).ok())
    {
        request.extensions_mut().insert(claims);
    }

    next.run(request).await
}
