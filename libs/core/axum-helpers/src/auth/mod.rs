//! Session authentication.
//!
//! After the Google callback the API issues a signed HS256 token and stores it in the
//! `access_token` cookie. The middleware accepts that cookie or an `Authorization: Bearer`
//! header and places [`JwtClaims`] in the request extensions; handlers read them through
//! [`CurrentUser`] or [`AdminUser`].
//!
//! ```ignore
//! use axum_helpers::auth::{JwtAuth, JwtConfig, jwt_auth_middleware};
//!
//! let auth = JwtAuth::new(&JwtConfig::from_env()?);
//! let protected = Router::new()
//!     .route("/chat/send", post(send))
//!     .layer(axum::middleware::from_fn_with_state(auth, jwt_auth_middleware));
//! ```

pub mod config;
pub mod extract;
pub mod jwt;
pub mod middleware;

pub use config::JwtConfig;
pub use extract::{AdminUser, CurrentUser};
pub use jwt::{ADMIN_ROLE, JwtAuth, JwtClaims, SESSION_COOKIE, SESSION_TTL};
pub use middleware::{extract_token, jwt_auth_middleware, optional_jwt_auth_middleware};
