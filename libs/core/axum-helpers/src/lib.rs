//! # Axum Helpers
//!
//! Web plumbing shared by the Lume API and its domain crates.
//!
//! ## Modules
//!
//! - **[`auth`]**: HS256 session tokens, cookie helpers, auth middleware and extractors
//! - **[`server`]**: Router assembly with OpenAPI UIs, health/readiness, graceful shutdown
//! - **[`http`]**: CORS and security headers
//! - **[`errors`]**: `AppError` and the `{code, error, message, details}` body
//! - **[`extractors`]**: Validated JSON bodies
//!
//! ## Quick Start
//!
//! ```ignore
//! use axum_helpers::server::{AppRoutes, create_router, create_production_app};
//!
//! let routes = AppRoutes::new(api_routes).with_root(oauth_redirects);
//! let router = create_router::<ApiDoc>(routes, &cors_origins)?;
//! create_production_app(router, &server_config, Duration::from_secs(30), cleanup).await?;
//! ```

pub mod auth;
pub mod errors;
pub mod extractors;
pub mod http;
pub mod server;

pub use auth::{
    AdminUser, CurrentUser, JwtAuth, JwtClaims, JwtConfig, SESSION_COOKIE, SESSION_TTL,
    jwt_auth_middleware, optional_jwt_auth_middleware,
};

pub use server::{
    AppRoutes, HealthCheckFuture, HealthResponse, ShutdownCoordinator, create_production_app,
    create_router, health_router, run_health_checks, shutdown_signal,
};

pub use http::{create_cors_layer, security_headers};

pub use errors::{AppError, AppResult, ErrorCode, ErrorResponse};

pub use extractors::ValidatedJson;
