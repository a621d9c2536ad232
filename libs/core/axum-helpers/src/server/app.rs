use super::shutdown::ShutdownCoordinator;
use crate::errors::handlers::not_found;
use crate::http::{create_cors_layer, parse_origins, security_headers};
use axum::{Router, middleware};
use core_config::server::ServerConfig;
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use tower_http::compression::CompressionLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{Level, info};
use utoipa::OpenApi;

/// Request timeout applied to every route
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// The pieces [`create_router`] stitches together.
pub struct AppRoutes {
    /// JSON API, nested under `/api`
    pub api: Router,
    /// Routes mounted at the root (OAuth redirect URIs, health probes)
    pub root: Router,
    /// Pre-built frontend served as the fallback, with `index.html` for client routes
    pub static_dir: Option<PathBuf>,
}

impl AppRoutes {
    pub fn new(api: Router) -> Self {
        Self {
            api,
            root: Router::new(),
            static_dir: None,
        }
    }

    pub fn with_root(mut self, root: Router) -> Self {
        self.root = self.root.merge(root);
        self
    }

    pub fn with_static_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.static_dir = dir;
        self
    }
}

/// Assemble the application router.
///
/// - OpenAPI UIs: `/docs` (Swagger), `/redoc`, `/rapidoc`, `/scalar`
/// - `routes.api` under `/api`, `routes.root` at `/`
/// - Fallback: the static frontend when configured, JSON 404 otherwise
/// - Layers: tracing, security headers, credentialed CORS, compression, timeout
pub fn create_router<T>(routes: AppRoutes, cors_origins: &[String]) -> io::Result<Router>
where
    T: OpenApi + 'static,
{
    use utoipa_rapidoc::RapiDoc;
    use utoipa_redoc::{Redoc, Servable as RedocServable};
    use utoipa_scalar::{Scalar, Servable as ScalarServable};
    use utoipa_swagger_ui::SwaggerUi;

    let origins = parse_origins(cors_origins)?;
    info!(origins = ?cors_origins, "CORS configured");

    let router = Router::new()
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", T::openapi()))
        .merge(Redoc::with_url("/redoc", T::openapi()))
        .merge(RapiDoc::new("/api-docs/openapi.json").path("/rapidoc"))
        .merge(Scalar::with_url("/scalar", T::openapi()))
        .nest("/api", routes.api)
        .merge(routes.root);

    let router = match routes.static_dir {
        Some(dir) => {
            info!(dir = %dir.display(), "Serving frontend bundle");
            let index = dir.join("index.html");
            router.fallback_service(ServeDir::new(dir).fallback(ServeFile::new(index)))
        }
        None => router.fallback(not_found),
    };

    Ok(router
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(middleware::from_fn(security_headers))
        .layer(create_cors_layer(origins))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT)))
}

/// Serve `router` until SIGINT/SIGTERM, then run `cleanup` within `shutdown_timeout`.
pub async fn create_production_app<F>(
    router: Router,
    server_config: &ServerConfig,
    shutdown_timeout: Duration,
    cleanup: F,
) -> io::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let coordinator = ShutdownCoordinator::new();
    let cleanup_signal = coordinator.clone();

    let listener = tokio::net::TcpListener::bind(server_config.address()).await?;
    info!("Server starting on {}", listener.local_addr()?);

    let cleanup_handle = tokio::spawn(async move {
        cleanup_signal.wait().await;

        info!(timeout = ?shutdown_timeout, "Running cleanup");
        if tokio::time::timeout(shutdown_timeout, cleanup).await.is_err() {
            tracing::warn!(timeout = ?shutdown_timeout, "Cleanup timed out, forcing shutdown");
        } else {
            info!("Cleanup completed");
        }
    });

    let signal_source = coordinator.clone();
    tokio::spawn(async move { signal_source.listen_for_signals().await });

    let serve_result = axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(async move { coordinator.wait().await })
        .await
        .inspect_err(|e| tracing::error!("Server encountered an error: {:?}", e));

    cleanup_handle.await.ok();

    serve_result
}
