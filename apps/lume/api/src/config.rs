use axum_helpers::JwtConfig;
use core_config::server::ServerConfig;
use core_config::{
    AppInfo, ConfigError, FromEnv, app_info, env_list, env_or_default, env_parse_or,
    env_required,
};
use database::postgres::PostgresConfig;
use domain_users::oauth::flow::DEFAULT_STATE_TTL_SECS;
use std::path::PathBuf;

pub use core_config::Environment;

/// Google OAuth client and redirect settings.
///
/// - `GOOGLE_CLIENT_ID`, `GOOGLE_CLIENT_SECRET` (required)
/// - `OAUTH_REDIRECT_BASE_URL` (default `http://localhost:8080`)
/// - `OAUTH_STATE_TTL_SECS` (default 600)
#[derive(Clone, Debug)]
pub struct GoogleConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_base_url: String,
    pub state_ttl_secs: i64,
}

impl FromEnv for GoogleConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let state_ttl_secs = env_parse_or("OAUTH_STATE_TTL_SECS", DEFAULT_STATE_TTL_SECS)?;
        if state_ttl_secs <= 0 {
            return Err(ConfigError::Invalid {
                key: "OAUTH_STATE_TTL_SECS".to_string(),
                details: "must be positive".to_string(),
            });
        }

        Ok(Self {
            client_id: env_required("GOOGLE_CLIENT_ID")?,
            client_secret: env_required("GOOGLE_CLIENT_SECRET")?,
            redirect_base_url: env_or_default("OAUTH_REDIRECT_BASE_URL", "http://localhost:8080")
                .trim_end_matches('/')
                .to_string(),
            state_ttl_secs,
        })
    }
}

/// Application configuration, loaded once at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: PostgresConfig,
    pub jwt: JwtConfig,
    pub google: GoogleConfig,
    /// Where OAuth callbacks send the browser
    pub frontend_url: String,
    /// Emails granted the admin role on login
    pub admin_emails: Vec<String>,
    pub cors_origins: Vec<String>,
    /// Pre-built chat UI served as the fallback route
    pub frontend_dist_dir: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let frontend_url = env_or_default("FRONTEND_URL", "http://localhost:3000");

        // The frontend is the only browser origin unless overridden
        let mut cors_origins = env_list("CORS_ALLOWED_ORIGIN");
        if cors_origins.is_empty() {
            cors_origins.push(frontend_url.clone());
        }

        Ok(Self {
            app: app_info!(),
            server: ServerConfig::from_env()?,
            database: PostgresConfig::from_env()?,
            jwt: JwtConfig::from_env()?,
            google: GoogleConfig::from_env()?,
            frontend_url,
            admin_emails: env_list("ADMIN_EMAILS"),
            cors_origins,
            frontend_dist_dir: std::env::var("FRONTEND_DIST_DIR")
                .ok()
                .filter(|dir| !dir.trim().is_empty())
                .map(PathBuf::from),
            environment,
        })
    }
}
