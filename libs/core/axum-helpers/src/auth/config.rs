use core_config::{ConfigError, Environment, FromEnv, env_parse_or, env_required};

use super::jwt::SESSION_TTL;

/// Session token settings.
///
/// - `JWT_SECRET` (required, at least 32 characters)
/// - `SESSION_TTL_SECS` (optional, default 14 days)
/// - `APP_ENV=production` marks cookies `Secure`
#[derive(Clone, Debug)]
pub struct JwtConfig {
    pub secret: String,
    pub session_ttl_secs: i64,
    pub secure_cookies: bool,
}

impl JwtConfig {
    /// # Panics
    /// Panics if the secret is shorter than 32 characters. Intended for tests.
    pub fn new(secret: impl Into<String>) -> Self {
        let secret = secret.into();
        assert!(
            secret.len() >= 32,
            "JWT secret must be at least 32 characters"
        );
        Self {
            secret,
            session_ttl_secs: SESSION_TTL,
            secure_cookies: false,
        }
    }
}

impl FromEnv for JwtConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let secret = env_required("JWT_SECRET")?;

        if secret.len() < 32 {
            return Err(ConfigError::Invalid {
                key: "JWT_SECRET".to_string(),
                details: format!(
                    "must be at least 32 characters (got {}). Generate one with: openssl rand -base64 32",
                    secret.len()
                ),
            });
        }

        Ok(Self {
            secret,
            session_ttl_secs: env_parse_or("SESSION_TTL_SECS", SESSION_TTL)?,
            secure_cookies: Environment::from_env().use_https(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "this-is-a-valid-secret-with-32-chars!";

    #[test]
    #[should_panic(expected = "JWT secret must be at least 32 characters")]
    fn test_jwt_config_new_too_short() {
        JwtConfig::new("short");
    }

    #[test]
    fn test_jwt_config_from_env_defaults() {
        temp_env::with_vars(
            [
                ("JWT_SECRET", Some(SECRET)),
                ("SESSION_TTL_SECS", None),
                ("APP_ENV", None),
            ],
            || {
                let config = JwtConfig::from_env().unwrap();
                assert_eq!(config.secret, SECRET);
                assert_eq!(config.session_ttl_secs, SESSION_TTL);
                assert!(!config.secure_cookies);
            },
        );
    }

    #[test]
    fn test_jwt_config_production_uses_secure_cookies() {
        temp_env::with_vars(
            [("JWT_SECRET", Some(SECRET)), ("APP_ENV", Some("production"))],
            || {
                assert!(JwtConfig::from_env().unwrap().secure_cookies);
            },
        );
    }

    #[test]
    fn test_jwt_config_from_env_too_short() {
        temp_env::with_var("JWT_SECRET", Some("short"), || {
            let err = JwtConfig::from_env().unwrap_err();
            assert!(err.to_string().contains("32 characters"));
        });
    }

    #[test]
    fn test_jwt_config_from_env_missing() {
        temp_env::with_var_unset("JWT_SECRET", || {
            assert!(JwtConfig::from_env().is_err());
        });
    }
}
