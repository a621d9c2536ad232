use super::config::JwtConfig;
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Session lifetime: 14 days
pub const SESSION_TTL: i64 = 1_209_600;

/// Cookie carrying the session token
pub const SESSION_COOKIE: &str = "access_token";

pub const ADMIN_ROLE: &str = "admin";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,        // User ID
    pub email: String,
    pub name: String,
    pub roles: Vec<String>,
    pub exp: i64,
    pub iat: i64,
    pub jti: String,
}

impl JwtClaims {
    pub fn user_id(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.sub).ok()
    }

    pub fn is_admin(&self) -> bool {
        self.roles.iter().any(|r| r == ADMIN_ROLE)
    }
}

/// Issues and verifies session tokens.
#[derive(Clone)]
pub struct JwtAuth {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: i64,
    secure_cookies: bool,
}

impl JwtAuth {
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            ttl_secs: config.session_ttl_secs,
            secure_cookies: config.secure_cookies,
        }
    }

    pub fn ttl_secs(&self) -> i64 {
        self.ttl_secs
    }

    pub fn create_session_token(
        &self,
        user_id: Uuid,
        email: &str,
        name: &str,
        roles: &[String],
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let claims = JwtClaims {
            sub: user_id.to_string(),
            email: email.to_string(),
            name: name.to_string(),
            roles: roles.to_vec(),
            exp: (now + Duration::seconds(self.ttl_secs)).timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
    }

    /// Checks signature and expiry.
    pub fn verify_token(&self, token: &str) -> Result<JwtClaims, jsonwebtoken::errors::Error> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<JwtClaims>(token, &self.decoding, &validation).map(|data| data.claims)
    }

    /// `Set-Cookie` value for a freshly issued token.
    pub fn session_cookie(&self, token: &str) -> String {
        format!(
            "{}={}; HttpOnly;{} SameSite=Lax; Path=/; Max-Age={}",
            SESSION_COOKIE,
            token,
            if self.secure_cookies { " Secure;" } else { "" },
            self.ttl_secs
        )
    }

    /// `Set-Cookie` value that removes the session cookie.
    pub fn clear_session_cookie(&self) -> String {
        format!(
            "{}=; HttpOnly;{} SameSite=Lax; Path=/; Max-Age=0",
            SESSION_COOKIE,
            if self.secure_cookies { " Secure;" } else { "" },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth() -> JwtAuth {
        JwtAuth::new(&JwtConfig::new("test-secret-that-is-long-enough-for-hs256"))
    }

    #[test]
    fn test_token_round_trip_keeps_claims() {
        let auth = auth();
        let user_id = Uuid::now_v7();
        let roles = vec!["user".to_string(), ADMIN_ROLE.to_string()];

        let token = auth
            .create_session_token(user_id, "ada@example.com", "ada", &roles)
            .unwrap();
        let claims = auth.verify_token(&token).unwrap();

        assert_eq!(claims.user_id(), Some(user_id));
        assert_eq!(claims.email, "ada@example.com");
        assert!(claims.is_admin());
        assert_eq!(claims.exp - claims.iat, SESSION_TTL);
    }

    #[test]
    fn test_token_from_other_secret_is_rejected() {
        let other = JwtAuth::new(&JwtConfig::new("another-secret-that-is-long-enough-xx"));
        let token = other
            .create_session_token(Uuid::now_v7(), "a@b.c", "a", &[])
            .unwrap();

        assert!(auth().verify_token(&token).is_err());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let mut config = JwtConfig::new("test-secret-that-is-long-enough-for-hs256");
        config.session_ttl_secs = -3600;
        let auth = JwtAuth::new(&config);
        let token = auth
            .create_session_token(Uuid::now_v7(), "a@b.c", "a", &[])
            .unwrap();

        assert!(auth.verify_token(&token).is_err());
    }

    #[test]
    fn test_cookie_attributes() {
        let mut config = JwtConfig::new("test-secret-that-is-long-enough-for-hs256");
        let plain = JwtAuth::new(&config).session_cookie("tok");
        assert!(plain.starts_with("access_token=tok; HttpOnly;"));
        assert!(!plain.contains("Secure"));

        config.secure_cookies = true;
        let secure = JwtAuth::new(&config);
        assert!(secure.session_cookie("tok").contains("Secure;"));
        assert!(secure.clear_session_cookie().contains("Max-Age=0"));
    }
}
