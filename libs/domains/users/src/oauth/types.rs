use chrono::{DateTime, Duration, Utc};
use domain_service_detector::ServiceFlags;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

/// Lifetime assumed when the token endpoint omits `expires_in`
pub const DEFAULT_TOKEN_LIFETIME_SECS: u64 = 3600;

/// Which half of the two-stage consent a state belongs to
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OAuthStage {
    BasePermissions,
    ServicePermissions,
}

/// CSRF state issued with an authorization redirect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OAuthState {
    pub id: Uuid,
    pub state: String,
    pub user_id: Option<Uuid>,
    pub stage: OAuthStage,
    pub requested_services: ServiceFlags,
    #[serde(skip)]
    pub pkce_verifier: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub used: bool,
}

impl OAuthState {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Unused and unexpired
    pub fn is_consumable(&self, now: DateTime<Utc>) -> bool {
        !self.used && !self.is_expired(now)
    }
}

#[derive(Debug, Clone)]
pub struct NewOAuthState {
    pub state: String,
    pub user_id: Option<Uuid>,
    pub stage: OAuthStage,
    pub requested_services: ServiceFlags,
    pub pkce_verifier: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl NewOAuthState {
    /// A state with a random token and PKCE verifier, valid for `ttl_secs`.
    pub fn generate(stage: OAuthStage, requested_services: ServiceFlags, ttl_secs: i64) -> Self {
        let now = Utc::now();
        Self {
            state: generate_state_token(),
            user_id: None,
            stage,
            requested_services,
            pkce_verifier: generate_pkce_verifier(),
            created_at: now,
            expires_at: now + Duration::seconds(ttl_secs),
        }
    }

    pub fn for_user(mut self, user_id: Uuid) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn into_state(self, id: Uuid) -> OAuthState {
        OAuthState {
            id,
            state: self.state,
            user_id: self.user_id,
            stage: self.stage,
            requested_services: self.requested_services,
            pkce_verifier: self.pkce_verifier,
            created_at: self.created_at,
            expires_at: self.expires_at,
            used: false,
        }
    }
}

/// 64 hex characters from 32 random bytes
pub fn generate_state_token() -> String {
    let random_bytes: Vec<u8> = (0..32).map(|_| rand::random::<u8>()).collect();
    const_hex::encode(random_bytes)
}

pub fn generate_pkce_verifier() -> String {
    use oauth2::PkceCodeChallenge;
    let (_challenge, verifier) = PkceCodeChallenge::new_random_sha256();
    verifier.secret().clone()
}

/// Admin filter for OAuth states
#[derive(Debug, Clone, Deserialize, ToSchema, IntoParams)]
pub struct OAuthStateFilter {
    pub used: Option<bool>,
    pub stage: Option<OAuthStage>,
    #[serde(default = "crate::models::default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

impl Default for OAuthStateFilter {
    fn default() -> Self {
        Self {
            used: None,
            stage: None,
            limit: crate::models::default_limit(),
            offset: 0,
        }
    }
}

impl OAuthStateFilter {
    pub fn matches(&self, state: &OAuthState) -> bool {
        self.used.is_none_or(|u| state.used == u) && self.stage.is_none_or(|s| state.stage == s)
    }
}

/// Token endpoint result
#[derive(Debug, Clone, PartialEq)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<u64>,
    /// Scopes reported by the provider; empty when the response omits them
    pub scopes: Vec<String>,
}

impl TokenResponse {
    pub fn expires_at(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let secs = self.expires_in.unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS);
        now + Duration::seconds(i64::try_from(secs).unwrap_or(i64::MAX / 1000))
    }
}

/// Google `oauth2/v2/userinfo` payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoogleUserInfo {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
}

/// Everything needed to build an authorization URL
#[derive(Debug, Clone)]
pub struct AuthorizeParams {
    pub state: String,
    pub scopes: Vec<String>,
    pub pkce_verifier: String,
    pub redirect_uri: String,
    pub login_hint: Option<String>,
}

/// Query string Google sends to both redirect URIs
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct OAuthCallbackParams {
    pub state: Option<String>,
    pub code: Option<String>,
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_token_shape() {
        let a = generate_state_token();
        let b = generate_state_token();
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn test_generated_state_expires_after_ttl() {
        let state = NewOAuthState::generate(OAuthStage::BasePermissions, ServiceFlags::default(), 600)
            .into_state(Uuid::now_v7());

        assert!(state.is_consumable(state.created_at));
        assert!(state.is_consumable(state.created_at + Duration::seconds(599)));
        assert!(!state.is_consumable(state.expires_at));
        assert!(!state.is_consumable(state.created_at + Duration::seconds(601)));
    }

    #[test]
    fn test_stage_names() {
        assert_eq!(OAuthStage::BasePermissions.to_string(), "base_permissions");
        assert_eq!(
            "service_permissions".parse::<OAuthStage>().unwrap(),
            OAuthStage::ServicePermissions
        );
    }

    #[test]
    fn test_token_expiry_defaults_to_an_hour() {
        let now = Utc::now();
        let token = TokenResponse {
            access_token: "a".into(),
            refresh_token: None,
            expires_in: None,
            scopes: vec![],
        };
        assert_eq!(token.expires_at(now), now + Duration::seconds(3600));
    }
}
