use axum_helpers::auth::ADMIN_ROLE;
use chrono::{DateTime, Utc};
use domain_service_detector::{GoogleService, ServiceFlags};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

pub const USER_ROLE: &str = "user";

/// A Google account that has completed the base consent.
///
/// OAuth tokens are kept here for API calls on the user's behalf and are never
/// serialized; responses go through [`UserResponse`] or [`UserInfo`].
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub google_id: String,
    pub email: String,
    /// Local part of the email
    pub username: String,
    pub display_name: Option<String>,
    pub profile_picture: Option<String>,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub token_expires_at: Option<DateTime<Utc>>,
    pub permissions: ServiceFlags,
    pub granted_scopes: Vec<String>,
    pub is_staff: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl User {
    /// Fresh user from a Google profile; tokens and permissions are filled in by the caller.
    pub fn new(google_id: impl Into<String>, email: &str) -> Self {
        let now = Utc::now();
        let email = email.to_lowercase();
        Self {
            id: Uuid::now_v7(),
            google_id: google_id.into(),
            username: username_from_email(&email),
            email,
            display_name: None,
            profile_picture: None,
            access_token: None,
            refresh_token: None,
            token_expires_at: None,
            permissions: ServiceFlags::default(),
            granted_scopes: Vec::new(),
            is_staff: false,
            created_at: now,
            updated_at: now,
            last_login_at: None,
        }
    }

    pub fn has_scope(&self, scope: &str) -> bool {
        self.granted_scopes.iter().any(|s| s == scope)
    }

    /// True when there is no recorded expiry or it has passed.
    pub fn is_token_expired(&self, now: DateTime<Utc>) -> bool {
        self.token_expires_at.is_none_or(|expires| expires <= now)
    }

    pub fn permissions(&self) -> ServiceFlags {
        self.permissions
    }

    pub fn has_permission(&self, service: GoogleService) -> bool {
        self.permissions.get(service)
    }

    /// Session roles: always `user`, plus `admin` for staff.
    pub fn roles(&self) -> Vec<String> {
        let mut roles = vec![USER_ROLE.to_string()];
        if self.is_staff {
            roles.push(ADMIN_ROLE.to_string());
        }
        roles
    }

    pub fn name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.username)
    }

    /// Add scopes not already present, keeping order.
    pub fn merge_scopes<I: IntoIterator<Item = String>>(&mut self, scopes: I) {
        for scope in scopes {
            if !self.has_scope(&scope) {
                self.granted_scopes.push(scope);
            }
        }
    }
}

pub fn username_from_email(email: &str) -> String {
    email.split('@').next().unwrap_or(email).to_string()
}

/// User as returned by `/api/user/info`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserInfo {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub profile_picture: Option<String>,
    pub permissions: ServiceFlags,
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            username: user.username.clone(),
            profile_picture: user.profile_picture.clone(),
            permissions: user.permissions,
        }
    }
}

/// User as listed in the admin API
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub google_id: String,
    pub email: String,
    pub username: String,
    pub display_name: Option<String>,
    pub profile_picture: Option<String>,
    pub permissions: ServiceFlags,
    pub granted_scopes: Vec<String>,
    pub has_refresh_token: bool,
    pub token_expires_at: Option<DateTime<Utc>>,
    pub is_staff: bool,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            google_id: user.google_id,
            email: user.email,
            username: user.username,
            display_name: user.display_name,
            profile_picture: user.profile_picture,
            permissions: user.permissions,
            granted_scopes: user.granted_scopes,
            has_refresh_token: user.refresh_token.is_some(),
            token_expires_at: user.token_expires_at,
            is_staff: user.is_staff,
            created_at: user.created_at,
            last_login_at: user.last_login_at,
        }
    }
}

/// Admin filter for users
#[derive(Debug, Clone, Deserialize, IntoParams, ToSchema)]
pub struct UserFilter {
    /// Substring of email, username or display name
    pub search: Option<String>,
    /// Only users holding this service permission
    pub service: Option<GoogleService>,
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

impl Default for UserFilter {
    fn default() -> Self {
        Self {
            search: None,
            service: None,
            limit: default_limit(),
            offset: 0,
        }
    }
}

pub(crate) fn default_limit() -> u64 {
    50
}

impl UserFilter {
    pub fn matches(&self, user: &User) -> bool {
        let search_ok = self.search.as_deref().is_none_or(|s| {
            let s = s.to_lowercase();
            user.email.contains(&s)
                || user.username.contains(&s)
                || user
                    .display_name
                    .as_deref()
                    .is_some_and(|n| n.to_lowercase().contains(&s))
        });
        let service_ok = self.service.is_none_or(|svc| user.has_permission(svc));
        search_ok && service_ok
    }
}
