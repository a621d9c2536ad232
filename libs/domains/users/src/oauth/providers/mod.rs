pub mod google;

use crate::error::UserResult;
use crate::oauth::types::{AuthorizeParams, GoogleUserInfo, TokenResponse};
use async_trait::async_trait;

pub use google::GoogleProvider;

/// Authorization-code provider used by the consent flow.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OAuthProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Authorization URL with PKCE (S256), offline access and forced consent
    fn authorize_url(&self, params: &AuthorizeParams) -> UserResult<String>;

    /// Exchange an authorization code for tokens
    async fn exchange_code(
        &self,
        code: &str,
        pkce_verifier: &str,
        redirect_uri: &str,
    ) -> UserResult<TokenResponse>;

    async fn refresh_token(&self, refresh_token: &str) -> UserResult<TokenResponse>;

    async fn get_user_info(&self, access_token: &str) -> UserResult<GoogleUserInfo>;
}
