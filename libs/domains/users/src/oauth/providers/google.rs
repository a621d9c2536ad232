use async_trait::async_trait;
use oauth2::basic::{BasicClient, BasicTokenResponse};
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, EndpointNotSet, EndpointSet,
    PkceCodeChallenge, PkceCodeVerifier, RedirectUrl, RefreshToken, Scope,
    TokenResponse as OAuth2TokenResponse, TokenUrl,
};

use crate::error::{UserError, UserResult};
use crate::oauth::providers::OAuthProvider;
use crate::oauth::types::{AuthorizeParams, GoogleUserInfo, TokenResponse};

pub const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/auth";
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

type GoogleClient =
    BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

#[derive(Clone)]
pub struct GoogleProvider {
    client_id: String,
    client_secret: String,
    auth_url: String,
    token_url: String,
    userinfo_url: String,
    http_client: reqwest::Client,
}

impl GoogleProvider {
    pub fn new(client_id: String, client_secret: String) -> UserResult<Self> {
        // The token endpoint must not be followed through redirects
        let http_client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| UserError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client_id,
            client_secret,
            auth_url: GOOGLE_AUTH_URL.to_string(),
            token_url: GOOGLE_TOKEN_URL.to_string(),
            userinfo_url: GOOGLE_USERINFO_URL.to_string(),
            http_client,
        })
    }

    /// Point the provider at other endpoints (local fakes, emulators).
    pub fn with_endpoints(
        mut self,
        auth_url: impl Into<String>,
        token_url: impl Into<String>,
        userinfo_url: impl Into<String>,
    ) -> Self {
        self.auth_url = auth_url.into();
        self.token_url = token_url.into();
        self.userinfo_url = userinfo_url.into();
        self
    }

    fn client(&self) -> UserResult<GoogleClient> {
        Ok(BasicClient::new(ClientId::new(self.client_id.clone()))
            .set_client_secret(ClientSecret::new(self.client_secret.clone()))
            .set_auth_uri(
                AuthUrl::new(self.auth_url.clone())
                    .map_err(|e| UserError::Internal(format!("Invalid auth URL: {}", e)))?,
            )
            .set_token_uri(
                TokenUrl::new(self.token_url.clone())
                    .map_err(|e| UserError::Internal(format!("Invalid token URL: {}", e)))?,
            ))
    }
}

fn into_token_response(token: BasicTokenResponse) -> TokenResponse {
    TokenResponse {
        access_token: token.access_token().secret().clone(),
        refresh_token: token.refresh_token().map(|t| t.secret().clone()),
        expires_in: token.expires_in().map(|d| d.as_secs()),
        scopes: token
            .scopes()
            .map(|scopes| scopes.iter().map(|s| s.to_string()).collect())
            .unwrap_or_default(),
    }
}

#[async_trait]
impl OAuthProvider for GoogleProvider {
    fn name(&self) -> &str {
        "google"
    }

    fn authorize_url(&self, params: &AuthorizeParams) -> UserResult<String> {
        let redirect_url = RedirectUrl::new(params.redirect_uri.clone())
            .map_err(|e| UserError::Internal(format!("Invalid redirect URL: {}", e)))?;
        let client = self.client()?.set_redirect_uri(redirect_url);

        let verifier = PkceCodeVerifier::new(params.pkce_verifier.clone());
        let challenge = PkceCodeChallenge::from_code_verifier_sha256(&verifier);

        let state = params.state.clone();
        let mut request = client
            .authorize_url(move || CsrfToken::new(state))
            .add_scopes(params.scopes.iter().cloned().map(Scope::new))
            .set_pkce_challenge(challenge)
            .add_extra_param("access_type", "offline")
            .add_extra_param("include_granted_scopes", "true")
            .add_extra_param("prompt", "consent");

        if let Some(hint) = &params.login_hint {
            request = request.add_extra_param("login_hint", hint.clone());
        }

        let (url, _) = request.url();
        Ok(url.to_string())
    }

    async fn exchange_code(
        &self,
        code: &str,
        pkce_verifier: &str,
        redirect_uri: &str,
    ) -> UserResult<TokenResponse> {
        let redirect_url = RedirectUrl::new(redirect_uri.to_string())
            .map_err(|e| UserError::Internal(format!("Invalid redirect URL: {}", e)))?;

        let token = self
            .client()?
            .set_redirect_uri(redirect_url)
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .set_pkce_verifier(PkceCodeVerifier::new(pkce_verifier.to_string()))
            .request_async(&self.http_client)
            .await
            .map_err(|e| UserError::Upstream(format!("Failed to exchange code: {}", e)))?;

        Ok(into_token_response(token))
    }

    async fn refresh_token(&self, refresh_token: &str) -> UserResult<TokenResponse> {
        let token = self
            .client()?
            .exchange_refresh_token(&RefreshToken::new(refresh_token.to_string()))
            .request_async(&self.http_client)
            .await
            .map_err(|e| UserError::Upstream(format!("Failed to refresh token: {}", e)))?;

        Ok(into_token_response(token))
    }

    async fn get_user_info(&self, access_token: &str) -> UserResult<GoogleUserInfo> {
        let response = self
            .http_client
            .get(&self.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| UserError::Upstream(format!("Failed to get user info: {}", e)))?;

        if !response.status().is_success() {
            return Err(UserError::Upstream(format!(
                "Google API returned error: {}",
                response.status()
            )));
        }

        response
            .json::<GoogleUserInfo>()
            .await
            .map_err(|e| UserError::Upstream(format!("Failed to parse user info: {}", e)))
    }
}
