pub mod flow;
pub mod permission_requests;
pub mod providers;
pub mod scopes;
pub mod state_store;
pub mod types;

pub use flow::{
    BaseLogin, FlowConfig, GrantOutcome, LoginRedirect, OAuthFlowService, ServiceConsentRedirect,
    ServiceGrant, ServiceStatus,
};
pub use permission_requests::{
    InMemoryPermissionRequestRepository, PermissionRequest, PermissionRequestFilter,
    PermissionRequestRepository,
};
pub use providers::{GoogleProvider, OAuthProvider};
pub use state_store::{InMemoryOAuthStateRepository, OAuthStateRepository};
pub use types::{OAuthCallbackParams, OAuthStage, OAuthState, OAuthStateFilter, TokenResponse};
