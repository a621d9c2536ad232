//! Users Domain
//!
//! Google accounts, the two-stage OAuth consent that creates them, and the
//! session/admin endpoints built on top.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────┐
//! │ auth_handlers / admin_handlers│  ← HTTP endpoints and redirect URIs
//! └──────────────┬───────────────┘
//!                │
//! ┌──────────────▼───────────────┐
//! │ OAuthFlowService, UserService │  ← consent stages, token refresh, lookups
//! └──────┬───────────────┬───────┘
//!        │               │
//! ┌──────▼──────┐ ┌──────▼──────┐
//! │ Repositories│ │ OAuthProvider│  ← users, states, permission requests / Google
//! └──────┬──────┘ └─────────────┘
//!        │
//! ┌──────▼──────┐
//! │  Entities   │  ← sea-orm models
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use domain_users::{
//!     FlowConfig, GoogleProvider, InMemoryOAuthStateRepository,
//!     InMemoryPermissionRequestRepository, InMemoryUserRepository, OAuthFlowService,
//! };
//!
//! let users = InMemoryUserRepository::new();
//! let provider = GoogleProvider::new("client-id".into(), "client-secret".into()).unwrap();
//! let flow = OAuthFlowService::new(
//!     Arc::new(users),
//!     Arc::new(InMemoryOAuthStateRepository::new()),
//!     Arc::new(InMemoryPermissionRequestRepository::new()),
//!     Arc::new(provider),
//!     FlowConfig::new("http://localhost:8080"),
//! );
//! ```

pub mod admin_handlers;
pub mod auth_handlers;
pub mod entity;
pub mod error;
pub mod models;
pub mod oauth;
pub mod postgres;
pub mod repository;
pub mod service;

pub use admin_handlers::AdminState;
pub use auth_handlers::AuthState;
pub use error::{UserError, UserResult};
pub use models::{User, UserFilter, UserInfo, UserResponse};
pub use oauth::{
    FlowConfig, GoogleProvider, InMemoryOAuthStateRepository, InMemoryPermissionRequestRepository,
    OAuthFlowService, OAuthProvider, OAuthStateRepository, PermissionRequestRepository,
};
pub use postgres::{PgOAuthStateRepository, PgPermissionRequestRepository, PgUserRepository};
pub use repository::{InMemoryUserRepository, UserRepository};
pub use service::UserService;
