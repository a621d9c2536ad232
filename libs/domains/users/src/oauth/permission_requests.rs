use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain_service_detector::GoogleService;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::error::UserResult;

/// The latest consent request for one (user, service) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PermissionRequest {
    pub id: Uuid,
    pub user_id: Uuid,
    pub service: GoogleService,
    pub requested_scopes: Vec<String>,
    pub requested_at: DateTime<Utc>,
    pub granted_at: Option<DateTime<Utc>>,
    pub is_granted: bool,
}

impl PermissionRequest {
    pub fn pending(
        user_id: Uuid,
        service: GoogleService,
        requested_scopes: Vec<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            user_id,
            service,
            requested_scopes,
            requested_at: now,
            granted_at: None,
            is_granted: false,
        }
    }

    pub fn resolve(&mut self, granted: bool, now: DateTime<Utc>) {
        self.is_granted = granted;
        self.granted_at = granted.then_some(now);
    }
}

/// Admin filter for permission requests
#[derive(Debug, Clone, Deserialize, ToSchema, IntoParams)]
pub struct PermissionRequestFilter {
    pub user_id: Option<Uuid>,
    pub service: Option<GoogleService>,
    pub granted: Option<bool>,
    #[serde(default = "crate::models::default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

impl Default for PermissionRequestFilter {
    fn default() -> Self {
        Self {
            user_id: None,
            service: None,
            granted: None,
            limit: crate::models::default_limit(),
            offset: 0,
        }
    }
}

impl PermissionRequestFilter {
    pub fn matches(&self, request: &PermissionRequest) -> bool {
        self.user_id.is_none_or(|id| request.user_id == id)
            && self.service.is_none_or(|s| request.service == s)
            && self.granted.is_none_or(|g| request.is_granted == g)
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PermissionRequestRepository: Send + Sync {
    /// Record a fresh pending request, replacing any earlier one for the pair
    async fn upsert_pending(
        &self,
        user_id: Uuid,
        service: GoogleService,
        requested_scopes: Vec<String>,
        now: DateTime<Utc>,
    ) -> UserResult<PermissionRequest>;

    /// Mark the pair granted or denied, creating the row when none exists
    async fn resolve(
        &self,
        user_id: Uuid,
        service: GoogleService,
        granted: bool,
        now: DateTime<Utc>,
    ) -> UserResult<PermissionRequest>;

    async fn list(&self, filter: PermissionRequestFilter) -> UserResult<Vec<PermissionRequest>>;
}

/// In-memory implementation of PermissionRequestRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryPermissionRequestRepository {
    requests: Arc<RwLock<HashMap<(Uuid, GoogleService), PermissionRequest>>>,
}

impl InMemoryPermissionRequestRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PermissionRequestRepository for InMemoryPermissionRequestRepository {
    async fn upsert_pending(
        &self,
        user_id: Uuid,
        service: GoogleService,
        requested_scopes: Vec<String>,
        now: DateTime<Utc>,
    ) -> UserResult<PermissionRequest> {
        let mut requests = self.requests.write().await;
        let entry = requests
            .entry((user_id, service))
            .and_modify(|r| {
                r.requested_scopes = requested_scopes.clone();
                r.requested_at = now;
                r.granted_at = None;
                r.is_granted = false;
            })
            .or_insert_with(|| {
                PermissionRequest::pending(user_id, service, requested_scopes.clone(), now)
            });
        Ok(entry.clone())
    }

    async fn resolve(
        &self,
        user_id: Uuid,
        service: GoogleService,
        granted: bool,
        now: DateTime<Utc>,
    ) -> UserResult<PermissionRequest> {
        let mut requests = self.requests.write().await;
        let entry = requests.entry((user_id, service)).or_insert_with(|| {
            let scopes = crate::oauth::scopes::service_scopes(service)
                .iter()
                .map(|s| s.to_string())
                .collect();
            PermissionRequest::pending(user_id, service, scopes, now)
        });
        entry.resolve(granted, now);
        Ok(entry.clone())
    }

    async fn list(&self, filter: PermissionRequestFilter) -> UserResult<Vec<PermissionRequest>> {
        let requests = self.requests.read().await;
        let mut result: Vec<PermissionRequest> = requests
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        result.sort_by(|a, b| b.requested_at.cmp(&a.requested_at));

        Ok(result
            .into_iter()
            .skip(filter.offset as usize)
            .take(filter.limit as usize)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_one_row_per_user_and_service() {
        let repo = InMemoryPermissionRequestRepository::new();
        let user_id = Uuid::now_v7();
        let now = Utc::now();

        repo.upsert_pending(user_id, GoogleService::Tasks, vec!["a".into()], now)
            .await
            .unwrap();
        repo.resolve(user_id, GoogleService::Tasks, true, now)
            .await
            .unwrap();
        let again = repo
            .upsert_pending(user_id, GoogleService::Tasks, vec!["b".into()], now)
            .await
            .unwrap();

        assert!(!again.is_granted);
        assert_eq!(again.granted_at, None);
        let all = repo.list(PermissionRequestFilter::default()).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].requested_scopes, vec!["b"]);
    }

    #[tokio::test]
    async fn test_resolve_without_pending_creates_row() {
        let repo = InMemoryPermissionRequestRepository::new();
        let user_id = Uuid::now_v7();

        let request = repo
            .resolve(user_id, GoogleService::Keep, true, Utc::now())
            .await
            .unwrap();
        assert!(request.is_granted);
        assert!(request.granted_at.is_some());

        let granted = PermissionRequestFilter {
            granted: Some(false),
            ..Default::default()
        };
        assert!(repo.list(granted).await.unwrap().is_empty());
    }
}
