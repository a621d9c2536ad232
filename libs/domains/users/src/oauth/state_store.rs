use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::UserResult;
use crate::oauth::types::{NewOAuthState, OAuthStage, OAuthState, OAuthStateFilter};

/// Persistence for OAuth CSRF states
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OAuthStateRepository: Send + Sync {
    async fn create(&self, state: NewOAuthState) -> UserResult<OAuthState>;

    /// Atomically mark an unused, unexpired state as used and return it.
    ///
    /// `None` for unknown, already used or expired states. Two concurrent
    /// callers with the same token never both succeed.
    async fn consume(&self, state: &str, now: DateTime<Utc>) -> UserResult<Option<OAuthState>>;

    /// Record the user a completed base login produced
    async fn attach_user(&self, id: Uuid, user_id: Uuid) -> UserResult<()>;

    /// A used, unexpired base-stage state that has a user attached
    async fn find_completed(
        &self,
        state: &str,
        now: DateTime<Utc>,
    ) -> UserResult<Option<OAuthState>>;

    /// Delete expired states; returns how many were removed
    async fn purge_expired(&self, now: DateTime<Utc>) -> UserResult<u64>;

    /// Newest first
    async fn list(&self, filter: OAuthStateFilter) -> UserResult<Vec<OAuthState>>;
}

/// In-memory implementation of OAuthStateRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryOAuthStateRepository {
    states: Arc<RwLock<HashMap<String, OAuthState>>>,
}

impl InMemoryOAuthStateRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OAuthStateRepository for InMemoryOAuthStateRepository {
    async fn create(&self, input: NewOAuthState) -> UserResult<OAuthState> {
        let state = input.into_state(Uuid::now_v7());
        self.states
            .write()
            .await
            .insert(state.state.clone(), state.clone());
        Ok(state)
    }

    async fn consume(&self, state: &str, now: DateTime<Utc>) -> UserResult<Option<OAuthState>> {
        let mut states = self.states.write().await;
        match states.get_mut(state) {
            Some(entry) if entry.is_consumable(now) => {
                entry.used = true;
                Ok(Some(entry.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn attach_user(&self, id: Uuid, user_id: Uuid) -> UserResult<()> {
        let mut states = self.states.write().await;
        if let Some(entry) = states.values_mut().find(|s| s.id == id) {
            entry.user_id = Some(user_id);
        }
        Ok(())
    }

    async fn find_completed(
        &self,
        state: &str,
        now: DateTime<Utc>,
    ) -> UserResult<Option<OAuthState>> {
        let states = self.states.read().await;
        Ok(states
            .get(state)
            .filter(|s| {
                s.used
                    && !s.is_expired(now)
                    && s.user_id.is_some()
                    && s.stage == OAuthStage::BasePermissions
            })
            .cloned())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> UserResult<u64> {
        let mut states = self.states.write().await;
        let before = states.len();
        states.retain(|_, s| !s.is_expired(now));
        Ok((before - states.len()) as u64)
    }

    async fn list(&self, filter: OAuthStateFilter) -> UserResult<Vec<OAuthState>> {
        let states = self.states.read().await;
        let mut result: Vec<OAuthState> =
            states.values().filter(|s| filter.matches(s)).cloned().collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));

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
    use chrono::Duration;
    use domain_service_detector::ServiceFlags;

    fn new_state() -> NewOAuthState {
        NewOAuthState::generate(OAuthStage::BasePermissions, ServiceFlags::default(), 600)
    }

    #[tokio::test]
    async fn test_consume_is_single_use() {
        let repo = InMemoryOAuthStateRepository::new();
        let created = repo.create(new_state()).await.unwrap();
        let now = Utc::now();

        let first = repo.consume(&created.state, now).await.unwrap();
        assert!(first.is_some_and(|s| s.used));
        assert!(repo.consume(&created.state, now).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_concurrent_consume_has_one_winner() {
        let repo = InMemoryOAuthStateRepository::new();
        let created = repo.create(new_state()).await.unwrap();
        let now = Utc::now();

        let (a, b) = tokio::join!(
            repo.consume(&created.state, now),
            repo.consume(&created.state, now)
        );
        let winners = [a.unwrap(), b.unwrap()]
            .into_iter()
            .filter(Option::is_some)
            .count();
        assert_eq!(winners, 1);
    }

    #[tokio::test]
    async fn test_expired_state_is_not_consumable() {
        let repo = InMemoryOAuthStateRepository::new();
        let created = repo.create(new_state()).await.unwrap();

        let later = created.expires_at + Duration::seconds(1);
        assert!(repo.consume(&created.state, later).await.unwrap().is_none());
        assert!(repo.consume("unknown", Utc::now()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_completed_requires_user() {
        let repo = InMemoryOAuthStateRepository::new();
        let created = repo.create(new_state()).await.unwrap();
        let now = Utc::now();

        repo.consume(&created.state, now).await.unwrap();
        assert!(repo.find_completed(&created.state, now).await.unwrap().is_none());

        let user_id = Uuid::now_v7();
        repo.attach_user(created.id, user_id).await.unwrap();
        let found = repo.find_completed(&created.state, now).await.unwrap();
        assert_eq!(found.and_then(|s| s.user_id), Some(user_id));
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let repo = InMemoryOAuthStateRepository::new();
        repo.create(new_state()).await.unwrap();
        let mut stale = new_state();
        stale.expires_at = Utc::now() - Duration::seconds(5);
        repo.create(stale).await.unwrap();

        assert_eq!(repo.purge_expired(Utc::now()).await.unwrap(), 1);
        assert_eq!(repo.list(OAuthStateFilter::default()).await.unwrap().len(), 1);
    }
}
