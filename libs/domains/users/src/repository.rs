use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{UserError, UserResult};
use crate::models::{User, UserFilter};

/// Repository trait for User persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn get_by_id(&self, id: Uuid) -> UserResult<Option<User>>;

    async fn find_by_google_id(&self, google_id: &str) -> UserResult<Option<User>>;

    /// Case-insensitive
    async fn find_by_email(&self, email: &str) -> UserResult<Option<User>>;

    async fn create(&self, user: User) -> UserResult<User>;

    /// Overwrite every stored field of an existing user
    async fn update(&self, user: User) -> UserResult<User>;

    /// Newest first
    async fn list(&self, filter: UserFilter) -> UserResult<Vec<User>>;
}

/// In-memory implementation of UserRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn get_by_id(&self, id: Uuid) -> UserResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }

    async fn find_by_google_id(&self, google_id: &str) -> UserResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.google_id == google_id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let email = email.to_lowercase();
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn create(&self, user: User) -> UserResult<User> {
        let mut users = self.users.write().await;

        let duplicate = users
            .values()
            .any(|u| u.google_id == user.google_id || u.email == user.email);
        if duplicate {
            return Err(UserError::Validation(format!(
                "User with email '{}' already exists",
                user.email
            )));
        }

        users.insert(user.id, user.clone());
        tracing::info!(user_id = %user.id, email = %user.email, "Created user");
        Ok(user)
    }

    async fn update(&self, user: User) -> UserResult<User> {
        let mut users = self.users.write().await;

        if !users.contains_key(&user.id) {
            return Err(UserError::NotFound(user.id));
        }

        users.insert(user.id, user.clone());
        tracing::debug!(user_id = %user.id, "Updated user");
        Ok(user)
    }

    async fn list(&self, filter: UserFilter) -> UserResult<Vec<User>> {
        let users = self.users.read().await;

        let mut result: Vec<User> = users.values().filter(|u| filter.matches(u)).cloned().collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(result
            .into_iter()
            .skip(filter.offset as usize)
            .take(filter.limit as usize)
            .collect())
    }
}
