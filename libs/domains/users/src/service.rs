use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::error::{UserError, UserResult};
use crate::models::{User, UserFilter, UserResponse};
use crate::repository::UserRepository;

/// Read side of the user store for session lookups and the admin API
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
}

impl<R: UserRepository> Clone for UserService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Get a user by ID
    #[instrument(skip(self), fields(user_id = %id))]
    pub async fn get_user(&self, id: Uuid) -> UserResult<User> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id))
    }

    /// Session lookup; a deleted account yields `None`
    pub async fn find_user(&self, id: Uuid) -> UserResult<Option<User>> {
        self.repository.get_by_id(id).await
    }

    /// List users with filters
    pub async fn list_users(&self, filter: UserFilter) -> UserResult<Vec<UserResponse>> {
        let users = self.repository.list(filter).await?;
        Ok(users.into_iter().map(UserResponse::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockUserRepository;

    #[tokio::test]
    async fn test_get_user_not_found() {
        let mut repo = MockUserRepository::new();
        repo.expect_get_by_id().returning(|_| Ok(None));
        let service = UserService::new(repo);

        let id = Uuid::now_v7();
        let result = service.get_user(id).await;
        assert!(matches!(result, Err(UserError::NotFound(missing)) if missing == id));
    }

    #[tokio::test]
    async fn test_list_users_hides_tokens() {
        let mut repo = MockUserRepository::new();
        repo.expect_list().returning(|_| {
            let mut user = User::new("g-1", "ada@example.com");
            user.refresh_token = Some("secret".into());
            Ok(vec![user])
        });
        let service = UserService::new(repo);

        let users = service.list_users(UserFilter::default()).await.unwrap();
        assert_eq!(users.len(), 1);
        assert!(users[0].has_refresh_token);

        let json = serde_json::to_string(&users).unwrap();
        assert!(!json.contains("secret"));
    }
}
