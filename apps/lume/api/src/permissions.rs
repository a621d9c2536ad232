use async_trait::async_trait;
use domain_chat::{ChatError, ChatResult, PermissionLookup};
use domain_service_detector::ServiceFlags;
use domain_users::{UserRepository, UserService};
use uuid::Uuid;

/// Chat's view of the permission flags stored on users
pub struct UserPermissions<R: UserRepository> {
    users: UserService<R>,
}

impl<R: UserRepository> UserPermissions<R> {
    pub fn new(users: UserService<R>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl<R: UserRepository + 'static> PermissionLookup for UserPermissions<R> {
    async fn permissions(&self, user_id: Uuid) -> ChatResult<ServiceFlags> {
        match self.users.find_user(user_id).await {
            Ok(Some(user)) => Ok(user.permissions()),
            Ok(None) => Err(ChatError::UserNotFound),
            Err(e) => Err(ChatError::Internal(e.to_string())),
        }
    }
}
