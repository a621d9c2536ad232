use async_trait::async_trait;
use chrono::Utc;
use domain_service_detector::{ServiceFlags, detect_services};
use serde_json::json;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::error::{ChatError, ChatResult};
use crate::models::{
    AssistantReply, Conversation, ConversationDetail, ConversationFilter, ConversationSummary,
    MessageFilter, MessagePreview, NewMessage, PermissionsRequired, SendMessageRequest,
    SendMessageResponse, title_from_message,
};
use crate::repository::ChatRepository;

pub const NO_SERVICE_REPLY: &str = "I did not detect any Google service in your message.";

/// Granted service permissions of a user, owned by the users domain
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PermissionLookup: Send + Sync {
    /// Fails with [`ChatError::UserNotFound`] for an unknown user
    async fn permissions(&self, user_id: Uuid) -> ChatResult<ServiceFlags>;
}

/// Placeholder assistant text naming the detected services
pub fn assistant_reply(detected: &ServiceFlags) -> String {
    let services = detected.services();
    if services.is_empty() {
        return NO_SERVICE_REPLY.to_string();
    }

    let names: Vec<String> = services.iter().map(ToString::to_string).collect();
    format!(
        "I detected the following services: {}. Integration with Google APIs is pending.",
        names.join(", ")
    )
}

pub struct ChatService<R: ChatRepository> {
    repository: Arc<R>,
    permissions: Arc<dyn PermissionLookup>,
}

impl<R: ChatRepository> Clone for ChatService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            permissions: Arc::clone(&self.permissions),
        }
    }
}

impl<R: ChatRepository> ChatService<R> {
    pub fn new(repository: R, permissions: Arc<dyn PermissionLookup>) -> Self {
        Self {
            repository: Arc::new(repository),
            permissions,
        }
    }

    /// Record a user message and either ask for missing permissions or reply.
    #[instrument(skip(self, request), fields(user_id = %user_id))]
    pub async fn send_message(
        &self,
        user_id: Uuid,
        request: SendMessageRequest,
    ) -> ChatResult<SendMessageResponse> {
        let content = request.message.trim();
        if content.is_empty() {
            return Err(ChatError::MessageRequired);
        }

        let granted = self.permissions.permissions(user_id).await?;
        let conversation = self
            .open_conversation(user_id, request.conversation_id, content)
            .await?;

        let detected = detect_services(content);
        let user_message = self
            .repository
            .add_message(NewMessage::from_user(
                conversation.id,
                content.to_string(),
                detected,
            ))
            .await?;
        self.repository
            .touch_conversation(conversation.id, Utc::now())
            .await?;

        let missing = detected.missing_from(&granted);
        if !missing.is_empty() {
            tracing::info!(
                conversation_id = %conversation.id,
                missing = ?missing,
                "Message needs service permissions"
            );
            return Ok(SendMessageResponse::PermissionsRequired(
                PermissionsRequired {
                    success: true,
                    conversation_id: conversation.id,
                    message_id: user_message.id,
                    requires_permissions: true,
                    missing_permissions: missing,
                    detected_services: detected,
                },
            ));
        }

        let assistant_message = self
            .repository
            .add_message(NewMessage::from_assistant(
                conversation.id,
                assistant_reply(&detected),
                json!({
                    "detected_services": detected,
                    "pending_integration": true,
                }),
            ))
            .await?;

        Ok(SendMessageResponse::Reply(AssistantReply {
            success: true,
            conversation_id: conversation.id,
            user_message,
            assistant_message,
            detected_services: detected,
        }))
    }

    /// The requested conversation when the user may still post to it, else a new one
    async fn open_conversation(
        &self,
        user_id: Uuid,
        requested: Option<Uuid>,
        first_message: &str,
    ) -> ChatResult<Conversation> {
        if let Some(id) = requested {
            match self.repository.get_conversation(id).await? {
                Some(conversation) if conversation.is_open_for(user_id) => return Ok(conversation),
                _ => tracing::debug!(conversation_id = %id, "Conversation not usable, starting a new one"),
            }
        }

        self.repository
            .create_conversation(Conversation::new(
                user_id,
                title_from_message(first_message),
            ))
            .await
    }

    #[instrument(skip(self))]
    pub async fn list_conversations(&self, user_id: Uuid) -> ChatResult<Vec<ConversationSummary>> {
        self.repository.list_user_conversations(user_id).await
    }

    #[instrument(skip(self))]
    pub async fn get_conversation(&self, user_id: Uuid, id: Uuid) -> ChatResult<ConversationDetail> {
        let conversation = self
            .repository
            .get_conversation(id)
            .await?
            .filter(|c| c.user_id == user_id)
            .ok_or(ChatError::ConversationNotFound(id))?;

        let messages = self.repository.list_messages(id).await?;
        Ok(ConversationDetail {
            conversation,
            messages,
        })
    }

    #[instrument(skip(self))]
    pub async fn archive_conversation(&self, user_id: Uuid, id: Uuid) -> ChatResult<()> {
        if self.repository.archive_conversation(user_id, id).await? {
            tracing::info!(conversation_id = %id, "Archived conversation");
            Ok(())
        } else {
            Err(ChatError::ConversationNotFound(id))
        }
    }

    pub async fn list_conversations_admin(
        &self,
        filter: ConversationFilter,
    ) -> ChatResult<Vec<ConversationSummary>> {
        self.repository.list_conversations(filter).await
    }

    pub async fn list_messages_admin(&self, filter: MessageFilter) -> ChatResult<Vec<MessagePreview>> {
        let messages = self.repository.search_messages(filter).await?;
        Ok(messages.into_iter().map(MessagePreview::from).collect())
    }
}
