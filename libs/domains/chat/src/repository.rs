use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{ChatError, ChatResult};
use crate::models::{
    Conversation, ConversationFilter, ConversationSummary, Message, MessageFilter, NewMessage,
};

/// Persistence for conversations and their message log
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatRepository: Send + Sync {
    async fn create_conversation(&self, conversation: Conversation) -> ChatResult<Conversation>;

    async fn get_conversation(&self, id: Uuid) -> ChatResult<Option<Conversation>>;

    /// Set `updated_at`
    async fn touch_conversation(&self, id: Uuid, at: DateTime<Utc>) -> ChatResult<()>;

    /// Mark the user's conversation inactive; false when no such conversation exists
    async fn archive_conversation(&self, user_id: Uuid, id: Uuid) -> ChatResult<bool>;

    async fn add_message(&self, message: NewMessage) -> ChatResult<Message>;

    /// Ordered by `created_at`, then `id`
    async fn list_messages(&self, conversation_id: Uuid) -> ChatResult<Vec<Message>>;

    /// Active conversations of one user, most recently updated first
    async fn list_user_conversations(&self, user_id: Uuid)
    -> ChatResult<Vec<ConversationSummary>>;

    async fn list_conversations(
        &self,
        filter: ConversationFilter,
    ) -> ChatResult<Vec<ConversationSummary>>;

    /// Newest first
    async fn search_messages(&self, filter: MessageFilter) -> ChatResult<Vec<Message>>;
}

#[derive(Debug, Default)]
struct ChatStore {
    conversations: HashMap<Uuid, Conversation>,
    messages: Vec<Message>,
}

impl ChatStore {
    fn summarize(&self, conversation: &Conversation) -> ConversationSummary {
        let message_count = self
            .messages
            .iter()
            .filter(|m| m.conversation_id == conversation.id)
            .count() as u64;
        ConversationSummary {
            conversation: conversation.clone(),
            message_count,
        }
    }

    fn summaries<F>(&self, keep: F) -> Vec<ConversationSummary>
    where
        F: Fn(&Conversation) -> bool,
    {
        let mut result: Vec<ConversationSummary> = self
            .conversations
            .values()
            .filter(|c| keep(c))
            .map(|c| self.summarize(c))
            .collect();
        result.sort_by(|a, b| b.conversation.updated_at.cmp(&a.conversation.updated_at));
        result
    }
}

/// In-memory implementation of ChatRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryChatRepository {
    store: Arc<RwLock<ChatStore>>,
}

impl InMemoryChatRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ChatRepository for InMemoryChatRepository {
    async fn create_conversation(&self, conversation: Conversation) -> ChatResult<Conversation> {
        let mut store = self.store.write().await;
        store
            .conversations
            .insert(conversation.id, conversation.clone());
        Ok(conversation)
    }

    async fn get_conversation(&self, id: Uuid) -> ChatResult<Option<Conversation>> {
        let store = self.store.read().await;
        Ok(store.conversations.get(&id).cloned())
    }

    async fn touch_conversation(&self, id: Uuid, at: DateTime<Utc>) -> ChatResult<()> {
        let mut store = self.store.write().await;
        let conversation = store
            .conversations
            .get_mut(&id)
            .ok_or(ChatError::ConversationNotFound(id))?;
        conversation.updated_at = at;
        Ok(())
    }

    async fn archive_conversation(&self, user_id: Uuid, id: Uuid) -> ChatResult<bool> {
        let mut store = self.store.write().await;
        match store.conversations.get_mut(&id) {
            Some(conversation) if conversation.user_id == user_id => {
                conversation.is_active = false;
                conversation.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn add_message(&self, message: NewMessage) -> ChatResult<Message> {
        let mut store = self.store.write().await;
        if !store.conversations.contains_key(&message.conversation_id) {
            return Err(ChatError::ConversationNotFound(message.conversation_id));
        }

        let message = message.into_message(Uuid::now_v7(), Utc::now());
        store.messages.push(message.clone());
        Ok(message)
    }

    async fn list_messages(&self, conversation_id: Uuid) -> ChatResult<Vec<Message>> {
        let store = self.store.read().await;
        let mut messages: Vec<Message> = store
            .messages
            .iter()
            .filter(|m| m.conversation_id == conversation_id)
            .cloned()
            .collect();
        messages.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(messages)
    }

    async fn list_user_conversations(
        &self,
        user_id: Uuid,
    ) -> ChatResult<Vec<ConversationSummary>> {
        let store = self.store.read().await;
        Ok(store.summaries(|c| c.is_open_for(user_id)))
    }

    async fn list_conversations(
        &self,
        filter: ConversationFilter,
    ) -> ChatResult<Vec<ConversationSummary>> {
        let store = self.store.read().await;
        Ok(store
            .summaries(|c| filter.matches(c))
            .into_iter()
            .skip(filter.offset as usize)
            .take(filter.limit as usize)
            .collect())
    }

    async fn search_messages(&self, filter: MessageFilter) -> ChatResult<Vec<Message>> {
        let store = self.store.read().await;
        let mut messages: Vec<Message> = store
            .messages
            .iter()
            .filter(|m| filter.matches(m))
            .cloned()
            .collect();
        messages.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        Ok(messages
            .into_iter()
            .skip(filter.offset as usize)
            .take(filter.limit as usize)
            .collect())
    }
}
