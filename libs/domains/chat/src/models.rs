use chrono::{DateTime, Utc};
use domain_service_detector::{GoogleService, ServiceFlags};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumString};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

pub const DEFAULT_TITLE: &str = "New Conversation";

/// Characters of the first message used as a conversation title
pub const TITLE_MAX_CHARS: usize = 50;

/// Characters of content shown in admin message listings
pub const PREVIEW_CHARS: usize = 50;

pub const MAX_MESSAGE_CHARS: u64 = 4000;

fn default_limit() -> u64 {
    50
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

/// Title for a conversation opened by `message`
pub fn title_from_message(message: &str) -> String {
    let title = truncate_chars(message.trim(), TITLE_MAX_CHARS);
    if title.is_empty() {
        DEFAULT_TITLE.to_string()
    } else {
        title
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
    System,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Conversation {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    pub fn new(user_id: Uuid, title: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            user_id,
            title,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_open_for(&self, user_id: Uuid) -> bool {
        self.user_id == user_id && self.is_active
    }
}

/// Conversation as listed, with its message count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ConversationSummary {
    #[serde(flatten)]
    pub conversation: Conversation,
    pub message_count: u64,
}

/// One entry in a conversation's append-only log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Message {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub role: MessageRole,
    pub content: String,
    pub detected_services: Option<ServiceFlags>,
    pub response_metadata: Option<Value>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewMessage {
    pub conversation_id: Uuid,
    pub role: MessageRole,
    pub content: String,
    pub detected_services: Option<ServiceFlags>,
    pub response_metadata: Option<Value>,
}

impl NewMessage {
    pub fn from_user(conversation_id: Uuid, content: String, detected: ServiceFlags) -> Self {
        Self {
            conversation_id,
            role: MessageRole::User,
            content,
            detected_services: Some(detected),
            response_metadata: None,
        }
    }

    pub fn from_assistant(conversation_id: Uuid, content: String, metadata: Value) -> Self {
        Self {
            conversation_id,
            role: MessageRole::Assistant,
            content,
            detected_services: None,
            response_metadata: Some(metadata),
        }
    }

    pub fn into_message(self, id: Uuid, created_at: DateTime<Utc>) -> Message {
        Message {
            id,
            conversation_id: self.conversation_id,
            role: self.role,
            content: self.content,
            detected_services: self.detected_services,
            response_metadata: self.response_metadata,
            created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ConversationDetail {
    pub conversation: Conversation,
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ConversationListResponse {
    pub success: bool,
    pub conversations: Vec<ConversationSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ConversationDetailResponse {
    pub success: bool,
    #[serde(flatten)]
    pub detail: ConversationDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ArchiveResponse {
    pub success: bool,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, Validate)]
pub struct SendMessageRequest {
    #[serde(default)]
    #[validate(length(max = MAX_MESSAGE_CHARS))]
    pub message: String,
    /// Continue this conversation when it is still open
    #[serde(default)]
    pub conversation_id: Option<Uuid>,
}

/// The message needs services the user has not granted yet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PermissionsRequired {
    pub success: bool,
    pub conversation_id: Uuid,
    pub message_id: Uuid,
    pub requires_permissions: bool,
    pub missing_permissions: Vec<GoogleService>,
    pub detected_services: ServiceFlags,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AssistantReply {
    pub success: bool,
    pub conversation_id: Uuid,
    pub user_message: Message,
    pub assistant_message: Message,
    pub detected_services: ServiceFlags,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum SendMessageResponse {
    PermissionsRequired(PermissionsRequired),
    Reply(AssistantReply),
}

/// Admin filter for conversations
#[derive(Debug, Clone, Deserialize, ToSchema, IntoParams)]
pub struct ConversationFilter {
    /// Case-insensitive substring of the title
    pub search: Option<String>,
    pub user_id: Option<Uuid>,
    pub active: Option<bool>,
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

impl Default for ConversationFilter {
    fn default() -> Self {
        Self {
            search: None,
            user_id: None,
            active: None,
            limit: default_limit(),
            offset: 0,
        }
    }
}

impl ConversationFilter {
    pub fn matches(&self, conversation: &Conversation) -> bool {
        let search_ok = self.search.as_deref().is_none_or(|s| {
            conversation
                .title
                .to_lowercase()
                .contains(&s.to_lowercase())
        });
        search_ok
            && self.user_id.is_none_or(|id| conversation.user_id == id)
            && self.active.is_none_or(|a| conversation.is_active == a)
    }
}

/// Admin filter for messages
#[derive(Debug, Clone, Deserialize, ToSchema, IntoParams)]
pub struct MessageFilter {
    pub role: Option<MessageRole>,
    /// Case-insensitive substring of the content
    pub search: Option<String>,
    pub conversation_id: Option<Uuid>,
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

impl Default for MessageFilter {
    fn default() -> Self {
        Self {
            role: None,
            search: None,
            conversation_id: None,
            limit: default_limit(),
            offset: 0,
        }
    }
}

impl MessageFilter {
    pub fn matches(&self, message: &Message) -> bool {
        self.role.is_none_or(|r| message.role == r)
            && self.conversation_id.is_none_or(|id| message.conversation_id == id)
            && self.search.as_deref().is_none_or(|s| {
                message.content.to_lowercase().contains(&s.to_lowercase())
            })
    }
}

/// Message as listed in the admin API
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessagePreview {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub role: MessageRole,
    pub content_preview: String,
    pub detected_services: Option<ServiceFlags>,
    pub created_at: DateTime<Utc>,
}

impl From<Message> for MessagePreview {
    fn from(message: Message) -> Self {
        Self {
            id: message.id,
            conversation_id: message.conversation_id,
            role: message.role,
            content_preview: truncate_chars(&message.content, PREVIEW_CHARS),
            detected_services: message.detected_services,
            created_at: message.created_at,
        }
    }
}
