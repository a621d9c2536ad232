//! Chat Domain
//!
//! Conversations between a user and the assistant. Each message is run through the
//! service detector; when it needs Google services the user has not granted, the
//! caller gets the missing permissions instead of a reply.
//!
//! Permissions live in the users domain and are read through [`PermissionLookup`].

pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

pub use error::{ChatError, ChatResult};
pub use handlers::{ApiDoc, admin_router, router};
pub use models::{
    Conversation, ConversationDetail, ConversationFilter, ConversationSummary, Message,
    MessageFilter, MessagePreview, MessageRole, SendMessageRequest, SendMessageResponse,
};
pub use postgres::PgChatRepository;
pub use repository::{ChatRepository, InMemoryChatRepository};
pub use service::{ChatService, PermissionLookup};
