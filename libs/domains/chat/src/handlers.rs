use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use axum_helpers::{AdminUser, AppError, CurrentUser, ErrorResponse, ValidatedJson};
use std::sync::Arc;
use utoipa::OpenApi;
use uuid::Uuid;

use crate::models::{
    ArchiveResponse, AssistantReply, Conversation, ConversationDetail, ConversationDetailResponse,
    ConversationFilter, ConversationListResponse, ConversationSummary, Message, MessageFilter,
    MessagePreview, MessageRole, PermissionsRequired, SendMessageRequest, SendMessageResponse,
};
use crate::repository::ChatRepository;
use crate::service::ChatService;

pub const TAG: &str = "chat";
pub const ADMIN_TAG: &str = "admin";

#[derive(OpenApi)]
#[openapi(
    paths(
        send_message,
        list_conversations,
        get_conversation,
        archive_conversation,
        admin_list_conversations,
        admin_list_messages
    ),
    components(schemas(
        SendMessageRequest,
        SendMessageResponse,
        PermissionsRequired,
        AssistantReply,
        Conversation,
        ConversationSummary,
        ConversationDetail,
        ConversationDetailResponse,
        ConversationListResponse,
        ArchiveResponse,
        Message,
        MessageRole,
        MessagePreview,
        ErrorResponse
    )),
    tags((name = TAG, description = "Conversations with the assistant"))
)]
pub struct ApiDoc;

/// `/chat/...` routes for the signed-in user
pub fn router<R: ChatRepository + 'static>(service: ChatService<R>) -> Router {
    Router::new()
        .route("/chat/send", post(send_message::<R>))
        .route("/chat/conversations", get(list_conversations::<R>))
        .route(
            "/chat/conversations/{id}",
            get(get_conversation::<R>).delete(archive_conversation::<R>),
        )
        .with_state(Arc::new(service))
}

/// `/admin/...` chat inspection routes
pub fn admin_router<R: ChatRepository + 'static>(service: ChatService<R>) -> Router {
    Router::new()
        .route("/admin/conversations", get(admin_list_conversations::<R>))
        .route("/admin/messages", get(admin_list_messages::<R>))
        .with_state(Arc::new(service))
}

/// Send a message
#[utoipa::path(
    post,
    path = "/api/chat/send",
    tag = TAG,
    request_body = SendMessageRequest,
    responses(
        (status = 200, description = "Assistant reply, or the permissions the message needs", body = SendMessageResponse),
        (status = 400, description = "Empty or overlong message", body = ErrorResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse)
    )
)]
async fn send_message<R: ChatRepository>(
    State(service): State<Arc<ChatService<R>>>,
    current: CurrentUser,
    ValidatedJson(request): ValidatedJson<SendMessageRequest>,
) -> Result<Json<SendMessageResponse>, AppError> {
    let response = service.send_message(current.id()?, request).await?;
    Ok(Json(response))
}

/// List active conversations
#[utoipa::path(
    get,
    path = "/api/chat/conversations",
    tag = TAG,
    responses(
        (status = 200, description = "Active conversations, most recent first", body = ConversationListResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse)
    )
)]
async fn list_conversations<R: ChatRepository>(
    State(service): State<Arc<ChatService<R>>>,
    current: CurrentUser,
) -> Result<Json<ConversationListResponse>, AppError> {
    let conversations = service.list_conversations(current.id()?).await?;
    Ok(Json(ConversationListResponse {
        success: true,
        conversations,
    }))
}

/// Get a conversation with its messages
#[utoipa::path(
    get,
    path = "/api/chat/conversations/{id}",
    tag = TAG,
    params(("id" = Uuid, Path, description = "Conversation id")),
    responses(
        (status = 200, description = "Conversation and ordered messages", body = ConversationDetailResponse),
        (status = 404, description = "Conversation not found", body = ErrorResponse)
    )
)]
async fn get_conversation<R: ChatRepository>(
    State(service): State<Arc<ChatService<R>>>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ConversationDetailResponse>, AppError> {
    let detail = service.get_conversation(current.id()?, id).await?;
    Ok(Json(ConversationDetailResponse {
        success: true,
        detail,
    }))
}

/// Archive a conversation
#[utoipa::path(
    delete,
    path = "/api/chat/conversations/{id}",
    tag = TAG,
    params(("id" = Uuid, Path, description = "Conversation id")),
    responses(
        (status = 200, description = "Conversation archived", body = ArchiveResponse),
        (status = 404, description = "Conversation not found", body = ErrorResponse)
    )
)]
async fn archive_conversation<R: ChatRepository>(
    State(service): State<Arc<ChatService<R>>>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ArchiveResponse>, AppError> {
    service.archive_conversation(current.id()?, id).await?;
    Ok(Json(ArchiveResponse { success: true }))
}

/// List conversations of all users
#[utoipa::path(
    get,
    path = "/api/admin/conversations",
    tag = ADMIN_TAG,
    params(ConversationFilter),
    responses(
        (status = 200, description = "Conversations, most recent first", body = Vec<ConversationSummary>),
        (status = 403, description = "Admin role required", body = ErrorResponse)
    )
)]
async fn admin_list_conversations<R: ChatRepository>(
    State(service): State<Arc<ChatService<R>>>,
    _admin: AdminUser,
    Query(filter): Query<ConversationFilter>,
) -> Result<Json<Vec<ConversationSummary>>, AppError> {
    Ok(Json(service.list_conversations_admin(filter).await?))
}

/// List messages of all conversations
#[utoipa::path(
    get,
    path = "/api/admin/messages",
    tag = ADMIN_TAG,
    params(MessageFilter),
    responses(
        (status = 200, description = "Message previews, newest first", body = Vec<MessagePreview>),
        (status = 403, description = "Admin role required", body = ErrorResponse)
    )
)]
async fn admin_list_messages<R: ChatRepository>(
    State(service): State<Arc<ChatService<R>>>,
    _admin: AdminUser,
    Query(filter): Query<MessageFilter>,
) -> Result<Json<Vec<MessagePreview>>, AppError> {
    Ok(Json(service.list_messages_admin(filter).await?))
}
