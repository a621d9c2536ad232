use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::sea_query::{Expr, Func, LikeExpr, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ExprTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use std::collections::HashMap;
use uuid::Uuid;

use crate::entity::{conversation, message};
use crate::error::{ChatError, ChatResult};
use crate::models::{
    Conversation, ConversationFilter, ConversationSummary, Message, MessageFilter, NewMessage,
};
use crate::repository::ChatRepository;

const LIKE_ESCAPE: char = '\\';

/// `%term%` with the term's own wildcards taken literally
fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.to_lowercase().chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            pattern.push(LIKE_ESCAPE);
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn lower_like<C: ColumnTrait + 'static>(column: C, term: &str) -> SimpleExpr {
    Expr::expr(Func::lower(Expr::col(column)))
        .like(LikeExpr::new(contains_pattern(term)).escape(LIKE_ESCAPE))
}

#[derive(Clone)]
pub struct PgChatRepository {
    db: DatabaseConnection,
}

impl PgChatRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn with_counts(
        &self,
        models: Vec<conversation::Model>,
    ) -> ChatResult<Vec<ConversationSummary>> {
        let ids: Vec<Uuid> = models.iter().map(|m| m.id).collect();
        let counts: HashMap<Uuid, i64> = message::Entity::find()
            .select_only()
            .column(message::Column::ConversationId)
            .column_as(message::Column::Id.count(), "message_count")
            .filter(message::Column::ConversationId.is_in(ids))
            .group_by(message::Column::ConversationId)
            .into_tuple::<(Uuid, i64)>()
            .all(&self.db)
            .await?
            .into_iter()
            .collect();

        Ok(models
            .into_iter()
            .map(|model| ConversationSummary {
                message_count: counts.get(&model.id).copied().unwrap_or(0) as u64,
                conversation: model.into(),
            })
            .collect())
    }
}

#[async_trait]
impl ChatRepository for PgChatRepository {
    async fn create_conversation(&self, input: Conversation) -> ChatResult<Conversation> {
        let active_model: conversation::ActiveModel = (&input).into();
        let model = active_model.insert(&self.db).await?;

        tracing::debug!(conversation_id = %model.id, user_id = %model.user_id, "Created conversation");
        Ok(model.into())
    }

    async fn get_conversation(&self, id: Uuid) -> ChatResult<Option<Conversation>> {
        let model = conversation::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(Into::into))
    }

    async fn touch_conversation(&self, id: Uuid, at: DateTime<Utc>) -> ChatResult<()> {
        let result = conversation::Entity::update_many()
            .col_expr(conversation::Column::UpdatedAt, Expr::value(at))
            .filter(conversation::Column::Id.eq(id))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(ChatError::ConversationNotFound(id));
        }
        Ok(())
    }

    async fn archive_conversation(&self, user_id: Uuid, id: Uuid) -> ChatResult<bool> {
        let result = conversation::Entity::update_many()
            .col_expr(conversation::Column::IsActive, Expr::value(false))
            .col_expr(conversation::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(conversation::Column::Id.eq(id))
            .filter(conversation::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }

    async fn add_message(&self, input: NewMessage) -> ChatResult<Message> {
        let detected = input
            .detected_services
            .map(serde_json::to_value)
            .transpose()
            .map_err(|e| ChatError::Internal(e.to_string()))?;

        let active_model = message::ActiveModel {
            id: Set(Uuid::now_v7()),
            conversation_id: Set(input.conversation_id),
            role: Set(input.role.to_string()),
            content: Set(input.content),
            detected_services: Set(detected),
            response_metadata: Set(input.response_metadata),
            created_at: Set(Utc::now().into()),
        };
        let model = active_model.insert(&self.db).await?;
        Message::try_from(model).map_err(ChatError::from)
    }

    async fn list_messages(&self, conversation_id: Uuid) -> ChatResult<Vec<Message>> {
        let models = message::Entity::find()
            .filter(message::Column::ConversationId.eq(conversation_id))
            .order_by_asc(message::Column::CreatedAt)
            .order_by_asc(message::Column::Id)
            .all(&self.db)
            .await?;

        models
            .into_iter()
            .map(|m| Message::try_from(m).map_err(ChatError::from))
            .collect()
    }

    async fn list_user_conversations(
        &self,
        user_id: Uuid,
    ) -> ChatResult<Vec<ConversationSummary>> {
        let models = conversation::Entity::find()
            .filter(conversation::Column::UserId.eq(user_id))
            .filter(conversation::Column::IsActive.eq(true))
            .order_by_desc(conversation::Column::UpdatedAt)
            .all(&self.db)
            .await?;

        self.with_counts(models).await
    }

    async fn list_conversations(
        &self,
        filter: ConversationFilter,
    ) -> ChatResult<Vec<ConversationSummary>> {
        let mut query = conversation::Entity::find();

        if let Some(search) = filter.search.as_deref() {
            query = query.filter(lower_like(conversation::Column::Title, search));
        }
        if let Some(user_id) = filter.user_id {
            query = query.filter(conversation::Column::UserId.eq(user_id));
        }
        if let Some(active) = filter.active {
            query = query.filter(conversation::Column::IsActive.eq(active));
        }

        let models = query
            .order_by_desc(conversation::Column::UpdatedAt)
            .limit(filter.limit)
            .offset(filter.offset)
            .all(&self.db)
            .await?;

        self.with_counts(models).await
    }

    async fn search_messages(&self, filter: MessageFilter) -> ChatResult<Vec<Message>> {
        let mut query = message::Entity::find();

        if let Some(role) = filter.role {
            query = query.filter(message::Column::Role.eq(role.to_string()));
        }
        if let Some(conversation_id) = filter.conversation_id {
            query = query.filter(message::Column::ConversationId.eq(conversation_id));
        }
        if let Some(search) = filter.search.as_deref() {
            query = query.filter(lower_like(message::Column::Content, search));
        }

        let models = query
            .order_by_desc(message::Column::CreatedAt)
            .order_by_desc(message::Column::Id)
            .limit(filter.limit)
            .offset(filter.offset)
            .all(&self.db)
            .await?;

        models
            .into_iter()
            .map(|m| Message::try_from(m).map_err(ChatError::from))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DbBackend, QueryTrait};

    #[test]
    fn test_contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("Budget"), "%budget%");
        assert_eq!(contains_pattern("%"), "%\\%%");
        assert_eq!(contains_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(contains_pattern("a\\b"), "%a\\\\b%");
    }

    #[test]
    fn test_search_filter_declares_escape() {
        let sql = conversation::Entity::find()
            .filter(lower_like(conversation::Column::Title, "%"))
            .build(DbBackend::Postgres)
            .to_string();
        assert!(sql.contains("LIKE"));
        assert!(sql.contains("ESCAPE"));
    }
}
