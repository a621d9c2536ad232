use crate::models::{Message, MessageRole};
use sea_orm::entity::prelude::*;
use std::str::FromStr;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "chat_messages")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub role: String,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub detected_services: Option<Json>,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub response_metadata: Option<Json>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::conversation::Entity",
        from = "Column::ConversationId",
        to = "super::conversation::Column::Id",
        on_delete = "Cascade"
    )]
    Conversation,
}

impl Related<super::conversation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Conversation.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Message {
    type Error = DbErr;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let role = MessageRole::from_str(&model.role)
            .map_err(|_| DbErr::Type(format!("unknown message role '{}'", model.role)))?;

        Ok(Self {
            id: model.id,
            conversation_id: model.conversation_id,
            role,
            content: model.content,
            detected_services: model
                .detected_services
                .and_then(|v| serde_json::from_value(v).ok()),
            response_metadata: model.response_metadata,
            created_at: model.created_at.into(),
        })
    }
}
