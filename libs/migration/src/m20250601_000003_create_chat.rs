use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ChatConversations::Table)
                    .if_not_exists()
                    .col(pk_uuid(ChatConversations::Id))
                    .col(uuid(ChatConversations::UserId))
                    .col(string(ChatConversations::Title).default("New Conversation"))
                    .col(boolean(ChatConversations::IsActive).default(true))
                    .col(
                        timestamp_with_time_zone(ChatConversations::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(ChatConversations::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_chat_conversations_user_id")
                            .from(ChatConversations::Table, ChatConversations::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_chat_conversations_user_updated")
                    .table(ChatConversations::Table)
                    .col(ChatConversations::UserId)
                    .col(ChatConversations::UpdatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ChatMessages::Table)
                    .if_not_exists()
                    .col(pk_uuid(ChatMessages::Id))
                    .col(uuid(ChatMessages::ConversationId))
                    .col(string_len(ChatMessages::Role, 16))
                    .col(text(ChatMessages::Content))
                    .col(json_binary_null(ChatMessages::DetectedServices))
                    .col(json_binary_null(ChatMessages::ResponseMetadata))
                    .col(
                        timestamp_with_time_zone(ChatMessages::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_chat_messages_conversation_id")
                            .from(ChatMessages::Table, ChatMessages::ConversationId)
                            .to(ChatConversations::Table, ChatConversations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_chat_messages_conversation_created")
                    .table(ChatMessages::Table)
                    .col(ChatMessages::ConversationId)
                    .col(ChatMessages::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ChatMessages::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ChatConversations::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ChatConversations {
    Table,
    Id,
    UserId,
    Title,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ChatMessages {
    Table,
    Id,
    ConversationId,
    Role,
    Content,
    DetectedServices,
    ResponseMetadata,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}
