use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(pk_uuid(Users::Id))
                    .col(string_uniq(Users::GoogleId))
                    .col(string_uniq(Users::Email))
                    .col(string(Users::Username))
                    .col(string_null(Users::DisplayName))
                    .col(text_null(Users::ProfilePicture))
                    .col(text_null(Users::AccessToken))
                    .col(text_null(Users::RefreshToken))
                    .col(timestamp_with_time_zone_null(Users::TokenExpiresAt))
                    .col(boolean(Users::GmailPermission).default(false))
                    .col(boolean(Users::CalendarPermission).default(false))
                    .col(boolean(Users::TasksPermission).default(false))
                    .col(boolean(Users::KeepPermission).default(false))
                    .col(json_binary(Users::GrantedScopes).default(Expr::cust("'[]'::jsonb")))
                    .col(boolean(Users::IsStaff).default(false))
                    .col(
                        timestamp_with_time_zone(Users::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Users::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(timestamp_with_time_zone_null(Users::LastLoginAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_users_created_at")
                    .table(Users::Table)
                    .col(Users::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    GoogleId,
    Email,
    Username,
    DisplayName,
    ProfilePicture,
    AccessToken,
    RefreshToken,
    TokenExpiresAt,
    GmailPermission,
    CalendarPermission,
    TasksPermission,
    KeepPermission,
    GrantedScopes,
    IsStaff,
    CreatedAt,
    UpdatedAt,
    LastLoginAt,
}
