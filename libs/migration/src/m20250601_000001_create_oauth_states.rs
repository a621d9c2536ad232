use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(OAuthStates::Table)
                    .if_not_exists()
                    .col(pk_uuid(OAuthStates::Id))
                    .col(string_uniq(OAuthStates::State))
                    .col(uuid_null(OAuthStates::UserId))
                    .col(string_len(OAuthStates::Stage, 32))
                    .col(json_binary(OAuthStates::RequestedServices))
                    .col(text(OAuthStates::PkceVerifier))
                    .col(
                        timestamp_with_time_zone(OAuthStates::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(timestamp_with_time_zone(OAuthStates::ExpiresAt))
                    .col(boolean(OAuthStates::Used).default(false))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_oauth_states_user_id")
                            .from(OAuthStates::Table, OAuthStates::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Purge scans by expiry
        manager
            .create_index(
                Index::create()
                    .name("idx_oauth_states_expires_at")
                    .table(OAuthStates::Table)
                    .col(OAuthStates::ExpiresAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(OAuthStates::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum OAuthStates {
    #[sea_orm(iden = "oauth_states")]
    Table,
    Id,
    State,
    UserId,
    Stage,
    RequestedServices,
    PkceVerifier,
    CreatedAt,
    ExpiresAt,
    Used,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}
