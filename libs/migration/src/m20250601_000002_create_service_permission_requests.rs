use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ServicePermissionRequests::Table)
                    .if_not_exists()
                    .col(pk_uuid(ServicePermissionRequests::Id))
                    .col(uuid(ServicePermissionRequests::UserId))
                    .col(string_len(ServicePermissionRequests::Service, 32))
                    .col(
                        json_binary(ServicePermissionRequests::RequestedScopes)
                            .default(Expr::cust("'[]'::jsonb")),
                    )
                    .col(
                        timestamp_with_time_zone(ServicePermissionRequests::RequestedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(timestamp_with_time_zone_null(
                        ServicePermissionRequests::GrantedAt,
                    ))
                    .col(boolean(ServicePermissionRequests::IsGranted).default(false))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_service_permission_requests_user_id")
                            .from(
                                ServicePermissionRequests::Table,
                                ServicePermissionRequests::UserId,
                            )
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One audit row per (user, service); upserts target this index
        manager
            .create_index(
                Index::create()
                    .name("idx_service_permission_requests_user_service")
                    .table(ServicePermissionRequests::Table)
                    .col(ServicePermissionRequests::UserId)
                    .col(ServicePermissionRequests::Service)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(ServicePermissionRequests::Table)
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
enum ServicePermissionRequests {
    Table,
    Id,
    UserId,
    Service,
    RequestedScopes,
    RequestedAt,
    GrantedAt,
    IsGranted,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}
