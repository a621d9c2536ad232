pub use sea_orm_migration::prelude::*;

mod m20250601_000000_create_users;
mod m20250601_000001_create_oauth_states;
mod m20250601_000002_create_service_permission_requests;
mod m20250601_000003_create_chat;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250601_000000_create_users::Migration),
            Box::new(m20250601_000001_create_oauth_states::Migration),
            Box::new(m20250601_000002_create_service_permission_requests::Migration),
            Box::new(m20250601_000003_create_chat::Migration),
        ]
    }
}
