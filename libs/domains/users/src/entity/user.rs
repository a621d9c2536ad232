use crate::models::User;
use chrono::Utc;
use domain_service_detector::ServiceFlags;
use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub google_id: String,
    #[sea_orm(unique)]
    pub email: String,
    pub username: String,
    pub display_name: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub profile_picture: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub access_token: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub refresh_token: Option<String>,
    pub token_expires_at: Option<DateTimeWithTimeZone>,
    pub gmail_permission: bool,
    pub calendar_permission: bool,
    pub tasks_permission: bool,
    pub keep_permission: bool,
    #[sea_orm(column_type = "JsonBinary")]
    pub granted_scopes: Json,
    pub is_staff: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub last_login_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for User {
    fn from(model: Model) -> Self {
        let granted_scopes: Vec<String> =
            serde_json::from_value(model.granted_scopes).unwrap_or_default();

        Self {
            id: model.id,
            google_id: model.google_id,
            email: model.email,
            username: model.username,
            display_name: model.display_name,
            profile_picture: model.profile_picture,
            access_token: model.access_token,
            refresh_token: model.refresh_token,
            token_expires_at: model.token_expires_at.map(Into::into),
            permissions: ServiceFlags {
                email: model.gmail_permission,
                calendar: model.calendar_permission,
                tasks: model.tasks_permission,
                keep: model.keep_permission,
            },
            granted_scopes,
            is_staff: model.is_staff,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
            last_login_at: model.last_login_at.map(Into::into),
        }
    }
}

/// Every column set; `updated_at` is stamped with the current time.
impl From<&User> for ActiveModel {
    fn from(user: &User) -> Self {
        ActiveModel {
            id: Set(user.id),
            google_id: Set(user.google_id.clone()),
            email: Set(user.email.clone()),
            username: Set(user.username.clone()),
            display_name: Set(user.display_name.clone()),
            profile_picture: Set(user.profile_picture.clone()),
            access_token: Set(user.access_token.clone()),
            refresh_token: Set(user.refresh_token.clone()),
            token_expires_at: Set(user.token_expires_at.map(Into::into)),
            gmail_permission: Set(user.permissions.email),
            calendar_permission: Set(user.permissions.calendar),
            tasks_permission: Set(user.permissions.tasks),
            keep_permission: Set(user.permissions.keep),
            granted_scopes: Set(serde_json::json!(user.granted_scopes)),
            is_staff: Set(user.is_staff),
            created_at: Set(user.created_at.into()),
            updated_at: Set(Utc::now().into()),
            last_login_at: Set(user.last_login_at.map(Into::into)),
        }
    }
}
