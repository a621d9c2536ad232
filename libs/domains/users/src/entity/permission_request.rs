use crate::oauth::permission_requests::PermissionRequest;
use domain_service_detector::GoogleService;
use sea_orm::entity::prelude::*;
use std::str::FromStr;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "service_permission_requests")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub service: String,
    #[sea_orm(column_type = "JsonBinary")]
    pub requested_scopes: Json,
    pub requested_at: DateTimeWithTimeZone,
    pub granted_at: Option<DateTimeWithTimeZone>,
    pub is_granted: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for PermissionRequest {
    type Error = DbErr;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let service = GoogleService::from_str(&model.service)
            .map_err(|_| DbErr::Type(format!("unknown service '{}'", model.service)))?;

        Ok(Self {
            id: model.id,
            user_id: model.user_id,
            service,
            requested_scopes: serde_json::from_value(model.requested_scopes).unwrap_or_default(),
            requested_at: model.requested_at.into(),
            granted_at: model.granted_at.map(Into::into),
            is_granted: model.is_granted,
        })
    }
}
