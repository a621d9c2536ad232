use crate::oauth::types::{NewOAuthState, OAuthStage, OAuthState};
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::entity::prelude::*;
use std::str::FromStr;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "oauth_states")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub state: String,
    pub user_id: Option<Uuid>,
    pub stage: String,
    #[sea_orm(column_type = "JsonBinary")]
    pub requested_services: Json,
    #[sea_orm(column_type = "Text")]
    pub pkce_verifier: String,
    pub created_at: DateTimeWithTimeZone,
    pub expires_at: DateTimeWithTimeZone,
    pub used: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for OAuthState {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            state: model.state,
            user_id: model.user_id,
            // Unknown stages never satisfy a stage check
            stage: OAuthStage::from_str(&model.stage).unwrap_or(OAuthStage::ServicePermissions),
            requested_services: serde_json::from_value(model.requested_services)
                .unwrap_or_default(),
            pkce_verifier: model.pkce_verifier,
            created_at: model.created_at.into(),
            expires_at: model.expires_at.into(),
            used: model.used,
        }
    }
}

impl From<&NewOAuthState> for ActiveModel {
    fn from(input: &NewOAuthState) -> Self {
        ActiveModel {
            id: Set(Uuid::now_v7()),
            state: Set(input.state.clone()),
            user_id: Set(input.user_id),
            stage: Set(input.stage.to_string()),
            requested_services: Set(serde_json::json!(input.requested_services)),
            pkce_verifier: Set(input.pkce_verifier.clone()),
            created_at: Set(input.created_at.into()),
            expires_at: Set(input.expires_at.into()),
            used: NotSet,
        }
    }
}
