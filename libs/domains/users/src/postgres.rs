use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain_service_detector::GoogleService;
use sea_orm::ActiveValue::Set;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, SqlErr,
};
use uuid::Uuid;

use crate::entity::{oauth_state, permission_request, user};
use crate::error::{UserError, UserResult};
use crate::models::{User, UserFilter};
use crate::oauth::permission_requests::{
    PermissionRequest, PermissionRequestFilter, PermissionRequestRepository,
};
use crate::oauth::scopes::service_scopes;
use crate::oauth::state_store::OAuthStateRepository;
use crate::oauth::types::{NewOAuthState, OAuthStage, OAuthState, OAuthStateFilter};
use crate::repository::UserRepository;

fn permission_column(service: GoogleService) -> user::Column {
    match service {
        GoogleService::Email => user::Column::GmailPermission,
        GoogleService::Calendar => user::Column::CalendarPermission,
        GoogleService::Tasks => user::Column::TasksPermission,
        GoogleService::Keep => user::Column::KeepPermission,
    }
}

fn map_unique_violation(err: DbErr, email: &str) -> UserError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            UserError::Validation(format!("User with email '{}' already exists", email))
        }
        _ => UserError::Database(err),
    }
}

#[derive(Clone)]
pub struct PgUserRepository {
    db: DatabaseConnection,
}

impl PgUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn get_by_id(&self, id: Uuid) -> UserResult<Option<User>> {
        let model = user::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(Into::into))
    }

    async fn find_by_google_id(&self, google_id: &str) -> UserResult<Option<User>> {
        let model = user::Entity::find()
            .filter(user::Column::GoogleId.eq(google_id))
            .one(&self.db)
            .await?;
        Ok(model.map(Into::into))
    }

    async fn find_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let model = user::Entity::find()
            .filter(user::Column::Email.eq(email.to_lowercase()))
            .one(&self.db)
            .await?;
        Ok(model.map(Into::into))
    }

    async fn create(&self, input: User) -> UserResult<User> {
        let active_model: user::ActiveModel = (&input).into();
        let model = active_model
            .insert(&self.db)
            .await
            .map_err(|e| map_unique_violation(e, &input.email))?;

        tracing::info!(user_id = %model.id, email = %model.email, "Created user");
        Ok(model.into())
    }

    async fn update(&self, input: User) -> UserResult<User> {
        let active_model: user::ActiveModel = (&input).into();
        let model = active_model.update(&self.db).await.map_err(|e| match e {
            DbErr::RecordNotUpdated => UserError::NotFound(input.id),
            other => map_unique_violation(other, &input.email),
        })?;

        tracing::debug!(user_id = %model.id, "Updated user");
        Ok(model.into())
    }

    async fn list(&self, filter: UserFilter) -> UserResult<Vec<User>> {
        let mut query = user::Entity::find();

        if let Some(search) = filter.search.as_deref() {
            let term = search.to_lowercase();
            query = query.filter(
                Condition::any()
                    .add(user::Column::Email.contains(&term))
                    .add(user::Column::Username.contains(&term))
                    .add(user::Column::DisplayName.contains(search)),
            );
        }

        if let Some(service) = filter.service {
            query = query.filter(permission_column(service).eq(true));
        }

        let models = query
            .order_by_desc(user::Column::CreatedAt)
            .limit(filter.limit)
            .offset(filter.offset)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }
}

#[derive(Clone)]
pub struct PgOAuthStateRepository {
    db: DatabaseConnection,
}

impl PgOAuthStateRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl OAuthStateRepository for PgOAuthStateRepository {
    async fn create(&self, input: NewOAuthState) -> UserResult<OAuthState> {
        let active_model: oauth_state::ActiveModel = (&input).into();
        let model = active_model.insert(&self.db).await?;
        Ok(model.into())
    }

    async fn consume(&self, state: &str, now: DateTime<Utc>) -> UserResult<Option<OAuthState>> {
        // Single conditional UPDATE so concurrent callbacks cannot both win
        let mut updated = oauth_state::Entity::update_many()
            .col_expr(oauth_state::Column::Used, Expr::value(true))
            .filter(oauth_state::Column::State.eq(state))
            .filter(oauth_state::Column::Used.eq(false))
            .filter(oauth_state::Column::ExpiresAt.gt(now))
            .exec_with_returning(&self.db)
            .await?;

        Ok(updated.pop().map(Into::into))
    }

    async fn attach_user(&self, id: Uuid, user_id: Uuid) -> UserResult<()> {
        oauth_state::Entity::update_many()
            .col_expr(oauth_state::Column::UserId, Expr::value(user_id))
            .filter(oauth_state::Column::Id.eq(id))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    async fn find_completed(
        &self,
        state: &str,
        now: DateTime<Utc>,
    ) -> UserResult<Option<OAuthState>> {
        let model = oauth_state::Entity::find()
            .filter(oauth_state::Column::State.eq(state))
            .filter(oauth_state::Column::Used.eq(true))
            .filter(oauth_state::Column::ExpiresAt.gt(now))
            .filter(oauth_state::Column::UserId.is_not_null())
            .filter(oauth_state::Column::Stage.eq(OAuthStage::BasePermissions.to_string()))
            .one(&self.db)
            .await?;
        Ok(model.map(Into::into))
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> UserResult<u64> {
        let result = oauth_state::Entity::delete_many()
            .filter(oauth_state::Column::ExpiresAt.lte(now))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected)
    }

    async fn list(&self, filter: OAuthStateFilter) -> UserResult<Vec<OAuthState>> {
        let mut query = oauth_state::Entity::find();

        if let Some(used) = filter.used {
            query = query.filter(oauth_state::Column::Used.eq(used));
        }
        if let Some(stage) = filter.stage {
            query = query.filter(oauth_state::Column::Stage.eq(stage.to_string()));
        }

        let models = query
            .order_by_desc(oauth_state::Column::CreatedAt)
            .limit(filter.limit)
            .offset(filter.offset)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }
}

#[derive(Clone)]
pub struct PgPermissionRequestRepository {
    db: DatabaseConnection,
}

impl PgPermissionRequestRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn upsert(
        &self,
        active_model: permission_request::ActiveModel,
        update_columns: Vec<permission_request::Column>,
    ) -> UserResult<PermissionRequest> {
        let model = permission_request::Entity::insert(active_model)
            .on_conflict(
                OnConflict::columns([
                    permission_request::Column::UserId,
                    permission_request::Column::Service,
                ])
                .update_columns(update_columns)
                .to_owned(),
            )
            .exec_with_returning(&self.db)
            .await?;

        Ok(PermissionRequest::try_from(model)?)
    }
}

#[async_trait]
impl PermissionRequestRepository for PgPermissionRequestRepository {
    async fn upsert_pending(
        &self,
        user_id: Uuid,
        service: GoogleService,
        requested_scopes: Vec<String>,
        now: DateTime<Utc>,
    ) -> UserResult<PermissionRequest> {
        let active_model = permission_request::ActiveModel {
            id: Set(Uuid::now_v7()),
            user_id: Set(user_id),
            service: Set(service.to_string()),
            requested_scopes: Set(serde_json::json!(requested_scopes)),
            requested_at: Set(now.into()),
            granted_at: Set(None),
            is_granted: Set(false),
        };

        self.upsert(
            active_model,
            vec![
                permission_request::Column::RequestedScopes,
                permission_request::Column::RequestedAt,
                permission_request::Column::GrantedAt,
                permission_request::Column::IsGranted,
            ],
        )
        .await
    }

    async fn resolve(
        &self,
        user_id: Uuid,
        service: GoogleService,
        granted: bool,
        now: DateTime<Utc>,
    ) -> UserResult<PermissionRequest> {
        let scopes: Vec<&str> = service_scopes(service).to_vec();
        let active_model = permission_request::ActiveModel {
            id: Set(Uuid::now_v7()),
            user_id: Set(user_id),
            service: Set(service.to_string()),
            requested_scopes: Set(serde_json::json!(scopes)),
            requested_at: Set(now.into()),
            granted_at: Set(granted.then(|| now.into())),
            is_granted: Set(granted),
        };

        self.upsert(
            active_model,
            vec![
                permission_request::Column::GrantedAt,
                permission_request::Column::IsGranted,
            ],
        )
        .await
    }

    async fn list(&self, filter: PermissionRequestFilter) -> UserResult<Vec<PermissionRequest>> {
        let mut query = permission_request::Entity::find();

        if let Some(user_id) = filter.user_id {
            query = query.filter(permission_request::Column::UserId.eq(user_id));
        }
        if let Some(service) = filter.service {
            query = query.filter(permission_request::Column::Service.eq(service.to_string()));
        }
        if let Some(granted) = filter.granted {
            query = query.filter(permission_request::Column::IsGranted.eq(granted));
        }

        let models = query
            .order_by_desc(permission_request::Column::RequestedAt)
            .limit(filter.limit)
            .offset(filter.offset)
            .all(&self.db)
            .await?;

        models
            .into_iter()
            .map(|m| PermissionRequest::try_from(m).map_err(UserError::from))
            .collect()
    }
}
