use crate::{auth::AuthAdmin, usecases::admin_users::AdminUserUseCase};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
};
use crates::{
    domain::{
        repositories::{
            admin_logs::AdminLogRepository, grants::GrantRepository,
            plan_meta::PlanMetaRepository, users::UserRepository,
        },
        value_objects::users::{AdminCreateUserModel, AdminUpdateUserModel},
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::{
            admin_logs::AdminLogPostgres, grants::GrantPostgres, plan_meta::PlanMetaPostgres,
            users::UserPostgres,
        },
    },
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    status: Option<String>,
}

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let user_repository = UserPostgres::new(Arc::clone(&db_pool));
    let plan_repository = PlanMetaPostgres::new(Arc::clone(&db_pool));
    let grant_repository = GrantPostgres::new(Arc::clone(&db_pool));
    let admin_log_repository = AdminLogPostgres::new(Arc::clone(&db_pool));
    let usecase = AdminUserUseCase::new(
        Arc::new(user_repository),
        Arc::new(plan_repository),
        Arc::new(grant_repository),
        Arc::new(admin_log_repository),
    );

    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/:user_id", patch(update_user).delete(delete_user))
        .route("/users/:user_id/grants", get(user_grants))
        .route("/grants/:grant_id/revoke", post(revoke_grant))
        .with_state(Arc::new(usecase))
}

pub async fn list_users<U, P, G, L>(
    State(usecase): State<Arc<AdminUserUseCase<U, P, G, L>>>,
    AuthAdmin { admin_id, .. }: AuthAdmin,
    Query(query): Query<ListUsersQuery>,
) -> impl IntoResponse
where
    U: UserRepository + Send + Sync + 'static,
    P: PlanMetaRepository + Send + Sync + 'static,
    G: GrantRepository + Send + Sync + 'static,
    L: AdminLogRepository + Send + Sync + 'static,
{
    info!(%admin_id, "admin_users: list request received");
    match usecase.list_users(query.status).await {
        Ok(views) => Json(views).into_response(),
        Err(err) => (err.status_code(), err.to_string()).into_response(),
    }
}

pub async fn create_user<U, P, G, L>(
    State(usecase): State<Arc<AdminUserUseCase<U, P, G, L>>>,
    AuthAdmin { admin_id, .. }: AuthAdmin,
    Json(admin_create_user_model): Json<AdminCreateUserModel>,
) -> impl IntoResponse
where
    U: UserRepository + Send + Sync + 'static,
    P: PlanMetaRepository + Send + Sync + 'static,
    G: GrantRepository + Send + Sync + 'static,
    L: AdminLogRepository + Send + Sync + 'static,
{
    info!(%admin_id, "admin_users: create request received");
    match usecase.create_user(admin_id, admin_create_user_model).await {
        Ok(profile) => (StatusCode::CREATED, Json(profile)).into_response(),
        Err(err) => (err.status_code(), err.to_string()).into_response(),
    }
}

pub async fn update_user<U, P, G, L>(
    State(usecase): State<Arc<AdminUserUseCase<U, P, G, L>>>,
    AuthAdmin { admin_id, .. }: AuthAdmin,
    Path(user_id): Path<Uuid>,
    Json(admin_update_user_model): Json<AdminUpdateUserModel>,
) -> impl IntoResponse
where
    U: UserRepository + Send + Sync + 'static,
    P: PlanMetaRepository + Send + Sync + 'static,
    G: GrantRepository + Send + Sync + 'static,
    L: AdminLogRepository + Send + Sync + 'static,
{
    info!(%admin_id, %user_id, "admin_users: update request received");
    match usecase
        .update_user(admin_id, user_id, admin_update_user_model)
        .await
    {
        Ok(profile) => Json(profile).into_response(),
        Err(err) => (err.status_code(), err.to_string()).into_response(),
    }
}

pub async fn delete_user<U, P, G, L>(
    State(usecase): State<Arc<AdminUserUseCase<U, P, G, L>>>,
    AuthAdmin { admin_id, .. }: AuthAdmin,
    Path(user_id): Path<Uuid>,
) -> impl IntoResponse
where
    U: UserRepository + Send + Sync + 'static,
    P: PlanMetaRepository + Send + Sync + 'static,
    G: GrantRepository + Send + Sync + 'static,
    L: AdminLogRepository + Send + Sync + 'static,
{
    info!(%admin_id, %user_id, "admin_users: delete request received");
    match usecase.delete_user(admin_id, user_id).await {
        Ok(message) => (StatusCode::OK, message).into_response(),
        Err(err) => (err.status_code(), err.to_string()).into_response(),
    }
}

pub async fn user_grants<U, P, G, L>(
    State(usecase): State<Arc<AdminUserUseCase<U, P, G, L>>>,
    AuthAdmin { admin_id, .. }: AuthAdmin,
    Path(user_id): Path<Uuid>,
) -> impl IntoResponse
where
    U: UserRepository + Send + Sync + 'static,
    P: PlanMetaRepository + Send + Sync + 'static,
    G: GrantRepository + Send + Sync + 'static,
    L: AdminLogRepository + Send + Sync + 'static,
{
    info!(%admin_id, %user_id, "admin_users: grants request received");
    match usecase.user_grants(user_id).await {
        Ok(grants) => Json(grants).into_response(),
        Err(err) => (err.status_code(), err.to_string()).into_response(),
    }
}

pub async fn revoke_grant<U, P, G, L>(
    State(usecase): State<Arc<AdminUserUseCase<U, P, G, L>>>,
    AuthAdmin { admin_id, .. }: AuthAdmin,
    Path(grant_id): Path<Uuid>,
) -> impl IntoResponse
where
    U: UserRepository + Send + Sync + 'static,
    P: PlanMetaRepository + Send + Sync + 'static,
    G: GrantRepository + Send + Sync + 'static,
    L: AdminLogRepository + Send + Sync + 'static,
{
    info!(%admin_id, %grant_id, "admin_users: revoke grant request received");
    match usecase.revoke_grant(admin_id, grant_id).await {
        Ok(view) => Json(view).into_response(),
        Err(err) => (err.status_code(), err.to_string()).into_response(),
    }
}
