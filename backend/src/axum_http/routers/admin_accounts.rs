use crate::{config::config_model::AdminSecret, usecases::admin_accounts::AdminAccountUseCase};
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use crates::{
    domain::{
        repositories::admins::AdminRepository,
        value_objects::admins::{AdminLoginModel, RegisterAdminModel},
    },
    infra::db::{postgres::postgres_connection::PgPoolSquad, repositories::admins::AdminPostgres},
};
use std::sync::Arc;

pub fn routes(db_pool: Arc<PgPoolSquad>, admin_secret: AdminSecret) -> Router {
    let admin_repository = AdminPostgres::new(Arc::clone(&db_pool));
    let usecase = AdminAccountUseCase::new(Arc::new(admin_repository), admin_secret);

    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .with_state(Arc::new(usecase))
}

pub async fn register<A>(
    State(usecase): State<Arc<AdminAccountUseCase<A>>>,
    Json(register_admin_model): Json<RegisterAdminModel>,
) -> impl IntoResponse
where
    A: AdminRepository + Send + Sync + 'static,
{
    match usecase
        .register(register_admin_model.email, register_admin_model.password)
        .await
    {
        Ok(view) => (StatusCode::CREATED, Json(view)).into_response(),
        Err(err) => (err.status_code(), err.to_string()).into_response(),
    }
}

pub async fn login<A>(
    State(usecase): State<Arc<AdminAccountUseCase<A>>>,
    Json(admin_login_model): Json<AdminLoginModel>,
) -> impl IntoResponse
where
    A: AdminRepository + Send + Sync + 'static,
{
    match usecase
        .login(admin_login_model.email, admin_login_model.password)
        .await
    {
        Ok(view) => Json(view).into_response(),
        Err(err) => (err.status_code(), err.to_string()).into_response(),
    }
}
