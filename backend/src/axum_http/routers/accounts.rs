use crate::{
    auth::AuthUser,
    config::config_model::UserSecret,
    usecases::accounts::AccountUseCase,
};
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use crates::{
    domain::{
        repositories::{grants::GrantRepository, users::UserRepository},
        value_objects::users::{
            AccountNumberModel, ForgotPasswordModel, LoginModel, RefreshTokenModel,
            RegisterUserModel, ResetPasswordModel,
        },
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::{grants::GrantPostgres, users::UserPostgres},
    },
};
use std::sync::Arc;
use tracing::info;

pub fn routes(db_pool: Arc<PgPoolSquad>, user_secret: UserSecret) -> Router {
    let user_repository = UserPostgres::new(Arc::clone(&db_pool));
    let grant_repository = GrantPostgres::new(Arc::clone(&db_pool));
    let usecase = AccountUseCase::new(
        Arc::new(user_repository),
        Arc::new(grant_repository),
        user_secret,
    );

    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/logout", post(logout))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password", post(reset_password))
        .route("/account-number", post(set_account_number))
        .with_state(Arc::new(usecase))
}

pub async fn register<U, G>(
    State(usecase): State<Arc<AccountUseCase<U, G>>>,
    Json(register_user_model): Json<RegisterUserModel>,
) -> impl IntoResponse
where
    U: UserRepository + Send + Sync + 'static,
    G: GrantRepository + Send + Sync + 'static,
{
    match usecase.register(register_user_model).await {
        Ok(view) => (StatusCode::CREATED, Json(view)).into_response(),
        Err(err) => (err.status_code(), err.to_string()).into_response(),
    }
}

pub async fn login<U, G>(
    State(usecase): State<Arc<AccountUseCase<U, G>>>,
    Json(login_model): Json<LoginModel>,
) -> impl IntoResponse
where
    U: UserRepository + Send + Sync + 'static,
    G: GrantRepository + Send + Sync + 'static,
{
    match usecase.login(login_model).await {
        Ok(view) => Json(view).into_response(),
        Err(err) => (err.status_code(), err.to_string()).into_response(),
    }
}

pub async fn refresh<U, G>(
    State(usecase): State<Arc<AccountUseCase<U, G>>>,
    Json(refresh_token_model): Json<RefreshTokenModel>,
) -> impl IntoResponse
where
    U: UserRepository + Send + Sync + 'static,
    G: GrantRepository + Send + Sync + 'static,
{
    match usecase.refresh(&refresh_token_model.refresh_token).await {
        Ok(view) => Json(view).into_response(),
        Err(err) => (err.status_code(), err.to_string()).into_response(),
    }
}

pub async fn logout<U, G>(
    State(usecase): State<Arc<AccountUseCase<U, G>>>,
    AuthUser { user_id, .. }: AuthUser,
) -> impl IntoResponse
where
    U: UserRepository + Send + Sync + 'static,
    G: GrantRepository + Send + Sync + 'static,
{
    info!(%user_id, "accounts: logout request received");
    match usecase.logout(user_id).await {
        Ok(message) => (StatusCode::OK, message).into_response(),
        Err(err) => (err.status_code(), err.to_string()).into_response(),
    }
}

pub async fn forgot_password<U, G>(
    State(usecase): State<Arc<AccountUseCase<U, G>>>,
    Json(forgot_password_model): Json<ForgotPasswordModel>,
) -> impl IntoResponse
where
    U: UserRepository + Send + Sync + 'static,
    G: GrantRepository + Send + Sync + 'static,
{
    match usecase.forgot_password(forgot_password_model).await {
        Ok(view) => Json(view).into_response(),
        Err(err) => (err.status_code(), err.to_string()).into_response(),
    }
}

pub async fn reset_password<U, G>(
    State(usecase): State<Arc<AccountUseCase<U, G>>>,
    Json(reset_password_model): Json<ResetPasswordModel>,
) -> impl IntoResponse
where
    U: UserRepository + Send + Sync + 'static,
    G: GrantRepository + Send + Sync + 'static,
{
    match usecase.reset_password(reset_password_model).await {
        Ok(message) => (StatusCode::OK, message).into_response(),
        Err(err) => (err.status_code(), err.to_string()).into_response(),
    }
}

pub async fn set_account_number<U, G>(
    State(usecase): State<Arc<AccountUseCase<U, G>>>,
    AuthUser { user_id, .. }: AuthUser,
    Json(account_number_model): Json<AccountNumberModel>,
) -> impl IntoResponse
where
    U: UserRepository + Send + Sync + 'static,
    G: GrantRepository + Send + Sync + 'static,
{
    info!(%user_id, "accounts: account-number request received");
    match usecase
        .set_account_number(user_id, account_number_model.account_number)
        .await
    {
        Ok(message) => (StatusCode::OK, message).into_response(),
        Err(err) => (err.status_code(), err.to_string()).into_response(),
    }
}
