use crate::{
    auth::AuthUser,
    usecases::{entitlements::EntitlementUseCase, memberships::MembershipUseCase},
};
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use crates::{
    domain::{
        repositories::{
            grants::GrantRepository, plan_meta::PlanMetaRepository,
            submissions::SubmissionRepository, users::UserRepository,
        },
        value_objects::submissions::SubmitMembershipModel,
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::{
            grants::GrantPostgres, plan_meta::PlanMetaPostgres, submissions::SubmissionPostgres,
            users::UserPostgres,
        },
    },
};
use std::sync::Arc;
use tracing::info;

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let submission_repository = SubmissionPostgres::new(Arc::clone(&db_pool));
    let plan_repository = PlanMetaPostgres::new(Arc::clone(&db_pool));
    let user_repository = UserPostgres::new(Arc::clone(&db_pool));
    let membership_usecase = MembershipUseCase::new(
        Arc::new(submission_repository),
        Arc::new(plan_repository),
        Arc::new(user_repository),
    );

    let user_repository = UserPostgres::new(Arc::clone(&db_pool));
    let grant_repository = GrantPostgres::new(Arc::clone(&db_pool));
    let plan_repository = PlanMetaPostgres::new(Arc::clone(&db_pool));
    let entitlement_usecase = EntitlementUseCase::new(
        Arc::new(user_repository),
        Arc::new(grant_repository),
        Arc::new(plan_repository),
    );

    let submission_routes = Router::new()
        .route("/plans", get(list_plans))
        .route("/submit", post(submit))
        .route("/latest-submission", get(latest_submission))
        .with_state(Arc::new(membership_usecase));

    let entitlement_routes = Router::new()
        .route("/me", get(my_entitlements))
        .route("/plan-files", get(plan_files))
        .route("/plan-files/:slot", get(download_plan_file))
        .with_state(Arc::new(entitlement_usecase));

    submission_routes.merge(entitlement_routes)
}

pub async fn list_plans<S, P, U>(
    State(usecase): State<Arc<MembershipUseCase<S, P, U>>>,
) -> impl IntoResponse
where
    S: SubmissionRepository + Send + Sync + 'static,
    P: PlanMetaRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    match usecase.list_plans().await {
        Ok(plans) => Json(plans).into_response(),
        Err(err) => (err.status_code(), err.to_string()).into_response(),
    }
}

pub async fn submit<S, P, U>(
    State(usecase): State<Arc<MembershipUseCase<S, P, U>>>,
    AuthUser { user_id, .. }: AuthUser,
    Json(submit_membership_model): Json<SubmitMembershipModel>,
) -> impl IntoResponse
where
    S: SubmissionRepository + Send + Sync + 'static,
    P: PlanMetaRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    info!(%user_id, "memberships: submit request received");
    match usecase.submit(user_id, submit_membership_model).await {
        Ok(message) => (StatusCode::CREATED, message).into_response(),
        Err(err) => (err.status_code(), err.to_string()).into_response(),
    }
}

pub async fn latest_submission<S, P, U>(
    State(usecase): State<Arc<MembershipUseCase<S, P, U>>>,
    AuthUser { user_id, .. }: AuthUser,
) -> impl IntoResponse
where
    S: SubmissionRepository + Send + Sync + 'static,
    P: PlanMetaRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    info!(%user_id, "memberships: latest-submission request received");
    match usecase.latest_for_user(user_id).await {
        Ok(view) => Json(view).into_response(),
        Err(err) => (err.status_code(), err.to_string()).into_response(),
    }
}

pub async fn my_entitlements<U, G, P>(
    State(usecase): State<Arc<EntitlementUseCase<U, G, P>>>,
    AuthUser { user_id, .. }: AuthUser,
) -> impl IntoResponse
where
    U: UserRepository + Send + Sync + 'static,
    G: GrantRepository + Send + Sync + 'static,
    P: PlanMetaRepository + Send + Sync + 'static,
{
    info!(%user_id, "memberships: me request received");
    match usecase.build_entitlements(user_id).await {
        Ok(view) => Json(view).into_response(),
        Err(err) => (err.status_code(), err.to_string()).into_response(),
    }
}

pub async fn plan_files<U, G, P>(
    State(usecase): State<Arc<EntitlementUseCase<U, G, P>>>,
    AuthUser { user_id, .. }: AuthUser,
) -> impl IntoResponse
where
    U: UserRepository + Send + Sync + 'static,
    G: GrantRepository + Send + Sync + 'static,
    P: PlanMetaRepository + Send + Sync + 'static,
{
    info!(%user_id, "memberships: plan-files request received");
    match usecase.plan_files(user_id).await {
        Ok(view) => Json(view).into_response(),
        Err(err) => (err.status_code(), err.to_string()).into_response(),
    }
}

pub async fn download_plan_file<U, G, P>(
    State(usecase): State<Arc<EntitlementUseCase<U, G, P>>>,
    AuthUser { user_id, .. }: AuthUser,
    Path(slot): Path<String>,
) -> impl IntoResponse
where
    U: UserRepository + Send + Sync + 'static,
    G: GrantRepository + Send + Sync + 'static,
    P: PlanMetaRepository + Send + Sync + 'static,
{
    info!(%user_id, %slot, "memberships: plan-file download request received");
    match usecase.plan_file_download(user_id, &slot).await {
        Ok(download) => Json(download).into_response(),
        Err(err) => (err.status_code(), err.to_string()).into_response(),
    }
}
