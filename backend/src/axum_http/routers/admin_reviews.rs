use crate::{
    auth::AuthAdmin,
    usecases::{approvals::ApprovalUseCase, memberships::MembershipUseCase},
};
use axum::{
    Json, Router,
    extract::{Path, State},
    response::IntoResponse,
    routing::{get, post},
};
use crates::{
    domain::{
        repositories::{
            approvals::ApprovalRepository, plan_meta::PlanMetaRepository,
            submissions::SubmissionRepository, users::UserRepository,
        },
        value_objects::submissions::ReviewDecisionModel,
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::{
            approvals::ApprovalPostgres, plan_meta::PlanMetaPostgres,
            submissions::SubmissionPostgres, users::UserPostgres,
        },
    },
};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let submission_repository = SubmissionPostgres::new(Arc::clone(&db_pool));
    let plan_repository = PlanMetaPostgres::new(Arc::clone(&db_pool));
    let user_repository = UserPostgres::new(Arc::clone(&db_pool));
    let membership_usecase = MembershipUseCase::new(
        Arc::new(submission_repository),
        Arc::new(plan_repository),
        Arc::new(user_repository),
    );

    let submission_repository = SubmissionPostgres::new(Arc::clone(&db_pool));
    let plan_repository = PlanMetaPostgres::new(Arc::clone(&db_pool));
    let approval_repository = ApprovalPostgres::new(Arc::clone(&db_pool));
    let approval_usecase = ApprovalUseCase::new(
        Arc::new(submission_repository),
        Arc::new(plan_repository),
        Arc::new(approval_repository),
    );

    let queue_routes = Router::new()
        .route("/pending", get(list_pending))
        .with_state(Arc::new(membership_usecase));

    let decision_routes = Router::new()
        .route("/:submission_id/approve", post(approve))
        .route("/:submission_id/reject", post(reject))
        .with_state(Arc::new(approval_usecase));

    queue_routes.merge(decision_routes)
}

pub async fn list_pending<S, P, U>(
    State(usecase): State<Arc<MembershipUseCase<S, P, U>>>,
    AuthAdmin { admin_id, .. }: AuthAdmin,
) -> impl IntoResponse
where
    S: SubmissionRepository + Send + Sync + 'static,
    P: PlanMetaRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    info!(%admin_id, "admin_reviews: pending queue request received");
    match usecase.list_pending().await {
        Ok(views) => Json(views).into_response(),
        Err(err) => (err.status_code(), err.to_string()).into_response(),
    }
}

pub async fn approve<S, P, A>(
    State(usecase): State<Arc<ApprovalUseCase<S, P, A>>>,
    AuthAdmin { admin_id, .. }: AuthAdmin,
    Path(submission_id): Path<Uuid>,
    Json(review_decision_model): Json<ReviewDecisionModel>,
) -> impl IntoResponse
where
    S: SubmissionRepository + Send + Sync + 'static,
    P: PlanMetaRepository + Send + Sync + 'static,
    A: ApprovalRepository + Send + Sync + 'static,
{
    info!(%admin_id, %submission_id, "admin_reviews: approve request received");
    match usecase
        .approve(submission_id, admin_id, review_decision_model.note)
        .await
    {
        Ok(view) => Json(view).into_response(),
        Err(err) => (err.status_code(), err.to_string()).into_response(),
    }
}

pub async fn reject<S, P, A>(
    State(usecase): State<Arc<ApprovalUseCase<S, P, A>>>,
    AuthAdmin { admin_id, .. }: AuthAdmin,
    Path(submission_id): Path<Uuid>,
    Json(review_decision_model): Json<ReviewDecisionModel>,
) -> impl IntoResponse
where
    S: SubmissionRepository + Send + Sync + 'static,
    P: PlanMetaRepository + Send + Sync + 'static,
    A: ApprovalRepository + Send + Sync + 'static,
{
    info!(%admin_id, %submission_id, "admin_reviews: reject request received");
    match usecase
        .reject(submission_id, admin_id, review_decision_model.note)
        .await
    {
        Ok(view) => Json(view).into_response(),
        Err(err) => (err.status_code(), err.to_string()).into_response(),
    }
}
