use crate::{auth::AuthAdmin, usecases::plan_catalog::PlanCatalogUseCase};
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, put},
};
use crates::{
    domain::{
        repositories::{admin_logs::AdminLogRepository, plan_meta::PlanMetaRepository},
        value_objects::plans::{
            CreatePlanModel, SetPlanActiveModel, SetPlanFileModel, UpdatePlanModel,
        },
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::{admin_logs::AdminLogPostgres, plan_meta::PlanMetaPostgres},
    },
};
use std::sync::Arc;
use tracing::info;

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let plan_repository = PlanMetaPostgres::new(Arc::clone(&db_pool));
    let admin_log_repository = AdminLogPostgres::new(Arc::clone(&db_pool));
    let usecase = PlanCatalogUseCase::new(Arc::new(plan_repository), Arc::new(admin_log_repository));

    Router::new()
        .route("/", get(list_plans).post(create_plan))
        .route("/:name", patch(update_plan).delete(delete_plan))
        .route("/:name/active", patch(set_plan_active))
        .route(
            "/:name/files/:slot",
            put(set_plan_file).delete(clear_plan_file),
        )
        .with_state(Arc::new(usecase))
}

pub async fn list_plans<P, L>(
    State(usecase): State<Arc<PlanCatalogUseCase<P, L>>>,
    AuthAdmin { admin_id, .. }: AuthAdmin,
) -> impl IntoResponse
where
    P: PlanMetaRepository + Send + Sync + 'static,
    L: AdminLogRepository + Send + Sync + 'static,
{
    info!(%admin_id, "admin_plans: list request received");
    match usecase.list_plans().await {
        Ok(plans) => Json(plans).into_response(),
        Err(err) => (err.status_code(), err.to_string()).into_response(),
    }
}

pub async fn create_plan<P, L>(
    State(usecase): State<Arc<PlanCatalogUseCase<P, L>>>,
    AuthAdmin { admin_id, .. }: AuthAdmin,
    Json(create_plan_model): Json<CreatePlanModel>,
) -> impl IntoResponse
where
    P: PlanMetaRepository + Send + Sync + 'static,
    L: AdminLogRepository + Send + Sync + 'static,
{
    info!(%admin_id, "admin_plans: create request received");
    match usecase.create_plan(admin_id, create_plan_model).await {
        Ok(plan) => (StatusCode::CREATED, Json(plan)).into_response(),
        Err(err) => (err.status_code(), err.to_string()).into_response(),
    }
}

pub async fn update_plan<P, L>(
    State(usecase): State<Arc<PlanCatalogUseCase<P, L>>>,
    AuthAdmin { admin_id, .. }: AuthAdmin,
    Path(name): Path<String>,
    Json(update_plan_model): Json<UpdatePlanModel>,
) -> impl IntoResponse
where
    P: PlanMetaRepository + Send + Sync + 'static,
    L: AdminLogRepository + Send + Sync + 'static,
{
    info!(%admin_id, %name, "admin_plans: update request received");
    match usecase.update_plan(admin_id, &name, update_plan_model).await {
        Ok(plan) => Json(plan).into_response(),
        Err(err) => (err.status_code(), err.to_string()).into_response(),
    }
}

pub async fn set_plan_active<P, L>(
    State(usecase): State<Arc<PlanCatalogUseCase<P, L>>>,
    AuthAdmin { admin_id, .. }: AuthAdmin,
    Path(name): Path<String>,
    Json(set_plan_active_model): Json<SetPlanActiveModel>,
) -> impl IntoResponse
where
    P: PlanMetaRepository + Send + Sync + 'static,
    L: AdminLogRepository + Send + Sync + 'static,
{
    info!(%admin_id, %name, "admin_plans: toggle request received");
    match usecase
        .set_plan_active(admin_id, &name, set_plan_active_model.is_active)
        .await
    {
        Ok(plan) => Json(plan).into_response(),
        Err(err) => (err.status_code(), err.to_string()).into_response(),
    }
}

pub async fn delete_plan<P, L>(
    State(usecase): State<Arc<PlanCatalogUseCase<P, L>>>,
    AuthAdmin { admin_id, .. }: AuthAdmin,
    Path(name): Path<String>,
) -> impl IntoResponse
where
    P: PlanMetaRepository + Send + Sync + 'static,
    L: AdminLogRepository + Send + Sync + 'static,
{
    info!(%admin_id, %name, "admin_plans: delete request received");
    match usecase.delete_plan(admin_id, &name).await {
        Ok(message) => (StatusCode::OK, message).into_response(),
        Err(err) => (err.status_code(), err.to_string()).into_response(),
    }
}

pub async fn set_plan_file<P, L>(
    State(usecase): State<Arc<PlanCatalogUseCase<P, L>>>,
    AuthAdmin { admin_id, .. }: AuthAdmin,
    Path((name, slot)): Path<(String, String)>,
    Json(set_plan_file_model): Json<SetPlanFileModel>,
) -> impl IntoResponse
where
    P: PlanMetaRepository + Send + Sync + 'static,
    L: AdminLogRepository + Send + Sync + 'static,
{
    info!(%admin_id, %name, %slot, "admin_plans: set file request received");
    match usecase
        .set_plan_file(admin_id, &name, &slot, set_plan_file_model)
        .await
    {
        Ok(plan) => Json(plan).into_response(),
        Err(err) => (err.status_code(), err.to_string()).into_response(),
    }
}

pub async fn clear_plan_file<P, L>(
    State(usecase): State<Arc<PlanCatalogUseCase<P, L>>>,
    AuthAdmin { admin_id, .. }: AuthAdmin,
    Path((name, slot)): Path<(String, String)>,
) -> impl IntoResponse
where
    P: PlanMetaRepository + Send + Sync + 'static,
    L: AdminLogRepository + Send + Sync + 'static,
{
    info!(%admin_id, %name, %slot, "admin_plans: clear file request received");
    match usecase.clear_plan_file(admin_id, &name, &slot).await {
        Ok(plan) => Json(plan).into_response(),
        Err(err) => (err.status_code(), err.to_string()).into_response(),
    }
}
