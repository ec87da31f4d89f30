use std::sync::Arc;

use chrono::Utc;
use crates::domain::{
    repositories::{
        grants::GrantRepository, plan_meta::PlanMetaRepository, users::UserRepository,
    },
    value_objects::{
        entitlements::{EntitlementView, build_view},
        plans::{FileSlot, PlanFileDownload, PlanFilesView},
    },
};
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum EntitlementError {
    #[error("user not found")]
    UserNotFound,
    #[error("no active membership")]
    NoActiveGrant,
    #[error("plan not found")]
    PlanNotFound,
    #[error("no file uploaded for this slot")]
    EmptySlot,
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl EntitlementError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            EntitlementError::UserNotFound
            | EntitlementError::PlanNotFound
            | EntitlementError::EmptySlot => StatusCode::NOT_FOUND,
            EntitlementError::NoActiveGrant => StatusCode::FORBIDDEN,
            EntitlementError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            EntitlementError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, EntitlementError>;

pub struct EntitlementUseCase<U, G, P>
where
    U: UserRepository + Send + Sync + 'static,
    G: GrantRepository + Send + Sync + 'static,
    P: PlanMetaRepository + Send + Sync + 'static,
{
    user_repo: Arc<U>,
    grant_repo: Arc<G>,
    plan_repo: Arc<P>,
}

impl<U, G, P> EntitlementUseCase<U, G, P>
where
    U: UserRepository + Send + Sync + 'static,
    G: GrantRepository + Send + Sync + 'static,
    P: PlanMetaRepository + Send + Sync + 'static,
{
    pub fn new(user_repo: Arc<U>, grant_repo: Arc<G>, plan_repo: Arc<P>) -> Self {
        Self {
            user_repo,
            grant_repo,
            plan_repo,
        }
    }

    /// The mypage payload. Resolves for every existing user, active or not.
    pub async fn build_entitlements(&self, user_id: Uuid) -> UseCaseResult<EntitlementView> {
        let user = self
            .user_repo
            .find_by_id(user_id)
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "entitlements: failed to load user");
                EntitlementError::Internal(err)
            })?
            .ok_or(EntitlementError::UserNotFound)?;

        let now = Utc::now();
        let grant = self
            .grant_repo
            .find_active_for_user(user_id, now)
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "entitlements: failed to load active grant");
                EntitlementError::Internal(err)
            })?;

        let view = build_view(&user, grant.as_ref(), now);
        info!(
            %user_id,
            plan = %view.plan,
            is_active = view.is_active,
            "entitlements: view resolved"
        );
        Ok(view)
    }

    /// File metadata for the member's plan. Requires an active grant; the
    /// catalog row does not have to be active anymore.
    pub async fn plan_files(&self, user_id: Uuid) -> UseCaseResult<PlanFilesView> {
        let plan = self.active_plan_for(user_id).await?;
        Ok(PlanFilesView::from(plan))
    }

    pub async fn plan_file_download(
        &self,
        user_id: Uuid,
        slot: &str,
    ) -> UseCaseResult<PlanFileDownload> {
        let slot = FileSlot::from_str(slot.trim().to_uppercase().as_str())
            .ok_or_else(|| EntitlementError::Validation(format!("Unknown file slot: {}", slot)))?;

        let plan = self.active_plan_for(user_id).await?;

        let (path, name) = match slot {
            FileSlot::A => (plan.file_a_path, plan.file_a_name),
            FileSlot::B => (plan.file_b_path, plan.file_b_name),
        };

        match (path, name) {
            (Some(path), Some(name)) => {
                info!(%user_id, slot = slot.as_str(), "entitlements: plan file resolved");
                Ok(PlanFileDownload { path, name })
            }
            _ => {
                let err = EntitlementError::EmptySlot;
                warn!(
                    %user_id,
                    slot = slot.as_str(),
                    status = err.status_code().as_u16(),
                    "entitlements: empty file slot"
                );
                Err(err)
            }
        }
    }

    async fn active_plan_for(
        &self,
        user_id: Uuid,
    ) -> UseCaseResult<crates::domain::entities::plan_meta::PlanMetaEntity> {
        let grant = self
            .grant_repo
            .find_active_for_user(user_id, Utc::now())
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "entitlements: failed to load active grant");
                EntitlementError::Internal(err)
            })?;

        let grant = match grant {
            Some(grant) => grant,
            None => {
                let err = EntitlementError::NoActiveGrant;
                warn!(
                    %user_id,
                    status = err.status_code().as_u16(),
                    "entitlements: plan files without an active grant"
                );
                return Err(err);
            }
        };

        self.plan_repo
            .find_by_name(&grant.plan)
            .await
            .map_err(|err| {
                error!(
                    %user_id,
                    plan = %grant.plan,
                    db_error = ?err,
                    "entitlements: failed to load plan"
                );
                EntitlementError::Internal(err)
            })?
            .ok_or(EntitlementError::PlanNotFound)
    }
}
