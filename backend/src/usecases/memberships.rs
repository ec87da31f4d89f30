use std::sync::Arc;

use crates::domain::{
    repositories::{
        plan_meta::PlanMetaRepository,
        submissions::{SubmissionCreation, SubmissionRepository},
        users::UserRepository,
    },
    value_objects::{
        enums::payment_methods::PaymentMethod,
        notifications,
        plans::PlanCardDto,
        submissions::{
            LatestSubmissionBrief, LatestSubmissionView, PendingReviewView,
            SubmitMembershipModel, latest_submission_message,
        },
    },
};
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum MembershipError {
    #[error("a submission is already pending review")]
    PendingExists,
    #[error("user not found")]
    UserNotFound,
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl MembershipError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            MembershipError::PendingExists => StatusCode::CONFLICT,
            MembershipError::UserNotFound => StatusCode::NOT_FOUND,
            MembershipError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            MembershipError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, MembershipError>;

pub struct MembershipUseCase<S, P, U>
where
    S: SubmissionRepository + Send + Sync + 'static,
    P: PlanMetaRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    submission_repo: Arc<S>,
    plan_repo: Arc<P>,
    user_repo: Arc<U>,
}

impl<S, P, U> MembershipUseCase<S, P, U>
where
    S: SubmissionRepository + Send + Sync + 'static,
    P: PlanMetaRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    pub fn new(submission_repo: Arc<S>, plan_repo: Arc<P>, user_repo: Arc<U>) -> Self {
        Self {
            submission_repo,
            plan_repo,
            user_repo,
        }
    }

    /// Public catalog, active tiers only.
    pub async fn list_plans(&self) -> UseCaseResult<Vec<PlanCardDto>> {
        info!("memberships: listing active plans");
        let plans = self.plan_repo.list_active().await.map_err(|err| {
            error!(db_error = ?err, "memberships: failed to list active plans");
            MembershipError::Internal(err)
        })?;

        let plan_count = plans.len();
        info!(plan_count, "memberships: active plans loaded");
        Ok(plans.into_iter().map(PlanCardDto::from).collect())
    }

    pub async fn submit(
        &self,
        user_id: Uuid,
        payload: SubmitMembershipModel,
    ) -> UseCaseResult<String> {
        info!(%user_id, plan = %payload.membership_plan, "memberships: payment submitted");

        let payment_method =
            match PaymentMethod::from_str(payload.payment_method.trim().to_uppercase().as_str()) {
                Some(method) => method,
                None => {
                    return Err(MembershipError::Validation(format!(
                        "Unknown payment method: {}",
                        payload.payment_method
                    )));
                }
            };

        if payload.proof_path.trim().is_empty() {
            return Err(MembershipError::Validation(
                "Payment proof is required".to_string(),
            ));
        }

        let plan_name = payload.membership_plan.trim().to_uppercase();
        let plan = self
            .plan_repo
            .find_active_by_name(&plan_name)
            .await
            .map_err(|err| {
                error!(db_error = ?err, "memberships: failed to load plan");
                MembershipError::Internal(err)
            })?;

        let plan = match plan {
            Some(plan) => plan,
            None => {
                let err = MembershipError::Validation(format!(
                    "Unknown or inactive plan: {}",
                    plan_name
                ));
                warn!(
                    %user_id,
                    plan = %plan_name,
                    status = err.status_code().as_u16(),
                    "memberships: submit against unavailable plan"
                );
                return Err(err);
            }
        };

        let user = self
            .user_repo
            .find_by_id(user_id)
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "memberships: failed to load user");
                MembershipError::Internal(err)
            })?
            .filter(|user| !user.is_deleted)
            .ok_or(MembershipError::UserNotFound)?;

        let display_name = user.name.as_deref().unwrap_or(&user.email);
        let notification = notifications::payment_submitted(user_id, display_name, &plan.name);
        let entity = payload.to_entity(user_id, plan.name.clone(), payment_method);

        let creation = self
            .submission_repo
            .create_pending(entity, notification)
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "memberships: failed to create submission");
                MembershipError::Internal(err)
            })?;

        match creation {
            SubmissionCreation::Created(submission) => {
                info!(
                    %user_id,
                    submission_id = %submission.id,
                    plan = %submission.plan,
                    "memberships: submission recorded"
                );
                Ok("Payment submitted. The team will review it shortly.".to_string())
            }
            SubmissionCreation::PendingExists => {
                let err = MembershipError::PendingExists;
                warn!(
                    %user_id,
                    status = err.status_code().as_u16(),
                    "memberships: duplicate pending submission"
                );
                Err(err)
            }
        }
    }

    /// The submission screen: the newest submission in any status plus the
    /// step message derived from the cached user statuses.
    pub async fn latest_for_user(&self, user_id: Uuid) -> UseCaseResult<LatestSubmissionView> {
        let user = self
            .user_repo
            .find_by_id(user_id)
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "memberships: failed to load user");
                MembershipError::Internal(err)
            })?
            .ok_or(MembershipError::UserNotFound)?;

        let latest = self
            .submission_repo
            .latest_for_user(user_id)
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "memberships: failed to load latest submission");
                MembershipError::Internal(err)
            })?;

        let status_message =
            latest_submission_message(&user.payment_status, &user.approval_status).to_string();

        Ok(LatestSubmissionView {
            latest: latest.map(LatestSubmissionBrief::from),
            payment_status: user.payment_status,
            approval_status: user.approval_status,
            status_message,
        })
    }

    /// Admin review queue.
    pub async fn list_pending(&self) -> UseCaseResult<Vec<PendingReviewView>> {
        let pending = self.submission_repo.list_pending().await.map_err(|err| {
            error!(db_error = ?err, "memberships: failed to list pending submissions");
            MembershipError::Internal(err)
        })?;

        let pending_count = pending.len();
        info!(pending_count, "memberships: review queue loaded");
        Ok(pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use crates::domain::{
        entities::{
            plan_meta::PlanMetaEntity,
            submissions::SubmissionEntity,
            users::UserEntity,
        },
        repositories::{
            plan_meta::MockPlanMetaRepository, submissions::MockSubmissionRepository,
            users::MockUserRepository,
        },
        value_objects::{
            notifications::KIND_NEW_PAYMENT_PROOF, plan_features::PlanFeatures,
            submissions::MSG_WAITING_FOR_APPROVAL,
        },
    };

    fn sample_plan(name: &str, is_active: bool) -> PlanMetaEntity {
        let now = Utc::now();
        PlanMetaEntity {
            id: Uuid::new_v4(),
            name: name.to_string(),
            label: "Basic".to_string(),
            description: None,
            price: 4900,
            duration_days: 30,
            features: PlanFeatures::default(),
            is_active,
            file_a_path: None,
            file_a_name: None,
            file_a_updated_at: None,
            file_b_path: None,
            file_b_name: None,
            file_b_updated_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn sample_user(user_id: Uuid) -> UserEntity {
        let now = Utc::now();
        UserEntity {
            id: user_id,
            user_number: 80_001,
            email: "member@example.com".to_string(),
            password_hash: "hash".to_string(),
            name: Some("Member".to_string()),
            phone: None,
            membership_plan: None,
            payment_method: None,
            payment_status: "NONE".to_string(),
            approval_status: "NONE".to_string(),
            payment_proof_path: None,
            access_expires_at: None,
            account_number: None,
            refresh_token_hash: None,
            reset_token_hash: None,
            reset_token_expires_at: None,
            is_deleted: false,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn sample_submission(user_id: Uuid) -> SubmissionEntity {
        SubmissionEntity {
            id: Uuid::new_v4(),
            user_id,
            plan: "BASIC".to_string(),
            payment_method: "BANK_TRANSFER".to_string(),
            proof_path: Some("/uploads/proof.png".to_string()),
            proof_name: Some("proof.png".to_string()),
            status: "PENDING".to_string(),
            admin_note: None,
            reviewed_by: None,
            reviewed_at: None,
            created_at: Utc::now(),
        }
    }

    fn submit_payload(plan: &str) -> SubmitMembershipModel {
        SubmitMembershipModel {
            membership_plan: plan.to_string(),
            payment_method: "BANK_TRANSFER".to_string(),
            proof_path: "/uploads/proof.png".to_string(),
            proof_name: Some("proof.png".to_string()),
        }
    }

    #[tokio::test]
    async fn submit_records_pending_submission() {
        let user_id = Uuid::new_v4();

        let mut plan_repo = MockPlanMetaRepository::new();
        plan_repo.expect_find_active_by_name().returning(|name| {
            let plan = sample_plan(name, true);
            Box::pin(async move { Ok(Some(plan)) })
        });

        let mut user_repo = MockUserRepository::new();
        user_repo.expect_find_by_id().returning(move |_| {
            let user = sample_user(user_id);
            Box::pin(async move { Ok(Some(user)) })
        });

        let mut submission_repo = MockSubmissionRepository::new();
        submission_repo
            .expect_create_pending()
            .withf(move |entity, notification| {
                entity.user_id == user_id
                    && entity.plan == "BASIC"
                    && entity.status == "PENDING"
                    && notification.kind == KIND_NEW_PAYMENT_PROOF
                    && !notification.is_read
            })
            .returning(move |entity, _| {
                let mut submission = sample_submission(entity.user_id);
                submission.plan = entity.plan;
                Box::pin(async move { Ok(SubmissionCreation::Created(submission)) })
            });

        let usecase = MembershipUseCase::new(
            Arc::new(submission_repo),
            Arc::new(plan_repo),
            Arc::new(user_repo),
        );

        // Lowercase input must resolve to the canonical tier name.
        let message = usecase.submit(user_id, submit_payload("basic")).await.unwrap();
        assert!(message.contains("review"));
    }

    #[tokio::test]
    async fn submit_rejects_inactive_plan() {
        let mut plan_repo = MockPlanMetaRepository::new();
        plan_repo
            .expect_find_active_by_name()
            .returning(|_| Box::pin(async { Ok(None) }));

        let usecase = MembershipUseCase::new(
            Arc::new(MockSubmissionRepository::new()),
            Arc::new(plan_repo),
            Arc::new(MockUserRepository::new()),
        );

        let err = usecase
            .submit(Uuid::new_v4(), submit_payload("BASIC"))
            .await
            .unwrap_err();

        assert!(matches!(err, MembershipError::Validation(_)));
        assert_eq!(
            err.status_code(),
            axum::http::StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[tokio::test]
    async fn submit_rejects_unknown_payment_method() {
        let usecase = MembershipUseCase::new(
            Arc::new(MockSubmissionRepository::new()),
            Arc::new(MockPlanMetaRepository::new()),
            Arc::new(MockUserRepository::new()),
        );

        let mut payload = submit_payload("BASIC");
        payload.payment_method = "IOU".to_string();

        let err = usecase.submit(Uuid::new_v4(), payload).await.unwrap_err();
        assert!(matches!(err, MembershipError::Validation(_)));
    }

    #[tokio::test]
    async fn submit_surfaces_pending_conflict() {
        let user_id = Uuid::new_v4();

        let mut plan_repo = MockPlanMetaRepository::new();
        plan_repo.expect_find_active_by_name().returning(|name| {
            let plan = sample_plan(name, true);
            Box::pin(async move { Ok(Some(plan)) })
        });

        let mut user_repo = MockUserRepository::new();
        user_repo.expect_find_by_id().returning(move |_| {
            let user = sample_user(user_id);
            Box::pin(async move { Ok(Some(user)) })
        });

        let mut submission_repo = MockSubmissionRepository::new();
        submission_repo
            .expect_create_pending()
            .returning(|_, _| Box::pin(async { Ok(SubmissionCreation::PendingExists) }));

        let usecase = MembershipUseCase::new(
            Arc::new(submission_repo),
            Arc::new(plan_repo),
            Arc::new(user_repo),
        );

        let err = usecase
            .submit(user_id, submit_payload("BASIC"))
            .await
            .unwrap_err();

        assert!(matches!(err, MembershipError::PendingExists));
        assert_eq!(err.status_code(), axum::http::StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn latest_view_carries_the_step_message() {
        let user_id = Uuid::new_v4();

        let mut user_repo = MockUserRepository::new();
        user_repo.expect_find_by_id().returning(move |_| {
            let mut user = sample_user(user_id);
            user.payment_status = "VERIFYING".to_string();
            user.approval_status = "PENDING".to_string();
            Box::pin(async move { Ok(Some(user)) })
        });

        let mut submission_repo = MockSubmissionRepository::new();
        submission_repo.expect_latest_for_user().returning(move |_| {
            let submission = sample_submission(user_id);
            Box::pin(async move { Ok(Some(submission)) })
        });

        let usecase = MembershipUseCase::new(
            Arc::new(submission_repo),
            Arc::new(MockPlanMetaRepository::new()),
            Arc::new(user_repo),
        );

        let view = usecase.latest_for_user(user_id).await.unwrap();
        assert_eq!(view.status_message, MSG_WAITING_FOR_APPROVAL);
        assert_eq!(view.latest.unwrap().status, "PENDING");
    }
}
