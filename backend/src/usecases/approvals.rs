use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use crates::domain::{
    entities::grants::InsertGrantEntity,
    repositories::{
        approvals::{ApprovalRepository, ReviewCommit},
        plan_meta::PlanMetaRepository,
        submissions::SubmissionRepository,
    },
    value_objects::{
        enums::submission_statuses::SubmissionStatus,
        submissions::SubmissionModel,
    },
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ApprovalError {
    #[error("submission not found")]
    SubmissionNotFound,
    #[error("submission is already approved")]
    AlreadyApproved,
    #[error("submission is already rejected")]
    AlreadyRejected,
    #[error("cannot reject an approved submission")]
    RejectAfterApprove,
    #[error("submission was processed by another admin")]
    LostRace,
    #[error("plan is no longer active: {0}")]
    PlanUnavailable(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApprovalError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            ApprovalError::SubmissionNotFound => StatusCode::NOT_FOUND,
            ApprovalError::AlreadyApproved
            | ApprovalError::AlreadyRejected
            | ApprovalError::RejectAfterApprove
            | ApprovalError::LostRace => StatusCode::CONFLICT,
            ApprovalError::PlanUnavailable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApprovalError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, ApprovalError>;

#[derive(Debug, Clone, Serialize)]
pub struct ApprovedView {
    pub message: String,
    pub access_expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RejectedView {
    pub message: String,
    pub submission: SubmissionModel,
}

pub struct ApprovalUseCase<S, P, A>
where
    S: SubmissionRepository + Send + Sync + 'static,
    P: PlanMetaRepository + Send + Sync + 'static,
    A: ApprovalRepository + Send + Sync + 'static,
{
    submission_repo: Arc<S>,
    plan_repo: Arc<P>,
    approval_repo: Arc<A>,
}

impl<S, P, A> ApprovalUseCase<S, P, A>
where
    S: SubmissionRepository + Send + Sync + 'static,
    P: PlanMetaRepository + Send + Sync + 'static,
    A: ApprovalRepository + Send + Sync + 'static,
{
    pub fn new(submission_repo: Arc<S>, plan_repo: Arc<P>, approval_repo: Arc<A>) -> Self {
        Self {
            submission_repo,
            plan_repo,
            approval_repo,
        }
    }

    pub async fn approve(
        &self,
        submission_id: Uuid,
        admin_id: Uuid,
        note: Option<String>,
    ) -> UseCaseResult<ApprovedView> {
        info!(%submission_id, %admin_id, "approvals: approve requested");

        let submission = self
            .submission_repo
            .find_by_id(submission_id)
            .await
            .map_err(|err| {
                error!(%submission_id, db_error = ?err, "approvals: failed to load submission");
                ApprovalError::Internal(err)
            })?
            .ok_or(ApprovalError::SubmissionNotFound)?;

        match SubmissionStatus::from_str(&submission.status) {
            Some(SubmissionStatus::Pending) => {}
            Some(SubmissionStatus::Approved) => {
                let err = ApprovalError::AlreadyApproved;
                warn!(
                    %submission_id,
                    status = err.status_code().as_u16(),
                    "approvals: approve on an approved submission"
                );
                return Err(err);
            }
            Some(SubmissionStatus::Rejected) => {
                let err = ApprovalError::AlreadyRejected;
                warn!(
                    %submission_id,
                    status = err.status_code().as_u16(),
                    "approvals: approve on a rejected submission"
                );
                return Err(err);
            }
            None => {
                return Err(ApprovalError::Internal(anyhow::anyhow!(
                    "submission {} carries unknown status {}",
                    submission_id,
                    submission.status
                )));
            }
        }

        // The plan must still be purchasable at approval time. A tier pulled
        // from the catalog after submission blocks the approval.
        let plan = self
            .plan_repo
            .find_active_by_name(&submission.plan)
            .await
            .map_err(|err| {
                error!(
                    %submission_id,
                    plan = %submission.plan,
                    db_error = ?err,
                    "approvals: failed to load plan"
                );
                ApprovalError::Internal(err)
            })?;

        let plan = match plan {
            Some(plan) => plan,
            None => {
                let err = ApprovalError::PlanUnavailable(submission.plan.clone());
                warn!(
                    %submission_id,
                    plan = %submission.plan,
                    status = err.status_code().as_u16(),
                    "approvals: plan missing or inactive at approval time"
                );
                return Err(err);
            }
        };

        let now = Utc::now();
        let expires_at = now + Duration::days(i64::from(plan.duration_days));

        // Snapshot of the terms being granted. Catalog edits after this point
        // must not reach the member.
        let grant = InsertGrantEntity {
            user_id: submission.user_id,
            plan: plan.name.clone(),
            label: plan.label.clone(),
            features: plan.features.to_value(),
            price: plan.price,
            duration_days: plan.duration_days,
            approved_by: admin_id,
            approved_at: now,
            expires_at,
            created_at: now,
        };

        let commit = self
            .approval_repo
            .commit_approval(submission_id, admin_id, note, grant)
            .await
            .map_err(|err| {
                error!(
                    %submission_id,
                    %admin_id,
                    db_error = ?err,
                    "approvals: approval transaction failed"
                );
                ApprovalError::Internal(err)
            })?;

        match commit {
            ReviewCommit::Committed(submission) => {
                info!(
                    %submission_id,
                    %admin_id,
                    user_id = %submission.user_id,
                    plan = %submission.plan,
                    %expires_at,
                    "approvals: submission approved"
                );
                Ok(ApprovedView {
                    message: "Submission approved.".to_string(),
                    access_expires_at: expires_at,
                })
            }
            ReviewCommit::LostRace => {
                let err = ApprovalError::LostRace;
                warn!(
                    %submission_id,
                    status = err.status_code().as_u16(),
                    "approvals: lost the review race"
                );
                Err(err)
            }
        }
    }

    pub async fn reject(
        &self,
        submission_id: Uuid,
        admin_id: Uuid,
        note: Option<String>,
    ) -> UseCaseResult<RejectedView> {
        info!(%submission_id, %admin_id, "approvals: reject requested");

        let submission = self
            .submission_repo
            .find_by_id(submission_id)
            .await
            .map_err(|err| {
                error!(%submission_id, db_error = ?err, "approvals: failed to load submission");
                ApprovalError::Internal(err)
            })?
            .ok_or(ApprovalError::SubmissionNotFound)?;

        match SubmissionStatus::from_str(&submission.status) {
            Some(SubmissionStatus::Pending) => {}
            Some(SubmissionStatus::Rejected) => {
                // Idempotent: the earlier rejection stands, no second audit row.
                info!(%submission_id, "approvals: submission was already rejected");
                return Ok(RejectedView {
                    message: "Submission was already rejected.".to_string(),
                    submission: SubmissionModel::from(submission),
                });
            }
            Some(SubmissionStatus::Approved) => {
                let err = ApprovalError::RejectAfterApprove;
                warn!(
                    %submission_id,
                    status = err.status_code().as_u16(),
                    "approvals: reject on an approved submission"
                );
                return Err(err);
            }
            None => {
                return Err(ApprovalError::Internal(anyhow::anyhow!(
                    "submission {} carries unknown status {}",
                    submission_id,
                    submission.status
                )));
            }
        }

        let commit = self
            .approval_repo
            .commit_rejection(submission_id, admin_id, note, Utc::now())
            .await
            .map_err(|err| {
                error!(
                    %submission_id,
                    %admin_id,
                    db_error = ?err,
                    "approvals: rejection transaction failed"
                );
                ApprovalError::Internal(err)
            })?;

        match commit {
            ReviewCommit::Committed(submission) => {
                info!(
                    %submission_id,
                    %admin_id,
                    user_id = %submission.user_id,
                    "approvals: submission rejected"
                );
                Ok(RejectedView {
                    message: "Submission rejected.".to_string(),
                    submission: SubmissionModel::from(submission),
                })
            }
            ReviewCommit::LostRace => {
                let err = ApprovalError::LostRace;
                warn!(
                    %submission_id,
                    status = err.status_code().as_u16(),
                    "approvals: lost the review race"
                );
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crates::domain::{
        entities::{plan_meta::PlanMetaEntity, submissions::SubmissionEntity},
        repositories::{
            approvals::MockApprovalRepository, plan_meta::MockPlanMetaRepository,
            submissions::MockSubmissionRepository,
        },
        value_objects::plan_features::PlanFeatures,
    };
    use mockall::predicate::eq;

    fn sample_submission(status: &str) -> SubmissionEntity {
        SubmissionEntity {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            plan: "BASIC".to_string(),
            payment_method: "BANK_TRANSFER".to_string(),
            proof_path: Some("/uploads/proof.png".to_string()),
            proof_name: Some("proof.png".to_string()),
            status: status.to_string(),
            admin_note: None,
            reviewed_by: None,
            reviewed_at: None,
            created_at: Utc::now(),
        }
    }

    fn sample_plan(duration_days: i32) -> PlanMetaEntity {
        let now = Utc::now();
        PlanMetaEntity {
            id: Uuid::new_v4(),
            name: "BASIC".to_string(),
            label: "Basic".to_string(),
            description: None,
            price: 4900,
            duration_days,
            features: PlanFeatures::default(),
            is_active: true,
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

    fn usecase(
        submission_repo: MockSubmissionRepository,
        plan_repo: MockPlanMetaRepository,
        approval_repo: MockApprovalRepository,
    ) -> ApprovalUseCase<MockSubmissionRepository, MockPlanMetaRepository, MockApprovalRepository>
    {
        ApprovalUseCase::new(
            Arc::new(submission_repo),
            Arc::new(plan_repo),
            Arc::new(approval_repo),
        )
    }

    #[tokio::test]
    async fn approve_commits_grant_with_plan_duration() {
        let submission = sample_submission("PENDING");
        let submission_id = submission.id;
        let user_id = submission.user_id;

        let mut submission_repo = MockSubmissionRepository::new();
        let lookup = submission.clone();
        submission_repo
            .expect_find_by_id()
            .with(eq(submission_id))
            .returning(move |_| {
                let submission = lookup.clone();
                Box::pin(async move { Ok(Some(submission)) })
            });

        let mut plan_repo = MockPlanMetaRepository::new();
        plan_repo
            .expect_find_active_by_name()
            .with(eq("BASIC"))
            .returning(|_| {
                let plan = sample_plan(30);
                Box::pin(async move { Ok(Some(plan)) })
            });

        let mut approval_repo = MockApprovalRepository::new();
        approval_repo
            .expect_commit_approval()
            .withf(move |id, _, _, grant| {
                *id == submission_id
                    && grant.user_id == user_id
                    && grant.plan == "BASIC"
                    && grant.duration_days == 30
            })
            .returning(move |_, _, _, _| {
                let mut committed = submission.clone();
                committed.status = "APPROVED".to_string();
                Box::pin(async move { Ok(ReviewCommit::Committed(committed)) })
            });

        let usecase = usecase(submission_repo, plan_repo, approval_repo);

        let view = usecase
            .approve(submission_id, Uuid::new_v4(), None)
            .await
            .unwrap();

        let days_out = (view.access_expires_at - Utc::now()).num_days();
        assert!((29..=30).contains(&days_out));
    }

    #[tokio::test]
    async fn approve_conflicts_on_processed_submission() {
        let submission = sample_submission("APPROVED");
        let submission_id = submission.id;

        let mut submission_repo = MockSubmissionRepository::new();
        submission_repo.expect_find_by_id().returning(move |_| {
            let submission = submission.clone();
            Box::pin(async move { Ok(Some(submission)) })
        });

        let usecase = usecase(
            submission_repo,
            MockPlanMetaRepository::new(),
            MockApprovalRepository::new(),
        );

        let err = usecase
            .approve(submission_id, Uuid::new_v4(), None)
            .await
            .unwrap_err();

        assert!(matches!(err, ApprovalError::AlreadyApproved));
        assert_eq!(err.status_code(), axum::http::StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn approve_conflicts_on_rejected_submission() {
        let submission = sample_submission("REJECTED");
        let submission_id = submission.id;

        let mut submission_repo = MockSubmissionRepository::new();
        submission_repo.expect_find_by_id().returning(move |_| {
            let submission = submission.clone();
            Box::pin(async move { Ok(Some(submission)) })
        });

        let usecase = usecase(
            submission_repo,
            MockPlanMetaRepository::new(),
            MockApprovalRepository::new(),
        );

        let err = usecase
            .approve(submission_id, Uuid::new_v4(), None)
            .await
            .unwrap_err();

        assert!(matches!(err, ApprovalError::AlreadyRejected));
        assert_eq!(err.status_code(), axum::http::StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn approve_rejects_inactive_plan() {
        let submission = sample_submission("PENDING");
        let submission_id = submission.id;

        let mut submission_repo = MockSubmissionRepository::new();
        submission_repo.expect_find_by_id().returning(move |_| {
            let submission = submission.clone();
            Box::pin(async move { Ok(Some(submission)) })
        });

        let mut plan_repo = MockPlanMetaRepository::new();
        plan_repo
            .expect_find_active_by_name()
            .returning(|_| Box::pin(async { Ok(None) }));

        let usecase = usecase(submission_repo, plan_repo, MockApprovalRepository::new());

        let err = usecase
            .approve(submission_id, Uuid::new_v4(), None)
            .await
            .unwrap_err();

        assert!(matches!(err, ApprovalError::PlanUnavailable(_)));
        assert_eq!(
            err.status_code(),
            axum::http::StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[tokio::test]
    async fn approve_surfaces_a_lost_race_as_conflict() {
        let submission = sample_submission("PENDING");
        let submission_id = submission.id;

        let mut submission_repo = MockSubmissionRepository::new();
        submission_repo.expect_find_by_id().returning(move |_| {
            let submission = submission.clone();
            Box::pin(async move { Ok(Some(submission)) })
        });

        let mut plan_repo = MockPlanMetaRepository::new();
        plan_repo.expect_find_active_by_name().returning(|_| {
            let plan = sample_plan(30);
            Box::pin(async move { Ok(Some(plan)) })
        });

        let mut approval_repo = MockApprovalRepository::new();
        approval_repo
            .expect_commit_approval()
            .returning(|_, _, _, _| Box::pin(async { Ok(ReviewCommit::LostRace) }));

        let usecase = usecase(submission_repo, plan_repo, approval_repo);

        let err = usecase
            .approve(submission_id, Uuid::new_v4(), None)
            .await
            .unwrap_err();

        assert!(matches!(err, ApprovalError::LostRace));
        assert_eq!(err.status_code(), axum::http::StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn reject_is_idempotent_on_rejected_submission() {
        let submission = sample_submission("REJECTED");
        let submission_id = submission.id;

        let mut submission_repo = MockSubmissionRepository::new();
        submission_repo.expect_find_by_id().returning(move |_| {
            let submission = submission.clone();
            Box::pin(async move { Ok(Some(submission)) })
        });

        // No commit expectation: a second rejection must not touch the store.
        let usecase = usecase(
            submission_repo,
            MockPlanMetaRepository::new(),
            MockApprovalRepository::new(),
        );

        let view = usecase
            .reject(submission_id, Uuid::new_v4(), None)
            .await
            .unwrap();

        assert_eq!(view.submission.status, "REJECTED");
    }

    #[tokio::test]
    async fn reject_refuses_approved_submission() {
        let submission = sample_submission("APPROVED");
        let submission_id = submission.id;

        let mut submission_repo = MockSubmissionRepository::new();
        submission_repo.expect_find_by_id().returning(move |_| {
            let submission = submission.clone();
            Box::pin(async move { Ok(Some(submission)) })
        });

        let usecase = usecase(
            submission_repo,
            MockPlanMetaRepository::new(),
            MockApprovalRepository::new(),
        );

        let err = usecase
            .reject(submission_id, Uuid::new_v4(), None)
            .await
            .unwrap_err();

        assert!(matches!(err, ApprovalError::RejectAfterApprove));
        assert_eq!(err.status_code(), axum::http::StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn approve_missing_submission_is_not_found() {
        let mut submission_repo = MockSubmissionRepository::new();
        submission_repo
            .expect_find_by_id()
            .returning(|_| Box::pin(async { Ok(None) }));

        let usecase = usecase(
            submission_repo,
            MockPlanMetaRepository::new(),
            MockApprovalRepository::new(),
        );

        let err = usecase
            .approve(Uuid::new_v4(), Uuid::new_v4(), None)
            .await
            .unwrap_err();

        assert!(matches!(err, ApprovalError::SubmissionNotFound));
        assert_eq!(err.status_code(), axum::http::StatusCode::NOT_FOUND);
    }
}
