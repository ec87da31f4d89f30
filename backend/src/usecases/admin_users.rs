use std::sync::Arc;

use chrono::{Duration, Utc};
use crates::domain::{
    entities::admin_logs::InsertAdminLogEntity,
    repositories::{
        admin_logs::AdminLogRepository,
        grants::{GrantRepository, GrantRevocation},
        plan_meta::PlanMetaRepository,
        users::{UserRegistration, UserRepository},
    },
    value_objects::{
        admin_logs::{
            ACTION_CREATE_USER, ACTION_DELETE_USER, ACTION_REVOKE_GRANT, ACTION_UPDATE_USER,
            user_action,
        },
        enums::submission_statuses::SubmissionStatus,
        grants::{GrantModel, PreapprovedGrant},
        submissions::LatestSubmissionBrief,
        users::{AdminCreateUserModel, AdminUpdateUserModel, NewUser, UserAdminView, UserProfileModel},
    },
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::auth;

#[derive(Debug, Error)]
pub enum AdminUserError {
    #[error("email is already in use")]
    EmailTaken,
    #[error("user not found")]
    UserNotFound,
    #[error("grant not found")]
    GrantNotFound,
    #[error("plan {0} is not available")]
    PlanUnavailable(String),
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AdminUserError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            AdminUserError::EmailTaken => StatusCode::CONFLICT,
            AdminUserError::UserNotFound | AdminUserError::GrantNotFound => StatusCode::NOT_FOUND,
            AdminUserError::PlanUnavailable(_) | AdminUserError::Validation(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AdminUserError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, AdminUserError>;

#[derive(Debug, Clone, Serialize)]
pub struct RevokedGrantView {
    pub message: String,
    pub grant: GrantModel,
}

pub struct AdminUserUseCase<U, P, G, L>
where
    U: UserRepository + Send + Sync + 'static,
    P: PlanMetaRepository + Send + Sync + 'static,
    G: GrantRepository + Send + Sync + 'static,
    L: AdminLogRepository + Send + Sync + 'static,
{
    user_repo: Arc<U>,
    plan_repo: Arc<P>,
    grant_repo: Arc<G>,
    admin_log_repo: Arc<L>,
}

impl<U, P, G, L> AdminUserUseCase<U, P, G, L>
where
    U: UserRepository + Send + Sync + 'static,
    P: PlanMetaRepository + Send + Sync + 'static,
    G: GrantRepository + Send + Sync + 'static,
    L: AdminLogRepository + Send + Sync + 'static,
{
    pub fn new(
        user_repo: Arc<U>,
        plan_repo: Arc<P>,
        grant_repo: Arc<G>,
        admin_log_repo: Arc<L>,
    ) -> Self {
        Self {
            user_repo,
            plan_repo,
            grant_repo,
            admin_log_repo,
        }
    }

    /// Creates a member account. With a plan attached the account comes out
    /// already approved: the synthetic submission and the grant land in the
    /// same transaction as the user row.
    pub async fn create_user(
        &self,
        admin_id: Uuid,
        payload: AdminCreateUserModel,
    ) -> UseCaseResult<UserProfileModel> {
        let email = payload.email.trim().to_lowercase();
        if !email.contains('@') {
            return Err(AdminUserError::Validation(
                "A valid email address is required".to_string(),
            ));
        }
        if payload.password.len() < 8 {
            return Err(AdminUserError::Validation(
                "Password must be at least 8 characters".to_string(),
            ));
        }

        let payment_method = match payload.payment_method.as_deref() {
            Some(method) => Some(parse_payment_method(method)?),
            None => None,
        };

        let plan_name = payload
            .plan
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_uppercase);

        let grant = match plan_name {
            Some(plan_name) => Some(self.preapproval_for(admin_id, &plan_name).await?),
            None => None,
        };

        let password_hash = auth::hash_secret(&payload.password)?;
        let new_user = NewUser {
            email,
            password_hash,
            name: payload.name.clone(),
            phone: payload.phone.clone(),
        };

        let note = grant
            .as_ref()
            .map(|grant| format!("Pre-approved on plan {}", grant.plan));

        let registration = self
            .user_repo
            .register_approved(new_user, payment_method, grant)
            .await
            .map_err(|err| {
                error!(db_error = ?err, "admin_users: failed to create user");
                AdminUserError::Internal(err)
            })?;

        match registration {
            UserRegistration::Created(user) => {
                info!(
                    %admin_id,
                    user_id = %user.id,
                    user_number = user.user_number,
                    "admin_users: user created"
                );
                self.audit(user_action(admin_id, ACTION_CREATE_USER, user.id, note))
                    .await;
                Ok(UserProfileModel::from(user))
            }
            UserRegistration::EmailTaken => {
                let err = AdminUserError::EmailTaken;
                warn!(
                    %admin_id,
                    status = err.status_code().as_u16(),
                    "admin_users: create hit an existing email"
                );
                Err(err)
            }
        }
    }

    pub async fn update_user(
        &self,
        admin_id: Uuid,
        user_id: Uuid,
        payload: AdminUpdateUserModel,
    ) -> UseCaseResult<UserProfileModel> {
        if let Some(email) = &payload.email {
            if !email.trim().contains('@') {
                return Err(AdminUserError::Validation(
                    "A valid email address is required".to_string(),
                ));
            }
        }

        let password_hash = match payload.password.as_deref() {
            Some(password) if password.len() < 8 => {
                return Err(AdminUserError::Validation(
                    "Password must be at least 8 characters".to_string(),
                ));
            }
            Some(password) => Some(auth::hash_secret(password)?),
            None => None,
        };

        let updated = self
            .user_repo
            .update_profile(user_id, payload.to_entity(password_hash))
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "admin_users: failed to update user");
                AdminUserError::Internal(err)
            })?
            .ok_or(AdminUserError::UserNotFound)?;

        info!(%admin_id, %user_id, "admin_users: user updated");
        self.audit(user_action(admin_id, ACTION_UPDATE_USER, user_id, None))
            .await;

        Ok(UserProfileModel::from(updated))
    }

    pub async fn delete_user(&self, admin_id: Uuid, user_id: Uuid) -> UseCaseResult<String> {
        let deleted = self.user_repo.soft_delete(user_id).await.map_err(|err| {
            error!(%user_id, db_error = ?err, "admin_users: failed to delete user");
            AdminUserError::Internal(err)
        })?;

        if !deleted {
            return Err(AdminUserError::UserNotFound);
        }

        info!(%admin_id, %user_id, "admin_users: user deactivated");
        self.audit(user_action(admin_id, ACTION_DELETE_USER, user_id, None))
            .await;

        Ok("User deactivated.".to_string())
    }

    /// Member table, newest first. A status filter keys off each user's
    /// latest submission only; users without submissions drop out of every
    /// filtered view.
    pub async fn list_users(&self, status: Option<String>) -> UseCaseResult<Vec<UserAdminView>> {
        let filter = match status.as_deref().map(str::trim) {
            Some(raw) => Some(SubmissionStatus::from_str(&raw.to_uppercase()).ok_or_else(
                || AdminUserError::Validation(format!("Unknown status filter: {}", raw)),
            )?),
            None => None,
        };

        let rows = self
            .user_repo
            .list_with_latest_submission()
            .await
            .map_err(|err| {
                error!(db_error = ?err, "admin_users: failed to list users");
                AdminUserError::Internal(err)
            })?;

        let views: Vec<UserAdminView> = rows
            .into_iter()
            .filter(|(_, latest)| match filter {
                Some(wanted) => latest
                    .as_ref()
                    .is_some_and(|submission| submission.status == wanted.as_str()),
                None => true,
            })
            .map(|(user, latest)| {
                UserAdminView::from_entity(user, latest.map(LatestSubmissionBrief::from))
            })
            .collect();

        info!(user_count = views.len(), "admin_users: users listed");
        Ok(views)
    }

    /// Full grant history for one member, newest approval first.
    pub async fn user_grants(&self, user_id: Uuid) -> UseCaseResult<Vec<GrantModel>> {
        self.user_repo
            .find_by_id(user_id)
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "admin_users: failed to load user");
                AdminUserError::Internal(err)
            })?
            .ok_or(AdminUserError::UserNotFound)?;

        let grants = self.grant_repo.list_for_user(user_id).await.map_err(|err| {
            error!(%user_id, db_error = ?err, "admin_users: failed to list grants");
            AdminUserError::Internal(err)
        })?;

        Ok(grants.into_iter().map(GrantModel::from).collect())
    }

    pub async fn revoke_grant(
        &self,
        admin_id: Uuid,
        grant_id: Uuid,
    ) -> UseCaseResult<RevokedGrantView> {
        let revocation = self
            .grant_repo
            .revoke(grant_id, Utc::now())
            .await
            .map_err(|err| {
                error!(%grant_id, db_error = ?err, "admin_users: failed to revoke grant");
                AdminUserError::Internal(err)
            })?;

        match revocation {
            GrantRevocation::Revoked(grant) => {
                info!(%admin_id, %grant_id, user_id = %grant.user_id, "admin_users: grant revoked");
                self.audit(user_action(
                    admin_id,
                    ACTION_REVOKE_GRANT,
                    grant.user_id,
                    Some(format!("Revoked grant on plan {}", grant.plan)),
                ))
                .await;
                Ok(RevokedGrantView {
                    message: "Grant revoked.".to_string(),
                    grant: GrantModel::from(grant),
                })
            }
            GrantRevocation::AlreadyRevoked(grant) => {
                // Idempotent: the earlier revocation stands, no second audit row.
                info!(%admin_id, %grant_id, "admin_users: grant was already revoked");
                Ok(RevokedGrantView {
                    message: "Grant was already revoked.".to_string(),
                    grant: GrantModel::from(grant),
                })
            }
            GrantRevocation::NotFound => Err(AdminUserError::GrantNotFound),
        }
    }

    /// Snapshot of the tier being granted, frozen at creation time. Catalog
    /// edits after this point must not reach the member.
    async fn preapproval_for(
        &self,
        admin_id: Uuid,
        plan_name: &str,
    ) -> UseCaseResult<PreapprovedGrant> {
        let plan = self
            .plan_repo
            .find_active_by_name(plan_name)
            .await
            .map_err(|err| {
                error!(plan = %plan_name, db_error = ?err, "admin_users: failed to load plan");
                AdminUserError::Internal(err)
            })?
            .ok_or_else(|| AdminUserError::PlanUnavailable(plan_name.to_string()))?;

        let now = Utc::now();
        Ok(PreapprovedGrant {
            plan: plan.name.clone(),
            label: plan.label.clone(),
            features: plan.features.to_value(),
            price: plan.price,
            duration_days: plan.duration_days,
            approved_by: admin_id,
            approved_at: now,
            expires_at: now + Duration::days(i64::from(plan.duration_days)),
        })
    }

    /// The account write has already committed at this point. A failed audit
    /// insert is logged and does not fail the call.
    async fn audit(&self, entry: InsertAdminLogEntity) {
        if let Err(err) = self.admin_log_repo.append(entry).await {
            error!(db_error = ?err, "admin_users: failed to append audit row");
        }
    }
}

fn parse_payment_method(method: &str) -> UseCaseResult<String> {
    use crates::domain::value_objects::enums::payment_methods::PaymentMethod;

    PaymentMethod::from_str(method.trim().to_uppercase().as_str())
        .map(|method| method.as_str().to_string())
        .ok_or_else(|| AdminUserError::Validation(format!("Unknown payment method: {}", method)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crates::domain::{
        entities::{plan_meta::PlanMetaEntity, submissions::SubmissionEntity, users::UserEntity},
        repositories::{
            admin_logs::MockAdminLogRepository, grants::MockGrantRepository,
            plan_meta::MockPlanMetaRepository, users::MockUserRepository,
        },
        value_objects::plan_features::PlanFeatures,
    };
    use serde_json::json;

    fn sample_user(email: &str) -> UserEntity {
        let now = Utc::now();
        UserEntity {
            id: Uuid::new_v4(),
            user_number: 80_002,
            email: email.to_string(),
            password_hash: "hash".to_string(),
            name: None,
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

    fn sample_plan(name: &str) -> PlanMetaEntity {
        let now = Utc::now();
        PlanMetaEntity {
            id: Uuid::new_v4(),
            name: name.to_string(),
            label: format!("{name} plan"),
            description: None,
            price: 9900,
            duration_days: 30,
            features: PlanFeatures::from_value(json!({"SIGNAL_CHARTS": true})),
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

    fn pending_submission(user_id: Uuid) -> SubmissionEntity {
        SubmissionEntity {
            id: Uuid::new_v4(),
            user_id,
            plan: "BASIC".to_string(),
            payment_method: "BANK_TRANSFER".to_string(),
            proof_path: Some("/proofs/slip.png".to_string()),
            proof_name: Some("slip.png".to_string()),
            status: "PENDING".to_string(),
            admin_note: None,
            reviewed_by: None,
            reviewed_at: None,
            created_at: Utc::now(),
        }
    }

    fn create_payload(plan: Option<&str>) -> AdminCreateUserModel {
        AdminCreateUserModel {
            email: "New.Member@Example.com".to_string(),
            password: "longenough".to_string(),
            name: Some("New Member".to_string()),
            phone: None,
            plan: plan.map(str::to_string),
            payment_method: plan.map(|_| "bank_transfer".to_string()),
        }
    }

    #[tokio::test]
    async fn create_user_with_plan_passes_a_frozen_grant_snapshot() {
        let admin_id = Uuid::new_v4();

        let mut user_repo = MockUserRepository::new();
        user_repo
            .expect_register_approved()
            .withf(|new_user, payment_method, grant| {
                let grant = match grant {
                    Some(grant) => grant,
                    None => return false,
                };
                new_user.email == "new.member@example.com"
                    && payment_method.as_deref() == Some("BANK_TRANSFER")
                    && grant.plan == "PRO"
                    && grant.price == 9900
                    && grant.duration_days == 30
                    && grant.features == json!({"SIGNAL_CHARTS": true})
            })
            .times(1)
            .returning(|new_user, _, _| {
                let user = sample_user(&new_user.email);
                Box::pin(async move { Ok(UserRegistration::Created(user)) })
            });

        let mut plan_repo = MockPlanMetaRepository::new();
        plan_repo
            .expect_find_active_by_name()
            .returning(|_| Box::pin(async { Ok(Some(sample_plan("PRO"))) }));

        let mut admin_log_repo = MockAdminLogRepository::new();
        admin_log_repo
            .expect_append()
            .withf(|entry| {
                entry.action == ACTION_CREATE_USER
                    && entry.note.as_deref() == Some("Pre-approved on plan PRO")
            })
            .times(1)
            .returning(|_| Box::pin(async { Ok(Uuid::new_v4()) }));

        let usecase = AdminUserUseCase::new(
            Arc::new(user_repo),
            Arc::new(plan_repo),
            Arc::new(MockGrantRepository::new()),
            Arc::new(admin_log_repo),
        );

        let profile = usecase
            .create_user(admin_id, create_payload(Some("pro")))
            .await
            .unwrap();

        assert_eq!(profile.email, "new.member@example.com");
    }

    #[tokio::test]
    async fn create_user_rejects_an_inactive_plan() {
        let mut plan_repo = MockPlanMetaRepository::new();
        plan_repo
            .expect_find_active_by_name()
            .returning(|_| Box::pin(async { Ok(None) }));

        let usecase = AdminUserUseCase::new(
            Arc::new(MockUserRepository::new()),
            Arc::new(plan_repo),
            Arc::new(MockGrantRepository::new()),
            Arc::new(MockAdminLogRepository::new()),
        );

        let err = usecase
            .create_user(Uuid::new_v4(), create_payload(Some("VIP")))
            .await
            .unwrap_err();

        assert!(matches!(err, AdminUserError::PlanUnavailable(_)));
        assert_eq!(err.status_code(), axum::http::StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn create_user_surfaces_a_taken_email() {
        let mut user_repo = MockUserRepository::new();
        user_repo
            .expect_register_approved()
            .returning(|_, _, _| Box::pin(async { Ok(UserRegistration::EmailTaken) }));

        let usecase = AdminUserUseCase::new(
            Arc::new(user_repo),
            Arc::new(MockPlanMetaRepository::new()),
            Arc::new(MockGrantRepository::new()),
            Arc::new(MockAdminLogRepository::new()),
        );

        let err = usecase
            .create_user(Uuid::new_v4(), create_payload(None))
            .await
            .unwrap_err();

        assert!(matches!(err, AdminUserError::EmailTaken));
    }

    #[tokio::test]
    async fn update_missing_user_is_not_found() {
        let mut user_repo = MockUserRepository::new();
        user_repo
            .expect_update_profile()
            .returning(|_, _| Box::pin(async { Ok(None) }));

        let usecase = AdminUserUseCase::new(
            Arc::new(user_repo),
            Arc::new(MockPlanMetaRepository::new()),
            Arc::new(MockGrantRepository::new()),
            Arc::new(MockAdminLogRepository::new()),
        );

        let payload = AdminUpdateUserModel {
            email: None,
            name: Some("Renamed".to_string()),
            phone: None,
            password: None,
        };

        let err = usecase
            .update_user(Uuid::new_v4(), Uuid::new_v4(), payload)
            .await
            .unwrap_err();

        assert!(matches!(err, AdminUserError::UserNotFound));
    }

    #[tokio::test]
    async fn list_users_filters_on_the_latest_submission_only() {
        let with_pending = sample_user("pending@example.com");
        let pending = pending_submission(with_pending.id);
        let without_submission = sample_user("quiet@example.com");

        let mut user_repo = MockUserRepository::new();
        user_repo.expect_list_with_latest_submission().returning(move || {
            let rows = vec![
                (with_pending.clone(), Some(pending.clone())),
                (without_submission.clone(), None),
            ];
            Box::pin(async move { Ok(rows) })
        });

        let usecase = AdminUserUseCase::new(
            Arc::new(user_repo),
            Arc::new(MockPlanMetaRepository::new()),
            Arc::new(MockGrantRepository::new()),
            Arc::new(MockAdminLogRepository::new()),
        );

        let all = usecase.list_users(None).await.unwrap();
        assert_eq!(all.len(), 2);

        let pending_only = usecase.list_users(Some("pending".to_string())).await.unwrap();
        assert_eq!(pending_only.len(), 1);
        assert_eq!(pending_only[0].email, "pending@example.com");

        let err = usecase
            .list_users(Some("EVERYTHING".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, AdminUserError::Validation(_)));
    }

    #[tokio::test]
    async fn revoke_grant_is_idempotent() {
        let user_id = Uuid::new_v4();
        let grant_id = Uuid::new_v4();

        let mut grant_repo = MockGrantRepository::new();
        let mut revoked = crates::domain::entities::grants::GrantEntity {
            id: grant_id,
            user_id,
            plan: "PRO".to_string(),
            label: "PRO plan".to_string(),
            features: PlanFeatures::default(),
            price: 9900,
            duration_days: 30,
            approved_by: Uuid::new_v4(),
            approved_at: Utc::now(),
            expires_at: Utc::now() + Duration::days(30),
            revoked_at: None,
            created_at: Utc::now(),
        };
        revoked.revoked_at = Some(Utc::now());
        grant_repo.expect_revoke().returning(move |_, _| {
            let grant = revoked.clone();
            Box::pin(async move { Ok(GrantRevocation::AlreadyRevoked(grant)) })
        });

        // No audit expectation: a repeat revocation must not append a row.
        let usecase = AdminUserUseCase::new(
            Arc::new(MockUserRepository::new()),
            Arc::new(MockPlanMetaRepository::new()),
            Arc::new(grant_repo),
            Arc::new(MockAdminLogRepository::new()),
        );

        let view = usecase.revoke_grant(Uuid::new_v4(), grant_id).await.unwrap();
        assert_eq!(view.message, "Grant was already revoked.");
        assert!(view.grant.revoked_at.is_some());
    }

    #[tokio::test]
    async fn revoke_missing_grant_is_not_found() {
        let mut grant_repo = MockGrantRepository::new();
        grant_repo
            .expect_revoke()
            .returning(|_, _| Box::pin(async { Ok(GrantRevocation::NotFound) }));

        let usecase = AdminUserUseCase::new(
            Arc::new(MockUserRepository::new()),
            Arc::new(MockPlanMetaRepository::new()),
            Arc::new(grant_repo),
            Arc::new(MockAdminLogRepository::new()),
        );

        let err = usecase
            .revoke_grant(Uuid::new_v4(), Uuid::new_v4())
            .await
            .unwrap_err();

        assert!(matches!(err, AdminUserError::GrantNotFound));
        assert_eq!(err.status_code(), axum::http::StatusCode::NOT_FOUND);
    }
}
