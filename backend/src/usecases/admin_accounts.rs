use std::sync::Arc;

use crates::domain::{
    repositories::admins::{AdminRegistration, AdminRepository},
    value_objects::{
        admins::NewAdmin,
        entitlements::NO_MEMBERSHIP,
    },
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    auth::{self, ROLE_ADMIN},
    config::config_model::AdminSecret,
};

#[derive(Debug, Error)]
pub enum AdminAccountError {
    #[error("email is already in use")]
    EmailTaken,
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AdminAccountError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            AdminAccountError::EmailTaken => StatusCode::CONFLICT,
            AdminAccountError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AdminAccountError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AdminAccountError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, AdminAccountError>;

#[derive(Debug, Clone, Serialize)]
pub struct AdminRegisteredView {
    pub message: String,
    pub id: Uuid,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminTokenView {
    pub access_token: String,
}

pub struct AdminAccountUseCase<A>
where
    A: AdminRepository + Send + Sync + 'static,
{
    admin_repo: Arc<A>,
    admin_secret: AdminSecret,
}

impl<A> AdminAccountUseCase<A>
where
    A: AdminRepository + Send + Sync + 'static,
{
    pub fn new(admin_repo: Arc<A>, admin_secret: AdminSecret) -> Self {
        Self {
            admin_repo,
            admin_secret,
        }
    }

    pub async fn register(
        &self,
        email: String,
        password: String,
    ) -> UseCaseResult<AdminRegisteredView> {
        let email = email.trim().to_lowercase();
        if !email.contains('@') {
            return Err(AdminAccountError::Validation(
                "A valid email is required".to_string(),
            ));
        }
        if password.chars().count() < 8 {
            return Err(AdminAccountError::Validation(
                "Password must be at least 8 characters".to_string(),
            ));
        }

        info!(%email, "admin_accounts: registering admin");

        let password_hash = auth::hash_secret(&password).map_err(|err| {
            error!(error = ?err, "admin_accounts: failed to hash password");
            AdminAccountError::Internal(err)
        })?;

        let registration = self
            .admin_repo
            .register(NewAdmin {
                email: email.clone(),
                password_hash,
            })
            .await
            .map_err(|err| {
                error!(db_error = ?err, "admin_accounts: failed to register admin");
                AdminAccountError::Internal(err)
            })?;

        match registration {
            AdminRegistration::Created(admin) => {
                info!(admin_id = %admin.id, "admin_accounts: admin registered");
                Ok(AdminRegisteredView {
                    message: "Admin account created.".to_string(),
                    id: admin.id,
                })
            }
            AdminRegistration::EmailTaken => {
                let err = AdminAccountError::EmailTaken;
                warn!(
                    %email,
                    status = err.status_code().as_u16(),
                    "admin_accounts: email already in use"
                );
                Err(err)
            }
        }
    }

    pub async fn login(&self, email: String, password: String) -> UseCaseResult<AdminTokenView> {
        let email = email.trim().to_lowercase();
        info!(%email, "admin_accounts: login requested");

        let admin = self.admin_repo.find_by_email(&email).await.map_err(|err| {
            error!(db_error = ?err, "admin_accounts: failed to load admin by email");
            AdminAccountError::Internal(err)
        })?;

        let admin = match admin {
            Some(admin) => admin,
            None => {
                let err = AdminAccountError::InvalidCredentials;
                warn!(
                    %email,
                    status = err.status_code().as_u16(),
                    "admin_accounts: unknown admin"
                );
                return Err(err);
            }
        };

        if !auth::verify_secret(&password, &admin.password_hash) {
            let err = AdminAccountError::InvalidCredentials;
            warn!(
                %email,
                status = err.status_code().as_u16(),
                "admin_accounts: wrong password"
            );
            return Err(err);
        }

        let access_token = auth::sign_token(
            admin.id,
            &admin.email,
            NO_MEMBERSHIP,
            ROLE_ADMIN,
            &self.admin_secret.secret,
            auth::ACCESS_TOKEN_TTL_SECS,
        )
        .map_err(|err| AdminAccountError::Internal(err.into()))?;

        info!(admin_id = %admin.id, "admin_accounts: login succeeded");

        Ok(AdminTokenView { access_token })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::ROLE_USER;
    use chrono::Utc;
    use crates::domain::{
        entities::admins::AdminEntity, repositories::admins::MockAdminRepository,
    };

    fn sample_admin(password_hash: &str) -> AdminEntity {
        AdminEntity {
            id: Uuid::new_v4(),
            email: "admin@example.com".to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        }
    }

    fn usecase(admin_repo: MockAdminRepository) -> AdminAccountUseCase<MockAdminRepository> {
        AdminAccountUseCase::new(
            Arc::new(admin_repo),
            AdminSecret {
                secret: "admin-secret".to_string(),
            },
        )
    }

    #[tokio::test]
    async fn login_issues_admin_role_token() {
        let password_hash = auth::hash_secret("password123").unwrap();
        let admin = sample_admin(&password_hash);
        let admin_id = admin.id;

        let mut admin_repo = MockAdminRepository::new();
        admin_repo.expect_find_by_email().returning(move |_| {
            let admin = admin.clone();
            Box::pin(async move { Ok(Some(admin)) })
        });

        let usecase = usecase(admin_repo);

        let view = usecase
            .login("admin@example.com".to_string(), "password123".to_string())
            .await
            .unwrap();

        let claims =
            auth::validate_token(&view.access_token, "admin-secret", ROLE_ADMIN).unwrap();
        assert_eq!(claims.sub, admin_id.to_string());
        assert_eq!(claims.role, ROLE_ADMIN);
    }

    #[tokio::test]
    async fn admin_token_fails_user_role_validation() {
        let password_hash = auth::hash_secret("password123").unwrap();
        let admin = sample_admin(&password_hash);

        let mut admin_repo = MockAdminRepository::new();
        admin_repo.expect_find_by_email().returning(move |_| {
            let admin = admin.clone();
            Box::pin(async move { Ok(Some(admin)) })
        });

        let usecase = usecase(admin_repo);

        let view = usecase
            .login("admin@example.com".to_string(), "password123".to_string())
            .await
            .unwrap();

        assert!(auth::validate_token(&view.access_token, "admin-secret", ROLE_USER).is_err());
    }

    #[tokio::test]
    async fn register_refuses_existing_email() {
        let mut admin_repo = MockAdminRepository::new();
        admin_repo
            .expect_register()
            .returning(|_| Box::pin(async { Ok(AdminRegistration::EmailTaken) }));

        let usecase = usecase(admin_repo);

        let err = usecase
            .register("admin@example.com".to_string(), "password123".to_string())
            .await
            .unwrap_err();

        assert!(matches!(err, AdminAccountError::EmailTaken));
    }

    #[tokio::test]
    async fn login_rejects_unknown_admin() {
        let mut admin_repo = MockAdminRepository::new();
        admin_repo
            .expect_find_by_email()
            .returning(|_| Box::pin(async { Ok(None) }));

        let usecase = usecase(admin_repo);

        let err = usecase
            .login("nobody@example.com".to_string(), "password123".to_string())
            .await
            .unwrap_err();

        assert!(matches!(err, AdminAccountError::InvalidCredentials));
        assert_eq!(err.status_code(), axum::http::StatusCode::UNAUTHORIZED);
    }
}
