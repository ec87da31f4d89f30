use std::sync::Arc;

use chrono::{Duration, Utc};
use crates::domain::{
    repositories::{
        grants::GrantRepository,
        users::{UserRegistration, UserRepository},
    },
    value_objects::{
        entitlements::{self, NO_MEMBERSHIP},
        enums::{approval_statuses::ApprovalStatus, payment_statuses::PaymentStatus},
        users::{
            ForgotPasswordModel, LoginModel, NewUser, RegisterUserModel, ResetPasswordModel,
            UserProfileModel,
        },
    },
};
use rand::{Rng, distributions::Alphanumeric};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    auth::{self, ROLE_USER},
    config::config_model::UserSecret,
};

pub const RESET_TOKEN_TTL_MINUTES: i64 = 15;
const RESET_TOKEN_LENGTH: usize = 48;

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("email is already in use")]
    EmailTaken,
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("invalid or expired token")]
    InvalidToken,
    #[error("no account for this email")]
    EmailNotFound,
    #[error("user not found")]
    UserNotFound,
    #[error("account number is already set")]
    AccountNumberTaken,
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AccountError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            AccountError::EmailTaken | AccountError::AccountNumberTaken => StatusCode::CONFLICT,
            AccountError::InvalidCredentials | AccountError::InvalidToken => {
                StatusCode::UNAUTHORIZED
            }
            AccountError::EmailNotFound | AccountError::UserNotFound => StatusCode::NOT_FOUND,
            AccountError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AccountError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, AccountError>;

#[derive(Debug, Clone, Serialize)]
pub struct RegisteredView {
    pub message: String,
    pub user_number: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenPairView {
    pub access_token: String,
    pub refresh_token: String,
    pub user: UserProfileModel,
}

#[derive(Debug, Clone, Serialize)]
pub struct AccessTokenView {
    pub access_token: String,
}

/// The reset token goes back to the caller directly. Mail delivery is a
/// frontend concern in this deployment.
#[derive(Debug, Clone, Serialize)]
pub struct ResetTokenView {
    pub message: String,
    pub reset_token: String,
}

pub struct AccountUseCase<U, G>
where
    U: UserRepository + Send + Sync + 'static,
    G: GrantRepository + Send + Sync + 'static,
{
    user_repo: Arc<U>,
    grant_repo: Arc<G>,
    user_secret: UserSecret,
}

impl<U, G> AccountUseCase<U, G>
where
    U: UserRepository + Send + Sync + 'static,
    G: GrantRepository + Send + Sync + 'static,
{
    pub fn new(user_repo: Arc<U>, grant_repo: Arc<G>, user_secret: UserSecret) -> Self {
        Self {
            user_repo,
            grant_repo,
            user_secret,
        }
    }

    pub async fn register(&self, payload: RegisterUserModel) -> UseCaseResult<RegisteredView> {
        let email = payload.email.trim().to_lowercase();
        if !email.contains('@') {
            return Err(AccountError::Validation(
                "A valid email is required".to_string(),
            ));
        }
        if payload.password.chars().count() < 8 {
            return Err(AccountError::Validation(
                "Password must be at least 8 characters".to_string(),
            ));
        }

        info!(%email, "accounts: registering new user");

        let password_hash = auth::hash_secret(&payload.password).map_err(|err| {
            error!(error = ?err, "accounts: failed to hash password");
            AccountError::Internal(err)
        })?;

        let new_user = NewUser {
            email: email.clone(),
            password_hash,
            name: payload.name,
            phone: payload.phone,
        };

        let registration = self.user_repo.register(new_user).await.map_err(|err| {
            error!(db_error = ?err, "accounts: failed to register user");
            AccountError::Internal(err)
        })?;

        match registration {
            UserRegistration::Created(user) => {
                info!(user_number = user.user_number, "accounts: user registered");
                Ok(RegisteredView {
                    message: "Registration completed. Submit a plan payment to activate your membership.".to_string(),
                    user_number: user.user_number,
                })
            }
            UserRegistration::EmailTaken => {
                let err = AccountError::EmailTaken;
                warn!(
                    %email,
                    status = err.status_code().as_u16(),
                    "accounts: email already in use"
                );
                Err(err)
            }
        }
    }

    pub async fn login(&self, payload: LoginModel) -> UseCaseResult<TokenPairView> {
        let email = payload.email.trim().to_lowercase();
        info!(%email, "accounts: login requested");

        let user = self.user_repo.find_by_email(&email).await.map_err(|err| {
            error!(db_error = ?err, "accounts: failed to load user by email");
            AccountError::Internal(err)
        })?;

        let mut user = match user {
            Some(user) if !user.is_deleted => user,
            _ => {
                let err = AccountError::InvalidCredentials;
                warn!(
                    %email,
                    status = err.status_code().as_u16(),
                    "accounts: unknown or deactivated account"
                );
                return Err(err);
            }
        };

        if !auth::verify_secret(&payload.password, &user.password_hash) {
            let err = AccountError::InvalidCredentials;
            warn!(
                %email,
                status = err.status_code().as_u16(),
                "accounts: wrong password"
            );
            return Err(err);
        }

        let now = Utc::now();

        // Same demotion rule the sweeper applies, done opportunistically so a
        // lapsed member sees the expired state on their very next login.
        if entitlements::is_expired(&user, now)
            && ApprovalStatus::from_str(&user.approval_status) == Some(ApprovalStatus::Approved)
        {
            self.user_repo
                .demote_expired_approval(user.id)
                .await
                .map_err(|err| {
                    error!(
                        user_id = %user.id,
                        db_error = ?err,
                        "accounts: failed to demote expired approval"
                    );
                    AccountError::Internal(err)
                })?;

            user.payment_status = PaymentStatus::None.to_string();
            user.approval_status = ApprovalStatus::None.to_string();
            info!(user_id = %user.id, "accounts: expired approval demoted on login");
        }

        let plan = self
            .grant_repo
            .find_active_for_user(user.id, now)
            .await
            .map_err(|err| {
                error!(
                    user_id = %user.id,
                    db_error = ?err,
                    "accounts: failed to load active grant"
                );
                AccountError::Internal(err)
            })?
            .map(|grant| grant.plan)
            .unwrap_or_else(|| NO_MEMBERSHIP.to_string());

        let access_token = auth::sign_token(
            user.id,
            &user.email,
            &plan,
            ROLE_USER,
            &self.user_secret.secret,
            auth::ACCESS_TOKEN_TTL_SECS,
        )
        .map_err(|err| AccountError::Internal(err.into()))?;

        let refresh_token = auth::sign_token(
            user.id,
            &user.email,
            &plan,
            ROLE_USER,
            &self.user_secret.refresh_secret,
            auth::REFRESH_TOKEN_TTL_SECS,
        )
        .map_err(|err| AccountError::Internal(err.into()))?;

        let refresh_hash = auth::hash_secret(&refresh_token).map_err(AccountError::Internal)?;
        self.user_repo
            .store_refresh_token_hash(user.id, Some(refresh_hash))
            .await
            .map_err(|err| {
                error!(
                    user_id = %user.id,
                    db_error = ?err,
                    "accounts: failed to store refresh token hash"
                );
                AccountError::Internal(err)
            })?;

        info!(user_id = %user.id, %plan, "accounts: login succeeded");

        Ok(TokenPairView {
            access_token,
            refresh_token,
            user: UserProfileModel::from(user),
        })
    }

    pub async fn refresh(&self, refresh_token: &str) -> UseCaseResult<AccessTokenView> {
        let claims = auth::validate_token(refresh_token, &self.user_secret.refresh_secret, ROLE_USER)
            .map_err(|_| AccountError::InvalidToken)?;

        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AccountError::InvalidToken)?;

        let user = self
            .user_repo
            .find_by_id(user_id)
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "accounts: failed to load user for refresh");
                AccountError::Internal(err)
            })?
            .filter(|user| !user.is_deleted)
            .ok_or(AccountError::InvalidToken)?;

        // The signature alone is not enough: logout burns the stored hash and
        // kills every previously issued refresh token.
        let stored_hash = match &user.refresh_token_hash {
            Some(hash) => hash,
            None => {
                let err = AccountError::InvalidToken;
                warn!(
                    %user_id,
                    status = err.status_code().as_u16(),
                    "accounts: refresh with no stored token"
                );
                return Err(err);
            }
        };

        if !auth::verify_secret(refresh_token, stored_hash) {
            let err = AccountError::InvalidToken;
            warn!(
                %user_id,
                status = err.status_code().as_u16(),
                "accounts: refresh token does not match stored hash"
            );
            return Err(err);
        }

        let plan = self
            .grant_repo
            .find_active_for_user(user.id, Utc::now())
            .await
            .map_err(|err| {
                error!(
                    %user_id,
                    db_error = ?err,
                    "accounts: failed to load active grant"
                );
                AccountError::Internal(err)
            })?
            .map(|grant| grant.plan)
            .unwrap_or_else(|| NO_MEMBERSHIP.to_string());

        let access_token = auth::sign_token(
            user.id,
            &user.email,
            &plan,
            ROLE_USER,
            &self.user_secret.secret,
            auth::ACCESS_TOKEN_TTL_SECS,
        )
        .map_err(|err| AccountError::Internal(err.into()))?;

        info!(%user_id, "accounts: access token refreshed");

        Ok(AccessTokenView { access_token })
    }

    pub async fn logout(&self, user_id: Uuid) -> UseCaseResult<String> {
        self.user_repo
            .store_refresh_token_hash(user_id, None)
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "accounts: failed to clear refresh token");
                AccountError::Internal(err)
            })?;

        info!(%user_id, "accounts: logged out");
        Ok("Logged out.".to_string())
    }

    pub async fn forgot_password(
        &self,
        payload: ForgotPasswordModel,
    ) -> UseCaseResult<ResetTokenView> {
        let email = payload.email.trim().to_lowercase();

        let user = self.user_repo.find_by_email(&email).await.map_err(|err| {
            error!(db_error = ?err, "accounts: failed to load user by email");
            AccountError::Internal(err)
        })?;

        let user = match user {
            Some(user) if !user.is_deleted => user,
            _ => {
                let err = AccountError::EmailNotFound;
                warn!(
                    %email,
                    status = err.status_code().as_u16(),
                    "accounts: forgot password for unknown email"
                );
                return Err(err);
            }
        };

        let reset_token = generate_opaque_token();
        let token_hash = auth::hash_secret(&reset_token).map_err(AccountError::Internal)?;
        let expires_at = Utc::now() + Duration::minutes(RESET_TOKEN_TTL_MINUTES);

        self.user_repo
            .store_reset_token(user.id, token_hash, expires_at)
            .await
            .map_err(|err| {
                error!(
                    user_id = %user.id,
                    db_error = ?err,
                    "accounts: failed to store reset token"
                );
                AccountError::Internal(err)
            })?;

        info!(user_id = %user.id, "accounts: reset token issued");

        Ok(ResetTokenView {
            message: format!(
                "Reset token issued. It expires in {} minutes.",
                RESET_TOKEN_TTL_MINUTES
            ),
            reset_token,
        })
    }

    pub async fn reset_password(&self, payload: ResetPasswordModel) -> UseCaseResult<String> {
        if payload.new_password.chars().count() < 8 {
            return Err(AccountError::Validation(
                "Password must be at least 8 characters".to_string(),
            ));
        }

        let candidates = self
            .user_repo
            .list_with_active_reset_tokens(Utc::now())
            .await
            .map_err(|err| {
                error!(db_error = ?err, "accounts: failed to load reset candidates");
                AccountError::Internal(err)
            })?;

        // Tokens are salted at rest, so every live hash has to be checked.
        let user = candidates.into_iter().find(|user| {
            user.reset_token_hash
                .as_deref()
                .is_some_and(|hash| auth::verify_secret(&payload.token, hash))
        });

        let user = match user {
            Some(user) => user,
            None => {
                let err = AccountError::InvalidToken;
                warn!(
                    status = err.status_code().as_u16(),
                    "accounts: reset token did not match any account"
                );
                return Err(err);
            }
        };

        let password_hash = auth::hash_secret(&payload.new_password).map_err(AccountError::Internal)?;

        self.user_repo
            .reset_password(user.id, password_hash)
            .await
            .map_err(|err| {
                error!(
                    user_id = %user.id,
                    db_error = ?err,
                    "accounts: failed to reset password"
                );
                AccountError::Internal(err)
            })?;

        info!(user_id = %user.id, "accounts: password reset");
        Ok("Password has been reset. Log in with the new password.".to_string())
    }

    pub async fn set_account_number(
        &self,
        user_id: Uuid,
        account_number: String,
    ) -> UseCaseResult<String> {
        let account_number = account_number.trim().to_string();
        if account_number.is_empty() {
            return Err(AccountError::Validation(
                "Account number must not be empty".to_string(),
            ));
        }

        let updated = self
            .user_repo
            .set_account_number(user_id, account_number)
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "accounts: failed to set account number");
                AccountError::Internal(err)
            })?;

        if !updated {
            // The write-once filter matched nothing: either the user is gone
            // or the column is already set.
            let user = self.user_repo.find_by_id(user_id).await.map_err(|err| {
                error!(%user_id, db_error = ?err, "accounts: failed to load user");
                AccountError::Internal(err)
            })?;

            let err = match user {
                Some(_) => AccountError::AccountNumberTaken,
                None => AccountError::UserNotFound,
            };
            warn!(
                %user_id,
                status = err.status_code().as_u16(),
                "accounts: account number not written"
            );
            return Err(err);
        }

        info!(%user_id, "accounts: account number saved");
        Ok("Account number saved.".to_string())
    }
}

fn generate_opaque_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(RESET_TOKEN_LENGTH)
        .map(char::from)
        .collect()
}
