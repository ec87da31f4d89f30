use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::domain::{
    entities::{
        submissions::SubmissionEntity,
        users::{EditUserEntity, UserEntity},
    },
    value_objects::{grants::PreapprovedGrant, users::NewUser},
};

/// Outcome of an insert guarded by an in-transaction email check.
#[derive(Debug, Clone)]
pub enum UserRegistration {
    Created(UserEntity),
    EmailTaken,
}

#[async_trait]
#[automock]
pub trait UserRepository {
    /// Assigns the next member number and inserts the row in one transaction.
    async fn register(&self, new_user: NewUser) -> Result<UserRegistration>;

    /// Registration performed by an admin. When a grant is supplied the
    /// account comes out already approved: the matching submission, grant and
    /// cache fields are written in the same transaction.
    async fn register_approved(
        &self,
        new_user: NewUser,
        payment_method: Option<String>,
        grant: Option<PreapprovedGrant>,
    ) -> Result<UserRegistration>;

    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<UserEntity>>;

    async fn find_by_email(&self, email: &str) -> Result<Option<UserEntity>>;

    /// None clears the stored hash (logout).
    async fn store_refresh_token_hash(
        &self,
        user_id: Uuid,
        token_hash: Option<String>,
    ) -> Result<()>;

    async fn store_reset_token(
        &self,
        user_id: Uuid,
        token_hash: String,
        expires_at: DateTime<Utc>,
    ) -> Result<()>;

    /// Candidates for a reset-token match. Tokens are stored salted, so the
    /// caller has to verify each one.
    async fn list_with_active_reset_tokens(&self, now: DateTime<Utc>) -> Result<Vec<UserEntity>>;

    /// Swaps the password and burns the reset token.
    async fn reset_password(&self, user_id: Uuid, password_hash: String) -> Result<()>;

    /// Write-once. Returns false when the column is already set.
    async fn set_account_number(&self, user_id: Uuid, account_number: String) -> Result<bool>;

    /// Drops the cached statuses so an expired account stops passing the
    /// active check before the sweeper gets to it.
    async fn demote_expired_approval(&self, user_id: Uuid) -> Result<()>;

    /// Returns None when the user does not exist.
    async fn update_profile(
        &self,
        user_id: Uuid,
        changes: EditUserEntity,
    ) -> Result<Option<UserEntity>>;

    /// Returns false when the user does not exist.
    async fn soft_delete(&self, user_id: Uuid) -> Result<bool>;

    /// All members, newest first, each with their newest submission.
    async fn list_with_latest_submission(
        &self,
    ) -> Result<Vec<(UserEntity, Option<SubmissionEntity>)>>;
}
