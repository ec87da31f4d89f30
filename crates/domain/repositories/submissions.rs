use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::{
    entities::{
        notifications::InsertNotificationEntity,
        submissions::{InsertSubmissionEntity, SubmissionEntity},
    },
    value_objects::submissions::PendingReviewView,
};

/// Outcome of the guarded pending insert.
#[derive(Debug, Clone)]
pub enum SubmissionCreation {
    Created(SubmissionEntity),
    /// The user already has a submission sitting in PENDING.
    PendingExists,
}

#[async_trait]
#[automock]
pub trait SubmissionRepository {
    /// Inserts the submission, flips the user caches to VERIFYING/PENDING and
    /// writes the admin notification, all in one transaction. The user row is
    /// locked first so two concurrent submits cannot both pass the pending
    /// check.
    async fn create_pending(
        &self,
        entity: InsertSubmissionEntity,
        notification: InsertNotificationEntity,
    ) -> Result<SubmissionCreation>;

    async fn find_by_id(&self, submission_id: Uuid) -> Result<Option<SubmissionEntity>>;

    async fn latest_for_user(&self, user_id: Uuid) -> Result<Option<SubmissionEntity>>;

    /// Review queue, newest first, joined with the submitting member.
    async fn list_pending(&self) -> Result<Vec<PendingReviewView>>;
}
