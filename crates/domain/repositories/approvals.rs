use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::{grants::InsertGrantEntity, submissions::SubmissionEntity};

/// Outcome of the guarded review transaction. The `status = PENDING`
/// predicate on the flip is the optimistic lock: whoever hits zero affected
/// rows lost the race and must not write anything else.
#[derive(Debug, Clone)]
pub enum ReviewCommit {
    Committed(SubmissionEntity),
    LostRace,
}

#[async_trait]
#[automock]
pub trait ApprovalRepository {
    /// Single transaction: flip the submission out of PENDING, insert the
    /// grant snapshot, promote the user caches, resolve the matching unread
    /// notifications and append the audit row.
    async fn commit_approval(
        &self,
        submission_id: Uuid,
        admin_id: Uuid,
        note: Option<String>,
        grant: InsertGrantEntity,
    ) -> Result<ReviewCommit>;

    /// Single transaction with the same PENDING guard: flip to REJECTED,
    /// reset the user caches and append the audit row.
    async fn commit_rejection(
        &self,
        submission_id: Uuid,
        admin_id: Uuid,
        note: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<ReviewCommit>;
}
