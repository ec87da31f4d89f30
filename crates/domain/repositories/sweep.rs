use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::{
    sweep_jobs::{InsertSweepJobEntity, SweepJobEntity},
    users::UserEntity,
};

#[async_trait]
#[automock]
pub trait SweepRepository {
    /// Queues a job. Used by the self-priming loop and the manual trigger.
    async fn enqueue(&self, entity: InsertSweepJobEntity) -> Result<Uuid>;

    /// True when a PENDING job of this kind already sits in the queue.
    async fn has_pending(&self, kind: &str) -> Result<bool>;

    /// PENDING jobs whose schedule has come up, oldest first.
    async fn due_jobs(&self, now: DateTime<Utc>) -> Result<Vec<SweepJobEntity>>;

    async fn mark_completed(&self, job_id: Uuid, now: DateTime<Utc>) -> Result<()>;

    async fn mark_failed(&self, job_id: Uuid, error: &str, now: DateTime<Utc>) -> Result<()>;

    /// Accounts whose cached approval outlived their access window.
    async fn list_lapsed_users(&self, now: DateTime<Utc>) -> Result<Vec<UserEntity>>;

    /// Demotes the user's caches and revokes their expired grants in one
    /// transaction. Returns the number of grants revoked.
    async fn demote_lapsed_user(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<usize>;
}
