use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::{insert_into, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::postgres::{
        postgres_connection::PgPoolSquad,
        schema::{plan_grants, sweep_jobs, users},
    },
};
use domain::{
    entities::{
        sweep_jobs::{InsertSweepJobEntity, SweepJobEntity},
        users::UserEntity,
    },
    repositories::sweep::SweepRepository,
    value_objects::enums::{
        approval_statuses::ApprovalStatus, payment_statuses::PaymentStatus,
        sweep_job_statuses::SweepJobStatus,
    },
};

pub struct SweepPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl SweepPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl SweepRepository for SweepPostgres {
    async fn enqueue(&self, entity: InsertSweepJobEntity) -> Result<Uuid> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = insert_into(sweep_jobs::table)
            .values(&entity)
            .returning(sweep_jobs::id)
            .get_result::<Uuid>(&mut conn)?;

        Ok(result)
    }

    async fn has_pending(&self, kind: &str) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let pending = sweep_jobs::table
            .filter(sweep_jobs::kind.eq(kind))
            .filter(sweep_jobs::status.eq(SweepJobStatus::Pending.to_string()))
            .select(sweep_jobs::id)
            .first::<Uuid>(&mut conn)
            .optional()?;

        Ok(pending.is_some())
    }

    async fn due_jobs(&self, now: DateTime<Utc>) -> Result<Vec<SweepJobEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = sweep_jobs::table
            .filter(sweep_jobs::status.eq(SweepJobStatus::Pending.to_string()))
            .filter(sweep_jobs::scheduled_at.le(now))
            .order(sweep_jobs::scheduled_at.asc())
            .select(SweepJobEntity::as_select())
            .load::<SweepJobEntity>(&mut conn)?;

        Ok(results)
    }

    async fn mark_completed(&self, job_id: Uuid, now: DateTime<Utc>) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        update(sweep_jobs::table.find(job_id))
            .set((
                sweep_jobs::status.eq(SweepJobStatus::Completed.to_string()),
                sweep_jobs::processed_at.eq(Some(now)),
            ))
            .execute(&mut conn)?;

        Ok(())
    }

    async fn mark_failed(&self, job_id: Uuid, error: &str, now: DateTime<Utc>) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        update(sweep_jobs::table.find(job_id))
            .set((
                sweep_jobs::status.eq(SweepJobStatus::Failed.to_string()),
                sweep_jobs::processed_at.eq(Some(now)),
                sweep_jobs::error.eq(Some(error)),
            ))
            .execute(&mut conn)?;

        Ok(())
    }

    async fn list_lapsed_users(&self, now: DateTime<Utc>) -> Result<Vec<UserEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = users::table
            .filter(users::is_deleted.eq(false))
            .filter(users::approval_status.eq(ApprovalStatus::Approved.to_string()))
            .filter(users::access_expires_at.lt(now))
            .select(UserEntity::as_select())
            .load::<UserEntity>(&mut conn)?;

        Ok(results)
    }

    async fn demote_lapsed_user(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<usize> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let revoked = conn.transaction::<usize, diesel::result::Error, _>(|tx| {
            // Conditional, so a demotion racing a fresh approval (new expiry
            // in the future) touches nothing.
            update(
                users::table
                    .filter(users::id.eq(user_id))
                    .filter(users::approval_status.eq(ApprovalStatus::Approved.to_string()))
                    .filter(users::access_expires_at.lt(now)),
            )
            .set((
                users::payment_status.eq(PaymentStatus::None.to_string()),
                users::approval_status.eq(ApprovalStatus::None.to_string()),
                users::updated_at.eq(now),
            ))
            .execute(tx)?;

            let revoked = update(
                plan_grants::table
                    .filter(plan_grants::user_id.eq(user_id))
                    .filter(plan_grants::revoked_at.is_null())
                    .filter(plan_grants::expires_at.le(now)),
            )
            .set(plan_grants::revoked_at.eq(Some(now)))
            .execute(tx)?;

            Ok(revoked)
        })?;

        Ok(revoked)
    }
}
