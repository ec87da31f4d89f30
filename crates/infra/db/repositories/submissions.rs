use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use diesel::{insert_into, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::postgres::{
        postgres_connection::PgPoolSquad,
        schema::{notifications, payment_submissions, users},
    },
};
use domain::{
    entities::{
        notifications::InsertNotificationEntity,
        submissions::{InsertSubmissionEntity, SubmissionEntity},
    },
    repositories::submissions::{SubmissionCreation, SubmissionRepository},
    value_objects::{
        enums::{
            approval_statuses::ApprovalStatus, payment_statuses::PaymentStatus,
            submission_statuses::SubmissionStatus,
        },
        submissions::{PendingReviewView, SubmissionUserBrief},
    },
};

pub struct SubmissionPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl SubmissionPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl SubmissionRepository for SubmissionPostgres {
    async fn create_pending(
        &self,
        entity: InsertSubmissionEntity,
        notification: InsertNotificationEntity,
    ) -> Result<SubmissionCreation> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = conn.transaction::<SubmissionCreation, diesel::result::Error, _>(|tx| {
            // Serializes concurrent submits by the same member, so the
            // pending check below cannot pass twice.
            users::table
                .find(entity.user_id)
                .select(users::id)
                .for_update()
                .first::<Uuid>(tx)?;

            let pending = payment_submissions::table
                .filter(payment_submissions::user_id.eq(entity.user_id))
                .filter(payment_submissions::status.eq(SubmissionStatus::Pending.to_string()))
                .select(payment_submissions::id)
                .first::<Uuid>(tx)
                .optional()?;
            if pending.is_some() {
                return Ok(SubmissionCreation::PendingExists);
            }

            let submission = insert_into(payment_submissions::table)
                .values(&entity)
                .returning(SubmissionEntity::as_returning())
                .get_result::<SubmissionEntity>(tx)?;

            update(users::table.find(submission.user_id))
                .set((
                    users::payment_method.eq(Some(submission.payment_method.clone())),
                    users::payment_proof_path.eq(submission.proof_path.clone()),
                    users::payment_status.eq(PaymentStatus::Verifying.to_string()),
                    users::approval_status.eq(ApprovalStatus::Pending.to_string()),
                    users::updated_at.eq(Utc::now()),
                ))
                .execute(tx)?;

            insert_into(notifications::table)
                .values(&notification)
                .execute(tx)?;

            Ok(SubmissionCreation::Created(submission))
        })?;

        Ok(result)
    }

    async fn find_by_id(&self, submission_id: Uuid) -> Result<Option<SubmissionEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = payment_submissions::table
            .find(submission_id)
            .select(SubmissionEntity::as_select())
            .first::<SubmissionEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn latest_for_user(&self, user_id: Uuid) -> Result<Option<SubmissionEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = payment_submissions::table
            .filter(payment_submissions::user_id.eq(user_id))
            .order(payment_submissions::created_at.desc())
            .select(SubmissionEntity::as_select())
            .first::<SubmissionEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn list_pending(&self) -> Result<Vec<PendingReviewView>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let rows = payment_submissions::table
            .inner_join(users::table)
            .filter(payment_submissions::status.eq(SubmissionStatus::Pending.to_string()))
            .order(payment_submissions::created_at.desc())
            .select((
                SubmissionEntity::as_select(),
                (users::user_number, users::email, users::name, users::phone),
            ))
            .load::<(SubmissionEntity, (i64, String, Option<String>, Option<String>))>(&mut conn)?;

        Ok(rows
            .into_iter()
            .map(|(submission, (user_number, email, name, phone))| PendingReviewView {
                id: submission.id,
                user_id: submission.user_id,
                plan: submission.plan,
                payment_method: submission.payment_method,
                proof_path: submission.proof_path,
                proof_name: submission.proof_name,
                created_at: submission.created_at,
                user: SubmissionUserBrief {
                    user_number,
                    email,
                    name,
                    phone,
                },
            })
            .collect())
    }
}
