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
        schema::{admin_logs, notifications, payment_submissions, plan_grants, users},
    },
};
use domain::{
    entities::{grants::InsertGrantEntity, submissions::SubmissionEntity},
    repositories::approvals::{ApprovalRepository, ReviewCommit},
    value_objects::{
        admin_logs::{ACTION_APPROVE_SUBMISSION, ACTION_REJECT_SUBMISSION, submission_action},
        enums::{
            approval_statuses::ApprovalStatus, payment_statuses::PaymentStatus,
            submission_statuses::SubmissionStatus,
        },
    },
};

pub struct ApprovalPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl ApprovalPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl ApprovalRepository for ApprovalPostgres {
    async fn commit_approval(
        &self,
        submission_id: Uuid,
        admin_id: Uuid,
        note: Option<String>,
        grant: InsertGrantEntity,
    ) -> Result<ReviewCommit> {
        let mut conn = Arc::clone(&self.db_pool).get()?;
        let now = Utc::now();

        let result = conn.transaction::<ReviewCommit, diesel::result::Error, _>(|tx| {
            let affected = update(
                payment_submissions::table
                    .filter(payment_submissions::id.eq(submission_id))
                    .filter(
                        payment_submissions::status.eq(SubmissionStatus::Pending.to_string()),
                    ),
            )
            .set((
                payment_submissions::status.eq(SubmissionStatus::Approved.to_string()),
                payment_submissions::admin_note.eq(note.clone()),
                payment_submissions::reviewed_by.eq(Some(admin_id)),
                payment_submissions::reviewed_at.eq(Some(now)),
            ))
            .execute(tx)?;
            if affected != 1 {
                return Ok(ReviewCommit::LostRace);
            }

            let submission = payment_submissions::table
                .find(submission_id)
                .select(SubmissionEntity::as_select())
                .first::<SubmissionEntity>(tx)?;

            insert_into(plan_grants::table).values(&grant).execute(tx)?;

            update(users::table.find(submission.user_id))
                .set((
                    users::membership_plan.eq(Some(submission.plan.clone())),
                    users::payment_method.eq(Some(submission.payment_method.clone())),
                    users::payment_status.eq(PaymentStatus::Completed.to_string()),
                    users::approval_status.eq(ApprovalStatus::Approved.to_string()),
                    users::access_expires_at.eq(Some(grant.expires_at)),
                    users::updated_at.eq(now),
                ))
                .execute(tx)?;

            update(
                notifications::table
                    .filter(notifications::user_id.eq(submission.user_id))
                    .filter(notifications::plan.eq(submission.plan.clone())),
            )
            .set((
                notifications::is_read.eq(true),
                notifications::is_approved.eq(true),
                notifications::is_payed.eq(true),
            ))
            .execute(tx)?;

            insert_into(admin_logs::table)
                .values(&submission_action(
                    admin_id,
                    ACTION_APPROVE_SUBMISSION,
                    submission.user_id,
                    submission.id,
                    note.clone(),
                ))
                .execute(tx)?;

            Ok(ReviewCommit::Committed(submission))
        })?;

        Ok(result)
    }

    async fn commit_rejection(
        &self,
        submission_id: Uuid,
        admin_id: Uuid,
        note: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<ReviewCommit> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = conn.transaction::<ReviewCommit, diesel::result::Error, _>(|tx| {
            let affected = update(
                payment_submissions::table
                    .filter(payment_submissions::id.eq(submission_id))
                    .filter(
                        payment_submissions::status.eq(SubmissionStatus::Pending.to_string()),
                    ),
            )
            .set((
                payment_submissions::status.eq(SubmissionStatus::Rejected.to_string()),
                payment_submissions::admin_note.eq(note.clone()),
                payment_submissions::reviewed_by.eq(Some(admin_id)),
                payment_submissions::reviewed_at.eq(Some(now)),
            ))
            .execute(tx)?;
            if affected != 1 {
                return Ok(ReviewCommit::LostRace);
            }

            let submission = payment_submissions::table
                .find(submission_id)
                .select(SubmissionEntity::as_select())
                .first::<SubmissionEntity>(tx)?;

            // The in-flight claim is withdrawn. An active grant from an
            // earlier approval is untouched.
            update(users::table.find(submission.user_id))
                .set((
                    users::payment_status.eq(PaymentStatus::None.to_string()),
                    users::approval_status.eq(ApprovalStatus::None.to_string()),
                    users::updated_at.eq(now),
                ))
                .execute(tx)?;

            insert_into(admin_logs::table)
                .values(&submission_action(
                    admin_id,
                    ACTION_REJECT_SUBMISSION,
                    submission.user_id,
                    submission.id,
                    note.clone(),
                ))
                .execute(tx)?;

            Ok(ReviewCommit::Committed(submission))
        })?;

        Ok(result)
    }
}
