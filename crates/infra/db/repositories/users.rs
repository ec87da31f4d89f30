use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::{dsl::max, insert_into, prelude::*, update};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::postgres::{
        postgres_connection::PgPoolSquad,
        schema::{notifications, payment_submissions, plan_grants, users},
    },
};
use domain::{
    entities::{
        submissions::{InsertSubmissionEntity, SubmissionEntity},
        users::{EditUserEntity, UserEntity},
    },
    repositories::users::{UserRegistration, UserRepository},
    value_objects::{
        enums::{
            approval_statuses::ApprovalStatus, payment_methods::PaymentMethod,
            payment_statuses::PaymentStatus, submission_statuses::SubmissionStatus,
        },
        grants::PreapprovedGrant,
        notifications::user_registered,
        users::{NewUser, USER_NUMBER_SEED},
    },
};

pub struct UserPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl UserPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

fn next_user_number(conn: &mut PgConnection) -> Result<i64, diesel::result::Error> {
    let highest = users::table
        .select(max(users::user_number))
        .first::<Option<i64>>(conn)?;

    Ok(highest.map_or(USER_NUMBER_SEED, |number| number + 1))
}

#[async_trait]
impl UserRepository for UserPostgres {
    async fn register(&self, new_user: NewUser) -> Result<UserRegistration> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = conn.transaction::<UserRegistration, diesel::result::Error, _>(|tx| {
            let existing = users::table
                .filter(users::email.eq(&new_user.email))
                .select(users::id)
                .first::<Uuid>(tx)
                .optional()?;
            if existing.is_some() {
                return Ok(UserRegistration::EmailTaken);
            }

            let user_number = next_user_number(tx)?;
            let user = insert_into(users::table)
                .values(&new_user.to_entity(user_number))
                .returning(UserEntity::as_returning())
                .get_result::<UserEntity>(tx)?;

            insert_into(notifications::table)
                .values(&user_registered(user.id, user.user_number, &user.email))
                .execute(tx)?;

            Ok(UserRegistration::Created(user))
        })?;

        Ok(result)
    }

    async fn register_approved(
        &self,
        new_user: NewUser,
        payment_method: Option<String>,
        grant: Option<PreapprovedGrant>,
    ) -> Result<UserRegistration> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = conn.transaction::<UserRegistration, diesel::result::Error, _>(|tx| {
            let existing = users::table
                .filter(users::email.eq(&new_user.email))
                .select(users::id)
                .first::<Uuid>(tx)
                .optional()?;
            if existing.is_some() {
                return Ok(UserRegistration::EmailTaken);
            }

            let user_number = next_user_number(tx)?;
            let user = insert_into(users::table)
                .values(&new_user.to_entity(user_number))
                .returning(UserEntity::as_returning())
                .get_result::<UserEntity>(tx)?;

            insert_into(notifications::table)
                .values(&user_registered(user.id, user.user_number, &user.email))
                .execute(tx)?;

            let grant = match grant {
                Some(grant) => grant,
                None => return Ok(UserRegistration::Created(user)),
            };

            insert_into(plan_grants::table)
                .values(&grant.to_entity(user.id))
                .execute(tx)?;

            // Ledger row so the account's history reads like any other
            // approved member's.
            let method = payment_method
                .clone()
                .unwrap_or_else(|| PaymentMethod::BankTransfer.to_string());
            let submission = InsertSubmissionEntity {
                user_id: user.id,
                plan: grant.plan.clone(),
                payment_method: method,
                proof_path: None,
                proof_name: None,
                status: SubmissionStatus::Approved.to_string(),
                admin_note: Some("Created by admin".to_string()),
                reviewed_by: Some(grant.approved_by),
                reviewed_at: Some(grant.approved_at),
                created_at: grant.approved_at,
            };
            insert_into(payment_submissions::table)
                .values(&submission)
                .execute(tx)?;

            let promoted = update(users::table.find(user.id))
                .set((
                    users::membership_plan.eq(Some(grant.plan.clone())),
                    users::payment_method.eq(payment_method),
                    users::payment_status.eq(PaymentStatus::Completed.to_string()),
                    users::approval_status.eq(ApprovalStatus::Approved.to_string()),
                    users::access_expires_at.eq(Some(grant.expires_at)),
                    users::updated_at.eq(Utc::now()),
                ))
                .returning(UserEntity::as_returning())
                .get_result::<UserEntity>(tx)?;

            Ok(UserRegistration::Created(promoted))
        })?;

        Ok(result)
    }

    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<UserEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = users::table
            .find(user_id)
            .select(UserEntity::as_select())
            .first::<UserEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = users::table
            .filter(users::email.eq(email))
            .select(UserEntity::as_select())
            .first::<UserEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn store_refresh_token_hash(
        &self,
        user_id: Uuid,
        token_hash: Option<String>,
    ) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        update(users::table.find(user_id))
            .set((
                users::refresh_token_hash.eq(token_hash),
                users::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)?;

        Ok(())
    }

    async fn store_reset_token(
        &self,
        user_id: Uuid,
        token_hash: String,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        update(users::table.find(user_id))
            .set((
                users::reset_token_hash.eq(Some(token_hash)),
                users::reset_token_expires_at.eq(Some(expires_at)),
                users::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)?;

        Ok(())
    }

    async fn list_with_active_reset_tokens(&self, now: DateTime<Utc>) -> Result<Vec<UserEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = users::table
            .filter(users::reset_token_hash.is_not_null())
            .filter(users::reset_token_expires_at.gt(now))
            .filter(users::is_deleted.eq(false))
            .select(UserEntity::as_select())
            .load::<UserEntity>(&mut conn)?;

        Ok(results)
    }

    async fn reset_password(&self, user_id: Uuid, password_hash: String) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        update(users::table.find(user_id))
            .set((
                users::password_hash.eq(password_hash),
                users::reset_token_hash.eq::<Option<String>>(None),
                users::reset_token_expires_at.eq::<Option<DateTime<Utc>>>(None),
                users::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)?;

        Ok(())
    }

    async fn set_account_number(&self, user_id: Uuid, account_number: String) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let affected = update(
            users::table
                .filter(users::id.eq(user_id))
                .filter(users::account_number.is_null()),
        )
        .set((
            users::account_number.eq(Some(account_number)),
            users::updated_at.eq(Utc::now()),
        ))
        .execute(&mut conn)?;

        Ok(affected == 1)
    }

    async fn demote_expired_approval(&self, user_id: Uuid) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        update(users::table.find(user_id))
            .set((
                users::payment_status.eq(PaymentStatus::None.to_string()),
                users::approval_status.eq(ApprovalStatus::None.to_string()),
                users::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)?;

        Ok(())
    }

    async fn update_profile(
        &self,
        user_id: Uuid,
        changes: EditUserEntity,
    ) -> Result<Option<UserEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = update(users::table.find(user_id))
            .set(&changes)
            .returning(UserEntity::as_returning())
            .get_result::<UserEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn soft_delete(&self, user_id: Uuid) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;
        let now = Utc::now();

        let affected = update(users::table.find(user_id))
            .set((
                users::is_deleted.eq(true),
                users::deleted_at.eq(Some(now)),
                users::refresh_token_hash.eq::<Option<String>>(None),
                users::updated_at.eq(now),
            ))
            .execute(&mut conn)?;

        Ok(affected == 1)
    }

    async fn list_with_latest_submission(
        &self,
    ) -> Result<Vec<(UserEntity, Option<SubmissionEntity>)>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let members = users::table
            .order(users::created_at.desc())
            .select(UserEntity::as_select())
            .load::<UserEntity>(&mut conn)?;

        let ids = members.iter().map(|user| user.id).collect::<Vec<Uuid>>();
        let submissions = payment_submissions::table
            .filter(payment_submissions::user_id.eq_any(&ids))
            .order(payment_submissions::created_at.desc())
            .select(SubmissionEntity::as_select())
            .load::<SubmissionEntity>(&mut conn)?;

        // Rows arrive newest first, so the first submission seen per user is
        // their latest.
        let mut latest = HashMap::<Uuid, SubmissionEntity>::new();
        for submission in submissions {
            latest.entry(submission.user_id).or_insert(submission);
        }

        Ok(members
            .into_iter()
            .map(|user| {
                let submission = latest.remove(&user.id);
                (user, submission)
            })
            .collect())
    }
}
