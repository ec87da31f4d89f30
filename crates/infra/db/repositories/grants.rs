use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::{prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::postgres::{
        postgres_connection::PgPoolSquad,
        schema::{plan_grants, users},
    },
};
use domain::{
    entities::grants::{GrantEntity, GrantRow},
    repositories::grants::{GrantRepository, GrantRevocation},
    value_objects::enums::{
        approval_statuses::ApprovalStatus, payment_statuses::PaymentStatus,
    },
};

pub struct GrantPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl GrantPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl GrantRepository for GrantPostgres {
    async fn find_active_for_user(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<GrantEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let row = plan_grants::table
            .filter(plan_grants::user_id.eq(user_id))
            .filter(plan_grants::revoked_at.is_null())
            .filter(plan_grants::expires_at.gt(now))
            .order(plan_grants::approved_at.desc())
            .select(GrantRow::as_select())
            .first::<GrantRow>(&mut conn)
            .optional()?;

        Ok(row.map(GrantEntity::from))
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<GrantEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let rows = plan_grants::table
            .filter(plan_grants::user_id.eq(user_id))
            .order(plan_grants::approved_at.desc())
            .select(GrantRow::as_select())
            .load::<GrantRow>(&mut conn)?;

        Ok(rows.into_iter().map(GrantEntity::from).collect())
    }

    async fn revoke(&self, grant_id: Uuid, now: DateTime<Utc>) -> Result<GrantRevocation> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = conn.transaction::<GrantRevocation, diesel::result::Error, _>(|tx| {
            let existing = plan_grants::table
                .find(grant_id)
                .select(GrantRow::as_select())
                .first::<GrantRow>(tx)
                .optional()?;
            let row = match existing {
                Some(row) => row,
                None => return Ok(GrantRevocation::NotFound),
            };
            if row.revoked_at.is_some() {
                return Ok(GrantRevocation::AlreadyRevoked(row.into()));
            }

            let revoked = update(plan_grants::table.find(grant_id))
                .set(plan_grants::revoked_at.eq(Some(now)))
                .returning(GrantRow::as_returning())
                .get_result::<GrantRow>(tx)?;

            update(users::table.find(revoked.user_id))
                .set((
                    users::payment_status.eq(PaymentStatus::None.to_string()),
                    users::approval_status.eq(ApprovalStatus::None.to_string()),
                    users::access_expires_at.eq::<Option<DateTime<Utc>>>(None),
                    users::updated_at.eq(now),
                ))
                .execute(tx)?;

            Ok(GrantRevocation::Revoked(revoked.into()))
        })?;

        Ok(result)
    }
}
