use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use diesel::{delete, insert_into, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::membership_plans},
};
use domain::{
    entities::plan_meta::{EditPlanMetaEntity, InsertPlanMetaEntity, PlanMetaEntity, PlanMetaRow},
    repositories::plan_meta::{PlanCreation, PlanMetaRepository, PlanUpdate},
    value_objects::plans::FileSlot,
};

pub struct PlanMetaPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl PlanMetaPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl PlanMetaRepository for PlanMetaPostgres {
    async fn list_active(&self) -> Result<Vec<PlanMetaEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let rows = membership_plans::table
            .filter(membership_plans::is_active.eq(true))
            .order(membership_plans::price.asc())
            .select(PlanMetaRow::as_select())
            .load::<PlanMetaRow>(&mut conn)?;

        Ok(rows.into_iter().map(PlanMetaEntity::from).collect())
    }

    async fn list_all(&self) -> Result<Vec<PlanMetaEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let rows = membership_plans::table
            .order(membership_plans::price.asc())
            .select(PlanMetaRow::as_select())
            .load::<PlanMetaRow>(&mut conn)?;

        Ok(rows.into_iter().map(PlanMetaEntity::from).collect())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<PlanMetaEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let row = membership_plans::table
            .filter(membership_plans::name.eq(name))
            .select(PlanMetaRow::as_select())
            .first::<PlanMetaRow>(&mut conn)
            .optional()?;

        Ok(row.map(PlanMetaEntity::from))
    }

    async fn find_active_by_name(&self, name: &str) -> Result<Option<PlanMetaEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let row = membership_plans::table
            .filter(membership_plans::name.eq(name))
            .filter(membership_plans::is_active.eq(true))
            .select(PlanMetaRow::as_select())
            .first::<PlanMetaRow>(&mut conn)
            .optional()?;

        Ok(row.map(PlanMetaEntity::from))
    }

    async fn create(&self, entity: InsertPlanMetaEntity) -> Result<PlanCreation> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = conn.transaction::<PlanCreation, diesel::result::Error, _>(|tx| {
            let existing = membership_plans::table
                .filter(membership_plans::name.eq(&entity.name))
                .select(membership_plans::id)
                .first::<Uuid>(tx)
                .optional()?;
            if existing.is_some() {
                return Ok(PlanCreation::NameTaken);
            }

            let row = insert_into(membership_plans::table)
                .values(&entity)
                .returning(PlanMetaRow::as_returning())
                .get_result::<PlanMetaRow>(tx)?;

            Ok(PlanCreation::Created(row.into()))
        })?;

        Ok(result)
    }

    async fn update(&self, name: &str, changes: EditPlanMetaEntity) -> Result<PlanUpdate> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = conn.transaction::<PlanUpdate, diesel::result::Error, _>(|tx| {
            let current = membership_plans::table
                .filter(membership_plans::name.eq(name))
                .select(membership_plans::id)
                .first::<Uuid>(tx)
                .optional()?;
            let current_id = match current {
                Some(id) => id,
                None => return Ok(PlanUpdate::NotFound),
            };

            if let Some(new_name) = &changes.name {
                let collision = membership_plans::table
                    .filter(membership_plans::name.eq(new_name))
                    .filter(membership_plans::id.ne(current_id))
                    .select(membership_plans::id)
                    .first::<Uuid>(tx)
                    .optional()?;
                if collision.is_some() {
                    return Ok(PlanUpdate::RenameCollision);
                }
            }

            let row = update(membership_plans::table.find(current_id))
                .set(&changes)
                .returning(PlanMetaRow::as_returning())
                .get_result::<PlanMetaRow>(tx)?;

            Ok(PlanUpdate::Updated(row.into()))
        })?;

        Ok(result)
    }

    async fn set_active(&self, name: &str, is_active: bool) -> Result<Option<PlanMetaEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let row = update(membership_plans::table.filter(membership_plans::name.eq(name)))
            .set((
                membership_plans::is_active.eq(is_active),
                membership_plans::updated_at.eq(Utc::now()),
            ))
            .returning(PlanMetaRow::as_returning())
            .get_result::<PlanMetaRow>(&mut conn)
            .optional()?;

        Ok(row.map(PlanMetaEntity::from))
    }

    async fn delete(&self, name: &str) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let affected = delete(membership_plans::table.filter(membership_plans::name.eq(name)))
            .execute(&mut conn)?;

        Ok(affected == 1)
    }

    async fn set_file_slot(
        &self,
        name: &str,
        slot: FileSlot,
        path: String,
        file_name: String,
    ) -> Result<Option<PlanMetaEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;
        let now = Utc::now();

        let target = membership_plans::table.filter(membership_plans::name.eq(name));
        let row = match slot {
            FileSlot::A => update(target)
                .set((
                    membership_plans::file_a_path.eq(Some(path)),
                    membership_plans::file_a_name.eq(Some(file_name)),
                    membership_plans::file_a_updated_at.eq(Some(now)),
                    membership_plans::updated_at.eq(now),
                ))
                .returning(PlanMetaRow::as_returning())
                .get_result::<PlanMetaRow>(&mut conn)
                .optional()?,
            FileSlot::B => update(target)
                .set((
                    membership_plans::file_b_path.eq(Some(path)),
                    membership_plans::file_b_name.eq(Some(file_name)),
                    membership_plans::file_b_updated_at.eq(Some(now)),
                    membership_plans::updated_at.eq(now),
                ))
                .returning(PlanMetaRow::as_returning())
                .get_result::<PlanMetaRow>(&mut conn)
                .optional()?,
        };

        Ok(row.map(PlanMetaEntity::from))
    }

    async fn clear_file_slot(&self, name: &str, slot: FileSlot) -> Result<Option<PlanMetaEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;
        let now = Utc::now();

        let target = membership_plans::table.filter(membership_plans::name.eq(name));
        let row = match slot {
            FileSlot::A => update(target)
                .set((
                    membership_plans::file_a_path.eq::<Option<String>>(None),
                    membership_plans::file_a_name.eq::<Option<String>>(None),
                    membership_plans::file_a_updated_at.eq::<Option<chrono::DateTime<Utc>>>(None),
                    membership_plans::updated_at.eq(now),
                ))
                .returning(PlanMetaRow::as_returning())
                .get_result::<PlanMetaRow>(&mut conn)
                .optional()?,
            FileSlot::B => update(target)
                .set((
                    membership_plans::file_b_path.eq::<Option<String>>(None),
                    membership_plans::file_b_name.eq::<Option<String>>(None),
                    membership_plans::file_b_updated_at.eq::<Option<chrono::DateTime<Utc>>>(None),
                    membership_plans::updated_at.eq(now),
                ))
                .returning(PlanMetaRow::as_returning())
                .get_result::<PlanMetaRow>(&mut conn)
                .optional()?,
        };

        Ok(row.map(PlanMetaEntity::from))
    }
}
