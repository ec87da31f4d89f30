use anyhow::Result;
use async_trait::async_trait;
use diesel::{insert_into, prelude::*};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::admins},
};
use domain::{
    entities::admins::AdminEntity,
    repositories::admins::{AdminRegistration, AdminRepository},
    value_objects::admins::NewAdmin,
};

pub struct AdminPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl AdminPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl AdminRepository for AdminPostgres {
    async fn register(&self, new_admin: NewAdmin) -> Result<AdminRegistration> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = conn.transaction::<AdminRegistration, diesel::result::Error, _>(|tx| {
            let existing = admins::table
                .filter(admins::email.eq(&new_admin.email))
                .select(admins::id)
                .first::<Uuid>(tx)
                .optional()?;
            if existing.is_some() {
                return Ok(AdminRegistration::EmailTaken);
            }

            let admin = insert_into(admins::table)
                .values(&new_admin.to_entity())
                .returning(AdminEntity::as_returning())
                .get_result::<AdminEntity>(tx)?;

            Ok(AdminRegistration::Created(admin))
        })?;

        Ok(result)
    }

    async fn find_by_id(&self, admin_id: Uuid) -> Result<Option<AdminEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = admins::table
            .find(admin_id)
            .select(AdminEntity::as_select())
            .first::<AdminEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<AdminEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = admins::table
            .filter(admins::email.eq(email))
            .select(AdminEntity::as_select())
            .first::<AdminEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }
}
