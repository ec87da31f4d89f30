use anyhow::Result;
use async_trait::async_trait;
use diesel::{insert_into, prelude::*};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::admin_logs},
};
use domain::{
    entities::admin_logs::InsertAdminLogEntity, repositories::admin_logs::AdminLogRepository,
};

pub struct AdminLogPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl AdminLogPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl AdminLogRepository for AdminLogPostgres {
    async fn append(&self, entity: InsertAdminLogEntity) -> Result<Uuid> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = insert_into(admin_logs::table)
            .values(&entity)
            .returning(admin_logs::id)
            .get_result::<Uuid>(&mut conn)?;

        Ok(result)
    }
}
