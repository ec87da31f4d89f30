use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::admin_logs::InsertAdminLogEntity;

#[async_trait]
#[automock]
pub trait AdminLogRepository {
    async fn append(&self, entity: InsertAdminLogEntity) -> Result<Uuid>;
}
