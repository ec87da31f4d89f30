use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::{entities::admins::AdminEntity, value_objects::admins::NewAdmin};

#[derive(Debug, Clone)]
pub enum AdminRegistration {
    Created(AdminEntity),
    EmailTaken,
}

#[async_trait]
#[automock]
pub trait AdminRepository {
    async fn register(&self, new_admin: NewAdmin) -> Result<AdminRegistration>;
    async fn find_by_id(&self, admin_id: Uuid) -> Result<Option<AdminEntity>>;
    async fn find_by_email(&self, email: &str) -> Result<Option<AdminEntity>>;
}
