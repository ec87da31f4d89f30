use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::grants::GrantEntity;

#[derive(Debug, Clone)]
pub enum GrantRevocation {
    Revoked(GrantEntity),
    /// Already revoked earlier; the original revocation stands.
    AlreadyRevoked(GrantEntity),
    NotFound,
}

#[async_trait]
#[automock]
pub trait GrantRepository {
    /// Latest unrevoked, unexpired grant, by approval time.
    async fn find_active_for_user(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<GrantEntity>>;

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<GrantEntity>>;

    /// Stamps revoked_at and clears the holder's entitlement caches in the
    /// same transaction.
    async fn revoke(&self, grant_id: Uuid, now: DateTime<Utc>) -> Result<GrantRevocation>;
}
