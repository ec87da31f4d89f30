use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::{
    entities::plan_meta::{EditPlanMetaEntity, InsertPlanMetaEntity, PlanMetaEntity},
    value_objects::plans::FileSlot,
};

/// Outcome of an insert guarded by an in-transaction name check.
#[derive(Debug, Clone)]
pub enum PlanCreation {
    Created(PlanMetaEntity),
    NameTaken,
}

#[derive(Debug, Clone)]
pub enum PlanUpdate {
    Updated(PlanMetaEntity),
    NotFound,
    /// The requested rename would collide with another tier.
    RenameCollision,
}

#[async_trait]
#[automock]
pub trait PlanMetaRepository {
    /// Active tiers, cheapest first. This is the public catalog.
    async fn list_active(&self) -> Result<Vec<PlanMetaEntity>>;

    async fn list_all(&self) -> Result<Vec<PlanMetaEntity>>;

    async fn find_by_name(&self, name: &str) -> Result<Option<PlanMetaEntity>>;

    async fn find_active_by_name(&self, name: &str) -> Result<Option<PlanMetaEntity>>;

    async fn create(&self, entity: InsertPlanMetaEntity) -> Result<PlanCreation>;

    async fn update(&self, name: &str, changes: EditPlanMetaEntity) -> Result<PlanUpdate>;

    /// Returns None when the tier does not exist.
    async fn set_active(&self, name: &str, is_active: bool) -> Result<Option<PlanMetaEntity>>;

    /// Returns false when the tier does not exist. Grants keep their frozen
    /// snapshots either way.
    async fn delete(&self, name: &str) -> Result<bool>;

    async fn set_file_slot(
        &self,
        name: &str,
        slot: FileSlot,
        path: String,
        file_name: String,
    ) -> Result<Option<PlanMetaEntity>>;

    async fn clear_file_slot(&self, name: &str, slot: FileSlot) -> Result<Option<PlanMetaEntity>>;
}
