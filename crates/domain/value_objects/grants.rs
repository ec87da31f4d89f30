use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{
    entities::grants::{GrantEntity, InsertGrantEntity},
    value_objects::plan_features::PlanFeatures,
};

/// Grant snapshot prepared before the holder exists. The admin pre-approval
/// flow creates the user and the grant in one transaction, so the user id is
/// filled in there.
#[derive(Debug, Clone)]
pub struct PreapprovedGrant {
    pub plan: String,
    pub label: String,
    pub features: serde_json::Value,
    pub price: i32,
    pub duration_days: i32,
    pub approved_by: Uuid,
    pub approved_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl PreapprovedGrant {
    pub fn to_entity(&self, user_id: Uuid) -> InsertGrantEntity {
        InsertGrantEntity {
            user_id,
            plan: self.plan.clone(),
            label: self.label.clone(),
            features: self.features.clone(),
            price: self.price,
            duration_days: self.duration_days,
            approved_by: self.approved_by,
            approved_at: self.approved_at,
            expires_at: self.expires_at,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GrantModel {
    pub id: Uuid,
    pub user_id: Uuid,
    pub plan: String,
    pub label: String,
    pub features: PlanFeatures,
    pub price: i32,
    pub duration_days: i32,
    pub approved_by: Uuid,
    pub approved_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<GrantEntity> for GrantModel {
    fn from(entity: GrantEntity) -> Self {
        Self {
            id: entity.id,
            user_id: entity.user_id,
            plan: entity.plan,
            label: entity.label,
            features: entity.features,
            price: entity.price,
            duration_days: entity.duration_days,
            approved_by: entity.approved_by,
            approved_at: entity.approved_at,
            expires_at: entity.expires_at,
            revoked_at: entity.revoked_at,
            created_at: entity.created_at,
        }
    }
}
