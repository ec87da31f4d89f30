use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::{
    domain::value_objects::plan_features::PlanFeatures, infra::db::postgres::schema::plan_grants,
};

/// A grant freezes the plan terms at approval time. Later catalog edits must
/// never change what an approved user already holds.
#[derive(Debug, Clone)]
pub struct GrantEntity {
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

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = plan_grants)]
pub struct GrantRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub plan: String,
    pub label: String,
    pub features: serde_json::Value,
    pub price: i32,
    pub duration_days: i32,
    pub approved_by: Uuid,
    pub approved_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<GrantRow> for GrantEntity {
    fn from(value: GrantRow) -> Self {
        let features = PlanFeatures::from_value(value.features);

        Self {
            id: value.id,
            user_id: value.user_id,
            plan: value.plan,
            label: value.label,
            features,
            price: value.price,
            duration_days: value.duration_days,
            approved_by: value.approved_by,
            approved_at: value.approved_at,
            expires_at: value.expires_at,
            revoked_at: value.revoked_at,
            created_at: value.created_at,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = plan_grants)]
pub struct InsertGrantEntity {
    pub user_id: Uuid,
    pub plan: String,
    pub label: String,
    pub features: serde_json::Value,
    pub price: i32,
    pub duration_days: i32,
    pub approved_by: Uuid,
    pub approved_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}
