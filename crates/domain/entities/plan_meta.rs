use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::{
    domain::value_objects::plan_features::PlanFeatures,
    infra::db::postgres::schema::membership_plans,
};

#[derive(Debug, Clone)]
pub struct PlanMetaEntity {
    pub id: Uuid,
    pub name: String,
    pub label: String,
    pub description: Option<String>,
    pub price: i32,
    pub duration_days: i32,
    pub features: PlanFeatures,
    pub is_active: bool,
    pub file_a_path: Option<String>,
    pub file_a_name: Option<String>,
    pub file_a_updated_at: Option<DateTime<Utc>>,
    pub file_b_path: Option<String>,
    pub file_b_name: Option<String>,
    pub file_b_updated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Raw row used for Diesel queries. Features stay as JSON and are parsed into
/// PlanFeatures on the way out.
#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = membership_plans)]
pub struct PlanMetaRow {
    pub id: Uuid,
    pub name: String,
    pub label: String,
    pub description: Option<String>,
    pub price: i32,
    pub duration_days: i32,
    pub features: serde_json::Value,
    pub is_active: bool,
    pub file_a_path: Option<String>,
    pub file_a_name: Option<String>,
    pub file_a_updated_at: Option<DateTime<Utc>>,
    pub file_b_path: Option<String>,
    pub file_b_name: Option<String>,
    pub file_b_updated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PlanMetaRow> for PlanMetaEntity {
    fn from(value: PlanMetaRow) -> Self {
        let features = PlanFeatures::from_value(value.features);

        Self {
            id: value.id,
            name: value.name,
            label: value.label,
            description: value.description,
            price: value.price,
            duration_days: value.duration_days,
            features,
            is_active: value.is_active,
            file_a_path: value.file_a_path,
            file_a_name: value.file_a_name,
            file_a_updated_at: value.file_a_updated_at,
            file_b_path: value.file_b_path,
            file_b_name: value.file_b_name,
            file_b_updated_at: value.file_b_updated_at,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = membership_plans)]
pub struct InsertPlanMetaEntity {
    pub name: String,
    pub label: String,
    pub description: Option<String>,
    pub price: i32,
    pub duration_days: i32,
    pub features: serde_json::Value,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial catalog update. A rename travels here too and is collision-checked
/// in the repository before it is applied.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = membership_plans)]
pub struct EditPlanMetaEntity {
    pub name: Option<String>,
    pub label: Option<String>,
    pub description: Option<String>,
    pub price: Option<i32>,
    pub duration_days: Option<i32>,
    pub features: Option<serde_json::Value>,
    pub is_active: Option<bool>,
    pub updated_at: DateTime<Utc>,
}
