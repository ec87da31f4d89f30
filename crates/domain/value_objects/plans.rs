use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::domain::{
    entities::plan_meta::{EditPlanMetaEntity, InsertPlanMetaEntity, PlanMetaEntity},
    value_objects::plan_features::PlanFeatures,
};

/// Downloadable file slot on a plan. Two slots are enough for the current
/// product (indicator package and EA package).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum FileSlot {
    A,
    B,
}

impl FileSlot {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileSlot::A => "A",
            FileSlot::B => "B",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "A" => Some(FileSlot::A),
            "B" => Some(FileSlot::B),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePlanModel {
    pub name: String,
    pub label: String,
    pub description: Option<String>,
    pub price: i32,
    pub duration_days: i32,
    pub features: Option<Value>,
    pub is_active: Option<bool>,
}

impl CreatePlanModel {
    pub fn to_entity(&self) -> InsertPlanMetaEntity {
        let now = Utc::now();
        InsertPlanMetaEntity {
            name: self.name.trim().to_uppercase(),
            label: self.label.clone(),
            description: self.description.clone(),
            price: self.price,
            duration_days: self.duration_days,
            features: self.features.clone().unwrap_or_else(|| Value::Object(Default::default())),
            is_active: self.is_active.unwrap_or(true),
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdatePlanModel {
    /// Renames the tier. Collisions with an existing name are rejected.
    pub name: Option<String>,
    pub label: Option<String>,
    pub description: Option<String>,
    pub price: Option<i32>,
    pub duration_days: Option<i32>,
    pub features: Option<Value>,
    pub is_active: Option<bool>,
}

impl UpdatePlanModel {
    pub fn to_entity(&self) -> EditPlanMetaEntity {
        EditPlanMetaEntity {
            name: self.name.as_ref().map(|name| name.trim().to_uppercase()),
            label: self.label.clone(),
            description: self.description.clone(),
            price: self.price,
            duration_days: self.duration_days,
            features: self.features.clone(),
            is_active: self.is_active,
            updated_at: Utc::now(),
        }
    }
}

/// Full catalog row for admin screens, file slots included.
#[derive(Debug, Clone, Serialize)]
pub struct PlanMetaModel {
    pub id: Uuid,
    pub name: String,
    pub label: String,
    pub description: Option<String>,
    pub price: i32,
    pub duration_days: i32,
    pub features: PlanFeatures,
    pub is_active: bool,
    pub file_a_name: Option<String>,
    pub file_a_updated_at: Option<DateTime<Utc>>,
    pub file_b_name: Option<String>,
    pub file_b_updated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PlanMetaEntity> for PlanMetaModel {
    fn from(entity: PlanMetaEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            label: entity.label,
            description: entity.description,
            price: entity.price,
            duration_days: entity.duration_days,
            features: entity.features,
            is_active: entity.is_active,
            file_a_name: entity.file_a_name,
            file_a_updated_at: entity.file_a_updated_at,
            file_b_name: entity.file_b_name,
            file_b_updated_at: entity.file_b_updated_at,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// Public catalog card. File paths never leave the admin surface.
#[derive(Debug, Clone, Serialize)]
pub struct PlanCardDto {
    pub name: String,
    pub label: String,
    pub description: Option<String>,
    pub price: i32,
    pub duration_days: i32,
    pub features: PlanFeatures,
}

impl From<PlanMetaEntity> for PlanCardDto {
    fn from(entity: PlanMetaEntity) -> Self {
        Self {
            name: entity.name,
            label: entity.label,
            description: entity.description,
            price: entity.price,
            duration_days: entity.duration_days,
            features: entity.features,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PlanFileMeta {
    pub name: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// File metadata for members with an active grant. Paths stay server-side.
#[derive(Debug, Clone, Serialize)]
pub struct PlanFilesView {
    pub plan: String,
    pub file_a: PlanFileMeta,
    pub file_b: PlanFileMeta,
}

impl From<PlanMetaEntity> for PlanFilesView {
    fn from(entity: PlanMetaEntity) -> Self {
        Self {
            plan: entity.name,
            file_a: PlanFileMeta {
                name: entity.file_a_name,
                updated_at: entity.file_a_updated_at,
            },
            file_b: PlanFileMeta {
                name: entity.file_b_name,
                updated_at: entity.file_b_updated_at,
            },
        }
    }
}

/// Resolved download target for a slot.
#[derive(Debug, Clone, Serialize)]
pub struct PlanFileDownload {
    pub path: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SetPlanActiveModel {
    pub is_active: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SetPlanFileModel {
    pub path: String,
    pub name: String,
}
