use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::admins::{AdminEntity, RegisterAdminEntity};

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterAdminModel {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdminLoginModel {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct NewAdmin {
    pub email: String,
    pub password_hash: String,
}

impl NewAdmin {
    pub fn to_entity(&self) -> RegisterAdminEntity {
        RegisterAdminEntity {
            email: self.email.clone(),
            password_hash: self.password_hash.clone(),
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminProfileModel {
    pub id: Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<AdminEntity> for AdminProfileModel {
    fn from(entity: AdminEntity) -> Self {
        Self {
            id: entity.id,
            email: entity.email,
            created_at: entity.created_at,
        }
    }
}
