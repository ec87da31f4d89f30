use chrono::{DateTime, Utc};

use crate::domain::{
    entities::sweep_jobs::InsertSweepJobEntity,
    value_objects::enums::sweep_job_statuses::SweepJobStatus,
};

pub const KIND_EXPIRE_ACCESS: &str = "EXPIRE_ACCESS";

pub fn expire_access_job(scheduled_at: DateTime<Utc>) -> InsertSweepJobEntity {
    InsertSweepJobEntity {
        kind: KIND_EXPIRE_ACCESS.to_string(),
        status: SweepJobStatus::Pending.to_string(),
        scheduled_at,
        created_at: Utc::now(),
    }
}
