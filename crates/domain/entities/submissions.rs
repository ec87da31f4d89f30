use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infra::db::postgres::schema::payment_submissions;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = payment_submissions)]
pub struct SubmissionEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub plan: String,
    pub payment_method: String,
    pub proof_path: Option<String>,
    pub proof_name: Option<String>,
    pub status: String,
    pub admin_note: Option<String>,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Review fields stay None for member submissions; the admin pre-approval
/// path writes a submission that is born reviewed.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = payment_submissions)]
pub struct InsertSubmissionEntity {
    pub user_id: Uuid,
    pub plan: String,
    pub payment_method: String,
    pub proof_path: Option<String>,
    pub proof_name: Option<String>,
    pub status: String,
    pub admin_note: Option<String>,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
