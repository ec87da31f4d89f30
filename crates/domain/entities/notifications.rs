use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infra::db::postgres::schema::notifications;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = notifications)]
pub struct NotificationEntity {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub kind: String,
    pub message: String,
    pub plan: Option<String>,
    pub is_read: bool,
    pub is_approved: bool,
    pub is_payed: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = notifications)]
pub struct InsertNotificationEntity {
    pub user_id: Option<Uuid>,
    pub kind: String,
    pub message: String,
    pub plan: Option<String>,
    pub is_read: bool,
    pub is_approved: bool,
    pub is_payed: bool,
    pub created_at: DateTime<Utc>,
}
