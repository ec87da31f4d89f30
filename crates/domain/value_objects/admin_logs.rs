use chrono::Utc;
use uuid::Uuid;

use crate::domain::entities::admin_logs::InsertAdminLogEntity;

pub const ACTION_APPROVE_SUBMISSION: &str = "APPROVE_SUBMISSION";
pub const ACTION_REJECT_SUBMISSION: &str = "REJECT_SUBMISSION";
pub const ACTION_CREATE_PLAN: &str = "CREATE_PLAN";
pub const ACTION_UPDATE_PLAN: &str = "UPDATE_PLAN";
pub const ACTION_DELETE_PLAN: &str = "DELETE_PLAN";
pub const ACTION_SET_PLAN_ACTIVE: &str = "SET_PLAN_ACTIVE";
pub const ACTION_SET_PLAN_FILE: &str = "SET_PLAN_FILE";
pub const ACTION_CLEAR_PLAN_FILE: &str = "CLEAR_PLAN_FILE";
pub const ACTION_CREATE_USER: &str = "CREATE_USER";
pub const ACTION_UPDATE_USER: &str = "UPDATE_USER";
pub const ACTION_DELETE_USER: &str = "DELETE_USER";
pub const ACTION_REVOKE_GRANT: &str = "REVOKE_GRANT";

/// Audit row aimed at a user account.
pub fn user_action(
    admin_id: Uuid,
    action: &str,
    target_user_id: Uuid,
    note: Option<String>,
) -> InsertAdminLogEntity {
    InsertAdminLogEntity {
        admin_id,
        action: action.to_string(),
        target_user_id: Some(target_user_id),
        target_submission_id: None,
        note,
        created_at: Utc::now(),
    }
}

/// Audit row aimed at a review decision.
pub fn submission_action(
    admin_id: Uuid,
    action: &str,
    target_user_id: Uuid,
    target_submission_id: Uuid,
    note: Option<String>,
) -> InsertAdminLogEntity {
    InsertAdminLogEntity {
        admin_id,
        action: action.to_string(),
        target_user_id: Some(target_user_id),
        target_submission_id: Some(target_submission_id),
        note,
        created_at: Utc::now(),
    }
}

/// Audit row for catalog work. The tier name travels in the note.
pub fn plan_action(admin_id: Uuid, action: &str, note: Option<String>) -> InsertAdminLogEntity {
    InsertAdminLogEntity {
        admin_id,
        action: action.to_string(),
        target_user_id: None,
        target_submission_id: None,
        note,
        created_at: Utc::now(),
    }
}
