use chrono::Utc;
use uuid::Uuid;

use crate::domain::entities::notifications::InsertNotificationEntity;

pub const KIND_USER_REGISTERED: &str = "USER_REGISTERED";
pub const KIND_NEW_PAYMENT_PROOF: &str = "NEW_PAYMENT_PROOF";

pub fn user_registered(user_id: Uuid, user_number: i64, email: &str) -> InsertNotificationEntity {
    InsertNotificationEntity {
        user_id: Some(user_id),
        kind: KIND_USER_REGISTERED.to_string(),
        message: format!("New user #{user_number}: {email}"),
        plan: None,
        is_read: false,
        is_approved: false,
        is_payed: false,
        created_at: Utc::now(),
    }
}

/// Admin-queue entry for a fresh payment proof. The approval transaction
/// later resolves it by flipping is_read, is_approved and is_payed together.
pub fn payment_submitted(user_id: Uuid, display_name: &str, plan: &str) -> InsertNotificationEntity {
    InsertNotificationEntity {
        user_id: Some(user_id),
        kind: KIND_NEW_PAYMENT_PROOF.to_string(),
        message: format!("{display_name} submitted a {plan} plan payment."),
        plan: Some(plan.to_string()),
        is_read: false,
        is_approved: false,
        is_payed: false,
        created_at: Utc::now(),
    }
}
