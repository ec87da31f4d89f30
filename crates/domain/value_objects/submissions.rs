use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    entities::submissions::{InsertSubmissionEntity, SubmissionEntity},
    value_objects::enums::{
        approval_statuses::ApprovalStatus, payment_methods::PaymentMethod,
        payment_statuses::PaymentStatus, submission_statuses::SubmissionStatus,
    },
};

pub const MSG_NO_SUBMISSIONS: &str = "No submissions yet.";
pub const MSG_PAYMENT_UNDER_REVIEW: &str = "Payment under review.";
pub const MSG_PAYMENT_CONFIRMED: &str = "Payment confirmed.";
pub const MSG_WAITING_FOR_APPROVAL: &str = "Waiting for approval.";
pub const MSG_APPROVED: &str = "Approved!";

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitMembershipModel {
    pub membership_plan: String,
    pub payment_method: String,
    pub proof_path: String,
    pub proof_name: Option<String>,
}

impl SubmitMembershipModel {
    pub fn to_entity(
        &self,
        user_id: Uuid,
        plan_name: String,
        payment_method: PaymentMethod,
    ) -> InsertSubmissionEntity {
        InsertSubmissionEntity {
            user_id,
            plan: plan_name,
            payment_method: payment_method.to_string(),
            proof_path: Some(self.proof_path.clone()),
            proof_name: self.proof_name.clone(),
            status: SubmissionStatus::Pending.to_string(),
            admin_note: None,
            reviewed_by: None,
            reviewed_at: None,
            created_at: Utc::now(),
        }
    }
}

/// Body of an approve or reject call. The note lands on the submission and
/// in the audit trail.
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewDecisionModel {
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SubmissionModel {
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

impl From<SubmissionEntity> for SubmissionModel {
    fn from(entity: SubmissionEntity) -> Self {
        Self {
            id: entity.id,
            user_id: entity.user_id,
            plan: entity.plan,
            payment_method: entity.payment_method,
            proof_path: entity.proof_path,
            proof_name: entity.proof_name,
            status: entity.status,
            admin_note: entity.admin_note,
            reviewed_by: entity.reviewed_by,
            reviewed_at: entity.reviewed_at,
            created_at: entity.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LatestSubmissionBrief {
    pub id: Uuid,
    pub status: String,
    pub plan: String,
    pub created_at: DateTime<Utc>,
}

impl From<SubmissionEntity> for LatestSubmissionBrief {
    fn from(entity: SubmissionEntity) -> Self {
        Self {
            id: entity.id,
            status: entity.status,
            plan: entity.plan,
            created_at: entity.created_at,
        }
    }
}

/// Gate payload for the submission screen.
#[derive(Debug, Clone, Serialize)]
pub struct LatestSubmissionView {
    pub latest: Option<LatestSubmissionBrief>,
    pub payment_status: String,
    pub approval_status: String,
    pub status_message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmissionUserBrief {
    pub user_number: i64,
    pub email: String,
    pub name: Option<String>,
    pub phone: Option<String>,
}

/// A pending submission joined with the member it belongs to, for the review
/// queue.
#[derive(Debug, Clone, Serialize)]
pub struct PendingReviewView {
    pub id: Uuid,
    pub user_id: Uuid,
    pub plan: String,
    pub payment_method: String,
    pub proof_path: Option<String>,
    pub proof_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub user: SubmissionUserBrief,
}

/// Resolves the user-facing line under the payment form. Later lifecycle
/// stages override earlier ones.
pub fn latest_submission_message(payment_status: &str, approval_status: &str) -> &'static str {
    let mut message = MSG_NO_SUBMISSIONS;

    match PaymentStatus::from_str(payment_status) {
        Some(PaymentStatus::Verifying) => message = MSG_PAYMENT_UNDER_REVIEW,
        Some(PaymentStatus::Completed) => message = MSG_PAYMENT_CONFIRMED,
        _ => {}
    }

    match ApprovalStatus::from_str(approval_status) {
        Some(ApprovalStatus::Pending) => message = MSG_WAITING_FOR_APPROVAL,
        Some(ApprovalStatus::Approved) => message = MSG_APPROVED,
        _ => {}
    }

    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_account_has_no_submission_message() {
        assert_eq!(latest_submission_message("NONE", "NONE"), MSG_NO_SUBMISSIONS);
    }

    #[test]
    fn payment_stage_sets_the_message() {
        assert_eq!(
            latest_submission_message("VERIFYING", "NONE"),
            MSG_PAYMENT_UNDER_REVIEW
        );
        assert_eq!(
            latest_submission_message("COMPLETED", "NONE"),
            MSG_PAYMENT_CONFIRMED
        );
    }

    #[test]
    fn approval_stage_overrides_the_payment_stage() {
        assert_eq!(
            latest_submission_message("VERIFYING", "PENDING"),
            MSG_WAITING_FOR_APPROVAL
        );
        assert_eq!(
            latest_submission_message("COMPLETED", "APPROVED"),
            MSG_APPROVED
        );
    }

    #[test]
    fn unknown_statuses_fall_back_to_the_default() {
        assert_eq!(
            latest_submission_message("GARBAGE", "ALSO_GARBAGE"),
            MSG_NO_SUBMISSIONS
        );
    }
}
