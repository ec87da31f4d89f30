use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    entities::users::{EditUserEntity, RegisterUserEntity, UserEntity},
    value_objects::{
        enums::{approval_statuses::ApprovalStatus, payment_statuses::PaymentStatus},
        submissions::LatestSubmissionBrief,
    },
};

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterUserModel {
    pub email: String,
    pub password: String,
    pub name: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginModel {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefreshTokenModel {
    pub refresh_token: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForgotPasswordModel {
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResetPasswordModel {
    pub token: String,
    pub new_password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccountNumberModel {
    pub account_number: String,
}

/// First member number handed out when the users table is empty.
pub const USER_NUMBER_SEED: i64 = 80_000;

/// Registration payload after the password has been hashed. The member number
/// is assigned inside the insert transaction.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub name: Option<String>,
    pub phone: Option<String>,
}

impl NewUser {
    pub fn to_entity(&self, user_number: i64) -> RegisterUserEntity {
        let now = Utc::now();
        RegisterUserEntity {
            user_number,
            email: self.email.clone(),
            password_hash: self.password_hash.clone(),
            name: self.name.clone(),
            phone: self.phone.clone(),
            payment_status: PaymentStatus::None.to_string(),
            approval_status: ApprovalStatus::None.to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdminCreateUserModel {
    pub email: String,
    pub password: String,
    pub name: Option<String>,
    pub phone: Option<String>,
    /// When set, the account is created already approved on this plan.
    pub plan: Option<String>,
    pub payment_method: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdminUpdateUserModel {
    pub email: Option<String>,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub password: Option<String>,
}

impl AdminUpdateUserModel {
    pub fn to_entity(&self, password_hash: Option<String>) -> EditUserEntity {
        EditUserEntity {
            email: self
                .email
                .as_ref()
                .map(|email| email.trim().to_lowercase()),
            password_hash,
            name: self.name.clone(),
            phone: self.phone.clone(),
            updated_at: Utc::now(),
        }
    }
}

/// Profile block returned alongside tokens and on /me.
#[derive(Debug, Clone, Serialize)]
pub struct UserProfileModel {
    pub id: Uuid,
    pub user_number: i64,
    pub email: String,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub membership_plan: Option<String>,
    pub payment_status: String,
    pub approval_status: String,
    pub account_number: Option<String>,
    pub access_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<UserEntity> for UserProfileModel {
    fn from(entity: UserEntity) -> Self {
        Self {
            id: entity.id,
            user_number: entity.user_number,
            email: entity.email,
            name: entity.name,
            phone: entity.phone,
            membership_plan: entity.membership_plan,
            payment_status: entity.payment_status,
            approval_status: entity.approval_status,
            account_number: entity.account_number,
            access_expires_at: entity.access_expires_at,
            created_at: entity.created_at,
        }
    }
}

/// Row shape for the admin member table, with the newest submission attached.
#[derive(Debug, Clone, Serialize)]
pub struct UserAdminView {
    pub id: Uuid,
    pub user_number: i64,
    pub email: String,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub membership_plan: Option<String>,
    pub payment_method: Option<String>,
    pub payment_status: String,
    pub approval_status: String,
    pub payment_proof_path: Option<String>,
    pub access_expires_at: Option<DateTime<Utc>>,
    pub account_number: Option<String>,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub latest_submission: Option<LatestSubmissionBrief>,
}

impl UserAdminView {
    pub fn from_entity(user: UserEntity, latest_submission: Option<LatestSubmissionBrief>) -> Self {
        Self {
            id: user.id,
            user_number: user.user_number,
            email: user.email,
            name: user.name,
            phone: user.phone,
            membership_plan: user.membership_plan,
            payment_method: user.payment_method,
            payment_status: user.payment_status,
            approval_status: user.approval_status,
            payment_proof_path: user.payment_proof_path,
            access_expires_at: user.access_expires_at,
            account_number: user.account_number,
            is_deleted: user.is_deleted,
            created_at: user.created_at,
            updated_at: user.updated_at,
            latest_submission,
        }
    }
}
