use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{
    entities::{grants::GrantEntity, users::UserEntity},
    value_objects::{
        enums::{approval_statuses::ApprovalStatus, plan_names::PlanName},
        plan_features::{
            FEATURE_CONSULT_1ON1, FEATURE_MARTINGALE_EA, FEATURE_SIGNAL_CHARTS,
            FEATURE_TELEGRAM_BASIC, FEATURE_TELEGRAM_PRO, FEATURE_TELEGRAM_VIP, PlanFeatures,
        },
    },
};

/// Plan shown when no active grant backs the account.
pub const NO_MEMBERSHIP: &str = "NOMEMBERSHIP";

/// The closed set of access flags the resolver reports. Unknown keys in a
/// snapshot survive in storage but are never granted here.
pub const RECOGNIZED_FEATURES: [&str; 6] = [
    FEATURE_SIGNAL_CHARTS,
    FEATURE_TELEGRAM_BASIC,
    FEATURE_MARTINGALE_EA,
    FEATURE_TELEGRAM_PRO,
    FEATURE_TELEGRAM_VIP,
    FEATURE_CONSULT_1ON1,
];

pub const MSG_ACCESS_GRANTED: &str = "Access granted.";
pub const MSG_ACCOUNT_DEACTIVATED: &str = "This account has been deactivated.";
pub const MSG_WAITING_APPROVAL: &str = "Waiting for admin approval.";
pub const MSG_ACCESS_EXPIRED: &str = "Your access has expired. Please renew your plan.";
pub const MSG_NO_MEMBERSHIP: &str = "No active membership. Submit a plan payment to get started.";

pub type AccessMap = BTreeMap<&'static str, bool>;
pub type QuotaMap = BTreeMap<&'static str, QuotaInfo>;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct QuotaInfo {
    /// None means unlimited.
    pub monthly_limit: Option<u32>,
    pub used: u32,
}

/// Everything the mypage screen needs, resolved from the user row and the
/// latest active grant. Pure data, no queries behind it.
#[derive(Debug, Clone, Serialize)]
pub struct EntitlementView {
    pub id: Uuid,
    pub user_number: i64,
    pub email: String,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub payment_proof_path: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub plan: String,
    pub payment_status: String,
    pub approval_status: String,
    pub access_expires_at: Option<DateTime<Utc>>,
    pub is_expired: bool,
    pub is_active: bool,
    pub access: AccessMap,
    pub quotas: QuotaMap,
    pub status_message: String,
    pub approved_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub remaining_days: Option<i64>,
}

pub fn is_expired(user: &UserEntity, now: DateTime<Utc>) -> bool {
    user.access_expires_at.is_some_and(|expires_at| expires_at < now)
}

/// Active means the account is not deactivated, the approval cache says
/// APPROVED and the expiry timestamp is absent or still in the future.
pub fn is_active(user: &UserEntity, now: DateTime<Utc>) -> bool {
    !user.is_deleted
        && ApprovalStatus::from_str(&user.approval_status) == Some(ApprovalStatus::Approved)
        && !is_expired(user, now)
}

/// Every recognized flag, granted only when the account is active and the
/// snapshot carries a literal `true` for it.
pub fn access_map(features: &PlanFeatures, is_active: bool) -> AccessMap {
    RECOGNIZED_FEATURES
        .iter()
        .map(|key| (*key, is_active && features.flag(key)))
        .collect()
}

/// Consult quota: a CONSULT_LIMIT override in the snapshot wins, otherwise the
/// tier fallback applies. Unknown tiers get no quota entry at all.
pub fn quota_map(plan: &str, features: &PlanFeatures) -> QuotaMap {
    let monthly_limit = match features.consult_limit_override() {
        Some(limit) => Some(Some(limit)),
        None => PlanName::from_str(plan).map(|name| name.default_consult_limit()),
    };

    let mut quotas = QuotaMap::new();
    if let Some(monthly_limit) = monthly_limit {
        quotas.insert(
            FEATURE_CONSULT_1ON1,
            QuotaInfo {
                monthly_limit,
                used: 0,
            },
        );
    }
    quotas
}

/// Days left until `expires_at`, rounded up, floored at zero.
pub fn remaining_days(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let left_ms = (expires_at - now).num_milliseconds();
    let days = (left_ms as f64 / 86_400_000.0).ceil() as i64;
    days.max(0)
}

pub fn status_message(user: &UserEntity, is_expired: bool, is_active: bool) -> &'static str {
    if user.is_deleted {
        return MSG_ACCOUNT_DEACTIVATED;
    }
    if is_active {
        return MSG_ACCESS_GRANTED;
    }
    if ApprovalStatus::from_str(&user.approval_status) == Some(ApprovalStatus::Pending) {
        return MSG_WAITING_APPROVAL;
    }
    if is_expired {
        return MSG_ACCESS_EXPIRED;
    }
    MSG_NO_MEMBERSHIP
}

/// Resolves the full mypage view. The grant argument is ignored unless the
/// account is active, so feature access always flows from an active snapshot.
pub fn build_view(
    user: &UserEntity,
    grant: Option<&GrantEntity>,
    now: DateTime<Utc>,
) -> EntitlementView {
    let expired = is_expired(user, now);
    let active = is_active(user, now);

    let grant = if active { grant } else { None };

    let empty_features = PlanFeatures::default();
    let features = grant
        .map(|grant| &grant.features)
        .unwrap_or(&empty_features);
    let plan = grant
        .map(|grant| grant.plan.clone())
        .unwrap_or_else(|| NO_MEMBERSHIP.to_string());

    let approved_at = grant.map(|grant| grant.approved_at);
    let expires_at = grant.map(|grant| grant.expires_at);
    let remaining = expires_at.map(|expires_at| remaining_days(expires_at, now));

    EntitlementView {
        id: user.id,
        user_number: user.user_number,
        email: user.email.clone(),
        name: user.name.clone(),
        phone: user.phone.clone(),
        payment_proof_path: user.payment_proof_path.clone(),
        created_at: user.created_at,
        updated_at: user.updated_at,
        plan: plan.clone(),
        payment_status: user.payment_status.clone(),
        approval_status: user.approval_status.clone(),
        access_expires_at: user.access_expires_at,
        is_expired: expired,
        is_active: active,
        access: access_map(features, active),
        quotas: quota_map(&plan, features),
        status_message: status_message(user, expired, active).to_string(),
        approved_at,
        expires_at,
        remaining_days: remaining,
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use serde_json::json;

    use super::*;
    use crate::domain::value_objects::enums::payment_statuses::PaymentStatus;

    fn user(approval_status: &str, access_expires_at: Option<DateTime<Utc>>) -> UserEntity {
        let now = Utc::now();
        UserEntity {
            id: Uuid::new_v4(),
            user_number: 80001,
            email: "member@example.com".to_string(),
            password_hash: "hash".to_string(),
            name: Some("Member".to_string()),
            phone: None,
            membership_plan: None,
            payment_method: None,
            payment_status: PaymentStatus::Completed.to_string(),
            approval_status: approval_status.to_string(),
            payment_proof_path: None,
            access_expires_at,
            account_number: None,
            refresh_token_hash: None,
            reset_token_hash: None,
            reset_token_expires_at: None,
            is_deleted: false,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn grant(plan: &str, features: serde_json::Value, expires_at: DateTime<Utc>) -> GrantEntity {
        let now = Utc::now();
        GrantEntity {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            plan: plan.to_string(),
            label: format!("{plan} plan"),
            features: PlanFeatures::from_value(features),
            price: 100_000,
            duration_days: 30,
            approved_by: Uuid::new_v4(),
            approved_at: now,
            expires_at,
            revoked_at: None,
            created_at: now,
        }
    }

    #[test]
    fn active_user_gets_flags_from_the_snapshot() {
        let now = Utc::now();
        let user = user("APPROVED", Some(now + Duration::days(10)));
        let grant = grant(
            "BASIC",
            json!({"SIGNAL_CHARTS": true, "TELEGRAM_BASIC": true, "MARTINGALE_EA": false}),
            now + Duration::days(10),
        );

        let view = build_view(&user, Some(&grant), now);

        assert!(view.is_active);
        assert!(!view.is_expired);
        assert_eq!(view.plan, "BASIC");
        assert_eq!(view.status_message, MSG_ACCESS_GRANTED);
        assert_eq!(view.access[FEATURE_SIGNAL_CHARTS], true);
        assert_eq!(view.access[FEATURE_TELEGRAM_BASIC], true);
        assert_eq!(view.access[FEATURE_MARTINGALE_EA], false);
        assert_eq!(view.access[FEATURE_TELEGRAM_VIP], false);
        assert_eq!(view.remaining_days, Some(10));
    }

    #[test]
    fn unknown_snapshot_keys_are_never_reported() {
        let now = Utc::now();
        let grant = grant(
            "BASIC",
            json!({"SIGNAL_CHARTS": true, "SOME_FUTURE_FLAG": true}),
            now + Duration::days(5),
        );
        let user = user("APPROVED", Some(now + Duration::days(5)));

        let view = build_view(&user, Some(&grant), now);

        assert_eq!(view.access.len(), RECOGNIZED_FEATURES.len());
        assert!(!view.access.contains_key("SOME_FUTURE_FLAG"));
    }

    #[test]
    fn pending_user_sees_no_access() {
        let now = Utc::now();
        let user = user("PENDING", None);

        let view = build_view(&user, None, now);

        assert!(!view.is_active);
        assert_eq!(view.plan, NO_MEMBERSHIP);
        assert_eq!(view.status_message, MSG_WAITING_APPROVAL);
        assert!(view.access.values().all(|granted| !granted));
        assert!(view.quotas.is_empty());
    }

    #[test]
    fn expired_user_is_demoted_even_with_a_grant_on_hand() {
        let now = Utc::now();
        let user = user("APPROVED", Some(now - Duration::days(1)));
        let grant = grant(
            "PRO",
            json!({"SIGNAL_CHARTS": true, "TELEGRAM_PRO": true}),
            now + Duration::days(30),
        );

        let view = build_view(&user, Some(&grant), now);

        assert!(view.is_expired);
        assert!(!view.is_active);
        assert_eq!(view.plan, NO_MEMBERSHIP);
        assert_eq!(view.status_message, MSG_ACCESS_EXPIRED);
        assert!(view.access.values().all(|granted| !granted));
        assert_eq!(view.approved_at, None);
        assert_eq!(view.remaining_days, None);
    }

    #[test]
    fn pending_wins_over_expired_in_the_status_message() {
        let now = Utc::now();
        let user = user("PENDING", Some(now - Duration::days(1)));

        let view = build_view(&user, None, now);

        assert_eq!(view.status_message, MSG_WAITING_APPROVAL);
    }

    #[test]
    fn active_without_grant_shows_no_membership_plan() {
        // Approval cache can outlive a revoked grant; access must still be off.
        let now = Utc::now();
        let user = user("APPROVED", Some(now + Duration::days(3)));

        let view = build_view(&user, None, now);

        assert!(view.is_active);
        assert_eq!(view.plan, NO_MEMBERSHIP);
        assert!(view.access.values().all(|granted| !granted));
        assert!(view.quotas.is_empty());
    }

    #[test]
    fn consult_quota_falls_back_per_tier() {
        let features = PlanFeatures::default();

        let basic = quota_map("BASIC", &features);
        assert_eq!(basic[FEATURE_CONSULT_1ON1].monthly_limit, Some(2));

        let pro = quota_map("PRO", &features);
        assert_eq!(pro[FEATURE_CONSULT_1ON1].monthly_limit, Some(4));

        let vip = quota_map("VIP", &features);
        assert_eq!(vip[FEATURE_CONSULT_1ON1].monthly_limit, None);

        assert!(quota_map("NOMEMBERSHIP", &features).is_empty());
        assert!(quota_map("PARTNER", &features).is_empty());
    }

    #[test]
    fn consult_limit_override_beats_the_tier_fallback() {
        let features = PlanFeatures::from_value(json!({"CONSULT_LIMIT": 9}));

        let quotas = quota_map("BASIC", &features);

        assert_eq!(quotas[FEATURE_CONSULT_1ON1].monthly_limit, Some(9));
        assert_eq!(quotas[FEATURE_CONSULT_1ON1].used, 0);
    }

    #[test]
    fn remaining_days_round_up_and_floor_at_zero() {
        let now = Utc::now();

        assert_eq!(remaining_days(now + Duration::hours(36), now), 2);
        assert_eq!(remaining_days(now + Duration::days(10), now), 10);
        assert_eq!(remaining_days(now + Duration::milliseconds(1), now), 1);
        assert_eq!(remaining_days(now - Duration::days(2), now), 0);
    }

    #[test]
    fn deactivated_account_overrides_everything() {
        let now = Utc::now();
        let mut deleted = user("APPROVED", Some(now + Duration::days(30)));
        deleted.is_deleted = true;
        let grant = grant(
            "VIP",
            json!({"TELEGRAM_VIP": true}),
            now + Duration::days(30),
        );

        let view = build_view(&deleted, Some(&grant), now);

        assert!(!view.is_active);
        assert_eq!(view.status_message, MSG_ACCOUNT_DEACTIVATED);
        assert!(view.access.values().all(|granted| !granted));
    }

    #[test]
    fn malformed_approval_status_reads_as_no_access() {
        let now = Utc::now();
        let user = user("SOMETHING_ELSE", None);

        let view = build_view(&user, None, now);

        assert!(!view.is_active);
        assert_eq!(view.status_message, MSG_NO_MEMBERSHIP);
    }
}
