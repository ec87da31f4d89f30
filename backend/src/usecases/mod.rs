pub mod accounts;
pub mod admin_accounts;
pub mod admin_users;
pub mod approvals;
pub mod entitlements;
pub mod memberships;
pub mod plan_catalog;
