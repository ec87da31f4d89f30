pub mod accounts;
pub mod admin_accounts;
pub mod admin_plans;
pub mod admin_reviews;
pub mod admin_users;
pub mod memberships;
