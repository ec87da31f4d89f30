pub mod admin_logs;
pub mod admins;
pub mod entitlements;
pub mod enums;
pub mod grants;
pub mod notifications;
pub mod plan_features;
pub mod plans;
pub mod submissions;
pub mod sweeps;
pub mod users;
