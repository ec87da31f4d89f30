pub mod admin_logs;
pub mod admins;
pub mod approvals;
pub mod grants;
pub mod plan_meta;
pub mod submissions;
pub mod sweep;
pub mod users;
