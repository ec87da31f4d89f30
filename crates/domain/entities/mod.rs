pub mod admin_logs;
pub mod admins;
pub mod grants;
pub mod notifications;
pub mod plan_meta;
pub mod submissions;
pub mod sweep_jobs;
pub mod users;
