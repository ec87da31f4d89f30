pub mod approval_statuses;
pub mod payment_methods;
pub mod payment_statuses;
pub mod plan_names;
pub mod submission_statuses;
pub mod sweep_job_statuses;
