pub mod audit_logs;
pub mod user_actions;
