pub mod audit_log;
pub mod user_actions;
