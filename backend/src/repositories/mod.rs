pub mod audit_log;
pub mod common;
pub mod user_action;

pub use audit_log::AuditLogFilters;
pub use user_action::{PgUserActionStore, PushRecords, UserActionQuery, UserActionStore};
