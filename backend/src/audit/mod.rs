//! Structured audit trail for user actions.
//!
//! Every persisted user action (and every case deletion) produces one
//! [`AuditEvent`]. Events are handed to an [`AuditLogger`], which either
//! writes them to the `audit` tracing target or additionally persists them to
//! the `audit_logs` table.

pub mod event;
pub mod logger;

pub use event::{AuditEvent, AuditEventType, AuditOutcome, EventDetails, SavedObjectRef};
pub use logger::{AuditLogSink, AuditLogger, PersistentAuditLogger, TracingAuditLogger};

#[cfg(test)]
pub use logger::MockAuditLogger;
