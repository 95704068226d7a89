use chrono::Utc;
use std::str::FromStr;

use super::AuditEvent;
use crate::services::audit_log::{AuditLogEntry, AuditLogService};

/// Receives audit events. Logging never fails the operation that produced
/// the event.
#[cfg_attr(test, mockall::automock)]
pub trait AuditLogger: Send + Sync {
    fn log(&self, event: AuditEvent);
}

/// Writes events to the `audit` tracing target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditLogger;

impl AuditLogger for TracingAuditLogger {
    fn log(&self, event: AuditEvent) {
        emit(&event);
    }
}

/// Writes events to the `audit` tracing target and stores them in the
/// `audit_logs` table on a background task.
#[derive(Debug, Clone)]
pub struct PersistentAuditLogger {
    service: AuditLogService,
}

impl PersistentAuditLogger {
    pub fn new(service: AuditLogService) -> Self {
        Self { service }
    }
}

impl AuditLogger for PersistentAuditLogger {
    fn log(&self, event: AuditEvent) {
        emit(&event);

        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(action = %event.action(), "No runtime available to persist audit event");
            return;
        };

        let service = self.service.clone();
        let entry = AuditLogEntry::from_event(&event, Utc::now());
        handle.spawn(async move {
            if let Err(err) = service.record_event(entry).await {
                tracing::warn!(
                    error = ?err,
                    action = %event.action(),
                    saved_object_id = %event.saved_object.id,
                    "Failed to record audit log"
                );
            }
        });
    }
}

fn emit(event: &AuditEvent) {
    tracing::info!(
        target: "audit",
        action = %event.event.action,
        outcome = event.event.outcome.as_str(),
        saved_object_type = %event.saved_object.object_type,
        saved_object_id = %event.saved_object.id,
        actor = event.actor.as_deref().unwrap_or("unknown"),
        "{}",
        event.message
    );
}

/// Where audit events end up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuditLogSink {
    #[default]
    Tracing,
    Database,
}

impl FromStr for AuditLogSink {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tracing" => Ok(AuditLogSink::Tracing),
            "database" | "db" => Ok(AuditLogSink::Database),
            other => Err(format!("unknown audit log sink: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::{AuditEventType, SavedObjectRef};

    #[test]
    fn sink_parses_case_insensitively() {
        assert_eq!("Tracing".parse::<AuditLogSink>().unwrap(), AuditLogSink::Tracing);
        assert_eq!("database".parse::<AuditLogSink>().unwrap(), AuditLogSink::Database);
        assert!("kafka".parse::<AuditLogSink>().is_err());
    }

    #[test]
    fn tracing_logger_accepts_events() {
        TracingAuditLogger.log(AuditEvent::success(
            "case_user_action_delete_case",
            AuditEventType::Deletion,
            SavedObjectRef::case("1"),
            "User deleted case id: 1",
        ));
    }
}
