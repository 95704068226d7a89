use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::{
    audit::AuditEvent,
    models::audit_log::AuditLog,
    repositories::audit_log::{self as audit_log_repo, AuditLogFilters},
    types::AuditLogId,
};

#[derive(Debug, Clone)]
pub struct AuditLogEntry {
    pub occurred_at: DateTime<Utc>,
    pub actor: Option<String>,
    pub action: String,
    pub category: String,
    pub event_type: String,
    pub outcome: String,
    pub saved_object_type: String,
    pub saved_object_id: String,
    pub message: String,
}

impl AuditLogEntry {
    /// Flattens an audit event into a single row. Multi-valued categories and
    /// types are joined with commas.
    pub fn from_event(event: &AuditEvent, occurred_at: DateTime<Utc>) -> Self {
        Self {
            occurred_at,
            actor: event.actor.clone(),
            action: event.event.action.clone(),
            category: event.event.category.join(","),
            event_type: event
                .event
                .event_type
                .iter()
                .map(|event_type| event_type.as_str())
                .collect::<Vec<_>>()
                .join(","),
            outcome: event.event.outcome.as_str().to_string(),
            saved_object_type: event.saved_object.object_type.clone(),
            saved_object_id: event.saved_object.id.clone(),
            message: event.message.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AuditLogService {
    pool: PgPool,
}

impl AuditLogService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn record_event(&self, entry: AuditLogEntry) -> Result<AuditLogId, sqlx::Error> {
        let log = AuditLog {
            id: AuditLogId::new(),
            occurred_at: entry.occurred_at,
            actor: entry.actor,
            action: entry.action,
            category: entry.category,
            event_type: entry.event_type,
            outcome: entry.outcome,
            saved_object_type: entry.saved_object_type,
            saved_object_id: entry.saved_object_id,
            message: entry.message,
        };

        audit_log_repo::insert_audit_log(&self.pool, &log).await?;
        Ok(log.id)
    }

    pub async fn list(
        &self,
        filters: &AuditLogFilters,
        page: i64,
        per_page: i64,
    ) -> Result<(Vec<AuditLog>, i64), sqlx::Error> {
        let offset = page.saturating_sub(1).saturating_mul(per_page);
        audit_log_repo::list_audit_logs(&self.pool, filters, per_page, offset).await
    }

    pub async fn delete_logs_before(&self, cutoff: DateTime<Utc>) -> Result<u64, sqlx::Error> {
        audit_log_repo::delete_audit_logs_before(&self.pool, cutoff).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::{AuditEventType, SavedObjectRef};

    #[test]
    fn entry_flattens_event_fields() {
        let event = AuditEvent::success(
            "case_user_action_delete_comment",
            AuditEventType::Deletion,
            SavedObjectRef::comment("1"),
            "User deleted comment id: 1 for case id: 123 - user action id: 0",
        )
        .with_actor(Some("elastic".to_string()));
        let now = Utc::now();

        let entry = AuditLogEntry::from_event(&event, now);

        assert_eq!(entry.occurred_at, now);
        assert_eq!(entry.actor.as_deref(), Some("elastic"));
        assert_eq!(entry.action, "case_user_action_delete_comment");
        assert_eq!(entry.category, "database");
        assert_eq!(entry.event_type, "deletion");
        assert_eq!(entry.outcome, "success");
        assert_eq!(entry.saved_object_type, "cases-comments");
        assert_eq!(entry.saved_object_id, "1");
    }
}
