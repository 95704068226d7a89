use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::types::AuditLogId;

/// Row of the `audit_logs` table: one persisted audit event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct AuditLog {
    #[schema(value_type = String)]
    pub id: AuditLogId,
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
