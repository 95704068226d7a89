use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::common::push_clause;
use crate::models::audit_log::AuditLog;
use crate::types::AuditLogId;

const AUDIT_LOG_COLUMNS: &str = "id, occurred_at, actor, action, category, event_type, outcome, \
     saved_object_type, saved_object_id, message";

#[derive(Debug, Clone, Default)]
pub struct AuditLogFilters {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub actor: Option<String>,
    pub action: Option<String>,
    pub saved_object_type: Option<String>,
    pub saved_object_id: Option<String>,
    pub outcome: Option<String>,
}

pub async fn insert_audit_log(pool: &PgPool, log: &AuditLog) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO audit_logs \
         (id, occurred_at, actor, action, category, event_type, outcome, saved_object_type, \
         saved_object_id, message) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
    )
    .bind(log.id)
    .bind(log.occurred_at)
    .bind(&log.actor)
    .bind(&log.action)
    .bind(&log.category)
    .bind(&log.event_type)
    .bind(&log.outcome)
    .bind(&log.saved_object_type)
    .bind(&log.saved_object_id)
    .bind(&log.message)
    .execute(pool)
    .await
    .map(|_| ())
}

pub async fn fetch_audit_log(
    pool: &PgPool,
    id: AuditLogId,
) -> Result<Option<AuditLog>, sqlx::Error> {
    sqlx::query_as::<_, AuditLog>(&format!(
        "SELECT {} FROM audit_logs WHERE id = $1",
        AUDIT_LOG_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn list_audit_logs(
    pool: &PgPool,
    filters: &AuditLogFilters,
    per_page: i64,
    offset: i64,
) -> Result<(Vec<AuditLog>, i64), sqlx::Error> {
    let mut builder: QueryBuilder<Postgres> =
        QueryBuilder::new(format!("SELECT {} FROM audit_logs", AUDIT_LOG_COLUMNS));
    let mut has_clause = false;
    apply_audit_log_filters(&mut builder, &mut has_clause, filters);
    builder
        .push(" ORDER BY occurred_at DESC, id DESC LIMIT ")
        .push_bind(per_page)
        .push(" OFFSET ")
        .push_bind(offset);
    let items = builder.build_query_as::<AuditLog>().fetch_all(pool).await?;

    let mut count_builder: QueryBuilder<Postgres> =
        QueryBuilder::new("SELECT COUNT(*) FROM audit_logs");
    let mut count_has_clause = false;
    apply_audit_log_filters(&mut count_builder, &mut count_has_clause, filters);
    let total = count_builder
        .build_query_scalar::<i64>()
        .fetch_one(pool)
        .await?;

    Ok((items, total))
}

pub async fn delete_audit_logs_before(
    pool: &PgPool,
    cutoff: DateTime<Utc>,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM audit_logs WHERE occurred_at < $1")
        .bind(cutoff)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

fn apply_audit_log_filters(
    builder: &mut QueryBuilder<'_, Postgres>,
    has_clause: &mut bool,
    filters: &AuditLogFilters,
) {
    if let Some(from) = filters.from {
        push_clause(builder, has_clause);
        builder.push("occurred_at >= ").push_bind(from);
    }
    if let Some(to) = filters.to {
        push_clause(builder, has_clause);
        builder.push("occurred_at <= ").push_bind(to);
    }
    let text_filters = [
        ("actor", &filters.actor),
        ("action", &filters.action),
        ("saved_object_type", &filters.saved_object_type),
        ("saved_object_id", &filters.saved_object_id),
        ("outcome", &filters.outcome),
    ];
    for (column, value) in text_filters {
        if let Some(value) = value {
            push_clause(builder, has_clause);
            builder.push(column).push(" = ").push_bind(value.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_build_where_clause_in_order() {
        let filters = AuditLogFilters {
            action: Some("case_user_action_create_case".to_string()),
            saved_object_id: Some("123".to_string()),
            ..Default::default()
        };
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("SELECT 1 FROM audit_logs");
        let mut has_clause = false;
        apply_audit_log_filters(&mut builder, &mut has_clause, &filters);

        assert!(has_clause);
        assert_eq!(
            builder.sql(),
            "SELECT 1 FROM audit_logs WHERE action = $1 AND saved_object_id = $2"
        );
    }

    #[test]
    fn empty_filters_leave_query_untouched() {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("SELECT 1 FROM audit_logs");
        let mut has_clause = false;
        apply_audit_log_filters(&mut builder, &mut has_clause, &AuditLogFilters::default());

        assert!(!has_clause);
        assert_eq!(builder.sql(), "SELECT 1 FROM audit_logs");
    }
}
