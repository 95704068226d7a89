//! Persistence of case user actions.
//!
//! [`UserActionStore`] is the seam between the user action services and
//! PostgreSQL. Service code only ever talks to the trait so it can be driven
//! by `MockUserActionStore` in unit tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{types::Json, PgExecutor, PgPool, Postgres, QueryBuilder};

use super::common::{push_clause, push_in_list};
use crate::models::{
    find::{FindTypeFilter, SortOrder, UserActionStats},
    user_action::{NewUserAction, UserActionRecord, UserActionType},
};
use crate::types::UserActionId;

const USER_ACTION_COLUMNS: &str = "id, case_id, comment_id, connector_id, action, type, payload, \
     created_at, created_by, owner, \"references\"";

/// Upper bound on distinct connectors returned for a single case.
pub const MAX_CONNECTORS_PER_CASE: i64 = 100;

const CONNECTOR_TYPES: [UserActionType; 2] = [UserActionType::Connector, UserActionType::CreateCase];

/// Paging, ordering and category filters for listing a case's user actions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserActionQuery {
    /// OR-ed together. Empty or containing `All` matches every record.
    pub filters: Vec<FindTypeFilter>,
    pub sort: SortOrder,
    pub limit: Option<i64>,
    pub offset: i64,
}

impl UserActionQuery {
    pub fn all_ascending() -> Self {
        Self::default()
    }
}

/// Newest and oldest push of a case to one connector.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PushRecords {
    pub most_recent: Option<UserActionRecord>,
    pub oldest: Option<UserActionRecord>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserActionStore: Send + Sync {
    /// Persists one user action and returns it with its assigned id.
    async fn create(&self, action: NewUserAction) -> Result<UserActionRecord, sqlx::Error>;

    /// Persists all actions atomically, preserving their order.
    async fn bulk_create(
        &self,
        actions: Vec<NewUserAction>,
    ) -> Result<Vec<UserActionRecord>, sqlx::Error>;

    async fn find_for_case(
        &self,
        case_id: &str,
        query: &UserActionQuery,
    ) -> Result<Vec<UserActionRecord>, sqlx::Error>;

    /// Counts the records `find_for_case` would match without paging.
    async fn count_for_case(&self, case_id: &str, query: &UserActionQuery) -> Result<i64, sqlx::Error>;

    /// Newest record of the case among `types` (every type when empty).
    async fn latest_for_case(
        &self,
        case_id: &str,
        types: Vec<UserActionType>,
        exclude_alert_comments: bool,
    ) -> Result<Option<UserActionRecord>, sqlx::Error>;

    /// Newest `connector` or `create_case` record naming `connector_id`,
    /// created strictly before `before` when given.
    async fn connector_actions(
        &self,
        case_id: &str,
        connector_id: &str,
        before: Option<DateTime<Utc>>,
    ) -> Result<Option<UserActionRecord>, sqlx::Error>;

    async fn pushes_for_connector(
        &self,
        case_id: &str,
        connector_id: &str,
    ) -> Result<PushRecords, sqlx::Error>;

    /// Distinct connector ids referenced by records of the given types.
    async fn connector_ids(
        &self,
        case_id: &str,
        types: Vec<UserActionType>,
    ) -> Result<Vec<String>, sqlx::Error>;

    async fn stats_for_case(&self, case_id: &str) -> Result<UserActionStats, sqlx::Error>;

    /// Distinct acting users of the case with the owner of their latest action.
    async fn participants(&self, case_id: &str) -> Result<Vec<(Json<serde_json::Value>, String)>, sqlx::Error>;

    /// Every uid that appears in an assignees or create_case payload.
    async fn assignee_uids(&self, case_id: &str) -> Result<Vec<String>, sqlx::Error>;

    async fn delete_for_cases(&self, case_ids: Vec<String>) -> Result<u64, sqlx::Error>;
}

#[derive(Debug, Clone)]
pub struct PgUserActionStore {
    pool: PgPool,
}

impl PgUserActionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserActionStore for PgUserActionStore {
    async fn create(&self, action: NewUserAction) -> Result<UserActionRecord, sqlx::Error> {
        let record = action.into_record(UserActionId::new());
        insert_record(&self.pool, &record).await
    }

    async fn bulk_create(
        &self,
        actions: Vec<NewUserAction>,
    ) -> Result<Vec<UserActionRecord>, sqlx::Error> {
        if actions.is_empty() {
            return Ok(Vec::new());
        }

        let mut tx = self.pool.begin().await?;
        let mut created = Vec::with_capacity(actions.len());
        for action in actions {
            let record = action.into_record(UserActionId::new());
            created.push(insert_record(&mut *tx, &record).await?);
        }
        tx.commit().await?;

        Ok(created)
    }

    async fn find_for_case(
        &self,
        case_id: &str,
        query: &UserActionQuery,
    ) -> Result<Vec<UserActionRecord>, sqlx::Error> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "SELECT {} FROM case_user_actions",
            USER_ACTION_COLUMNS
        ));
        let mut has_clause = false;
        push_case_filter(&mut builder, &mut has_clause, case_id);
        push_type_filters(&mut builder, &mut has_clause, &query.filters);
        push_order(&mut builder, query.sort);
        if let Some(limit) = query.limit {
            builder
                .push(" LIMIT ")
                .push_bind(limit)
                .push(" OFFSET ")
                .push_bind(query.offset);
        }

        builder
            .build_query_as::<UserActionRecord>()
            .fetch_all(&self.pool)
            .await
    }

    async fn count_for_case(&self, case_id: &str, query: &UserActionQuery) -> Result<i64, sqlx::Error> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM case_user_actions");
        let mut has_clause = false;
        push_case_filter(&mut builder, &mut has_clause, case_id);
        push_type_filters(&mut builder, &mut has_clause, &query.filters);

        builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
    }

    async fn latest_for_case(
        &self,
        case_id: &str,
        types: Vec<UserActionType>,
        exclude_alert_comments: bool,
    ) -> Result<Option<UserActionRecord>, sqlx::Error> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "SELECT {} FROM case_user_actions",
            USER_ACTION_COLUMNS
        ));
        let mut has_clause = false;
        push_case_filter(&mut builder, &mut has_clause, case_id);
        if !types.is_empty() {
            push_clause(&mut builder, &mut has_clause);
            push_in_list(&mut builder, "type", type_names(&types));
        }
        if exclude_alert_comments {
            push_clause(&mut builder, &mut has_clause);
            builder.push(
                "NOT (type = 'comment' AND COALESCE(payload->'comment'->>'type', '') = 'alert')",
            );
        }
        push_order(&mut builder, SortOrder::Desc);
        builder.push(" LIMIT 1");

        builder
            .build_query_as::<UserActionRecord>()
            .fetch_optional(&self.pool)
            .await
    }

    async fn connector_actions(
        &self,
        case_id: &str,
        connector_id: &str,
        before: Option<DateTime<Utc>>,
    ) -> Result<Option<UserActionRecord>, sqlx::Error> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "SELECT {} FROM case_user_actions",
            USER_ACTION_COLUMNS
        ));
        let mut has_clause = false;
        push_case_filter(&mut builder, &mut has_clause, case_id);
        push_clause(&mut builder, &mut has_clause);
        builder
            .push("connector_id = ")
            .push_bind(connector_id.to_string());
        push_clause(&mut builder, &mut has_clause);
        push_in_list(&mut builder, "type", type_names(&CONNECTOR_TYPES));
        if let Some(before) = before {
            push_clause(&mut builder, &mut has_clause);
            builder.push("created_at < ").push_bind(before);
        }
        push_order(&mut builder, SortOrder::Desc);
        builder.push(" LIMIT 1");

        builder
            .build_query_as::<UserActionRecord>()
            .fetch_optional(&self.pool)
            .await
    }

    async fn pushes_for_connector(
        &self,
        case_id: &str,
        connector_id: &str,
    ) -> Result<PushRecords, sqlx::Error> {
        let most_recent = fetch_push(&self.pool, case_id, connector_id, SortOrder::Desc).await?;
        let oldest = fetch_push(&self.pool, case_id, connector_id, SortOrder::Asc).await?;
        Ok(PushRecords { most_recent, oldest })
    }

    async fn connector_ids(
        &self,
        case_id: &str,
        types: Vec<UserActionType>,
    ) -> Result<Vec<String>, sqlx::Error> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT connector_id FROM case_user_actions");
        let mut has_clause = false;
        push_case_filter(&mut builder, &mut has_clause, case_id);
        push_clause(&mut builder, &mut has_clause);
        builder.push("connector_id IS NOT NULL AND connector_id <> 'none'");
        if !types.is_empty() {
            push_clause(&mut builder, &mut has_clause);
            push_in_list(&mut builder, "type", type_names(&types));
        }
        builder
            .push(" GROUP BY connector_id ORDER BY COUNT(*) DESC, connector_id ASC LIMIT ")
            .push_bind(MAX_CONNECTORS_PER_CASE);

        builder
            .build_query_scalar::<String>()
            .fetch_all(&self.pool)
            .await
    }

    async fn stats_for_case(&self, case_id: &str) -> Result<UserActionStats, sqlx::Error> {
        let (total, total_comments): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), COUNT(*) FILTER (WHERE type = 'comment') \
             FROM case_user_actions WHERE case_id = $1",
        )
        .bind(case_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(UserActionStats {
            total,
            total_comments,
            total_other: total - total_comments,
        })
    }

    async fn participants(
        &self,
        case_id: &str,
    ) -> Result<Vec<(Json<serde_json::Value>, String)>, sqlx::Error> {
        sqlx::query_as(
            "SELECT created_by, owner FROM ( \
                 SELECT DISTINCT ON (created_by->>'username') created_by, owner, created_at \
                 FROM case_user_actions \
                 WHERE case_id = $1 AND created_by->>'username' IS NOT NULL \
                 ORDER BY created_by->>'username', created_at DESC, seq DESC \
             ) AS latest ORDER BY created_by->>'username'",
        )
        .bind(case_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn assignee_uids(&self, case_id: &str) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT DISTINCT assignee->>'uid' AS uid \
             FROM case_user_actions, jsonb_array_elements(payload->'assignees') AS assignee \
             WHERE case_id = $1 AND type IN ('assignees', 'create_case') \
             AND assignee->>'uid' IS NOT NULL \
             ORDER BY uid",
        )
        .bind(case_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn delete_for_cases(&self, case_ids: Vec<String>) -> Result<u64, sqlx::Error> {
        if case_ids.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query("DELETE FROM case_user_actions WHERE case_id = ANY($1)")
            .bind(&case_ids)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

async fn insert_record<'e, E>(
    executor: E,
    record: &UserActionRecord,
) -> Result<UserActionRecord, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, UserActionRecord>(&format!(
        "INSERT INTO case_user_actions \
         (id, case_id, comment_id, connector_id, action, type, payload, created_at, created_by, \
         owner, \"references\") \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
         RETURNING {}",
        USER_ACTION_COLUMNS
    ))
    .bind(record.id)
    .bind(&record.case_id)
    .bind(&record.comment_id)
    .bind(&record.connector_id)
    .bind(&record.action)
    .bind(&record.kind)
    .bind(&record.payload)
    .bind(record.created_at)
    .bind(&record.created_by)
    .bind(&record.owner)
    .bind(&record.references)
    .fetch_one(executor)
    .await
}

async fn fetch_push(
    pool: &PgPool,
    case_id: &str,
    connector_id: &str,
    sort: SortOrder,
) -> Result<Option<UserActionRecord>, sqlx::Error> {
    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
        "SELECT {} FROM case_user_actions",
        USER_ACTION_COLUMNS
    ));
    let mut has_clause = false;
    push_case_filter(&mut builder, &mut has_clause, case_id);
    push_clause(&mut builder, &mut has_clause);
    builder
        .push("type = ")
        .push_bind(UserActionType::Pushed.as_str().to_string())
        .push(" AND connector_id = ")
        .push_bind(connector_id.to_string());
    push_order(&mut builder, sort);
    builder.push(" LIMIT 1");

    builder
        .build_query_as::<UserActionRecord>()
        .fetch_optional(pool)
        .await
}

fn type_names(types: &[UserActionType]) -> Vec<String> {
    types.iter().map(|kind| kind.as_str().to_string()).collect()
}

fn push_case_filter(builder: &mut QueryBuilder<'_, Postgres>, has_clause: &mut bool, case_id: &str) {
    push_clause(builder, has_clause);
    builder.push("case_id = ").push_bind(case_id.to_string());
}

/// Records sharing a timestamp keep the order they were inserted in.
fn push_order(builder: &mut QueryBuilder<'_, Postgres>, sort: SortOrder) {
    builder
        .push(" ORDER BY created_at ")
        .push(sort.as_sql())
        .push(", seq ")
        .push(sort.as_sql());
}

/// Restricts the query to records matching any of `filters`.
fn push_type_filters(
    builder: &mut QueryBuilder<'_, Postgres>,
    has_clause: &mut bool,
    filters: &[FindTypeFilter],
) {
    if filters.is_empty() || filters.contains(&FindTypeFilter::All) {
        return;
    }

    push_clause(builder, has_clause);
    builder.push("(");
    for (index, filter) in filters.iter().enumerate() {
        if index > 0 {
            builder.push(" OR ");
        }
        match filter {
            FindTypeFilter::Action => {
                builder.push("type <> 'comment'");
            }
            FindTypeFilter::User => {
                builder.push("(type = 'comment' AND payload->'comment'->>'type' = 'user')");
            }
            FindTypeFilter::Alert => {
                builder.push("(type = 'comment' AND payload->'comment'->>'type' = 'alert')");
            }
            FindTypeFilter::Attachment => {
                builder.push(
                    "(type = 'comment' AND payload->'comment'->>'type' NOT IN ('user', 'alert'))",
                );
            }
            FindTypeFilter::Kind(kind) => {
                builder.push("type = ").push_bind(kind.as_str().to_string());
            }
            FindTypeFilter::All => {
                builder.push("TRUE");
            }
        }
    }
    builder.push(")");
}
