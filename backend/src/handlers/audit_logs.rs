use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::{IntoParams, ToSchema};

use crate::{
    error::AppError,
    models::audit_log::AuditLog,
    repositories::audit_log::{self, AuditLogFilters},
    state::AppState,
    types::AuditLogId,
};

const DEFAULT_PAGE: i64 = 1;
const DEFAULT_PER_PAGE: i64 = 25;
const MAX_PER_PAGE: i64 = 100;
const MAX_PAGE: i64 = 1_000;

#[derive(Debug, Default, Deserialize, Serialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct AuditLogListQuery {
    /// RFC 3339 lower bound (inclusive).
    pub from: Option<String>,
    /// RFC 3339 upper bound (inclusive).
    pub to: Option<String>,
    pub actor: Option<String>,
    pub action: Option<String>,
    pub saved_object_type: Option<String>,
    pub saved_object_id: Option<String>,
    pub outcome: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuditLogListResponse {
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
    pub items: Vec<AuditLog>,
}

pub async fn list_audit_logs(
    State(state): State<AppState>,
    Query(q): Query<AuditLogListQuery>,
) -> Result<Json<AuditLogListResponse>, AppError> {
    let (page, per_page, filters) = validate_list_query(q)?;
    let (items, total) = state
        .audit_logs
        .list(&filters, page, per_page)
        .await
        .map_err(|e| AppError::InternalServerError(e.into()))?;

    Ok(Json(AuditLogListResponse {
        page,
        per_page,
        total,
        items,
    }))
}

pub async fn get_audit_log_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<AuditLog>, AppError> {
    let audit_log_id = AuditLogId::from_str(&id)
        .map_err(|_| AppError::BadRequest("Invalid audit log ID".into()))?;

    let log = audit_log::fetch_audit_log(&state.pool, audit_log_id)
        .await
        .map_err(|e| AppError::InternalServerError(e.into()))?
        .ok_or_else(|| AppError::NotFound("Not found".into()))?;

    Ok(Json(log))
}

fn validate_list_query(q: AuditLogListQuery) -> Result<(i64, i64, AuditLogFilters), AppError> {
    let page = q.page.unwrap_or(DEFAULT_PAGE).clamp(1, MAX_PAGE);
    let per_page = q
        .per_page
        .unwrap_or(DEFAULT_PER_PAGE)
        .clamp(1, MAX_PER_PAGE);

    let from = parse_timestamp("from", q.from)?;
    let to = parse_timestamp("to", q.to)?;
    if let (Some(from), Some(to)) = (from, to) {
        if from > to {
            return Err(AppError::BadRequest("from must be before to".into()));
        }
    }

    Ok((
        page,
        per_page,
        AuditLogFilters {
            from,
            to,
            actor: normalize(q.actor),
            action: normalize(q.action),
            saved_object_type: normalize(q.saved_object_type),
            saved_object_id: normalize(q.saved_object_id),
            outcome: normalize(q.outcome),
        },
    ))
}

fn parse_timestamp(field: &str, value: Option<String>) -> Result<Option<DateTime<Utc>>, AppError> {
    let Some(value) = normalize(value) else {
        return Ok(None);
    };
    DateTime::parse_from_rfc3339(&value)
        .map(|parsed| Some(parsed.with_timezone(&Utc)))
        .map_err(|_| AppError::BadRequest(format!("{} must be an RFC 3339 timestamp", field)))
}

fn normalize(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
