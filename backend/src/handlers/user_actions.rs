use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        find::{CaseUsers, FindQueryParams, UserActionStats, UserActionsFindResponse},
        requests::{
            AttachmentOperation, BulkAttachmentsRequest, BulkUpdateCasesRequest,
            CaseDeletionRequest, ConnectorPush, CreateUserActionRequest,
        },
        user_action::{CaseUserAction, UserActionRecord},
    },
    services::user_actions::{
        transform::to_case_user_actions, CaseConnectorActivity, ConnectorFieldsBeforePush,
        ConnectorRef,
    },
    state::AppState,
};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LatestQuery {
    #[serde(default)]
    pub is_pushed: bool,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ConnectorFieldsQuery {
    #[validate(length(max = 100))]
    pub pushes: Vec<ConnectorPush>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CaseDeletionResponse {
    pub user_actions: Vec<CaseUserAction>,
    /// Stored user actions removed by `purge`.
    pub removed: u64,
}

pub async fn create_user_action(
    State(state): State<AppState>,
    Path(case_id): Path<String>,
    Json(payload): Json<CreateUserActionRequest>,
) -> Result<(StatusCode, Json<CaseUserAction>), AppError> {
    let record = state
        .user_actions
        .creator
        .create_user_action(&case_id, payload)
        .await?;
    let mut created = into_response_actions(vec![record])?;
    let created = created
        .pop()
        .ok_or_else(|| AppError::InternalServerError(anyhow::anyhow!("empty create result")))?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn get_all_user_actions(
    State(state): State<AppState>,
    Path(case_id): Path<String>,
) -> Result<Json<Vec<CaseUserAction>>, AppError> {
    Ok(Json(state.user_actions.get_all(&case_id).await?))
}

pub async fn find_user_actions(
    State(state): State<AppState>,
    Path(case_id): Path<String>,
    Query(params): Query<FindQueryParams>,
) -> Result<Json<UserActionsFindResponse>, AppError> {
    Ok(Json(state.user_actions.finder.find(&case_id, params).await?))
}

pub async fn get_user_action_stats(
    State(state): State<AppState>,
    Path(case_id): Path<String>,
) -> Result<Json<UserActionStats>, AppError> {
    Ok(Json(
        state
            .user_actions
            .get_case_user_action_stats(&case_id)
            .await?,
    ))
}

pub async fn get_case_users(
    State(state): State<AppState>,
    Path(case_id): Path<String>,
) -> Result<Json<CaseUsers>, AppError> {
    Ok(Json(state.user_actions.get_users(&case_id).await?))
}

pub async fn get_latest_user_action(
    State(state): State<AppState>,
    Path(case_id): Path<String>,
    Query(q): Query<LatestQuery>,
) -> Result<Json<CaseUserAction>, AppError> {
    state
        .user_actions
        .get_most_recent_user_action(&case_id, q.is_pushed)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Case {} has no user actions", case_id)))
}

pub async fn get_unique_connectors(
    State(state): State<AppState>,
    Path(case_id): Path<String>,
) -> Result<Json<Vec<ConnectorRef>>, AppError> {
    Ok(Json(
        state.user_actions.get_unique_connectors(&case_id).await?,
    ))
}

pub async fn get_connector_fields_before_push(
    State(state): State<AppState>,
    Path(case_id): Path<String>,
    Json(payload): Json<ConnectorFieldsQuery>,
) -> Result<Json<Vec<ConnectorFieldsBeforePush>>, AppError> {
    payload.validate()?;
    Ok(Json(
        state
            .user_actions
            .get_connector_fields_before_latest_push(&case_id, &payload.pushes)
            .await?,
    ))
}

pub async fn get_case_connectors(
    State(state): State<AppState>,
    Path(case_id): Path<String>,
) -> Result<Json<Vec<CaseConnectorActivity>>, AppError> {
    Ok(Json(
        state
            .user_actions
            .get_case_connector_information(&case_id)
            .await?,
    ))
}

pub async fn bulk_update_cases(
    State(state): State<AppState>,
    Json(payload): Json<BulkUpdateCasesRequest>,
) -> Result<(StatusCode, Json<Vec<CaseUserAction>>), AppError> {
    let records = state
        .user_actions
        .creator
        .bulk_create_update_case(payload)
        .await?;
    Ok((StatusCode::CREATED, Json(into_response_actions(records)?)))
}

pub async fn bulk_attachments(
    State(state): State<AppState>,
    Path(case_id): Path<String>,
    Json(payload): Json<BulkAttachmentsRequest>,
) -> Result<(StatusCode, Json<Vec<CaseUserAction>>), AppError> {
    payload.validate()?;
    let creator = &state.user_actions.creator;
    let records = match payload.operation {
        AttachmentOperation::Create => {
            creator
                .bulk_create_attachment_creation(&case_id, payload.attachments, &payload.user)
                .await?
        }
        AttachmentOperation::Delete => {
            creator
                .bulk_create_attachment_deletion(&case_id, payload.attachments, &payload.user)
                .await?
        }
    };
    Ok((StatusCode::CREATED, Json(into_response_actions(records)?)))
}

/// Records the deletion of cases. Without `purge` a `delete_case` user action
/// is persisted per case. With `purge` the cases' history is removed and the
/// deletions are only audit-logged.
pub async fn delete_cases(
    State(state): State<AppState>,
    Json(payload): Json<CaseDeletionRequest>,
) -> Result<Json<CaseDeletionResponse>, AppError> {
    payload.validate()?;

    if payload.purge {
        let case_ids: Vec<String> = payload.cases.iter().map(|case| case.id.clone()).collect();
        let removed = state.user_actions.remove_for_cases(case_ids.clone()).await?;
        state.user_actions.creator.bulk_audit_log_case_deletion(&case_ids);
        return Ok(Json(CaseDeletionResponse {
            user_actions: Vec::new(),
            removed,
        }));
    }

    let records = state
        .user_actions
        .creator
        .bulk_create_case_deletion(&payload.cases, &payload.user)
        .await?;

    Ok(Json(CaseDeletionResponse {
        user_actions: into_response_actions(records)?,
        removed: 0,
    }))
}

fn into_response_actions(records: Vec<UserActionRecord>) -> Result<Vec<CaseUserAction>, AppError> {
    Ok(to_case_user_actions(records)?)
}
