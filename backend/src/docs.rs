#![allow(dead_code)] // OpenAPI doc stubs are only referenced by utoipa macros.

use crate::{
    error::ErrorResponse,
    handlers::{
        audit_logs::{AuditLogListQuery, AuditLogListResponse},
        user_actions::{CaseDeletionResponse, ConnectorFieldsQuery, LatestQuery},
    },
    models::{
        audit_log::AuditLog,
        case::{
            CaseAssignee, CaseAttributes, CaseSettings, CaseSeverity, CaseSnapshot, CaseStatus,
            DeletedCase,
        },
        find::{
            CaseUsers, FindQueryParams, Participant, SortOrder, UserActionStats,
            UserActionsFindResponse,
        },
        requests::{
            AttachmentOperation, AttachmentUserAction, BulkAttachmentsRequest,
            BulkUpdateCasesRequest, CaseDeletionRequest, ConnectorPush, CreateUserActionRequest,
        },
        user_action::{CaseUserAction, User, UserActionAction, UserActionType},
    },
    services::user_actions::{
        CaseConnectorActivity, ConnectorFieldsBeforePush, ConnectorRef, PushActivity,
    },
};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        create_user_action_doc,
        get_all_user_actions_doc,
        find_user_actions_doc,
        user_action_stats_doc,
        case_users_doc,
        latest_user_action_doc,
        unique_connectors_doc,
        connector_fields_before_push_doc,
        case_connectors_doc,
        bulk_update_cases_doc,
        bulk_attachments_doc,
        delete_cases_doc,
        list_audit_logs_doc,
        audit_log_detail_doc
    ),
    components(
        schemas(
            // user actions
            CaseUserAction,
            User,
            UserActionType,
            UserActionAction,
            CreateUserActionRequest,
            UserActionsFindResponse,
            SortOrder,
            UserActionStats,
            Participant,
            CaseUsers,
            // cases
            CaseSnapshot,
            CaseAttributes,
            CaseStatus,
            CaseSeverity,
            CaseSettings,
            CaseAssignee,
            DeletedCase,
            BulkUpdateCasesRequest,
            CaseDeletionRequest,
            CaseDeletionResponse,
            // attachments
            AttachmentUserAction,
            AttachmentOperation,
            BulkAttachmentsRequest,
            // connectors
            ConnectorRef,
            ConnectorPush,
            ConnectorFieldsQuery,
            ConnectorFieldsBeforePush,
            PushActivity,
            CaseConnectorActivity,
            // audit
            AuditLog,
            AuditLogListResponse,
            ErrorResponse
        )
    ),
    tags(
        (name = "UserActions", description = "Case user action history"),
        (name = "Connectors", description = "Connector activity derived from user actions"),
        (name = "AuditLogs", description = "Persisted audit events")
    )
)]
pub struct ApiDoc;

#[utoipa::path(
    post,
    path = "/api/cases/{case_id}/user_actions",
    params(("case_id" = String, Path, description = "Case id")),
    request_body = CreateUserActionRequest,
    responses(
        (status = 201, description = "User action recorded", body = CaseUserAction),
        (status = 400, description = "Invalid payload", body = ErrorResponse)
    ),
    tag = "UserActions"
)]
fn create_user_action_doc() {}

#[utoipa::path(
    get,
    path = "/api/cases/{case_id}/user_actions",
    params(("case_id" = String, Path, description = "Case id")),
    responses((status = 200, description = "All user actions, oldest first", body = [CaseUserAction])),
    tag = "UserActions"
)]
fn get_all_user_actions_doc() {}

#[utoipa::path(
    get,
    path = "/api/cases/{case_id}/user_actions/_find",
    params(("case_id" = String, Path, description = "Case id"), FindQueryParams),
    responses(
        (status = 200, description = "Page of user actions", body = UserActionsFindResponse),
        (status = 400, description = "Invalid filter or paging", body = ErrorResponse)
    ),
    tag = "UserActions"
)]
fn find_user_actions_doc() {}

#[utoipa::path(
    get,
    path = "/api/cases/{case_id}/user_actions/_stats",
    params(("case_id" = String, Path, description = "Case id")),
    responses((status = 200, description = "User action counts", body = UserActionStats)),
    tag = "UserActions"
)]
fn user_action_stats_doc() {}

#[utoipa::path(
    get,
    path = "/api/cases/{case_id}/user_actions/_users",
    params(("case_id" = String, Path, description = "Case id")),
    responses((status = 200, description = "Participants and assignees", body = CaseUsers)),
    tag = "UserActions"
)]
fn case_users_doc() {}

#[utoipa::path(
    get,
    path = "/api/cases/{case_id}/user_actions/_latest",
    params(("case_id" = String, Path, description = "Case id"), LatestQuery),
    responses(
        (status = 200, description = "Most recent user action", body = CaseUserAction),
        (status = 404, description = "Case has no user actions", body = ErrorResponse)
    ),
    tag = "UserActions"
)]
fn latest_user_action_doc() {}

#[utoipa::path(
    get,
    path = "/api/cases/{case_id}/user_actions/_connectors",
    params(("case_id" = String, Path, description = "Case id")),
    responses((status = 200, description = "Connectors the case used", body = [ConnectorRef])),
    tag = "Connectors"
)]
fn unique_connectors_doc() {}

#[utoipa::path(
    post,
    path = "/api/cases/{case_id}/user_actions/_connector_fields",
    params(("case_id" = String, Path, description = "Case id")),
    request_body = ConnectorFieldsQuery,
    responses((status = 200, description = "Connector fields before each push", body = [ConnectorFieldsBeforePush])),
    tag = "Connectors"
)]
fn connector_fields_before_push_doc() {}

#[utoipa::path(
    get,
    path = "/api/cases/{case_id}/connectors",
    params(("case_id" = String, Path, description = "Case id")),
    responses((status = 200, description = "Fields and push history per connector", body = [CaseConnectorActivity])),
    tag = "Connectors"
)]
fn case_connectors_doc() {}

#[utoipa::path(
    post,
    path = "/api/cases/user_actions/_bulk_update",
    request_body = BulkUpdateCasesRequest,
    responses(
        (status = 201, description = "One user action per changed field", body = [CaseUserAction]),
        (status = 400, description = "Invalid request", body = ErrorResponse)
    ),
    tag = "UserActions"
)]
fn bulk_update_cases_doc() {}

#[utoipa::path(
    post,
    path = "/api/cases/{case_id}/user_actions/_attachments",
    params(("case_id" = String, Path, description = "Case id")),
    request_body = BulkAttachmentsRequest,
    responses(
        (status = 201, description = "One user action per attachment", body = [CaseUserAction]),
        (status = 400, description = "Invalid attachment", body = ErrorResponse)
    ),
    tag = "UserActions"
)]
fn bulk_attachments_doc() {}

#[utoipa::path(
    delete,
    path = "/api/cases/user_actions",
    request_body = CaseDeletionRequest,
    responses((status = 200, description = "Case deletions recorded", body = CaseDeletionResponse)),
    tag = "UserActions"
)]
fn delete_cases_doc() {}

#[utoipa::path(
    get,
    path = "/api/audit_logs",
    params(AuditLogListQuery),
    responses(
        (status = 200, description = "Page of audit events, newest first", body = AuditLogListResponse),
        (status = 400, description = "Invalid filter", body = ErrorResponse)
    ),
    tag = "AuditLogs"
)]
fn list_audit_logs_doc() {}

#[utoipa::path(
    get,
    path = "/api/audit_logs/{id}",
    params(("id" = String, Path, description = "Audit log id")),
    responses(
        (status = 200, description = "Audit event", body = AuditLog),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    tag = "AuditLogs"
)]
fn audit_log_detail_doc() {}
