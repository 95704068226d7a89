//! Request bodies accepted by the user action API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use validator::Validate;

use super::{
    case::{CaseSnapshot, DeletedCase},
    user_action::{User, UserActionAction, UserActionType},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateUserActionRequest {
    #[serde(rename = "type")]
    pub kind: UserActionType,
    /// Defaults per type when omitted.
    #[serde(default)]
    pub action: Option<UserActionAction>,
    #[schema(value_type = Object)]
    pub payload: Value,
    #[validate(length(min = 1, max = 256))]
    pub owner: String,
    pub user: User,
    /// Required for comment user actions.
    #[serde(default)]
    pub attachment_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct BulkUpdateCasesRequest {
    pub original_cases: Vec<CaseSnapshot>,
    #[validate(length(max = 100))]
    pub updated_cases: Vec<CaseSnapshot>,
    pub user: User,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AttachmentUserAction {
    pub id: String,
    #[schema(value_type = Object)]
    pub attachment: Value,
}

/// Attachment operations recorded by `POST .../_attachments`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentOperation {
    Create,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct BulkAttachmentsRequest {
    pub operation: AttachmentOperation,
    #[validate(length(min = 1, max = 100))]
    pub attachments: Vec<AttachmentUserAction>,
    pub user: User,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct CaseDeletionRequest {
    #[validate(length(min = 1, max = 100))]
    pub cases: Vec<DeletedCase>,
    pub user: User,
    /// Remove the cases' stored history and only audit-log the deletions.
    #[serde(default)]
    pub purge: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ConnectorPush {
    pub connector_id: String,
    pub date: DateTime<Utc>,
}
