use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::{types::Json, FromRow};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

use super::{
    attachment::Attachment,
    case::{CaseAssignee, CaseSettings, CaseSeverity, CaseStatus},
    connector::CaseConnector,
    required_nullable,
};
use crate::types::UserActionId;

pub const CASE_REF_NAME: &str = "associated-cases";
pub const COMMENT_REF_NAME: &str = "associated-cases-comments";
pub const CONNECTOR_ID_REF_NAME: &str = "connectorId";
pub const PUSH_CONNECTOR_ID_REF_NAME: &str = "pushConnectorId";
pub const ACTION_SAVED_OBJECT_TYPE: &str = "action";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum UserActionAction {
    Add,
    Create,
    Delete,
    Update,
    PushToService,
}

impl UserActionAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserActionAction::Add => "add",
            UserActionAction::Create => "create",
            UserActionAction::Delete => "delete",
            UserActionAction::Update => "update",
            UserActionAction::PushToService => "push_to_service",
        }
    }
}

impl fmt::Display for UserActionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserActionAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "add" => Ok(UserActionAction::Add),
            "create" => Ok(UserActionAction::Create),
            "delete" => Ok(UserActionAction::Delete),
            "update" => Ok(UserActionAction::Update),
            "push_to_service" => Ok(UserActionAction::PushToService),
            other => Err(format!("unknown user action action: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum UserActionType {
    Assignees,
    Category,
    Comment,
    Connector,
    CreateCase,
    DeleteCase,
    Description,
    Pushed,
    Settings,
    Severity,
    Status,
    Tags,
    Title,
}

impl UserActionType {
    pub const ALL: [UserActionType; 13] = [
        UserActionType::Assignees,
        UserActionType::Category,
        UserActionType::Comment,
        UserActionType::Connector,
        UserActionType::CreateCase,
        UserActionType::DeleteCase,
        UserActionType::Description,
        UserActionType::Pushed,
        UserActionType::Settings,
        UserActionType::Severity,
        UserActionType::Status,
        UserActionType::Tags,
        UserActionType::Title,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UserActionType::Assignees => "assignees",
            UserActionType::Category => "category",
            UserActionType::Comment => "comment",
            UserActionType::Connector => "connector",
            UserActionType::CreateCase => "create_case",
            UserActionType::DeleteCase => "delete_case",
            UserActionType::Description => "description",
            UserActionType::Pushed => "pushed",
            UserActionType::Settings => "settings",
            UserActionType::Severity => "severity",
            UserActionType::Status => "status",
            UserActionType::Tags => "tags",
            UserActionType::Title => "title",
        }
    }

    /// Action recorded when the caller does not pick one.
    pub fn default_action(&self) -> UserActionAction {
        match self {
            UserActionType::CreateCase => UserActionAction::Create,
            UserActionType::DeleteCase => UserActionAction::Delete,
            UserActionType::Pushed => UserActionAction::PushToService,
            _ => UserActionAction::Update,
        }
    }
}

impl fmt::Display for UserActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserActionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UserActionType::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown user action type: {}", s))
    }
}

/// Acting user. All three identity fields must be present, each may be null.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct User {
    #[serde(deserialize_with = "required_nullable")]
    pub email: Option<String>,
    #[serde(deserialize_with = "required_nullable")]
    pub full_name: Option<String>,
    #[serde(deserialize_with = "required_nullable")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_uid: Option<String>,
}

impl User {
    pub fn new(username: &str, full_name: &str, email: &str) -> Self {
        Self {
            email: Some(email.to_string()),
            full_name: Some(full_name.to_string()),
            username: Some(username.to_string()),
            profile_uid: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct UserActionReference {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub ref_type: String,
}

impl UserActionReference {
    pub fn case(case_id: &str) -> Self {
        Self {
            id: case_id.to_string(),
            name: CASE_REF_NAME.to_string(),
            ref_type: super::case::CASE_SAVED_OBJECT.to_string(),
        }
    }

    pub fn comment(attachment_id: &str) -> Self {
        Self {
            id: attachment_id.to_string(),
            name: COMMENT_REF_NAME.to_string(),
            ref_type: super::case::CASE_COMMENT_SAVED_OBJECT.to_string(),
        }
    }

    pub fn connector(connector_id: &str) -> Self {
        Self {
            id: connector_id.to_string(),
            name: CONNECTOR_ID_REF_NAME.to_string(),
            ref_type: ACTION_SAVED_OBJECT_TYPE.to_string(),
        }
    }

    pub fn push_connector(connector_id: &str) -> Self {
        Self {
            id: connector_id.to_string(),
            name: PUSH_CONNECTOR_ID_REF_NAME.to_string(),
            ref_type: ACTION_SAVED_OBJECT_TYPE.to_string(),
        }
    }
}

pub fn find_reference<'a>(references: &'a [UserActionReference], name: &str) -> Option<&'a str> {
    references
        .iter()
        .find(|reference| reference.name == name)
        .map(|reference| reference.id.as_str())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TitlePayload {
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescriptionPayload {
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusPayload {
    pub status: CaseStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeverityPayload {
    pub severity: CaseSeverity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagsPayload {
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsPayload {
    pub settings: CaseSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectorPayload {
    pub connector: CaseConnector,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssigneesPayload {
    pub assignees: Vec<CaseAssignee>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryPayload {
    #[serde(deserialize_with = "required_nullable")]
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentPayload {
    pub comment: Attachment,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteCasePayload {}

/// External system a case was pushed to.
///
/// `connector_id` is only set on incoming requests; persisted payloads keep
/// the connector in the `pushConnectorId` reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalService {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connector_id: Option<String>,
    pub connector_name: String,
    pub external_id: String,
    pub external_title: String,
    pub external_url: String,
    pub pushed_at: String,
    pub pushed_by: User,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushedPayload {
    #[serde(rename = "externalService")]
    pub external_service: ExternalService,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateCasePayload {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub connector: CaseConnector,
    pub settings: CaseSettings,
    pub owner: String,
    pub status: CaseStatus,
    pub severity: CaseSeverity,
    pub assignees: Vec<CaseAssignee>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// Typed payload of a user action. The variant determines the user action
/// type, so the `type` attribute is never stored separately from it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum UserActionPayload {
    Assignees(AssigneesPayload),
    Category(CategoryPayload),
    Comment(CommentPayload),
    Connector(ConnectorPayload),
    CreateCase(Box<CreateCasePayload>),
    DeleteCase(DeleteCasePayload),
    Description(DescriptionPayload),
    Pushed(PushedPayload),
    Settings(SettingsPayload),
    Severity(SeverityPayload),
    Status(StatusPayload),
    Tags(TagsPayload),
    Title(TitlePayload),
}

impl UserActionPayload {
    pub fn kind(&self) -> UserActionType {
        match self {
            UserActionPayload::Assignees(_) => UserActionType::Assignees,
            UserActionPayload::Category(_) => UserActionType::Category,
            UserActionPayload::Comment(_) => UserActionType::Comment,
            UserActionPayload::Connector(_) => UserActionType::Connector,
            UserActionPayload::CreateCase(_) => UserActionType::CreateCase,
            UserActionPayload::DeleteCase(_) => UserActionType::DeleteCase,
            UserActionPayload::Description(_) => UserActionType::Description,
            UserActionPayload::Pushed(_) => UserActionType::Pushed,
            UserActionPayload::Settings(_) => UserActionType::Settings,
            UserActionPayload::Severity(_) => UserActionType::Severity,
            UserActionPayload::Status(_) => UserActionType::Status,
            UserActionPayload::Tags(_) => UserActionType::Tags,
            UserActionPayload::Title(_) => UserActionType::Title,
        }
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Decoded attributes of a stored user action.
#[derive(Debug, Clone, PartialEq)]
pub struct UserActionAttributes {
    pub action: UserActionAction,
    pub created_at: DateTime<Utc>,
    pub created_by: User,
    pub owner: String,
    pub payload: UserActionPayload,
}

impl UserActionAttributes {
    pub fn kind(&self) -> UserActionType {
        self.payload.kind()
    }
}

/// Row of the `case_user_actions` table.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct UserActionRecord {
    pub id: UserActionId,
    pub case_id: String,
    pub comment_id: Option<String>,
    pub connector_id: Option<String>,
    pub action: String,
    #[sqlx(rename = "type")]
    pub kind: String,
    pub payload: Json<Value>,
    pub created_at: DateTime<Utc>,
    pub created_by: Json<Value>,
    pub owner: String,
    pub references: Json<Vec<UserActionReference>>,
}

impl UserActionRecord {
    /// Stored attributes in their JSON form, ready to be decoded.
    pub fn raw_attributes(&self) -> Value {
        serde_json::json!({
            "action": self.action,
            "type": self.kind,
            "payload": self.payload.0,
            "created_at": self.created_at,
            "created_by": self.created_by.0,
            "owner": self.owner,
        })
    }
}

/// User action ready to be persisted. The store assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUserAction {
    pub case_id: String,
    pub comment_id: Option<String>,
    pub connector_id: Option<String>,
    pub attributes: UserActionAttributes,
    pub references: Vec<UserActionReference>,
}

impl NewUserAction {
    /// Derives the indexed reference columns from the references themselves.
    pub fn new(attributes: UserActionAttributes, references: Vec<UserActionReference>) -> Self {
        let case_id = find_reference(&references, CASE_REF_NAME)
            .unwrap_or_default()
            .to_string();
        let comment_id = find_reference(&references, COMMENT_REF_NAME).map(str::to_string);
        let connector_id = find_reference(&references, CONNECTOR_ID_REF_NAME)
            .or_else(|| find_reference(&references, PUSH_CONNECTOR_ID_REF_NAME))
            .map(str::to_string);

        Self {
            case_id,
            comment_id,
            connector_id,
            attributes,
            references,
        }
    }

    pub fn into_record(self, id: UserActionId) -> UserActionRecord {
        let created_by =
            serde_json::to_value(&self.attributes.created_by).unwrap_or(Value::Null);
        UserActionRecord {
            id,
            case_id: self.case_id,
            comment_id: self.comment_id,
            connector_id: self.connector_id,
            action: self.attributes.action.to_string(),
            kind: self.attributes.kind().to_string(),
            payload: Json(self.attributes.payload.to_value()),
            created_at: self.attributes.created_at,
            created_by: Json(created_by),
            owner: self.attributes.owner,
            references: Json(self.references),
        }
    }
}

/// User action as returned to API callers, with reference ids re-injected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CaseUserAction {
    pub id: String,
    pub action_id: String,
    pub case_id: String,
    pub comment_id: Option<String>,
    pub action: UserActionAction,
    #[serde(rename = "type")]
    pub kind: UserActionType,
    #[schema(value_type = Object)]
    pub payload: Value,
    pub created_at: DateTime<Utc>,
    pub created_by: User,
    pub owner: String,
}
