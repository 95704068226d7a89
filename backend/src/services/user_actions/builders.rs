//! Turns a typed payload into a persistable user action plus the audit event
//! that describes it.

use chrono::{DateTime, Utc};

use super::UserActionError;
use crate::audit::{AuditEvent, AuditEventType, SavedObjectRef};
use crate::models::connector::NONE_CONNECTOR_ID;
use crate::models::user_action::{
    NewUserAction, User, UserActionAction, UserActionAttributes, UserActionPayload,
    UserActionReference,
};

/// Inputs shared by every builder.
#[derive(Debug, Clone, Copy)]
pub struct BuildArgs<'a> {
    pub case_id: &'a str,
    pub owner: &'a str,
    pub user: &'a User,
    pub action: UserActionAction,
    pub attachment_id: Option<&'a str>,
    pub created_at: DateTime<Utc>,
}

/// Audit event waiting for the id the store assigns to its user action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingAuditEvent {
    pub action: String,
    pub event_type: AuditEventType,
    pub saved_object: SavedObjectRef,
    pub message: String,
    pub actor: Option<String>,
}

impl PendingAuditEvent {
    pub fn into_event(self, user_action_id: Option<&str>) -> AuditEvent {
        let message = match user_action_id {
            Some(id) => format!("{} - user action id: {}", self.message, id),
            None => self.message,
        };
        AuditEvent::success(self.action, self.event_type, self.saved_object, message)
            .with_actor(self.actor)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserActionParameters {
    pub user_action: NewUserAction,
    pub event: PendingAuditEvent,
}

/// Builds the record and audit event for one user action.
///
/// Connector ids leave the payload here and become references, so the
/// persisted payload never carries them.
pub fn build_user_action(
    payload: UserActionPayload,
    args: BuildArgs<'_>,
) -> Result<UserActionParameters, UserActionError> {
    let mut references = vec![UserActionReference::case(args.case_id)];
    let case_object = SavedObjectRef::case(args.case_id);
    let case_id = args.case_id;

    let (payload, event_action, saved_object, message) = match payload {
        UserActionPayload::CreateCase(mut create) => {
            if let Some(id) = create.connector.referenced_id() {
                references.push(UserActionReference::connector(id));
            }
            create.connector = create.connector.without_id();
            (
                UserActionPayload::CreateCase(create),
                "case_user_action_create_case".to_string(),
                case_object,
                format!("User created case id: {}", case_id),
            )
        }
        UserActionPayload::Connector(mut connector) => {
            let connector_id = connector
                .connector
                .id
                .clone()
                .unwrap_or_else(|| NONE_CONNECTOR_ID.to_string());
            if let Some(id) = connector.connector.referenced_id() {
                references.push(UserActionReference::connector(id));
            }
            connector.connector = connector.connector.without_id();
            (
                UserActionPayload::Connector(connector),
                "case_user_action_update_case_connector".to_string(),
                case_object,
                format!(
                    "User changed the case connector to id: {} for case id: {}",
                    connector_id, case_id
                ),
            )
        }
        UserActionPayload::Pushed(mut pushed) => {
            let connector_id = pushed
                .external_service
                .connector_id
                .take()
                .filter(|id| !id.is_empty())
                .unwrap_or_else(|| NONE_CONNECTOR_ID.to_string());
            references.push(UserActionReference::push_connector(&connector_id));
            (
                UserActionPayload::Pushed(pushed),
                "case_user_action_pushed_case".to_string(),
                case_object,
                format!(
                    "User pushed case id: {} to an external service with connector id: {}",
                    case_id, connector_id
                ),
            )
        }
        UserActionPayload::Comment(comment) => {
            let attachment_id = args.attachment_id.ok_or_else(|| {
                UserActionError::Invalid(
                    "attachment id is required for comment user actions".to_string(),
                )
            })?;
            references.push(UserActionReference::comment(attachment_id));
            let (verb, past) = match args.action {
                UserActionAction::Create => ("create", "created"),
                UserActionAction::Delete => ("delete", "deleted"),
                _ => ("update", "changed"),
            };
            (
                UserActionPayload::Comment(comment),
                format!("case_user_action_{}_comment", verb),
                SavedObjectRef::comment(attachment_id),
                format!(
                    "User {} comment id: {} for case id: {}",
                    past, attachment_id, case_id
                ),
            )
        }
        UserActionPayload::Tags(tags) => {
            let (event_action, message) = if args.action == UserActionAction::Delete {
                (
                    "case_user_action_delete_case_tags",
                    format!("User deleted tags in case id: {}", case_id),
                )
            } else {
                (
                    "case_user_action_add_case_tags",
                    format!("User added tags to case id: {}", case_id),
                )
            };
            (
                UserActionPayload::Tags(tags),
                event_action.to_string(),
                case_object,
                message,
            )
        }
        UserActionPayload::Assignees(assignees) => {
            let uids = assignees
                .assignees
                .iter()
                .map(|assignee| assignee.uid.as_str())
                .collect::<Vec<_>>()
                .join(",");
            let (event_action, message) = if args.action == UserActionAction::Delete {
                (
                    "case_user_action_delete_case_assignees",
                    format!("User unassigned uids: [{}] from case id: {}", uids, case_id),
                )
            } else {
                (
                    "case_user_action_add_case_assignees",
                    format!("User assigned uids: [{}] to case id: {}", uids, case_id),
                )
            };
            (
                UserActionPayload::Assignees(assignees),
                event_action.to_string(),
                case_object,
                message,
            )
        }
        UserActionPayload::DeleteCase(delete) => (
            UserActionPayload::DeleteCase(delete),
            "case_user_action_delete_case".to_string(),
            case_object,
            format!("User deleted case id: {}", case_id),
        ),
        other => {
            let field = other.kind().as_str();
            let (event_action, message) = if args.action == UserActionAction::Delete {
                (
                    format!("case_user_action_delete_case_{}", field),
                    format!("User deleted the {} for case id: {}", field, case_id),
                )
            } else {
                (
                    format!("case_user_action_update_case_{}", field),
                    format!("User updated the {} for case id: {}", field, case_id),
                )
            };
            (other, event_action, case_object, message)
        }
    };

    let attributes = UserActionAttributes {
        action: args.action,
        created_at: args.created_at,
        created_by: args.user.clone(),
        owner: args.owner.to_string(),
        payload,
    };

    Ok(UserActionParameters {
        user_action: NewUserAction::new(attributes, references),
        event: PendingAuditEvent {
            action: event_action,
            event_type: event_type_for(args.action),
            saved_object,
            message,
            actor: args.user.username.clone(),
        },
    })
}

/// Audit event for a case removed without a persisted user action.
pub fn case_deletion_event(case_id: &str) -> AuditEvent {
    AuditEvent::success(
        "case_user_action_delete_case",
        AuditEventType::Deletion,
        SavedObjectRef::case(case_id),
        format!("User deleted case id: {}", case_id),
    )
}

fn event_type_for(action: UserActionAction) -> AuditEventType {
    match action {
        UserActionAction::Create => AuditEventType::Creation,
        UserActionAction::Delete => AuditEventType::Deletion,
        _ => AuditEventType::Change,
    }
}
