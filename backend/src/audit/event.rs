//! Audit event types.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::case::{CASE_COMMENT_SAVED_OBJECT, CASE_SAVED_OBJECT};

pub const DATABASE_CATEGORY: &str = "database";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditEventType {
    Creation,
    Change,
    Deletion,
}

impl AuditEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditEventType::Creation => "creation",
            AuditEventType::Change => "change",
            AuditEventType::Deletion => "deletion",
        }
    }
}

impl fmt::Display for AuditEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditOutcome {
    Success,
}

impl AuditOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditOutcome::Success => "success",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDetails {
    pub action: String,
    pub category: Vec<String>,
    #[serde(rename = "type")]
    pub event_type: Vec<AuditEventType>,
    pub outcome: AuditOutcome,
}

/// Entity the event is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedObjectRef {
    #[serde(rename = "type")]
    pub object_type: String,
    pub id: String,
}

impl SavedObjectRef {
    pub fn case(case_id: &str) -> Self {
        Self {
            object_type: CASE_SAVED_OBJECT.to_string(),
            id: case_id.to_string(),
        }
    }

    pub fn comment(comment_id: &str) -> Self {
        Self {
            object_type: CASE_COMMENT_SAVED_OBJECT.to_string(),
            id: comment_id.to_string(),
        }
    }
}

/// A single audit trail entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub message: String,
    pub event: EventDetails,
    pub saved_object: SavedObjectRef,
    /// Username of the acting user, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,
}

impl AuditEvent {
    /// Successful database event in the `database` category.
    pub fn success(
        action: impl Into<String>,
        event_type: AuditEventType,
        saved_object: SavedObjectRef,
        message: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            event: EventDetails {
                action: action.into(),
                category: vec![DATABASE_CATEGORY.to_string()],
                event_type: vec![event_type],
                outcome: AuditOutcome::Success,
            },
            saved_object,
            actor: None,
        }
    }

    pub fn with_actor(mut self, actor: Option<String>) -> Self {
        self.actor = actor;
        self
    }

    pub fn action(&self) -> &str {
        &self.event.action
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_event_serializes_in_ecs_shape() {
        let event = AuditEvent::success(
            "case_user_action_delete_case",
            AuditEventType::Deletion,
            SavedObjectRef::case("1"),
            "User deleted case id: 1",
        );

        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({
                "message": "User deleted case id: 1",
                "event": {
                    "action": "case_user_action_delete_case",
                    "category": ["database"],
                    "type": ["deletion"],
                    "outcome": "success"
                },
                "saved_object": { "type": "cases", "id": "1" }
            })
        );
    }

    #[test]
    fn comment_saved_object_uses_comment_type() {
        let saved_object = SavedObjectRef::comment("test-id");
        assert_eq!(saved_object.object_type, "cases-comments");
        assert_eq!(saved_object.id, "test-id");
    }
}
