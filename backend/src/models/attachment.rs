use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::required_nullable;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertRule {
    #[serde(deserialize_with = "required_nullable")]
    pub id: Option<String>,
    #[serde(deserialize_with = "required_nullable")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionsTarget {
    pub hostname: String,
    #[serde(rename = "endpointId")]
    pub endpoint_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionsDetails {
    pub targets: Vec<ActionsTarget>,
    #[serde(rename = "type")]
    pub action_type: String,
}

/// A case attachment, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Attachment {
    User {
        comment: String,
        owner: String,
    },
    Alert {
        alert_id: OneOrMany,
        index: OneOrMany,
        rule: AlertRule,
        owner: String,
    },
    Actions {
        comment: String,
        actions: ActionsDetails,
        owner: String,
    },
    ExternalReference {
        external_reference_id: String,
        external_reference_storage: Value,
        external_reference_attachment_type_id: String,
        #[serde(deserialize_with = "required_nullable")]
        external_reference_metadata: Option<Value>,
        owner: String,
    },
    PersistableState {
        persistable_state_attachment_type_id: String,
        persistable_state_attachment_state: Value,
        owner: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AttachmentKind {
    User,
    Alert,
    Actions,
    ExternalReference,
    PersistableState,
}

impl AttachmentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttachmentKind::User => "user",
            AttachmentKind::Alert => "alert",
            AttachmentKind::Actions => "actions",
            AttachmentKind::ExternalReference => "externalReference",
            AttachmentKind::PersistableState => "persistableState",
        }
    }
}

impl Attachment {
    pub fn kind(&self) -> AttachmentKind {
        match self {
            Attachment::User { .. } => AttachmentKind::User,
            Attachment::Alert { .. } => AttachmentKind::Alert,
            Attachment::Actions { .. } => AttachmentKind::Actions,
            Attachment::ExternalReference { .. } => AttachmentKind::ExternalReference,
            Attachment::PersistableState { .. } => AttachmentKind::PersistableState,
        }
    }

    pub fn owner(&self) -> &str {
        match self {
            Attachment::User { owner, .. }
            | Attachment::Alert { owner, .. }
            | Attachment::Actions { owner, .. }
            | Attachment::ExternalReference { owner, .. }
            | Attachment::PersistableState { owner, .. } => owner,
        }
    }
}
