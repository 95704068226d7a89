use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;
use serde_path_to_error::Segment;

use crate::models::{
    attachment::Attachment,
    connector::{ConnectorFields, ConnectorType},
    user_action::{
        AssigneesPayload, CategoryPayload, CommentPayload, ConnectorPayload, CreateCasePayload,
        DeleteCasePayload, DescriptionPayload, PushedPayload, SettingsPayload, SeverityPayload,
        StatusPayload, TagsPayload, TitlePayload, User, UserActionAction, UserActionAttributes,
        UserActionPayload, UserActionType,
    },
};

const PAYLOAD_PATH: &str = "payload";
const CONNECTOR_PATH: &str = "payload.connector";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("Invalid value \"undefined\" supplied to \"{path}\"")]
    Missing { path: String },
    #[error("Invalid value supplied to \"{path}\": {message}")]
    Invalid { path: String, message: String },
}

impl DecodeError {
    pub fn path(&self) -> &str {
        match self {
            DecodeError::Missing { path } | DecodeError::Invalid { path, .. } => path,
        }
    }

    /// Re-anchors the error path below `prefix`.
    pub(crate) fn nested_under(self, prefix: &str) -> Self {
        let join = |path: String| {
            if path.is_empty() {
                prefix.to_string()
            } else {
                format!("{}.{}", prefix, path)
            }
        };
        match self {
            DecodeError::Missing { path } => DecodeError::Missing { path: join(path) },
            DecodeError::Invalid { path, message } => DecodeError::Invalid {
                path: join(path),
                message,
            },
        }
    }
}

#[derive(Deserialize)]
struct RawAttributes {
    created_at: DateTime<Utc>,
    created_by: User,
    owner: String,
    action: UserActionAction,
    #[serde(rename = "type")]
    kind: UserActionType,
    payload: Value,
}

#[derive(Deserialize)]
struct CommentRequestPayload {
    attachment: Attachment,
}

/// Decodes stored user action attributes.
///
/// Attributes unknown to the model are dropped. Missing attributes are
/// reported in declaration order: `created_at`, `created_by`, `owner`,
/// `action`, `type`, `payload`.
pub fn decode_attributes(value: Value) -> Result<UserActionAttributes, DecodeError> {
    let raw: RawAttributes = decode_as(value, "")?;
    let payload = decode_payload(raw.kind, raw.payload)?;

    Ok(UserActionAttributes {
        action: raw.action,
        created_at: raw.created_at,
        created_by: raw.created_by,
        owner: raw.owner,
        payload,
    })
}

/// Decodes a persisted payload of the given type.
pub fn decode_payload(kind: UserActionType, value: Value) -> Result<UserActionPayload, DecodeError> {
    let payload = match kind {
        UserActionType::Assignees => {
            UserActionPayload::Assignees(decode_as::<AssigneesPayload>(value, PAYLOAD_PATH)?)
        }
        UserActionType::Category => {
            UserActionPayload::Category(decode_as::<CategoryPayload>(value, PAYLOAD_PATH)?)
        }
        UserActionType::Comment => {
            UserActionPayload::Comment(decode_as::<CommentPayload>(value, PAYLOAD_PATH)?)
        }
        UserActionType::Connector => {
            UserActionPayload::Connector(decode_with_connector::<ConnectorPayload>(value)?)
        }
        UserActionType::CreateCase => UserActionPayload::CreateCase(Box::new(
            decode_with_connector::<CreateCasePayload>(value)?,
        )),
        UserActionType::DeleteCase => {
            UserActionPayload::DeleteCase(decode_as::<DeleteCasePayload>(value, PAYLOAD_PATH)?)
        }
        UserActionType::Description => {
            UserActionPayload::Description(decode_as::<DescriptionPayload>(value, PAYLOAD_PATH)?)
        }
        UserActionType::Pushed => {
            UserActionPayload::Pushed(decode_as::<PushedPayload>(value, PAYLOAD_PATH)?)
        }
        UserActionType::Settings => {
            UserActionPayload::Settings(decode_as::<SettingsPayload>(value, PAYLOAD_PATH)?)
        }
        UserActionType::Severity => {
            UserActionPayload::Severity(decode_as::<SeverityPayload>(value, PAYLOAD_PATH)?)
        }
        UserActionType::Status => {
            UserActionPayload::Status(decode_as::<StatusPayload>(value, PAYLOAD_PATH)?)
        }
        UserActionType::Tags => {
            UserActionPayload::Tags(decode_as::<TagsPayload>(value, PAYLOAD_PATH)?)
        }
        UserActionType::Title => {
            UserActionPayload::Title(decode_as::<TitlePayload>(value, PAYLOAD_PATH)?)
        }
    };

    Ok(payload)
}

/// Decodes a payload submitted by a caller.
///
/// Requests differ from stored payloads in two ways: comments arrive under
/// `attachment`, and connector ids are still part of the payload (they are
/// required here and moved to references when the user action is built).
pub fn decode_request_payload(
    kind: UserActionType,
    value: Value,
) -> Result<UserActionPayload, DecodeError> {
    match kind {
        UserActionType::Comment => {
            let request: CommentRequestPayload = decode_as(value, PAYLOAD_PATH)?;
            Ok(UserActionPayload::Comment(CommentPayload {
                comment: request.attachment,
            }))
        }
        _ => {
            let payload = decode_payload(kind, value)?;
            require_connector_ids(&payload)?;
            Ok(payload)
        }
    }
}

fn require_connector_ids(payload: &UserActionPayload) -> Result<(), DecodeError> {
    let missing = match payload {
        UserActionPayload::Connector(p) if p.connector.id.is_none() => {
            Some("payload.connector.id")
        }
        UserActionPayload::CreateCase(p) if p.connector.id.is_none() => {
            Some("payload.connector.id")
        }
        UserActionPayload::Pushed(p) if p.external_service.connector_id.is_none() => {
            Some("payload.externalService.connector_id")
        }
        _ => None,
    };

    match missing {
        Some(path) => Err(DecodeError::Missing {
            path: path.to_string(),
        }),
        None => Ok(()),
    }
}

/// Decodes a payload embedding a connector. Connector fields are checked
/// against the declared type first so their errors keep the full path.
fn decode_with_connector<T: DeserializeOwned>(value: Value) -> Result<T, DecodeError> {
    if let Some(connector) = value.get("connector") {
        let kind = connector
            .get("type")
            .and_then(|kind| ConnectorType::deserialize(kind).ok());
        if let Some(kind) = kind {
            ConnectorFields::decode(kind, connector.get("fields").cloned())
                .map_err(|err| err.nested_under(CONNECTOR_PATH))?;
        }
    }
    decode_as(value, PAYLOAD_PATH)
}

/// Deserializes `value`, prefixing error paths with `prefix`.
pub(crate) fn decode_as<T: DeserializeOwned>(value: Value, prefix: &str) -> Result<T, DecodeError> {
    serde_path_to_error::deserialize(value).map_err(|err| {
        let mut segments: Vec<String> = prefix
            .split('.')
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
            .collect();

        for segment in err.path().iter() {
            match segment {
                Segment::Seq { index } => segments.push(index.to_string()),
                Segment::Map { key } => segments.push(key.clone()),
                Segment::Enum { .. } | Segment::Unknown => {}
            }
        }

        let message = err.inner().to_string();
        match missing_field_name(&message) {
            Some(field) => {
                segments.push(field);
                DecodeError::Missing {
                    path: segments.join("."),
                }
            }
            None => DecodeError::Invalid {
                path: segments.join("."),
                message,
            },
        }
    })
}

fn missing_field_name(message: &str) -> Option<String> {
    let rest = message.strip_prefix("missing field `")?;
    let end = rest.find('`')?;
    Some(rest[..end].to_string())
}
