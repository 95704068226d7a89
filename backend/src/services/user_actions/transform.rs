use serde_json::Value;

use crate::models::connector::NONE_CONNECTOR_ID;
use crate::models::user_action::{
    find_reference, CaseUserAction, UserActionRecord, UserActionType, CASE_REF_NAME,
    COMMENT_REF_NAME, CONNECTOR_ID_REF_NAME, PUSH_CONNECTOR_ID_REF_NAME,
};
use crate::validation::{decode_attributes, DecodeError};

/// Decodes a stored record and puts the referenced ids back where callers
/// expect them.
pub fn to_case_user_action(record: UserActionRecord) -> Result<CaseUserAction, DecodeError> {
    let attributes = decode_attributes(record.raw_attributes())?;
    let references = &record.references.0;
    let kind = attributes.kind();
    let mut payload = attributes.payload.to_value();

    match kind {
        UserActionType::Connector | UserActionType::CreateCase => {
            let connector_id = find_reference(references, CONNECTOR_ID_REF_NAME)
                .unwrap_or(NONE_CONNECTOR_ID);
            inject_id(&mut payload, "connector", "id", connector_id);
        }
        UserActionType::Pushed => {
            let connector_id = find_reference(references, PUSH_CONNECTOR_ID_REF_NAME)
                .unwrap_or(NONE_CONNECTOR_ID);
            inject_id(&mut payload, "externalService", "connector_id", connector_id);
        }
        _ => {}
    }

    let id = record.id.to_string();
    Ok(CaseUserAction {
        action_id: id.clone(),
        id,
        case_id: find_reference(references, CASE_REF_NAME)
            .map(str::to_string)
            .unwrap_or_else(|| record.case_id.clone()),
        comment_id: find_reference(references, COMMENT_REF_NAME).map(str::to_string),
        action: attributes.action,
        kind,
        payload,
        created_at: attributes.created_at,
        created_by: attributes.created_by,
        owner: attributes.owner,
    })
}

pub fn to_case_user_actions(
    records: Vec<UserActionRecord>,
) -> Result<Vec<CaseUserAction>, DecodeError> {
    records.into_iter().map(to_case_user_action).collect()
}

fn inject_id(payload: &mut Value, object: &str, key: &str, id: &str) {
    if let Some(target) = payload.get_mut(object).and_then(Value::as_object_mut) {
        target.insert(key.to_string(), Value::String(id.to_string()));
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{DateTime, TimeZone, Utc};
    use serde_json::{json, Value};
    use sqlx::types::Json;

    use crate::models::user_action::{UserActionRecord, UserActionReference};
    use crate::types::UserActionId;

    pub fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2022, 1, 9, 22, 0, 0).unwrap()
    }

    pub fn elastic_user() -> Value {
        json!({
            "email": "elastic@elastic.co",
            "full_name": "Elastic User",
            "username": "elastic"
        })
    }

    pub fn record(
        kind: &str,
        action: &str,
        payload: Value,
        references: Vec<UserActionReference>,
    ) -> UserActionRecord {
        UserActionRecord {
            id: UserActionId::new(),
            case_id: "123".to_string(),
            comment_id: None,
            connector_id: None,
            action: action.to_string(),
            kind: kind.to_string(),
            payload: Json(payload),
            created_at: fixed_time(),
            created_by: Json(elastic_user()),
            owner: "securitySolution".to_string(),
            references: Json(references),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::record;
    use super::*;
    use crate::models::user_action::{UserActionAction, UserActionReference};
    use serde_json::json;

    #[test]
    fn connector_id_is_restored_from_reference() {
        let stored = record(
            "connector",
            "update",
            json!({ "connector": { "name": "none", "type": ".none", "fields": null } }),
            vec![
                UserActionReference::case("123"),
                UserActionReference::connector("456"),
            ],
        );
        let id = stored.id.to_string();

        let action = to_case_user_action(stored).unwrap();
        assert_eq!(action.id, id);
        assert_eq!(action.action_id, id);
        assert_eq!(action.case_id, "123");
        assert_eq!(action.comment_id, None);
        assert_eq!(action.payload["connector"]["id"], json!("456"));
    }

    #[test]
    fn missing_push_reference_defaults_to_none() {
        let stored = record(
            "pushed",
            "push_to_service",
            json!({
                "externalService": {
                    "connector_name": "ServiceNow SN",
                    "external_id": "external-id",
                    "external_title": "SIR0010037",
                    "external_url": "https://example.com",
                    "pushed_at": "2021-02-03T17:41:26.108Z",
                    "pushed_by": { "email": null, "full_name": null, "username": "elastic" }
                }
            }),
            vec![UserActionReference::case("123")],
        );

        let action = to_case_user_action(stored).unwrap();
        assert_eq!(action.action, UserActionAction::PushToService);
        assert_eq!(
            action.payload["externalService"]["connector_id"],
            json!("none")
        );
    }

    #[test]
    fn comment_id_comes_from_reference() {
        let stored = record(
            "comment",
            "create",
            json!({ "comment": { "type": "user", "comment": "a comment", "owner": "cases" } }),
            vec![
                UserActionReference::case("123"),
                UserActionReference::comment("comment-1"),
            ],
        );

        let action = to_case_user_action(stored).unwrap();
        assert_eq!(action.comment_id.as_deref(), Some("comment-1"));
    }

    #[test]
    fn undecodable_record_is_an_error() {
        let stored = record(
            "title",
            "update",
            json!({}),
            vec![UserActionReference::case("123")],
        );

        let err = to_case_user_action(stored).unwrap_err();
        assert_eq!(err.path(), "payload.title");
    }
}
