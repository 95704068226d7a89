//! External incident-management connectors attached to a case.
//!
//! The shape of `fields` depends on the connector type, so connectors are
//! decoded in two steps: the envelope first, then the fields against the
//! declared type.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use super::required_nullable;
use crate::validation::decode::{decode_as, DecodeError};

const FIELDS_PATH: &str = "fields";

pub const NONE_CONNECTOR_ID: &str = "none";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConnectorType {
    #[serde(rename = ".none")]
    None,
    #[serde(rename = ".jira")]
    Jira,
    #[serde(rename = ".servicenow")]
    ServiceNowItsm,
    #[serde(rename = ".servicenow-sir")]
    ServiceNowSir,
    #[serde(rename = ".resilient")]
    Resilient,
    #[serde(rename = ".swimlane")]
    Swimlane,
    #[serde(rename = ".cases-webhook")]
    CasesWebhook,
}

impl ConnectorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectorType::None => ".none",
            ConnectorType::Jira => ".jira",
            ConnectorType::ServiceNowItsm => ".servicenow",
            ConnectorType::ServiceNowSir => ".servicenow-sir",
            ConnectorType::Resilient => ".resilient",
            ConnectorType::Swimlane => ".swimlane",
            ConnectorType::CasesWebhook => ".cases-webhook",
        }
    }
}

impl fmt::Display for ConnectorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JiraFields {
    #[serde(rename = "issueType", deserialize_with = "required_nullable")]
    pub issue_type: Option<String>,
    #[serde(deserialize_with = "required_nullable")]
    pub priority: Option<String>,
    #[serde(deserialize_with = "required_nullable")]
    pub parent: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceNowItsmFields {
    #[serde(deserialize_with = "required_nullable")]
    pub impact: Option<String>,
    #[serde(deserialize_with = "required_nullable")]
    pub severity: Option<String>,
    #[serde(deserialize_with = "required_nullable")]
    pub urgency: Option<String>,
    #[serde(deserialize_with = "required_nullable")]
    pub category: Option<String>,
    #[serde(deserialize_with = "required_nullable")]
    pub subcategory: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceNowSirFields {
    #[serde(deserialize_with = "required_nullable")]
    pub category: Option<String>,
    #[serde(rename = "destIp", deserialize_with = "required_nullable")]
    pub dest_ip: Option<bool>,
    #[serde(rename = "malwareHash", deserialize_with = "required_nullable")]
    pub malware_hash: Option<bool>,
    #[serde(rename = "malwareUrl", deserialize_with = "required_nullable")]
    pub malware_url: Option<bool>,
    #[serde(deserialize_with = "required_nullable")]
    pub priority: Option<String>,
    #[serde(rename = "sourceIp", deserialize_with = "required_nullable")]
    pub source_ip: Option<bool>,
    #[serde(deserialize_with = "required_nullable")]
    pub subcategory: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResilientFields {
    #[serde(rename = "incidentTypes", deserialize_with = "required_nullable")]
    pub incident_types: Option<Vec<String>>,
    #[serde(rename = "severityCode", deserialize_with = "required_nullable")]
    pub severity_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwimlaneFields {
    #[serde(rename = "caseId", deserialize_with = "required_nullable")]
    pub case_id: Option<String>,
}

/// Typed connector fields. Serialized without a tag; the owning connector
/// carries the type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ConnectorFields {
    Jira(JiraFields),
    ServiceNowItsm(ServiceNowItsmFields),
    ServiceNowSir(ServiceNowSirFields),
    Resilient(ResilientFields),
    Swimlane(SwimlaneFields),
}

impl ConnectorFields {
    /// Decodes raw fields against the declared connector type.
    ///
    /// `.none` and `.cases-webhook` connectors never carry fields; every other
    /// type accepts either `null` or its own field object. Error paths start
    /// at `fields`.
    pub fn decode(
        connector_type: ConnectorType,
        raw: Option<Value>,
    ) -> Result<Option<ConnectorFields>, DecodeError> {
        let raw = match raw {
            None | Some(Value::Null) => return Ok(None),
            Some(value) => value,
        };

        let fields = match connector_type {
            ConnectorType::None | ConnectorType::CasesWebhook => {
                return Err(DecodeError::Invalid {
                    path: FIELDS_PATH.to_string(),
                    message: format!("connector type {} does not accept fields", connector_type),
                })
            }
            ConnectorType::Jira => ConnectorFields::Jira(decode_as(raw, FIELDS_PATH)?),
            ConnectorType::ServiceNowItsm => {
                ConnectorFields::ServiceNowItsm(decode_as(raw, FIELDS_PATH)?)
            }
            ConnectorType::ServiceNowSir => {
                ConnectorFields::ServiceNowSir(decode_as(raw, FIELDS_PATH)?)
            }
            ConnectorType::Resilient => ConnectorFields::Resilient(decode_as(raw, FIELDS_PATH)?),
            ConnectorType::Swimlane => ConnectorFields::Swimlane(decode_as(raw, FIELDS_PATH)?),
        };

        Ok(Some(fields))
    }
}

#[derive(Deserialize)]
struct RawConnector {
    #[serde(default)]
    id: Option<String>,
    name: String,
    #[serde(rename = "type")]
    connector_type: ConnectorType,
    #[serde(deserialize_with = "required_nullable")]
    fields: Option<Value>,
}

/// Connector as submitted with a case and as stored in user action payloads.
///
/// The id travels with incoming requests only; persisted payloads keep it in
/// the user action references instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawConnector")]
pub struct CaseConnector {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(rename = "type")]
    pub connector_type: ConnectorType,
    pub fields: Option<ConnectorFields>,
}

impl TryFrom<RawConnector> for CaseConnector {
    type Error = DecodeError;

    fn try_from(raw: RawConnector) -> Result<Self, Self::Error> {
        let fields = ConnectorFields::decode(raw.connector_type, raw.fields)?;
        Ok(Self {
            id: raw.id,
            name: raw.name,
            connector_type: raw.connector_type,
            fields,
        })
    }
}

impl CaseConnector {
    pub fn none() -> Self {
        Self {
            id: Some(NONE_CONNECTOR_ID.to_string()),
            name: "none".to_string(),
            connector_type: ConnectorType::None,
            fields: None,
        }
    }

    /// Connector id worth referencing; `None` for the "none" connector.
    pub fn referenced_id(&self) -> Option<&str> {
        self.id
            .as_deref()
            .filter(|id| !id.is_empty() && *id != NONE_CONNECTOR_ID)
    }

    pub fn without_id(mut self) -> Self {
        self.id = None;
        self
    }
}
