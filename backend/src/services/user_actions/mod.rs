//! Case user action service.
//!
//! `creator` writes user actions, `finder` pages through them and the methods
//! on [`CaseUserActionService`] answer the aggregate questions asked about a
//! case's history.

pub mod builders;
pub mod create;
pub mod diff;
mod error;
pub mod find;
pub mod transform;

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

pub use create::UserActionPersister;
pub use error::UserActionError;
pub use find::{FindLimits, UserActionFinder};

use crate::audit::AuditLogger;
use crate::models::find::{CaseUsers, Participant, UserActionStats};
use crate::models::requests::ConnectorPush;
use crate::models::user_action::{CaseUserAction, User, UserActionType};
use crate::repositories::{UserActionQuery, UserActionStore};
use crate::validation::decode::decode_as;
use transform::{to_case_user_action, to_case_user_actions};

/// Types that matter when deciding whether a case changed since its last push.
pub const PUSH_RELEVANT_TYPES: [UserActionType; 12] = [
    UserActionType::Connector,
    UserActionType::CreateCase,
    UserActionType::Pushed,
    UserActionType::Title,
    UserActionType::Description,
    UserActionType::Tags,
    UserActionType::Comment,
    UserActionType::Severity,
    UserActionType::Status,
    UserActionType::Settings,
    UserActionType::Assignees,
    UserActionType::Category,
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ConnectorRef {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ConnectorFieldsBeforePush {
    pub connector_id: String,
    pub fields: CaseUserAction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PushActivity {
    pub most_recent: CaseUserAction,
    pub oldest: CaseUserAction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CaseConnectorActivity {
    pub connector_id: String,
    pub fields: CaseUserAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push: Option<PushActivity>,
}

#[derive(Clone)]
pub struct CaseUserActionService {
    store: Arc<dyn UserActionStore>,
    pub creator: UserActionPersister,
    pub finder: UserActionFinder,
}

impl CaseUserActionService {
    pub fn new(
        store: Arc<dyn UserActionStore>,
        audit_logger: Arc<dyn AuditLogger>,
        limits: FindLimits,
    ) -> Self {
        Self::from_parts(
            Arc::clone(&store),
            UserActionPersister::new(Arc::clone(&store), audit_logger),
            UserActionFinder::new(store, limits),
        )
    }

    pub fn from_parts(
        store: Arc<dyn UserActionStore>,
        creator: UserActionPersister,
        finder: UserActionFinder,
    ) -> Self {
        Self {
            store,
            creator,
            finder,
        }
    }

    /// Every user action of the case, oldest first.
    pub async fn get_all(&self, case_id: &str) -> Result<Vec<CaseUserAction>, UserActionError> {
        let records = self
            .store
            .find_for_case(case_id, &UserActionQuery::all_ascending())
            .await
            .map_err(UserActionError::store("get all user actions"))?;
        Ok(to_case_user_actions(records)?)
    }

    pub async fn get_most_recent_user_action(
        &self,
        case_id: &str,
        is_pushed: bool,
    ) -> Result<Option<CaseUserAction>, UserActionError> {
        let types = if is_pushed {
            PUSH_RELEVANT_TYPES.to_vec()
        } else {
            Vec::new()
        };

        let record = self
            .store
            .latest_for_case(case_id, types, is_pushed)
            .await
            .map_err(UserActionError::store("get most recent user action"))?;
        Ok(record.map(to_case_user_action).transpose()?)
    }

    pub async fn get_unique_connectors(
        &self,
        case_id: &str,
    ) -> Result<Vec<ConnectorRef>, UserActionError> {
        let ids = self
            .store
            .connector_ids(
                case_id,
                vec![UserActionType::Connector, UserActionType::CreateCase],
            )
            .await
            .map_err(UserActionError::store("get unique connectors"))?;
        Ok(ids.into_iter().map(|id| ConnectorRef { id }).collect())
    }

    /// For each push, the connector fields that were in effect just before it.
    pub async fn get_connector_fields_before_latest_push(
        &self,
        case_id: &str,
        pushes: &[ConnectorPush],
    ) -> Result<Vec<ConnectorFieldsBeforePush>, UserActionError> {
        let mut result = Vec::with_capacity(pushes.len());
        for push in pushes {
            let record = self
                .store
                .connector_actions(case_id, &push.connector_id, Some(push.date))
                .await
                .map_err(UserActionError::store("get connector fields before push"))?;
            if let Some(record) = record {
                result.push(ConnectorFieldsBeforePush {
                    connector_id: push.connector_id.clone(),
                    fields: to_case_user_action(record)?,
                });
            }
        }
        Ok(result)
    }

    /// Latest fields and push history of every connector the case referenced.
    /// Connectors without a connector or create_case record are skipped.
    pub async fn get_case_connector_information(
        &self,
        case_id: &str,
    ) -> Result<Vec<CaseConnectorActivity>, UserActionError> {
        let connector_ids = self
            .store
            .connector_ids(
                case_id,
                vec![
                    UserActionType::Connector,
                    UserActionType::CreateCase,
                    UserActionType::Pushed,
                ],
            )
            .await
            .map_err(UserActionError::store("get case connector ids"))?;

        let mut activity = Vec::with_capacity(connector_ids.len());
        for connector_id in connector_ids {
            let Some(fields) = self
                .store
                .connector_actions(case_id, &connector_id, None)
                .await
                .map_err(UserActionError::store("get connector fields"))?
            else {
                continue;
            };

            let pushes = self
                .store
                .pushes_for_connector(case_id, &connector_id)
                .await
                .map_err(UserActionError::store("get connector pushes"))?;
            let push = match (pushes.most_recent, pushes.oldest) {
                (Some(most_recent), Some(oldest)) => Some(PushActivity {
                    most_recent: to_case_user_action(most_recent)?,
                    oldest: to_case_user_action(oldest)?,
                }),
                _ => None,
            };

            activity.push(CaseConnectorActivity {
                connector_id,
                fields: to_case_user_action(fields)?,
                push,
            });
        }

        Ok(activity)
    }

    pub async fn get_case_user_action_stats(
        &self,
        case_id: &str,
    ) -> Result<UserActionStats, UserActionError> {
        self.store
            .stats_for_case(case_id)
            .await
            .map_err(UserActionError::store("get user action stats"))
    }

    pub async fn get_users(&self, case_id: &str) -> Result<CaseUsers, UserActionError> {
        let rows = self
            .store
            .participants(case_id)
            .await
            .map_err(UserActionError::store("get participants"))?;

        let mut participants = Vec::with_capacity(rows.len());
        for (created_by, owner) in rows {
            let user: User = decode_as(created_by.0, "created_by")?;
            participants.push(Participant { user, owner });
        }

        let assigned_and_unassigned_users = self
            .store
            .assignee_uids(case_id)
            .await
            .map_err(UserActionError::store("get assignee uids"))?;

        Ok(CaseUsers {
            participants,
            assigned_and_unassigned_users,
        })
    }

    /// Deletes every user action of the given cases.
    pub async fn remove_for_cases(&self, case_ids: Vec<String>) -> Result<u64, UserActionError> {
        let removed = self
            .store
            .delete_for_cases(case_ids)
            .await
            .map_err(UserActionError::store("remove user actions"))?;
        tracing::info!(removed, "Removed user actions of deleted cases");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::transform::fixtures::{elastic_user, fixed_time, record};
    use super::*;
    use crate::audit::MockAuditLogger;
    use crate::models::user_action::UserActionReference;
    use crate::repositories::user_action::MockUserActionStore;
    use crate::repositories::PushRecords;
    use serde_json::json;
    use sqlx::types::Json;

    fn service(store: MockUserActionStore) -> CaseUserActionService {
        CaseUserActionService::new(
            Arc::new(store),
            Arc::new(MockAuditLogger::new()),
            FindLimits::default(),
        )
    }

    fn connector_record(connector_id: &str) -> crate::models::user_action::UserActionRecord {
        record(
            "connector",
            "update",
            json!({
                "connector": {
                    "name": "Jira",
                    "type": ".jira",
                    "fields": { "issueType": "bug", "priority": "high", "parent": "2" }
                }
            }),
            vec![
                UserActionReference::case("123"),
                UserActionReference::connector(connector_id),
            ],
        )
    }

    fn push_record(connector_id: &str) -> crate::models::user_action::UserActionRecord {
        record(
            "pushed",
            "push_to_service",
            json!({
                "externalService": {
                    "connector_name": "Jira",
                    "external_id": "100",
                    "external_title": "CASE-1",
                    "external_url": "https://jira.example.com/CASE-1",
                    "pushed_at": "2022-01-09T22:00:00.000Z",
                    "pushed_by": elastic_user()
                }
            }),
            vec![
                UserActionReference::case("123"),
                UserActionReference::push_connector(connector_id),
            ],
        )
    }

    #[tokio::test]
    async fn get_all_requests_ascending_order() {
        let mut store = MockUserActionStore::new();
        store
            .expect_find_for_case()
            .withf(|case_id, query| case_id == "123" && *query == UserActionQuery::all_ascending())
            .returning(|_, _| Ok(vec![connector_record("456")]));

        let actions = service(store).get_all("123").await.unwrap();
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].payload["connector"]["id"], json!("456"));
    }

    #[tokio::test]
    async fn get_all_fails_when_payload_is_missing() {
        let mut store = MockUserActionStore::new();
        store.expect_find_for_case().returning(|_, _| {
            let mut broken = connector_record("456");
            broken.payload = Json(json!(null));
            Ok(vec![broken])
        });

        let err = service(store).get_all("123").await.unwrap_err();
        assert!(matches!(err, UserActionError::Decode(_)));
    }

    #[tokio::test]
    async fn most_recent_pushed_excludes_alerts() {
        let mut store = MockUserActionStore::new();
        store
            .expect_latest_for_case()
            .withf(|_, types, exclude_alerts| {
                *exclude_alerts && types.len() == PUSH_RELEVANT_TYPES.len()
            })
            .returning(|_, _, _| Ok(None));

        let latest = service(store)
            .get_most_recent_user_action("123", true)
            .await
            .unwrap();
        assert!(latest.is_none());
    }

    #[tokio::test]
    async fn unique_connectors_come_from_connector_records() {
        let mut store = MockUserActionStore::new();
        store
            .expect_connector_ids()
            .withf(|_, types| {
                *types == vec![UserActionType::Connector, UserActionType::CreateCase]
            })
            .returning(|_, _| Ok(vec!["865b6040".to_string(), "915c2600".to_string()]));

        let connectors = service(store).get_unique_connectors("123").await.unwrap();
        assert_eq!(
            connectors,
            vec![
                ConnectorRef {
                    id: "865b6040".to_string()
                },
                ConnectorRef {
                    id: "915c2600".to_string()
                }
            ]
        );
    }

    #[tokio::test]
    async fn connector_information_pairs_fields_with_pushes() {
        let mut store = MockUserActionStore::new();
        store
            .expect_connector_ids()
            .returning(|_, _| Ok(vec!["456".to_string(), "orphan".to_string()]));
        store
            .expect_connector_actions()
            .returning(|_, connector_id, _| {
                Ok((connector_id == "456").then(|| connector_record("456")))
            });
        store
            .expect_pushes_for_connector()
            .returning(|_, connector_id| {
                Ok(PushRecords {
                    most_recent: Some(push_record(connector_id)),
                    oldest: Some(push_record(connector_id)),
                })
            });

        let info = service(store)
            .get_case_connector_information("123")
            .await
            .unwrap();

        assert_eq!(info.len(), 1);
        assert_eq!(info[0].connector_id, "456");
        let push = info[0].push.as_ref().unwrap();
        assert_eq!(
            push.most_recent.payload["externalService"]["connector_id"],
            json!("456")
        );
    }

    #[tokio::test]
    async fn fields_before_push_use_the_push_date() {
        let mut store = MockUserActionStore::new();
        store
            .expect_connector_actions()
            .withf(|_, connector_id, before| connector_id == "456" && *before == Some(fixed_time()))
            .returning(|_, _, _| Ok(Some(connector_record("456"))));

        let fields = service(store)
            .get_connector_fields_before_latest_push(
                "123",
                &[ConnectorPush {
                    connector_id: "456".to_string(),
                    date: fixed_time(),
                }],
            )
            .await
            .unwrap();

        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].fields.kind, UserActionType::Connector);
    }

    #[tokio::test]
    async fn users_decode_participants() {
        let mut store = MockUserActionStore::new();
        store
            .expect_participants()
            .returning(|_| Ok(vec![(Json(elastic_user()), "securitySolution".to_string())]));
        store
            .expect_assignee_uids()
            .returning(|_| Ok(vec!["1".to_string()]));

        let users = service(store).get_users("123").await.unwrap();
        assert_eq!(users.participants.len(), 1);
        assert_eq!(
            users.participants[0].user.username.as_deref(),
            Some("elastic")
        );
        assert_eq!(users.assigned_and_unassigned_users, vec!["1".to_string()]);
    }

    #[tokio::test]
    async fn remove_for_cases_reports_the_count() {
        let mut store = MockUserActionStore::new();
        store
            .expect_delete_for_cases()
            .withf(|case_ids| *case_ids == vec!["1".to_string(), "2".to_string()])
            .returning(|_| Ok(7));

        let removed = service(store)
            .remove_for_cases(vec!["1".to_string(), "2".to_string()])
            .await
            .unwrap();
        assert_eq!(removed, 7);
    }
}
