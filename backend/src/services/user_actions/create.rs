use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use validator::{Validate, ValidationErrors};

use super::builders::{build_user_action, case_deletion_event, BuildArgs, UserActionParameters};
use super::diff::diff_case;
use super::UserActionError;
use crate::audit::AuditLogger;
use crate::models::{
    attachment::Attachment,
    case::{CaseSnapshot, DeletedCase},
    requests::{AttachmentUserAction, BulkUpdateCasesRequest, CreateUserActionRequest},
    user_action::{
        CommentPayload, DeleteCasePayload, NewUserAction, User, UserActionAction,
        UserActionPayload, UserActionRecord, UserActionReference,
    },
};
use crate::repositories::UserActionStore;
use crate::validation::{decode::decode_as, decode_request_payload, rules};

pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Writes user actions and reports each one to the audit logger.
#[derive(Clone)]
pub struct UserActionPersister {
    store: Arc<dyn UserActionStore>,
    audit_logger: Arc<dyn AuditLogger>,
    clock: Clock,
}

impl UserActionPersister {
    pub fn new(store: Arc<dyn UserActionStore>, audit_logger: Arc<dyn AuditLogger>) -> Self {
        Self::with_clock(store, audit_logger, Arc::new(Utc::now))
    }

    pub fn with_clock(
        store: Arc<dyn UserActionStore>,
        audit_logger: Arc<dyn AuditLogger>,
        clock: Clock,
    ) -> Self {
        Self {
            store,
            audit_logger,
            clock,
        }
    }

    pub async fn create_user_action(
        &self,
        case_id: &str,
        request: CreateUserActionRequest,
    ) -> Result<UserActionRecord, UserActionError> {
        request.validate()?;

        let payload = decode_request_payload(request.kind, request.payload)?;
        let action = request
            .action
            .unwrap_or_else(|| request.kind.default_action());
        if let Err(err) = rules::validate_action(request.kind, action) {
            let mut errors = ValidationErrors::new();
            errors.add("action", err);
            return Err(errors.into());
        }
        rules::validate_payload(&payload)?;

        let params = build_user_action(
            payload,
            BuildArgs {
                case_id,
                owner: &request.owner,
                user: &request.user,
                action,
                attachment_id: request.attachment_id.as_deref(),
                created_at: (self.clock)(),
            },
        )?;

        let record = self
            .store
            .create(params.user_action)
            .await
            .map_err(UserActionError::store("create user action"))?;

        let user_action_id = record.id.to_string();
        self.audit_logger
            .log(params.event.into_event(Some(&user_action_id)));

        Ok(record)
    }

    /// Records one user action per changed field of every updated case that
    /// has an original.
    pub async fn bulk_create_update_case(
        &self,
        request: BulkUpdateCasesRequest,
    ) -> Result<Vec<UserActionRecord>, UserActionError> {
        request.validate()?;

        let originals: HashMap<&str, &CaseSnapshot> = request
            .original_cases
            .iter()
            .map(|case| (case.id.as_str(), case))
            .collect();
        let created_at = (self.clock)();
        let mut params = Vec::new();

        for updated in &request.updated_cases {
            let Some(original) = originals.get(updated.id.as_str()) else {
                continue;
            };

            let changes = diff_case(&original.attributes, &updated.attributes);
            if changes.is_empty() {
                continue;
            }

            let owner = original
                .attributes
                .owner
                .as_deref()
                .or(updated.attributes.owner.as_deref())
                .ok_or_else(|| {
                    UserActionError::Invalid(format!("Case {} has no owner", updated.id))
                })?;

            for change in changes {
                params.push(build_user_action(
                    change.payload,
                    BuildArgs {
                        case_id: &updated.id,
                        owner,
                        user: &request.user,
                        action: change.action,
                        attachment_id: None,
                        created_at,
                    },
                )?);
            }
        }

        self.persist_and_log(params, "bulk create update case user actions")
            .await
    }

    pub async fn bulk_create_attachment_creation(
        &self,
        case_id: &str,
        attachments: Vec<AttachmentUserAction>,
        user: &User,
    ) -> Result<Vec<UserActionRecord>, UserActionError> {
        self.bulk_create_attachment(case_id, attachments, user, UserActionAction::Create)
            .await
    }

    pub async fn bulk_create_attachment_deletion(
        &self,
        case_id: &str,
        attachments: Vec<AttachmentUserAction>,
        user: &User,
    ) -> Result<Vec<UserActionRecord>, UserActionError> {
        self.bulk_create_attachment(case_id, attachments, user, UserActionAction::Delete)
            .await
    }

    /// Audit-logs case deletions without persisting anything.
    pub fn bulk_audit_log_case_deletion(&self, case_ids: &[String]) {
        for case_id in case_ids {
            self.audit_logger.log(case_deletion_event(case_id));
        }
    }

    /// Persists a `delete_case` user action for every case.
    pub async fn bulk_create_case_deletion(
        &self,
        cases: &[DeletedCase],
        user: &User,
    ) -> Result<Vec<UserActionRecord>, UserActionError> {
        let created_at = (self.clock)();
        let mut params = Vec::with_capacity(cases.len());

        for case in cases {
            let mut built = build_user_action(
                UserActionPayload::DeleteCase(DeleteCasePayload {}),
                BuildArgs {
                    case_id: &case.id,
                    owner: &case.owner,
                    user,
                    action: UserActionAction::Delete,
                    attachment_id: None,
                    created_at,
                },
            )?;

            if let Some(connector_id) = case
                .connector_id
                .as_deref()
                .filter(|id| !id.is_empty() && *id != crate::models::connector::NONE_CONNECTOR_ID)
            {
                let mut references = built.user_action.references;
                references.push(UserActionReference::connector(connector_id));
                built.user_action = NewUserAction::new(built.user_action.attributes, references);
            }
            params.push(built);
        }

        self.persist_and_log(params, "bulk create case deletion user actions")
            .await
    }

    async fn bulk_create_attachment(
        &self,
        case_id: &str,
        attachments: Vec<AttachmentUserAction>,
        user: &User,
        action: UserActionAction,
    ) -> Result<Vec<UserActionRecord>, UserActionError> {
        let created_at = (self.clock)();
        let mut params = Vec::with_capacity(attachments.len());

        for (index, item) in attachments.into_iter().enumerate() {
            let attachment: Attachment =
                decode_as(item.attachment, &format!("attachments.{}.attachment", index))?;
            if attachment.owner().trim().is_empty() {
                return Err(UserActionError::Invalid(format!(
                    "Attachment {} has no owner",
                    item.id
                )));
            }
            let owner = attachment.owner().to_string();

            params.push(build_user_action(
                UserActionPayload::Comment(CommentPayload {
                    comment: attachment,
                }),
                BuildArgs {
                    case_id,
                    owner: &owner,
                    user,
                    action,
                    attachment_id: Some(&item.id),
                    created_at,
                },
            )?);
        }

        self.persist_and_log(params, "bulk create attachment user actions")
            .await
    }

    /// Writes every user action in one call, then logs each audit event with
    /// the id the store assigned.
    async fn persist_and_log(
        &self,
        params: Vec<UserActionParameters>,
        operation: &'static str,
    ) -> Result<Vec<UserActionRecord>, UserActionError> {
        if params.is_empty() {
            return Ok(Vec::new());
        }

        let (user_actions, events): (Vec<_>, Vec<_>) = params
            .into_iter()
            .map(|params| (params.user_action, params.event))
            .unzip();

        let records = self
            .store
            .bulk_create(user_actions)
            .await
            .map_err(UserActionError::store(operation))?;

        for (record, event) in records.iter().zip(events) {
            let user_action_id = record.id.to_string();
            self.audit_logger
                .log(event.into_event(Some(&user_action_id)));
        }

        tracing::debug!(count = records.len(), operation, "Persisted user actions");
        Ok(records)
    }
}
