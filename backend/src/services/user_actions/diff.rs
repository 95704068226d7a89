//! Field-by-field comparison of a case before and after a bulk update.

use std::collections::HashSet;
use std::hash::Hash;

use crate::models::case::CaseAttributes;
use crate::models::user_action::{
    AssigneesPayload, CategoryPayload, ConnectorPayload, DescriptionPayload, SettingsPayload,
    SeverityPayload, StatusPayload, TagsPayload, TitlePayload, UserActionAction,
    UserActionPayload,
};

/// One changed field of a case.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldChange {
    pub action: UserActionAction,
    pub payload: UserActionPayload,
}

impl FieldChange {
    fn update(payload: UserActionPayload) -> Self {
        Self {
            action: UserActionAction::Update,
            payload,
        }
    }
}

/// Changes between `original` and `updated`, in the order title, status,
/// connector, description, tags, settings, severity, assignees, category.
///
/// Only fields present in `updated` are compared. Tags and assignees yield an
/// `add` change for new values followed by a `delete` change for removed ones.
pub fn diff_case(original: &CaseAttributes, updated: &CaseAttributes) -> Vec<FieldChange> {
    let mut changes = Vec::new();

    if let Some(title) = changed(&original.title, &updated.title) {
        changes.push(FieldChange::update(UserActionPayload::Title(TitlePayload {
            title: title.clone(),
        })));
    }
    if let Some(status) = changed(&original.status, &updated.status) {
        changes.push(FieldChange::update(UserActionPayload::Status(
            StatusPayload { status: *status },
        )));
    }
    if let Some(connector) = changed(&original.connector, &updated.connector) {
        changes.push(FieldChange::update(UserActionPayload::Connector(
            ConnectorPayload {
                connector: connector.clone(),
            },
        )));
    }
    if let Some(description) = changed(&original.description, &updated.description) {
        changes.push(FieldChange::update(UserActionPayload::Description(
            DescriptionPayload {
                description: description.clone(),
            },
        )));
    }
    if let Some(tags) = &updated.tags {
        let before = original.tags.as_deref().unwrap_or_default();
        let (added, removed) = added_and_removed(before, tags);
        if !added.is_empty() {
            changes.push(FieldChange {
                action: UserActionAction::Add,
                payload: UserActionPayload::Tags(TagsPayload { tags: added }),
            });
        }
        if !removed.is_empty() {
            changes.push(FieldChange {
                action: UserActionAction::Delete,
                payload: UserActionPayload::Tags(TagsPayload { tags: removed }),
            });
        }
    }
    if let Some(settings) = changed(&original.settings, &updated.settings) {
        changes.push(FieldChange::update(UserActionPayload::Settings(
            SettingsPayload {
                settings: *settings,
            },
        )));
    }
    if let Some(severity) = changed(&original.severity, &updated.severity) {
        changes.push(FieldChange::update(UserActionPayload::Severity(
            SeverityPayload {
                severity: *severity,
            },
        )));
    }
    if let Some(assignees) = &updated.assignees {
        let before = original.assignees.as_deref().unwrap_or_default();
        let (added, removed) = added_and_removed(before, assignees);
        if !added.is_empty() {
            changes.push(FieldChange {
                action: UserActionAction::Add,
                payload: UserActionPayload::Assignees(AssigneesPayload { assignees: added }),
            });
        }
        if !removed.is_empty() {
            changes.push(FieldChange {
                action: UserActionAction::Delete,
                payload: UserActionPayload::Assignees(AssigneesPayload { assignees: removed }),
            });
        }
    }
    if let Some(category) = &updated.category {
        let before = original.category.clone().flatten();
        if before != *category {
            let action = match category {
                Some(_) => UserActionAction::Update,
                None => UserActionAction::Delete,
            };
            changes.push(FieldChange {
                action,
                payload: UserActionPayload::Category(CategoryPayload {
                    category: category.clone(),
                }),
            });
        }
    }

    changes
}

fn changed<'a, T: PartialEq>(original: &Option<T>, updated: &'a Option<T>) -> Option<&'a T> {
    match updated {
        Some(value) if original.as_ref() != Some(value) => Some(value),
        _ => None,
    }
}

/// Values only in `after`, then values only in `before`, each in input order.
fn added_and_removed<T: Clone + Eq + Hash>(before: &[T], after: &[T]) -> (Vec<T>, Vec<T>) {
    let before_set: HashSet<&T> = before.iter().collect();
    let after_set: HashSet<&T> = after.iter().collect();

    let added = after
        .iter()
        .filter(|value| !before_set.contains(value))
        .cloned()
        .collect();
    let removed = before
        .iter()
        .filter(|value| !after_set.contains(value))
        .cloned()
        .collect();

    (added, removed)
}
