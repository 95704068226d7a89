//! Limits applied to decoded user action payloads.

use validator::{ValidationError, ValidationErrors};

use crate::models::{
    case::CaseAssignee,
    user_action::{UserActionAction, UserActionPayload, UserActionType},
};

pub const MAX_ASSIGNEES_PER_CASE: usize = 10;
pub const MAX_TITLE_LENGTH: usize = 160;
pub const MAX_DESCRIPTION_LENGTH: usize = 30_000;
pub const MAX_TAGS_PER_CASE: usize = 200;
pub const MAX_LENGTH_PER_TAG: usize = 256;
pub const MAX_CATEGORY_LENGTH: usize = 50;
pub const MAX_CATEGORY_FILTER_LENGTH: usize = 100;
pub const MAX_COMMENT_LENGTH: usize = 30_000;

/// True when a case would end up with more assignees than allowed.
pub fn are_total_assignees_invalid(assignees: Option<&[CaseAssignee]>) -> bool {
    match assignees {
        None => false,
        Some(assignees) => assignees.len() > MAX_ASSIGNEES_PER_CASE,
    }
}

pub fn validate_title(title: &str) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        return Err(ValidationError::new("title_empty"));
    }
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(ValidationError::new("title_too_long"));
    }
    Ok(())
}

pub fn validate_description(description: &str) -> Result<(), ValidationError> {
    if description.chars().count() > MAX_DESCRIPTION_LENGTH {
        return Err(ValidationError::new("description_too_long"));
    }
    Ok(())
}

pub fn validate_tags(tags: &[String]) -> Result<(), ValidationError> {
    if tags.len() > MAX_TAGS_PER_CASE {
        return Err(ValidationError::new("too_many_tags"));
    }
    if tags.iter().any(|tag| tag.trim().is_empty()) {
        return Err(ValidationError::new("tag_empty"));
    }
    if tags.iter().any(|tag| tag.chars().count() > MAX_LENGTH_PER_TAG) {
        return Err(ValidationError::new("tag_too_long"));
    }
    Ok(())
}

pub fn validate_assignees(assignees: &[CaseAssignee]) -> Result<(), ValidationError> {
    if are_total_assignees_invalid(Some(assignees)) {
        return Err(ValidationError::new("too_many_assignees"));
    }
    Ok(())
}

pub fn validate_category(category: Option<&str>) -> Result<(), ValidationError> {
    match category {
        Some(category) if category.chars().count() > MAX_CATEGORY_LENGTH => {
            Err(ValidationError::new("category_too_long"))
        }
        _ => Ok(()),
    }
}

/// Bounds the number of `types` values a find request may carry.
pub fn validate_category_filter<S: AsRef<str>>(categories: &[S]) -> Result<(), ValidationError> {
    if categories.len() > MAX_CATEGORY_FILTER_LENGTH {
        return Err(ValidationError::new("too_many_categories"));
    }
    Ok(())
}

/// Checks that the action makes sense for the user action type.
pub fn validate_action(kind: UserActionType, action: UserActionAction) -> Result<(), ValidationError> {
    let allowed: &[UserActionAction] = match kind {
        UserActionType::Comment => &[
            UserActionAction::Create,
            UserActionAction::Update,
            UserActionAction::Delete,
        ],
        UserActionType::Tags | UserActionType::Assignees => {
            &[UserActionAction::Add, UserActionAction::Delete]
        }
        UserActionType::Category => &[UserActionAction::Update, UserActionAction::Delete],
        UserActionType::CreateCase => &[UserActionAction::Create],
        UserActionType::DeleteCase => &[UserActionAction::Delete],
        UserActionType::Pushed => &[UserActionAction::PushToService],
        _ => &[UserActionAction::Update],
    };

    if allowed.contains(&action) {
        Ok(())
    } else {
        Err(ValidationError::new("action_not_allowed_for_type"))
    }
}

/// Applies the payload limits, collecting every violation.
pub fn validate_payload(payload: &UserActionPayload) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let mut check = |field: &'static str, result: Result<(), ValidationError>| {
        if let Err(err) = result {
            errors.add(field, err);
        }
    };

    match payload {
        UserActionPayload::Title(p) => check("title", validate_title(&p.title)),
        UserActionPayload::Description(p) => {
            check("description", validate_description(&p.description))
        }
        UserActionPayload::Tags(p) => check("tags", validate_tags(&p.tags)),
        UserActionPayload::Assignees(p) => check("assignees", validate_assignees(&p.assignees)),
        UserActionPayload::Category(p) => check("category", validate_category(p.category.as_deref())),
        UserActionPayload::CreateCase(p) => {
            check("title", validate_title(&p.title));
            check("description", validate_description(&p.description));
            check("tags", validate_tags(&p.tags));
            check("assignees", validate_assignees(&p.assignees));
            check("category", validate_category(p.category.as_deref()));
        }
        UserActionPayload::Comment(p) => {
            if p.comment.owner().trim().is_empty() {
                check("owner", Err(ValidationError::new("owner_empty")));
            }
            if let crate::models::attachment::Attachment::User { comment, .. } = &p.comment {
                if comment.chars().count() > MAX_COMMENT_LENGTH {
                    check("comment", Err(ValidationError::new("comment_too_long")));
                }
            }
        }
        _ => {}
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user_action::{AssigneesPayload, TagsPayload, TitlePayload};

    fn assignees(count: usize) -> Vec<CaseAssignee> {
        (0..count).map(|i| CaseAssignee::new(i.to_string())).collect()
    }

    #[test]
    fn assignees_absent_are_valid() {
        assert!(!are_total_assignees_invalid(None));
    }

    #[test]
    fn assignees_at_limit_are_valid() {
        assert!(!are_total_assignees_invalid(Some(&assignees(
            MAX_ASSIGNEES_PER_CASE
        ))));
    }

    #[test]
    fn assignees_over_limit_are_invalid() {
        assert!(are_total_assignees_invalid(Some(&assignees(
            MAX_ASSIGNEES_PER_CASE + 1
        ))));
    }

    #[test]
    fn title_rejects_blank_and_long_values() {
        assert!(validate_title("  ").is_err());
        assert!(validate_title(&"a".repeat(MAX_TITLE_LENGTH + 1)).is_err());
        assert!(validate_title("Case SIR").is_ok());
    }

    #[test]
    fn tags_reject_empty_tag() {
        assert!(validate_tags(&["ok".to_string(), " ".to_string()]).is_err());
        assert!(validate_tags(&["sir".to_string()]).is_ok());
    }

    #[test]
    fn category_filter_is_bounded() {
        let categories: Vec<String> = (0..=MAX_CATEGORY_FILTER_LENGTH)
            .map(|i| i.to_string())
            .collect();
        assert!(validate_category_filter(&categories).is_err());
        assert!(validate_category_filter(&categories[1..]).is_ok());
    }

    #[test]
    fn actions_are_checked_per_type() {
        assert!(validate_action(UserActionType::Tags, UserActionAction::Add).is_ok());
        assert!(validate_action(UserActionType::Tags, UserActionAction::Update).is_err());
        assert!(validate_action(UserActionType::Comment, UserActionAction::Delete).is_ok());
        assert!(validate_action(UserActionType::Status, UserActionAction::Create).is_err());
    }

    #[test]
    fn payload_validation_collects_field_errors() {
        let payload = UserActionPayload::Assignees(AssigneesPayload {
            assignees: assignees(MAX_ASSIGNEES_PER_CASE + 1),
        });
        let errors = validate_payload(&payload).unwrap_err();
        assert!(errors.field_errors().contains_key("assignees"));

        let ok = UserActionPayload::Tags(TagsPayload {
            tags: vec!["one".to_string()],
        });
        assert!(validate_payload(&ok).is_ok());

        let blank = UserActionPayload::Title(TitlePayload {
            title: String::new(),
        });
        assert!(validate_payload(&blank).is_err());
    }
}
