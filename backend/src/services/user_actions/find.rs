use std::sync::Arc;

use super::transform::to_case_user_actions;
use super::UserActionError;
use crate::models::find::{FindQueryParams, FindTypeFilter, UserActionsFindResponse};
use crate::repositories::{UserActionQuery, UserActionStore};
use crate::validation::rules;
use validator::ValidationErrors;

/// Paging more than this many documents is refused.
pub const MAX_DOCS_PER_PAGE: i64 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FindLimits {
    pub default_per_page: i64,
    pub max_per_page: i64,
}

impl Default for FindLimits {
    fn default() -> Self {
        Self {
            default_per_page: 20,
            max_per_page: 100,
        }
    }
}

#[derive(Clone)]
pub struct UserActionFinder {
    store: Arc<dyn UserActionStore>,
    limits: FindLimits,
}

impl UserActionFinder {
    pub fn new(store: Arc<dyn UserActionStore>, limits: FindLimits) -> Self {
        Self { store, limits }
    }

    pub async fn find(
        &self,
        case_id: &str,
        params: FindQueryParams,
    ) -> Result<UserActionsFindResponse, UserActionError> {
        let filters = parse_type_filters(params.types.as_deref())?;
        let page = params.page.unwrap_or(1);
        let per_page = params.per_page.unwrap_or(self.limits.default_per_page);
        self.validate_paging(page, per_page)?;

        let query = UserActionQuery {
            filters,
            sort: params.sort_order.unwrap_or_default(),
            limit: Some(per_page),
            offset: (page - 1) * per_page,
        };

        let records = self
            .store
            .find_for_case(case_id, &query)
            .await
            .map_err(UserActionError::store("find user actions"))?;
        let total = self
            .store
            .count_for_case(case_id, &query)
            .await
            .map_err(UserActionError::store("count user actions"))?;

        Ok(UserActionsFindResponse {
            page,
            per_page,
            total,
            user_actions: to_case_user_actions(records)?,
        })
    }

    fn validate_paging(&self, page: i64, per_page: i64) -> Result<(), UserActionError> {
        if page < 1 {
            return Err(UserActionError::Invalid(
                "page must be greater than or equal to 1".to_string(),
            ));
        }
        if per_page < 1 || per_page > self.limits.max_per_page {
            return Err(UserActionError::Invalid(format!(
                "per_page must be between 1 and {}",
                self.limits.max_per_page
            )));
        }
        if page.saturating_mul(per_page) > MAX_DOCS_PER_PAGE {
            return Err(UserActionError::Invalid(format!(
                "The number of documents is too high. Paginating through more than {} documents is not possible.",
                MAX_DOCS_PER_PAGE
            )));
        }
        Ok(())
    }
}

/// Parses a comma separated list of type filters. Blank input means `all`.
pub fn parse_type_filters(raw: Option<&str>) -> Result<Vec<FindTypeFilter>, UserActionError> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };

    let values: Vec<&str> = raw
        .split(',')
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .collect();
    if let Err(err) = rules::validate_category_filter(&values) {
        let mut errors = ValidationErrors::new();
        errors.add("types", err);
        return Err(errors.into());
    }

    let mut filters = Vec::new();
    for value in values {
        let filter = value.parse::<FindTypeFilter>().map_err(UserActionError::Invalid)?;
        if !filters.contains(&filter) {
            filters.push(filter);
        }
    }

    Ok(filters)
}
