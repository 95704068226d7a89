//! Query and response shapes for reading user actions back.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::{IntoParams, ToSchema};

use super::user_action::{CaseUserAction, User, UserActionType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Category filter accepted by `find`. Besides the five categories any
/// concrete user action type may be requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FindTypeFilter {
    All,
    /// Every record that is not a comment.
    Action,
    /// Comments written by users.
    User,
    /// Alert attachments.
    Alert,
    /// Any other attachment kind.
    Attachment,
    Kind(UserActionType),
}

impl FindTypeFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            FindTypeFilter::All => "all",
            FindTypeFilter::Action => "action",
            FindTypeFilter::User => "user",
            FindTypeFilter::Alert => "alert",
            FindTypeFilter::Attachment => "attachment",
            FindTypeFilter::Kind(kind) => kind.as_str(),
        }
    }
}

impl fmt::Display for FindTypeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FindTypeFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(FindTypeFilter::All),
            "action" => Ok(FindTypeFilter::Action),
            "user" => Ok(FindTypeFilter::User),
            "alert" => Ok(FindTypeFilter::Alert),
            "attachment" => Ok(FindTypeFilter::Attachment),
            other => other
                .parse::<UserActionType>()
                .map(FindTypeFilter::Kind)
                .map_err(|_| format!("unknown find type filter: {}", other)),
        }
    }
}

impl Serialize for FindTypeFilter {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FindTypeFilter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Query string of `GET /api/cases/{case_id}/user_actions/_find`.
///
/// `types` is a comma separated list of [`FindTypeFilter`] values.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FindQueryParams {
    pub types: Option<String>,
    pub sort_order: Option<SortOrder>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserActionsFindResponse {
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
    pub user_actions: Vec<CaseUserAction>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserActionStats {
    pub total: i64,
    pub total_comments: i64,
    pub total_other: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Participant {
    pub user: User,
    pub owner: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CaseUsers {
    pub participants: Vec<Participant>,
    /// Profile uids that were ever assigned to or unassigned from the case.
    pub assigned_and_unassigned_users: Vec<String>,
}
