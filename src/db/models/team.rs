use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    /// Slug identifier, immutable once created.
    pub team_id: String,
    pub name: String,
    pub manager_id: Option<String>,
    pub is_active: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    pub created_by: String,
    pub updated_by: Option<String>,
}

/// Team row enriched for list views: member headcount and the manager's
/// display name joined in.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamSummary {
    pub team_id: String,
    pub name: String,
    pub manager_id: Option<String>,
    pub manager_name: Option<String>,
    pub member_count: i64,
    pub is_active: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTeam {
    pub team_id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateManager {
    /// `null` clears the assignment.
    pub manager_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamStatusFilter {
    #[default]
    Active,
    Archived,
    All,
}
