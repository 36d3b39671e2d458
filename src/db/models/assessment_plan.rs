use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use time::OffsetDateTime;

/// One expectation rung inside a competency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelExpectation {
    pub level: i32,
    pub title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Competency {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub levels: Vec<LevelExpectation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub competencies: Vec<Competency>,
}

/// Ordered Category -> Competency -> Level rubric tree.
pub type PlanConfig = Vec<Category>;

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentPlan {
    pub team_id: String,
    /// Caller-chosen cycle identifier, e.g. "2025-Q1". No format enforced.
    pub season: String,
    pub name: String,
    pub description: Option<String>,
    pub plan_config: Json<PlanConfig>,
    pub is_active: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    pub created_by: String,
    pub updated_by: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertPlan {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub plan_config: PlanConfig,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}
