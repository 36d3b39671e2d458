use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "report_type")]
pub enum ReportType {
    #[sqlx(rename = "self")]
    #[serde(rename = "self")]
    SelfAssessment,
    #[sqlx(rename = "manager")]
    #[serde(rename = "manager")]
    Manager,
}

impl ReportType {
    pub fn as_str(self) -> &'static str {
        match self {
            ReportType::SelfAssessment => "self",
            ReportType::Manager => "manager",
        }
    }
}

impl FromStr for ReportType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "self" => Ok(ReportType::SelfAssessment),
            "manager" => Ok(ReportType::Manager),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "report_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    NotStarted,
    InProgress,
    Submitted,
}

impl FromStr for ReportStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not_started" => Ok(ReportStatus::NotStarted),
            "in_progress" => Ok(ReportStatus::InProgress),
            "submitted" => Ok(ReportStatus::Submitted),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetencyFeedback {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_level_feedback: Option<String>,
}

/// competency name -> level (stringified number) -> feedback
pub type Responses = BTreeMap<String, BTreeMap<String, CompetencyFeedback>>;

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentReport {
    /// `"{user_id}|{assessment_id}|{type}"`, see [`report_id`].
    pub report_id: String,
    pub user_id: String,
    pub assessment_id: String,
    pub report_type: ReportType,
    pub assessor_id: String,
    pub responses: Json<Responses>,
    pub status: ReportStatus,
    #[serde(with = "time::serde::rfc3339::option")]
    pub submitted_at: Option<OffsetDateTime>,
    pub shared_with_assessee: bool,
    #[serde(with = "time::serde::rfc3339::option")]
    pub shared_at: Option<OffsetDateTime>,
    pub shared_by: Option<String>,
    pub is_active: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Composite key for one assessor's responses on one subject/assessment/type.
pub fn report_id(user_id: &str, assessment_id: &str, report_type: ReportType) -> String {
    format!("{}|{}|{}", user_id, assessment_id, report_type.as_str())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReport {
    pub user_id: String,
    pub assessment_id: String,
    /// "self" or "manager"; validated before the key is computed.
    pub report_type: String,
    #[serde(default)]
    pub responses: Option<Responses>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReport {
    #[serde(default)]
    pub responses: Option<Responses>,
    /// Status name; validated against the closed set.
    #[serde(default)]
    pub status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_id_joins_key_parts_with_pipes() {
        let id = report_id("ada@example.com", "2025-Q1-eng", ReportType::SelfAssessment);
        assert_eq!(id, "ada@example.com|2025-Q1-eng|self");
        let id = report_id("ada@example.com", "2025-Q1-eng", ReportType::Manager);
        assert_eq!(id, "ada@example.com|2025-Q1-eng|manager");
    }

    #[test]
    fn report_type_round_trips_from_str() {
        assert_eq!("self".parse(), Ok(ReportType::SelfAssessment));
        assert_eq!("manager".parse(), Ok(ReportType::Manager));
        assert!("peer".parse::<ReportType>().is_err());
    }

    #[test]
    fn status_parses_closed_set_only() {
        assert_eq!("in_progress".parse(), Ok(ReportStatus::InProgress));
        assert!("done".parse::<ReportStatus>().is_err());
    }
}
