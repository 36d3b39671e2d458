use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::db::DatabaseError;

/// Closed set of domain error kinds. Each kind carries its stable wire code and
/// the HTTP status it maps to, so handlers never inspect message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Validation
    InvalidTeamId,
    InvalidTeamName,
    InvalidEmail,
    InvalidName,
    InvalidRole,
    InvalidPlanConfig,
    InvalidManagerRole,
    InvalidStatus,
    InvalidReportType,
    InvalidCursor,
    SelfDeactivation,
    UserIsManager,
    // Referential / state
    UserNotFound,
    TeamNotFound,
    PlanNotFound,
    ReportNotFound,
    ManagerNotFound,
    ManagerDeactivated,
    AlreadyInactive,
    // Conflicts
    UserExists,
    TeamExists,
    ReportExists,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidTeamId => "INVALID_TEAM_ID",
            ErrorCode::InvalidTeamName => "INVALID_TEAM_NAME",
            ErrorCode::InvalidEmail => "INVALID_EMAIL",
            ErrorCode::InvalidName => "INVALID_NAME",
            ErrorCode::InvalidRole => "INVALID_ROLE",
            ErrorCode::InvalidPlanConfig => "INVALID_PLAN_CONFIG",
            ErrorCode::InvalidManagerRole => "INVALID_MANAGER_ROLE",
            ErrorCode::InvalidStatus => "INVALID_STATUS",
            ErrorCode::InvalidReportType => "INVALID_REPORT_TYPE",
            ErrorCode::InvalidCursor => "INVALID_CURSOR",
            ErrorCode::SelfDeactivation => "SELF_DEACTIVATION",
            ErrorCode::UserIsManager => "USER_IS_MANAGER",
            ErrorCode::UserNotFound => "USER_NOT_FOUND",
            ErrorCode::TeamNotFound => "TEAM_NOT_FOUND",
            ErrorCode::PlanNotFound => "PLAN_NOT_FOUND",
            ErrorCode::ReportNotFound => "REPORT_NOT_FOUND",
            ErrorCode::ManagerNotFound => "MANAGER_NOT_FOUND",
            ErrorCode::ManagerDeactivated => "MANAGER_DEACTIVATED",
            ErrorCode::AlreadyInactive => "ALREADY_INACTIVE",
            ErrorCode::UserExists => "USER_EXISTS",
            ErrorCode::TeamExists => "TEAM_EXISTS",
            ErrorCode::ReportExists => "REPORT_EXISTS",
        }
    }

    pub fn status(self) -> StatusCode {
        match self {
            ErrorCode::InvalidTeamId
            | ErrorCode::InvalidTeamName
            | ErrorCode::InvalidEmail
            | ErrorCode::InvalidName
            | ErrorCode::InvalidRole
            | ErrorCode::InvalidPlanConfig
            | ErrorCode::InvalidManagerRole
            | ErrorCode::InvalidStatus
            | ErrorCode::InvalidReportType
            | ErrorCode::InvalidCursor
            | ErrorCode::SelfDeactivation
            | ErrorCode::UserIsManager
            | ErrorCode::ManagerDeactivated
            | ErrorCode::AlreadyInactive => StatusCode::BAD_REQUEST,
            ErrorCode::UserNotFound
            | ErrorCode::TeamNotFound
            | ErrorCode::PlanNotFound
            | ErrorCode::ReportNotFound
            | ErrorCode::ManagerNotFound => StatusCode::NOT_FOUND,
            ErrorCode::UserExists | ErrorCode::TeamExists | ErrorCode::ReportExists => {
                StatusCode::CONFLICT
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{message}")]
    Domain { code: ErrorCode, message: String },

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Authorization error: {0}")]
    Authorization(String),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

impl AppError {
    pub fn domain(code: ErrorCode, message: impl Into<String>) -> Self {
        AppError::Domain {
            code,
            message: message.into(),
        }
    }

    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            AppError::Domain { code, .. } => Some(*code),
            _ => None,
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(DatabaseError::from(err))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Domain { code, message } => (code.status(), code.as_str(), message.clone()),
            AppError::Authentication(_) => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Authentication required".to_string(),
            ),
            AppError::Authorization(_) => (
                StatusCode::FORBIDDEN,
                "FORBIDDEN",
                "Access denied".to_string(),
            ),
            // Infrastructure detail stays server-side.
            AppError::Database(err) => {
                tracing::error!(error = %err, "database failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "success": false,
            "error": {
                "code": code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_codes_map_to_400() {
        for code in [
            ErrorCode::InvalidTeamId,
            ErrorCode::InvalidTeamName,
            ErrorCode::InvalidEmail,
            ErrorCode::InvalidName,
            ErrorCode::InvalidRole,
            ErrorCode::InvalidPlanConfig,
            ErrorCode::SelfDeactivation,
            ErrorCode::AlreadyInactive,
        ] {
            assert_eq!(code.status(), StatusCode::BAD_REQUEST, "{}", code.as_str());
        }
    }

    #[test]
    fn conflict_codes_map_to_409() {
        for code in [
            ErrorCode::UserExists,
            ErrorCode::TeamExists,
            ErrorCode::ReportExists,
        ] {
            assert_eq!(code.status(), StatusCode::CONFLICT);
        }
    }

    #[test]
    fn not_found_codes_map_to_404() {
        for code in [
            ErrorCode::UserNotFound,
            ErrorCode::TeamNotFound,
            ErrorCode::PlanNotFound,
            ErrorCode::ReportNotFound,
            ErrorCode::ManagerNotFound,
        ] {
            assert_eq!(code.status(), StatusCode::NOT_FOUND);
        }
    }

    #[test]
    fn wire_codes_are_upper_snake() {
        for c in [
            ErrorCode::InvalidPlanConfig.as_str(),
            ErrorCode::ManagerDeactivated.as_str(),
            ErrorCode::ReportExists.as_str(),
        ] {
            assert!(c.chars().all(|ch| ch.is_ascii_uppercase() || ch == '_'));
        }
    }

    #[test]
    fn database_errors_carry_no_wire_code() {
        let err = AppError::Database(DatabaseError::ConnectionError("db-host:5432".into()));
        assert!(err.code().is_none());
    }
}
