use sqlx::types::Json;
use sqlx::{PgPool, QueryBuilder};

use crate::db::models::{
    report_id, AssessmentReport, ReportStatus, ReportType, Responses,
};
use crate::error::{AppError, AppResult, ErrorCode};

pub struct ReportRepository;

fn not_found(id: &str) -> AppError {
    AppError::domain(
        ErrorCode::ReportNotFound,
        format!("No report with ID '{}'", id),
    )
}

impl ReportRepository {
    /// A soft-deleted report is indistinguishable from an absent one.
    pub async fn get(pool: &PgPool, id: &str) -> AppResult<AssessmentReport> {
        sqlx::query_as::<_, AssessmentReport>(
            "SELECT * FROM assessment_reports WHERE report_id = $1 AND is_active",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| not_found(id))
    }

    /// Conditional insert on the composite key. A soft-deleted row at the same
    /// key still counts as existing.
    pub async fn create(
        pool: &PgPool,
        user_id: &str,
        assessment_id: &str,
        report_type: ReportType,
        assessor_id: &str,
        responses: Option<Responses>,
    ) -> AppResult<AssessmentReport> {
        let id = report_id(user_id, assessment_id, report_type);
        let status = match &responses {
            Some(r) if !r.is_empty() => ReportStatus::InProgress,
            _ => ReportStatus::NotStarted,
        };

        let inserted = sqlx::query_as::<_, AssessmentReport>(
            r#"
            INSERT INTO assessment_reports
                (report_id, user_id, assessment_id, report_type, assessor_id, responses, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (report_id) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(&id)
        .bind(user_id)
        .bind(assessment_id)
        .bind(report_type)
        .bind(assessor_id)
        .bind(Json(responses.unwrap_or_default()))
        .bind(status)
        .fetch_optional(pool)
        .await?;

        inserted.ok_or_else(|| {
            AppError::domain(
                ErrorCode::ReportExists,
                format!("A report with ID '{}' already exists", id),
            )
        })
    }

    /// Partial update: only supplied fields are written. Moving the status to
    /// `submitted` stamps `submitted_at` here too.
    pub async fn update(
        pool: &PgPool,
        id: &str,
        responses: Option<Responses>,
        status: Option<ReportStatus>,
    ) -> AppResult<AssessmentReport> {
        let mut qb = QueryBuilder::new("UPDATE assessment_reports SET updated_at = now()");
        if let Some(responses) = responses {
            qb.push(", responses = ");
            qb.push_bind(Json(responses));
        }
        if let Some(status) = status {
            qb.push(", status = ");
            qb.push_bind(status);
            if status == ReportStatus::Submitted {
                qb.push(", submitted_at = now()");
            }
        }
        qb.push(" WHERE report_id = ");
        qb.push_bind(id.to_string());
        qb.push(" AND is_active RETURNING *");

        qb.build_query_as::<AssessmentReport>()
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| not_found(id))
    }

    pub async fn submit(pool: &PgPool, id: &str) -> AppResult<AssessmentReport> {
        sqlx::query_as::<_, AssessmentReport>(
            r#"
            UPDATE assessment_reports
            SET status = 'submitted', submitted_at = now(), updated_at = now()
            WHERE report_id = $1 AND is_active
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| not_found(id))
    }

    pub async fn share(pool: &PgPool, id: &str, shared_by: &str) -> AppResult<AssessmentReport> {
        sqlx::query_as::<_, AssessmentReport>(
            r#"
            UPDATE assessment_reports
            SET shared_with_assessee = TRUE, shared_at = now(), shared_by = $2,
                updated_at = now()
            WHERE report_id = $1 AND is_active
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(shared_by)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| not_found(id))
    }

    pub async fn soft_delete(pool: &PgPool, id: &str) -> AppResult<()> {
        let deleted = sqlx::query(
            r#"
            UPDATE assessment_reports
            SET is_active = FALSE, updated_at = now()
            WHERE report_id = $1 AND is_active
            "#,
        )
        .bind(id)
        .execute(pool)
        .await?;

        if deleted.rows_affected() == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }

    pub async fn list_for_subject(
        pool: &PgPool,
        user_id: &str,
        assessment_id: Option<&str>,
        include_inactive: bool,
    ) -> AppResult<Vec<AssessmentReport>> {
        let mut qb = QueryBuilder::new("SELECT * FROM assessment_reports WHERE user_id = ");
        qb.push_bind(user_id.to_string());
        if let Some(aid) = assessment_id {
            qb.push(" AND assessment_id = ");
            qb.push_bind(aid.to_string());
        }
        if !include_inactive {
            qb.push(" AND is_active");
        }
        qb.push(" ORDER BY report_id");

        let reports = qb
            .build_query_as::<AssessmentReport>()
            .fetch_all(pool)
            .await?;
        Ok(reports)
    }
}
