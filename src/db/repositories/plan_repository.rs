use sqlx::types::Json;
use sqlx::PgPool;

use crate::db::models::{AssessmentPlan, PlanConfig};
use crate::error::{AppError, AppResult, ErrorCode};

pub struct PlanRepository;

impl PlanRepository {
    pub async fn list_by_team(
        pool: &PgPool,
        team_id: &str,
        include_inactive: bool,
    ) -> AppResult<Vec<AssessmentPlan>> {
        let sql = if include_inactive {
            "SELECT * FROM assessment_plans WHERE team_id = $1 ORDER BY season"
        } else {
            "SELECT * FROM assessment_plans WHERE team_id = $1 AND is_active ORDER BY season"
        };
        let plans = sqlx::query_as::<_, AssessmentPlan>(sql)
            .bind(team_id)
            .fetch_all(pool)
            .await?;
        Ok(plans)
    }

    /// A deactivated plan is indistinguishable from an absent one.
    pub async fn get(pool: &PgPool, team_id: &str, season: &str) -> AppResult<AssessmentPlan> {
        sqlx::query_as::<_, AssessmentPlan>(
            "SELECT * FROM assessment_plans WHERE team_id = $1 AND season = $2 AND is_active",
        )
        .bind(team_id)
        .bind(season)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| {
            AppError::domain(
                ErrorCode::PlanNotFound,
                format!("No plan for team '{}' season '{}'", team_id, season),
            )
        })
    }

    /// Last-writer-wins upsert. `created_at`/`created_by` from the first write
    /// survive every subsequent one; `updated_at` is refreshed on overwrite.
    pub async fn upsert(
        pool: &PgPool,
        team_id: &str,
        season: &str,
        name: &str,
        description: Option<&str>,
        plan_config: PlanConfig,
        is_active: bool,
        actor: &str,
    ) -> AppResult<AssessmentPlan> {
        let plan = sqlx::query_as::<_, AssessmentPlan>(
            r#"
            INSERT INTO assessment_plans
                (team_id, season, name, description, plan_config, is_active, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (team_id, season) DO UPDATE SET
                name = EXCLUDED.name,
                description = EXCLUDED.description,
                plan_config = EXCLUDED.plan_config,
                is_active = EXCLUDED.is_active,
                updated_at = now(),
                updated_by = $7
            RETURNING *
            "#,
        )
        .bind(team_id)
        .bind(season)
        .bind(name)
        .bind(description)
        .bind(Json(plan_config))
        .bind(is_active)
        .bind(actor)
        .fetch_one(pool)
        .await?;
        Ok(plan)
    }

    /// Flips `is_active` in either direction; this is also the only way to
    /// bring a deactivated plan back.
    pub async fn toggle_status(
        pool: &PgPool,
        team_id: &str,
        season: &str,
        actor: &str,
    ) -> AppResult<AssessmentPlan> {
        sqlx::query_as::<_, AssessmentPlan>(
            r#"
            UPDATE assessment_plans
            SET is_active = NOT is_active, updated_at = now(), updated_by = $3
            WHERE team_id = $1 AND season = $2
            RETURNING *
            "#,
        )
        .bind(team_id)
        .bind(season)
        .bind(actor)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| {
            AppError::domain(
                ErrorCode::PlanNotFound,
                format!("No plan for team '{}' season '{}'", team_id, season),
            )
        })
    }
}
