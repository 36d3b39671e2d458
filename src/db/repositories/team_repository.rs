use sqlx::{PgPool, QueryBuilder};

use crate::db::models::{Role, Team, TeamStatusFilter, TeamSummary, User};
use crate::error::{AppError, AppResult, ErrorCode};

pub struct TeamRepository;

impl TeamRepository {
    pub async fn create(
        pool: &PgPool,
        team_id: &str,
        name: &str,
        created_by: &str,
    ) -> AppResult<Team> {
        let inserted = sqlx::query_as::<_, Team>(
            r#"
            INSERT INTO teams (team_id, name, created_by)
            VALUES ($1, $2, $3)
            ON CONFLICT (team_id) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(team_id)
        .bind(name)
        .bind(created_by)
        .fetch_optional(pool)
        .await?;

        inserted.ok_or_else(|| {
            AppError::domain(
                ErrorCode::TeamExists,
                format!("A team with ID '{}' already exists", team_id),
            )
        })
    }

    /// Archived teams are indistinguishable from absent ones here; only the
    /// explicit archived/all listing reaches them.
    pub async fn get_active(pool: &PgPool, team_id: &str) -> AppResult<Option<Team>> {
        let team =
            sqlx::query_as::<_, Team>("SELECT * FROM teams WHERE team_id = $1 AND is_active")
                .bind(team_id)
                .fetch_optional(pool)
                .await?;
        Ok(team)
    }

    pub async fn require_active(pool: &PgPool, team_id: &str) -> AppResult<Team> {
        Self::get_active(pool, team_id).await?.ok_or_else(|| {
            AppError::domain(
                ErrorCode::TeamNotFound,
                format!("No team with ID '{}'", team_id),
            )
        })
    }

    /// Enriched list rows: manager display name joined in, member headcount
    /// computed per team.
    pub async fn list(
        pool: &PgPool,
        search: Option<&str>,
        status: TeamStatusFilter,
        manager_id: Option<&str>,
    ) -> AppResult<Vec<TeamSummary>> {
        let mut qb = QueryBuilder::new(
            r#"
            SELECT t.team_id, t.name, t.manager_id, m.name AS manager_name,
                   (SELECT count(*) FROM users u
                     WHERE u.team = t.team_id AND u.is_active) AS member_count,
                   t.is_active, t.created_at, t.updated_at
            FROM teams t
            LEFT JOIN users m ON m.user_id = t.manager_id
            WHERE TRUE
            "#,
        );
        match status {
            TeamStatusFilter::Active => {
                qb.push(" AND t.is_active");
            }
            TeamStatusFilter::Archived => {
                qb.push(" AND NOT t.is_active");
            }
            TeamStatusFilter::All => {}
        }
        if let Some(needle) = search {
            let pattern = format!("%{}%", needle);
            qb.push(" AND (t.name ILIKE ");
            qb.push_bind(pattern.clone());
            qb.push(" OR t.team_id ILIKE ");
            qb.push_bind(pattern);
            qb.push(")");
        }
        if let Some(mid) = manager_id {
            qb.push(" AND t.manager_id = ");
            qb.push_bind(mid.to_string());
        }
        qb.push(" ORDER BY t.team_id");

        let teams = qb.build_query_as::<TeamSummary>().fetch_all(pool).await?;
        Ok(teams)
    }

    pub async fn member_list(pool: &PgPool, team_id: &str) -> AppResult<Vec<User>> {
        Self::require_active(pool, team_id).await?;
        let members = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE team = $1 AND is_active ORDER BY name, user_id",
        )
        .bind(team_id)
        .fetch_all(pool)
        .await?;
        Ok(members)
    }

    /// Assigns (or clears, with `None`) the team's manager. The candidate is
    /// checked up front for precise error kinds, and the UPDATE re-verifies
    /// the candidate in the same statement so a deactivation between check and
    /// write cannot slip through.
    pub async fn update_manager(
        pool: &PgPool,
        team_id: &str,
        manager_id: Option<&str>,
        updated_by: &str,
    ) -> AppResult<Team> {
        Self::require_active(pool, team_id).await?;

        if let Some(mid) = manager_id {
            let candidate = sqlx::query_as::<_, User>("SELECT * FROM users WHERE user_id = $1")
                .bind(mid)
                .fetch_optional(pool)
                .await?
                .ok_or_else(|| {
                    AppError::domain(
                        ErrorCode::ManagerNotFound,
                        format!("No user with ID '{}'", mid),
                    )
                })?;
            if !candidate.has_role(Role::Manager) {
                return Err(AppError::domain(
                    ErrorCode::InvalidManagerRole,
                    format!("User '{}' does not hold the manager role", mid),
                ));
            }
            if !candidate.is_active {
                return Err(AppError::domain(
                    ErrorCode::ManagerDeactivated,
                    format!("User '{}' is deactivated", mid),
                ));
            }
        }

        let updated = sqlx::query_as::<_, Team>(
            r#"
            UPDATE teams
            SET manager_id = $2, updated_at = now(), updated_by = $3
            WHERE team_id = $1 AND is_active
              AND ($2::text IS NULL OR EXISTS (
                    SELECT 1 FROM users u
                    WHERE u.user_id = $2 AND u.is_active
                      AND u.roles @> '["manager"]'::jsonb))
            RETURNING *
            "#,
        )
        .bind(team_id)
        .bind(manager_id)
        .bind(updated_by)
        .fetch_optional(pool)
        .await?;

        // Zero rows after the up-front checks passed means the candidate (or
        // the team) changed state underneath us.
        updated.ok_or_else(|| match manager_id {
            Some(mid) => AppError::domain(
                ErrorCode::ManagerDeactivated,
                format!("User '{}' is no longer an active manager", mid),
            ),
            None => AppError::domain(
                ErrorCode::TeamNotFound,
                format!("No team with ID '{}'", team_id),
            ),
        })
    }

    /// Archives an active team. An already-archived team is indistinguishable
    /// from an absent one here, exactly as on the get/update paths.
    pub async fn archive(pool: &PgPool, team_id: &str, updated_by: &str) -> AppResult<()> {
        let archived = sqlx::query(
            r#"
            UPDATE teams
            SET is_active = FALSE, updated_at = now(), updated_by = $2
            WHERE team_id = $1 AND is_active
            "#,
        )
        .bind(team_id)
        .bind(updated_by)
        .execute(pool)
        .await?;

        Self::archive_outcome(archived.rows_affected(), team_id)
    }

    fn archive_outcome(rows_affected: u64, team_id: &str) -> AppResult<()> {
        if rows_affected == 0 {
            return Err(AppError::domain(
                ErrorCode::TeamNotFound,
                format!("No team with ID '{}'", team_id),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn archiving_an_archived_team_looks_like_a_missing_one() {
        // The conditional UPDATE touches zero rows both for an archived team
        // and for one that never existed; both must surface the same 404 kind.
        let err = TeamRepository::archive_outcome(0, "eng").unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::TeamNotFound));
        assert_eq!(err.code().unwrap().status(), StatusCode::NOT_FOUND);

        let err = TeamRepository::archive_outcome(0, "ghost").unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::TeamNotFound));

        assert!(TeamRepository::archive_outcome(1, "eng").is_ok());
    }
}
