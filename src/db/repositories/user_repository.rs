use sqlx::types::Json;
use sqlx::{PgPool, QueryBuilder};

use crate::db::models::{Role, User, UserStatusFilter};
use crate::error::{AppError, AppResult, ErrorCode};

pub struct UserRepository;

impl UserRepository {
    /// Conditional insert; an existing row (active or not) makes this fail
    /// with `USER_EXISTS`.
    pub async fn create(
        pool: &PgPool,
        user_id: &str,
        name: &str,
        roles: Vec<Role>,
        team: Option<&str>,
        created_by: &str,
    ) -> AppResult<User> {
        let inserted = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (user_id, name, roles, team, created_by)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(name)
        .bind(Json(roles))
        .bind(team)
        .bind(created_by)
        .fetch_optional(pool)
        .await?;

        inserted.ok_or_else(|| {
            AppError::domain(
                ErrorCode::UserExists,
                format!("A user with ID '{}' already exists", user_id),
            )
        })
    }

    /// First-sign-in provisioning: returns the existing row or creates a
    /// plain-user one. The conditional insert makes concurrent first requests
    /// converge on a single row.
    pub async fn ensure_exists(pool: &PgPool, user_id: &str, name: &str) -> AppResult<User> {
        let inserted = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (user_id, name, roles, created_by)
            VALUES ($1, $2, '[]'::jsonb, $1)
            ON CONFLICT (user_id) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(name)
        .fetch_optional(pool)
        .await?;

        match inserted {
            Some(user) => Ok(user),
            None => Self::require(pool, user_id).await,
        }
    }

    pub async fn get(pool: &PgPool, user_id: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(pool)
            .await?;
        Ok(user)
    }

    pub async fn require(pool: &PgPool, user_id: &str) -> AppResult<User> {
        Self::get(pool, user_id).await?.ok_or_else(|| {
            AppError::domain(
                ErrorCode::UserNotFound,
                format!("No user with ID '{}'", user_id),
            )
        })
    }

    /// Keyset-paginated listing. Fetches `limit + 1` rows so the caller can
    /// tell whether another page exists.
    pub async fn list(
        pool: &PgPool,
        search: Option<&str>,
        status: UserStatusFilter,
        after: Option<&str>,
        limit: i64,
    ) -> AppResult<Vec<User>> {
        let mut qb = QueryBuilder::new("SELECT * FROM users WHERE TRUE");
        match status {
            UserStatusFilter::Active => {
                qb.push(" AND is_active");
            }
            UserStatusFilter::Inactive => {
                qb.push(" AND NOT is_active");
            }
            UserStatusFilter::All => {}
        }
        if let Some(needle) = search {
            let pattern = format!("%{}%", needle);
            qb.push(" AND (name ILIKE ");
            qb.push_bind(pattern.clone());
            qb.push(" OR user_id ILIKE ");
            qb.push_bind(pattern);
            qb.push(")");
        }
        if let Some(last) = after {
            qb.push(" AND user_id > ");
            qb.push_bind(last.to_string());
        }
        qb.push(" ORDER BY user_id LIMIT ");
        qb.push_bind(limit + 1);

        let users = qb.build_query_as::<User>().fetch_all(pool).await?;
        Ok(users)
    }

    pub async fn update_roles(
        pool: &PgPool,
        user_id: &str,
        roles: Vec<Role>,
        updated_by: &str,
    ) -> AppResult<User> {
        let updated = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET roles = $2, updated_at = now(), updated_by = $3
            WHERE user_id = $1
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(Json(roles))
        .bind(updated_by)
        .fetch_optional(pool)
        .await?;

        updated.ok_or_else(|| {
            AppError::domain(
                ErrorCode::UserNotFound,
                format!("No user with ID '{}'", user_id),
            )
        })
    }

    /// Deactivation flow. The self-deactivation guard runs before any lookup,
    /// so it fires regardless of the target's state. The final UPDATE is
    /// conditioned on `is_active` so a concurrent deactivation surfaces as
    /// `ALREADY_INACTIVE` rather than a silent double-write.
    pub async fn deactivate(pool: &PgPool, user_id: &str, caller_id: &str) -> AppResult<User> {
        if user_id == caller_id {
            return Err(AppError::domain(
                ErrorCode::SelfDeactivation,
                "You cannot deactivate your own account",
            ));
        }

        let user = Self::require(pool, user_id).await?;
        if !user.is_active {
            return Err(AppError::domain(
                ErrorCode::AlreadyInactive,
                format!("User '{}' is already inactive", user_id),
            ));
        }

        let managed = Self::managed_team_ids(pool, user_id).await?;
        if !managed.is_empty() {
            return Err(AppError::domain(
                ErrorCode::UserIsManager,
                format!(
                    "User '{}' manages team(s) {}; reassign them first",
                    user_id,
                    managed.join(", ")
                ),
            ));
        }

        let updated = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET is_active = FALSE, updated_at = now(), updated_by = $2
            WHERE user_id = $1 AND is_active
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(caller_id)
        .fetch_optional(pool)
        .await?;

        updated.ok_or_else(|| {
            AppError::domain(
                ErrorCode::AlreadyInactive,
                format!("User '{}' is already inactive", user_id),
            )
        })
    }

    /// Active teams currently managed by this user, via the manager index.
    pub async fn managed_team_ids(pool: &PgPool, user_id: &str) -> AppResult<Vec<String>> {
        let ids = sqlx::query_scalar::<_, String>(
            "SELECT team_id FROM teams WHERE manager_id = $1 AND is_active ORDER BY team_id",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;
        Ok(ids)
    }
}
