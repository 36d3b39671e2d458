use axum::{
    routing::{get, patch},
    Router,
};

use crate::app_state::AppState;

use super::handlers::{get_plan, list_plans, toggle_plan_status, upsert_plan};

pub fn plan_routes() -> Router<AppState> {
    Router::new()
        .route("/teams/{team_id}/plans", get(list_plans))
        .route(
            "/teams/{team_id}/plans/{season}",
            get(get_plan).put(upsert_plan),
        )
        .route(
            "/teams/{team_id}/plans/{season}/status",
            patch(toggle_plan_status),
        )
}
