use axum::{
    routing::{get, put},
    Router,
};

use crate::app_state::AppState;

use super::handlers::{
    archive_team, create_team, get_team, list_teams, team_members, update_team_manager,
};

pub fn team_routes() -> Router<AppState> {
    Router::new()
        .route("/teams", get(list_teams).post(create_team))
        .route("/teams/{team_id}", get(get_team).delete(archive_team))
        .route("/teams/{team_id}/manager", put(update_team_manager))
        .route("/teams/{team_id}/members", get(team_members))
}
