use axum::{
    routing::{get, put},
    Router,
};

use crate::app_state::AppState;

use super::handlers::{
    create_user, deactivate_user, get_user, list_users, me, update_user_roles,
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(me))
        .route("/users", get(list_users).post(create_user))
        .route("/users/{user_id}", get(get_user).delete(deactivate_user))
        .route("/users/{user_id}/roles", put(update_user_roles))
}
