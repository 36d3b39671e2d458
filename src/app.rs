use axum::{middleware, routing::get, Json, Router};
use serde_json::json;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tower_http::cors::CorsLayer;

use crate::{
    app_state::AppState,
    middleware::auth::authenticate,
    middleware::tracing::observability_middleware,
    modules::{plans::plan_routes, reports::report_routes, teams::team_routes, users::user_routes},
};

pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        .merge(user_routes())
        .merge(team_routes())
        .merge(plan_routes())
        .merge(report_routes())
        .route_layer(middleware::from_fn(authenticate));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api)
        .layer(middleware::from_fn(observability_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health_check(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> Json<serde_json::Value> {
    let db_result = sqlx::query("SELECT 1").execute(&state.db).await;

    let db_status = match db_result {
        Ok(_) => "healthy",
        Err(e) => {
            tracing::info!("Database health check failed: {}", e);
            "unhealthy"
        }
    };

    let timestamp = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default();

    Json(json!({
        "status": "ok",
        "timestamp": timestamp,
        "version": env!("CARGO_PKG_VERSION"),
        "services": {
            "database": db_status,
        }
    }))
}
