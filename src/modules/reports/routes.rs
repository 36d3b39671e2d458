use axum::{
    routing::{get, post},
    Router,
};

use crate::app_state::AppState;

use super::handlers::{
    create_report, delete_report, get_report, list_reports, share_report, submit_report,
    update_report,
};

pub fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/reports", get(list_reports).post(create_report))
        .route(
            "/reports/{report_id}",
            get(get_report).put(update_report).delete(delete_report),
        )
        .route("/reports/{report_id}/submit", post(submit_report))
        .route("/reports/{report_id}/share", post(share_report))
}
