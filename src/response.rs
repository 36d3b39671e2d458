//! Canonical success envelope: `{"success": true, "data": ...}`. Errors use
//! the matching failure envelope built in `error.rs`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;

pub fn ok<T: Serialize>(data: T) -> Response {
    envelope(StatusCode::OK, data)
}

pub fn created<T: Serialize>(data: T) -> Response {
    envelope(StatusCode::CREATED, data)
}

pub fn no_content() -> Response {
    StatusCode::NO_CONTENT.into_response()
}

fn envelope<T: Serialize>(status: StatusCode, data: T) -> Response {
    (status, Json(json!({ "success": true, "data": data }))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn success_envelope_wraps_data() {
        let response = ok(serde_json::json!({"teamId": "eng"}));
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), 4096).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["data"]["teamId"], "eng");
    }

    #[test]
    fn no_content_is_empty_204() {
        let response = no_content();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }
}
