//! Principal extraction and role guards. Token verification happens upstream
//! (JWKS verifier at the edge); by the time a request reaches this service the
//! verified claims arrive as trusted headers.

use axum::{
    extract::{FromRequestParts, Request},
    http::{request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::error::AppError;

pub const EMAIL_HEADER: &str = "x-auth-email";
pub const NAME_HEADER: &str = "x-auth-name";
pub const GROUPS_HEADER: &str = "x-auth-groups";

/// The authenticated caller, as asserted by the upstream verifier.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub email: String,
    pub name: String,
    pub groups: Vec<String>,
}

impl AuthContext {
    pub fn is_admin(&self) -> bool {
        self.groups.iter().any(|g| g == "admin")
    }

    pub fn is_manager(&self) -> bool {
        self.groups.iter().any(|g| g == "manager")
    }

    pub fn assert_admin(&self) -> Result<(), AppError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Authorization(format!(
                "'{}' lacks the admin role",
                self.email
            )))
        }
    }

    pub fn assert_manager_or_admin(&self) -> Result<(), AppError> {
        if self.is_admin() || self.is_manager() {
            Ok(())
        } else {
            Err(AppError::Authorization(format!(
                "'{}' lacks the manager or admin role",
                self.email
            )))
        }
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok()).filter(|s| !s.is_empty())
}

/// Materializes the [`AuthContext`] from the verifier headers; requests
/// without a principal are rejected before any handler runs.
pub async fn authenticate(mut request: Request, next: Next) -> Result<Response, AppError> {
    let headers = request.headers();
    let email = header_str(headers, EMAIL_HEADER)
        .ok_or_else(|| AppError::Authentication("missing authenticated principal".into()))?
        .to_string();
    let name = header_str(headers, NAME_HEADER)
        .map(str::to_string)
        .unwrap_or_else(|| email.clone());
    let groups = header_str(headers, GROUPS_HEADER)
        .map(|raw| {
            raw.split(',')
                .map(|g| g.trim().to_string())
                .filter(|g| !g.is_empty())
                .collect()
        })
        .unwrap_or_default();

    request
        .extensions_mut()
        .insert(AuthContext { email, name, groups });
    Ok(next.run(request).await)
}

impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .ok_or_else(|| AppError::Authentication("missing authenticated principal".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::StatusCode, middleware, routing::get, Router};
    use tower::ServiceExt;

    async fn whoami(ctx: AuthContext) -> String {
        format!("{}:{}", ctx.email, ctx.is_admin())
    }

    fn app() -> Router {
        Router::new()
            .route("/whoami", get(whoami))
            .route_layer(middleware::from_fn(authenticate))
    }

    fn guarded_app() -> Router {
        async fn admin_only(ctx: AuthContext) -> Result<&'static str, AppError> {
            ctx.assert_admin()?;
            Ok("ok")
        }
        Router::new()
            .route("/admin", get(admin_only))
            .route_layer(middleware::from_fn(authenticate))
    }

    fn ctx_with(groups: &[&str]) -> AuthContext {
        AuthContext {
            email: "x@example.com".into(),
            name: "X".into(),
            groups: groups.iter().map(|g| g.to_string()).collect(),
        }
    }

    #[test]
    fn manager_guard_accepts_either_elevated_role() {
        assert!(ctx_with(&["manager"]).assert_manager_or_admin().is_ok());
        assert!(ctx_with(&["admin"]).assert_manager_or_admin().is_ok());
        assert!(ctx_with(&[]).assert_manager_or_admin().is_err());
        assert!(ctx_with(&["manager"]).assert_admin().is_err());
    }

    #[tokio::test]
    async fn missing_principal_is_401() {
        let response = app()
            .oneshot(
                axum::http::Request::builder()
                    .uri("/whoami")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn principal_headers_populate_context() {
        let response = app()
            .oneshot(
                axum::http::Request::builder()
                    .uri("/whoami")
                    .header(EMAIL_HEADER, "ada@example.com")
                    .header(GROUPS_HEADER, "admin, manager")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], b"ada@example.com:true");
    }

    #[tokio::test]
    async fn non_admin_is_403_on_guarded_route() {
        let response = guarded_app()
            .oneshot(
                axum::http::Request::builder()
                    .uri("/admin")
                    .header(EMAIL_HEADER, "bob@example.com")
                    .header(GROUPS_HEADER, "manager")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn admin_passes_guard() {
        let response = guarded_app()
            .oneshot(
                axum::http::Request::builder()
                    .uri("/admin")
                    .header(EMAIL_HEADER, "root@example.com")
                    .header(GROUPS_HEADER, "admin")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
