//! Authentication extractors for the console.
//!
//! Every page under `/dashboard` takes [`RequireSuperAdmin`], which resolves
//! the session into a [`SessionContext`] or redirects to the login page.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use tower_sessions::Session;

use super::session::SessionStore;
use crate::models::SessionContext;

/// Extractor that requires a live super admin session.
///
/// A missing session redirects to `/login`. An expired or unreadable
/// session is cleared first, then redirected.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireSuperAdmin(ctx): RequireSuperAdmin,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", ctx.user.display_name())
/// }
/// ```
pub struct RequireSuperAdmin(pub SessionContext);

/// Error returned when a super admin session is required.
#[derive(Debug)]
pub enum SuperAdminRejection {
    /// Redirect to login page.
    RedirectToLogin,
    /// The session layer is not installed.
    MissingSessionLayer,
}

impl IntoResponse for SuperAdminRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/login").into_response(),
            Self::MissingSessionLayer => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Session layer missing").into_response()
            }
        }
    }
}

impl<S> FromRequestParts<S> for RequireSuperAdmin
where
    S: Send + Sync,
{
    type Rejection = SuperAdminRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or(SuperAdminRejection::MissingSessionLayer)?;
        let store = SessionStore::new(session);

        match store.context().await {
            Ok(Some(ctx)) if !ctx.is_expired_at(Utc::now()) => Ok(Self(ctx)),
            Ok(Some(ctx)) => {
                tracing::info!(super_admin_id = %ctx.super_admin_id(), "Session expired");
                clear_quietly(&store).await;
                Err(SuperAdminRejection::RedirectToLogin)
            }
            Ok(None) => Err(SuperAdminRejection::RedirectToLogin),
            Err(e) => {
                tracing::warn!(error = %e, "Discarding unreadable session");
                clear_quietly(&store).await;
                Err(SuperAdminRejection::RedirectToLogin)
            }
        }
    }
}

/// Extractor that reports whether a live session exists, without rejecting.
///
/// Used by the login page to bounce signed-in operators to the dashboard.
pub struct OptionalSuperAdmin(pub Option<SessionContext>);

impl<S> FromRequestParts<S> for OptionalSuperAdmin
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(session) = parts.extensions.get::<Session>().cloned() else {
            return Ok(Self(None));
        };
        let ctx = SessionStore::new(session)
            .context()
            .await
            .ok()
            .flatten()
            .filter(|ctx| !ctx.is_expired_at(Utc::now()));
        Ok(Self(ctx))
    }
}

async fn clear_quietly(store: &SessionStore) {
    if let Err(e) = store.clear().await {
        tracing::error!(error = %e, "Failed to clear session");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::{Router, body::Body, extract::Path, http::Request, routing::get};
    use chrono::TimeDelta;
    use secrecy::SecretString;
    use tower::ServiceExt;

    use crate::api::{LoginResponse, SuperAdminProfile};
    use crate::config::ConsoleConfig;
    use crate::middleware::session::create_session_layer;
    use dvs_core::SuperAdminId;

    async fn seed(store: SessionStore, Path(minutes_ago): Path<i64>) -> &'static str {
        let login = LoginResponse {
            token: SecretString::from("t1"),
            super_admin: SuperAdminProfile {
                super_admin_id: SuperAdminId::new("s1"),
                name: Some("Root".to_string()),
                email: None,
            },
        };
        store
            .begin(&login, Utc::now() - TimeDelta::minutes(minutes_ago))
            .await
            .unwrap();
        "seeded"
    }

    async fn corrupt(store: SessionStore) -> &'static str {
        store.set("user", &"not a profile").await.unwrap();
        store.set("token", &"t1").await.unwrap();
        store.set("login_time", &Utc::now()).await.unwrap();
        "corrupted"
    }

    async fn protected(RequireSuperAdmin(ctx): RequireSuperAdmin) -> String {
        ctx.user.display_name().to_string()
    }

    fn app() -> Router {
        let config = ConsoleConfig::for_api_origin("http://127.0.0.1:1").unwrap();
        Router::new()
            .route("/seed/{minutes_ago}", get(seed))
            .route("/corrupt", get(corrupt))
            .route("/dashboard", get(protected))
            .layer(create_session_layer(&config))
    }

    async fn visit(app: &Router, path: &str, cookie: Option<&str>) -> Response {
        let mut request = Request::builder().uri(path);
        if let Some(cookie) = cookie {
            request = request.header("cookie", cookie);
        }
        app.clone()
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    fn session_cookie(response: &Response) -> String {
        let header = response
            .headers()
            .get("set-cookie")
            .unwrap()
            .to_str()
            .unwrap();
        header.split(';').next().unwrap().to_string()
    }

    fn location(response: &Response) -> &str {
        response.headers().get("location").unwrap().to_str().unwrap()
    }

    #[tokio::test]
    async fn test_no_session_redirects_to_login() {
        let app = app();
        let response = visit(&app, "/dashboard", None).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/login");
    }

    #[tokio::test]
    async fn test_fresh_session_renders() {
        let app = app();
        let seeded = visit(&app, "/seed/30", None).await;
        let cookie = session_cookie(&seeded);

        let response = visit(&app, "/dashboard", Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_expired_session_is_cleared_and_redirected() {
        let app = app();
        let seeded = visit(&app, "/seed/121", None).await;
        let cookie = session_cookie(&seeded);

        let response = visit(&app, "/dashboard", Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/login");

        // The session was flushed, so the same cookie stays signed out.
        let again = visit(&app, "/dashboard", Some(&cookie)).await;
        assert_eq!(again.status(), StatusCode::SEE_OTHER);
    }

    #[tokio::test]
    async fn test_corrupt_session_is_cleared_and_redirected() {
        let app = app();
        let seeded = visit(&app, "/corrupt", None).await;
        let cookie = session_cookie(&seeded);

        let response = visit(&app, "/dashboard", Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/login");
    }
}
