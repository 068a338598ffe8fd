//! Authentication route handlers.
//!
//! Email and password are exchanged for an API token; the token and
//! operator profile are kept in the server-side session.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use chrono::Utc;
use dvs_core::Email;
use secrecy::SecretString;
use serde::Deserialize;
use tracing::instrument;

use super::views::optional_secret;
use crate::error::{AppError, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{OptionalSuperAdmin, SessionStore};
use crate::state::AppState;

/// The only message a failed login ever shows.
pub const INVALID_CREDENTIALS: &str = "Invalid Credentials";

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub email: String,
    pub error: Option<String>,
}

/// Login form body.
#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default, deserialize_with = "optional_secret")]
    pub password: Option<SecretString>,
}

impl std::fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginForm")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Build the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", get(login_page).post(login))
        .route("/logout", post(logout))
}

/// Render the login page, or skip it when already signed in.
///
/// GET /login
async fn login_page(OptionalSuperAdmin(ctx): OptionalSuperAdmin) -> Response {
    if ctx.is_some() {
        return Redirect::to("/dashboard").into_response();
    }
    LoginTemplate {
        email: String::new(),
        error: None,
    }
    .into_response()
}

/// Exchange credentials for a session.
///
/// POST /login
#[instrument(skip(state, store, form), fields(email = %form.email))]
async fn login(
    State(state): State<AppState>,
    store: SessionStore,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let failed = |email: String| {
        (
            StatusCode::UNAUTHORIZED,
            LoginTemplate {
                email,
                error: Some(INVALID_CREDENTIALS.to_string()),
            },
        )
            .into_response()
    };

    let (Ok(email), Some(password)) = (Email::parse(&form.email), form.password.as_ref()) else {
        return Ok(failed(form.email));
    };

    match state.api().login(&email, password).await {
        Ok(login) => {
            store.begin(&login, Utc::now()).await?;
            set_sentry_user(
                login.super_admin.super_admin_id.as_str(),
                login.super_admin.email.as_deref(),
            );
            Ok(Redirect::to("/dashboard").into_response())
        }
        Err(e) => {
            tracing::warn!(error = %e, "Login failed");
            Ok(failed(form.email))
        }
    }
}

/// Clear the session and return to the login page.
///
/// POST /logout
async fn logout(store: SessionStore) -> Result<Redirect, AppError> {
    store.clear().await?;
    clear_sentry_user();
    Ok(Redirect::to("/login"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_form_debug_hides_password() {
        let form = LoginForm {
            email: "a@b.com".to_string(),
            password: Some(SecretString::from("hunter2")),
        };
        let debug = format!("{form:?}");
        assert!(debug.contains("a@b.com"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_login_template_renders_error() {
        let html = LoginTemplate {
            email: "a@b.com".to_string(),
            error: Some(INVALID_CREDENTIALS.to_string()),
        }
        .render()
        .unwrap_or_default();
        assert!(html.contains("Invalid Credentials"));
        assert!(html.contains("value=\"a@b.com\""));
    }
}
