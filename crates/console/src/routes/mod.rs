//! HTTP route handlers for the console.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                              - Health check
//!
//! # Auth
//! GET  /login                               - Login page
//! POST /login                               - Exchange credentials for a session
//! POST /logout                              - Clear the session
//!
//! # Dashboard
//! GET  /dashboard                           - Identity, counts, distribution
//! POST /dashboard/message                   - "Send a message" form
//!
//! # Admins
//! GET  /dashboard/superadmin                - List (?modal=create opens the form)
//! POST /dashboard/superadmin                - Create
//! GET  /dashboard/superadmin/{id}/edit      - Edit form
//! POST /dashboard/superadmin/{id}           - Update
//! POST /dashboard/superadmin/bulk           - Bulk activate/deactivate/delete
//! GET  /dashboard/superadmin/export.csv     - CSV export
//!
//! # Third-party users
//! GET  /dashboard/thirdparty                - List (?modal=create opens the form)
//! POST /dashboard/thirdparty                - Create (multipart)
//! POST /dashboard/thirdparty/bulk           - Bulk activate/deactivate/delete
//! GET  /dashboard/thirdparty/export.csv     - CSV export
//!
//! # Global alerts
//! GET  /dashboard/alerts                    - List (?modal=create opens the form)
//! POST /dashboard/alerts                    - Create and broadcast
//! GET  /dashboard/alerts/{id}/edit          - Edit form
//! POST /dashboard/alerts/{id}               - Update
//! GET  /dashboard/alerts/{id}/toggle        - Confirm toggle
//! POST /dashboard/alerts/{id}/toggle        - Toggle active state
//! GET  /dashboard/alerts/{id}/delete        - Confirm delete
//! POST /dashboard/alerts/{id}/delete        - Delete
//! POST /dashboard/alerts/{id}/broadcast     - Broadcast again
//! ```
//!
//! Anything else redirects to `/login`.

use axum::{Router, response::Redirect, routing::get};

use crate::state::AppState;

pub mod admins;
pub mod alerts;
pub mod auth;
pub mod dashboard;
pub mod third_party;
pub mod views;

/// Build the complete router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .merge(auth::router())
        .merge(dashboard::router())
        .merge(admins::router())
        .merge(third_party::router())
        .merge(alerts::router())
        .fallback(fallback)
}

/// Liveness health check. Does not check the remote API.
async fn health() -> &'static str {
    "ok"
}

async fn fallback() -> Redirect {
    Redirect::to("/login")
}
