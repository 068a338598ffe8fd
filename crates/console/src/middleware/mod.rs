//! HTTP middleware for the console.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, attach request data)
//! 2. `TraceLayer` (request span with status and latency)
//! 3. Session layer (tower-sessions, in-memory store)
//! 4. Security headers on every response (`axum::middleware::from_fn`)
//!
//! Authentication is enforced per handler through the
//! [`RequireSuperAdmin`] extractor rather than a route layer.

pub mod auth;
pub mod security_headers;
pub mod session;

pub use auth::{OptionalSuperAdmin, RequireSuperAdmin, SuperAdminRejection};
pub use security_headers::security_headers_middleware;
pub use session::{SESSION_COOKIE_NAME, SessionError, SessionStore, create_session_layer};
