//! Session-related types for super admin authentication.
//!
//! The session holds what the browser-side console used to keep in local
//! storage: the bearer token, the operator profile, the role and the login
//! time. Handlers never read these keys directly; they receive a
//! [`SessionContext`] from the auth extractor.

use chrono::{DateTime, TimeDelta, Utc};
use dvs_core::{ConsoleRole, SuperAdminId};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::api::SuperAdminProfile;

/// Maximum age of a login before the operator must sign in again.
pub const SESSION_MAX_AGE: TimeDelta = TimeDelta::hours(2);

/// Identity of the signed-in operator, resolved once per request.
#[derive(Debug)]
pub struct SessionContext {
    /// Bearer token for the remote API.
    pub token: SecretString,
    /// Operator profile returned at login.
    pub user: SuperAdminProfile,
    /// Console role (always `SuperAdmin` today).
    pub role: ConsoleRole,
    /// When the operator signed in.
    pub login_time: DateTime<Utc>,
}

impl SessionContext {
    /// Whether the login is older than [`SESSION_MAX_AGE`] at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(self.login_time) > SESSION_MAX_AGE
    }

    /// Owner id every list endpoint is keyed by.
    #[must_use]
    pub const fn super_admin_id(&self) -> &SuperAdminId {
        &self.user.super_admin_id
    }
}

/// Severity of a one-shot flash message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashKind {
    Success,
    Warning,
    Error,
}

impl FlashKind {
    /// CSS modifier used by the toast markup.
    #[must_use]
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::Success => "flash-success",
            Self::Warning => "flash-warning",
            Self::Error => "flash-error",
        }
    }
}

/// A message shown once on the next rendered page (post/redirect/get).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub kind: FlashKind,
    pub message: String,
}

impl Flash {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Success,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Warning,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Error,
            message: message.into(),
        }
    }
}

/// Session keys for console authentication data.
pub mod keys {
    /// Bearer token issued by the login endpoint.
    pub const TOKEN: &str = "token";

    /// Serialized [`SuperAdminProfile`](crate::api::SuperAdminProfile).
    pub const USER: &str = "user";

    /// Console role.
    pub const ROLE: &str = "role";

    /// Login timestamp (RFC 3339).
    pub const LOGIN_TIME: &str = "login_time";

    /// Pending one-shot flash messages.
    pub const FLASH: &str = "flash";
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(login_time: DateTime<Utc>) -> SessionContext {
        SessionContext {
            token: SecretString::from("t1"),
            user: SuperAdminProfile {
                super_admin_id: SuperAdminId::new("s1"),
                name: None,
                email: Some("a@b.com".to_string()),
            },
            role: ConsoleRole::SuperAdmin,
            login_time,
        }
    }

    #[test]
    fn test_expiry_boundary() {
        let now = Utc::now();
        assert!(!context(now - TimeDelta::minutes(119)).is_expired_at(now));
        assert!(!context(now - SESSION_MAX_AGE).is_expired_at(now));
        assert!(context(now - TimeDelta::minutes(121)).is_expired_at(now));
    }

    #[test]
    fn test_debug_redacts_token() {
        let debug = format!("{:?}", context(Utc::now()));
        assert!(!debug.contains("\"t1\""));
        assert!(debug.contains("s1"));
    }

    #[test]
    fn test_flash_constructors() {
        assert_eq!(Flash::warning("x").kind, FlashKind::Warning);
        assert_eq!(Flash::error("x").kind.css_class(), "flash-error");
    }
}
