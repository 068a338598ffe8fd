//! Session middleware and typed session access.
//!
//! Sessions live in an in-memory store: the console holds nothing but the
//! API token and operator profile, and a restart simply signs everyone out.

use axum::extract::FromRequestParts;
use axum::http::StatusCode;
use axum::http::request::Parts;
use chrono::{DateTime, Utc};
use dvs_core::ConsoleRole;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tower_sessions::{Expiry, MemoryStore, Session, SessionManagerLayer};

use crate::api::{LoginResponse, SuperAdminProfile};
use crate::config::ConsoleConfig;
use crate::models::{Flash, SESSION_MAX_AGE, SessionContext, session_keys};

/// Session cookie name for the console.
pub const SESSION_COOKIE_NAME: &str = "dvs_console_session";

/// Errors reading or writing session data.
#[derive(Debug, Error)]
pub enum SessionError {
    /// A stored value no longer deserializes.
    #[error("corrupt session value for {key}: {reason}")]
    Corrupt { key: &'static str, reason: String },

    /// The backing store failed.
    #[error("session store error: {0}")]
    Store(#[from] tower_sessions::session::Error),
}

/// Create the session layer with an in-memory store.
#[must_use]
pub fn create_session_layer(config: &ConsoleConfig) -> SessionManagerLayer<MemoryStore> {
    SessionManagerLayer::new(MemoryStore::default())
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_MAX_AGE.num_seconds()),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Strict)
        .with_http_only(true)
        .with_path("/")
}

/// Typed view over the request's [`Session`].
#[derive(Debug, Clone)]
pub struct SessionStore {
    session: Session,
}

impl SessionStore {
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self { session }
    }

    /// Read a value. Malformed data is reported as [`SessionError::Corrupt`].
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the value is malformed or the store fails.
    pub async fn get<T: DeserializeOwned>(
        &self,
        key: &'static str,
    ) -> Result<Option<T>, SessionError> {
        match self.session.get::<T>(key).await {
            Ok(value) => Ok(value),
            Err(tower_sessions::session::Error::SerdeJson(e)) => Err(SessionError::Corrupt {
                key,
                reason: e.to_string(),
            }),
            Err(e) => Err(SessionError::Store(e)),
        }
    }

    /// Write a value.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the store fails.
    pub async fn set<T: Serialize + Sync>(
        &self,
        key: &'static str,
        value: &T,
    ) -> Result<(), SessionError> {
        self.session.insert(key, value).await?;
        Ok(())
    }

    /// Drop every key and invalidate the cookie.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the store fails.
    pub async fn clear(&self) -> Result<(), SessionError> {
        self.session.flush().await?;
        Ok(())
    }

    /// Bearer token, if signed in.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the stored value is malformed.
    pub async fn token(&self) -> Result<Option<SecretString>, SessionError> {
        Ok(self
            .get::<String>(session_keys::TOKEN)
            .await?
            .map(SecretString::from))
    }

    /// Operator profile, if signed in.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the stored value is malformed.
    pub async fn user(&self) -> Result<Option<SuperAdminProfile>, SessionError> {
        self.get(session_keys::USER).await
    }

    /// Stored role, defaulting to `SuperAdmin`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the stored value is malformed.
    pub async fn role(&self) -> Result<ConsoleRole, SessionError> {
        Ok(self
            .get::<ConsoleRole>(session_keys::ROLE)
            .await?
            .unwrap_or_default())
    }

    /// Login time, if signed in.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the stored value is malformed.
    pub async fn login_time(&self) -> Result<Option<DateTime<Utc>>, SessionError> {
        self.get(session_keys::LOGIN_TIME).await
    }

    /// Start an authenticated session.
    ///
    /// The session id is cycled first so a pre-login cookie cannot be
    /// reused after authentication.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the store fails.
    pub async fn begin(&self, login: &LoginResponse, now: DateTime<Utc>) -> Result<(), SessionError> {
        self.session.cycle_id().await?;
        self.set(session_keys::TOKEN, &login.token.expose_secret())
            .await?;
        self.set(session_keys::USER, &login.super_admin).await?;
        self.set(session_keys::ROLE, &ConsoleRole::SuperAdmin).await?;
        self.set(session_keys::LOGIN_TIME, &now).await?;
        Ok(())
    }

    /// Resolve the signed-in identity. `None` when any part is missing.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if a stored value is malformed.
    pub async fn context(&self) -> Result<Option<SessionContext>, SessionError> {
        let (Some(token), Some(user), Some(login_time)) =
            (self.token().await?, self.user().await?, self.login_time().await?)
        else {
            return Ok(None);
        };
        if user.super_admin_id.is_empty() {
            return Err(SessionError::Corrupt {
                key: session_keys::USER,
                reason: "missing superAdminId".to_string(),
            });
        }
        Ok(Some(SessionContext {
            token,
            user,
            role: self.role().await?,
            login_time,
        }))
    }

    /// Queue a flash for the next rendered page.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the store fails.
    pub async fn set_flash(&self, flash: Flash) -> Result<(), SessionError> {
        let mut pending: Vec<Flash> = self
            .get(session_keys::FLASH)
            .await
            .ok()
            .flatten()
            .unwrap_or_default();
        pending.push(flash);
        self.set(session_keys::FLASH, &pending).await
    }

    /// Remove and return every queued flash. Malformed entries are dropped.
    pub async fn take_flash(&self) -> Vec<Flash> {
        match self.session.remove::<Vec<Flash>>(session_keys::FLASH).await {
            Ok(pending) => pending.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(error = %e, "Dropping unreadable flash messages");
                Vec::new()
            }
        }
    }
}

impl<S> FromRequestParts<S> for SessionStore
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Session>()
            .cloned()
            .map(Self::new)
            .ok_or((StatusCode::INTERNAL_SERVER_ERROR, "Session layer missing"))
    }
}
