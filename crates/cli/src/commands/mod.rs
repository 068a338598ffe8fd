//! Command implementations.
//!
//! Every command signs in as a super admin first. The email comes from the
//! command line and the password from `DVS_PASSWORD`.
//!
//! # Environment Variables
//!
//! - `DVS_PASSWORD` - Password of the super admin named by `--email`

pub mod alerts;
pub mod export;

use std::io::Write;
use std::path::Path;

use dvs_console::api::{ApiClient, ApiError, Authorized};
use dvs_console::config::{ConfigError, ConsoleConfig};
use dvs_core::{Email, EmailError, SuperAdminId};
use secrecy::SecretString;
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The remote API failed or refused the request.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Pages are numbered from 1.
    #[error("Invalid page: {0}. Pages start at 1")]
    InvalidPage(usize),

    /// Writing the output failed.
    #[error("Output error: {0}")]
    Io(#[from] std::io::Error),
}

/// A signed-in super admin.
pub struct Session {
    api: ApiClient,
    token: SecretString,
    owner: SuperAdminId,
}

impl Session {
    /// Sign in as `email` with the password from `DVS_PASSWORD`.
    ///
    /// # Errors
    ///
    /// Returns `CliError` if the password is unset, the email is malformed
    /// or the API rejects the credentials.
    pub async fn login(email: &str) -> Result<Self, CliError> {
        dotenvy::dotenv().ok();

        let email = Email::parse(email)?;
        let password = password_from(std::env::var("DVS_PASSWORD").ok())?;

        let config = ConsoleConfig::from_env()?;
        let api = ApiClient::new(&config.api)?;
        let login = api.login(&email, &password).await?;

        tracing::info!(api_root = %api.root(), "Signed in");
        Ok(Self {
            api,
            token: login.token,
            owner: login.super_admin.super_admin_id,
        })
    }

    /// API handle carrying this session's bearer token.
    #[must_use]
    pub const fn api(&self) -> Authorized<'_> {
        self.api.bearer(Some(&self.token))
    }

    /// Id that owns the admins and third-party users listed.
    #[must_use]
    pub const fn owner(&self) -> &SuperAdminId {
        &self.owner
    }
}

/// Treat an unset or empty `DVS_PASSWORD` as missing.
fn password_from(value: Option<String>) -> Result<SecretString, CliError> {
    value
        .filter(|v| !v.is_empty())
        .map(SecretString::from)
        .ok_or(CliError::MissingEnvVar("DVS_PASSWORD"))
}

/// Convert a 1-based `--page` into the API's 0-based index.
///
/// # Errors
///
/// Returns `CliError::InvalidPage` for page 0.
pub fn page_index(page: usize) -> Result<usize, CliError> {
    page.checked_sub(1).ok_or(CliError::InvalidPage(page))
}

/// Write `body` to `path`, or to stdout when no path is given.
///
/// # Errors
///
/// Returns `CliError::Io` if the write fails.
pub fn write_output(path: Option<&Path>, body: &str) -> Result<(), CliError> {
    match path {
        Some(path) => {
            std::fs::write(path, body)?;
            tracing::info!(path = %path.display(), bytes = body.len(), "Wrote output");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(body.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}
