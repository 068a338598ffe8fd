//! Console configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `CONSOLE_HOST` - Bind address (default: 127.0.0.1)
//! - `CONSOLE_PORT` - Listen port (default: 3002)
//! - `CONSOLE_BASE_URL` - Public URL of the console (default: `http://localhost:3002`).
//!   An `https://` URL turns on secure session cookies.
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` / `SENTRY_TRACES_SAMPLE_RATE` - Sample rates (default: 1.0)
//!
//! ## Build time
//! - `DVS_API_ENVIRONMENT` - `DEV` or `PROD` (default: `PROD`). Selects the
//!   origin of the remote school-management API. It is read with
//!   `option_env!` when the console is compiled, so a release binary always
//!   talks to the origin it was built for.

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Origin of the development API.
const DEV_ORIGIN: &str = "http://localhost:4000";

/// Origin of the production API.
const PROD_ORIGIN: &str = "https://api.digitalvidyasaarthi.in";

/// Path under the origin where every endpoint lives.
const API_PREFIX: &str = "/api/v1/";

/// Timeout applied to each remote API request.
const DEFAULT_API_TIMEOUT: Duration = Duration::from_secs(30);

/// Build-time environment switch.
const BUILD_API_ENVIRONMENT: Option<&str> = option_env!("DVS_API_ENVIRONMENT");

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Which deployment of the remote API the console targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiEnvironment {
    /// Local API on port 4000.
    Development,
    /// Hosted production API.
    Production,
}

impl ApiEnvironment {
    /// Parse the build-time switch. Unknown values fall back to production,
    /// matching the behaviour of an unset switch.
    #[must_use]
    pub fn from_switch(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("DEV") => Self::Development,
            _ => Self::Production,
        }
    }

    /// The environment this binary was compiled for.
    #[must_use]
    pub fn compiled() -> Self {
        Self::from_switch(BUILD_API_ENVIRONMENT)
    }

    /// Origin (scheme + host + port) of the API for this environment.
    #[must_use]
    pub const fn origin(self) -> &'static str {
        match self {
            Self::Development => DEV_ORIGIN,
            Self::Production => PROD_ORIGIN,
        }
    }
}

/// Remote API configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Root every endpoint path is joined onto, always ending in `/api/v1/`.
    pub root: Url,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl ApiConfig {
    /// Configuration for one of the known environments.
    ///
    /// # Errors
    ///
    /// Returns an error if the built-in origin cannot be parsed (never
    /// happens for the compiled-in constants).
    pub fn for_environment(environment: ApiEnvironment) -> Result<Self, ConfigError> {
        Self::from_origin(environment.origin())
    }

    /// Configuration rooted at an arbitrary origin (used by tests and the
    /// mock API).
    ///
    /// # Errors
    ///
    /// Returns an error if `origin` is not an absolute URL.
    pub fn from_origin(origin: &str) -> Result<Self, ConfigError> {
        let origin = origin.trim_end_matches('/');
        let root = Url::parse(&format!("{origin}{API_PREFIX}")).map_err(|e| {
            ConfigError::InvalidEnvVar("DVS_API_ENVIRONMENT".to_string(), e.to_string())
        })?;
        Ok(Self {
            root,
            timeout: DEFAULT_API_TIMEOUT,
        })
    }
}

/// Console application configuration.
#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the console
    pub base_url: String,
    /// Remote API configuration
    pub api: ApiConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

impl ConsoleConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("CONSOLE_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("CONSOLE_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("CONSOLE_PORT", "3002")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("CONSOLE_PORT".to_string(), e.to_string()))?;
        let base_url = get_env_or_default("CONSOLE_BASE_URL", "http://localhost:3002");
        Url::parse(&base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("CONSOLE_BASE_URL".to_string(), e.to_string())
        })?;

        let api = ApiConfig::for_environment(ApiEnvironment::compiled())?;

        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_optional_env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = get_optional_env("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);

        Ok(Self {
            host,
            port,
            base_url,
            api,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Configuration for tests: loopback bind, plain HTTP, API at `api_origin`.
    ///
    /// # Errors
    ///
    /// Returns an error if `api_origin` is not an absolute URL.
    pub fn for_api_origin(api_origin: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 0,
            base_url: "http://localhost".to_string(),
            api: ApiConfig::from_origin(api_origin)?,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 1.0,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the console is served over HTTPS (secure cookies).
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}
