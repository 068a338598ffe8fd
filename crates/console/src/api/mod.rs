//! Client for the remote school-management API.
//!
//! Every screen of the console is backed by this API; the console itself
//! owns no data. All endpoints live under `{origin}/api/v1/`.
//!
//! # Authentication
//!
//! The API uses bearer tokens issued by `POST /superAdmin/loginSuperAdmin`.
//! [`ApiClient::bearer`] scopes the client to the token stored in the
//! caller's session and attaches `Authorization: Bearer <token>` to every
//! request it sends. A missing token is not an error: the request goes out
//! unauthenticated and the API decides.
//!
//! # Responses
//!
//! Response bodies are parsed into explicit schemas (see [`types`]) at this
//! boundary. A body carrying `"success": false` is an error even when the
//! status code is 2xx.

mod admins;
mod alerts;
mod auth;
mod third_party;
pub mod types;

pub use admins::AdminPayload;
pub use alerts::AlertPayload;
pub use third_party::{ImageUpload, ThirdPartyPayload};
pub use types::*;

use std::sync::Arc;

use reqwest::{Method, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

use crate::config::ApiConfig;

/// Message shown when the API fails without saying why.
pub const FALLBACK_MESSAGE: &str = "Failed to process request";

/// Errors that can occur when interacting with the remote API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure (connection refused, timeout, TLS, ...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API rejected the request or answered `success: false`.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Token missing, expired or rejected.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Response body did not match the expected schema.
    #[error("Parse error: {0}")]
    Parse(String),

    /// An endpoint path could not be joined onto the API root.
    #[error("Invalid endpoint path: {0}")]
    InvalidPath(String),
}

impl ApiError {
    /// Message suitable for a banner or flash in the console.
    ///
    /// Server-provided messages are passed through; transport and parse
    /// failures collapse into generic text.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api { message, .. } | Self::Unauthorized(message) => message.clone(),
            Self::NotFound(_) => "The requested record no longer exists".to_string(),
            Self::Http(_) => "Error connecting to server".to_string(),
            Self::Parse(_) | Self::InvalidPath(_) => FALLBACK_MESSAGE.to_string(),
        }
    }

    /// Whether the API refused the bearer token.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }
}

/// Validate an id before it is spliced into an endpoint path.
///
/// Ids are opaque document ids issued by the API; anything outside
/// `[A-Za-z0-9_-]` would change the path being requested.
pub(crate) fn path_id(id: &str) -> Result<&str, ApiError> {
    let valid = !id.is_empty()
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
    if valid {
        Ok(id)
    } else {
        Err(ApiError::InvalidPath(format!("invalid id: {id:?}")))
    }
}

/// Every API response may carry these two fields next to its payload.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    message: Option<String>,
    #[serde(flatten)]
    body: T,
}

/// Error bodies are `{ "message": "..." }` when the API bothers to explain.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Remote API client.
///
/// Cheap to clone; all clones share one connection pool.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    root: Url,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("dvs-console/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                root: config.root.clone(),
            }),
        })
    }

    /// Root URL every endpoint is resolved against.
    #[must_use]
    pub fn root(&self) -> &Url {
        &self.inner.root
    }

    /// Scope the client to a bearer token.
    ///
    /// Every request issued through the returned handle carries
    /// `Authorization: Bearer <token>` when `token` is `Some`.
    #[must_use]
    pub const fn bearer<'a>(&'a self, token: Option<&'a SecretString>) -> Authorized<'a> {
        Authorized { api: self, token }
    }

    /// Resolve an endpoint path (relative to `/api/v1/`) to an absolute URL.
    fn url(&self, path: &str) -> Result<Url, ApiError> {
        self.inner
            .root
            .join(path.trim_start_matches('/'))
            .map_err(|e| ApiError::InvalidPath(format!("{path}: {e}")))
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("root", &self.inner.root.as_str())
            .finish_non_exhaustive()
    }
}

/// An [`ApiClient`] bound to the bearer token of one console session.
#[derive(Clone, Copy)]
pub struct Authorized<'a> {
    api: &'a ApiClient,
    token: Option<&'a SecretString>,
}

impl std::fmt::Debug for Authorized<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authorized")
            .field("root", &self.api.root().as_str())
            .field("token", &self.token.map(|_| "[REDACTED]"))
            .finish()
    }
}

impl Authorized<'_> {
    /// Build a request for `path`, attaching the bearer token when present.
    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let url = self.api.url(path)?;
        Ok(self.request_url(method, url))
    }

    fn request_url(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.api.inner.client.request(method, url);
        match self.token {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        }
    }

    /// Resolve `path` and append query parameters.
    fn url_with_query(&self, path: &str, query: &[(&str, String)]) -> Result<Url, ApiError> {
        let mut url = self.api.url(path)?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    /// Execute a GET request.
    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let url = self.url_with_query(path, query)?;
        let response = self.request_url(Method::GET, url).send().await?;
        handle_response(response).await
    }

    /// Execute a request with a JSON body.
    pub(crate) async fn send_json<T: DeserializeOwned, B: serde::Serialize + Sync>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self.request(method, path)?.json(body).send().await?;
        handle_response(response).await
    }

    /// Execute a request without a body.
    pub(crate) async fn send_empty<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
    ) -> Result<T, ApiError> {
        let response = self.request(method, path)?.send().await?;
        handle_response(response).await
    }

    /// Execute a POST with a `multipart/form-data` body.
    ///
    /// `reqwest` writes the `Content-Type` header including the boundary.
    pub(crate) async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<T, ApiError> {
        let response = self
            .request(Method::POST, path)?
            .multipart(form)
            .send()
            .await?;
        handle_response(response).await
    }
}

/// Handle API response: map error statuses and unwrap the envelope.
async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let status = response.status();

    if !status.is_success() {
        return Err(parse_error(response).await);
    }

    let text = response.text().await?;
    // 204 and empty 200s still have to satisfy `T` (usually `Ignored`).
    let text = if text.trim().is_empty() { "{}" } else { &text };

    let envelope: Envelope<T> = serde_json::from_str(text)
        .map_err(|e| ApiError::Parse(format!("Failed to parse response: {e}")))?;

    if envelope.success == Some(false) {
        return Err(ApiError::Api {
            status: status.as_u16(),
            message: envelope
                .message
                .unwrap_or_else(|| FALLBACK_MESSAGE.to_string()),
        });
    }

    Ok(envelope.body)
}

/// Parse an error response from the API.
async fn parse_error(response: reqwest::Response) -> ApiError {
    let status = response.status().as_u16();

    let message = response
        .text()
        .await
        .ok()
        .and_then(|text| serde_json::from_str::<ErrorBody>(&text).ok())
        .and_then(|body| body.message.or(body.error))
        .filter(|m| !m.trim().is_empty());

    match status {
        401 | 403 => ApiError::Unauthorized(
            message.unwrap_or_else(|| "Not authorized".to_string()),
        ),
        404 => ApiError::NotFound(message.unwrap_or_else(|| "Resource not found".to_string())),
        _ => ApiError::Api {
            status,
            message: message.unwrap_or_else(|| FALLBACK_MESSAGE.to_string()),
        },
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client() -> ApiClient {
        ApiClient::new(&ApiConfig::from_origin("http://127.0.0.1:4000").unwrap()).unwrap()
    }

    #[test]
    fn test_url_joins_under_api_root() {
        let api = client();
        assert_eq!(
            api.url("/superAdmin/getAdmin/a1").unwrap().as_str(),
            "http://127.0.0.1:4000/api/v1/superAdmin/getAdmin/a1"
        );
        assert_eq!(
            api.url("alerts").unwrap().as_str(),
            "http://127.0.0.1:4000/api/v1/alerts"
        );
    }

    #[test]
    fn test_path_id_rejects_traversal() {
        assert_eq!(path_id("64f0c2ab").unwrap(), "64f0c2ab");
        assert!(path_id("").is_err());
        assert!(path_id("../alerts").is_err());
        assert!(path_id("a?b=c").is_err());
    }

    #[test]
    fn test_query_is_encoded() {
        let api = client();
        let url = api
            .bearer(None)
            .url_with_query("alerts", &[("isGlobal", "true".to_string())])
            .unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:4000/api/v1/alerts?isGlobal=true");
    }

    #[test]
    fn test_bearer_attaches_token() {
        let api = client();
        let token = SecretString::from("t1");
        let request = api
            .bearer(Some(&token))
            .request(Method::GET, "alerts")
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(
            request.headers().get("authorization").unwrap(),
            "Bearer t1"
        );
    }

    #[test]
    fn test_missing_token_sends_no_authorization() {
        let api = client();
        let request = api
            .bearer(None)
            .request(Method::GET, "alerts")
            .unwrap()
            .build()
            .unwrap();
        assert!(request.headers().get("authorization").is_none());
    }

    #[test]
    fn test_debug_redacts_token() {
        let api = client();
        let token = SecretString::from("very-secret-token");
        let debug = format!("{:?}", api.bearer(Some(&token)));
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("very-secret-token"));
    }

    #[test]
    fn test_user_message_passes_server_text_through() {
        let err = ApiError::Api {
            status: 409,
            message: "Email already registered".to_string(),
        };
        assert_eq!(err.user_message(), "Email already registered");
        assert_eq!(
            ApiError::Parse("bad".to_string()).user_message(),
            FALLBACK_MESSAGE
        );
    }

    #[test]
    fn test_envelope_flattens_payload() {
        #[derive(Deserialize)]
        struct Body {
            token: String,
        }
        let env: Envelope<Body> =
            serde_json::from_str(r#"{"success":true,"message":"ok","token":"t1"}"#).unwrap();
        assert_eq!(env.success, Some(true));
        assert_eq!(env.body.token, "t1");
    }
}
