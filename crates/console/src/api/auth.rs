//! Super admin login.

use dvs_core::Email;
use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use super::{ApiClient, ApiError, LoginResponse};

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

impl ApiClient {
    /// Exchange credentials for a bearer token.
    ///
    /// A response whose profile carries no usable super admin id is
    /// rejected: every list endpoint is keyed by that id.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure, rejected credentials or a
    /// malformed response.
    #[tracing::instrument(skip(self, password), fields(email = %email))]
    pub async fn login(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<LoginResponse, ApiError> {
        let body = LoginRequest {
            email: email.as_str(),
            password: password.expose_secret(),
        };
        let response: LoginResponse = self
            .bearer(None)
            .send_json(Method::POST, "superAdmin/loginSuperAdmin", &body)
            .await?;

        if response.super_admin.super_admin_id.is_empty() {
            return Err(ApiError::Parse(
                "login response has no superAdminId".to_string(),
            ));
        }

        tracing::info!(super_admin_id = %response.super_admin.super_admin_id, "Super admin logged in");
        Ok(response)
    }
}
