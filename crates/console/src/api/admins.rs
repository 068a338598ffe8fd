//! School admin endpoints.

use dvs_core::{AccountStatus, AdminId, SuperAdminId};
use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde::{Serialize, Serializer};

use super::{Admin, AdminBody, AdminListBody, ApiError, Authorized, Ignored, Page, path_id};

/// Create/update body for an admin.
///
/// `password` is only serialized when present; on update an absent password
/// leaves the stored one unchanged.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminPayload {
    pub full_name: String,
    pub email: String,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "expose_password"
    )]
    pub password: Option<SecretString>,
    pub address: String,
    pub school_name: String,
    pub contact: String,
    pub fee_message: String,
    pub school_state: String,
    pub school_city: String,
    pub admission_message: String,
    pub registration_message: String,
    pub pincode: String,
    pub super_admin_id: SuperAdminId,
}

#[allow(clippy::ref_option)]
pub(crate) fn expose_password<S: Serializer>(
    password: &Option<SecretString>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match password {
        Some(p) => serializer.serialize_str(p.expose_secret()),
        None => serializer.serialize_none(),
    }
}

#[derive(Serialize)]
pub(crate) struct StatusPayload {
    pub status: AccountStatus,
}

impl Authorized<'_> {
    /// Fetch one page of the admins owned by `owner`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the body is malformed.
    #[tracing::instrument(skip(self), fields(owner = %owner))]
    pub async fn list_admins(
        &self,
        owner: &SuperAdminId,
        page: usize,
    ) -> Result<Page<Admin>, ApiError> {
        let path = format!("superAdmin/getAdmins/{}", path_id(owner.as_str())?);
        let body: AdminListBody = self.get(&path, &[("page", page.to_string())]).await?;
        Ok(Page::normalize(
            body.admins,
            page,
            body.total_admins,
            body.total_pages,
        ))
    }

    /// Fetch a single admin for the edit form.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the API answers without an admin.
    #[tracing::instrument(skip(self), fields(admin_id = %id))]
    pub async fn get_admin(&self, id: &AdminId) -> Result<Admin, ApiError> {
        let path = format!("superAdmin/getAdmin/{}", path_id(id.as_str())?);
        let body: AdminBody = self.get(&path, &[]).await?;
        body.admin
            .ok_or_else(|| ApiError::NotFound(format!("admin {id}")))
    }

    /// Create an admin.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` carrying the server's message on rejection.
    #[tracing::instrument(skip(self, payload), fields(email = %payload.email))]
    pub async fn create_admin(&self, payload: &AdminPayload) -> Result<Option<Admin>, ApiError> {
        let body: AdminBody = self
            .send_json(Method::POST, "superAdmin/createAdmin", payload)
            .await?;
        Ok(body.admin)
    }

    /// Replace an admin's fields.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` carrying the server's message on rejection.
    #[tracing::instrument(skip(self, payload), fields(admin_id = %id))]
    pub async fn update_admin(
        &self,
        id: &AdminId,
        payload: &AdminPayload,
    ) -> Result<Option<Admin>, ApiError> {
        let path = format!("superAdmin/updateAdmin/{}", path_id(id.as_str())?);
        let body: AdminBody = self.send_json(Method::PUT, &path, payload).await?;
        Ok(body.admin)
    }

    /// Activate or deactivate an admin account.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[tracing::instrument(skip(self), fields(admin_id = %id))]
    pub async fn set_admin_status(
        &self,
        id: &AdminId,
        status: AccountStatus,
    ) -> Result<(), ApiError> {
        let path = format!("superAdmin/updateAdminStatus/{}", path_id(id.as_str())?);
        let _: Ignored = self
            .send_json(Method::PATCH, &path, &StatusPayload { status })
            .await?;
        Ok(())
    }

    /// Delete an admin.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[tracing::instrument(skip(self), fields(admin_id = %id))]
    pub async fn delete_admin(&self, id: &AdminId) -> Result<(), ApiError> {
        let path = format!("superAdmin/deleteAdmin/{}", path_id(id.as_str())?);
        let _: Ignored = self.send_empty(Method::DELETE, &path).await?;
        Ok(())
    }
}
