//! Third-party user endpoints.

use dvs_core::{AccountStatus, SuperAdminId, ThirdPartyId};
use reqwest::Method;
use reqwest::multipart::{Form, Part};
use secrecy::{ExposeSecret, SecretString};

use super::admins::StatusPayload;
use super::{
    ApiError, AssignedSchool, Authorized, Ignored, ThirdPartyListBody, ThirdPartyUser, path_id,
};

/// An uploaded profile image, forwarded as the `image` part.
#[derive(Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageUpload")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Create body for a third-party user.
#[derive(Debug)]
pub struct ThirdPartyPayload {
    pub name: String,
    pub email: String,
    pub password: SecretString,
    pub super_admin_id: SuperAdminId,
    pub assigned_schools: Vec<AssignedSchool>,
    pub image: Option<ImageUpload>,
}

impl ThirdPartyPayload {
    /// Build the multipart form. `assignedSchools` travels as a JSON string.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Parse` if the image content type is not a valid
    /// MIME type.
    pub fn into_form(self) -> Result<Form, ApiError> {
        let schools = serde_json::to_string(&self.assigned_schools)
            .map_err(|e| ApiError::Parse(e.to_string()))?;

        let mut form = Form::new()
            .text("name", self.name)
            .text("email", self.email)
            .text("password", self.password.expose_secret().to_owned())
            .text("superAdminId", self.super_admin_id.into_inner())
            .text("assignedSchools", schools);

        if let Some(image) = self.image {
            let part = Part::bytes(image.bytes)
                .file_name(image.file_name)
                .mime_str(&image.content_type)
                .map_err(|e| ApiError::Parse(format!("image content type: {e}")))?;
            form = form.part("image", part);
        }

        Ok(form)
    }
}

impl Authorized<'_> {
    /// Fetch every third-party user owned by `owner`.
    ///
    /// The endpoint returns the whole list in one response; paging happens
    /// in the console.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the body is malformed.
    #[tracing::instrument(skip(self), fields(owner = %owner))]
    pub async fn list_third_party(
        &self,
        owner: &SuperAdminId,
    ) -> Result<Vec<ThirdPartyUser>, ApiError> {
        let path = format!("superAdmin/thirdparty/{}", path_id(owner.as_str())?);
        let body: ThirdPartyListBody = self.get(&path, &[]).await?;
        Ok(body.third_party_users)
    }

    /// Create a third-party user.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` carrying the server's message on rejection.
    #[tracing::instrument(skip(self, payload), fields(email = %payload.email))]
    pub async fn create_third_party(&self, payload: ThirdPartyPayload) -> Result<(), ApiError> {
        let form = payload.into_form()?;
        let _: Ignored = self
            .post_multipart("superAdmin/createThirdParty", form)
            .await?;
        Ok(())
    }

    /// Activate or deactivate a third-party user.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[tracing::instrument(skip(self), fields(third_party_id = %id))]
    pub async fn set_third_party_status(
        &self,
        id: &ThirdPartyId,
        status: AccountStatus,
    ) -> Result<(), ApiError> {
        let path = format!("superAdmin/thirdparty/{}/status", path_id(id.as_str())?);
        let _: Ignored = self
            .send_json(Method::PATCH, &path, &StatusPayload { status })
            .await?;
        Ok(())
    }

    /// Delete a third-party user.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[tracing::instrument(skip(self), fields(third_party_id = %id))]
    pub async fn delete_third_party(&self, id: &ThirdPartyId) -> Result<(), ApiError> {
        let path = format!("superAdmin/thirdparty/{}", path_id(id.as_str())?);
        let _: Ignored = self.send_empty(Method::DELETE, &path).await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use dvs_core::SchoolId;

    fn payload(image: Option<ImageUpload>) -> ThirdPartyPayload {
        ThirdPartyPayload {
            name: "Acme Transport".to_string(),
            email: "ops@acme.in".to_string(),
            password: SecretString::from("pw"),
            super_admin_id: SuperAdminId::new("s1"),
            assigned_schools: vec![AssignedSchool {
                school_id: SchoolId::new("sch1"),
                school_name: "North".to_string(),
            }],
            image,
        }
    }

    #[test]
    fn test_form_builds_without_image() {
        assert!(payload(None).into_form().is_ok());
    }

    #[test]
    fn test_form_rejects_bad_mime() {
        let image = ImageUpload {
            file_name: "logo.png".to_string(),
            content_type: "not a mime".to_string(),
            bytes: vec![1, 2, 3],
        };
        assert!(matches!(
            payload(Some(image)).into_form(),
            Err(ApiError::Parse(_))
        ));
    }

    #[test]
    fn test_debug_hides_password_and_bytes() {
        let image = ImageUpload {
            file_name: "logo.png".to_string(),
            content_type: "image/png".to_string(),
            bytes: vec![0xAB; 4],
        };
        let debug = format!("{:?}", payload(Some(image)));
        assert!(!debug.contains("\"pw\""));
        assert!(debug.contains("len: 4"));
    }

    #[test]
    fn test_assigned_schools_wire_shape() {
        let json = serde_json::to_string(&payload(None).assigned_schools).unwrap();
        assert_eq!(json, r#"[{"schoolId":"sch1","schoolName":"North"}]"#);
    }
}
