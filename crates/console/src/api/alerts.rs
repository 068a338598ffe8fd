//! Global alert endpoints.

use dvs_core::{AlertId, AlertPriority, AlertType, SuperAdminId, TargetAudience};
use reqwest::Method;
use serde::Serialize;

use super::{Alert, AlertBody, AlertListBody, ApiError, Authorized, Ignored, path_id};

/// Create/update body for a global alert.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertPayload {
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    pub priority: AlertPriority,
    /// Milliseconds; `null` keeps the alert up until dismissed.
    pub duration: Option<u64>,
    pub target_audience: TargetAudience,
    pub is_global: bool,
    pub is_active: bool,
    pub created_by: SuperAdminId,
}

impl AlertPayload {
    /// Build a payload from form values. `duration_secs` of zero or `None`
    /// means no expiry.
    #[must_use]
    pub fn new(
        title: String,
        message: String,
        alert_type: AlertType,
        priority: AlertPriority,
        duration_secs: Option<u64>,
        target_audience: TargetAudience,
        created_by: SuperAdminId,
    ) -> Self {
        Self {
            title,
            message,
            alert_type,
            priority,
            duration: duration_secs
                .filter(|s| *s > 0)
                .map(|s| s.saturating_mul(1000)),
            target_audience,
            is_global: true,
            is_active: true,
            created_by,
        }
    }
}

impl Authorized<'_> {
    /// Fetch every global alert.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the body is malformed.
    #[tracing::instrument(skip(self))]
    pub async fn list_alerts(&self) -> Result<Vec<Alert>, ApiError> {
        let body: AlertListBody = self.get("alerts", &[("isGlobal", "true".to_string())]).await?;
        Ok(body.alerts)
    }

    /// Create an alert, returning it as stored when the API echoes it.
    ///
    /// A successful response without an alert still means the alert exists.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on rejection.
    #[tracing::instrument(skip(self, payload), fields(title = %payload.title))]
    pub async fn create_alert(&self, payload: &AlertPayload) -> Result<Option<Alert>, ApiError> {
        let body: AlertBody = self.send_json(Method::POST, "alerts", payload).await?;
        Ok(body.alert)
    }

    /// Replace an alert's fields.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on rejection.
    #[tracing::instrument(skip(self, payload), fields(alert_id = %id))]
    pub async fn update_alert(
        &self,
        id: &AlertId,
        payload: &AlertPayload,
    ) -> Result<Option<Alert>, ApiError> {
        let path = format!("alerts/{}", path_id(id.as_str())?);
        let body: AlertBody = self.send_json(Method::PUT, &path, payload).await?;
        Ok(body.alert)
    }

    /// Delete an alert.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[tracing::instrument(skip(self), fields(alert_id = %id))]
    pub async fn delete_alert(&self, id: &AlertId) -> Result<(), ApiError> {
        let path = format!("alerts/{}", path_id(id.as_str())?);
        let _: Ignored = self.send_empty(Method::DELETE, &path).await?;
        Ok(())
    }

    /// Flip `isActive`. Returns the new state when the API echoes it.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[tracing::instrument(skip(self), fields(alert_id = %id))]
    pub async fn toggle_alert(&self, id: &AlertId) -> Result<Option<bool>, ApiError> {
        let path = format!("alerts/{}/toggle", path_id(id.as_str())?);
        let body: AlertBody = self.send_empty(Method::PATCH, &path).await?;
        Ok(body.alert.map(|a| a.is_active))
    }

    /// Push an alert to every connected school dashboard.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[tracing::instrument(skip(self), fields(alert_id = %id))]
    pub async fn broadcast_alert(&self, id: &AlertId) -> Result<(), ApiError> {
        let path = format!("alerts/{}/broadcast", path_id(id.as_str())?);
        let _: Ignored = self.send_empty(Method::POST, &path).await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_converts_seconds_to_millis() {
        let payload = AlertPayload::new(
            "Exam".to_string(),
            "Tomorrow".to_string(),
            AlertType::Warning,
            AlertPriority::High,
            Some(30),
            TargetAudience::Parents,
            SuperAdminId::new("s1"),
        );
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["duration"], 30_000);
        assert_eq!(json["type"], "warning");
        assert_eq!(json["targetAudience"], "parents");
        assert_eq!(json["isGlobal"], true);
        assert_eq!(json["createdBy"], "s1");
    }

    #[test]
    fn test_zero_duration_is_null() {
        let payload = AlertPayload::new(
            "t".to_string(),
            "m".to_string(),
            AlertType::Info,
            AlertPriority::Low,
            Some(0),
            TargetAudience::All,
            SuperAdminId::new("s1"),
        );
        let json = serde_json::to_value(&payload).unwrap();
        assert!(json["duration"].is_null());
    }
}
