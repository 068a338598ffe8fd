//! Global alert route handlers.
//!
//! Alerts are fetched as one list and paginated here. Toggling and
//! deleting go through a confirmation page first.

use std::borrow::Cow;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use dvs_core::{AlertId, AlertPriority, AlertType, SuperAdminId, TargetAudience};
use serde::Deserialize;
use tracing::instrument;

use super::views::{
    ConfirmTemplate, FieldErrors, HiddenField, OperatorView, PagerView, redirect_with_flash,
};
use crate::api::{Alert, AlertPayload, ApiError, Authorized, Page};
use crate::components::data_table::{
    DataTableConfig, SortKey, TableQuery, TableRow, alerts_table_config, apply_query, format_date,
};
use crate::error::AppError;
use crate::filters;
use crate::middleware::{RequireSuperAdmin, SessionStore};
use crate::models::{Flash, SessionContext};
use crate::state::AppState;

const BASE_PATH: &str = "/dashboard/alerts";

const BROADCAST_SKIPPED: &str = "Alert was created but could not be broadcast";

const fn priority_rank(priority: AlertPriority) -> u8 {
    match priority {
        AlertPriority::Low => 0,
        AlertPriority::Medium => 1,
        AlertPriority::High => 2,
    }
}

impl TableRow for Alert {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.title.as_str(), self.message.as_str()]
    }

    fn filter_value(&self, key: &str) -> Option<Cow<'_, str>> {
        match key {
            "type" => Some(Cow::Borrowed(self.alert_type.as_str())),
            "priority" => Some(Cow::Borrowed(self.priority.as_str())),
            "active" => Some(Cow::Borrowed(if self.is_active { "true" } else { "false" })),
            _ => None,
        }
    }

    fn sort_key(&self, column: &str) -> Option<SortKey> {
        match column {
            "title" => SortKey::text(&self.title),
            "type" => SortKey::text(self.alert_type.as_str()),
            "priority" => Some(SortKey::Rank(priority_rank(self.priority))),
            "active" => Some(SortKey::Flag(self.is_active)),
            "created_at" => self.created_at.map(SortKey::Date),
            _ => None,
        }
    }
}

// =============================================================================
// View models
// =============================================================================

/// Alert row for the list template.
#[derive(Debug, Clone)]
pub struct AlertRow {
    pub title: String,
    pub message: String,
    pub alert_type: AlertType,
    pub priority: AlertPriority,
    pub audience: &'static str,
    pub is_active: bool,
    pub duration: String,
    pub created: String,
    pub edit_href: String,
    pub toggle_href: String,
    pub delete_href: String,
    pub broadcast_action: String,
}

impl From<&Alert> for AlertRow {
    fn from(alert: &Alert) -> Self {
        let base = format!("{BASE_PATH}/{}", alert.id);
        Self {
            title: alert.title.clone(),
            message: alert.message.clone(),
            alert_type: alert.alert_type,
            priority: alert.priority,
            audience: alert.target_audience.label(),
            is_active: alert.is_active,
            duration: alert
                .duration_secs()
                .map_or_else(|| "Until dismissed".to_string(), |s| format!("{s}s")),
            created: format_date(alert.created_at.as_ref()),
            edit_href: format!("{base}/edit"),
            toggle_href: format!("{base}/toggle"),
            delete_href: format!("{base}/delete"),
            broadcast_action: format!("{base}/broadcast"),
        }
    }
}

/// Create/edit form body. `duration` is in seconds; blank means no expiry.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AlertForm {
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub alert_type: String,
    pub priority: String,
    pub duration: String,
    pub target_audience: String,
}

impl AlertForm {
    /// Pre-populate from an existing alert.
    #[must_use]
    pub fn from_alert(alert: &Alert) -> Self {
        Self {
            title: alert.title.clone(),
            message: alert.message.clone(),
            alert_type: alert.alert_type.as_str().to_string(),
            priority: alert.priority.as_str().to_string(),
            duration: alert
                .duration_secs()
                .map(|s| s.to_string())
                .unwrap_or_default(),
            target_audience: alert.target_audience.as_str().to_string(),
        }
    }

    fn duration_secs(&self) -> Result<Option<u64>, std::num::ParseIntError> {
        let raw = self.duration.trim();
        if raw.is_empty() {
            Ok(None)
        } else {
            raw.parse().map(Some)
        }
    }

    #[must_use]
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::default();
        errors.require(&self.title, "Title is required");
        errors.require(&self.message, "Message is required");
        if self.duration_secs().is_err() {
            errors.add("Duration must be a whole number of seconds");
        }
        errors
    }

    /// Build the API payload. Unknown select values fall back to defaults.
    #[must_use]
    pub fn to_payload(&self, created_by: &SuperAdminId) -> AlertPayload {
        AlertPayload::new(
            self.title.trim().to_string(),
            self.message.trim().to_string(),
            self.alert_type.parse().unwrap_or_default(),
            self.priority.parse().unwrap_or_default(),
            self.duration_secs().ok().flatten(),
            self.target_audience.parse().unwrap_or_default(),
            created_by.clone(),
        )
    }
}

/// An `<option>` in one of the form's selects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

fn select_options<T: Copy + Default + PartialEq + std::str::FromStr>(
    all: &[T],
    current: &str,
    value: fn(T) -> &'static str,
    label: fn(T) -> &'static str,
) -> Vec<SelectOption> {
    let current: T = current.parse().unwrap_or_default();
    all.iter()
        .map(|&v| SelectOption {
            value: value(v),
            label: label(v),
            selected: v == current,
        })
        .collect()
}

/// Everything the shared form partial needs.
#[derive(Debug)]
pub struct AlertFormView {
    pub heading: &'static str,
    pub action: String,
    pub submit_label: &'static str,
    pub form: AlertForm,
    pub type_options: Vec<SelectOption>,
    pub priority_options: Vec<SelectOption>,
    pub audience_options: Vec<SelectOption>,
    pub errors: Vec<String>,
}

impl AlertFormView {
    fn build(
        heading: &'static str,
        action: String,
        submit_label: &'static str,
        form: AlertForm,
    ) -> Self {
        Self {
            heading,
            action,
            submit_label,
            type_options: select_options(
                AlertType::ALL,
                &form.alert_type,
                AlertType::as_str,
                AlertType::label,
            ),
            priority_options: select_options(
                AlertPriority::ALL,
                &form.priority,
                AlertPriority::as_str,
                AlertPriority::label,
            ),
            audience_options: select_options(
                TargetAudience::ALL,
                &form.target_audience,
                TargetAudience::as_str,
                TargetAudience::label,
            ),
            form,
            errors: Vec::new(),
        }
    }

    #[must_use]
    pub fn create(form: AlertForm) -> Self {
        Self::build("Create Global Alert", BASE_PATH.to_string(), "Create & Broadcast", form)
    }

    #[must_use]
    pub fn edit(id: &AlertId, form: AlertForm) -> Self {
        Self::build("Edit Global Alert", format!("{BASE_PATH}/{id}"), "Save Changes", form)
    }

    #[must_use]
    pub fn with_errors(mut self, errors: Vec<String>) -> Self {
        self.errors = errors;
        self
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Alerts list template.
#[derive(Template, WebTemplate)]
#[template(path = "alerts/index.html")]
pub struct AlertsIndexTemplate {
    pub operator: OperatorView,
    pub current_path: String,
    pub flashes: Vec<Flash>,
    pub table_config: DataTableConfig,
    pub query: TableQuery,
    pub rows: Vec<AlertRow>,
    pub pager: PagerView,
    pub load_error: Option<String>,
    pub form_view: Option<AlertFormView>,
}

/// Standalone alert form, used for edit and for failed submissions.
#[derive(Template, WebTemplate)]
#[template(path = "alerts/form.html")]
pub struct AlertFormTemplate {
    pub operator: OperatorView,
    pub current_path: String,
    pub flashes: Vec<Flash>,
    pub form_view: AlertFormView,
}

impl AlertFormTemplate {
    fn new(ctx: &SessionContext, form_view: AlertFormView) -> Self {
        Self {
            operator: OperatorView::from(ctx),
            current_path: BASE_PATH.to_string(),
            flashes: Vec::new(),
            form_view,
        }
    }
}

/// Body of the toggle and delete confirmations.
#[derive(Debug, Default, Deserialize)]
pub struct ConfirmForm {
    #[serde(default)]
    pub confirmed: Option<String>,
}

impl ConfirmForm {
    #[must_use]
    pub fn is_confirmed(&self) -> bool {
        self.confirmed.as_deref() == Some("yes")
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Build the alerts router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(BASE_PATH, get(index).post(create))
        .route("/dashboard/alerts/{id}", post(update))
        .route("/dashboard/alerts/{id}/edit", get(edit))
        .route(
            "/dashboard/alerts/{id}/toggle",
            get(confirm_toggle).post(toggle),
        )
        .route(
            "/dashboard/alerts/{id}/delete",
            get(confirm_delete).post(delete),
        )
        .route("/dashboard/alerts/{id}/broadcast", post(broadcast))
}

/// Look up one alert in the global list.
async fn find_alert(api: Authorized<'_>, id: &AlertId) -> Result<Alert, ApiError> {
    api.list_alerts()
        .await?
        .into_iter()
        .find(|a| &a.id == id)
        .ok_or_else(|| ApiError::NotFound(format!("alert {id}")))
}

/// Global alerts list, with the create form open when `?modal=create`.
///
/// GET /dashboard/alerts
#[instrument(skip(state, store, ctx, query))]
async fn index(
    State(state): State<AppState>,
    store: SessionStore,
    RequireSuperAdmin(ctx): RequireSuperAdmin,
    Query(query): Query<TableQuery>,
) -> AlertsIndexTemplate {
    let table_config = alerts_table_config();

    let (alerts, load_error) = match state.api().bearer(Some(&ctx.token)).list_alerts().await {
        Ok(alerts) => (alerts, None),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load alerts");
            (Vec::new(), Some(e.user_message()))
        }
    };

    let page = Page::slice(apply_query(alerts, &query, &table_config), query.page());
    let rows = page.items.iter().map(AlertRow::from).collect();
    let form_view = query.is_create_open().then(|| {
        AlertFormView::create(AlertForm {
            target_audience: TargetAudience::All.as_str().to_string(),
            ..AlertForm::default()
        })
    });

    AlertsIndexTemplate {
        operator: OperatorView::from(&ctx),
        current_path: BASE_PATH.to_string(),
        flashes: store.take_flash().await,
        pager: PagerView::new(page.window, page.total, &query),
        table_config,
        query,
        rows,
        load_error,
        form_view,
    }
}

/// Create an alert, then broadcast it.
///
/// A failed broadcast leaves the alert in place and adds a warning.
///
/// POST /dashboard/alerts
#[instrument(skip(state, store, ctx, form))]
async fn create(
    State(state): State<AppState>,
    store: SessionStore,
    RequireSuperAdmin(ctx): RequireSuperAdmin,
    Form(form): Form<AlertForm>,
) -> Result<Response, AppError> {
    let errors = form.validate();
    if !errors.is_empty() {
        let view = AlertFormView::create(form).with_errors(errors.messages().to_vec());
        return Ok((
            StatusCode::UNPROCESSABLE_ENTITY,
            AlertFormTemplate::new(&ctx, view),
        )
            .into_response());
    }

    let api = state.api().bearer(Some(&ctx.token));
    let alert = match api.create_alert(&form.to_payload(ctx.super_admin_id())).await {
        Ok(alert) => alert,
        Err(e) => {
            tracing::warn!(error = %e, "Alert create rejected");
            let view = AlertFormView::create(form).with_errors(vec![e.user_message()]);
            return Ok((StatusCode::BAD_GATEWAY, AlertFormTemplate::new(&ctx, view)).into_response());
        }
    };

    store
        .set_flash(Flash::success("Alert created successfully"))
        .await?;
    let broadcast = match alert {
        Some(alert) => match api.broadcast_alert(&alert.id).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, alert_id = %alert.id, "Alert broadcast failed");
                false
            }
        },
        None => {
            tracing::warn!("Create response carried no alert, skipping broadcast");
            false
        }
    };
    if !broadcast {
        store.set_flash(Flash::warning(BROADCAST_SKIPPED)).await?;
    }
    Ok(Redirect::to(BASE_PATH).into_response())
}

/// Edit form for one alert.
///
/// GET /dashboard/alerts/{id}/edit
#[instrument(skip(state, store, ctx))]
async fn edit(
    State(state): State<AppState>,
    store: SessionStore,
    RequireSuperAdmin(ctx): RequireSuperAdmin,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let id = AlertId::new(id);
    match find_alert(state.api().bearer(Some(&ctx.token)), &id).await {
        Ok(alert) => {
            let view = AlertFormView::edit(&id, AlertForm::from_alert(&alert));
            Ok(AlertFormTemplate::new(&ctx, view).into_response())
        }
        Err(e) => Ok(
            redirect_with_flash(&store, Flash::error(e.user_message()), BASE_PATH)
                .await?
                .into_response(),
        ),
    }
}

/// Save an edited alert, keeping its current active state.
///
/// POST /dashboard/alerts/{id}
#[instrument(skip(state, store, ctx, form))]
async fn update(
    State(state): State<AppState>,
    store: SessionStore,
    RequireSuperAdmin(ctx): RequireSuperAdmin,
    Path(id): Path<String>,
    Form(form): Form<AlertForm>,
) -> Result<Response, AppError> {
    let id = AlertId::new(id);
    let errors = form.validate();
    if !errors.is_empty() {
        let view = AlertFormView::edit(&id, form).with_errors(errors.messages().to_vec());
        return Ok((
            StatusCode::UNPROCESSABLE_ENTITY,
            AlertFormTemplate::new(&ctx, view),
        )
            .into_response());
    }

    let api = state.api().bearer(Some(&ctx.token));
    let existing = match find_alert(api, &id).await {
        Ok(alert) => alert,
        Err(e) => {
            return Ok(
                redirect_with_flash(&store, Flash::error(e.user_message()), BASE_PATH)
                    .await?
                    .into_response(),
            );
        }
    };

    let mut payload = form.to_payload(ctx.super_admin_id());
    payload.is_active = existing.is_active;
    payload.is_global = existing.is_global;

    match api.update_alert(&id, &payload).await {
        Ok(_) => Ok(
            redirect_with_flash(&store, Flash::success("Alert updated successfully"), BASE_PATH)
                .await?
                .into_response(),
        ),
        Err(e) => {
            tracing::warn!(error = %e, alert_id = %id, "Alert update rejected");
            let view = AlertFormView::edit(&id, form).with_errors(vec![e.user_message()]);
            Ok((StatusCode::BAD_GATEWAY, AlertFormTemplate::new(&ctx, view)).into_response())
        }
    }
}

fn confirm_page(
    ctx: &SessionContext,
    title: &str,
    message: &str,
    action: String,
    confirm_label: &str,
    destructive: bool,
) -> ConfirmTemplate {
    ConfirmTemplate {
        operator: OperatorView::from(ctx),
        current_path: BASE_PATH.to_string(),
        flashes: Vec::new(),
        title: title.to_string(),
        message: message.to_string(),
        action,
        fields: vec![HiddenField::new("confirmed", "yes")],
        confirm_label: confirm_label.to_string(),
        destructive,
        cancel_href: BASE_PATH.to_string(),
    }
}

/// GET /dashboard/alerts/{id}/toggle
async fn confirm_toggle(
    RequireSuperAdmin(ctx): RequireSuperAdmin,
    Path(id): Path<String>,
) -> ConfirmTemplate {
    let id = AlertId::new(id);
    confirm_page(
        &ctx,
        "Change alert status?",
        "Active alerts are shown on school dashboards; inactive ones are hidden.",
        format!("{BASE_PATH}/{id}/toggle"),
        "Toggle Status",
        false,
    )
}

/// Flip an alert's active state.
///
/// POST /dashboard/alerts/{id}/toggle
#[instrument(skip(state, store, ctx, form))]
async fn toggle(
    State(state): State<AppState>,
    store: SessionStore,
    RequireSuperAdmin(ctx): RequireSuperAdmin,
    Path(id): Path<String>,
    Form(form): Form<ConfirmForm>,
) -> Result<Redirect, AppError> {
    let id = AlertId::new(id);
    if !form.is_confirmed() {
        return Ok(Redirect::to(&format!("{BASE_PATH}/{id}/toggle")));
    }

    let flash = match state.api().bearer(Some(&ctx.token)).toggle_alert(&id).await {
        Ok(Some(true)) => Flash::success("Alert activated"),
        Ok(Some(false)) => Flash::success("Alert deactivated"),
        Ok(None) => Flash::success("Alert status updated"),
        Err(e) => {
            tracing::warn!(error = %e, alert_id = %id, "Alert toggle failed");
            Flash::error(e.user_message())
        }
    };
    redirect_with_flash(&store, flash, BASE_PATH).await
}

/// GET /dashboard/alerts/{id}/delete
async fn confirm_delete(
    RequireSuperAdmin(ctx): RequireSuperAdmin,
    Path(id): Path<String>,
) -> ConfirmTemplate {
    let id = AlertId::new(id);
    confirm_page(
        &ctx,
        "Delete alert?",
        "The alert will be permanently removed from every school dashboard.",
        format!("{BASE_PATH}/{id}/delete"),
        "Delete",
        true,
    )
}

/// Delete an alert.
///
/// POST /dashboard/alerts/{id}/delete
#[instrument(skip(state, store, ctx, form))]
async fn delete(
    State(state): State<AppState>,
    store: SessionStore,
    RequireSuperAdmin(ctx): RequireSuperAdmin,
    Path(id): Path<String>,
    Form(form): Form<ConfirmForm>,
) -> Result<Redirect, AppError> {
    let id = AlertId::new(id);
    if !form.is_confirmed() {
        return Ok(Redirect::to(&format!("{BASE_PATH}/{id}/delete")));
    }

    let flash = match state.api().bearer(Some(&ctx.token)).delete_alert(&id).await {
        Ok(()) => Flash::success("Alert deleted successfully"),
        Err(e) => {
            tracing::warn!(error = %e, alert_id = %id, "Alert delete failed");
            Flash::error(e.user_message())
        }
    };
    redirect_with_flash(&store, flash, BASE_PATH).await
}

/// Push an alert to school dashboards again.
///
/// POST /dashboard/alerts/{id}/broadcast
#[instrument(skip(state, store, ctx))]
async fn broadcast(
    State(state): State<AppState>,
    store: SessionStore,
    RequireSuperAdmin(ctx): RequireSuperAdmin,
    Path(id): Path<String>,
) -> Result<Redirect, AppError> {
    let id = AlertId::new(id);
    let flash = match state
        .api()
        .bearer(Some(&ctx.token))
        .broadcast_alert(&id)
        .await
    {
        Ok(()) => Flash::success("Alert broadcast to all schools"),
        Err(e) => {
            tracing::warn!(error = %e, alert_id = %id, "Alert broadcast failed");
            Flash::warning("Alert could not be broadcast")
        }
    };
    redirect_with_flash(&store, flash, BASE_PATH).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form(title: &str, message: &str, duration: &str) -> AlertForm {
        AlertForm {
            title: title.to_string(),
            message: message.to_string(),
            alert_type: "warning".to_string(),
            priority: "high".to_string(),
            duration: duration.to_string(),
            target_audience: "parents".to_string(),
        }
    }

    #[test]
    fn test_validate_requires_title_and_message() {
        let errors = form(" ", "", "").validate();
        assert_eq!(errors.messages(), ["Title is required", "Message is required"]);
        assert!(form("Exam", "Tomorrow", "30").validate().is_empty());
    }

    #[test]
    fn test_validate_rejects_bad_duration() {
        let errors = form("Exam", "Tomorrow", "soon").validate();
        assert_eq!(
            errors.messages(),
            ["Duration must be a whole number of seconds"]
        );
    }

    #[test]
    fn test_payload_converts_seconds_to_millis() {
        let payload = form("Exam", "Tomorrow", "30").to_payload(&SuperAdminId::new("s1"));
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["duration"], 30_000);
        assert_eq!(json["type"], "warning");
        assert_eq!(json["priority"], "high");
        assert_eq!(json["targetAudience"], "parents");
        assert_eq!(json["isActive"], true);

        let payload = form("Exam", "Tomorrow", "").to_payload(&SuperAdminId::new("s1"));
        assert!(payload.duration.is_none());
    }

    #[test]
    fn test_edit_form_round_trips_alert_values() {
        let alert: Alert = serde_json::from_str(
            r#"{"_id":"al1","title":"Exam","message":"Tomorrow","type":"error",
                "priority":"low","duration":45000,"targetAudience":"teachers","isActive":false}"#,
        )
        .unwrap();
        let form = AlertForm::from_alert(&alert);
        assert_eq!(form.duration, "45");
        let view = AlertFormView::edit(&alert.id, form);
        assert_eq!(view.action, "/dashboard/alerts/al1");
        let selected: Vec<_> = view
            .type_options
            .iter()
            .filter(|o| o.selected)
            .map(|o| o.value)
            .collect();
        assert_eq!(selected, ["error"]);
    }

    #[test]
    fn test_priority_sorts_by_rank() {
        let low: Alert = serde_json::from_str(r#"{"_id":"1","priority":"low"}"#).unwrap();
        let high: Alert = serde_json::from_str(r#"{"_id":"2","priority":"high"}"#).unwrap();
        assert!(low.sort_key("priority") < high.sort_key("priority"));
        assert_eq!(high.filter_value("active").as_deref(), Some("true"));
    }

    #[test]
    fn test_confirm_form() {
        assert!(!ConfirmForm::default().is_confirmed());
        assert!(
            ConfirmForm {
                confirmed: Some("yes".to_string())
            }
            .is_confirmed()
        );
    }
}
