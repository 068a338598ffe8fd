//! View models and helpers shared by the console pages.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::Redirect;
use dvs_core::{AccountStatus, PageWindow};
use secrecy::SecretString;
use serde::{Deserialize, Deserializer};

use crate::components::data_table::TableQuery;
use crate::error::AppError;
use crate::filters;
use crate::middleware::SessionStore;
use crate::models::{Flash, SessionContext};

/// Signed-in operator, as shown in the header.
#[derive(Debug, Clone)]
pub struct OperatorView {
    pub name: String,
    pub email: String,
    pub super_admin_id: String,
    pub role: String,
}

impl From<&SessionContext> for OperatorView {
    fn from(ctx: &SessionContext) -> Self {
        Self {
            name: ctx.user.display_name().to_string(),
            email: ctx.user.email.clone().unwrap_or_default(),
            super_admin_id: ctx.super_admin_id().to_string(),
            role: ctx.role.to_string(),
        }
    }
}

/// Pagination controls under a table.
#[derive(Debug, Clone)]
pub struct PagerView {
    pub page_number: usize,
    pub page_count: usize,
    pub total: usize,
    pub prev_href: Option<String>,
    pub next_href: Option<String>,
}

impl PagerView {
    #[must_use]
    pub fn new(window: PageWindow, total: usize, query: &TableQuery) -> Self {
        Self {
            page_number: window.display_number(),
            page_count: window.count,
            total,
            prev_href: window
                .has_previous()
                .then(|| query.page_href(window.index - 1)),
            next_href: window.has_next().then(|| query.page_href(window.index + 1)),
        }
    }

    #[must_use]
    pub const fn is_paginated(&self) -> bool {
        self.page_count > 1
    }
}

/// A name/value pair carried through a confirmation form.
#[derive(Debug, Clone)]
pub struct HiddenField {
    pub name: String,
    pub value: String,
}

impl HiddenField {
    #[must_use]
    pub fn new(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
        }
    }
}

/// Confirmation page shown before destructive or bulk actions.
#[derive(Template, WebTemplate)]
#[template(path = "confirm.html")]
pub struct ConfirmTemplate {
    pub operator: OperatorView,
    pub current_path: String,
    pub flashes: Vec<Flash>,
    pub title: String,
    pub message: String,
    pub action: String,
    pub fields: Vec<HiddenField>,
    pub confirm_label: String,
    pub destructive: bool,
    pub cancel_href: String,
}

/// A POSTed bulk action: `action`, repeated `ids`, optional `select_all`
/// (with every row of the page in `page_ids`) and `confirmed`.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct BulkRequest {
    pub action: String,
    pub ids: Vec<String>,
    pub confirmed: bool,
}

impl BulkRequest {
    /// Collect a bulk request from raw form pairs.
    ///
    /// Checkbox forms repeat keys, so the body is read as pairs rather than
    /// a struct.
    #[must_use]
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut request = Self::default();
        let mut select_all = false;
        let mut page_ids = Vec::new();
        for (key, value) in pairs {
            match key.as_str() {
                "action" => request.action = value,
                "ids" => request.ids.push(value),
                "page_ids" => page_ids.push(value),
                "select_all" => select_all = value == "yes",
                "confirmed" => request.confirmed = value == "yes",
                _ => {}
            }
        }
        if select_all {
            request.ids = page_ids;
        }
        request.ids.retain(|id| !id.trim().is_empty());
        request.ids.sort();
        request.ids.dedup();
        request
    }

    /// Fields that carry this request through the confirmation page.
    #[must_use]
    pub fn hidden_fields(&self) -> Vec<HiddenField> {
        let mut fields = vec![
            HiddenField::new("action", &self.action),
            HiddenField::new("confirmed", "yes"),
        ];
        fields.extend(self.ids.iter().map(|id| HiddenField::new("ids", id)));
        fields
    }
}

/// Operation a bulk request applies to every selected account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkOp {
    Activate,
    Deactivate,
    Delete,
}

impl BulkOp {
    /// Parse the posted `action` value.
    #[must_use]
    pub fn parse(action: &str) -> Option<Self> {
        match action {
            "activate" => Some(Self::Activate),
            "deactivate" => Some(Self::Deactivate),
            "delete" => Some(Self::Delete),
            _ => None,
        }
    }

    /// Status to set, `None` for deletion.
    #[must_use]
    pub const fn status(self) -> Option<AccountStatus> {
        match self {
            Self::Activate => Some(AccountStatus::Active),
            Self::Deactivate => Some(AccountStatus::Inactive),
            Self::Delete => None,
        }
    }

    #[must_use]
    pub const fn verb(self) -> &'static str {
        match self {
            Self::Activate => "Activate",
            Self::Deactivate => "Deactivate",
            Self::Delete => "Delete",
        }
    }

    #[must_use]
    pub const fn past_tense(self) -> &'static str {
        match self {
            Self::Activate => "activated",
            Self::Deactivate => "deactivated",
            Self::Delete => "deleted",
        }
    }

    /// Confirmation page for this operation over `request.ids`.
    ///
    /// `noun` is the plural record name ("admins").
    #[must_use]
    pub fn confirm_page(
        self,
        ctx: &SessionContext,
        request: &BulkRequest,
        noun: &str,
        base_path: &str,
    ) -> ConfirmTemplate {
        let count = request.ids.len();
        ConfirmTemplate {
            operator: OperatorView::from(ctx),
            current_path: base_path.to_string(),
            flashes: Vec::new(),
            title: format!("{} {count} {noun}?", self.verb()),
            message: match self {
                Self::Delete => format!("The selected {noun} will be permanently removed."),
                _ => format!("The selected {noun} will be {}.", self.past_tense()),
            },
            action: format!("{base_path}/bulk"),
            fields: request.hidden_fields(),
            confirm_label: self.verb().to_string(),
            destructive: self == Self::Delete,
            cancel_href: base_path.to_string(),
        }
    }
}

/// Message shown when any request of a bulk operation fails.
pub const BULK_FAILED: &str = "Bulk update failed";

/// Collected messages for a form that failed validation.
#[derive(Debug, Clone, Default)]
pub struct FieldErrors(Vec<String>);

impl FieldErrors {
    /// Record `message` when `value` is blank.
    pub fn require(&mut self, value: &str, message: &str) {
        if value.trim().is_empty() {
            self.0.push(message.to_string());
        }
    }

    /// Record `message` when `value` is absent.
    pub fn require_secret(&mut self, value: Option<&SecretString>, message: &str) {
        if value.is_none() {
            self.0.push(message.to_string());
        }
    }

    /// Record `message` unconditionally.
    pub fn add(&mut self, message: &str) {
        self.0.push(message.to_string());
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn messages(&self) -> &[String] {
        &self.0
    }
}

/// Read a password field, treating blank input as absent.
///
/// # Errors
///
/// Fails only if the field is not a string.
pub fn optional_secret<'de, D>(deserializer: D) -> Result<Option<SecretString>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?
        .filter(|s| !s.is_empty())
        .map(SecretString::from))
}

/// Queue `flash` and redirect to `to` (post/redirect/get).
///
/// # Errors
///
/// Returns `AppError::Session` if the flash cannot be stored.
pub async fn redirect_with_flash(
    store: &SessionStore,
    flash: Flash,
    to: &str,
) -> Result<Redirect, AppError> {
    store.set_flash(flash).await?;
    Ok(Redirect::to(to))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_bulk_request_collects_repeated_ids() {
        let request = BulkRequest::from_pairs(pairs(&[
            ("action", "deactivate"),
            ("ids", "a2"),
            ("ids", "a1"),
            ("ids", "a2"),
        ]));
        assert_eq!(request.action, "deactivate");
        assert_eq!(request.ids, ["a1", "a2"]);
        assert!(!request.confirmed);
    }

    #[test]
    fn test_select_all_takes_every_row_on_page() {
        let request = BulkRequest::from_pairs(pairs(&[
            ("action", "delete"),
            ("select_all", "yes"),
            ("ids", "a1"),
            ("page_ids", "a1"),
            ("page_ids", "a2"),
            ("page_ids", "a3"),
            ("confirmed", "yes"),
        ]));
        assert_eq!(request.ids, ["a1", "a2", "a3"]);
        assert!(request.confirmed);
    }

    #[test]
    fn test_hidden_fields_round_trip_confirmation() {
        let request = BulkRequest::from_pairs(pairs(&[("action", "activate"), ("ids", "a1")]));
        let fields: Vec<(String, String)> = request
            .hidden_fields()
            .into_iter()
            .map(|f| (f.name, f.value))
            .collect();
        let confirmed = BulkRequest::from_pairs(fields);
        assert_eq!(confirmed.ids, ["a1"]);
        assert!(confirmed.confirmed);
    }

    #[test]
    fn test_field_errors() {
        let mut errors = FieldErrors::default();
        errors.require("  ", "Email is required");
        errors.require("x", "never");
        errors.require_secret(None, "Password is required");
        assert_eq!(errors.messages(), ["Email is required", "Password is required"]);
    }

    #[test]
    fn test_pager_links() {
        let query = TableQuery {
            q: Some("asha".to_string()),
            ..TableQuery::default()
        };
        let pager = PagerView::new(PageWindow::clamped(1, 3), 25, &query);
        assert_eq!(pager.page_number, 2);
        assert_eq!(pager.prev_href.as_deref(), Some("?q=asha&page=0"));
        assert_eq!(pager.next_href.as_deref(), Some("?q=asha&page=2"));
        assert!(pager.is_paginated());
    }
}
