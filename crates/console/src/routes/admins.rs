//! School admin route handlers.
//!
//! Admins are listed a page at a time from the remote API. Search, filters
//! and sorting apply to the fetched page.

use std::borrow::Cow;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use dvs_core::{AdminId, SuperAdminId};
use futures::future::try_join_all;
use secrecy::SecretString;
use serde::Deserialize;
use tracing::instrument;

use super::views::{
    BULK_FAILED, BulkOp, BulkRequest, FieldErrors, OperatorView, PagerView, optional_secret,
    redirect_with_flash,
};
use crate::api::{Admin, AdminPayload, ApiError, Authorized, Page};
use crate::components::data_table::{
    DataTableConfig, SortKey, TableQuery, TableRow, admins_table_config, apply_query, format_date,
    write_csv,
};
use crate::error::AppError;
use crate::filters;
use crate::middleware::{RequireSuperAdmin, SessionStore};
use crate::models::{Flash, SessionContext};
use crate::state::AppState;

const BASE_PATH: &str = "/dashboard/superadmin";

/// Upper bound on pages fetched when every admin is needed at once.
const MAX_PAGES: usize = 50;

/// Column headers of the admins CSV export.
pub const CSV_HEADERS: [&str; 8] = [
    "Full Name",
    "Email",
    "School",
    "Contact",
    "City",
    "State",
    "Pincode",
    "Created Date",
];

/// One CSV record for `admin`, in [`CSV_HEADERS`] order.
#[must_use]
pub fn csv_row(admin: &Admin) -> Vec<String> {
    vec![
        admin.full_name.clone(),
        admin.email.clone(),
        admin.school_name.clone(),
        admin.contact.clone(),
        admin.school_city.clone(),
        admin.school_state.clone(),
        admin.pincode.clone(),
        format_date(admin.created_at.as_ref()),
    ]
}

impl TableRow for Admin {
    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.full_name.as_str(),
            self.email.as_str(),
            self.school_name.as_str(),
        ]
    }

    fn filter_value(&self, key: &str) -> Option<Cow<'_, str>> {
        match key {
            "status" => self.status.map(|s| Cow::Borrowed(s.as_str())),
            "city" => Some(Cow::Borrowed(self.school_city.as_str())),
            "state" => Some(Cow::Borrowed(self.school_state.as_str())),
            _ => None,
        }
    }

    fn sort_key(&self, column: &str) -> Option<SortKey> {
        match column {
            "full_name" => SortKey::text(&self.full_name),
            "email" => SortKey::text(&self.email),
            "school_name" => SortKey::text(&self.school_name),
            "school_city" => SortKey::text(&self.school_city),
            "school_state" => SortKey::text(&self.school_state),
            "created_at" => self.created_at.map(SortKey::Date),
            _ => None,
        }
    }
}

// =============================================================================
// View models
// =============================================================================

/// Admin row for the list template.
#[derive(Debug, Clone)]
pub struct AdminRow {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub school_name: String,
    pub contact: String,
    pub school_city: String,
    pub school_state: String,
    pub pincode: String,
    pub created: String,
    pub status: &'static str,
    pub edit_href: String,
}

impl From<&Admin> for AdminRow {
    fn from(admin: &Admin) -> Self {
        Self {
            id: admin.id.to_string(),
            full_name: admin.full_name.clone(),
            email: admin.email.clone(),
            school_name: admin.school_name.clone(),
            contact: admin.contact.clone(),
            school_city: admin.school_city.clone(),
            school_state: admin.school_state.clone(),
            pincode: admin.pincode.clone(),
            created: format_date(admin.created_at.as_ref()),
            status: admin.status.map_or("-", |s| s.label()),
            edit_href: format!("{BASE_PATH}/{}/edit", admin.id),
        }
    }
}

/// Create/edit form body. Field names match the form inputs.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AdminForm {
    pub full_name: String,
    pub email: String,
    #[serde(deserialize_with = "optional_secret")]
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
}

impl AdminForm {
    /// Pre-populate from an existing admin. The password stays blank.
    #[must_use]
    pub fn from_admin(admin: &Admin) -> Self {
        Self {
            full_name: admin.full_name.clone(),
            email: admin.email.clone(),
            password: None,
            address: admin.address.clone(),
            school_name: admin.school_name.clone(),
            contact: admin.contact.clone(),
            fee_message: admin.fee_message.clone(),
            school_state: admin.school_state.clone(),
            school_city: admin.school_city.clone(),
            admission_message: admin.admission_message.clone(),
            registration_message: admin.registration_message.clone(),
            pincode: admin.pincode.clone(),
        }
    }

    /// Required-field check. A password is only required on create.
    #[must_use]
    pub fn validate(&self, creating: bool) -> FieldErrors {
        let mut errors = FieldErrors::default();
        errors.require(&self.email, "Email is required");
        if creating {
            errors.require_secret(self.password.as_ref(), "Password is required");
        }
        errors.require(&self.school_name, "School name is required");
        errors
    }

    /// Build the API payload, moving the password out of the form.
    #[must_use]
    pub fn into_payload(self, owner: &SuperAdminId) -> AdminPayload {
        AdminPayload {
            full_name: self.full_name.trim().to_string(),
            email: self.email.trim().to_string(),
            password: self.password,
            address: self.address,
            school_name: self.school_name.trim().to_string(),
            contact: self.contact,
            fee_message: self.fee_message,
            school_state: self.school_state,
            school_city: self.school_city,
            admission_message: self.admission_message,
            registration_message: self.registration_message,
            pincode: self.pincode,
            super_admin_id: owner.clone(),
        }
    }
}

/// Everything the shared form partial needs.
#[derive(Debug)]
pub struct AdminFormView {
    pub title: String,
    pub action: String,
    pub submit_label: &'static str,
    pub password_hint: &'static str,
    pub form: AdminForm,
    pub errors: Vec<String>,
}

impl AdminFormView {
    #[must_use]
    pub fn create(form: AdminForm) -> Self {
        Self {
            title: "Create Admin".to_string(),
            action: BASE_PATH.to_string(),
            submit_label: "Create Admin",
            password_hint: "Required",
            form,
            errors: Vec::new(),
        }
    }

    #[must_use]
    pub fn edit(id: &AdminId, form: AdminForm) -> Self {
        Self {
            title: "Edit Admin".to_string(),
            action: format!("{BASE_PATH}/{id}"),
            submit_label: "Save Changes",
            password_hint: "Leave blank to keep the current password",
            form,
            errors: Vec::new(),
        }
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

/// Admins list template.
#[derive(Template, WebTemplate)]
#[template(path = "admins/index.html")]
pub struct AdminsIndexTemplate {
    pub operator: OperatorView,
    pub current_path: String,
    pub flashes: Vec<Flash>,
    pub table_config: DataTableConfig,
    pub query: TableQuery,
    pub rows: Vec<AdminRow>,
    pub pager: PagerView,
    pub load_error: Option<String>,
    pub form_view: Option<AdminFormView>,
}

/// Standalone admin form, used for edit and for failed submissions.
#[derive(Template, WebTemplate)]
#[template(path = "admins/form.html")]
pub struct AdminFormTemplate {
    pub operator: OperatorView,
    pub current_path: String,
    pub flashes: Vec<Flash>,
    pub form_view: AdminFormView,
}

impl AdminFormTemplate {
    fn new(ctx: &SessionContext, form_view: AdminFormView) -> Self {
        Self {
            operator: OperatorView::from(ctx),
            current_path: BASE_PATH.to_string(),
            flashes: Vec::new(),
            form_view,
        }
    }
}

// =============================================================================
// Fetching
// =============================================================================

/// Fetch page `requested`, re-requesting the last page when it is past the end.
async fn fetch_page(
    api: Authorized<'_>,
    owner: &SuperAdminId,
    requested: usize,
) -> Result<Page<Admin>, ApiError> {
    let page = api.list_admins(owner, requested).await?;
    if page.items.is_empty() && page.window.index != requested {
        return api.list_admins(owner, page.window.index).await;
    }
    Ok(page)
}

/// Fetch every admin across all pages, the later pages concurrently.
///
/// # Errors
///
/// Returns the first `ApiError` any page fetch produces.
pub async fn fetch_all(api: Authorized<'_>, owner: &SuperAdminId) -> Result<Vec<Admin>, ApiError> {
    let first = api.list_admins(owner, 0).await?;
    let pages = first.window.count.min(MAX_PAGES);
    let rest = try_join_all((1..pages).map(|page| api.list_admins(owner, page))).await?;

    let mut admins = first.items;
    for page in rest {
        admins.extend(page.items);
    }
    Ok(admins)
}

// =============================================================================
// Handlers
// =============================================================================

/// Build the admins router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(BASE_PATH, get(index).post(create))
        .route("/dashboard/superadmin/export.csv", get(export))
        .route("/dashboard/superadmin/bulk", post(bulk))
        .route("/dashboard/superadmin/{id}/edit", get(edit))
        .route("/dashboard/superadmin/{id}", post(update))
}

/// Admins list, with the create form open when `?modal=create`.
///
/// GET /dashboard/superadmin
#[instrument(skip(state, store, ctx, query))]
async fn index(
    State(state): State<AppState>,
    store: SessionStore,
    RequireSuperAdmin(ctx): RequireSuperAdmin,
    Query(query): Query<TableQuery>,
) -> AdminsIndexTemplate {
    let api = state.api().bearer(Some(&ctx.token));
    let table_config = admins_table_config();

    let (page, load_error) = match fetch_page(api, ctx.super_admin_id(), query.page()).await {
        Ok(page) => (page, None),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load admins");
            (Page::empty(), Some(e.user_message()))
        }
    };

    let rows = apply_query(page.items, &query, &table_config)
        .iter()
        .map(AdminRow::from)
        .collect();
    let form_view = query
        .is_create_open()
        .then(|| AdminFormView::create(AdminForm::default()));

    AdminsIndexTemplate {
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

/// Create an admin.
///
/// POST /dashboard/superadmin
#[instrument(skip(state, store, ctx, form))]
async fn create(
    State(state): State<AppState>,
    store: SessionStore,
    RequireSuperAdmin(ctx): RequireSuperAdmin,
    Form(form): Form<AdminForm>,
) -> Result<Response, AppError> {
    let errors = form.validate(true);
    if !errors.is_empty() {
        let view = AdminFormView::create(form).with_errors(errors.messages().to_vec());
        return Ok((StatusCode::UNPROCESSABLE_ENTITY, AdminFormTemplate::new(&ctx, view)).into_response());
    }

    let mut payload = form.into_payload(ctx.super_admin_id());

    match state.api().bearer(Some(&ctx.token)).create_admin(&payload).await {
        Ok(_) => {
            tracing::info!(email = %payload.email, "Admin created");
            Ok(redirect_with_flash(&store, Flash::success("Admin created successfully"), BASE_PATH)
                .await?
                .into_response())
        }
        Err(e) => {
            tracing::warn!(error = %e, "Admin create rejected");
            payload.password = None;
            let view = AdminFormView::create(form_from_payload(payload))
                .with_errors(vec![e.user_message()]);
            Ok((StatusCode::BAD_GATEWAY, AdminFormTemplate::new(&ctx, view)).into_response())
        }
    }
}

/// Edit form for one admin.
///
/// GET /dashboard/superadmin/{id}/edit
#[instrument(skip(state, store, ctx))]
async fn edit(
    State(state): State<AppState>,
    store: SessionStore,
    RequireSuperAdmin(ctx): RequireSuperAdmin,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let id = AdminId::new(id);
    match state.api().bearer(Some(&ctx.token)).get_admin(&id).await {
        Ok(admin) => {
            let view = AdminFormView::edit(&id, AdminForm::from_admin(&admin));
            Ok(AdminFormTemplate::new(&ctx, view).into_response())
        }
        Err(e) => {
            tracing::warn!(error = %e, admin_id = %id, "Failed to load admin");
            Ok(redirect_with_flash(&store, Flash::error(e.user_message()), BASE_PATH)
                .await?
                .into_response())
        }
    }
}

/// Save an edited admin. A blank password leaves it unchanged.
///
/// POST /dashboard/superadmin/{id}
#[instrument(skip(state, store, ctx, form))]
async fn update(
    State(state): State<AppState>,
    store: SessionStore,
    RequireSuperAdmin(ctx): RequireSuperAdmin,
    Path(id): Path<String>,
    Form(form): Form<AdminForm>,
) -> Result<Response, AppError> {
    let id = AdminId::new(id);
    let errors = form.validate(false);
    if !errors.is_empty() {
        let view = AdminFormView::edit(&id, form).with_errors(errors.messages().to_vec());
        return Ok((StatusCode::UNPROCESSABLE_ENTITY, AdminFormTemplate::new(&ctx, view)).into_response());
    }

    let mut payload = form.into_payload(ctx.super_admin_id());
    match state.api().bearer(Some(&ctx.token)).update_admin(&id, &payload).await {
        Ok(_) => Ok(redirect_with_flash(&store, Flash::success("Admin updated successfully"), BASE_PATH)
            .await?
            .into_response()),
        Err(e) => {
            tracing::warn!(error = %e, admin_id = %id, "Admin update rejected");
            payload.password = None;
            let view = AdminFormView::edit(&id, form_from_payload(payload))
                .with_errors(vec![e.user_message()]);
            Ok((StatusCode::BAD_GATEWAY, AdminFormTemplate::new(&ctx, view)).into_response())
        }
    }
}

fn form_from_payload(payload: AdminPayload) -> AdminForm {
    AdminForm {
        full_name: payload.full_name,
        email: payload.email,
        password: None,
        address: payload.address,
        school_name: payload.school_name,
        contact: payload.contact,
        fee_message: payload.fee_message,
        school_state: payload.school_state,
        school_city: payload.school_city,
        admission_message: payload.admission_message,
        registration_message: payload.registration_message,
        pincode: payload.pincode,
    }
}

/// Current page as CSV, with the list's search, filters and sort applied.
///
/// GET /dashboard/superadmin/export.csv
#[instrument(skip(state, ctx, query))]
async fn export(
    State(state): State<AppState>,
    RequireSuperAdmin(ctx): RequireSuperAdmin,
    Query(query): Query<TableQuery>,
) -> Result<Response, AppError> {
    let api = state.api().bearer(Some(&ctx.token));
    let page = fetch_page(api, ctx.super_admin_id(), query.page()).await?;
    let admins = apply_query(page.items, &query, &admins_table_config());
    let csv = write_csv(&CSV_HEADERS, admins.iter().map(csv_row));

    Ok((
        StatusCode::OK,
        [
            ("Content-Type", "text/csv; charset=utf-8"),
            ("Content-Disposition", "attachment; filename=\"admins.csv\""),
        ],
        csv,
    )
        .into_response())
}

/// Activate, deactivate or delete the selected admins.
///
/// POST /dashboard/superadmin/bulk
#[instrument(skip(state, store, ctx, pairs))]
async fn bulk(
    State(state): State<AppState>,
    store: SessionStore,
    RequireSuperAdmin(ctx): RequireSuperAdmin,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Response, AppError> {
    let request = BulkRequest::from_pairs(pairs);
    let Some(op) = BulkOp::parse(&request.action) else {
        return Ok(redirect_with_flash(&store, Flash::error("Choose a bulk action"), BASE_PATH)
            .await?
            .into_response());
    };
    if request.ids.is_empty() {
        return Ok(redirect_with_flash(&store, Flash::error("Select at least one admin"), BASE_PATH)
            .await?
            .into_response());
    }
    if !request.confirmed {
        return Ok(op.confirm_page(&ctx, &request, "admins", BASE_PATH).into_response());
    }

    let api = state.api().bearer(Some(&ctx.token));
    let ids: Vec<AdminId> = request.ids.into_iter().map(AdminId::new).collect();
    let result = match op.status() {
        Some(status) => try_join_all(ids.iter().map(|id| api.set_admin_status(id, status)))
            .await
            .map(drop),
        None => try_join_all(ids.iter().map(|id| api.delete_admin(id)))
            .await
            .map(drop),
    };

    let flash = match result {
        Ok(()) => {
            tracing::info!(count = ids.len(), action = op.verb(), "Bulk admin update");
            Flash::success(format!("{} admin(s) {}", ids.len(), op.past_tense()))
        }
        Err(e) => {
            tracing::error!(error = %e, action = op.verb(), "Bulk admin update failed");
            Flash::error(BULK_FAILED)
        }
    };
    Ok(redirect_with_flash(&store, flash, BASE_PATH).await?.into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn admin(json: &str) -> Admin {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_validate_create_requires_email_password_school() {
        let errors = AdminForm::default().validate(true);
        assert_eq!(
            errors.messages(),
            ["Email is required", "Password is required", "School name is required"]
        );
    }

    #[test]
    fn test_validate_update_allows_blank_password() {
        let form = AdminForm {
            email: "a@b.com".to_string(),
            school_name: "Green Valley".to_string(),
            ..AdminForm::default()
        };
        assert!(form.validate(false).is_empty());
        assert!(!form.validate(true).is_empty());
    }

    #[test]
    fn test_blank_password_is_omitted_from_payload() {
        let form: AdminForm =
            decode_form("email=a%40b.com&school_name=GV&password=&full_name=Asha");
        assert!(form.password.is_none());
        let payload = form.into_payload(&SuperAdminId::new("s1"));
        let json = serde_json::to_value(&payload).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["superAdminId"], "s1");
        assert_eq!(json["fullName"], "Asha");
    }

    // Same decoding path axum's `Form` extractor uses.
    fn decode_form(body: &str) -> AdminForm {
        let map: serde_json::Map<String, serde_json::Value> =
            url::form_urlencoded::parse(body.as_bytes())
                .map(|(k, v)| (k.into_owned(), serde_json::Value::from(v.into_owned())))
                .collect();
        serde_json::from_value(serde_json::Value::Object(map)).unwrap()
    }

    #[test]
    fn test_edit_form_never_carries_password() {
        let a = admin(r#"{"_id":"a1","fullName":"Asha","email":"a@b.com","password":"secret"}"#);
        let form = AdminForm::from_admin(&a);
        assert!(form.password.is_none());
        assert!(!format!("{form:?}").contains("secret"));
    }

    #[test]
    fn test_csv_row_has_no_password_column() {
        let a = admin(
            r#"{"_id":"a1","fullName":"Asha, Rao","email":"a@b.com","schoolName":"GV",
                "contact":9845012345,"schoolCity":"Pune","schoolState":"MH","pincode":411001,
                "password":"secret","createdAt":"2024-03-05T10:00:00Z"}"#,
        );
        let csv = write_csv(&CSV_HEADERS, [csv_row(&a)]);
        assert_eq!(
            csv,
            "Full Name,Email,School,Contact,City,State,Pincode,Created Date\n\
             \"Asha, Rao\",a@b.com,GV,9845012345,Pune,MH,411001,05 Mar 2024\n"
        );
        assert!(!csv.contains("secret"));
    }

    #[test]
    fn test_table_row_search_and_filters() {
        let a = admin(r#"{"_id":"a1","fullName":"Asha","schoolCity":"Pune","status":"active"}"#);
        assert_eq!(a.search_fields()[0], "Asha");
        assert_eq!(a.filter_value("city").as_deref(), Some("Pune"));
        assert_eq!(a.filter_value("status").as_deref(), Some("active"));
        assert_eq!(a.sort_key("contact"), None);
    }

    #[test]
    fn test_row_view_links_to_edit() {
        let a = admin(r#"{"_id":"a1","fullName":"Asha"}"#);
        let row = AdminRow::from(&a);
        assert_eq!(row.edit_href, "/dashboard/superadmin/a1/edit");
        assert_eq!(row.created, "-");
        assert_eq!(row.status, "-");
    }
}
