//! Third-party user route handlers.
//!
//! Creation is a multipart form so a profile image can travel with it.

use std::borrow::Cow;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::{Multipart, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use dvs_core::{SchoolId, ThirdPartyId};
use futures::future::try_join_all;
use secrecy::SecretString;
use tracing::instrument;

use super::admins;
use super::views::{
    BULK_FAILED, BulkOp, BulkRequest, FieldErrors, OperatorView, PagerView, redirect_with_flash,
};
use crate::api::{Admin, AssignedSchool, ImageUpload, Page, ThirdPartyPayload, ThirdPartyUser};
use crate::components::data_table::{
    DataTableConfig, SortKey, TableQuery, TableRow, apply_query, format_date,
    third_party_table_config, write_csv,
};
use crate::error::AppError;
use crate::filters;
use crate::middleware::{RequireSuperAdmin, SessionStore};
use crate::models::{Flash, SessionContext};
use crate::state::AppState;

const BASE_PATH: &str = "/dashboard/thirdparty";

/// Column headers of the third-party CSV export.
pub const CSV_HEADERS: [&str; 4] = ["Name", "Email", "Assigned Schools", "Created Date"];

/// One CSV record for `user`, in [`CSV_HEADERS`] order.
#[must_use]
pub fn csv_row(user: &ThirdPartyUser) -> Vec<String> {
    vec![
        user.name.clone(),
        user.email.clone(),
        user.school_names(),
        format_date(user.created_at.as_ref()),
    ]
}

impl TableRow for ThirdPartyUser {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str(), self.email.as_str()];
        fields.extend(self.assigned_schools.iter().map(|s| s.school_name.as_str()));
        fields
    }

    fn filter_value(&self, key: &str) -> Option<Cow<'_, str>> {
        match key {
            "status" => self.status.map(|s| Cow::Borrowed(s.as_str())),
            _ => None,
        }
    }

    fn sort_key(&self, column: &str) -> Option<SortKey> {
        match column {
            "name" => SortKey::text(&self.name),
            "email" => SortKey::text(&self.email),
            "created_at" => self.created_at.map(SortKey::Date),
            _ => None,
        }
    }
}

// =============================================================================
// View models
// =============================================================================

/// Third-party row for the list template.
#[derive(Debug, Clone)]
pub struct ThirdPartyRow {
    pub id: String,
    pub name: String,
    pub email: String,
    pub schools: String,
    pub created: String,
    pub status: &'static str,
    pub image_url: Option<String>,
}

impl From<&ThirdPartyUser> for ThirdPartyRow {
    fn from(user: &ThirdPartyUser) -> Self {
        Self {
            id: user.id.to_string(),
            name: user.name.clone(),
            email: user.email.clone(),
            schools: user.school_names(),
            created: format_date(user.created_at.as_ref()),
            status: user.status.map_or("-", |s| s.label()),
            image_url: user.image.as_ref().map(|i| i.url.clone()),
        }
    }
}

/// A checkbox in the school picker. The value encodes `id|name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchoolOption {
    pub value: String,
    pub label: String,
    pub checked: bool,
}

impl SchoolOption {
    fn from_school(school: &AssignedSchool, checked: bool) -> Self {
        Self {
            value: format!("{}|{}", school.school_id, school.school_name),
            label: school.school_name.clone(),
            checked,
        }
    }
}

/// Picker options for every school the operator's admins run.
#[must_use]
pub fn school_options(admins: &[Admin]) -> Vec<SchoolOption> {
    let mut options: Vec<SchoolOption> = admins
        .iter()
        .filter(|a| !a.school_name.trim().is_empty())
        .map(|a| {
            SchoolOption::from_school(
                &AssignedSchool {
                    school_id: SchoolId::new(a.school_option_value()),
                    school_name: a.school_name.clone(),
                },
                false,
            )
        })
        .collect();
    options.sort_by(|a, b| a.label.to_lowercase().cmp(&b.label.to_lowercase()));
    options.dedup_by(|a, b| a.value == b.value);
    options
}

/// Parse a picker value back into a school.
#[must_use]
pub fn parse_school(value: &str) -> Option<AssignedSchool> {
    let (id, name) = value.split_once('|')?;
    let id = id.trim();
    (!id.is_empty()).then(|| AssignedSchool {
        school_id: SchoolId::new(id),
        school_name: name.trim().to_string(),
    })
}

/// Create form body, collected from multipart fields.
#[derive(Debug, Default)]
pub struct ThirdPartyForm {
    pub name: String,
    pub email: String,
    pub password: Option<SecretString>,
    pub schools: Vec<AssignedSchool>,
    pub image: Option<ImageUpload>,
}

impl ThirdPartyForm {
    /// Record a text field.
    pub fn set(&mut self, field: &str, value: String) {
        match field {
            "name" => self.name = value,
            "email" => self.email = value,
            "password" if !value.is_empty() => self.password = Some(SecretString::from(value)),
            "schools" => {
                if let Some(school) = parse_school(&value) {
                    if !self.schools.contains(&school) {
                        self.schools.push(school);
                    }
                }
            }
            _ => {}
        }
    }

    /// Read a submitted multipart body.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` if the body is not valid multipart.
    pub async fn read(mut multipart: Multipart) -> Result<Self, AppError> {
        let bad = |e: axum::extract::multipart::MultipartError| AppError::BadRequest(e.body_text());
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await.map_err(bad)? {
            let name = field.name().unwrap_or_default().to_string();
            if name == "image" {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field.bytes().await.map_err(bad)?;
                if !file_name.is_empty() && !bytes.is_empty() {
                    form.image = Some(ImageUpload {
                        file_name,
                        content_type,
                        bytes: bytes.to_vec(),
                    });
                }
            } else {
                let value = field.text().await.map_err(bad)?;
                form.set(&name, value);
            }
        }
        Ok(form)
    }

    #[must_use]
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::default();
        errors.require(&self.name, "Name is required");
        errors.require(&self.email, "Email is required");
        errors.require_secret(self.password.as_ref(), "Password is required");
        errors
    }
}

/// Everything the shared form partial needs. Never holds the password.
#[derive(Debug, Default)]
pub struct ThirdPartyFormView {
    pub name: String,
    pub email: String,
    pub schools: Vec<SchoolOption>,
    pub errors: Vec<String>,
}

impl ThirdPartyFormView {
    /// A blank form offering `options`.
    #[must_use]
    pub fn blank(schools: Vec<SchoolOption>) -> Self {
        Self {
            schools,
            ..Self::default()
        }
    }

    /// Redisplay a submitted form. Only the schools that were ticked are
    /// offered again, so no fetch is needed.
    #[must_use]
    pub fn resubmit(form: &ThirdPartyForm, errors: Vec<String>) -> Self {
        Self {
            name: form.name.clone(),
            email: form.email.clone(),
            schools: form
                .schools
                .iter()
                .map(|s| SchoolOption::from_school(s, true))
                .collect(),
            errors,
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Third-party users list template.
#[derive(Template, WebTemplate)]
#[template(path = "third_party/index.html")]
pub struct ThirdPartyIndexTemplate {
    pub operator: OperatorView,
    pub current_path: String,
    pub flashes: Vec<Flash>,
    pub table_config: DataTableConfig,
    pub query: TableQuery,
    pub rows: Vec<ThirdPartyRow>,
    pub pager: PagerView,
    pub load_error: Option<String>,
    pub form_view: Option<ThirdPartyFormView>,
}

/// Standalone create form, shown when a submission fails.
#[derive(Template, WebTemplate)]
#[template(path = "third_party/form.html")]
pub struct ThirdPartyFormTemplate {
    pub operator: OperatorView,
    pub current_path: String,
    pub flashes: Vec<Flash>,
    pub form_view: ThirdPartyFormView,
}

impl ThirdPartyFormTemplate {
    fn new(ctx: &SessionContext, form_view: ThirdPartyFormView) -> Self {
        Self {
            operator: OperatorView::from(ctx),
            current_path: BASE_PATH.to_string(),
            flashes: Vec::new(),
            form_view,
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Build the third-party router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(BASE_PATH, get(index).post(create))
        .route("/dashboard/thirdparty/export.csv", get(export))
        .route("/dashboard/thirdparty/bulk", post(bulk))
}

/// Third-party users list, with the create form open when `?modal=create`.
///
/// GET /dashboard/thirdparty
#[instrument(skip(state, store, ctx, query))]
async fn index(
    State(state): State<AppState>,
    store: SessionStore,
    RequireSuperAdmin(ctx): RequireSuperAdmin,
    Query(query): Query<TableQuery>,
) -> ThirdPartyIndexTemplate {
    let api = state.api().bearer(Some(&ctx.token));
    let owner = ctx.super_admin_id();
    let table_config = third_party_table_config();

    let (users, load_error) = match api.list_third_party(owner).await {
        Ok(users) => (users, None),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load third-party users");
            (Vec::new(), Some(e.user_message()))
        }
    };

    let form_view = if query.is_create_open() {
        let options = match admins::fetch_all(api, owner).await {
            Ok(all) => school_options(&all),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load schools for picker");
                Vec::new()
            }
        };
        Some(ThirdPartyFormView::blank(options))
    } else {
        None
    };

    let page = Page::slice(apply_query(users, &query, &table_config), query.page());
    let rows = page.items.iter().map(ThirdPartyRow::from).collect();

    ThirdPartyIndexTemplate {
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

/// Create a third-party user.
///
/// POST /dashboard/thirdparty
#[instrument(skip(state, store, ctx, multipart))]
async fn create(
    State(state): State<AppState>,
    store: SessionStore,
    RequireSuperAdmin(ctx): RequireSuperAdmin,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let mut form = ThirdPartyForm::read(multipart).await?;
    let errors = form.validate();
    let Some(password) = form.password.take().filter(|_| errors.is_empty()) else {
        let view = ThirdPartyFormView::resubmit(&form, errors.messages().to_vec());
        return Ok((
            StatusCode::UNPROCESSABLE_ENTITY,
            ThirdPartyFormTemplate::new(&ctx, view),
        )
            .into_response());
    };

    let payload = ThirdPartyPayload {
        name: form.name.trim().to_string(),
        email: form.email.trim().to_string(),
        password,
        super_admin_id: ctx.super_admin_id().clone(),
        assigned_schools: form.schools.clone(),
        image: form.image.take(),
    };

    match state
        .api()
        .bearer(Some(&ctx.token))
        .create_third_party(payload)
        .await
    {
        Ok(()) => {
            tracing::info!(email = %form.email, "Third-party user created");
            Ok(redirect_with_flash(
                &store,
                Flash::success("Third-party user created successfully"),
                BASE_PATH,
            )
            .await?
            .into_response())
        }
        Err(e) => {
            tracing::warn!(error = %e, "Third-party create rejected");
            let view = ThirdPartyFormView::resubmit(&form, vec![e.user_message()]);
            Ok((StatusCode::BAD_GATEWAY, ThirdPartyFormTemplate::new(&ctx, view)).into_response())
        }
    }
}

/// Current page as CSV, with the list's search, filters and sort applied.
///
/// GET /dashboard/thirdparty/export.csv
#[instrument(skip(state, ctx, query))]
async fn export(
    State(state): State<AppState>,
    RequireSuperAdmin(ctx): RequireSuperAdmin,
    Query(query): Query<TableQuery>,
) -> Result<Response, AppError> {
    let api = state.api().bearer(Some(&ctx.token));
    let users = api.list_third_party(ctx.super_admin_id()).await?;
    let page = Page::slice(
        apply_query(users, &query, &third_party_table_config()),
        query.page(),
    );
    let csv = write_csv(&CSV_HEADERS, page.items.iter().map(csv_row));

    Ok((
        StatusCode::OK,
        [
            ("Content-Type", "text/csv; charset=utf-8"),
            (
                "Content-Disposition",
                "attachment; filename=\"third_party_users.csv\"",
            ),
        ],
        csv,
    )
        .into_response())
}

/// Activate, deactivate or delete the selected third-party users.
///
/// POST /dashboard/thirdparty/bulk
#[instrument(skip(state, store, ctx, pairs))]
async fn bulk(
    State(state): State<AppState>,
    store: SessionStore,
    RequireSuperAdmin(ctx): RequireSuperAdmin,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Response, AppError> {
    let request = BulkRequest::from_pairs(pairs);
    let Some(op) = BulkOp::parse(&request.action) else {
        return Ok(
            redirect_with_flash(&store, Flash::error("Choose a bulk action"), BASE_PATH)
                .await?
                .into_response(),
        );
    };
    if request.ids.is_empty() {
        return Ok(
            redirect_with_flash(&store, Flash::error("Select at least one user"), BASE_PATH)
                .await?
                .into_response(),
        );
    }
    if !request.confirmed {
        return Ok(op
            .confirm_page(&ctx, &request, "third-party users", BASE_PATH)
            .into_response());
    }

    let api = state.api().bearer(Some(&ctx.token));
    let ids: Vec<ThirdPartyId> = request.ids.into_iter().map(ThirdPartyId::new).collect();
    let result = match op.status() {
        Some(status) => try_join_all(ids.iter().map(|id| api.set_third_party_status(id, status)))
            .await
            .map(drop),
        None => try_join_all(ids.iter().map(|id| api.delete_third_party(id)))
            .await
            .map(drop),
    };

    let flash = match result {
        Ok(()) => Flash::success(format!(
            "{} third-party user(s) {}",
            ids.len(),
            op.past_tense()
        )),
        Err(e) => {
            tracing::error!(error = %e, action = op.verb(), "Bulk third-party update failed");
            Flash::error(BULK_FAILED)
        }
    };
    Ok(redirect_with_flash(&store, flash, BASE_PATH)
        .await?
        .into_response())
}
