//! End-to-end test support for the DVS super-admin console.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p dvs-integration-tests
//! ```
//!
//! Nothing external is needed. [`MockApi`] stands in for the remote
//! school-management API on a loopback port, and [`ConsoleHarness`] serves
//! the real console router against it. Each test gets its own pair, so
//! tests never share sessions or records.
//!
//! The mock keeps every request it receives (method, path, query and the
//! `Authorization` header) so tests can assert on what the console sent,
//! or that it sent nothing at all. Ids listed in [`MockState::failing_ids`]
//! make the status, delete and broadcast endpoints answer `500`.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post, put},
};
use dvs_console::config::ConsoleConfig;
use dvs_console::state::AppState;
use serde::Deserialize;
use serde_json::{Value, json};

/// Credentials the mock API accepts.
pub const LOGIN_EMAIL: &str = "a@b.com";
pub const LOGIN_PASSWORD: &str = "x";

/// Token and super admin id issued on a successful mock login.
pub const TOKEN: &str = "t1";
pub const SUPER_ADMIN_ID: &str = "s1";

/// Email the mock API refuses to register twice.
pub const TAKEN_EMAIL: &str = "taken@school.in";

const PAGE_SIZE: usize = 10;

// =============================================================================
// Mock API
// =============================================================================

/// A request as seen by the mock API.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
}

/// One part of a multipart body received by the mock.
#[derive(Debug, Clone)]
pub struct UploadedPart {
    pub name: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl UploadedPart {
    /// The body as text, for non-file parts.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Records held by the mock API.
#[derive(Debug, Default)]
pub struct MockState {
    pub admins: Vec<Value>,
    pub third_party: Vec<Value>,
    pub alerts: Vec<Value>,
    pub requests: Vec<RecordedRequest>,
    /// JSON bodies received by `updateAdmin`, in order.
    pub admin_updates: Vec<Value>,
    /// Multipart bodies received by `createThirdParty`, in order.
    pub third_party_uploads: Vec<Vec<UploadedPart>>,
    /// Record ids whose status, delete and broadcast calls fail.
    pub failing_ids: Vec<String>,
    /// Answer alert creation with `{ "success": true }` only.
    pub omit_created_alert: bool,
}

type SharedState = Arc<Mutex<MockState>>;

/// In-process stand-in for the remote school-management API.
#[derive(Clone)]
pub struct MockApi {
    addr: SocketAddr,
    state: SharedState,
}

impl MockApi {
    /// Start the mock on an ephemeral loopback port.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn start() -> Self {
        let state = SharedState::default();
        let api = Router::new()
            .route("/superAdmin/loginSuperAdmin", post(login))
            .route("/superAdmin/getAdmins/{owner}", get(list_admins))
            .route("/superAdmin/getAdmin/{id}", get(get_admin))
            .route("/superAdmin/createAdmin", post(create_admin))
            .route("/superAdmin/updateAdmin/{id}", put(update_admin))
            .route("/superAdmin/updateAdminStatus/{id}", patch(set_admin_status))
            .route("/superAdmin/deleteAdmin/{id}", delete(delete_admin))
            .route("/superAdmin/thirdparty/{owner}", get(list_third_party))
            .route("/superAdmin/createThirdParty", post(create_third_party))
            .route("/alerts", get(list_alerts).post(create_alert))
            .route("/alerts/{id}", delete(delete_alert))
            .route("/alerts/{id}/toggle", patch(toggle_alert))
            .route("/alerts/{id}/broadcast", post(broadcast_alert));
        let app = Router::new()
            .nest("/api/v1", api)
            .layer(middleware::from_fn_with_state(state.clone(), record))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock API");
        let addr = listener.local_addr().expect("Mock API has no address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Mock API failed");
        });

        Self { addr, state }
    }

    /// Origin the console should be pointed at.
    #[must_use]
    pub fn origin(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Lock the mock's records for inspection or seeding.
    ///
    /// # Panics
    ///
    /// Panics if a handler panicked while holding the lock.
    pub fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().expect("Mock state poisoned")
    }

    /// Add `count` admins owned by the signed-in super admin, named
    /// `Admin 01`, `Admin 02`, ...
    pub fn seed_admins(&self, count: usize) {
        let mut state = self.state();
        for n in 1..=count {
            let admin = admin_json(&format!("Admin {n:02}"), &format!("admin{n}@school.in"));
            push_admin(&mut state, admin);
        }
    }

    /// Add one admin with the given name.
    pub fn seed_admin(&self, full_name: &str, email: &str) {
        push_admin(&mut self.state(), admin_json(full_name, email));
    }

    /// Add one third-party user owned by the signed-in super admin,
    /// assigned to a single school.
    pub fn seed_third_party(&self, name: &str, email: &str, school_name: &str) {
        let mut state = self.state();
        let id = format!("t{}", state.third_party.len() + 1);
        state.third_party.push(json!({
            "_id": id,
            "name": name,
            "email": email,
            "superAdminId": SUPER_ADMIN_ID,
            "assignedSchools": [{ "schoolId": format!("sc-{id}"), "schoolName": school_name }],
            "status": "active",
            "createdAt": "2026-03-10T09:00:00Z"
        }));
    }

    /// Add `count` third-party users named `Partner 01`, `Partner 02`, ...
    pub fn seed_third_parties(&self, count: usize) {
        for n in 1..=count {
            self.seed_third_party(
                &format!("Partner {n:02}"),
                &format!("partner{n}@vendor.in"),
                "Green Valley School",
            );
        }
    }

    /// Make status, delete and broadcast calls for `id` fail.
    pub fn fail_on(&self, id: &str) {
        self.state().failing_ids.push(id.to_string());
    }

    /// Add an alert record as-is.
    pub fn seed_alert(&self, alert: Value) {
        self.state().alerts.push(alert);
    }

    /// Requests whose path ends with `suffix`.
    #[must_use]
    pub fn requests_to(&self, suffix: &str) -> Vec<RecordedRequest> {
        self.state()
            .requests
            .iter()
            .filter(|r| r.path.ends_with(suffix))
            .cloned()
            .collect()
    }

    /// Number of requests received so far.
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.state().requests.len()
    }
}

fn admin_json(full_name: &str, email: &str) -> Value {
    json!({
        "fullName": full_name,
        "email": email,
        "schoolName": format!("{full_name} School"),
        "schoolCity": "Pune",
        "schoolState": "Maharashtra",
        "contact": 9_876_543_210_u64,
        "pincode": 411_001,
        "superAdminId": SUPER_ADMIN_ID,
        "status": "active",
        "createdAt": "2026-01-15T10:00:00Z"
    })
}

fn push_admin(state: &mut MockState, mut admin: Value) -> Value {
    admin["_id"] = json!(format!("a{}", state.admins.len() + 1));
    state.admins.push(admin.clone());
    admin
}

async fn record(State(state): State<SharedState>, request: Request, next: Next) -> Response {
    let recorded = RecordedRequest {
        method: request.method().to_string(),
        path: request.uri().path().to_string(),
        query: request.uri().query().map(str::to_string),
        authorization: request
            .headers()
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    };
    state.lock().expect("Mock state poisoned").requests.push(recorded);
    next.run(request).await
}

async fn login(Json(body): Json<Value>) -> Response {
    if body["email"] == LOGIN_EMAIL && body["password"] == LOGIN_PASSWORD {
        Json(json!({
            "success": true,
            "token": TOKEN,
            "superAdmin": {
                "superAdminId": SUPER_ADMIN_ID,
                "name": "Asha Rao",
                "email": LOGIN_EMAIL
            }
        }))
        .into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "success": false, "message": "Wrong password for a@b.com" })),
        )
            .into_response()
    }
}

#[derive(Deserialize)]
struct PageQuery {
    #[serde(default)]
    page: usize,
}

async fn list_admins(
    State(state): State<SharedState>,
    Path(owner): Path<String>,
    Query(query): Query<PageQuery>,
) -> Json<Value> {
    let state = state.lock().expect("Mock state poisoned");
    let owned: Vec<&Value> = state
        .admins
        .iter()
        .filter(|a| a["superAdminId"] == owner.as_str())
        .collect();
    let rows: Vec<&Value> = owned
        .iter()
        .skip(query.page * PAGE_SIZE)
        .take(PAGE_SIZE)
        .copied()
        .collect();
    Json(json!({
        "success": true,
        "admins": rows,
        "totalAdmins": owned.len(),
        "totalPages": owned.len().div_ceil(PAGE_SIZE)
    }))
}

async fn create_admin(State(state): State<SharedState>, Json(mut body): Json<Value>) -> Response {
    let mut state = state.lock().expect("Mock state poisoned");
    if body["email"] == TAKEN_EMAIL {
        return (
            StatusCode::CONFLICT,
            Json(json!({ "success": false, "message": "Email already registered" })),
        )
            .into_response();
    }
    if let Some(fields) = body.as_object_mut() {
        fields.remove("password");
    }
    let admin = push_admin(&mut state, body);
    Json(json!({ "success": true, "admin": admin })).into_response()
}

fn not_found(what: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "success": false, "message": format!("{what} not found") })),
    )
        .into_response()
}

fn server_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "success": false, "message": "Database unavailable" })),
    )
        .into_response()
}

async fn get_admin(State(state): State<SharedState>, Path(id): Path<String>) -> Response {
    let state = state.lock().expect("Mock state poisoned");
    match state.admins.iter().find(|a| a["_id"] == id.as_str()) {
        Some(admin) => Json(json!({ "success": true, "admin": admin })).into_response(),
        None => not_found("Admin"),
    }
}

async fn update_admin(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let mut state = state.lock().expect("Mock state poisoned");
    state.admin_updates.push(body.clone());
    let Some(admin) = state.admins.iter_mut().find(|a| a["_id"] == id.as_str()) else {
        return not_found("Admin");
    };
    if let Some(fields) = body.as_object() {
        for (key, value) in fields {
            if key != "password" && !value.is_null() {
                admin[key.as_str()] = value.clone();
            }
        }
    }
    Json(json!({ "success": true, "admin": admin.clone() })).into_response()
}

async fn set_admin_status(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let mut state = state.lock().expect("Mock state poisoned");
    if state.failing_ids.contains(&id) {
        return server_error();
    }
    let Some(admin) = state.admins.iter_mut().find(|a| a["_id"] == id.as_str()) else {
        return not_found("Admin");
    };
    admin["status"] = body["status"].clone();
    Json(json!({ "success": true })).into_response()
}

async fn delete_admin(State(state): State<SharedState>, Path(id): Path<String>) -> Response {
    let mut state = state.lock().expect("Mock state poisoned");
    if state.failing_ids.contains(&id) {
        return server_error();
    }
    let before = state.admins.len();
    state.admins.retain(|a| a["_id"] != id.as_str());
    if state.admins.len() == before {
        return not_found("Admin");
    }
    Json(json!({ "success": true })).into_response()
}

/// The real endpoint returns every user at once and ignores `page`.
async fn list_third_party(State(state): State<SharedState>, Path(owner): Path<String>) -> Json<Value> {
    let state = state.lock().expect("Mock state poisoned");
    let owned: Vec<&Value> = state
        .third_party
        .iter()
        .filter(|u| u["superAdminId"] == owner.as_str())
        .collect();
    Json(json!({ "success": true, "thirdPartyUsers": owned }))
}

async fn create_third_party(State(state): State<SharedState>, mut multipart: Multipart) -> Response {
    let mut parts = Vec::new();
    while let Some(field) = multipart.next_field().await.expect("Malformed multipart body") {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let body = field.bytes().await.expect("Unreadable multipart part").to_vec();
        parts.push(UploadedPart {
            name,
            file_name,
            content_type,
            body,
        });
    }

    let text = |name: &str| {
        parts
            .iter()
            .find(|p| p.name == name)
            .map(UploadedPart::text)
            .unwrap_or_default()
    };
    let schools: Value = serde_json::from_str(&text("assignedSchools")).unwrap_or(Value::Null);
    let image = parts
        .iter()
        .find(|p| p.name == "image")
        .and_then(|p| p.file_name.clone())
        .map(|file| json!({ "url": format!("/uploads/{file}") }));

    let mut state = state.lock().expect("Mock state poisoned");
    let user = json!({
        "_id": format!("t{}", state.third_party.len() + 1),
        "name": text("name"),
        "email": text("email"),
        "superAdminId": text("superAdminId"),
        "assignedSchools": schools,
        "image": image,
        "status": "active",
        "createdAt": "2026-03-10T09:00:00Z"
    });
    state.third_party.push(user);
    state.third_party_uploads.push(parts);
    (StatusCode::CREATED, Json(json!({ "success": true }))).into_response()
}

async fn list_alerts(State(state): State<SharedState>) -> Json<Value> {
    let state = state.lock().expect("Mock state poisoned");
    Json(json!({ "success": true, "alerts": state.alerts }))
}

async fn create_alert(State(state): State<SharedState>, Json(mut body): Json<Value>) -> Response {
    let mut state = state.lock().expect("Mock state poisoned");
    body["_id"] = json!(format!("al-{}", state.alerts.len() + 1));
    body["createdAt"] = json!("2026-02-01T08:30:00Z");
    state.alerts.push(body.clone());
    if state.omit_created_alert {
        return (StatusCode::CREATED, Json(json!({ "success": true }))).into_response();
    }
    (StatusCode::CREATED, Json(json!({ "success": true, "alert": body }))).into_response()
}

async fn delete_alert(State(state): State<SharedState>, Path(id): Path<String>) -> Response {
    let mut state = state.lock().expect("Mock state poisoned");
    let before = state.alerts.len();
    state.alerts.retain(|a| a["_id"] != id.as_str());
    if state.alerts.len() == before {
        return not_found("Alert");
    }
    Json(json!({ "success": true })).into_response()
}

async fn toggle_alert(State(state): State<SharedState>, Path(id): Path<String>) -> Response {
    let mut state = state.lock().expect("Mock state poisoned");
    let Some(alert) = state.alerts.iter_mut().find(|a| a["_id"] == id.as_str()) else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "success": false, "message": "Alert not found" })),
        )
            .into_response();
    };
    let active = alert["isActive"].as_bool().unwrap_or(true);
    alert["isActive"] = json!(!active);
    Json(json!({ "success": true, "alert": alert.clone() })).into_response()
}

async fn broadcast_alert(State(state): State<SharedState>, Path(id): Path<String>) -> Response {
    if state.lock().expect("Mock state poisoned").failing_ids.contains(&id) {
        return server_error();
    }
    Json(json!({ "success": true })).into_response()
}

// =============================================================================
// Console harness
// =============================================================================

/// A console served on a loopback port, backed by its own [`MockApi`].
pub struct ConsoleHarness {
    pub api: MockApi,
    pub client: reqwest::Client,
    base_url: String,
}

impl ConsoleHarness {
    /// Start a mock API and a console pointed at it.
    ///
    /// The client keeps cookies (the session) and does not follow
    /// redirects, so tests see every `303` the console answers with.
    ///
    /// # Panics
    ///
    /// Panics if either server fails to start.
    pub async fn start() -> Self {
        let api = MockApi::start().await;
        let config =
            ConsoleConfig::for_api_origin(&api.origin()).expect("Invalid mock API origin");
        let state = AppState::new(config).expect("Failed to create application state");
        let app = dvs_console::app(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind console");
        let addr = listener.local_addr().expect("Console has no address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Console failed");
        });

        let client = reqwest::Client::builder()
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .expect("Failed to create HTTP client");

        Self {
            api,
            client,
            base_url: format!("http://{addr}"),
        }
    }

    /// Absolute console URL for `path`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Submit the login form.
    ///
    /// # Panics
    ///
    /// Panics if the console cannot be reached.
    pub async fn login_as(&self, email: &str, password: &str) -> reqwest::Response {
        self.client
            .post(self.url("/login"))
            .form(&[("email", email), ("password", password)])
            .send()
            .await
            .expect("Login request failed")
    }

    /// Sign in with the credentials the mock accepts.
    ///
    /// # Panics
    ///
    /// Panics if the login is not accepted.
    pub async fn login(&self) {
        let response = self.login_as(LOGIN_EMAIL, LOGIN_PASSWORD).await;
        assert_eq!(response.status(), reqwest::StatusCode::SEE_OTHER);
    }

    /// GET `path`, returning the status and body.
    ///
    /// # Panics
    ///
    /// Panics if the console cannot be reached.
    pub async fn get(&self, path: &str) -> (reqwest::StatusCode, String) {
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("GET request failed");
        let status = response.status();
        (status, response.text().await.expect("Failed to read body"))
    }

    /// POST a form to `path`.
    ///
    /// # Panics
    ///
    /// Panics if the console cannot be reached.
    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .form(form)
            .send()
            .await
            .expect("POST request failed")
    }

    /// POST a multipart form to `path`.
    ///
    /// # Panics
    ///
    /// Panics if the console cannot be reached.
    pub async fn post_multipart(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .multipart(form)
            .send()
            .await
            .expect("Multipart POST failed")
    }
}

/// Value of the `Location` header of a redirect.
#[must_use]
pub fn location(response: &reqwest::Response) -> Option<String> {
    response
        .headers()
        .get(reqwest::header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Number of table rows on a rendered list page.
#[must_use]
pub fn row_count(html: &str) -> usize {
    html.matches("name=\"page_ids\"").count()
}
