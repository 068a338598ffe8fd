//! Response schemas for the remote API.
//!
//! The API is loosely typed: ids arrive as `_id` or `id`, numeric fields
//! (contact, pincode) arrive as strings or numbers, and optional fields may
//! be missing entirely. Each entity is deserialized through a `Raw*` shape
//! and normalized once here so the rest of the console sees plain fields.
//!
//! Credential fields are never read from responses.

use chrono::{DateTime, Utc};
use dvs_core::{
    AccountStatus, AdminId, AlertId, AlertPriority, AlertType, PAGE_SIZE, PageWindow, SchoolId,
    SuperAdminId, TargetAudience, ThirdPartyId, page_count,
};
use secrecy::SecretString;
use serde::{Deserialize, Deserializer, Serialize};

// =============================================================================
// Lenient field helpers
// =============================================================================

/// A scalar that may be a string, a number or a bool on the wire.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl Scalar {
    fn into_string(self) -> String {
        match self {
            Self::Text(s) => s,
            Self::Int(n) => n.to_string(),
            Self::Float(n) => n.to_string(),
            Self::Bool(b) => b.to_string(),
        }
    }
}

/// Deserialize an optional scalar into a `String`, empty when absent or null.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Scalar>::deserialize(deserializer)?
        .map(Scalar::into_string)
        .unwrap_or_default())
}

/// Move a token straight into a [`SecretString`].
fn secret_string<'de, D>(deserializer: D) -> Result<SecretString, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(SecretString::from)
}

/// Parse an RFC 3339 timestamp, dropping anything unparseable.
fn parse_timestamp(value: Option<String>) -> Option<DateTime<Utc>> {
    value
        .as_deref()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

/// Parse a wire enum, falling back to its default for unknown values.
fn parse_or_default<T>(value: Option<&str>) -> T
where
    T: std::str::FromStr + Default,
{
    value.and_then(|v| v.parse().ok()).unwrap_or_default()
}

/// `_id` wins over `id` when both are present.
fn pick_id(underscore: Option<String>, plain: Option<String>) -> String {
    underscore
        .filter(|s| !s.trim().is_empty())
        .or(plain)
        .unwrap_or_default()
}

/// Profile images are `{ "url": "..." }` objects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    #[serde(default)]
    pub url: String,
}

// =============================================================================
// Super admin / login
// =============================================================================

/// Identity of the signed-in operator, as returned by the login endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawSuperAdmin", rename_all = "camelCase")]
pub struct SuperAdminProfile {
    pub super_admin_id: SuperAdminId,
    pub name: Option<String>,
    pub email: Option<String>,
}

impl SuperAdminProfile {
    /// Name to greet the operator with.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or("Super Admin")
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSuperAdmin {
    #[serde(default)]
    super_admin_id: Option<String>,
    #[serde(default, rename = "_id")]
    underscore_id: Option<String>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    full_name: Option<String>,
    #[serde(default)]
    email: Option<String>,
}

impl From<RawSuperAdmin> for SuperAdminProfile {
    fn from(raw: RawSuperAdmin) -> Self {
        let id = raw
            .super_admin_id
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| pick_id(raw.underscore_id, raw.id));
        Self {
            super_admin_id: SuperAdminId::new(id),
            name: raw.name.or(raw.full_name),
            email: raw.email,
        }
    }
}

/// Successful login: bearer token plus operator profile.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    #[serde(deserialize_with = "secret_string")]
    pub token: SecretString,
    pub super_admin: SuperAdminProfile,
}

// =============================================================================
// Admins
// =============================================================================

/// A school administrator managed by the super admin.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "RawAdmin")]
pub struct Admin {
    pub id: AdminId,
    pub full_name: String,
    pub email: String,
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
    pub status: Option<AccountStatus>,
    pub created_at: Option<DateTime<Utc>>,
    pub image: Option<ImageRef>,
    pub school_id: Option<SchoolId>,
}

impl Admin {
    /// Value offered when assigning this admin's school to a third-party
    /// user: the school id when known, the admin id otherwise.
    #[must_use]
    pub fn school_option_value(&self) -> &str {
        self.school_id
            .as_ref()
            .filter(|id| !id.is_empty())
            .map_or_else(|| self.id.as_str(), SchoolId::as_str)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAdmin {
    #[serde(default, rename = "_id")]
    underscore_id: Option<String>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    full_name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    email: String,
    #[serde(default, deserialize_with = "lenient_string")]
    address: String,
    #[serde(default, deserialize_with = "lenient_string")]
    school_name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    contact: String,
    #[serde(default, deserialize_with = "lenient_string")]
    fee_message: String,
    #[serde(default, deserialize_with = "lenient_string")]
    school_state: String,
    #[serde(default, deserialize_with = "lenient_string")]
    school_city: String,
    #[serde(default, deserialize_with = "lenient_string")]
    admission_message: String,
    #[serde(default, deserialize_with = "lenient_string")]
    registration_message: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pincode: String,
    #[serde(default, deserialize_with = "lenient_string")]
    super_admin_id: String,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    image: Option<ImageRef>,
    #[serde(default, deserialize_with = "lenient_string")]
    school_id: String,
}

impl From<RawAdmin> for Admin {
    fn from(raw: RawAdmin) -> Self {
        Self {
            id: AdminId::new(pick_id(raw.underscore_id, raw.id)),
            full_name: raw.full_name,
            email: raw.email,
            address: raw.address,
            school_name: raw.school_name,
            contact: raw.contact,
            fee_message: raw.fee_message,
            school_state: raw.school_state,
            school_city: raw.school_city,
            admission_message: raw.admission_message,
            registration_message: raw.registration_message,
            pincode: raw.pincode,
            super_admin_id: SuperAdminId::new(raw.super_admin_id),
            status: raw.status.as_deref().and_then(|s| s.parse().ok()),
            created_at: parse_timestamp(raw.created_at),
            image: raw.image.filter(|i| !i.url.is_empty()),
            school_id: Some(SchoolId::new(raw.school_id)).filter(|id| !id.is_empty()),
        }
    }
}

/// `GET superAdmin/getAdmins/{id}` body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AdminListBody {
    #[serde(default)]
    pub admins: Vec<Admin>,
    #[serde(default)]
    pub total_admins: Option<usize>,
    #[serde(default)]
    pub total_pages: Option<usize>,
}

/// `GET superAdmin/getAdmin/{id}` body.
#[derive(Debug, Deserialize)]
pub(crate) struct AdminBody {
    pub admin: Option<Admin>,
}

// =============================================================================
// Third-party users
// =============================================================================

/// A school assigned to a third-party user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignedSchool {
    #[serde(default)]
    pub school_id: SchoolId,
    #[serde(default)]
    pub school_name: String,
}

/// An external partner account scoped to a set of schools.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "RawThirdParty")]
pub struct ThirdPartyUser {
    pub id: ThirdPartyId,
    pub name: String,
    pub email: String,
    pub super_admin_id: SuperAdminId,
    pub assigned_schools: Vec<AssignedSchool>,
    pub image: Option<ImageRef>,
    pub address: String,
    pub status: Option<AccountStatus>,
    pub created_at: Option<DateTime<Utc>>,
}

impl ThirdPartyUser {
    /// Assigned school names joined for display and export.
    #[must_use]
    pub fn school_names(&self) -> String {
        self.assigned_schools
            .iter()
            .map(|s| s.school_name.as_str())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawThirdParty {
    #[serde(default, rename = "_id")]
    underscore_id: Option<String>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    email: String,
    #[serde(default, deserialize_with = "lenient_string")]
    super_admin_id: String,
    #[serde(default)]
    assigned_schools: Option<Vec<AssignedSchool>>,
    #[serde(default)]
    image: Option<ImageRef>,
    #[serde(default, deserialize_with = "lenient_string")]
    address: String,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
}

impl From<RawThirdParty> for ThirdPartyUser {
    fn from(raw: RawThirdParty) -> Self {
        Self {
            id: ThirdPartyId::new(pick_id(raw.underscore_id, raw.id)),
            name: raw.name,
            email: raw.email,
            super_admin_id: SuperAdminId::new(raw.super_admin_id),
            assigned_schools: raw.assigned_schools.unwrap_or_default(),
            image: raw.image.filter(|i| !i.url.is_empty()),
            address: raw.address,
            status: raw.status.as_deref().and_then(|s| s.parse().ok()),
            created_at: parse_timestamp(raw.created_at),
        }
    }
}

/// `GET superAdmin/thirdparty/{id}` body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ThirdPartyListBody {
    #[serde(default)]
    pub third_party_users: Vec<ThirdPartyUser>,
}

// =============================================================================
// Alerts
// =============================================================================

/// A global alert shown on every school dashboard.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "RawAlert")]
pub struct Alert {
    pub id: AlertId,
    pub title: String,
    pub message: String,
    pub alert_type: AlertType,
    pub priority: AlertPriority,
    /// Display duration in milliseconds; `None` means until dismissed.
    pub duration_ms: Option<u64>,
    pub target_audience: TargetAudience,
    pub is_global: bool,
    pub is_active: bool,
    pub created_by: String,
    pub created_at: Option<DateTime<Utc>>,
}

impl Alert {
    /// Duration in whole seconds, as entered in the form.
    #[must_use]
    pub fn duration_secs(&self) -> Option<u64> {
        self.duration_ms.map(|ms| ms / 1000)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAlert {
    #[serde(default, rename = "_id")]
    underscore_id: Option<String>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    title: String,
    #[serde(default, deserialize_with = "lenient_string")]
    message: String,
    #[serde(default, rename = "type")]
    alert_type: Option<String>,
    #[serde(default)]
    priority: Option<String>,
    #[serde(default)]
    duration: Option<f64>,
    #[serde(default)]
    target_audience: Option<String>,
    #[serde(default)]
    is_global: Option<bool>,
    #[serde(default)]
    is_active: Option<bool>,
    #[serde(default, deserialize_with = "lenient_string")]
    created_by: String,
    #[serde(default)]
    created_at: Option<String>,
}

impl From<RawAlert> for Alert {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn from(raw: RawAlert) -> Self {
        Self {
            id: AlertId::new(pick_id(raw.underscore_id, raw.id)),
            title: raw.title,
            message: raw.message,
            alert_type: parse_or_default(raw.alert_type.as_deref()),
            priority: parse_or_default(raw.priority.as_deref()),
            duration_ms: raw
                .duration
                .filter(|d| d.is_finite() && *d > 0.0)
                .map(|d| d as u64),
            target_audience: parse_or_default(raw.target_audience.as_deref()),
            is_global: raw.is_global.unwrap_or(true),
            is_active: raw.is_active.unwrap_or(true),
            created_by: raw.created_by,
            created_at: parse_timestamp(raw.created_at),
        }
    }
}

/// `GET alerts` body.
#[derive(Debug, Deserialize)]
pub(crate) struct AlertListBody {
    #[serde(default)]
    pub alerts: Vec<Alert>,
}

/// Body of endpoints that echo one alert back.
#[derive(Debug, Deserialize)]
pub(crate) struct AlertBody {
    #[serde(default)]
    pub alert: Option<Alert>,
}

/// Body of endpoints whose payload the console does not use.
#[derive(Debug, Default, Deserialize)]
pub struct Ignored {}

// =============================================================================
// Pages
// =============================================================================

/// One page of a server-paginated list.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// Rows of the requested page, never more than [`PAGE_SIZE`].
    pub items: Vec<T>,
    /// Total rows across all pages.
    pub total: usize,
    /// Which page this is.
    pub window: PageWindow,
}

impl<T> Page<T> {
    /// Normalize a list response.
    ///
    /// A server that returned more than a page of rows ignored `page`, so
    /// the requested page is sliced out here and the totals derived from
    /// the full list. Otherwise the server's totals are trusted, defaulting
    /// to the row count and `ceil(total / PAGE_SIZE)`.
    #[must_use]
    pub fn normalize(
        items: Vec<T>,
        requested: usize,
        total: Option<usize>,
        total_pages: Option<usize>,
    ) -> Self {
        if items.len() > PAGE_SIZE {
            return Self::slice(items, requested);
        }

        let total = total.unwrap_or(items.len()).max(items.len());
        let count = total_pages.unwrap_or_else(|| page_count(total, PAGE_SIZE));
        // An empty page past the end is still reported at the requested index
        // so the caller can re-request the clamped one.
        let window = if items.is_empty() {
            PageWindow::clamped(requested, count)
        } else {
            PageWindow {
                index: requested,
                count: count.max(requested.saturating_add(1)),
            }
        };
        Self {
            items,
            total,
            window,
        }
    }

    /// Cut page `requested` out of a complete list, clamping past-the-end
    /// requests onto the last page.
    #[must_use]
    pub fn slice(mut items: Vec<T>, requested: usize) -> Self {
        let total = items.len();
        let window = PageWindow::clamped(requested, page_count(total, PAGE_SIZE));
        let range = window.row_range(total, PAGE_SIZE);
        items.truncate(range.end);
        items.drain(..range.start);
        Self {
            items,
            total,
            window,
        }
    }

    /// A page with no rows.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            window: PageWindow { index: 0, count: 0 },
        }
    }
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_accepts_underscore_id_and_numeric_fields() {
        let admin: Admin = serde_json::from_str(
            r#"{
                "_id": "a1",
                "fullName": "Asha Rao",
                "email": "asha@school.in",
                "password": "hunter2",
                "contact": 9876543210,
                "pincode": 560001,
                "superAdminId": "s1",
                "createdAt": "2024-03-01T10:00:00.000Z"
            }"#,
        )
        .unwrap();
        assert_eq!(admin.id.as_str(), "a1");
        assert_eq!(admin.contact, "9876543210");
        assert_eq!(admin.pincode, "560001");
        assert_eq!(admin.super_admin_id.as_str(), "s1");
        assert!(admin.created_at.is_some());
        assert_eq!(admin.school_name, "");
        assert!(!format!("{admin:?}").contains("hunter2"));
    }

    #[test]
    fn test_admin_school_option_falls_back_to_admin_id() {
        let admin: Admin = serde_json::from_str(r#"{"id":"a2","schoolName":"Green Valley"}"#).unwrap();
        assert_eq!(admin.school_option_value(), "a2");

        let admin: Admin =
            serde_json::from_str(r#"{"id":"a2","schoolId":"sch9","schoolName":"Green Valley"}"#)
                .unwrap();
        assert_eq!(admin.school_option_value(), "sch9");
    }

    #[test]
    fn test_login_profile_id_fallbacks() {
        let profile: SuperAdminProfile =
            serde_json::from_str(r#"{"_id":"mongo1","name":"Root"}"#).unwrap();
        assert_eq!(profile.super_admin_id.as_str(), "mongo1");

        let profile: SuperAdminProfile =
            serde_json::from_str(r#"{"superAdminId":"s1","_id":"mongo1"}"#).unwrap();
        assert_eq!(profile.super_admin_id.as_str(), "s1");
        assert_eq!(profile.display_name(), "Super Admin");
    }

    #[test]
    fn test_login_response_keeps_token_secret() {
        use secrecy::ExposeSecret;

        let login: LoginResponse =
            serde_json::from_str(r#"{"token":"t1","superAdmin":{"superAdminId":"s1"}}"#).unwrap();
        assert_eq!(login.token.expose_secret(), "t1");
        assert!(!format!("{login:?}").contains("t1\""));
    }

    #[test]
    fn test_alert_defaults_for_unknown_enums() {
        let alert: Alert = serde_json::from_str(
            r#"{"_id":"al1","title":"Exam","message":"Tomorrow","type":"urgent","priority":"high","duration":5000,"isActive":false}"#,
        )
        .unwrap();
        assert_eq!(alert.alert_type, AlertType::Info);
        assert_eq!(alert.priority, AlertPriority::High);
        assert_eq!(alert.duration_secs(), Some(5));
        assert!(!alert.is_active);
        assert!(alert.is_global);
    }

    #[test]
    fn test_alert_null_duration() {
        let alert: Alert = serde_json::from_str(r#"{"id":"al2","duration":null}"#).unwrap();
        assert_eq!(alert.duration_ms, None);
    }

    #[test]
    fn test_third_party_school_names() {
        let user: ThirdPartyUser = serde_json::from_str(
            r#"{"_id":"t1","name":"Acme","assignedSchools":[{"schoolId":"a","schoolName":"North"},{"schoolId":"b","schoolName":"South"}]}"#,
        )
        .unwrap();
        assert_eq!(user.school_names(), "North, South");
    }

    #[test]
    fn test_page_defaults_totals_from_rows() {
        let page = Page::normalize(vec![1, 2, 3], 0, None, None);
        assert_eq!(page.total, 3);
        assert_eq!(page.window.count, 1);
    }

    #[test]
    fn test_page_trusts_server_totals() {
        let page = Page::normalize(vec![1; 10], 1, Some(35), Some(4));
        assert_eq!(page.total, 35);
        assert_eq!(page.window, PageWindow { index: 1, count: 4 });
    }

    #[test]
    fn test_page_slices_unpaginated_lists() {
        let rows: Vec<usize> = (0..23).collect();
        let page = Page::normalize(rows, 2, None, None);
        assert_eq!(page.items, vec![20, 21, 22]);
        assert_eq!(page.total, 23);
        assert_eq!(page.window, PageWindow { index: 2, count: 3 });

        let rows: Vec<usize> = (0..23).collect();
        let page = Page::normalize(rows, 9, None, None);
        assert_eq!(page.window.index, 2);
    }

    #[test]
    fn test_slice_clamps_short_lists_to_first_page() {
        let page = Page::slice(vec!['a', 'b', 'c'], 3);
        assert_eq!(page.items, vec!['a', 'b', 'c']);
        assert_eq!(page.window, PageWindow { index: 0, count: 1 });

        let page: Page<char> = Page::slice(Vec::new(), 2);
        assert_eq!(page.window, PageWindow { index: 0, count: 0 });
    }

    #[test]
    fn test_normalize_huge_page_request_does_not_overflow() {
        let page = Page::normalize(vec![1, 2, 3], usize::MAX, Some(3), None);
        assert_eq!(page.items, vec![1, 2, 3]);
        assert_eq!(page.window.count, usize::MAX);
        assert_eq!(page.window.display_number(), usize::MAX);
    }

    #[test]
    fn test_page_count_is_ceiling_for_every_total() {
        for n in 0..=45usize {
            let rows: Vec<usize> = (0..n).collect();
            let page = Page::normalize(rows, 0, None, None);
            assert_eq!(page.window.count, n.div_ceil(PAGE_SIZE), "n = {n}");
        }
    }
}
