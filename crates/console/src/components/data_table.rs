//! Data table component types.
//!
//! Configuration for the list screens (columns, filters, bulk actions) plus
//! the shared list behaviour: query-string state, substring search,
//! equality filters, stable sorting and CSV export.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::form_urlencoded;

// =============================================================================
// Configuration
// =============================================================================

/// Column definition for a data table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableColumn {
    /// Key used in `?sort=`.
    pub key: String,
    /// Display label for the column header.
    pub label: String,
    /// Whether the column is sortable.
    pub sortable: bool,
}

impl TableColumn {
    /// Create a new sortable column.
    #[must_use]
    pub fn sortable(key: &str, label: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            sortable: true,
        }
    }

    /// Create a new non-sortable column.
    #[must_use]
    pub fn new(key: &str, label: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            sortable: false,
        }
    }
}

/// Option for select filters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterOption {
    /// Option value.
    pub value: String,
    /// Display label.
    pub label: String,
}

impl FilterOption {
    /// Create a new filter option.
    #[must_use]
    pub fn new(value: &str, label: &str) -> Self {
        Self {
            value: value.to_string(),
            label: label.to_string(),
        }
    }
}

/// Equality filter rendered as a select above the table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableFilter {
    /// Query-string key.
    pub key: String,
    /// Display label.
    pub label: String,
    /// Available options. Empty means free text.
    pub options: Vec<FilterOption>,
}

impl TableFilter {
    /// Create a free-text equality filter.
    #[must_use]
    pub fn text(key: &str, label: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            options: vec![],
        }
    }

    /// Create a select filter.
    #[must_use]
    pub fn select(key: &str, label: &str, options: Vec<FilterOption>) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            options,
        }
    }

    /// Whether the filter renders as a select.
    #[must_use]
    pub fn is_select(&self) -> bool {
        !self.options.is_empty()
    }
}

/// Bulk action definition for data tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkAction {
    /// Action key posted as `action`.
    pub key: String,
    /// Display label.
    pub label: String,
    /// Phosphor icon class.
    pub icon: String,
    /// Whether this is a destructive action.
    pub destructive: bool,
}

impl BulkAction {
    /// Create a new bulk action.
    #[must_use]
    pub fn new(key: &str, label: &str, icon: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            icon: icon.to_string(),
            destructive: false,
        }
    }

    /// Mark this action as destructive.
    #[must_use]
    pub const fn destructive(mut self) -> Self {
        self.destructive = true;
        self
    }
}

/// Configuration for a data table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataTableConfig {
    /// Unique table identifier.
    pub table_id: String,
    /// Base path of the list screen (links are built from it).
    pub base_path: String,
    /// Column definitions.
    pub columns: Vec<TableColumn>,
    /// Filter definitions.
    pub filters: Vec<TableFilter>,
    /// Bulk action definitions.
    pub bulk_actions: Vec<BulkAction>,
    /// Search placeholder text.
    pub search_placeholder: String,
    /// Icon for empty state.
    pub empty_icon: String,
    /// Title for empty state.
    pub empty_title: String,
    /// Whether to show bulk action bar.
    pub has_bulk_actions: bool,
    /// Whether to show filter panel.
    pub has_filters: bool,
    /// Whether an export link is offered.
    pub has_export: bool,
}

impl DataTableConfig {
    /// Create a new data table configuration.
    #[must_use]
    pub fn new(table_id: &str, base_path: &str) -> Self {
        Self {
            table_id: table_id.to_string(),
            base_path: base_path.to_string(),
            columns: vec![],
            filters: vec![],
            bulk_actions: vec![],
            search_placeholder: "Search...".to_string(),
            empty_icon: "ph-list".to_string(),
            empty_title: "No items found".to_string(),
            has_bulk_actions: false,
            has_filters: false,
            has_export: false,
        }
    }

    /// Add a column.
    #[must_use]
    pub fn column(mut self, column: TableColumn) -> Self {
        self.columns.push(column);
        self
    }

    /// Add a filter.
    #[must_use]
    pub fn filter(mut self, filter: TableFilter) -> Self {
        self.has_filters = true;
        self.filters.push(filter);
        self
    }

    /// Add a bulk action.
    #[must_use]
    pub fn bulk_action(mut self, action: BulkAction) -> Self {
        self.has_bulk_actions = true;
        self.bulk_actions.push(action);
        self
    }

    /// Set search placeholder.
    #[must_use]
    pub fn search_placeholder(mut self, placeholder: &str) -> Self {
        self.search_placeholder = placeholder.to_string();
        self
    }

    /// Set empty state configuration.
    #[must_use]
    pub fn empty_state(mut self, icon: &str, title: &str) -> Self {
        self.empty_icon = icon.to_string();
        self.empty_title = title.to_string();
        self
    }

    /// Offer `{base_path}/export.csv`.
    #[must_use]
    pub const fn exportable(mut self) -> Self {
        self.has_export = true;
        self
    }

    /// Keys of the equality filters this table honours.
    #[must_use]
    pub fn filter_keys(&self) -> Vec<&str> {
        self.filters.iter().map(|f| f.key.as_str()).collect()
    }

    /// Whether `key` names a sortable column.
    #[must_use]
    pub fn is_sortable(&self, key: &str) -> bool {
        self.columns.iter().any(|c| c.sortable && c.key == key)
    }
}

/// Bulk actions shared by the admin and third-party tables.
#[must_use]
pub fn account_bulk_actions() -> Vec<BulkAction> {
    vec![
        BulkAction::new("activate", "Activate", "ph-check-circle"),
        BulkAction::new("deactivate", "Deactivate", "ph-prohibit"),
        BulkAction::new("delete", "Delete", "ph-trash").destructive(),
    ]
}

fn status_filter() -> TableFilter {
    TableFilter::select(
        "status",
        "Status",
        vec![
            FilterOption::new("active", "Active"),
            FilterOption::new("inactive", "Inactive"),
        ],
    )
}

/// Build the admins table configuration.
#[must_use]
pub fn admins_table_config() -> DataTableConfig {
    let mut config = DataTableConfig::new("admins", "/dashboard/superadmin")
        .column(TableColumn::sortable("full_name", "Full Name"))
        .column(TableColumn::sortable("email", "Email"))
        .column(TableColumn::sortable("school_name", "School"))
        .column(TableColumn::new("contact", "Contact"))
        .column(TableColumn::sortable("school_city", "City"))
        .column(TableColumn::sortable("school_state", "State"))
        .column(TableColumn::new("pincode", "Pincode"))
        .column(TableColumn::sortable("created_at", "Created"))
        .filter(status_filter())
        .filter(TableFilter::text("city", "City"))
        .filter(TableFilter::text("state", "State"))
        .search_placeholder("Search admins by name, email or school...")
        .empty_state("ph-chalkboard-teacher", "No admins found")
        .exportable();
    for action in account_bulk_actions() {
        config = config.bulk_action(action);
    }
    config
}

/// Build the third-party users table configuration.
#[must_use]
pub fn third_party_table_config() -> DataTableConfig {
    let mut config = DataTableConfig::new("third_party", "/dashboard/thirdparty")
        .column(TableColumn::sortable("name", "Name"))
        .column(TableColumn::sortable("email", "Email"))
        .column(TableColumn::new("schools", "Assigned Schools"))
        .column(TableColumn::sortable("created_at", "Created"))
        .filter(status_filter())
        .search_placeholder("Search by name, email or school...")
        .empty_state("ph-handshake", "No third-party users found")
        .exportable();
    for action in account_bulk_actions() {
        config = config.bulk_action(action);
    }
    config
}

/// Build the alerts table configuration.
#[must_use]
pub fn alerts_table_config() -> DataTableConfig {
    DataTableConfig::new("alerts", "/dashboard/alerts")
        .column(TableColumn::sortable("title", "Title"))
        .column(TableColumn::sortable("type", "Type"))
        .column(TableColumn::sortable("priority", "Priority"))
        .column(TableColumn::new("audience", "Audience"))
        .column(TableColumn::sortable("active", "Status"))
        .column(TableColumn::sortable("created_at", "Created"))
        .filter(TableFilter::select(
            "type",
            "Type",
            vec![
                FilterOption::new("info", "Information"),
                FilterOption::new("warning", "Warning"),
                FilterOption::new("error", "Error"),
                FilterOption::new("success", "Success"),
            ],
        ))
        .filter(TableFilter::select(
            "priority",
            "Priority",
            vec![
                FilterOption::new("low", "Low"),
                FilterOption::new("medium", "Medium"),
                FilterOption::new("high", "High"),
            ],
        ))
        .filter(TableFilter::select(
            "active",
            "Status",
            vec![
                FilterOption::new("true", "Active"),
                FilterOption::new("false", "Inactive"),
            ],
        ))
        .search_placeholder("Search alerts by title or message...")
        .empty_state("ph-bell", "No global alerts yet")
}

// =============================================================================
// Query state
// =============================================================================

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Parse `?dir=`; anything but `desc` is ascending.
    #[must_use]
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.eq_ignore_ascii_case("desc") => Self::Desc,
            _ => Self::Asc,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

/// List screen state carried in the query string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TableQuery {
    /// Substring search.
    pub q: Option<String>,
    pub status: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    #[serde(rename = "type")]
    pub alert_type: Option<String>,
    pub priority: Option<String>,
    pub active: Option<String>,
    pub sort: Option<String>,
    pub dir: Option<String>,
    /// Zero-based page index.
    pub page: Option<usize>,
    /// `create` opens the create form.
    pub modal: Option<String>,
}

/// Highest page index honoured from a query string. Larger requests clamp
/// to the last real page anyway.
pub const MAX_PAGE_INDEX: usize = 100_000;

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(|s| s.trim()).filter(|s| !s.is_empty())
}

impl TableQuery {
    /// Trimmed search term, `None` when blank.
    #[must_use]
    pub fn search(&self) -> Option<&str> {
        non_blank(self.q.as_ref())
    }

    /// Value of an equality filter, `None` when blank or unknown.
    #[must_use]
    pub fn filter(&self, key: &str) -> Option<&str> {
        let value = match key {
            "status" => self.status.as_ref(),
            "city" => self.city.as_ref(),
            "state" => self.state.as_ref(),
            "type" => self.alert_type.as_ref(),
            "priority" => self.priority.as_ref(),
            "active" => self.active.as_ref(),
            _ => None,
        };
        non_blank(value)
    }

    /// Requested page, zero-based, capped at [`MAX_PAGE_INDEX`].
    #[must_use]
    pub fn page(&self) -> usize {
        self.page.unwrap_or(0).min(MAX_PAGE_INDEX)
    }

    #[must_use]
    pub fn direction(&self) -> SortDirection {
        SortDirection::parse(self.dir.as_deref())
    }

    /// Sort column, `None` when blank.
    #[must_use]
    pub fn sort_column(&self) -> Option<&str> {
        non_blank(self.sort.as_ref())
    }

    /// Whether the create form is open.
    #[must_use]
    pub fn is_create_open(&self) -> bool {
        self.modal.as_deref() == Some("create")
    }

    /// Query pairs for the current state, excluding `page` and `modal`.
    fn state_pairs(&self) -> Vec<(&'static str, &str)> {
        let mut pairs = Vec::new();
        if let Some(q) = self.search() {
            pairs.push(("q", q));
        }
        for key in ["status", "city", "state", "type", "priority", "active"] {
            if let Some(v) = self.filter(key) {
                pairs.push((key, v));
            }
        }
        if let Some(sort) = self.sort_column() {
            pairs.push(("sort", sort));
            pairs.push(("dir", self.direction().as_str()));
        }
        pairs
    }

    fn encode(pairs: &[(&str, &str)]) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (k, v) in pairs {
            serializer.append_pair(k, v);
        }
        serializer.finish()
    }

    /// Query string (with leading `?` when non-empty) for page `page`.
    #[must_use]
    pub fn page_href(&self, page: usize) -> String {
        let page = page.to_string();
        let mut pairs = self.state_pairs();
        pairs.push(("page", &page));
        format!("?{}", Self::encode(&pairs))
    }

    /// Query string that sorts by `column`, flipping direction when it is
    /// already the sort column. Resets to the first page.
    #[must_use]
    pub fn sort_href(&self, column: &str) -> String {
        let dir = if self.sort_column() == Some(column) {
            self.direction().flipped()
        } else {
            SortDirection::Asc
        };
        let mut pairs: Vec<(&str, &str)> = self
            .state_pairs()
            .into_iter()
            .filter(|(k, _)| *k != "sort" && *k != "dir")
            .collect();
        pairs.push(("sort", column));
        pairs.push(("dir", dir.as_str()));
        format!("?{}", Self::encode(&pairs))
    }

    /// Query string preserving filters and sort, for export and "back" links.
    #[must_use]
    pub fn state_href(&self) -> String {
        let pairs = self.state_pairs();
        if pairs.is_empty() {
            String::new()
        } else {
            format!("?{}", Self::encode(&pairs))
        }
    }

    /// Arrow shown next to a column header.
    #[must_use]
    pub fn sort_indicator(&self, column: &str) -> &'static str {
        match (self.sort_column() == Some(column), self.direction()) {
            (false, _) => "",
            (true, SortDirection::Asc) => "▲",
            (true, SortDirection::Desc) => "▼",
        }
    }
}

// =============================================================================
// Rows
// =============================================================================

/// A comparable cell value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortKey {
    /// Compared case-insensitively (stored lowercased).
    Text(String),
    Date(DateTime<Utc>),
    Flag(bool),
    Rank(u8),
}

impl SortKey {
    /// Text key, `None` when blank so blanks sort with missing values.
    #[must_use]
    pub fn text(value: &str) -> Option<Self> {
        let value = value.trim();
        (!value.is_empty()).then(|| Self::Text(value.to_lowercase()))
    }
}

/// A row the list screens can search, filter and sort.
pub trait TableRow {
    /// Fields the `q` search term is matched against.
    fn search_fields(&self) -> Vec<&str>;

    /// Value compared by equality filter `key`.
    fn filter_value(&self, key: &str) -> Option<Cow<'_, str>>;

    /// Comparable value of column `column`; `None` when missing.
    fn sort_key(&self, column: &str) -> Option<SortKey>;
}

/// Apply the search term and equality filters named in `filter_keys`.
///
/// Search is a case-insensitive substring match over
/// [`TableRow::search_fields`]; every active filter must also match.
#[must_use]
pub fn filter_rows<T: TableRow>(rows: Vec<T>, query: &TableQuery, filter_keys: &[&str]) -> Vec<T> {
    let needle = query.search().map(str::to_lowercase);
    let active: Vec<(&str, &str)> = filter_keys
        .iter()
        .filter_map(|key| query.filter(key).map(|v| (*key, v)))
        .collect();

    rows.into_iter()
        .filter(|row| {
            needle.as_deref().is_none_or(|needle| {
                row.search_fields()
                    .iter()
                    .any(|field| field.to_lowercase().contains(needle))
            })
        })
        .filter(|row| {
            active.iter().all(|(key, wanted)| {
                row.filter_value(key)
                    .is_some_and(|v| v.trim().eq_ignore_ascii_case(wanted))
            })
        })
        .collect()
}

/// Stable sort by `column`. Missing values come first in either direction.
pub fn sort_rows<T: TableRow>(rows: &mut [T], column: &str, direction: SortDirection) {
    rows.sort_by(|a, b| {
        match (a.sort_key(column), b.sort_key(column)) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(x), Some(y)) => match direction {
                SortDirection::Asc => x.cmp(&y),
                SortDirection::Desc => y.cmp(&x),
            },
        }
    });
}

/// Filter then sort, honouring only columns the table declares sortable.
#[must_use]
pub fn apply_query<T: TableRow>(rows: Vec<T>, query: &TableQuery, config: &DataTableConfig) -> Vec<T> {
    let mut rows = filter_rows(rows, query, &config.filter_keys());
    if let Some(column) = query.sort_column().filter(|c| config.is_sortable(c)) {
        sort_rows(&mut rows, column, query.direction());
    }
    rows
}

// =============================================================================
// CSV
// =============================================================================

/// Escape a CSV field, quoting when it holds a comma, quote or newline.
#[must_use]
pub fn escape_csv_field(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

/// Render a header row and data rows as CSV text.
#[must_use]
pub fn write_csv<I, R>(headers: &[&str], rows: I) -> String
where
    I: IntoIterator<Item = R>,
    R: IntoIterator<Item = String>,
{
    let mut csv = String::new();
    let header: Vec<Cow<'_, str>> = headers.iter().map(|h| escape_csv_field(h)).collect();
    let _ = writeln!(csv, "{}", header.join(","));
    for row in rows {
        let cells: Vec<String> = row
            .into_iter()
            .map(|cell| escape_csv_field(&cell).into_owned())
            .collect();
        let _ = writeln!(csv, "{}", cells.join(","));
    }
    csv
}

/// Date column format used in tables and exports.
#[must_use]
pub fn format_date(value: Option<&DateTime<Utc>>) -> String {
    value.map_or_else(|| "-".to_string(), |d| d.format("%d %b %Y").to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        name: &'static str,
        city: &'static str,
        created: Option<&'static str>,
    }

    impl TableRow for Row {
        fn search_fields(&self) -> Vec<&str> {
            vec![self.name]
        }

        fn filter_value(&self, key: &str) -> Option<Cow<'_, str>> {
            match key {
                "city" => Some(Cow::Borrowed(self.city)),
                _ => None,
            }
        }

        fn sort_key(&self, column: &str) -> Option<SortKey> {
            match column {
                "name" => SortKey::text(self.name),
                "created_at" => self
                    .created
                    .and_then(|c| DateTime::parse_from_rfc3339(c).ok())
                    .map(|d| SortKey::Date(d.with_timezone(&Utc))),
                _ => None,
            }
        }
    }

    fn rows() -> Vec<Row> {
        vec![
            Row { name: "Zara", city: "Pune", created: Some("2024-02-01T00:00:00Z") },
            Row { name: "asha", city: "Delhi", created: None },
            Row { name: "Bala", city: "pune", created: Some("2023-12-31T23:59:59Z") },
        ]
    }

    // Mirrors what axum's `Query` extractor produces.
    fn query(pairs: &str) -> TableQuery {
        let map: serde_json::Map<String, serde_json::Value> = form_urlencoded::parse(pairs.as_bytes())
            .map(|(k, v)| {
                let value = if k == "page" {
                    serde_json::Value::from(v.parse::<usize>().unwrap())
                } else {
                    serde_json::Value::from(v.into_owned())
                };
                (k.into_owned(), value)
            })
            .collect();
        serde_json::from_value(serde_json::Value::Object(map)).unwrap()
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let found = filter_rows(rows(), &query("q=ZAR"), &[]);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Zara");
    }

    #[test]
    fn test_filters_and_search_combine() {
        let found = filter_rows(rows(), &query("city=PUNE"), &["city"]);
        assert_eq!(found.len(), 2);

        let found = filter_rows(rows(), &query("city=pune&q=bal"), &["city"]);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Bala");
    }

    #[test]
    fn test_undeclared_filters_are_ignored() {
        let found = filter_rows(rows(), &query("city=Delhi"), &[]);
        assert_eq!(found.len(), 3);
    }

    #[test]
    fn test_sort_text_ignores_case() {
        let mut r = rows();
        sort_rows(&mut r, "name", SortDirection::Asc);
        let names: Vec<_> = r.iter().map(|r| r.name).collect();
        assert_eq!(names, ["asha", "Bala", "Zara"]);
    }

    #[test]
    fn test_sort_dates_missing_first() {
        let mut r = rows();
        sort_rows(&mut r, "created_at", SortDirection::Asc);
        let names: Vec<_> = r.iter().map(|r| r.name).collect();
        assert_eq!(names, ["asha", "Bala", "Zara"]);

        sort_rows(&mut r, "created_at", SortDirection::Desc);
        let names: Vec<_> = r.iter().map(|r| r.name).collect();
        assert_eq!(names, ["asha", "Zara", "Bala"]);
    }

    #[test]
    fn test_sort_is_stable() {
        let mut r = rows();
        sort_rows(&mut r, "unknown", SortDirection::Desc);
        assert_eq!(r, rows());
    }

    #[test]
    fn test_page_is_capped() {
        let query = TableQuery {
            page: Some(usize::MAX),
            ..TableQuery::default()
        };
        assert_eq!(query.page(), MAX_PAGE_INDEX);
    }

    #[test]
    fn test_page_href_preserves_state() {
        let q = query("q=asha&status=active&sort=email&dir=desc&page=3&modal=create");
        assert_eq!(q.page_href(1), "?q=asha&status=active&sort=email&dir=desc&page=1");
        assert!(q.is_create_open());
    }

    #[test]
    fn test_sort_href_flips_direction() {
        let q = query("sort=email&dir=asc");
        assert_eq!(q.sort_href("email"), "?sort=email&dir=desc");
        assert_eq!(q.sort_href("full_name"), "?sort=full_name&dir=asc");
        assert_eq!(q.sort_indicator("email"), "▲");
        assert_eq!(q.sort_indicator("full_name"), "");
    }

    #[test]
    fn test_blank_values_are_ignored() {
        let q = query("q=%20%20&status=");
        assert!(q.search().is_none());
        assert!(q.filter("status").is_none());
        assert_eq!(q.state_href(), "");
    }

    #[test]
    fn test_escape_csv_field() {
        assert_eq!(escape_csv_field("plain"), "plain");
        assert_eq!(escape_csv_field("a,b"), "\"a,b\"");
        assert_eq!(escape_csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_csv_field("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn test_write_csv() {
        let csv = write_csv(
            &["Name", "School"],
            vec![vec!["Asha".to_string(), "Green Valley, Pune".to_string()]],
        );
        assert_eq!(csv, "Name,School\nAsha,\"Green Valley, Pune\"\n");
    }

    #[test]
    fn test_table_configs() {
        let admins = admins_table_config();
        assert_eq!(admins.filter_keys(), ["status", "city", "state"]);
        assert!(admins.is_sortable("created_at"));
        assert!(!admins.is_sortable("contact"));
        assert_eq!(admins.bulk_actions.len(), 3);

        let alerts = alerts_table_config();
        assert_eq!(alerts.filter_keys(), ["type", "priority", "active"]);
        assert!(!alerts.has_bulk_actions);
    }
}
