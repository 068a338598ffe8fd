//! CSV exports.
//!
//! Columns match the console's export buttons. Without `--page` every page
//! is fetched. Third-party users come back in one response, so `--page`
//! slices that list locally.

use dvs_console::api::Page;
use dvs_console::components::data_table::write_csv;
use dvs_console::routes::{admins as admin_routes, third_party as third_party_routes};

use super::{CliError, Session, page_index};

/// Export admins owned by the signed-in super admin.
///
/// # Errors
///
/// Returns `CliError` if `page` is 0 or any request fails.
pub async fn admins(session: &Session, page: Option<usize>) -> Result<String, CliError> {
    let rows = match page {
        Some(page) => {
            session
                .api()
                .list_admins(session.owner(), page_index(page)?)
                .await?
                .items
        }
        None => admin_routes::fetch_all(session.api(), session.owner()).await?,
    };
    tracing::info!(rows = rows.len(), "Exporting admins");
    Ok(write_csv(
        &admin_routes::CSV_HEADERS,
        rows.iter().map(admin_routes::csv_row),
    ))
}

/// Export third-party users owned by the signed-in super admin.
///
/// # Errors
///
/// Returns `CliError` if `page` is 0 or any request fails.
pub async fn third_party(session: &Session, page: Option<usize>) -> Result<String, CliError> {
    let index = page.map(page_index).transpose()?;
    let users = session.api().list_third_party(session.owner()).await?;
    let rows = select_page(users, index);
    tracing::info!(rows = rows.len(), "Exporting third-party users");
    Ok(write_csv(
        &third_party_routes::CSV_HEADERS,
        rows.iter().map(third_party_routes::csv_row),
    ))
}

/// Keep page `index` of a complete list, or everything when no page was asked for.
fn select_page<T>(rows: Vec<T>, index: Option<usize>) -> Vec<T> {
    match index {
        Some(index) => Page::slice(rows, index).items,
        None => rows,
    }
}
