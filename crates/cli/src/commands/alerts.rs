//! Alert listing and broadcasting.

use std::fmt::Write;

use dvs_console::api::Alert;
use dvs_console::components::data_table::format_date;
use dvs_core::AlertId;

use super::{CliError, Session};

/// Render every alert, one per line, tab separated.
///
/// # Errors
///
/// Returns `CliError::Api` if the alerts cannot be fetched.
pub async fn list(session: &Session) -> Result<String, CliError> {
    let alerts = session.api().list_alerts().await?;
    tracing::info!(count = alerts.len(), "Fetched alerts");
    Ok(render(&alerts))
}

/// Push alert `id` to its audience.
///
/// # Errors
///
/// Returns `CliError::Api` if the API refuses the broadcast.
pub async fn broadcast(session: &Session, id: &str) -> Result<(), CliError> {
    let id = AlertId::new(id.trim());
    session.api().broadcast_alert(&id).await?;
    tracing::info!(alert_id = %id, "Alert broadcast");
    Ok(())
}

fn render(alerts: &[Alert]) -> String {
    let mut out = String::from("ID\tACTIVE\tPRIORITY\tTYPE\tCREATED\tTITLE\n");
    for alert in alerts {
        let _ = writeln!(
            out,
            "{}\t{}\t{}\t{}\t{}\t{}",
            alert.id,
            if alert.is_active { "yes" } else { "no" },
            alert.priority,
            alert.alert_type,
            format_date(alert.created_at.as_ref()),
            alert.title,
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use dvs_core::{AlertPriority, AlertType};

    #[test]
    fn test_render_lists_one_alert_per_line() {
        let alerts = vec![
            Alert {
                id: AlertId::new("al-1"),
                title: "Exams postponed".to_string(),
                alert_type: AlertType::Warning,
                priority: AlertPriority::High,
                is_active: true,
                ..Alert::default()
            },
            Alert {
                id: AlertId::new("al-2"),
                title: "Holiday".to_string(),
                ..Alert::default()
            },
        ];
        let out = render(&alerts);
        let lines: Vec<&str> = out.lines().skip(1).collect();
        assert_eq!(
            lines,
            [
                "al-1\tyes\thigh\twarning\t-\tExams postponed",
                "al-2\tno\tmedium\tinfo\t-\tHoliday",
            ]
        );
    }
}
