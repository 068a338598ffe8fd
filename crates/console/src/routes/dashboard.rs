//! Dashboard route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::State,
    response::Redirect,
    routing::{get, post},
};
use serde::Deserialize;
use tracing::instrument;

use super::views::{OperatorView, redirect_with_flash};
use crate::error::AppError;
use crate::filters;
use crate::middleware::{RequireSuperAdmin, SessionStore};
use crate::models::Flash;
use crate::state::AppState;

/// One bar of the proportion chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatBar {
    pub label: &'static str,
    pub count: usize,
    /// Share of the combined total, 0..=100.
    pub percent: usize,
    pub href: &'static str,
}

/// Turn raw counts into bars whose percentages share one denominator.
#[must_use]
pub fn stat_bars(admins: usize, third_party: usize, active_alerts: usize) -> Vec<StatBar> {
    let total = admins + third_party + active_alerts;
    let percent = |n: usize| if total == 0 { 0 } else { n * 100 / total };
    vec![
        StatBar {
            label: "Admins",
            count: admins,
            percent: percent(admins),
            href: "/dashboard/superadmin",
        },
        StatBar {
            label: "Third-Party Users",
            count: third_party,
            percent: percent(third_party),
            href: "/dashboard/thirdparty",
        },
        StatBar {
            label: "Active Alerts",
            count: active_alerts,
            percent: percent(active_alerts),
            href: "/dashboard/alerts",
        },
    ]
}

/// Dashboard page template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub operator: OperatorView,
    pub current_path: String,
    pub flashes: Vec<Flash>,
    pub stats: Vec<StatBar>,
}

/// Body of the "send a message" form.
#[derive(Debug, Default, Deserialize)]
pub struct MessageForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub message: String,
}

impl MessageForm {
    /// Recipient shown in the confirmation, email preferred over phone.
    #[must_use]
    pub fn recipient(&self) -> Option<&str> {
        [self.email.trim(), self.phone.trim()]
            .into_iter()
            .find(|s| !s.is_empty())
    }
}

/// Build the dashboard router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/dashboard/message", post(send_message))
}

/// Dashboard page.
///
/// GET /dashboard
#[instrument(skip(state, store, ctx))]
async fn dashboard(
    State(state): State<AppState>,
    store: SessionStore,
    RequireSuperAdmin(ctx): RequireSuperAdmin,
) -> DashboardTemplate {
    let api = state.api().bearer(Some(&ctx.token));
    let owner = ctx.super_admin_id();

    let (admins, third_party, alerts) = tokio::join!(
        api.list_admins(owner, 0),
        api.list_third_party(owner),
        api.list_alerts(),
    );

    let admins = admins.map(|p| p.total).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to count admins");
        0
    });
    let third_party = third_party.map(|users| users.len()).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to count third-party users");
        0
    });
    let active_alerts = alerts
        .map(|list| list.iter().filter(|a| a.is_active).count())
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to count alerts");
            0
        });

    DashboardTemplate {
        operator: OperatorView::from(&ctx),
        current_path: "/dashboard".to_string(),
        flashes: store.take_flash().await,
        stats: stat_bars(admins, third_party, active_alerts),
    }
}

/// Accept the "send a message" form.
///
/// Delivery is not wired to any backend yet; the operator only sees a
/// confirmation.
///
/// POST /dashboard/message
#[instrument(skip(store, _ctx, form))]
async fn send_message(
    store: SessionStore,
    RequireSuperAdmin(_ctx): RequireSuperAdmin,
    Form(form): Form<MessageForm>,
) -> Result<Redirect, AppError> {
    let flash = match form.recipient() {
        Some(to) if !form.message.trim().is_empty() => {
            Flash::success(format!("Sending message to {to}"))
        }
        _ => Flash::error("Enter an email or phone number and a message"),
    };
    redirect_with_flash(&store, flash, "/dashboard").await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stat_bars_share_one_total() {
        let bars = stat_bars(6, 3, 1);
        let percents: Vec<_> = bars.iter().map(|b| b.percent).collect();
        assert_eq!(percents, [60, 30, 10]);
    }

    #[test]
    fn test_stat_bars_with_nothing_counted() {
        assert!(stat_bars(0, 0, 0).iter().all(|b| b.percent == 0));
    }

    #[test]
    fn test_message_recipient_prefers_email() {
        let form = MessageForm {
            email: " a@b.com ".to_string(),
            phone: "98450".to_string(),
            message: "hi".to_string(),
        };
        assert_eq!(form.recipient(), Some("a@b.com"));

        let form = MessageForm {
            phone: "98450".to_string(),
            ..MessageForm::default()
        };
        assert_eq!(form.recipient(), Some("98450"));
        assert_eq!(MessageForm::default().recipient(), None);
    }
}
