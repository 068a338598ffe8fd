//! Global alert creation, broadcast, toggling and deletion against the mock API.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use dvs_integration_tests::{ConsoleHarness, location};
use reqwest::StatusCode;
use serde_json::json;

fn alert(id: &str, title: &str, active: bool) -> serde_json::Value {
    json!({
        "_id": id,
        "title": title,
        "message": "Schools close at noon",
        "type": "warning",
        "priority": "high",
        "duration": 5000,
        "targetAudience": "all",
        "isGlobal": true,
        "isActive": active,
        "createdBy": "s1",
        "createdAt": "2026-02-01T08:30:00Z"
    })
}

#[tokio::test]
async fn test_toggle_flips_only_active_flag() {
    let console = ConsoleHarness::start().await;
    console.api.seed_alert(alert("al-1", "Early closure", true));
    console.login().await;

    let before = console.api.state().alerts[0].clone();

    let response = console
        .post_form("/dashboard/alerts/al-1/toggle", &[("confirmed", "yes")])
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response).as_deref(), Some("/dashboard/alerts"));

    let mut after = console.api.state().alerts[0].clone();
    assert_eq!(after["isActive"], json!(false));
    after["isActive"] = json!(true);
    assert_eq!(after, before);

    let (_, html) = console.get("/dashboard/alerts").await;
    assert!(html.contains("Alert deactivated"));
}

#[tokio::test]
async fn test_toggle_requires_confirmation() {
    let console = ConsoleHarness::start().await;
    console.api.seed_alert(alert("al-1", "Early closure", true));
    console.login().await;

    let response = console.post_form("/dashboard/alerts/al-1/toggle", &[]).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&response).as_deref(),
        Some("/dashboard/alerts/al-1/toggle")
    );
    assert!(console.api.requests_to("/toggle").is_empty());
    assert_eq!(console.api.state().alerts[0]["isActive"], json!(true));
}

#[tokio::test]
async fn test_alert_list_filters_by_active() {
    let console = ConsoleHarness::start().await;
    console.api.seed_alert(alert("al-1", "Early closure", true));
    console.api.seed_alert(alert("al-2", "Fee reminder", false));
    console.login().await;

    let (status, html) = console.get("/dashboard/alerts?active=false").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Fee reminder"));
    assert!(!html.contains("Early closure"));
}

const ALERT_FORM: &[(&str, &str)] = &[
    ("title", "Exam schedule"),
    ("message", "Board exams start on 3 March"),
    ("type", "info"),
    ("priority", "medium"),
    ("duration", "30"),
    ("target_audience", "all"),
];

#[tokio::test]
async fn test_create_stores_then_broadcasts() {
    let console = ConsoleHarness::start().await;
    console.login().await;

    let response = console.post_form("/dashboard/alerts", ALERT_FORM).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response).as_deref(), Some("/dashboard/alerts"));

    let stored = console.api.state().alerts[0].clone();
    assert_eq!(stored["title"], "Exam schedule");
    assert_eq!(stored["duration"], json!(30_000));
    assert_eq!(stored["isGlobal"], json!(true));
    assert_eq!(console.api.requests_to("/alerts/al-1/broadcast").len(), 1);

    let (_, html) = console.get("/dashboard/alerts").await;
    assert!(html.contains("Alert created successfully"));
    assert!(!html.contains("could not be broadcast"));
}

#[tokio::test]
async fn test_failed_broadcast_keeps_alert_and_warns() {
    let console = ConsoleHarness::start().await;
    console.api.fail_on("al-1");
    console.login().await;

    let response = console.post_form("/dashboard/alerts", ALERT_FORM).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(console.api.state().alerts.len(), 1);
    assert!(console.api.requests_to("/alerts/al-1").is_empty());

    let (_, html) = console.get("/dashboard/alerts").await;
    assert!(html.contains("Alert created successfully"));
    assert!(html.contains("Alert was created but could not be broadcast"));
    assert!(html.contains("Exam schedule"));
}

#[tokio::test]
async fn test_create_without_echoed_alert_skips_broadcast() {
    let console = ConsoleHarness::start().await;
    console.api.state().omit_created_alert = true;
    console.login().await;

    let response = console.post_form("/dashboard/alerts", ALERT_FORM).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response).as_deref(), Some("/dashboard/alerts"));
    assert_eq!(console.api.state().alerts.len(), 1);
    assert!(console.api.requests_to("/broadcast").is_empty());

    let (_, html) = console.get("/dashboard/alerts").await;
    assert!(html.contains("Alert created successfully"));
    assert!(html.contains("Alert was created but could not be broadcast"));
}

#[tokio::test]
async fn test_delete_waits_for_confirmation() {
    let console = ConsoleHarness::start().await;
    console.api.seed_alert(alert("al-1", "Early closure", true));
    console.login().await;

    let (status, confirm) = console.get("/dashboard/alerts/al-1/delete").await;
    assert_eq!(status, StatusCode::OK);
    assert!(confirm.contains("Delete alert?"));
    assert_eq!(console.api.state().alerts.len(), 1);

    let unconfirmed = console.post_form("/dashboard/alerts/al-1/delete", &[]).await;
    assert_eq!(unconfirmed.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&unconfirmed).as_deref(),
        Some("/dashboard/alerts/al-1/delete")
    );
    assert_eq!(console.api.state().alerts.len(), 1);

    let confirmed = console
        .post_form("/dashboard/alerts/al-1/delete", &[("confirmed", "yes")])
        .await;
    assert_eq!(confirmed.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&confirmed).as_deref(), Some("/dashboard/alerts"));
    assert!(console.api.state().alerts.is_empty());

    let deletes: Vec<_> = console
        .api
        .requests_to("/alerts/al-1")
        .into_iter()
        .filter(|r| r.method == "DELETE")
        .collect();
    assert_eq!(deletes.len(), 1);

    let (_, html) = console.get("/dashboard/alerts").await;
    assert!(html.contains("Alert deleted successfully"));
    assert!(!html.contains("Early closure"));
}
