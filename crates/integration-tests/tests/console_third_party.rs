//! Third-party listing, search and multipart creation against the mock API.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use dvs_integration_tests::{ConsoleHarness, SUPER_ADMIN_ID, location, row_count};
use reqwest::StatusCode;
use reqwest::multipart::{Form, Part};
use serde_json::{Value, json};

const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

fn create_form(password: &str) -> Form {
    Form::new()
        .text("name", "Kiran Traders")
        .text("email", "kiran@vendor.in")
        .text("password", password.to_string())
        .text("schools", "a1|Green Valley School")
        .text("schools", "a2|Lotus Public School")
        .part(
            "image",
            Part::bytes(PNG.to_vec())
                .file_name("avatar.png")
                .mime_str("image/png")
                .unwrap(),
        )
}

#[tokio::test]
async fn test_list_is_fetched_once_and_paged_locally() {
    let console = ConsoleHarness::start().await;
    console.api.seed_third_parties(15);
    console.login().await;

    let (status, html) = console.get("/dashboard/thirdparty?page=1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(row_count(&html), 5);
    assert!(html.contains("Page 2 of 2"));
    assert!(html.contains("15 total"));
    assert!(html.contains("Partner 15"));

    let listed = console
        .api
        .requests_to(&format!("/superAdmin/thirdparty/{SUPER_ADMIN_ID}"));
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].query, None);
}

#[tokio::test]
async fn test_short_list_has_a_single_page() {
    let console = ConsoleHarness::start().await;
    console.api.seed_third_parties(7);
    console.login().await;

    let (status, html) = console.get("/dashboard/thirdparty?page=1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(row_count(&html), 7);
    assert!(!html.contains("Page 2"));
}

#[tokio::test]
async fn test_search_matches_school_names_across_pages() {
    let console = ConsoleHarness::start().await;
    console.api.seed_third_parties(11);
    console
        .api
        .seed_third_party("Meher Books", "meher@vendor.in", "Lotus Public School");
    console.login().await;

    let (status, html) = console.get("/dashboard/thirdparty?q=LOTUS").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(row_count(&html), 1);
    assert!(html.contains("Meher Books"));
    assert!(!html.contains("Partner 01"));

    let (_, by_email) = console.get("/dashboard/thirdparty?q=partner3%40").await;
    assert_eq!(row_count(&by_email), 1);
    assert!(by_email.contains("Partner 03"));
}

#[tokio::test]
async fn test_create_sends_schools_and_image_as_multipart() {
    let console = ConsoleHarness::start().await;
    console.login().await;

    let response = console
        .post_multipart("/dashboard/thirdparty", create_form("vendor-pass-9"))
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response).as_deref(), Some("/dashboard/thirdparty"));

    let uploads = console.api.state().third_party_uploads.clone();
    assert_eq!(uploads.len(), 1);
    let part = |name: &str| uploads[0].iter().find(|p| p.name == name).unwrap().clone();

    assert_eq!(part("name").text(), "Kiran Traders");
    assert_eq!(part("superAdminId").text(), SUPER_ADMIN_ID);
    let schools: Value = serde_json::from_str(&part("assignedSchools").text()).unwrap();
    assert_eq!(
        schools,
        json!([
            { "schoolId": "a1", "schoolName": "Green Valley School" },
            { "schoolId": "a2", "schoolName": "Lotus Public School" }
        ])
    );

    let image = part("image");
    assert_eq!(image.file_name.as_deref(), Some("avatar.png"));
    assert_eq!(image.content_type.as_deref(), Some("image/png"));
    assert_eq!(image.body, PNG);

    let (_, html) = console.get("/dashboard/thirdparty").await;
    assert!(html.contains("Third-party user created successfully"));
    assert!(html.contains("Kiran Traders"));
    assert!(html.contains("Green Valley School, Lotus Public School"));
    assert!(!html.contains("vendor-pass-9"));
}

#[tokio::test]
async fn test_create_without_name_sends_nothing() {
    let console = ConsoleHarness::start().await;
    console.login().await;

    let form = Form::new()
        .text("name", "")
        .text("email", "kiran@vendor.in")
        .text("password", "never-shown")
        .text("schools", "a1|Green Valley School");
    let response = console.post_multipart("/dashboard/thirdparty", form).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let html = response.text().await.unwrap();
    assert!(html.contains("Name is required"));
    assert!(html.contains("Green Valley School"));
    assert!(!html.contains("never-shown"));
    assert!(
        console
            .api
            .requests_to("/superAdmin/createThirdParty")
            .is_empty()
    );
}
