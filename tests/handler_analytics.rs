mod common;

use axum_test::TestServer;
use chrono::{Duration, Utc};
use serde_json::Value;

#[tokio::test]
async fn test_analytics_not_found() {
    let ctx = common::create_test_context().await;
    let server = TestServer::new(ctx.app()).unwrap();

    let response = server.get("/api/v1/analytics/nothing").await;

    response.assert_status_not_found();
}

#[tokio::test]
async fn test_analytics_empty_link() {
    let ctx = common::create_test_context().await;
    common::create_test_link(&ctx.pool, "quiet", "https://example.com", None).await;
    let server = TestServer::new(ctx.app()).unwrap();

    let response = server.get("/api/v1/analytics/quiet").await;

    assert_eq!(response.status_code(), 200);

    let body: Value = response.json();
    assert_eq!(body["url"]["shortCode"], "quiet");
    assert_eq!(body["url"]["originalUrl"], "https://example.com");
    assert_eq!(body["totalClicks"], 0);
    assert_eq!(body["uniqueVisitors"], 0);
    assert_eq!(body["clicksByCountry"], serde_json::json!({}));
    assert_eq!(body["clicksByDay"], serde_json::json!([]));
    assert_eq!(body["recentClicks"], serde_json::json!([]));
}

#[tokio::test]
async fn test_analytics_counts_and_groups() {
    let ctx = common::create_test_context().await;
    let pool = &ctx.pool;
    common::create_test_link(pool, "busy", "https://example.com", None).await;

    let now = Utc::now();
    common::create_test_click(pool, "busy", Some("1.1.1.1"), Some("Germany"), now).await;
    common::create_test_click(pool, "busy", Some("1.1.1.1"), Some("Germany"), now).await;
    common::create_test_click(pool, "busy", Some("2.2.2.2"), Some("France"), now).await;
    common::create_test_click(pool, "busy", None, None, now - Duration::days(1)).await;
    common::create_test_click(pool, "busy", Some("3.3.3.3"), Some(""), now - Duration::days(40)).await;
    common::create_test_click(pool, "other", Some("9.9.9.9"), Some("Spain"), now).await;

    let server = TestServer::new(ctx.app()).unwrap();
    let body: Value = server.get("/api/v1/analytics/busy").await.json();

    assert_eq!(body["totalClicks"], 5);
    assert_eq!(body["uniqueVisitors"], 3);
    assert_eq!(body["clicksByCountry"]["Germany"], 2);
    assert_eq!(body["clicksByCountry"]["France"], 1);
    assert_eq!(body["clicksByCountry"].as_object().unwrap().len(), 2);

    let days = body["clicksByDay"].as_array().unwrap();
    assert_eq!(days.len(), 2);
    assert_eq!(days[0]["date"], now.format("%Y-%m-%d").to_string());
    assert_eq!(days[0]["clicks"], 3);
    assert_eq!(days[1]["clicks"], 1);

    let recent = body["recentClicks"].as_array().unwrap();
    assert_eq!(recent.len(), 5);
    assert_eq!(recent[4]["clientAddress"], "3.3.3.3");
}

#[tokio::test]
async fn test_analytics_limits_countries_and_recent_clicks() {
    let ctx = common::create_test_context().await;
    let pool = &ctx.pool;
    common::create_test_link(pool, "global", "https://example.com", None).await;

    let now = Utc::now();
    for i in 0..12 {
        let country = format!("Country{:02}", i);
        for _ in 0..=i {
            common::create_test_click(pool, "global", None, Some(&country), now).await;
        }
    }

    let server = TestServer::new(ctx.app()).unwrap();
    let body: Value = server.get("/api/v1/analytics/global").await.json();

    let countries = body["clicksByCountry"].as_object().unwrap();
    assert_eq!(countries.len(), 10);
    assert!(countries.contains_key("Country11"));
    assert!(!countries.contains_key("Country00"));
    assert!(!countries.contains_key("Country01"));

    assert_eq!(body["recentClicks"].as_array().unwrap().len(), 10);
}

#[tokio::test]
async fn test_analytics_available_for_expired_link() {
    let ctx = common::create_test_context().await;
    common::create_test_link(
        &ctx.pool,
        "old",
        "https://example.com",
        Some(Utc::now() - Duration::days(2)),
    )
    .await;
    let server = TestServer::new(ctx.app()).unwrap();

    let response = server.get("/api/v1/analytics/old").await;

    assert_eq!(response.status_code(), 200);
}
