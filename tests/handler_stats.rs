mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use serde_json::Value;
use shortlink::domain::click_event::ClickEvent;
use shortlink::domain::repositories::LinkRepository;

#[tokio::test]
async fn test_link_stats_after_redirects() {
    let (server, store) = common::spawn_app();
    common::create_test_link(&store, "promo", "https://example.com/s", None).await;

    for country in [Some("de"), Some("DE"), None] {
        let mut request = server.get("/promo");
        if let Some(country) = country {
            request = request.add_header("cf-ipcountry", country);
        }
        request.await.assert_status(StatusCode::FOUND);
    }
    common::wait_for_clicks(&store, "promo", 3, 3).await;

    let response = server.get("/links/promo/stats").await;
    response.assert_status_ok();

    let body = response.json::<Value>();
    assert_eq!(body["slug"], "promo");
    assert_eq!(body["destination"], "https://example.com/s");
    assert_eq!(body["click_count"], 3);
    assert_eq!(body["recorded_clicks"], 3);

    assert_eq!(body["countries"][0]["country"], "DE");
    assert_eq!(body["countries"][0]["total"], 2);
    assert_eq!(body["countries"][0]["percent"], 67);
    assert_eq!(body["countries"][1]["country"], "Unknown");
    assert_eq!(body["countries"][1]["percent"], 33);

    let daily = body["daily"].as_array().unwrap();
    assert_eq!(daily.len(), 1);
    assert_eq!(daily[0]["clicks"], 3);
}

#[tokio::test]
async fn test_link_stats_ignores_history_of_previous_owner_of_slug() {
    let (server, store) = common::spawn_app();

    // A click row left over from a deleted link with the same slug.
    store
        .append_click_event(ClickEvent::at(
            "reused",
            Some("FR"),
            Utc::now() - Duration::days(3),
        ))
        .await
        .unwrap();
    common::create_test_link(&store, "reused", "https://example.com/new", None).await;

    let body = server.get("/links/reused/stats").await.json::<Value>();

    assert_eq!(body["recorded_clicks"], 0);
    assert!(body["countries"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_link_stats_date_filter() {
    let (server, store) = common::spawn_app();
    common::create_test_link(&store, "ranged", "https://example.com/", None).await;
    store
        .append_click_event(ClickEvent::new("ranged", Some("US")))
        .await
        .unwrap();

    let future = (Utc::now() + Duration::days(1)).to_rfc3339();
    let body = server
        .get("/links/ranged/stats")
        .add_query_param("from", &future)
        .await
        .json::<Value>();

    assert_eq!(body["recorded_clicks"], 0);
}

#[tokio::test]
async fn test_link_stats_not_found() {
    let (server, _store) = common::spawn_app();

    server
        .get("/links/nonexistent/stats")
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn test_link_stats_rejects_bad_range() {
    let (server, store) = common::spawn_app();
    common::create_test_link(&store, "ranged", "https://example.com/", None).await;

    let response = server
        .get("/links/ranged/stats")
        .add_query_param("from", "2026-02-01T00:00:00Z")
        .add_query_param("to", "2026-01-01T00:00:00Z")
        .await;
    response.assert_status_bad_request();
    assert_eq!(response.json::<Value>()["error"]["code"], "validation_error");

    server
        .get("/links/ranged/stats")
        .add_query_param("from", "yesterday")
        .await
        .assert_status_bad_request();
}

// ─── GET /links/stats ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_owner_overview_combines_owned_links() {
    let (server, store) = common::spawn_app();
    common::create_test_link(&store, "docs", "https://example.com/docs", Some("alice")).await;
    common::create_test_link(&store, "blog", "https://example.com/blog", Some("alice")).await;
    common::create_test_link(&store, "quiet", "https://example.com/quiet", Some("alice")).await;
    common::create_test_link(&store, "elsewhere", "https://example.com/", Some("bob")).await;

    for (slug, country) in [
        ("docs", "DE"),
        ("docs", "DE"),
        ("docs", "US"),
        ("blog", "DE"),
        ("elsewhere", "FR"),
    ] {
        server
            .get(&format!("/{slug}"))
            .add_header("cf-ipcountry", country)
            .await
            .assert_status(StatusCode::FOUND);
    }
    common::wait_for_clicks(&store, "docs", 3, 5).await;
    common::wait_for_clicks(&store, "blog", 1, 5).await;

    let response = server
        .get("/links/stats")
        .add_header("x-user-id", "alice")
        .await;
    response.assert_status_ok();

    let body = response.json::<Value>();
    assert_eq!(body["owner"], "alice");
    assert_eq!(body["link_count"], 3);
    assert_eq!(body["click_count"], 4);
    assert_eq!(body["recorded_clicks"], 4);

    assert_eq!(body["countries"][0]["country"], "DE");
    assert_eq!(body["countries"][0]["total"], 3);
    assert_eq!(body["countries"][0]["percent"], 75);
    assert_eq!(body["countries"][1]["country"], "US");
    assert_eq!(body["countries"][1]["percent"], 25);
    assert_eq!(body["countries"].as_array().unwrap().len(), 2);

    let daily = body["daily"].as_array().unwrap();
    assert_eq!(daily.len(), 1);
    assert_eq!(daily[0]["clicks"], 4);

    let top = body["top_links"].as_array().unwrap();
    assert_eq!(top.len(), 3);
    assert_eq!(top[0]["slug"], "docs");
    assert_eq!(top[0]["click_count"], 3);
    assert_eq!(top[1]["slug"], "blog");
    assert_eq!(top[2]["click_count"], 0);
}

#[tokio::test]
async fn test_owner_overview_lists_at_most_five_links() {
    let (server, store) = common::spawn_app();
    for slug in ["l1", "l2", "l3", "l4", "l5", "l6", "l7"] {
        common::create_test_link(&store, slug, "https://example.com/", Some("alice")).await;
    }

    let body = server
        .get("/links/stats")
        .add_header("x-user-id", "alice")
        .await
        .json::<Value>();

    assert_eq!(body["link_count"], 7);
    assert_eq!(body["top_links"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_owner_overview_without_links_is_empty() {
    let (server, _store) = common::spawn_app();

    let body = server
        .get("/links/stats")
        .add_header("x-user-id", "nobody")
        .await
        .json::<Value>();

    assert_eq!(body["link_count"], 0);
    assert_eq!(body["click_count"], 0);
    assert!(body["countries"].as_array().unwrap().is_empty());
    assert!(body["top_links"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_owner_overview_requires_owner() {
    let (server, _store) = common::spawn_app();

    let response = server.get("/links/stats").await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}
