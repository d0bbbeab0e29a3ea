//! Page server rendering data from the mock crawl service.

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use fedi_browser::client::FediClient;
use fedi_browser::web::{create_router, AppState};
use tower::ServiceExt;

use crate::mock_service::{refused_url, MockService, KNOWN_ID, MISSING_ID};

async fn get(state: AppState, uri: &str) -> (StatusCode, String) {
    let response = create_router(state)
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

fn state_for(service: &MockService) -> AppState {
    AppState::new(FediClient::with_base_url(service.base_url.clone()).unwrap())
}

#[tokio::test]
async fn home_lists_instances() {
    let service = MockService::start().await;

    let (status, html) = get(state_for(&service), "/?page=2").await;

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("a.example"));
    assert!(html.contains("Page 2 of 3 (61 total)"));
    assert!(html.contains("href=\"/?page=1\""));
    assert!(html.contains("href=\"/?page=3\""));
    assert_eq!(
        service.recorder.requests()[0].query.as_deref(),
        Some("page=2&per_page=30")
    );
}

#[tokio::test]
async fn home_with_bad_page_falls_back_to_first() {
    let service = MockService::start().await;

    let (status, _) = get(state_for(&service), "/?page=zero&software=lemmy").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        service.recorder.requests()[0].query.as_deref(),
        Some("software=lemmy&page=1&per_page=30")
    );
}

#[tokio::test]
async fn home_with_repeated_page_key_falls_back_to_first() {
    let service = MockService::start().await;

    let (status, html) = get(state_for(&service), "/?page=2&page=3").await;

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("a.example"));
    assert_eq!(
        service.recorder.requests()[0].query.as_deref(),
        Some("page=1&per_page=30")
    );
}

#[tokio::test]
async fn instance_page_shows_detail_and_crawls() {
    let service = MockService::start().await;

    let (status, html) = get(state_for(&service), &format!("/instances/{}", KNOWN_ID)).await;

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("<h1>mastodon.example</h1>"));
    assert!(html.contains("mastodon 4.2.1"));
    assert!(html.contains("status-timeout"));
    assert_eq!(service.recorder.count(), 2);
}

#[tokio::test]
async fn missing_instance_renders_service_status() {
    let service = MockService::start().await;

    let (status, html) = get(state_for(&service), &format!("/instances/{}", MISSING_ID)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(html.contains("instance not found"));
}

#[tokio::test]
async fn unreachable_service_renders_bad_gateway() {
    let state = AppState::new(FediClient::with_base_url(refused_url()).unwrap());

    let (status, html) = get(state, "/").await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(html.contains("Error 502"));
}
