//! Request layer against the mock crawl service.

use std::time::Duration;

use fedi_browser::client::{ApiResponse, FediClient, PageParams};
use fedi_browser::error::ClientError;
use fedi_browser::models::{CrawlStatus, Instance, InstanceStatus};
use pretty_assertions::assert_eq;

use crate::mock_service::{
    known_instance_json, refused_url, start_closing_server, MockService, BROKEN_ID, KNOWN_ID,
    MALFORMED_ID, MISSING_ID, SLOW_ID,
};

fn client(service: &MockService) -> FediClient {
    FediClient::with_base_url(service.base_url.clone()).unwrap()
}

#[tokio::test]
async fn list_instances_sends_default_paging() {
    let service = MockService::start().await;

    let response = client(&service)
        .list_instances(None, PageParams::default())
        .await
        .unwrap();

    let page = response.ok().expect("expected success");
    assert_eq!(page.page, 1);
    assert_eq!(page.per_page, 30);
    assert_eq!(page.total, 61);
    let domains: Vec<&str> = page.results.iter().map(|i| i.domain.as_str()).collect();
    assert_eq!(domains, vec!["b.example", "a.example", "c.example"]);

    let requests = service.recorder.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].path, "/api/v1/instances");
    assert_eq!(requests[0].query.as_deref(), Some("page=1&per_page=30"));
}

#[tokio::test]
async fn list_instances_forwards_filter_and_paging_verbatim() {
    let service = MockService::start().await;

    let page = client(&service)
        .list_instances(Some("mastodon"), PageParams::new(3, 7))
        .await
        .unwrap()
        .into_result()
        .unwrap();

    assert_eq!(page.page, 3);
    assert_eq!(page.per_page, 7);
    assert_eq!(page.results.len(), 1);
    assert_eq!(page.results[0].status, InstanceStatus::Unhealthy);

    let requests = service.recorder.requests();
    assert_eq!(
        requests[0].query.as_deref(),
        Some("software=mastodon&page=3&per_page=7")
    );
}

#[tokio::test]
async fn out_of_range_paging_is_not_validated_by_client() {
    let service = MockService::start().await;

    let response = client(&service)
        .list_instances(None, PageParams::new(0, 500))
        .await
        .unwrap();

    match response {
        ApiResponse::Failure(error) => {
            assert_eq!(error.status, 400);
            assert_eq!(error.payload.code, Some(400));
        }
        ApiResponse::Success(_) => panic!("expected the service to reject per_page=500"),
    }
    assert_eq!(
        service.recorder.requests()[0].query.as_deref(),
        Some("page=0&per_page=500")
    );
}

#[tokio::test]
async fn get_instance_percent_encodes_id() {
    let service = MockService::start().await;

    let instance = client(&service)
        .get_instance_by_id("odd id/with?chars#")
        .await
        .unwrap()
        .into_result()
        .unwrap();

    assert_eq!(instance.id, "odd id/with?chars#");
    assert_eq!(
        service.recorder.requests()[0].path,
        "/api/v1/instances/odd%20id%2Fwith%3Fchars%23"
    );
}

#[tokio::test]
async fn known_instance_round_trips_without_defaulting() {
    let service = MockService::start().await;

    let instance = client(&service)
        .get_instance_by_id(KNOWN_ID)
        .await
        .unwrap()
        .ok()
        .unwrap();

    assert!(instance.description.is_none());
    assert!(instance.active_users_half_year.is_none());
    assert!(instance.local_comments.is_none());

    let encoded = serde_json::to_value(&instance).unwrap();
    assert_eq!(encoded, known_instance_json());

    let decoded: Instance = serde_json::from_value(encoded).unwrap();
    assert_eq!(decoded, instance);
}

#[tokio::test]
async fn service_error_resolves_to_failure() {
    let service = MockService::start().await;

    let response = client(&service).get_instance_by_id(MISSING_ID).await;

    match response {
        Ok(ApiResponse::Failure(error)) => {
            assert_eq!(error.status, 404);
            assert!(error.is_not_found());
            assert_eq!(error.payload.code, Some(404));
            assert_eq!(error.message(), "instance not found");
        }
        other => panic!("expected modeled failure, got {:?}", other),
    }
}

#[tokio::test]
async fn non_json_error_body_is_still_a_failure() {
    let service = MockService::start().await;

    let response = client(&service)
        .get_instance_by_id(BROKEN_ID)
        .await
        .unwrap();

    let error = response.into_result().unwrap_err();
    assert_eq!(error.status, 500);
    assert_eq!(error.message(), "upstream exploded");
}

#[tokio::test]
async fn malformed_success_body_is_a_decode_error() {
    let service = MockService::start().await;

    let result = client(&service).get_instance_by_id(MALFORMED_ID).await;

    assert!(matches!(
        result,
        Err(ClientError::Decode {
            endpoint: "get_instance_by_id",
            ..
        })
    ));
}

#[tokio::test]
async fn closed_connection_rejects_with_transport_error() {
    let base = start_closing_server().await;
    let client = FediClient::with_base_url(base).unwrap();

    let result = client.get_instance_by_id(KNOWN_ID).await;

    assert!(matches!(result, Err(ClientError::Transport(_))));
}

#[tokio::test]
async fn refused_connection_rejects_with_transport_error() {
    let client = FediClient::with_base_url(refused_url()).unwrap();

    let result = client.list_instances(None, PageParams::default()).await;

    match result {
        Err(ClientError::Transport(e)) => assert!(e.is_connect()),
        other => panic!("expected transport error, got {:?}", other),
    }
}

#[tokio::test]
async fn list_crawls_decodes_history() {
    let service = MockService::start().await;

    let page = client(&service)
        .list_crawls_for_instance(KNOWN_ID, PageParams::new(2, 10))
        .await
        .unwrap()
        .into_result()
        .unwrap();

    assert_eq!(page.page, 2);
    assert_eq!(page.per_page, 10);
    let statuses: Vec<CrawlStatus> = page.results.iter().map(|c| c.status).collect();
    assert_eq!(
        statuses,
        vec![
            CrawlStatus::Completed,
            CrawlStatus::Timeout,
            CrawlStatus::Completed
        ]
    );
    assert!(page.results.iter().all(|c| c.instance_id == KNOWN_ID));

    let request = &service.recorder.requests()[0];
    assert_eq!(request.path, format!("/api/v1/instances/{}/crawls", KNOWN_ID));
    assert_eq!(request.query.as_deref(), Some("page=2&per_page=10"));
}

#[tokio::test]
async fn cancel_before_response_hides_result() {
    let service = MockService::start().await;
    let call = client(&service).get_instance_by_id(SLOW_ID);
    let handle = call.cancel_handle();

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        handle.cancel();
    });

    let result = tokio::time::timeout(Duration::from_secs(2), call)
        .await
        .expect("cancellation should resolve before the slow response");

    assert!(matches!(result, Err(ClientError::Cancelled)));
    assert_eq!(service.recorder.count(), 1);
}

#[tokio::test]
async fn dropping_in_flight_call_cancels_it() {
    let service = MockService::start().await;
    let mut call = client(&service).get_instance_by_id(SLOW_ID);
    let handle = call.cancel_handle();

    for _ in 0..100 {
        let polled = tokio::time::timeout(Duration::from_millis(20), &mut call).await;
        assert!(polled.is_err(), "slow call resolved early: {:?}", polled);
        if service.recorder.count() == 1 {
            break;
        }
    }
    assert_eq!(service.recorder.count(), 1);
    assert!(!handle.is_cancelled());

    drop(call);

    assert!(handle.is_cancelled());
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(service.recorder.slow_answered(), 0);
    assert_eq!(service.recorder.count(), 1);
}

#[tokio::test]
async fn cancel_before_polling_sends_nothing() {
    let service = MockService::start().await;
    let call = client(&service).get_instance_by_id(KNOWN_ID);

    call.cancel();
    assert!(call.is_cancelled());
    assert!(matches!(call.await, Err(ClientError::Cancelled)));

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(service.recorder.count(), 0);
}

#[tokio::test]
async fn each_call_issues_exactly_one_request() {
    let service = MockService::start().await;
    let client = client(&service);

    let (first, second) = tokio::join!(
        client.list_instances(None, PageParams::new(1, 30)),
        client.list_instances(None, PageParams::new(2, 30)),
    );

    assert_eq!(first.unwrap().ok().unwrap().page, 1);
    assert_eq!(second.unwrap().ok().unwrap().page, 2);
    assert_eq!(service.recorder.count(), 2);
}
