//! HTTP transport against a local mock front-end
//!
//! Every mock carries an `expect(n)` so the server verifies on drop that
//! exactly n requests arrived (no retries, no duplicates).

use revalidate_core::traits::{OutboundRequest, PostRef, RevalidationTransport};
use revalidate_core::{
    EngineEvent, Error, MemoryConfigProvider, MemoryContentStore, RevalidateConfig,
    RevalidateEngine, RevalidationRequest, SiteOptions,
};
use revalidate_http::HttpTransport;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn outbound(base_url: &str, request: &RevalidationRequest) -> OutboundRequest {
    let endpoint = SiteOptions::new(base_url, "abc").endpoint().unwrap();
    OutboundRequest::new(&endpoint, request).unwrap()
}

fn default_transport() -> HttpTransport {
    HttpTransport::new(&Default::default()).unwrap()
}

#[tokio::test]
async fn posts_json_body_with_secret_header() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/revalidate"))
        .and(header("x-webhook-secret", "abc"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"contentType": "post", "contentId": 42})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let response = default_transport()
        .post(&outbound(&server.uri(), &RevalidationRequest::new("post", 42)))
        .await
        .unwrap();

    assert_eq!(response.status, 200);
    assert!(response.is_success());
}

#[tokio::test]
async fn trailing_slash_in_base_url_is_trimmed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/revalidate"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let base_url = format!("{}/", server.uri());
    let response = default_transport()
        .post(&outbound(&base_url, &RevalidationRequest::new("author", 7)))
        .await
        .unwrap();

    assert_eq!(response.status, 204);
}

#[tokio::test]
async fn non_success_status_is_returned_once() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/revalidate"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let response = default_transport()
        .post(&outbound(&server.uri(), &RevalidationRequest::new("post", 42)))
        .await
        .unwrap();

    assert_eq!(response.status, 503);
    assert!(!response.is_success());
}

#[tokio::test]
async fn connection_refused_is_transport_error() {
    // Reserve a port, then free it so nothing is listening
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let result = default_transport()
        .post(&outbound(
            &format!("http://{}", addr),
            &RevalidationRequest::new("post", 42),
        ))
        .await;

    assert!(matches!(result, Err(Error::Transport(_))));
}

#[tokio::test]
async fn redirects_are_followed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/revalidate"))
        .respond_with(
            ResponseTemplate::new(307)
                .insert_header("location", format!("{}/api/revalidate/final", server.uri())),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/revalidate/final"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let response = default_transport()
        .post(&outbound(&server.uri(), &RevalidationRequest::new("page", 3)))
        .await
        .unwrap();

    assert_eq!(response.status, 200);
}

#[tokio::test]
async fn redirect_limit_is_enforced() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/revalidate"))
        .respond_with(
            ResponseTemplate::new(307).insert_header("location", format!("{}/hop/1", server.uri())),
        )
        .mount(&server)
        .await;
    for hop in 1..10 {
        Mock::given(method("POST"))
            .and(path(format!("/hop/{}", hop)))
            .respond_with(
                ResponseTemplate::new(307)
                    .insert_header("location", format!("{}/hop/{}", server.uri(), hop + 1)),
            )
            .mount(&server)
            .await;
    }

    let transport = HttpTransport::with_limits(Duration::from_secs(5), 2).unwrap();
    let result = transport
        .post(&outbound(&server.uri(), &RevalidationRequest::new("post", 1)))
        .await;

    assert!(matches!(result, Err(Error::Transport(_))));
}

#[tokio::test]
async fn slow_front_end_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/revalidate"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let transport = HttpTransport::with_limits(Duration::from_millis(200), 5).unwrap();
    let result = transport
        .post(&outbound(&server.uri(), &RevalidationRequest::new("post", 1)))
        .await;

    match result {
        Err(Error::Transport(message)) => assert!(message.contains("timed out"), "{}", message),
        other => panic!("expected transport error, got {:?}", other),
    }
}

#[tokio::test]
async fn engine_delivers_trash_event_end_to_end() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/revalidate"))
        .and(header("x-webhook-secret", "abc"))
        .and(body_json(json!({"contentType": "post", "contentId": 42})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let store = MemoryContentStore::new();
    store.insert_post(PostRef::new(42, "post")).unwrap();

    let (engine, mut events) = RevalidateEngine::new(
        Box::new(store),
        Box::new(MemoryConfigProvider::with_options(SiteOptions::new(
            server.uri(),
            "abc",
        ))),
        Box::new(default_transport()),
        RevalidateConfig::default(),
    )
    .unwrap();

    engine.on_trash_post(42).await;

    let mut succeeded = false;
    while let Ok(event) = events.try_recv() {
        if matches!(event, EngineEvent::Succeeded { status: 200, .. }) {
            succeeded = true;
        }
    }
    assert!(succeeded);
}

#[tokio::test]
async fn engine_does_not_retry_rejections() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/revalidate"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let (engine, mut events) = RevalidateEngine::new(
        Box::new(MemoryContentStore::new()),
        Box::new(MemoryConfigProvider::with_options(SiteOptions::new(
            server.uri(),
            "abc",
        ))),
        Box::new(default_transport()),
        RevalidateConfig::default(),
    )
    .unwrap();

    engine.on_attachment_edited(9).await;

    let mut rejected = false;
    while let Ok(event) = events.try_recv() {
        if matches!(event, EngineEvent::Rejected { status: 503, .. }) {
            rejected = true;
        }
    }
    assert!(rejected);
}
