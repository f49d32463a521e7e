//! HttpFetcher against a mock HTTP server

use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread;

use serde_json::json;
use url::Url;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use xano_export::error::{FetchError, StatusKind};
use xano_export::fetch::JsonObject;
use xano_export::retrieve::StopReason;
use xano_export::{BulkRetriever, ClientConfig, HttpFetcher, PageFetcher};

/// Run a blocking fetch off the async test runtime
async fn fetch_blocking(config: ClientConfig, url: String) -> Result<JsonObject, FetchError> {
    tokio::task::spawn_blocking(move || {
        let fetcher = HttpFetcher::new(&config)?;
        let url = Url::parse(&url).unwrap();
        fetcher.fetch(&url)
    })
    .await
    .unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn test_sends_auth_and_source_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/workspace/1/table"))
        .and(header("accept", "application/json"))
        .and(header("x-data-source", "live"))
        .and(header("authorization", "Bearer secret-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
        .expect(1)
        .mount(&server)
        .await;

    let config = ClientConfig::new("secret-token", "1").with_base_url(server.uri());
    let body = fetch_blocking(config, format!("{}/workspace/1/table", server.uri()))
        .await
        .unwrap();

    assert_eq!(body.get("items"), Some(&json!([])));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_non_success_status_is_typed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad token"))
        .mount(&server)
        .await;

    let config = ClientConfig::new("wrong", "1").with_base_url(server.uri());
    let err = fetch_blocking(config, format!("{}/workspace/1/table", server.uri()))
        .await
        .unwrap_err();

    match err {
        FetchError::Status {
            status, kind, body, ..
        } => {
            assert_eq!(status.as_u16(), 401);
            assert_eq!(kind, StatusKind::Unauthorized);
            assert_eq!(body, "bad token");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_invalid_json_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let config = ClientConfig::new("t", "1").with_base_url(server.uri());
    let err = fetch_blocking(config, format!("{}/anything", server.uri()))
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Decode { .. }));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_non_object_body_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([1, 2, 3])))
        .mount(&server)
        .await;

    let config = ClientConfig::new("t", "1").with_base_url(server.uri());
    let err = fetch_blocking(config, format!("{}/anything", server.uri()))
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Decode { .. }));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_content_pagination_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/workspace/3/table/7/content"))
        .and(query_param("per_page", "2"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{"id": 1}, {"id": 2}],
            "nextPage": 4
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/workspace/3/table/7/content"))
        .and(query_param("page", "4"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
        .expect(1)
        .mount(&server)
        .await;

    let config = ClientConfig::new("t", "3")
        .with_base_url(server.uri())
        .with_per_page(2);

    let (count, reason) = tokio::task::spawn_blocking(move || {
        let fetcher = HttpFetcher::new(&config).unwrap();
        let retriever = BulkRetriever::new(fetcher, &config).unwrap();
        let mut pages = retriever.table_content(&xano_export::model::TableId::new("7"));
        let rows: Vec<_> = pages.by_ref().collect::<Result<_, _>>().unwrap();
        (rows.len(), pages.stop_reason().cloned())
    })
    .await
    .unwrap();

    assert_eq!(count, 2);
    match reason {
        Some(StopReason::RequestFailed { status, kind, .. }) => {
            assert_eq!(status.as_u16(), 500);
            assert_eq!(kind, StatusKind::Server);
        }
        other => panic!("unexpected stop reason: {:?}", other),
    }
}

#[test]
fn test_truncated_error_body_gets_placeholder() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let server = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut request = [0u8; 1024];
        let _ = stream.read(&mut request).unwrap();
        stream
            .write_all(b"HTTP/1.1 503 Service Unavailable\r\ncontent-length: 64\r\n\r\nshort")
            .unwrap();
    });

    let config = ClientConfig::new("t", "1");
    let fetcher = HttpFetcher::new(&config).unwrap();
    let url = Url::parse(&format!("http://{}/workspace/1/table", addr)).unwrap();
    let err = fetcher.fetch(&url).unwrap_err();
    server.join().unwrap();

    match err {
        FetchError::Status { status, kind, body, .. } => {
            assert_eq!(status.as_u16(), 503);
            assert_eq!(kind, StatusKind::Server);
            assert_eq!(body, "<unreadable body>");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_empty_token_rejected() {
    let config = ClientConfig::new("", "1");
    assert!(matches!(
        HttpFetcher::new(&config),
        Err(FetchError::InvalidHeader(_))
    ));
}
