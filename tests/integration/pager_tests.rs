//! Pagination, rate limiting and single-resource fetches against a mock LMS

use course_audit::api::{build_http_client, Extract, ThrottledPager};
use course_audit::config::{PagerConfig, UserAgentConfig};
use course_audit::AuditError;
use serde_json::{json, Value};
use std::time::{Duration, Instant};
use url::Url;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fast_config() -> PagerConfig {
    PagerConfig {
        request_delay: 0,
        retry_after_unit: 10,
        timeout: 5,
        ..PagerConfig::default()
    }
}

fn pager(config: PagerConfig, token: Option<&str>) -> ThrottledPager {
    let client = build_http_client(&UserAgentConfig::default(), config.timeout())
        .expect("Failed to build client");
    ThrottledPager::new(client, token.map(str::to_string), config)
}

fn seed(server: &MockServer, path: &str) -> Url {
    Url::parse(&format!("{}{}?per_page=2", server.uri(), path)).expect("Failed to parse seed")
}

#[tokio::test]
async fn test_follows_next_links_in_order() {
    let mock_server = MockServer::start().await;
    let next = format!(
        "<{}/api/v1/courses/1/enrollments?page=2&per_page=2>; rel=\"next\"",
        mock_server.uri()
    );

    // Page 2 must be mounted before the catch-all first page
    Mock::given(method("GET"))
        .and(path("/api/v1/courses/1/enrollments"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"user_id": 3}])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/courses/1/enrollments"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("link", next.as_str())
                .set_body_json(json!([{"user_id": 1}, {"user_id": 2}])),
        )
        .mount(&mock_server)
        .await;

    let items: Vec<Value> = pager(fast_config(), None)
        .fetch_all(seed(&mock_server, "/api/v1/courses/1/enrollments"), Extract::Array)
        .await
        .expect("Pagination failed");

    let ids: Vec<u64> = items.iter().filter_map(|v| v["user_id"].as_u64()).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_relative_next_link() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/courses/1/modules"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 2}])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/courses/1/modules"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("link", "</api/v1/courses/1/modules?page=2>; rel=\"next\"")
                .set_body_json(json!([{"id": 1}])),
        )
        .mount(&mock_server)
        .await;

    let items: Vec<Value> = pager(fast_config(), None)
        .fetch_all(seed(&mock_server, "/api/v1/courses/1/modules"), Extract::Array)
        .await
        .expect("Pagination failed");

    assert_eq!(items.len(), 2);
}

#[tokio::test]
async fn test_rate_limit_retries_same_url() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/courses/1/quizzes"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "5"))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/courses/1/quizzes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 7}])))
        .mount(&mock_server)
        .await;

    let start = Instant::now();
    let items: Vec<Value> = pager(fast_config(), None)
        .fetch_all(seed(&mock_server, "/api/v1/courses/1/quizzes"), Extract::Array)
        .await
        .expect("Rate-limited fetch failed");

    // 5 Retry-After "seconds" at 10ms each
    assert!(start.elapsed() >= Duration::from_millis(50));
    assert_eq!(items.len(), 1);

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].url, requests[1].url);
}

#[tokio::test]
async fn test_rate_limit_default_delay() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/courses/1/quizzes"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "soon"))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/courses/1/quizzes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let config = PagerConfig {
        retry_after_unit: 40,
        ..fast_config()
    };
    let start = Instant::now();
    let items: Vec<Value> = pager(config, None)
        .fetch_all(seed(&mock_server, "/api/v1/courses/1/quizzes"), Extract::Array)
        .await
        .expect("Rate-limited fetch failed");

    // Default of 2 "seconds" at 40ms each
    assert!(start.elapsed() >= Duration::from_millis(80));
    assert!(items.is_empty());
}

#[tokio::test]
async fn test_courtesy_delay_after_every_page() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/courses/1/assignments"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 2}])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/courses/1/assignments"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header(
                    "link",
                    "</api/v1/courses/1/assignments?page=2>; rel=\"next\", </api/v1/courses/1/assignments?page=1>; rel=\"first\"",
                )
                .set_body_json(json!([{"id": 1}])),
        )
        .mount(&mock_server)
        .await;

    let config = PagerConfig {
        request_delay: 60,
        ..fast_config()
    };
    let start = Instant::now();
    let items: Vec<Value> = pager(config, None)
        .fetch_all(seed(&mock_server, "/api/v1/courses/1/assignments"), Extract::Array)
        .await
        .expect("Pagination failed");

    // One delay after each of the two pages, including the last
    assert!(start.elapsed() >= Duration::from_millis(120));
    assert_eq!(items.len(), 2);
}

#[tokio::test]
async fn test_named_field_extraction() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/courses/1/quizzes/5/submissions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "quiz_submissions": [{"user_id": 1}, {"user_id": 2}],
            "users": []
        })))
        .mount(&mock_server)
        .await;

    let items: Vec<Value> = pager(fast_config(), None)
        .fetch_all(
            seed(&mock_server, "/api/v1/courses/1/quizzes/5/submissions"),
            Extract::Field("quiz_submissions"),
        )
        .await
        .expect("Fetch failed");

    assert_eq!(items.len(), 2);
}

#[tokio::test]
async fn test_error_status_body_contributes_no_items() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/courses/1/enrollments"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "status": "unauthorized",
            "errors": [{"message": "user not authorized to perform that action"}]
        })))
        .mount(&mock_server)
        .await;

    let items: Vec<Value> = pager(fast_config(), None)
        .fetch_all(seed(&mock_server, "/api/v1/courses/1/enrollments"), Extract::Array)
        .await
        .expect("An error body should not fail the collection");

    assert!(items.is_empty());
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_non_json_error_body_fails_to_decode() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/courses/1/enrollments"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&mock_server)
        .await;

    let result: Result<Vec<Value>, AuditError> = pager(fast_config(), None)
        .fetch_all(seed(&mock_server, "/api/v1/courses/1/enrollments"), Extract::Array)
        .await;

    let err = result.unwrap_err();
    assert!(matches!(err, AuditError::Decode { .. }));
    assert!(!err.is_transport());
}

#[tokio::test]
async fn test_page_limit() {
    let mock_server = MockServer::start().await;

    // Every page points at itself
    Mock::given(method("GET"))
        .and(path("/api/v1/courses/1/modules"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("link", "</api/v1/courses/1/modules>; rel=\"next\"")
                .set_body_json(json!([{"id": 1}])),
        )
        .mount(&mock_server)
        .await;

    let config = PagerConfig {
        max_pages: 3,
        ..fast_config()
    };
    let result: Result<Vec<Value>, AuditError> = pager(config, None)
        .fetch_all(seed(&mock_server, "/api/v1/courses/1/modules"), Extract::Array)
        .await;

    let err = result.unwrap_err();
    assert!(matches!(err, AuditError::PageLimitExceeded { max_pages: 3, .. }));
    assert!(err.is_transport());
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_transport_error() {
    let mock_server = MockServer::start().await;
    let url = seed(&mock_server, "/api/v1/courses/1/modules");
    drop(mock_server);

    let result: Result<Vec<Value>, AuditError> =
        pager(fast_config(), None).fetch_all(url, Extract::Array).await;

    let err = result.unwrap_err();
    assert!(matches!(err, AuditError::Transport { .. }));
    assert!(err.is_transport());
}

#[tokio::test]
async fn test_bearer_token_attached() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/courses/1/modules"))
        .and(header("authorization", "Bearer s3cret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1}])))
        .mount(&mock_server)
        .await;

    let items: Vec<Value> = pager(fast_config(), Some("s3cret"))
        .fetch_all(seed(&mock_server, "/api/v1/courses/1/modules"), Extract::Array)
        .await
        .expect("Authenticated fetch failed");

    assert_eq!(items.len(), 1);
}

#[tokio::test]
async fn test_fetch_one_non_success_is_none() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/courses/1/pages/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let url = Url::parse(&format!("{}/api/v1/courses/1/pages/gone", mock_server.uri())).unwrap();
    let page: Option<Value> = pager(fast_config(), None)
        .fetch_one(url)
        .await
        .expect("fetch_one should not fail on 404");

    assert!(page.is_none());
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_fetch_one_gives_up_after_attempts() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/courses/1/pages/busy"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "1"))
        .mount(&mock_server)
        .await;

    let url = Url::parse(&format!("{}/api/v1/courses/1/pages/busy", mock_server.uri())).unwrap();
    let page: Option<Value> = pager(fast_config(), None)
        .fetch_one(url)
        .await
        .expect("fetch_one should not fail when rate limited");

    assert!(page.is_none());
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_fetch_one_recovers_from_rate_limit() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/courses/1/pages/intro"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/courses/1/pages/intro"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"body": "<p>hi</p>"})))
        .mount(&mock_server)
        .await;

    let url = Url::parse(&format!("{}/api/v1/courses/1/pages/intro", mock_server.uri())).unwrap();
    let page: Option<Value> = pager(fast_config(), None)
        .fetch_one(url)
        .await
        .expect("fetch_one failed");

    assert_eq!(page.unwrap()["body"], "<p>hi</p>");
}
