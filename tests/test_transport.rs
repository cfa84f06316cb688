mod common;

use std::time::Duration;

use serde_json::json;
use vikingdb::model::{CollectionLocator, DeleteDataRequest, IndexLocator, SearchByRandomRequest};
use vikingdb::{Auth, CancelToken, Client, Config, ErrorCode, RequestOptions};
use wiremock::matchers::{header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DELETE: &str = "/api/vikingdb/data/delete";
const RANDOM: &str = "/api/vikingdb/data/search/random";

fn delete_all() -> DeleteDataRequest {
    DeleteDataRequest {
        ids: vec![],
        del_all: true,
    }
}

// ── retries ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn always_throttled_call_uses_whole_budget() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(DELETE))
        .respond_with(ResponseTemplate::new(429))
        .expect(3)
        .mount(&server)
        .await;

    let collection = common::client_with(&server, Auth::api_key("t"), 2)
        .collection(CollectionLocator::new("books"));
    let err = collection
        .delete(&delete_all(), &RequestOptions::new())
        .await
        .unwrap_err();
    assert_eq!(err.status().as_u16(), 429);
    assert_eq!(err.code(), &ErrorCode::Unknown);
    assert!(err.message().starts_with("unexpected 429 response"));
}

#[tokio::test]
async fn non_retryable_error_is_returned_after_one_attempt() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(DELETE))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "code": "InvalidParameter",
            "message": "ids must not be empty",
            "request_id": "r-bad"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = common::client(&server)
        .collection(CollectionLocator::new("books"))
        .delete(&delete_all(), &RequestOptions::new())
        .await
        .unwrap_err();
    assert_eq!(err.code(), &ErrorCode::InvalidParameter);
    assert_eq!(err.message(), "ids must not be empty");
    assert_eq!(err.request_id(), Some("r-bad"));
    assert_eq!(err.status().as_u16(), 400);
    assert!(err.cause().is_none());
}

#[tokio::test]
async fn transient_failures_are_retried_until_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(DELETE))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({
            "code": "ServiceUnavailable",
            "message": "busy"
        })))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(DELETE))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"request_id": "r-ok"})))
        .expect(1)
        .mount(&server)
        .await;

    let response = common::client(&server)
        .collection(CollectionLocator::new("books"))
        .delete(&delete_all(), &RequestOptions::new())
        .await
        .unwrap();
    assert_eq!(response.request_id, "r-ok");
}

#[tokio::test]
async fn per_call_retry_budget_overrides_config() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(DELETE))
        .respond_with(ResponseTemplate::new(502))
        .expect(3)
        .mount(&server)
        .await;

    let collection = common::client_with(&server, Auth::api_key("t"), 0)
        .collection(CollectionLocator::new("books"));
    let err = collection
        .delete(&delete_all(), &RequestOptions::new().max_retries(2))
        .await
        .unwrap_err();
    assert_eq!(err.status().as_u16(), 502);
}

#[tokio::test]
async fn service_error_keeps_code_and_request_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(DELETE))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "code": "CollectionNotExists",
            "message": "collection books not found",
            "request_id": "r9"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = common::client(&server)
        .collection(CollectionLocator::new("books"))
        .delete(&delete_all(), &RequestOptions::new())
        .await
        .unwrap_err();
    assert_eq!(err.code(), &ErrorCode::CollectionNotExists);
    assert_eq!(
        err.to_string(),
        "vikingdb error: code=CollectionNotExists, message=collection books not found, \
         status_code=404, request_id=r9"
    );
}

// ── transport failures ──────────────────────────────────────────────────

#[tokio::test]
async fn unreachable_host_is_http_request_failed() {
    let config = Config::new("http://127.0.0.1:1").with_max_retries(0);
    let client = Client::new(Auth::api_key("t"), config).unwrap();
    let err = client
        .collection(CollectionLocator::new("books"))
        .delete(&delete_all(), &RequestOptions::new())
        .await
        .unwrap_err();
    assert_eq!(err.code(), &ErrorCode::HttpRequestFailed);
    assert_eq!(err.status().as_u16(), 503);
    assert!(err.cause().is_some());
}

#[tokio::test]
async fn slow_server_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(DELETE))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let config = Config::new(server.uri())
        .with_timeout(Duration::from_millis(200))
        .with_max_retries(0);
    let client = Client::new(Auth::api_key("t"), config).unwrap();
    let err = client
        .collection(CollectionLocator::new("books"))
        .delete(&delete_all(), &RequestOptions::new())
        .await
        .unwrap_err();
    assert_eq!(err.code(), &ErrorCode::Timeout);
    assert_eq!(err.status().as_u16(), 504);
}

// ── headers, query and auth ─────────────────────────────────────────────

#[tokio::test]
async fn request_id_and_query_params_are_sent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(DELETE))
        .and(header("x-tt-logid", "req-42"))
        .and(header("x-debug", "1"))
        .and(header("accept", "application/json"))
        .and(query_param("trace", "on"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"request_id": "req-42"})))
        .expect(1)
        .mount(&server)
        .await;

    let options = RequestOptions::new()
        .request_id("req-42")
        .header("X-Debug", "1")
        .query_param("trace", "on");
    let response = common::client(&server)
        .collection(CollectionLocator::new("books"))
        .delete(&delete_all(), &options)
        .await
        .unwrap();
    assert_eq!(response.request_id, "req-42");
}

#[tokio::test]
async fn request_id_header_cannot_be_set_directly() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(DELETE))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    common::client(&server)
        .collection(CollectionLocator::new("books"))
        .delete(
            &delete_all(),
            &RequestOptions::new().header("X-Tt-Logid", "spoofed"),
        )
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].headers.get("x-tt-logid").is_none());
}

#[tokio::test]
async fn iam_credentials_sign_each_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(DELETE))
        .and(header_exists("x-date"))
        .and(header_exists("x-content-sha256"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    common::client_with(&server, Auth::iam("AKTEST", "secret"), 0)
        .collection(CollectionLocator::new("books"))
        .delete(&delete_all(), &RequestOptions::new())
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let authorization = requests[0]
        .headers
        .get("authorization")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(authorization.starts_with("HMAC-SHA256 Credential=AKTEST/"));
    assert!(authorization.contains("/cn-beijing/vikingdb/request, "));
    assert!(authorization.contains("SignedHeaders=content-type;host;x-content-sha256;x-date"));
}

#[tokio::test]
async fn no_auth_sends_no_authorization_header() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(DELETE))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    common::client_with(&server, Auth::none(), 0)
        .collection(CollectionLocator::new("books"))
        .delete(&delete_all(), &RequestOptions::new())
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("authorization").is_none());
}

#[test]
fn bad_credentials_fail_at_construction() {
    for auth in [Auth::iam("ak", ""), Auth::iam("", "sk"), Auth::api_key("")] {
        let err = Client::new(auth, Config::default()).unwrap_err();
        assert_eq!(err.code(), &ErrorCode::InvalidParameter);
        assert_eq!(err.status().as_u16(), 400);
    }
    assert!(Client::new(Auth::iam("ak", "sk"), Config::default()).is_ok());
    assert!(Client::new(Auth::api_key("token"), Config::default()).is_ok());
}

// ── cancellation ────────────────────────────────────────────────────────

#[tokio::test]
async fn pre_cancelled_call_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let token = CancelToken::new();
    token.cancel();
    let err = common::client(&server)
        .collection(CollectionLocator::new("books"))
        .delete(&delete_all(), &RequestOptions::new().cancel_token(token))
        .await
        .unwrap_err();
    assert!(err.is_cancelled());
    assert_eq!(err.status().as_u16(), 499);
}

#[tokio::test]
async fn cancelling_one_call_leaves_the_others_alone() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(RANDOM))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(common::ok_body("search", "r-rand", json!({"data": []})))
                .set_delay(Duration::from_millis(400)),
        )
        .mount(&server)
        .await;

    let index = common::client(&server).index(IndexLocator::new("books", "books_idx"));
    let tokens: Vec<CancelToken> = (0..4).map(|_| CancelToken::new()).collect();
    let handles: Vec<_> = tokens
        .iter()
        .cloned()
        .map(|token| {
            let index = index.clone();
            tokio::spawn(async move {
                index
                    .search_by_random(
                        &SearchByRandomRequest::default(),
                        &RequestOptions::new().cancel_token(token),
                    )
                    .await
            })
        })
        .collect();

    tokio::time::sleep(Duration::from_millis(50)).await;
    tokens[1].cancel();

    for (i, handle) in handles.into_iter().enumerate() {
        let result = handle.await.unwrap();
        if i == 1 {
            let err = result.unwrap_err();
            assert!(err.is_cancelled());
            assert_ne!(err.code(), &ErrorCode::HttpRequestFailed);
        } else {
            assert_eq!(result.unwrap().request_id, "r-rand");
        }
    }
}
