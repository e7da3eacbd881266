use axum::{
    extract::Json,
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use reqwest::header::{HeaderName, HeaderValue};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;

use starter_kit::{ApiResponse, ClientOptions, HttpClient, RequestConfig};

// Backend with one route per client behaviour under test
fn test_backend() -> Router {
    Router::new()
        .route(
            "/users",
            get(|| async { Json(json!({"data": [], "message": "ok", "code": 200, "success": true})) }),
        )
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_millis(2000)).await;
                Json(json!({"data": null, "message": "late", "code": 200, "success": true}))
            }),
        )
        .route(
            "/missing",
            get(|| async {
                (
                    StatusCode::NOT_FOUND,
                    Json(json!({"data": null, "message": "user not found", "code": 404, "success": false})),
                )
            }),
        )
        .route(
            "/broken",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        )
        .route("/text", get(|| async { "plain body" }))
        .route("/raw", get(|| async { Json(json!([1, 2, 3])) }))
        .route(
            "/whoami",
            get(|headers: HeaderMap| async move {
                let auth = headers
                    .get(AUTHORIZATION)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string);
                let lang = headers
                    .get("x-lang")
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string);
                Json(json!({
                    "data": {"authorization": auth, "lang": lang},
                    "message": "ok",
                    "code": 200,
                    "success": true
                }))
            }),
        )
        .route(
            "/echo",
            post(echo).put(echo).delete(|| async {
                Json(json!({"data": "deleted", "message": "ok", "code": 200, "success": true}))
            }),
        )
}

async fn echo(Json(body): Json<Value>) -> impl IntoResponse {
    Json(json!({"data": body, "message": "echo", "code": 200, "success": true}))
}

async fn spawn_backend() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, test_backend()).await.unwrap();
    });
    addr
}

fn client_for(addr: SocketAddr) -> HttpClient {
    HttpClient::new(ClientOptions::new().base_url(format!("http://{}", addr)))
}

#[tokio::test]
async fn test_get_returns_envelope_unchanged() {
    let addr = spawn_backend().await;
    let client = client_for(addr);

    let response = client.get::<Vec<Value>>("/users", None).await.unwrap();
    assert_eq!(
        response,
        ApiResponse {
            data: vec![],
            message: "ok".to_string(),
            code: 200,
            success: true,
        }
    );
}

#[tokio::test]
async fn test_timeout_wins_the_race() {
    let addr = spawn_backend().await;
    let client = client_for(addr);

    let start = Instant::now();
    let err = client
        .get::<Value>("/slow", Some(RequestConfig::new().timeout_ms(100)))
        .await
        .unwrap_err();

    assert_eq!(err.code, 408);
    assert_eq!(err.message, "request timeout");
    assert!(err.is_timeout());
    assert!(start.elapsed() < Duration::from_millis(1500));
}

#[tokio::test]
async fn test_client_default_timeout() {
    let addr = spawn_backend().await;
    let client = HttpClient::new(
        ClientOptions::new()
            .base_url(format!("http://{}", addr))
            .timeout(Duration::from_millis(100)),
    );

    let err = client.get::<Value>("/slow", None).await.unwrap_err();
    assert_eq!(err.code, 408);
}

#[tokio::test]
async fn test_http_error_carries_status_and_message() {
    let addr = spawn_backend().await;
    let client = client_for(addr);

    let err = client.get::<Value>("/missing", None).await.unwrap_err();
    assert_eq!(err.code, 404);
    assert_eq!(err.message, "user not found");
    assert_eq!(err.data.unwrap()["success"], false);

    let err = client.get::<Value>("/broken", None).await.unwrap_err();
    assert_eq!(err.code, 500);
    assert_eq!(err.message, "request failed");
    assert_eq!(err.data, Some(json!("boom")));
}

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    // Bind and drop to get a port nobody listens on
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = client_for(addr);
    let err = client.get::<Value>("/users", None).await.unwrap_err();
    assert_eq!(err.code, 0);
    assert!(err.is_network());
    assert!(!err.message.is_empty());
}

#[tokio::test]
async fn test_text_body_is_returned_as_string() {
    let addr = spawn_backend().await;
    let client = client_for(addr);

    let value = client
        .request_value(reqwest::Method::GET, "/text", None::<&()>, None)
        .await
        .unwrap();
    assert_eq!(value, json!("plain body"));

    // Not an envelope, so the typed call cannot decode it
    let err = client.get::<Value>("/raw", None).await.unwrap_err();
    assert_eq!(err.code, 0);
}

#[tokio::test]
async fn test_auth_header_lifecycle() {
    let addr = spawn_backend().await;
    let mut client = client_for(addr);

    let anonymous = client.get::<Value>("/whoami", None).await.unwrap();
    assert!(anonymous.data["authorization"].is_null());

    client.set_auth("abc123").unwrap();
    let authed = client.get::<Value>("/whoami", None).await.unwrap();
    assert_eq!(authed.data["authorization"], "Bearer abc123");

    client.remove_auth();
    let anonymous = client.get::<Value>("/whoami", None).await.unwrap();
    assert!(anonymous.data["authorization"].is_null());
}

#[tokio::test]
async fn test_per_call_headers_do_not_stick() {
    let addr = spawn_backend().await;
    let client = client_for(addr);
    let x_lang = HeaderName::from_static("x-lang");

    let config = RequestConfig::new().header(x_lang, HeaderValue::from_static("zh"));
    let response = client.get::<Value>("/whoami", Some(config)).await.unwrap();
    assert_eq!(response.data["lang"], "zh");

    let response = client.get::<Value>("/whoami", None).await.unwrap();
    assert!(response.data["lang"].is_null());
}

#[tokio::test]
async fn test_per_call_base_url_override() {
    let addr = spawn_backend().await;
    let client = HttpClient::new(ClientOptions::new().base_url("http://127.0.0.1:9/nowhere"));

    let config = RequestConfig::new().base_url(format!("http://{}", addr));
    let response = client.get::<Vec<Value>>("/users", Some(config)).await.unwrap();
    assert!(response.success);
    assert_eq!(client.base_url(), "http://127.0.0.1:9/nowhere");
}

#[tokio::test]
async fn test_post_put_delete() {
    let addr = spawn_backend().await;
    let client = client_for(addr);
    let body = json!({"name": "Ada"});

    let created = client.post::<Value, _>("/echo", Some(&body), None).await.unwrap();
    assert_eq!(created.data, body);
    assert_eq!(created.message, "echo");

    let updated = client.put::<Value, _>("/echo", Some(&body), None).await.unwrap();
    assert_eq!(updated.data["name"], "Ada");

    let deleted = client.delete::<String>("/echo", None).await.unwrap();
    assert_eq!(deleted.data, "deleted");
}

#[tokio::test]
async fn test_concurrent_calls_are_independent() {
    let addr = spawn_backend().await;
    let client = client_for(addr);

    let slow = client.get::<Value>("/slow", Some(RequestConfig::new().timeout_ms(100)));
    let fast = client.get::<Vec<Value>>("/users", None);
    let (slow, fast) = tokio::join!(slow, fast);

    assert_eq!(slow.unwrap_err().code, 408);
    assert!(fast.unwrap().success);
}
