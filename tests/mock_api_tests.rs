use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{json, Value};
use tower::Service;

use starter_kit::mock::{create_router, MockStateInner, DEMO_EMAIL, DEMO_PASSWORD};

// Helper to create test app
fn create_test_app() -> axum::Router {
    create_router(MockStateInner::shared())
}

// Helper to send request and parse JSON response
async fn send_json_request(
    app: &mut axum::Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    let request = builder.body(Body::empty()).unwrap();

    let response = app.call(request).await.unwrap();
    let status = response.status();

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap_or(json!({}));

    (status, json)
}

// Helper to send JSON request with JSON body
async fn send_json_body_request(
    app: &mut axum::Router,
    method: &str,
    uri: &str,
    body: Value,
) -> (StatusCode, Value) {
    let bytes = serde_json::to_vec(&body).unwrap();
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(bytes))
        .unwrap();

    let response = app.call(request).await.unwrap();
    let status = response.status();

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap_or(json!({}));

    (status, json)
}

async fn login(app: &mut axum::Router) -> String {
    let (status, body) = send_json_body_request(
        app,
        "POST",
        "/api/auth/login",
        json!({"email": DEMO_EMAIL, "password": DEMO_PASSWORD}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["data"]["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_endpoint() {
    let mut app = create_test_app();
    let (status, body) = send_json_request(&mut app, "GET", "/api/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["code"], 200);
    assert_eq!(body["data"]["status"], "healthy");
    assert_eq!(body["data"]["service"], "starter-kit");
}

#[tokio::test]
async fn test_login_demo_account() {
    let mut app = create_test_app();
    let (status, body) = send_json_body_request(
        &mut app,
        "POST",
        "/api/auth/login",
        json!({"email": DEMO_EMAIL, "password": DEMO_PASSWORD}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "login successful");
    assert_eq!(body["data"]["user"]["id"], "1");
    assert_eq!(body["data"]["user"]["email"], DEMO_EMAIL);
    assert!(body["data"]["token"].as_str().is_some_and(|t| !t.is_empty()));
}

#[tokio::test]
async fn test_login_wrong_password() {
    let mut app = create_test_app();
    let (status, body) = send_json_body_request(
        &mut app,
        "POST",
        "/api/auth/login",
        json!({"email": DEMO_EMAIL, "password": "wrong-password"}),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], 401);
    assert_eq!(body["message"], "invalid email or password");
    assert!(body["data"].is_null());
}

#[tokio::test]
async fn test_login_invalid_form() {
    let mut app = create_test_app();
    let (status, body) = send_json_body_request(
        &mut app,
        "POST",
        "/api/auth/login",
        json!({"email": "nope", "password": "1"}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 400);
}

#[tokio::test]
async fn test_login_unknown_email_creates_user() {
    let mut app = create_test_app();
    let (status, body) = send_json_body_request(
        &mut app,
        "POST",
        "/api/auth/login",
        json!({"email": "ada@example.com", "password": DEMO_PASSWORD}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user"]["name"], "ada");

    let (_, list) = send_json_request(&mut app, "GET", "/api/users", None).await;
    assert_eq!(list["data"]["total"], 2);
}

#[tokio::test]
async fn test_profile_requires_token() {
    let mut app = create_test_app();

    let (status, body) = send_json_request(&mut app, "GET", "/api/auth/profile", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 401);

    let (status, _) =
        send_json_request(&mut app, "GET", "/api/auth/profile", Some("forged")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = login(&mut app).await;
    let (status, body) =
        send_json_request(&mut app, "GET", "/api/auth/profile", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], DEMO_EMAIL);
}

#[tokio::test]
async fn test_refresh_rotates_token() {
    let mut app = create_test_app();
    let token = login(&mut app).await;

    let (status, body) =
        send_json_request(&mut app, "POST", "/api/auth/refresh", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    let fresh = body["data"]["token"].as_str().unwrap().to_string();
    assert_ne!(fresh, token);

    let (status, _) = send_json_request(&mut app, "GET", "/api/auth/profile", Some(&token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send_json_request(&mut app, "GET", "/api/auth/profile", Some(&fresh)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_logout_ends_session() {
    let mut app = create_test_app();
    let token = login(&mut app).await;

    let (status, body) =
        send_json_request(&mut app, "POST", "/api/auth/logout", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, _) = send_json_request(&mut app, "GET", "/api/auth/profile", Some(&token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_users_pagination() {
    let mut app = create_test_app();

    for name in ["Alice", "Bob", "Carol"] {
        let (status, body) = send_json_body_request(
            &mut app,
            "POST",
            "/api/users",
            json!({"name": name, "email": format!("{}@example.com", name.to_lowercase())}),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["code"], 201);
    }

    let (status, body) =
        send_json_request(&mut app, "GET", "/api/users?page=1&pageSize=2", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 4);
    assert_eq!(body["data"]["pageSize"], 2);
    assert_eq!(body["data"]["totalPages"], 2);

    let names: Vec<&str> = body["data"]["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Alice", "Bob"]);

    let (_, body) = send_json_request(&mut app, "GET", "/api/users?page=2&pageSize=2", None).await;
    let names: Vec<&str> = body["data"]["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Carol", "Demo User"]);
}

#[tokio::test]
async fn test_create_user_duplicate_email() {
    let mut app = create_test_app();
    let (status, body) = send_json_body_request(
        &mut app,
        "POST",
        "/api/users",
        json!({"name": "Someone", "email": DEMO_EMAIL}),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], 409);
}

#[tokio::test]
async fn test_update_and_delete_user() {
    let mut app = create_test_app();

    let (status, body) = send_json_body_request(
        &mut app,
        "PUT",
        "/api/users/1",
        json!({"name": "Renamed"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Renamed");
    assert_eq!(body["data"]["email"], DEMO_EMAIL);

    let (status, _) = send_json_request(&mut app, "DELETE", "/api/users/1", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send_json_request(&mut app, "DELETE", "/api/users/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "user not found: 1");

    let (status, _) =
        send_json_body_request(&mut app, "PUT", "/api/users/1", json!({"name": "x"})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_route() {
    let mut app = create_test_app();
    let (status, body) = send_json_request(&mut app, "GET", "/api/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], 404);
    assert_eq!(body["message"], "no route for /api/nope");

    let (status, body) = send_json_request(&mut app, "GET", "/elsewhere", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_rejected_input_is_envelope() {
    let mut app = create_test_app();

    let (status, body) = send_json_body_request(
        &mut app,
        "POST",
        "/api/auth/login",
        json!({"email": DEMO_EMAIL}),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], 422);
    assert!(body["message"].as_str().is_some_and(|m| !m.is_empty()));

    let (status, body) = send_json_request(&mut app, "GET", "/api/users?page=abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], 400);

    let (status, body) = send_json_request(&mut app, "GET", "/api/delay/soon", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_users_page_past_the_end() {
    let mut app = create_test_app();
    let (status, body) = send_json_request(
        &mut app,
        "GET",
        "/api/users?page=18446744073709551615&pageSize=10",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["items"], json!([]));
}

#[tokio::test]
async fn test_update_user_email_conflict() {
    let mut app = create_test_app();
    let (status, body) = send_json_body_request(
        &mut app,
        "POST",
        "/api/users",
        json!({"name": "Ada", "email": "ada@example.com"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = send_json_body_request(
        &mut app,
        "PUT",
        &format!("/api/users/{}", id),
        json!({"email": DEMO_EMAIL}),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 409);

    // Keeping one's own email is not a conflict
    let (status, _) = send_json_body_request(
        &mut app,
        "PUT",
        &format!("/api/users/{}", id),
        json!({"email": "ada@example.com"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_metrics_endpoint() {
    starter_kit::metrics::init_metrics();
    let mut app = create_test_app();
    let _ = send_json_request(&mut app, "GET", "/api/health", None).await;
    let _ = send_json_request(&mut app, "DELETE", "/api/users/1", None).await;

    let request = Request::builder()
        .uri("/api/metrics")
        .body(Body::empty())
        .unwrap();
    let response = app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("http_requests_total"));
    assert!(text.contains(r#"path="/api/users/:id""#));
    assert!(!text.contains(r#"path="/api/users/1""#));
}
