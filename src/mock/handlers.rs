use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header::AUTHORIZATION, HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::auth::{default_avatar, AuthResponse, LoginRequest, User};
use crate::errors::{ApiResponse, HttpStatus, PaginatedData};
use crate::validation::{is_valid_email, PASSWORD_MIN_LENGTH};

pub const DEMO_EMAIL: &str = "demo@example.com";
pub const DEMO_PASSWORD: &str = "123456";

const DEFAULT_PAGE_SIZE: usize = 10;
const MAX_DELAY_MS: u64 = 30_000;

pub type MockState = Arc<MockStateInner>;

/// In-memory users and sessions (token → user id)
pub struct MockStateInner {
    users: RwLock<HashMap<String, User>>,
    sessions: RwLock<HashMap<String, String>>,
}

impl MockStateInner {
    /// State seeded with the demo account
    pub fn new() -> Self {
        let demo = User {
            id: "1".to_string(),
            name: "Demo User".to_string(),
            email: DEMO_EMAIL.to_string(),
            avatar: Some(default_avatar(DEMO_EMAIL)),
        };

        let mut users = HashMap::new();
        users.insert(demo.id.clone(), demo);

        Self {
            users: RwLock::new(users),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub fn shared() -> MockState {
        Arc::new(Self::new())
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    async fn open_session(&self, user_id: &str) -> String {
        let token = Uuid::new_v4().simple().to_string();
        self.sessions
            .write()
            .await
            .insert(token.clone(), user_id.to_string());
        token
    }

    async fn session_user(&self, headers: &HeaderMap) -> Result<(String, User), MockError> {
        let token = bearer_token(headers).ok_or_else(MockError::unauthorized)?;
        let user_id = self
            .sessions
            .read()
            .await
            .get(&token)
            .cloned()
            .ok_or_else(MockError::unauthorized)?;
        let user = self
            .users
            .read()
            .await
            .get(&user_id)
            .cloned()
            .ok_or_else(MockError::unauthorized)?;
        Ok((token, user))
    }
}

impl Default for MockStateInner {
    fn default() -> Self {
        Self::new()
    }
}

/// Error reply rendered as a failure envelope
#[derive(Debug)]
pub struct MockError {
    status: StatusCode,
    message: String,
}

impl MockError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "unauthorized")
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    fn email_taken() -> Self {
        Self::new(StatusCode::CONFLICT, "email already registered")
    }

    fn user_not_found(id: &str) -> Self {
        Self::new(StatusCode::NOT_FOUND, format!("user not found: {}", id))
    }
}

impl From<JsonRejection> for MockError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(rejection.status(), rejection.body_text())
    }
}

impl From<QueryRejection> for MockError {
    fn from(rejection: QueryRejection) -> Self {
        Self::new(rejection.status(), rejection.body_text())
    }
}

impl From<PathRejection> for MockError {
    fn from(rejection: PathRejection) -> Self {
        Self::new(rejection.status(), rejection.body_text())
    }
}

impl IntoResponse for MockError {
    fn into_response(self) -> Response {
        let body = ApiResponse::error(self.status.as_u16(), self.message);
        (self.status, Json(body)).into_response()
    }
}

type Reply<T> = Result<Json<ApiResponse<T>>, MockError>;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub email: Option<String>,
}

pub async fn health() -> Json<ApiResponse<HealthStatus>> {
    Json(ApiResponse::ok(
        HealthStatus {
            status: "healthy",
            service: "starter-kit",
            version: env!("CARGO_PKG_VERSION"),
        },
        "ok",
    ))
}

pub async fn login(
    State(state): State<MockState>,
    input: Result<Json<LoginRequest>, JsonRejection>,
) -> Reply<AuthResponse> {
    let Json(input) = input?;
    if !is_valid_email(&input.email) || input.password.chars().count() < PASSWORD_MIN_LENGTH {
        return Err(MockError::bad_request("invalid login form"));
    }
    if input.password != DEMO_PASSWORD {
        return Err(MockError::new(
            StatusCode::UNAUTHORIZED,
            "invalid email or password",
        ));
    }

    let user = {
        let mut users = state.users.write().await;
        match users.values().find(|u| u.email == input.email).cloned() {
            Some(user) => user,
            None => {
                let name = input.email.split('@').next().unwrap_or_default().to_string();
                let user = User {
                    id: Uuid::new_v4().to_string(),
                    name,
                    email: input.email.clone(),
                    avatar: None,
                };
                users.insert(user.id.clone(), user.clone());
                user
            }
        }
    };

    let token = state.open_session(&user.id).await;
    info!(user_id = %user.id, "Mock login");

    Ok(Json(ApiResponse::ok(AuthResponse { token, user }, "login successful")))
}

pub async fn logout(State(state): State<MockState>, headers: HeaderMap) -> Reply<Option<()>> {
    if let Some(token) = bearer_token(&headers) {
        state.sessions.write().await.remove(&token);
    }
    Ok(Json(ApiResponse::ok(None, "logged out")))
}

pub async fn refresh(State(state): State<MockState>, headers: HeaderMap) -> Reply<AuthResponse> {
    let (old_token, user) = state.session_user(&headers).await?;
    state.sessions.write().await.remove(&old_token);
    let token = state.open_session(&user.id).await;

    Ok(Json(ApiResponse::ok(AuthResponse { token, user }, "token refreshed")))
}

pub async fn profile(State(state): State<MockState>, headers: HeaderMap) -> Reply<User> {
    let (_, user) = state.session_user(&headers).await?;
    Ok(Json(ApiResponse::ok(user, "ok")))
}

pub async fn list_users(
    State(state): State<MockState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Reply<PaginatedData<User>> {
    let Query(params) = params?;
    let page = params.page.unwrap_or(1).max(1);
    let page_size = params.page_size.unwrap_or(DEFAULT_PAGE_SIZE);

    let mut users: Vec<User> = state.users.read().await.values().cloned().collect();
    users.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));

    let total = users.len();
    let items: Vec<User> = users
        .into_iter()
        .skip((page - 1).saturating_mul(page_size))
        .take(page_size)
        .collect();

    debug!(page, page_size, total, "Listing users");
    Ok(Json(ApiResponse::ok(
        PaginatedData::new(items, total, page, page_size),
        "ok",
    )))
}

pub async fn create_user(
    State(state): State<MockState>,
    input: Result<Json<CreateUser>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<User>>), MockError> {
    let Json(input) = input?;
    if input.name.trim().is_empty() {
        return Err(MockError::bad_request("name is required"));
    }
    if !is_valid_email(&input.email) {
        return Err(MockError::bad_request("invalid email"));
    }

    let mut users = state.users.write().await;
    if users.values().any(|u| u.email == input.email) {
        return Err(MockError::email_taken());
    }

    let user = User {
        id: Uuid::new_v4().to_string(),
        name: input.name.trim().to_string(),
        email: input.email,
        avatar: None,
    };
    users.insert(user.id.clone(), user.clone());

    let created = HttpStatus::Created.code();
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(user, "created").with_code(created)),
    ))
}

pub async fn update_user(
    State(state): State<MockState>,
    Path(id): Path<String>,
    input: Result<Json<UpdateUser>, JsonRejection>,
) -> Reply<User> {
    let Json(input) = input?;
    if let Some(email) = &input.email {
        if !is_valid_email(email) {
            return Err(MockError::bad_request("invalid email"));
        }
    }

    let mut users = state.users.write().await;
    if !users.contains_key(&id) {
        return Err(MockError::user_not_found(&id));
    }
    if let Some(email) = &input.email {
        if users.values().any(|u| u.id != id && &u.email == email) {
            return Err(MockError::email_taken());
        }
    }
    let user = users.get_mut(&id).ok_or_else(|| MockError::user_not_found(&id))?;

    if let Some(name) = input.name {
        user.name = name;
    }
    if let Some(email) = input.email {
        user.email = email;
    }

    Ok(Json(ApiResponse::ok(user.clone(), "updated")))
}

pub async fn delete_user(
    State(state): State<MockState>,
    Path(id): Path<String>,
) -> Reply<Option<()>> {
    state
        .users
        .write()
        .await
        .remove(&id)
        .ok_or_else(|| MockError::user_not_found(&id))?;

    Ok(Json(ApiResponse::ok(None, "deleted")))
}

/// Answer after `ms` milliseconds, for exercising client timeouts
pub async fn delay(ms: Result<Path<u64>, PathRejection>) -> Reply<u64> {
    let Path(ms) = ms?;
    let ms = ms.min(MAX_DELAY_MS);
    tokio::time::sleep(Duration::from_millis(ms)).await;
    Ok(Json(ApiResponse::ok(ms, "ok")))
}

/// Unmatched routes answer with a failure envelope too
pub async fn not_found(uri: Uri) -> MockError {
    MockError::new(
        StatusCode::NOT_FOUND,
        format!("no route for {}", uri.path()),
    )
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}
