use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    create_user, delay, delete_user, health, list_users, login, logout, not_found, profile,
    refresh, update_user, MockState,
};
use super::middleware::{logging_middleware, track_metrics};
use crate::metrics;

pub fn create_router(state: MockState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        .route("/health", get(health))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/refresh", post(refresh))
        .route("/auth/profile", get(profile))
        .route("/users", get(list_users).post(create_user))
        .route("/users/:id", put(update_user).delete(delete_user))
        .route("/delay/:ms", get(delay))
        .route("/metrics", get(metrics::metrics_handler));

    Router::new()
        .nest("/api", api)
        // MatchedPath is only available inside route layers
        .route_layer(middleware::from_fn(track_metrics))
        .fallback(not_found)
        // Order matters: logging -> cors -> trace
        .layer(middleware::from_fn(logging_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
