// Library exports for the binary and the integration tests
pub mod auth;
pub mod config;
pub mod constants;
pub mod errors;
pub mod formatters;
pub mod http;
pub mod i18n;
pub mod metrics;
pub mod mock;
pub mod store;
pub mod utils;
pub mod validation;

pub use errors::{ApiError, ApiResponse};
pub use http::{api, create_http_client, ClientOptions, HttpClient, RequestConfig};
