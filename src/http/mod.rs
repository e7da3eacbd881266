//! JSON-over-HTTP wrapper with timeout racing and normalized errors

pub mod client;
pub mod options;

pub use client::{api, create_http_client, HttpClient};
pub use options::{ClientOptions, RequestConfig};
