use anyhow::{anyhow, Result};
use lazy_static::lazy_static;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use super::options::{ClientOptions, RequestConfig};
use crate::config::{DEFAULT_API_BASE_URL, DEFAULT_TIMEOUT_MS};
use crate::errors::{ApiError, ApiResponse};
use crate::metrics::registry::{
    HTTP_CLIENT_ERRORS_TOTAL, HTTP_CLIENT_REQUESTS_TOTAL, HTTP_CLIENT_REQUEST_DURATION_SECONDS,
};

lazy_static! {
    static ref DEFAULT_CLIENT: HttpClient = HttpClient::new(ClientOptions::default());
}

/// Process-wide client built from the environment defaults
pub fn api() -> &'static HttpClient {
    &DEFAULT_CLIENT
}

/// Build a client with custom settings
pub fn create_http_client(options: ClientOptions) -> HttpClient {
    HttpClient::new(options)
}

/// JSON API client with a client-side timeout and a single error type.
///
/// Every call is independent: the client keeps no per-request state, and the
/// configuration only changes through `&mut self` methods, so it can never
/// change under an in-flight request.
#[derive(Debug, Clone)]
pub struct HttpClient {
    http_client: reqwest::Client,
    base_url: String,
    timeout: Duration,
    default_headers: HeaderMap,
}

impl HttpClient {
    pub fn new(options: ClientOptions) -> Self {
        let base_url = options
            .base_url
            .filter(|url| !url.is_empty())
            .or_else(|| std::env::var("API_BASE_URL").ok().filter(|url| !url.is_empty()))
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());

        let timeout = options
            .timeout
            .filter(|t| !t.is_zero())
            .unwrap_or(Duration::from_millis(DEFAULT_TIMEOUT_MS));

        let mut default_headers = HeaderMap::new();
        default_headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        default_headers.extend(options.headers);

        let http_client = reqwest::Client::builder()
            .user_agent(concat!("starter-kit/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|e| {
                warn!("Failed to build configured HTTP client, using defaults: {}", e);
                reqwest::Client::new()
            });

        debug!(
            base_url = %base_url,
            timeout_ms = timeout.as_millis() as u64,
            "Initialized HTTP client"
        );

        Self {
            http_client,
            base_url,
            timeout,
            default_headers,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Headers sent with every request
    pub fn headers(&self) -> &HeaderMap {
        &self.default_headers
    }

    /// Send `Authorization: Bearer <token>` on subsequent calls
    pub fn set_auth(&mut self, token: &str) -> Result<()> {
        let value = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| anyhow!("Invalid access token format"))?;
        self.default_headers.insert(AUTHORIZATION, value);
        Ok(())
    }

    /// Stop sending the authorization header
    pub fn remove_auth(&mut self) {
        self.default_headers.remove(AUTHORIZATION);
    }

    pub fn is_authenticated(&self) -> bool {
        self.default_headers.contains_key(AUTHORIZATION)
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        config: Option<RequestConfig>,
    ) -> Result<ApiResponse<T>, ApiError> {
        self.request(Method::GET, endpoint, None::<&()>, config).await
    }

    pub async fn post<T, B>(
        &self,
        endpoint: &str,
        body: Option<&B>,
        config: Option<RequestConfig>,
    ) -> Result<ApiResponse<T>, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(Method::POST, endpoint, body, config).await
    }

    pub async fn put<T, B>(
        &self,
        endpoint: &str,
        body: Option<&B>,
        config: Option<RequestConfig>,
    ) -> Result<ApiResponse<T>, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(Method::PUT, endpoint, body, config).await
    }

    pub async fn delete<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        config: Option<RequestConfig>,
    ) -> Result<ApiResponse<T>, ApiError> {
        self.request(Method::DELETE, endpoint, None::<&()>, config).await
    }

    /// Issue a request and decode the 2xx body as an envelope
    pub async fn request<T, B>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&B>,
        config: Option<RequestConfig>,
    ) -> Result<ApiResponse<T>, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let data = self.request_value(method, endpoint, body, config).await?;

        serde_json::from_value(data).map_err(|e| {
            let err = ApiError::network(format!("Invalid response envelope: {}", e));
            record_error(&err);
            err
        })
    }

    /// Issue a request and return the 2xx body as parsed: JSON when the
    /// response declares it, a JSON string holding the text otherwise
    pub async fn request_value<B>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&B>,
        config: Option<RequestConfig>,
    ) -> Result<Value, ApiError>
    where
        B: Serialize + ?Sized,
    {
        let config = config.unwrap_or_default();
        let base_url = config.base_url.as_deref().unwrap_or(&self.base_url);
        let timeout = config.timeout.unwrap_or(self.timeout);
        let url = format!("{}{}", base_url, endpoint);

        let mut headers = self.default_headers.clone();
        headers.extend(config.headers);

        let payload = match body {
            Some(body) => Some(serde_json::to_vec(body).map_err(|e| {
                ApiError::network(format!("Failed to serialize request body: {}", e))
            })?),
            None => None,
        };

        HTTP_CLIENT_REQUESTS_TOTAL
            .with_label_values(&[method.as_str()])
            .inc();
        debug!(method = %method, url = %url, "Sending request");

        let start = Instant::now();
        let exchange = self.exchange(method.clone(), &url, headers, payload);

        // Dropping the exchange future on timeout abandons the transport call
        let result = match tokio::time::timeout(timeout, exchange).await {
            Ok(result) => result,
            Err(_) => Err(ApiError::timeout()),
        };

        HTTP_CLIENT_REQUEST_DURATION_SECONDS
            .with_label_values(&[method.as_str()])
            .observe(start.elapsed().as_secs_f64());

        match &result {
            Ok(_) => debug!(
                method = %method,
                url = %url,
                duration_ms = start.elapsed().as_millis() as u64,
                "Request completed"
            ),
            Err(err) => {
                record_error(err);
                warn!(
                    method = %method,
                    url = %url,
                    code = err.code,
                    error = %err.message,
                    "Request failed"
                );
            }
        }

        result
    }

    /// Network round-trip: send, read the body, classify the status
    async fn exchange(
        &self,
        method: Method,
        url: &str,
        headers: HeaderMap,
        payload: Option<Vec<u8>>,
    ) -> Result<Value, ApiError> {
        let mut builder = self.http_client.request(method, url).headers(headers);
        if let Some(payload) = payload {
            builder = builder.body(payload);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::network(e.to_string()))?;

        let status = response.status();
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.contains("application/json"))
            .unwrap_or(false);

        let data = if is_json {
            response
                .json::<Value>()
                .await
                .map_err(|e| ApiError::network(e.to_string()))?
        } else {
            Value::String(
                response
                    .text()
                    .await
                    .map_err(|e| ApiError::network(e.to_string()))?,
            )
        };

        if !status.is_success() {
            return Err(ApiError::http(status.as_u16(), data));
        }

        Ok(data)
    }
}

fn record_error(err: &ApiError) {
    HTTP_CLIENT_ERRORS_TOTAL
        .with_label_values(&[&err.code.to_string()])
        .inc();
}
