//! HTTP transport for the Okapi gateway.
//!
//! Uses async reqwest internally on a shared tokio runtime, but presents a
//! sync interface: every job issues one request at a time.

use std::sync::LazyLock;
use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;

use crate::error::ApiError;

/// Tenant header required on every Okapi request
pub const TENANT_HEADER: &str = "x-okapi-tenant";

/// Session token header (request and login response)
pub const TOKEN_HEADER: &str = "x-okapi-token";

/// Error bodies are clipped to this many chars before they reach the logs
const MAX_ERROR_BODY: usize = 512;

/// Timeouts for the reqwest client
#[derive(Debug, Clone, Copy)]
pub struct HttpConfig {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            request_timeout: Duration::from_secs(120),
        }
    }
}

/// Buffered response: status, headers and full body text.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Header value as str, if present and visible ASCII
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Turn a non-2xx response into [`ApiError::Http`] carrying the body.
    pub fn error_for_status(self) -> Result<Self, ApiError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(ApiError::Http {
                status: Some(self.status),
                message: clip(&self.body),
            })
        }
    }

    pub fn json(&self) -> Result<Value, ApiError> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// Clip a body for error messages (char boundary safe)
pub fn clip(body: &str) -> String {
    match body.char_indices().nth(MAX_ERROR_BODY) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

/// Request seam between the Okapi client and the network.
///
/// Non-2xx statuses are returned as `Ok` responses; only connection-level
/// failures are `Err`. Tests substitute an in-memory implementation.
pub trait Transport {
    fn get(
        &self,
        url: &str,
        headers: &HeaderMap,
        query: &[(&str, String)],
    ) -> Result<ApiResponse, ApiError>;

    fn post_json(
        &self,
        url: &str,
        headers: &HeaderMap,
        body: &Value,
    ) -> Result<ApiResponse, ApiError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn get(
        &self,
        url: &str,
        headers: &HeaderMap,
        query: &[(&str, String)],
    ) -> Result<ApiResponse, ApiError> {
        (**self).get(url, headers, query)
    }

    fn post_json(
        &self,
        url: &str,
        headers: &HeaderMap,
        body: &Value,
    ) -> Result<ApiResponse, ApiError> {
        (**self).post_json(url, headers, body)
    }
}

/// Shared tokio runtime for HTTP operations.
pub static SHARED_RUNTIME: LazyLock<tokio::runtime::Runtime> = LazyLock::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .expect("failed to build tokio runtime")
});

/// reqwest-backed [`Transport`]
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(config: HttpConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()
            .map_err(ApiError::from_reqwest)?;
        Ok(Self { client })
    }

    fn execute(&self, request: reqwest::RequestBuilder) -> Result<ApiResponse, ApiError> {
        SHARED_RUNTIME.handle().block_on(async {
            let resp = request.send().await.map_err(ApiError::from_reqwest)?;
            let status = resp.status().as_u16();
            let headers = resp.headers().clone();
            let body = resp.text().await.map_err(ApiError::from_reqwest)?;
            Ok(ApiResponse {
                status,
                headers,
                body,
            })
        })
    }
}

impl Transport for HttpTransport {
    fn get(
        &self,
        url: &str,
        headers: &HeaderMap,
        query: &[(&str, String)],
    ) -> Result<ApiResponse, ApiError> {
        let request = self.client.get(url).headers(headers.clone()).query(query);
        self.execute(request)
    }

    fn post_json(
        &self,
        url: &str,
        headers: &HeaderMap,
        body: &Value,
    ) -> Result<ApiResponse, ApiError> {
        let request = self
            .client
            .post(url)
            .headers(headers.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(serde_json::to_vec(body)?);
        self.execute(request)
    }
}

/// Build Okapi request headers: tenant always, token when known.
pub fn okapi_headers(tenant: &str, token: Option<&str>) -> Result<HeaderMap, ApiError> {
    let mut headers = HeaderMap::new();
    headers.insert(HeaderName::from_static(TENANT_HEADER), header_value(tenant)?);
    if let Some(token) = token {
        headers.insert(HeaderName::from_static(TOKEN_HEADER), header_value(token)?);
    }
    Ok(headers)
}

fn header_value(s: &str) -> Result<HeaderValue, ApiError> {
    HeaderValue::from_str(s).map_err(|e| ApiError::Header(e.to_string()))
}

/// Join gateway base URL and endpoint path without doubling slashes
pub fn join_url(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_url_slashes() {
        assert_eq!(join_url("https://x.org/", "/users"), "https://x.org/users");
        assert_eq!(join_url("https://x.org", "users"), "https://x.org/users");
    }

    #[test]
    fn headers_with_and_without_token() {
        let h = okapi_headers("diku", None).unwrap();
        assert_eq!(h.get(TENANT_HEADER).unwrap(), "diku");
        assert!(h.get(TOKEN_HEADER).is_none());

        let h = okapi_headers("diku", Some("tok")).unwrap();
        assert_eq!(h.get(TOKEN_HEADER).unwrap(), "tok");
    }

    #[test]
    fn header_rejects_newline() {
        let err = okapi_headers("bad\ntenant", None).unwrap_err();
        assert!(matches!(err, ApiError::Header(_)));
    }

    #[test]
    fn error_for_status_keeps_body() {
        let err = ApiResponse::new(500, "boom").error_for_status().unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert_eq!(format!("{err}"), "HTTP 500: boom");
        assert!(ApiResponse::new(204, "").error_for_status().is_ok());
    }

    #[test]
    fn clip_long_body() {
        let long = "é".repeat(MAX_ERROR_BODY + 10);
        let clipped = clip(&long);
        assert!(clipped.ends_with("..."));
        assert_eq!(clipped.chars().count(), MAX_ERROR_BODY + 3);
        assert_eq!(clip("short"), "short");
    }
}
