//! In-memory [`Transport`] for tests (feature `testing`).

use std::cell::RefCell;

use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::{Value, json};

use crate::error::ApiError;
use crate::http::{ApiResponse, TOKEN_HEADER, Transport};

/// One request seen by [`FakeTransport`]
#[derive(Debug, Clone)]
pub struct FakeRequest {
    pub method: &'static str,
    pub url: String,
    pub token: Option<String>,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl FakeRequest {
    pub fn param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Numeric query parameter, 0 when absent
    pub fn param_usize(&self, key: &str) -> usize {
        self.param(key).and_then(|v| v.parse().ok()).unwrap_or(0)
    }

    pub fn is_login(&self) -> bool {
        self.method == "POST" && self.url.ends_with("/authn/login")
    }
}

type Handler = Box<dyn Fn(&FakeRequest) -> Result<ApiResponse, ApiError>>;

/// Transport answering from a closure and recording every request.
pub struct FakeTransport {
    handler: Handler,
    requests: RefCell<Vec<FakeRequest>>,
}

impl FakeTransport {
    pub fn new(handler: impl Fn(&FakeRequest) -> Result<ApiResponse, ApiError> + 'static) -> Self {
        Self {
            handler: Box::new(handler),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<FakeRequest> {
        self.requests.borrow().clone()
    }

    /// Requests whose URL ends with `suffix` (query excluded)
    pub fn count(&self, method: &str, suffix: &str) -> usize {
        self.requests
            .borrow()
            .iter()
            .filter(|r| r.method == method && r.url.ends_with(suffix))
            .count()
    }

    pub fn logins(&self) -> usize {
        self.requests.borrow().iter().filter(|r| r.is_login()).count()
    }

    fn record(&self, request: FakeRequest) -> Result<ApiResponse, ApiError> {
        let result = (self.handler)(&request);
        self.requests.borrow_mut().push(request);
        result
    }
}

impl Transport for FakeTransport {
    fn get(
        &self,
        url: &str,
        headers: &HeaderMap,
        query: &[(&str, String)],
    ) -> Result<ApiResponse, ApiError> {
        self.record(FakeRequest {
            method: "GET",
            url: url.to_string(),
            token: token_of(headers),
            query: query
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
            body: None,
        })
    }

    fn post_json(
        &self,
        url: &str,
        headers: &HeaderMap,
        body: &Value,
    ) -> Result<ApiResponse, ApiError> {
        self.record(FakeRequest {
            method: "POST",
            url: url.to_string(),
            token: token_of(headers),
            query: Vec::new(),
            body: Some(body.clone()),
        })
    }
}

fn token_of(headers: &HeaderMap) -> Option<String> {
    headers
        .get(TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(String::from)
}

/// 201 login response carrying `token`
pub fn login_response(token: &str) -> ApiResponse {
    let mut resp = ApiResponse::new(201, "{}");
    if let Ok(value) = HeaderValue::from_str(token) {
        resp.headers.insert(TOKEN_HEADER, value);
    }
    resp
}

/// 200 collection page `{ field: records, totalRecords: n }`
pub fn page_response(field: &str, records: &[Value]) -> ApiResponse {
    let body = json!({ field: records, "totalRecords": records.len() });
    ApiResponse::new(200, body.to_string())
}

/// Slice of `all` selected by the request's `offset`/`limit`
pub fn slice_for<'a>(all: &'a [Value], request: &FakeRequest) -> &'a [Value] {
    let offset = request.param_usize("offset").min(all.len());
    let limit = request.param_usize("limit");
    let end = offset.saturating_add(limit).min(all.len());
    &all[offset..end]
}

/// `n` records `{"id": "rec-<i>"}`
pub fn numbered_records(n: usize) -> Vec<Value> {
    (0..n).map(|i| json!({ "id": format!("rec-{i}") })).collect()
}
