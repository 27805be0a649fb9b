//! Offset/limit pagination over Okapi collection endpoints.
//!
//! The gateway's `totalRecords` is not trusted; a page shorter than `limit`
//! is the only end-of-data signal. When the collection size is an exact
//! multiple of `limit` this costs one extra request returning an empty page.

use indicatif::ProgressBar;
use reqwest::header::HeaderMap;
use serde_json::Value;

use crate::error::ApiError;
use crate::http::{Transport, join_url};
use crate::progress::fmt_num;

/// Page size used by every export job
pub const DEFAULT_PAGE_SIZE: usize = 1000;

/// One paginated collection query.
#[derive(Debug, Clone)]
pub struct PageRequest {
    /// Endpoint path relative to the gateway, e.g. `users`
    pub path: String,
    /// Response field holding the page's records, e.g. `users`
    pub array_field: String,
    /// Optional CQL filter sent as `query`
    pub query: Option<String>,
    pub limit: usize,
}

impl PageRequest {
    pub fn new(path: impl Into<String>, array_field: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            array_field: array_field.into(),
            query: None,
            limit: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

/// Result of a pagination run. `error` is set when a page failed and
/// `records` holds everything accumulated before it.
#[derive(Debug)]
pub struct FetchOutcome {
    pub records: Vec<Value>,
    pub requests: usize,
    pub error: Option<ApiError>,
}

impl FetchOutcome {
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }
}

/// Fetch every page of `request`, strictly in offset order.
///
/// Any HTTP, connection or decode failure ends the loop; the error is
/// logged and returned alongside the partial records.
pub fn fetch_all<T: Transport + ?Sized>(
    transport: &T,
    base_url: &str,
    headers: &HeaderMap,
    request: &PageRequest,
    pb: &ProgressBar,
) -> FetchOutcome {
    let url = join_url(base_url, &request.path);
    let limit = request.limit.max(1);
    let mut records: Vec<Value> = Vec::new();
    let mut offset = 0usize;
    let mut requests = 0usize;

    loop {
        log::debug!("{}: fetching offset {offset}", request.path);
        pb.set_message(format!(
            "offset {} ({} records)",
            fmt_num(offset),
            fmt_num(records.len())
        ));

        let mut params = vec![("limit", limit.to_string()), ("offset", offset.to_string())];
        if let Some(query) = &request.query {
            params.push(("query", query.clone()));
        }

        requests += 1;
        let page = transport
            .get(&url, headers, &params)
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| take_page(&resp.json()?, &request.array_field));

        match page {
            Ok(batch) => {
                let len = batch.len();
                records.extend(batch);
                if len < limit {
                    break;
                }
                offset += limit;
            }
            Err(e) => {
                log::error!(
                    "{}: page at offset {offset} failed, keeping {} records: {e}",
                    request.path,
                    records.len()
                );
                return FetchOutcome {
                    records,
                    requests,
                    error: Some(e),
                };
            }
        }
    }

    log::info!(
        "{}: {} records in {requests} requests",
        request.path,
        fmt_num(records.len())
    );
    FetchOutcome {
        records,
        requests,
        error: None,
    }
}

/// Extract the record array; an absent or null field is an empty page.
fn take_page(body: &Value, field: &str) -> Result<Vec<Value>, ApiError> {
    match body.get(field) {
        Some(Value::Array(items)) => Ok(items.clone()),
        Some(Value::Null) | None => Ok(Vec::new()),
        Some(_) => Err(ApiError::Decode(format!("'{field}' is not an array"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn take_page_array() {
        let body = json!({"users": [{"id": "a"}, {"id": "b"}], "totalRecords": 2});
        let page = take_page(&body, "users").unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[1]["id"], "b");
    }

    #[test]
    fn take_page_missing_field_is_empty() {
        assert!(take_page(&json!({"totalRecords": 0}), "users").unwrap().is_empty());
        assert!(take_page(&json!({"users": null}), "users").unwrap().is_empty());
    }

    #[test]
    fn take_page_wrong_type() {
        let err = take_page(&json!({"users": {"id": "a"}}), "users").unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[test]
    fn page_request_builder() {
        let req = PageRequest::new("users", "users")
            .with_query("patronGroup==\"g\"")
            .with_limit(50);
        assert_eq!(req.limit, 50);
        assert_eq!(req.query.as_deref(), Some("patronGroup==\"g\""));
        assert_eq!(PageRequest::new("groups", "usergroups").limit, DEFAULT_PAGE_SIZE);
    }
}
