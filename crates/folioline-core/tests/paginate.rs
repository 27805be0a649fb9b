//! Pagination against an in-memory collection

use folioline_core::testing::{
    FakeTransport, login_response, numbered_records, page_response, slice_for,
};
use folioline_core::{ApiError, ApiResponse, OkapiClient, OkapiConfig, PageRequest, fetch_all};
use indicatif::ProgressBar;
use reqwest::header::HeaderMap;
use serde_json::Value;

const BASE: &str = "http://okapi.test";

fn collection(total: usize) -> FakeTransport {
    let all = numbered_records(total);
    FakeTransport::new(move |req| Ok(page_response("users", slice_for(&all, req))))
}

fn run(transport: &FakeTransport, limit: usize) -> folioline_core::FetchOutcome {
    let request = PageRequest::new("users", "users").with_limit(limit);
    fetch_all(
        transport,
        BASE,
        &HeaderMap::new(),
        &request,
        &ProgressBar::hidden(),
    )
}

fn ids(records: &[Value]) -> Vec<&str> {
    records.iter().filter_map(|r| r["id"].as_str()).collect()
}

#[test]
fn request_count_matches_page_math() {
    for (total, limit, expected) in [
        (0, 10, 1),
        (1, 10, 1),
        (9, 10, 1),
        (11, 10, 2),
        (25, 10, 3),
        (2500, 1000, 3),
        (7, 1, 8),
    ] {
        let transport = collection(total);
        let outcome = run(&transport, limit);
        assert!(outcome.is_complete());
        assert_eq!(outcome.records.len(), total, "total={total} limit={limit}");
        assert_eq!(outcome.requests, expected, "total={total} limit={limit}");
        assert_eq!(transport.requests().len(), expected);
    }
}

#[test]
fn exact_multiple_costs_one_empty_request() {
    let transport = collection(20);
    let outcome = run(&transport, 10);
    assert_eq!(outcome.records.len(), 20);
    assert_eq!(outcome.requests, 3);

    let offsets: Vec<usize> = transport
        .requests()
        .iter()
        .map(|r| r.param_usize("offset"))
        .collect();
    assert_eq!(offsets, vec![0, 10, 20]);
}

#[test]
fn records_keep_request_order() {
    let transport = collection(23);
    let outcome = run(&transport, 5);
    let expected: Vec<String> = (0..23).map(|i| format!("rec-{i}")).collect();
    assert_eq!(ids(&outcome.records), expected);
}

#[test]
fn query_filter_is_sent_on_every_page() {
    let transport = collection(15);
    let request = PageRequest::new("users", "users")
        .with_limit(10)
        .with_query(r#"patronGroup=="staff""#);
    fetch_all(
        &transport,
        BASE,
        &HeaderMap::new(),
        &request,
        &ProgressBar::hidden(),
    );

    let requests = transport.requests();
    assert_eq!(requests.len(), 2);
    for req in requests {
        assert_eq!(req.param("query"), Some(r#"patronGroup=="staff""#));
        assert_eq!(req.url, "http://okapi.test/users");
    }
}

#[test]
fn http_error_stops_with_partial_records() {
    let all = numbered_records(30);
    let transport = FakeTransport::new(move |req| {
        if req.param_usize("offset") >= 20 {
            Ok(ApiResponse::new(500, "backend down"))
        } else {
            Ok(page_response("users", slice_for(&all, req)))
        }
    });

    let outcome = run(&transport, 10);
    assert_eq!(outcome.records.len(), 20);
    assert_eq!(outcome.requests, 3);
    assert!(matches!(
        outcome.error,
        Some(ApiError::Http {
            status: Some(500),
            ..
        })
    ));
}

#[test]
fn connection_error_stops_immediately() {
    let transport = FakeTransport::new(|_| {
        Err(ApiError::Http {
            status: None,
            message: "refused".to_string(),
        })
    });

    let outcome = run(&transport, 10);
    assert!(outcome.records.is_empty());
    assert_eq!(outcome.requests, 1);
    assert!(!outcome.is_complete());
}

#[test]
fn garbage_body_stops_pagination() {
    let transport = FakeTransport::new(|_| Ok(ApiResponse::new(200, "<html>")));
    let outcome = run(&transport, 10);
    assert!(matches!(outcome.error, Some(ApiError::Decode(_))));
}

#[test]
fn client_fetch_logs_in_and_sends_token() {
    let all = numbered_records(3);
    let transport = FakeTransport::new(move |req| {
        if req.is_login() {
            Ok(login_response("tok-9"))
        } else {
            Ok(page_response("servicepoints", slice_for(&all, req)))
        }
    });
    let config = OkapiConfig {
        base_url: format!("{BASE}/"),
        tenant: "diku".to_string(),
        username: "admin".to_string(),
        password: "pw".to_string(),
    };
    let mut client = OkapiClient::new(config, transport);

    let request = PageRequest::new("service-points", "servicepoints");
    let outcome = client.fetch_all(&request, &ProgressBar::hidden()).unwrap();

    assert_eq!(outcome.records.len(), 3);
    assert_eq!(client.logins(), 1);
    let requests = client.transport().requests();
    let page = requests.iter().find(|r| !r.is_login()).unwrap();
    assert_eq!(page.url, "http://okapi.test/service-points");
    assert_eq!(page.token.as_deref(), Some("tok-9"));
    assert_eq!(page.param("limit"), Some("1000"));
}

#[test]
fn client_get_record_none_on_404() {
    let transport = FakeTransport::new(|req| {
        if req.url.ends_with("/users/known") {
            Ok(ApiResponse::new(200, r#"{"id":"known"}"#))
        } else {
            Ok(ApiResponse::new(404, "not found"))
        }
    });
    let config = OkapiConfig {
        base_url: BASE.to_string(),
        tenant: "diku".to_string(),
        username: "admin".to_string(),
        password: "pw".to_string(),
    };
    let client = OkapiClient::new(config, transport);
    let headers = HeaderMap::new();

    assert_eq!(
        client.get_record(&headers, "users/known").unwrap()["id"],
        "known"
    );
    assert!(client.get_record(&headers, "users/missing").is_none());
}
