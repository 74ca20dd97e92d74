#![allow(dead_code)]

// tests/common/mod.rs
use actix_web::body::BoxBody;
use actix_web::dev::ServiceResponse;
use actix_web::http::header::HeaderName;
use actix_web::test;
use serde_json::Value;

pub mod proptest_prelude;

// Logging is auto-installed for every test binary
#[ctor::ctor]
fn init_logging() {
    host_test_support::logging::init();
}

/// Checks the `{ok:false, error, code, trace_id}` failure envelope and that
/// the body trace id matches the `x-trace-id` header.
pub async fn assert_error_envelope(
    resp: ServiceResponse<BoxBody>,
    expected_status: u16,
    expected_code: &str,
) -> Value {
    assert_eq!(resp.status().as_u16(), expected_status);

    let trace_hdr = HeaderName::from_static("x-trace-id");
    let trace_id = resp
        .headers()
        .get(&trace_hdr)
        .and_then(|v| v.to_str().ok())
        .expect("x-trace-id header should be present")
        .to_string();
    assert!(!trace_id.is_empty(), "x-trace-id should not be empty");

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["ok"], false);
    assert_eq!(body["code"], expected_code);
    assert_eq!(body["status"], expected_status);
    assert!(body["error"].as_str().is_some_and(|s| !s.is_empty()));
    assert_eq!(
        body["trace_id"].as_str(),
        Some(trace_id.as_str()),
        "trace_id in body should match x-trace-id header"
    );
    body
}
