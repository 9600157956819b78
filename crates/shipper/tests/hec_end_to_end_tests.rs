//! End-to-end tests: shipper through the real HTTP client.
//!
//! This module tests the full path from `send` to the collector endpoint
//! against a wiremock server:
//! - Wire format and authentication of shipped batches
//! - Retry-until-success against a flapping collector
//! - Immediate abandonment on authorization failures
//!
//! # Invariants
//! - Requests go to `/services/collector/event` with the "Splunk" auth
//!   prefix.
//! - A 500-then-200 sequence is retried; a 403 is not.

use std::time::Duration;

use hec_shipper::{LogRecord, Shipper, ShipperConfig};
use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn hec_config(url: &str, max_retries: usize) -> ShipperConfig {
    ShipperConfig::builder()
        .token(SecretString::new("test-hec-token".to_string().into()))
        .url(url.to_string())
        .source("integration-test")
        .sourcetype("json")
        .batch_interval(Duration::from_secs(60))
        .max_retries(max_retries)
        .retry_base_delay(Duration::from_millis(1))
        .retry_max_delay(Duration::from_millis(10))
        .build()
        .expect("config")
}

#[tokio::test]
async fn test_send_flush_delivers_wire_format() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/services/collector/event"))
        .and(header("Authorization", "Splunk test-hec-token"))
        .and(header("Content-Type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 0,
            "text": "Success"
        })))
        .mount(&mock_server)
        .await;

    let shipper = Shipper::new(hec_config(&mock_server.uri(), 10)).expect("shipper");

    let receipt = shipper
        .send(LogRecord::new("info", "hello splunk").with_time(1234567890.5))
        .expect("send");
    shipper.flush().await.expect("flush");
    receipt.wait().await.expect("delivered");

    let requests = mock_server
        .received_requests()
        .await
        .expect("requests recorded");
    assert_eq!(requests.len(), 1);

    let body = String::from_utf8(requests[0].body.clone()).expect("utf8 body");
    let line: serde_json::Value = serde_json::from_str(&body).expect("NDJSON line");
    assert_eq!(line["event"]["message"], json!("hello splunk"));
    assert_eq!(line["event"]["severity"], json!("info"));
    assert_eq!(line["source"], json!("integration-test"));
    assert_eq!(line["sourcetype"], json!("json"));
    assert_eq!(line["time"], json!(1234567890.5));
}

#[tokio::test]
async fn test_retries_500_until_success() {
    let mock_server = MockServer::start().await;

    // 500 three times, then 200: the batch must end delivered after
    // four attempts.
    Mock::given(method("POST"))
        .and(path("/services/collector/event"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "code": 9,
            "text": "Internal server error"
        })))
        .up_to_n_times(3)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/services/collector/event"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 0,
            "text": "Success"
        })))
        .mount(&mock_server)
        .await;

    let shipper = Shipper::new(hec_config(&mock_server.uri(), 5)).expect("shipper");

    let receipt = shipper.send(LogRecord::new("info", "flaky")).expect("send");
    shipper.flush().await.expect("flush");
    receipt.wait().await.expect("delivered after retries");

    let requests = mock_server
        .received_requests()
        .await
        .expect("requests recorded");
    assert_eq!(requests.len(), 4);
}

#[tokio::test]
async fn test_403_abandons_without_retry() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/services/collector/event"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "code": 2,
            "text": "Invalid token"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let shipper = Shipper::new(hec_config(&mock_server.uri(), 10)).expect("shipper");

    let receipt = shipper.send(LogRecord::new("info", "rejected")).expect("send");
    shipper.flush().await.expect("flush");

    let err = receipt.wait().await.expect_err("abandoned");
    assert_eq!(err.attempts, 1);
    assert_eq!(err.source.status, Some(403));
    assert!(!err.source.is_transient());

    mock_server.verify().await;
}

#[tokio::test]
async fn test_exhausted_retries_reports_last_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/services/collector/event"))
        .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
        .mount(&mock_server)
        .await;

    let shipper = Shipper::new(hec_config(&mock_server.uri(), 2)).expect("shipper");

    let receipt = shipper.send(LogRecord::new("info", "doomed")).expect("send");
    shipper.flush().await.expect("flush");

    let err = receipt.wait().await.expect_err("abandoned");
    assert_eq!(err.attempts, 3);
    assert_eq!(err.source.status, Some(503));

    let requests = mock_server
        .received_requests()
        .await
        .expect("requests recorded");
    assert_eq!(requests.len(), 3);
}
