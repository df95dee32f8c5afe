//! Mock Prometheus server helpers shared by the integration tests

#![allow(dead_code)]

use serde_json::{json, Value};
use std::time::Duration;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

pub const INSTANT_PATH: &str = "/api/v1/query";
pub const RANGE_PATH: &str = "/api/v1/query_range";

/// Start a server answering `GET endpoint` with `status` and a JSON body
///
/// # Arguments
/// - `latency_ms`: delay before each response is sent
pub async fn setup_prometheus_mock(
    endpoint: &str,
    status: u16,
    body: Value,
    latency_ms: u64,
) -> MockServer {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(endpoint))
        .respond_with(
            ResponseTemplate::new(status)
                .set_delay(Duration::from_millis(latency_ms))
                .set_body_json(body),
        )
        .mount(&mock_server)
        .await;

    mock_server
}

/// Start a server answering `GET endpoint` with a raw, non-JSON body
pub async fn setup_raw_mock(endpoint: &str, status: u16, body: &str) -> MockServer {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(endpoint))
        .respond_with(ResponseTemplate::new(status).set_body_raw(body.as_bytes(), "text/plain"))
        .mount(&mock_server)
        .await;

    mock_server
}

/// Successful envelope around `result`
pub fn success_body(result_type: &str, result: Value) -> Value {
    json!({
        "status": "success",
        "data": {
            "resultType": result_type,
            "result": result
        }
    })
}

/// Error envelope as the API returns it for a bad expression
pub fn error_body(message: &str) -> Value {
    json!({
        "status": "error",
        "errorType": "bad_data",
        "error": message
    })
}

/// Instant vector with `up{job="node"}` and a long-named memory series
pub fn two_series_vector() -> Value {
    success_body(
        "vector",
        json!([
            {
                "metric": {"__name__": "up", "job": "node"},
                "value": [1_700_000_000.0, "1"]
            },
            {
                "metric": {"__name__": "process_resident_memory_bytes"},
                "value": [1_700_000_000.0, "52428800"]
            }
        ]),
    )
}

/// Matrix with one series of `count` samples spaced `step_secs` apart
pub fn matrix_series(name: &str, start: i64, count: usize, step_secs: i64) -> Value {
    let values: Vec<Value> = (0..count)
        .map(|i| {
            let ts = start + i as i64 * step_secs;
            json!([ts as f64, format!("{}", i % 10)])
        })
        .collect();

    success_body(
        "matrix",
        json!([
            {
                "metric": {"__name__": name, "instance": "localhost:9090"},
                "values": values
            }
        ]),
    )
}
