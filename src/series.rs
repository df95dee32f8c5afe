//! Prometheus query API responses and their render-ready form
//!
//! The HTTP API answers with an envelope whose `data.result` shape depends on
//! `data.resultType`. This module decodes that envelope and flattens it into
//! labelled [`Series`] that the chart renderers consume.

use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

use crate::error::{Error, Result};

/// Reserved label carrying the metric name
pub const NAME_LABEL: &str = "__name__";

/// Base used for series whose label set has no metric name
pub const UNNAMED_METRIC: &str = "metric";

/// Maximum visible width of a bar-chart label
pub const BAR_LABEL_WIDTH: usize = 20;

/// Outcome reported by the API envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

/// Shape of `data.result`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultType {
    Vector,
    Matrix,
    Scalar,
    String,
}

/// Raw response envelope from `/api/v1/query` and `/api/v1/query_range`
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse {
    pub status: Status,
    /// Decoded into [`ResponseData`] only for successful responses
    #[serde(default)]
    pub data: Option<JsonValue>,
    #[serde(default, rename = "errorType")]
    pub error_type: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
}

/// Payload of a successful response
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseData {
    #[serde(rename = "resultType")]
    pub result_type: ResultType,
    /// Kept raw: an array of series for vector/matrix, a bare pair otherwise
    pub result: JsonValue,
}

/// One entry of a vector or matrix result
#[derive(Debug, Clone, Deserialize)]
struct RawSeries {
    #[serde(default)]
    metric: BTreeMap<String, String>,
    #[serde(default)]
    value: Option<RawSample>,
    #[serde(default)]
    values: Vec<RawSample>,
}

/// `[<unix seconds>, "<value>"]` as sent on the wire
#[derive(Debug, Clone, Deserialize)]
struct RawSample(f64, String);

/// A decoded point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub timestamp: f64,
    pub value: f64,
}

/// A labelled, time-ordered sequence of samples
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label: String,
    samples: Vec<Sample>,
}

impl Series {
    pub fn new(label: impl Into<String>, samples: Vec<Sample>) -> Self {
        Self {
            label: label.into(),
            samples,
        }
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn timestamps(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.timestamp).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.value).collect()
    }

    /// Most recent sample, which is the only one for instant queries
    pub fn latest(&self) -> Option<Sample> {
        self.samples.last().copied()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Render-ready result of one query
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    pub status: Status,
    pub error: Option<String>,
    pub series: Vec<Series>,
}

impl QueryResult {
    pub fn success(series: Vec<Series>) -> Self {
        Self {
            status: Status::Success,
            error: None,
            series,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            status: Status::Error,
            error: Some(message.into()),
            series: Vec::new(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.status == Status::Error
    }
}

/// Decode a response body and flatten it into series
pub fn decode_response(body: &[u8]) -> Result<QueryResult> {
    let response: ApiResponse = serde_json::from_slice(body)?;
    transform(response)
}

/// Flatten a decoded envelope into render-ready series
///
/// An error envelope never has its `data` inspected. An empty `result` is a
/// successful, empty query.
pub fn transform(response: ApiResponse) -> Result<QueryResult> {
    for warning in &response.warnings {
        tracing::warn!(warning = %warning, "Metrics API returned a warning");
    }

    if response.status == Status::Error {
        tracing::debug!(error_type = ?response.error_type, "Metrics API reported a failed query");
        let message = response
            .error
            .unwrap_or_else(|| "Unknown error".to_string());
        return Ok(QueryResult::failure(message));
    }

    let data: ResponseData = match response.data {
        Some(raw) => serde_json::from_value(raw)?,
        None => return Err(Error::Decode("success response is missing 'data'".to_string())),
    };

    let series = match data.result_type {
        ResultType::Vector | ResultType::Matrix => {
            let entries: Vec<RawSeries> = serde_json::from_value(data.result)?;
            entries
                .into_iter()
                .map(|entry| build_series(entry, data.result_type))
                .collect::<Result<Vec<_>>>()?
        }
        ResultType::Scalar | ResultType::String => {
            let raw: RawSample = serde_json::from_value(data.result)?;
            let label = match data.result_type {
                ResultType::Scalar => "scalar",
                _ => "string",
            };
            vec![Series::new(label, vec![decode_sample(raw)?])]
        }
    };

    Ok(QueryResult::success(series))
}

fn build_series(entry: RawSeries, result_type: ResultType) -> Result<Series> {
    let label = series_label(&entry.metric);

    let samples = match result_type {
        ResultType::Vector => {
            let raw = entry.value.ok_or_else(|| {
                Error::Decode(format!("instant series '{}' has no 'value'", label))
            })?;
            vec![decode_sample(raw)?]
        }
        _ => entry
            .values
            .into_iter()
            .map(decode_sample)
            .collect::<Result<Vec<_>>>()?,
    };

    Ok(Series::new(label, samples))
}

fn decode_sample(raw: RawSample) -> Result<Sample> {
    let RawSample(timestamp, text) = raw;
    let value = text
        .parse::<f64>()
        .map_err(|_| Error::Decode(format!("non-numeric sample value '{}'", text)))?;
    Ok(Sample { timestamp, value })
}

/// Build `name{k=v,...}` from a label set, tags in lexicographic key order
pub fn series_label(metric: &BTreeMap<String, String>) -> String {
    let name = metric
        .get(NAME_LABEL)
        .map(String::as_str)
        .unwrap_or(UNNAMED_METRIC);

    let tags: Vec<String> = metric
        .iter()
        .filter(|(k, _)| k.as_str() != NAME_LABEL)
        .map(|(k, v)| format!("{}={}", k, v))
        .collect();

    if tags.is_empty() {
        name.to_string()
    } else {
        format!("{}{{{}}}", name, tags.join(","))
    }
}

/// Shorten a label to [`BAR_LABEL_WIDTH`] characters, ending in `...` when cut
pub fn truncate_label(label: &str) -> String {
    if label.chars().count() <= BAR_LABEL_WIDTH {
        return label.to_string();
    }
    let head: String = label.chars().take(BAR_LABEL_WIDTH - 3).collect();
    format!("{}...", head)
}
