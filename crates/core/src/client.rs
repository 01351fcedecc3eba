//! Fetching evaluation data from the backend.
//!
//! The dashboard endpoint wraps its payload in a `{ "data": ... }` envelope.
//! The latest-run endpoint returns the run object directly, though a `data`
//! wrapper is accepted there too.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use crate::error::DashboardError;
use crate::types::{DashboardData, EvaluationRunDetail};

/// Base URL used when none is configured.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3000";

/// Request timeout used when none is configured.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Path of the dashboard endpoint, relative to the base URL.
pub const DASHBOARD_PATH: &str = "/internalUtility/eBBotTesting/dashboard";

/// Path of the latest evaluation run, relative to the base URL.
pub const LATEST_RUN_PATH: &str = "/internalUtility/eBBotTesting/evaluations/latest";

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Where evaluation data comes from.
pub trait DashboardSource: Send + Sync {
    /// Fetch the full dashboard payload.
    fn fetch_dashboard(&self) -> Result<DashboardData, DashboardError>;

    /// Fetch the most recent evaluation run.
    fn fetch_latest_run(&self) -> Result<EvaluationRunDetail, DashboardError>;
}

/// Blocking HTTP source backed by a `ureq` agent.
pub struct HttpSource {
    base_url: String,
    agent: ureq::Agent,
}

impl HttpSource {
    /// Create a source with the default timeout.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_timeout(base_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a source with an explicit request timeout.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let agent = ureq::AgentBuilder::new()
            .timeout(timeout)
            .user_agent(&format!("evaldash/{}", VERSION))
            .build();
        Self { base_url, agent }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn dashboard_url(&self) -> String {
        format!("{}{}", self.base_url, DASHBOARD_PATH)
    }

    #[must_use]
    pub fn latest_run_url(&self) -> String {
        format!("{}{}", self.base_url, LATEST_RUN_PATH)
    }

    fn get_json(&self, url: &str) -> Result<JsonValue, DashboardError> {
        tracing::debug!("GET {}", url);

        let response = self
            .agent
            .get(url)
            .set("Accept", "application/json")
            .call()
            .map_err(|e| match e {
                ureq::Error::Status(code, response) => DashboardError::fetch(
                    url,
                    Some(code),
                    format!("HTTP {} {}", code, response.status_text()),
                ),
                ureq::Error::Transport(transport) => {
                    DashboardError::fetch(url, None, transport.to_string())
                }
            })?;

        tracing::trace!("{} answered {}", url, response.status());

        response
            .into_json::<JsonValue>()
            .map_err(|e| DashboardError::data_shape(url, format!("body is not JSON: {}", e)))
    }
}

impl DashboardSource for HttpSource {
    fn fetch_dashboard(&self) -> Result<DashboardData, DashboardError> {
        let url = self.dashboard_url();
        let body = self.get_json(&url)?;
        decode_dashboard(&url, body)
    }

    fn fetch_latest_run(&self) -> Result<EvaluationRunDetail, DashboardError> {
        let url = self.latest_run_url();
        let body = self.get_json(&url)?;
        decode_run(&url, body)
    }
}

/// Reads a saved response body from disk instead of the network.
///
/// The file holds whatever the endpoint would have returned, so the same
/// envelope rules apply.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_json(&self) -> Result<(String, JsonValue), DashboardError> {
        let location = self.path.display().to_string();
        tracing::debug!("reading {}", location);

        let contents = fs::read_to_string(&self.path)
            .map_err(|e| DashboardError::fetch(&location, None, e.to_string()))?;
        let body = serde_json::from_str(&contents).map_err(|e| {
            DashboardError::data_shape(&location, format!("file is not JSON: {}", e))
        })?;
        Ok((location, body))
    }
}

impl DashboardSource for FileSource {
    fn fetch_dashboard(&self) -> Result<DashboardData, DashboardError> {
        let (location, body) = self.read_json()?;
        decode_dashboard(&location, body)
    }

    fn fetch_latest_run(&self) -> Result<EvaluationRunDetail, DashboardError> {
        let (location, body) = self.read_json()?;
        decode_run(&location, body)
    }
}

/// Unwrap the `{ "data": ... }` envelope and decode the dashboard payload.
pub fn decode_dashboard(url: &str, body: JsonValue) -> Result<DashboardData, DashboardError> {
    let JsonValue::Object(mut envelope) = body else {
        return Err(DashboardError::data_shape(url, "response is not a JSON object"));
    };

    let data = match envelope.remove("data") {
        Some(data) if !data.is_null() => data,
        _ => {
            return Err(DashboardError::data_shape(
                url,
                "response is missing the `data` envelope",
            ))
        }
    };

    decode_payload(url, data, "dashboard")
}

/// Decode an evaluation run, with or without a `data` wrapper.
pub fn decode_run(url: &str, body: JsonValue) -> Result<EvaluationRunDetail, DashboardError> {
    let run = match body {
        JsonValue::Object(mut map) if !map.contains_key("runId") && map.contains_key("data") => {
            map.remove("data").unwrap_or(JsonValue::Null)
        }
        other => other,
    };

    if !run.is_object() {
        return Err(DashboardError::data_shape(
            url,
            "response does not contain an evaluation run",
        ));
    }

    decode_payload(url, run, "evaluation run")
}

fn decode_payload<T: DeserializeOwned>(
    url: &str,
    value: JsonValue,
    what: &str,
) -> Result<T, DashboardError> {
    serde_json::from_value(value).map_err(|e| {
        DashboardError::data_shape(url, format!("{} payload has an unexpected shape: {}", what, e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const URL: &str = "http://localhost:3000/internalUtility/eBBotTesting/dashboard";

    #[test]
    fn test_urls_trim_trailing_slash() {
        let source = HttpSource::new("http://api.internal:8080/");
        assert_eq!(source.base_url(), "http://api.internal:8080");
        assert_eq!(
            source.dashboard_url(),
            "http://api.internal:8080/internalUtility/eBBotTesting/dashboard"
        );
        assert!(source.latest_run_url().ends_with("/evaluations/latest"));
    }

    #[test]
    fn test_decode_dashboard_envelope() {
        let body = json!({
            "data": {
                "metrics": {"rules": {"total": 2, "passed": 1, "failed": 1}},
                "llmSpecs": [],
                "testCases": [],
                "results": {"structure": [], "discount": [], "rules": []}
            }
        });
        let data = decode_dashboard(URL, body).unwrap();
        assert_eq!(data.metrics.rules.as_ref().map(|m| m.total), Some(2));
        assert!(data.results.is_empty());
    }

    #[test]
    fn test_decode_dashboard_missing_envelope() {
        let body = json!({"testCases": [], "results": {}});
        let err = decode_dashboard(URL, body).unwrap_err();
        assert!(matches!(err, DashboardError::DataShape { .. }));
        assert!(err.to_string().contains("`data`"));
    }

    #[test]
    fn test_decode_dashboard_null_data() {
        let err = decode_dashboard(URL, json!({"data": null})).unwrap_err();
        assert!(matches!(err, DashboardError::DataShape { .. }));
    }

    #[test]
    fn test_decode_dashboard_not_an_object() {
        let err = decode_dashboard(URL, json!([1, 2, 3])).unwrap_err();
        assert!(matches!(err, DashboardError::DataShape { .. }));
    }

    #[test]
    fn test_decode_dashboard_payload_without_results() {
        let err = decode_dashboard(URL, json!({"data": {"testCases": []}})).unwrap_err();
        assert!(matches!(err, DashboardError::DataShape { .. }));
        assert!(err.to_string().contains("dashboard payload"));
    }

    #[test]
    fn test_decode_run_plain_and_wrapped() {
        let run = json!({
            "runId": "run-42",
            "startedAt": "2026-03-01T10:15:00Z",
            "results": []
        });
        let plain = decode_run(URL, run.clone()).unwrap();
        let wrapped = decode_run(URL, json!({"data": run})).unwrap();
        assert_eq!(plain, wrapped);
        assert_eq!(plain.run_id, "run-42");
    }

    #[test]
    fn test_decode_run_rejects_empty_body() {
        let err = decode_run(URL, JsonValue::Null).unwrap_err();
        assert!(matches!(err, DashboardError::DataShape { .. }));
    }

    #[test]
    fn test_file_source_missing_file_is_fetch_error() {
        let source = FileSource::new("/definitely/not/here/dashboard.json");
        let err = source.fetch_dashboard().unwrap_err();
        assert!(matches!(err, DashboardError::Fetch { status: None, .. }));
    }

    #[test]
    fn test_file_source_reads_saved_responses() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.json");
        std::fs::write(
            &path,
            r#"{"data": {"runId": 9, "startedAt": "2026-03-01T10:15:00Z", "results": []}}"#,
        )
        .unwrap();

        let source = FileSource::new(&path);
        assert_eq!(source.fetch_latest_run().unwrap().run_id, "9");

        // A run is not a dashboard envelope.
        std::fs::write(&path, "{\"runId\": \"x\"}").unwrap();
        assert!(matches!(
            source.fetch_dashboard().unwrap_err(),
            DashboardError::DataShape { .. }
        ));

        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(
            source.fetch_dashboard().unwrap_err(),
            DashboardError::DataShape { .. }
        ));
    }
}
