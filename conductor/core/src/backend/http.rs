//! HTTP Backend Implementation
//!
//! Client for the analysis service's REST API.
//!
//! # Service API
//!
//! - `POST /api/agent/query` - Ask a question, `{ data: QueryResult }` back
//! - `GET /api/projects/{id}` - Project with its tables
//! - `GET /api/agent/preview/{projectId}/{tableName}?limit=N` - Sample rows
//!
//! Failures are logged here, once, with the request's method, URL and status.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use super::error::BackendError;
use super::traits::AnalysisBackend;
use crate::config::ConductorConfig;
use crate::query::{Project, QueryResult, Row, TableMetadata};

/// Timeout for the reachability probe
const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// Response wrapper used by the agent endpoints
#[derive(Deserialize)]
struct Envelope<T> {
    data: Option<T>,
    #[serde(default)]
    error: Option<String>,
}

/// Analysis service client
#[derive(Clone)]
pub struct HttpBackend {
    /// Service root, without the `/api` prefix
    base_url: reqwest::Url,
    /// Per-request timeout
    timeout: Duration,
    /// HTTP client
    http_client: reqwest::Client,
}

impl HttpBackend {
    /// Create a client for the service at `base_url`
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, BackendError> {
        let base_url = reqwest::Url::parse(base_url)
            .map_err(|e| BackendError::Network(format!("invalid service URL {base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(BackendError::Network(format!(
                "invalid service URL {base_url}"
            )));
        }
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BackendError::Network(e.to_string()))?;

        Ok(Self {
            base_url,
            timeout,
            http_client,
        })
    }

    /// Create from the Conductor configuration
    pub fn from_config(config: &ConductorConfig) -> Result<Self, BackendError> {
        Self::new(&config.api_url, config.request_timeout)
    }

    /// Build `{base}/api/{segments...}`, escaping each segment
    fn endpoint(&self, segments: &[&str]) -> reqwest::Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().push("api").extend(segments);
        }
        url
    }

    /// Send a request, turning transport failures and non-2xx statuses into
    /// `BackendError`s
    async fn send(
        &self,
        method: &'static str,
        url: &reqwest::Url,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, BackendError> {
        debug!(method, url = %url, "Analysis service request");

        let response = request.send().await.map_err(|e| {
            let err = BackendError::from_reqwest(&e, self.timeout);
            warn!(method, url = %url, error = %err, "Analysis service request failed");
            err
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        warn!(
            method,
            url = %url,
            status = status.as_u16(),
            body = %body,
            "Analysis service returned an error"
        );
        Err(BackendError::Status {
            status: status.as_u16(),
            message: failure_description(&body),
        })
    }

    /// Read a JSON body
    async fn decode<T: DeserializeOwned>(
        url: &reqwest::Url,
        response: reqwest::Response,
    ) -> Result<T, BackendError> {
        response.json::<T>().await.map_err(|e| {
            warn!(url = %url, error = %e, "Could not decode analysis service response");
            BackendError::Decode(e.to_string())
        })
    }

    /// Read a `{ data }` envelope
    async fn decode_envelope<T: DeserializeOwned>(
        url: &reqwest::Url,
        status: u16,
        response: reqwest::Response,
    ) -> Result<T, BackendError> {
        let envelope: Envelope<T> = Self::decode(url, response).await?;
        match envelope.data {
            Some(data) => Ok(data),
            None => {
                warn!(url = %url, error = ?envelope.error, "Response envelope has no data");
                Err(match envelope.error {
                    Some(message) => BackendError::Status {
                        status,
                        message: Some(message),
                    },
                    None => BackendError::Decode("response has no data field".to_string()),
                })
            }
        }
    }
}

/// Pull a human-readable description out of an error body
fn failure_description(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["error", "message"]
        .iter()
        .find_map(|key| value.get(key).and_then(|v| v.as_str()))
        .map(str::to_string)
}

#[async_trait]
impl AnalysisBackend for HttpBackend {
    fn name(&self) -> &str {
        "HTTP"
    }

    async fn health_check(&self) -> bool {
        self.http_client
            .get(self.endpoint(&["projects"]))
            .timeout(HEALTH_CHECK_TIMEOUT)
            .send()
            .await
            .is_ok()
    }

    async fn submit_query(
        &self,
        project_id: &str,
        question: &str,
    ) -> Result<QueryResult, BackendError> {
        let url = self.endpoint(&["agent", "query"]);
        let body = serde_json::json!({
            "projectId": project_id,
            "question": question,
        });

        let request = self.http_client.post(url.clone()).json(&body);
        let response = self.send("POST", &url, request).await?;
        let status = response.status().as_u16();
        Self::decode_envelope(&url, status, response).await
    }

    async fn list_project_tables(
        &self,
        project_id: &str,
    ) -> Result<Vec<TableMetadata>, BackendError> {
        let url = self.endpoint(&["projects", project_id]);
        let request = self.http_client.get(url.clone());
        let response = self.send("GET", &url, request).await?;
        let project: Project = Self::decode(&url, response).await?;
        Ok(project.tables)
    }

    async fn preview_table(
        &self,
        project_id: &str,
        table_name: &str,
        limit: usize,
    ) -> Result<Vec<Row>, BackendError> {
        let mut url = self.endpoint(&["agent", "preview", project_id, table_name]);
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string());

        let request = self.http_client.get(url.clone());
        let response = self.send("GET", &url, request).await?;
        let status = response.status().as_u16();
        Self::decode_envelope(&url, status, response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend(base: &str) -> HttpBackend {
        HttpBackend::new(base, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_endpoint_urls() {
        let backend = backend("http://localhost:3001");
        assert_eq!(
            backend.endpoint(&["agent", "query"]).as_str(),
            "http://localhost:3001/api/agent/query"
        );
        assert_eq!(
            backend.endpoint(&["projects", "p-1"]).as_str(),
            "http://localhost:3001/api/projects/p-1"
        );
    }

    #[test]
    fn test_endpoint_escapes_segments() {
        let backend = backend("http://localhost:3001/");
        assert_eq!(
            backend
                .endpoint(&["agent", "preview", "p1", "my table"])
                .as_str(),
            "http://localhost:3001/api/agent/preview/p1/my%20table"
        );
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let backend = backend("https://example.com/analysis");
        assert_eq!(
            backend.endpoint(&["agent", "query"]).as_str(),
            "https://example.com/analysis/api/agent/query"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(HttpBackend::new("not a url", Duration::from_secs(1)).is_err());
    }

    #[test]
    fn test_failure_description() {
        assert_eq!(
            failure_description(r#"{"success": false, "error": "No tables found"}"#),
            Some("No tables found".to_string())
        );
        assert_eq!(
            failure_description(r#"{"message": "Bad request"}"#),
            Some("Bad request".to_string())
        );
        assert_eq!(failure_description("<html>502</html>"), None);
        assert_eq!(failure_description(r#"{"error": 42}"#), None);
    }

    #[tokio::test]
    async fn test_unreachable_service_is_network_error() {
        // Port 9 (discard) is closed on any sane test host
        let backend = backend("http://127.0.0.1:9");
        let err = backend.submit_query("p1", "anything").await.unwrap_err();
        assert!(
            matches!(err, BackendError::Network(_) | BackendError::Timeout(_)),
            "{err:?}"
        );
        assert_ne!(err.user_message(), super::super::GENERIC_FAILURE_MESSAGE);
    }
}
