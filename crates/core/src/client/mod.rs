//! HTTP access to the pipeline backend.
//!
//! - `upload`: CV validation and multipart upload
//! - `sse`: server-sent event decoding
//! - `stream`: the per-session event stream connection

pub mod sse;
pub mod stream;
pub mod upload;

use crate::error::{WorkflowError, WorkflowResult, UPLOAD_FAILED};
use cf_protocol::result_models::{ErrorDetail, HealthStatus, SessionStatus, UploadResponse};
use reqwest::multipart::Form;
use reqwest::Client;
use tracing::{debug, info, warn};

pub use stream::{Connection, ConnectionState, EventStreamClient, PipelineHandlers};
pub use upload::UploadArtifact;

/// Client for the backend's REST endpoints.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Stream client sharing this client's connection pool.
    pub fn event_stream(&self) -> EventStreamClient {
        EventStreamClient::new(self.http.clone(), self.base_url.clone())
    }

    /// Submit a CV and obtain a session id.
    ///
    /// # Errors
    ///
    /// `WorkflowError::Upload` with the server's `detail` message, or
    /// `Upload failed` when the error body has none.
    pub async fn upload_resume(&self, artifact: UploadArtifact) -> WorkflowResult<UploadResponse> {
        let url = self.endpoint("/api/upload");
        info!(file = artifact.file_name(), bytes = artifact.len(), "Uploading CV");

        let part = artifact
            .into_part()
            .map_err(|e| WorkflowError::Upload(e.to_string()))?;
        let form = Form::new().part("file", part);

        let response = self
            .http
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Upload request failed");
                WorkflowError::Upload(e.to_string())
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response
                .json::<ErrorDetail>()
                .await
                .ok()
                .map(|body| body.detail)
                .filter(|detail| !detail.is_empty())
                .unwrap_or_else(|| UPLOAD_FAILED.to_string());
            warn!(%status, %detail, "Upload rejected");
            return Err(WorkflowError::Upload(detail));
        }

        let upload: UploadResponse = response
            .json()
            .await
            .map_err(|e| WorkflowError::Upload(e.to_string()))?;
        info!(session_id = %upload.session_id, "Session created");
        Ok(upload)
    }

    /// Backend health, or `None` when it cannot be reached.
    pub async fn check_health(&self) -> Option<HealthStatus> {
        let response = match self.http.get(self.endpoint("/health")).send().await {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                debug!(status = %response.status(), "Health check failed");
                return None;
            }
            Err(e) => {
                debug!(error = %e, "Backend unreachable");
                return None;
            }
        };
        response.json().await.ok()
    }

    /// Poll the status of a session.
    pub async fn session_status(&self, session_id: &str) -> WorkflowResult<SessionStatus> {
        let response = self
            .http
            .get(self.endpoint(&format!("/api/status/{session_id}")))
            .send()
            .await
            .map_err(|e| WorkflowError::Status(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response
                .json::<ErrorDetail>()
                .await
                .map(|body| body.detail)
                .unwrap_or_else(|_| format!("HTTP {status}"));
            return Err(WorkflowError::Status(detail));
        }

        response
            .json()
            .await
            .map_err(|e| WorkflowError::Status(e.to_string()))
    }
}
