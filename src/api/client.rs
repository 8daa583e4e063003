//! API client for the RFantibody pipeline service
//!
//! Handles all HTTP communication with the backend API.

use reqwest::Client;
use thiserror::Error;
use tracing::debug;

use super::base::ApiBase;
use super::response::PipelineResult;
use crate::config::ApiConfig;
use crate::job::JobPayload;

/// API errors
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP {status} - {body}")]
    Status { status: u16, body: String },

    #[error("Malformed response: {message}")]
    Decode { message: String, body: String },

    #[error("Invalid API base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("Invalid job id: '{0}'")]
    InvalidJobId(String),

    #[error("Could not build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
}

/// Which part of a finished job to archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveScope {
    /// The whole job directory.
    Job,
    /// Only the `output/` subdirectory.
    Output,
}

impl ArchiveScope {
    pub fn as_api_value(&self) -> &'static str {
        match self {
            ArchiveScope::Job => "job",
            ArchiveScope::Output => "output",
        }
    }
}

const USER_AGENT: &str = concat!("rfantibody-client/", env!("CARGO_PKG_VERSION"));

/// API client for the pipeline service
#[derive(Debug, Clone)]
pub struct PipelineClient {
    client: Client,
    base: ApiBase,
}

impl PipelineClient {
    /// Create a client for an already-resolved base URL.
    pub fn new(base: ApiBase, verify_ssl: bool) -> Result<Self, ApiError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .danger_accept_invalid_certs(!verify_ssl)
            .build()
            .map_err(ApiError::ClientBuild)?;

        Ok(Self { client, base })
    }

    /// Resolve the base URL from config (plus an optional override) and build a client.
    pub fn from_config(config: &ApiConfig, base_override: Option<&str>) -> Result<Self, ApiError> {
        let base = config.resolve_base(base_override)?;
        Self::new(base, config.verify_ssl)
    }

    pub fn base(&self) -> &ApiBase {
        &self.base
    }

    /// Post one job. No retries and no request timeout: the pipeline may run for a long time.
    pub async fn submit_job(&self, payload: JobPayload) -> Result<PipelineResult, ApiError> {
        let url = self.base.pipeline_url();
        debug!(%url, parts = payload.parts().len(), "posting pipeline job");

        let response = self
            .client
            .post(&url)
            .multipart(payload.into_multipart())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        PipelineResult::from_body(&body)
    }

    /// Fetch the ZIP archive of a finished job.
    pub async fn download_archive(
        &self,
        job_id: &str,
        scope: ArchiveScope,
    ) -> Result<Vec<u8>, ApiError> {
        let job_id = job_id.trim();
        if job_id.is_empty() || job_id.contains(['/', '?', '#', '\\']) || job_id == ".." {
            return Err(ApiError::InvalidJobId(job_id.to_string()));
        }

        let url = self.base.endpoint(&format!("/jobs/{job_id}/archive"));
        debug!(%url, scope = scope.as_api_value(), "downloading job archive");

        let response = self
            .client
            .get(&url)
            .query(&[("scope", scope.as_api_value())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.bytes().await?.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::{build_payload, Attachment, JobForm};
    use axum::extract::{Multipart, Path, Query};
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum::Router;
    use std::collections::HashMap;

    async fn serve(router: Router) -> PipelineClient {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        let base = ApiBase::resolve(&format!("http://{addr}/api"), "http://unused").unwrap();
        PipelineClient::new(base, true).unwrap()
    }

    fn payload() -> JobPayload {
        let mut form = JobForm::new();
        form.select_framework_file(Some(Attachment::new("fw.pdb", b"FRAMEWORK".to_vec())));
        form.select_target_file(Some(Attachment::new("target.pdb", b"TARGET".to_vec())));
        form.hotspots_mut().set("A21,B14-21");
        build_payload(&form, "demo").unwrap()
    }

    async fn echo_parts(mut multipart: Multipart) -> axum::Json<serde_json::Value> {
        let mut fields = serde_json::Map::new();
        while let Some(field) = multipart.next_field().await.unwrap() {
            let name = field.name().unwrap_or_default().to_string();
            let value = match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let len = field.bytes().await.unwrap().len();
                    format!("{file_name}:{len}")
                }
                None => field.text().await.unwrap(),
            };
            fields.insert(name, serde_json::Value::String(value));
        }
        axum::Json(serde_json::json!({ "status": "queued", "received": fields }))
    }

    #[tokio::test]
    async fn submit_sends_every_part() {
        let client = serve(Router::new().route("/api/rfantibody_pipeline", post(echo_parts))).await;
        let result = client.submit_job(payload()).await.unwrap();
        let received = &result.raw["received"];

        assert_eq!(result.status(), "queued");
        assert_eq!(received["jobName"], "demo");
        assert_eq!(received["hotspots"], "A21,B14-21");
        assert_eq!(received["designLoops"], "H1:7,H2:6,H3:5-13");
        assert_eq!(received["rfDiffusionDeterministic"], "false");
        assert_eq!(received["frameworkFile"], "fw.pdb:9");
        assert_eq!(received["targetFile"], "target.pdb:6");
        assert_eq!(received.as_object().unwrap().len(), 12);
    }

    #[tokio::test]
    async fn error_status_carries_body_text() {
        let client = serve(Router::new().route(
            "/api/rfantibody_pipeline",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        ))
        .await;
        let err = client.submit_job(payload()).await.unwrap_err();
        assert!(matches!(err, ApiError::Status { status: 500, .. }));
        assert_eq!(err.to_string(), "HTTP 500 - boom");
    }

    #[tokio::test]
    async fn success_with_garbage_body_is_decode_error() {
        let client = serve(Router::new().route(
            "/api/rfantibody_pipeline",
            post(|| async { "not json" }),
        ))
        .await;
        let err = client.submit_job(payload()).await.unwrap_err();
        assert!(matches!(err, ApiError::Decode { .. }));
    }

    #[tokio::test]
    async fn unreachable_server_is_network_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let base = ApiBase::resolve(&format!("http://{addr}"), "http://unused").unwrap();
        let client = PipelineClient::new(base, true).unwrap();
        let err = client.submit_job(payload()).await.unwrap_err();
        assert!(matches!(err, ApiError::Network(_)));
    }

    #[tokio::test]
    async fn download_requests_scoped_archive() {
        let client = serve(Router::new().route(
            "/api/jobs/:job_id/archive",
            get(
                |Path(job_id): Path<String>, Query(q): Query<HashMap<String, String>>| async move {
                    format!("{job_id}/{}", q.get("scope").cloned().unwrap_or_default())
                },
            ),
        ))
        .await;
        let bytes = client
            .download_archive("job-42", ArchiveScope::Output)
            .await
            .unwrap();
        assert_eq!(bytes, b"job-42/output");
    }

    #[tokio::test]
    async fn download_rejects_path_like_job_ids() {
        let base = ApiBase::resolve("/api", "http://localhost:1").unwrap();
        let client = PipelineClient::new(base, true).unwrap();
        let err = client
            .download_archive("../etc", ArchiveScope::Job)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidJobId(_)));
    }

    #[tokio::test]
    async fn client_without_cert_checks_keeps_user_agent() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let router = Router::new().route(
            "/rfantibody_pipeline",
            post(|headers: axum::http::HeaderMap| async move {
                let agent = headers
                    .get(axum::http::header::USER_AGENT)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                axum::Json(serde_json::json!({ "status": "queued", "agent": agent }))
            }),
        );
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        let base = ApiBase::resolve(&format!("http://{addr}"), "http://unused").unwrap();
        let client = PipelineClient::new(base, false).unwrap();
        let result = client.submit_job(payload()).await.unwrap();
        assert_eq!(result.raw["agent"], USER_AGENT);
    }
}
