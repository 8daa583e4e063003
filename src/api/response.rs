//! Typed pipeline response.

use serde::Deserialize;
use serde_json::Value;

use super::client::ApiError;

/// Body returned by `POST /rfantibody_pipeline` on success.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PipelineResponse {
    pub status: String,
    #[serde(default, rename = "jobId")]
    pub job_id: Option<String>,
    #[serde(default)]
    pub job: Option<JobSummary>,
    /// Failing stage when `status` is `"error"`.
    #[serde(default)]
    pub stage: Option<String>,
    #[serde(default)]
    pub log_tail: Option<String>,
    #[serde(default)]
    pub links: Option<ResultLinks>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct JobSummary {
    #[serde(default, rename = "jobName")]
    pub job_name: Option<String>,
    #[serde(default, rename = "jobId")]
    pub job_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ResultLinks {
    #[serde(default)]
    pub download: Option<DownloadLinks>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DownloadLinks {
    #[serde(default, rename = "jobZip")]
    pub job_zip: Option<String>,
    #[serde(default, rename = "outputZip")]
    pub output_zip: Option<String>,
}

/// Decoded response plus the raw JSON it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineResult {
    pub response: PipelineResponse,
    pub raw: Value,
}

impl PipelineResult {
    pub fn from_body(body: &str) -> Result<Self, ApiError> {
        let raw: Value = serde_json::from_str(body).map_err(|err| ApiError::Decode {
            message: err.to_string(),
            body: body.to_string(),
        })?;
        let response =
            PipelineResponse::deserialize(&raw).map_err(|err| ApiError::Decode {
                message: err.to_string(),
                body: body.to_string(),
            })?;
        Ok(Self { response, raw })
    }

    pub fn status(&self) -> &str {
        &self.response.status
    }

    pub fn job_name(&self) -> Option<&str> {
        self.response
            .job
            .as_ref()
            .and_then(|job| job.job_name.as_deref())
            .filter(|name| !name.is_empty())
    }

    pub fn job_id(&self) -> Option<&str> {
        self.response
            .job_id
            .as_deref()
            .or_else(|| self.response.job.as_ref().and_then(|job| job.job_id.as_deref()))
            .filter(|id| !id.is_empty())
    }

    fn download(&self) -> Option<&DownloadLinks> {
        self.response.links.as_ref()?.download.as_ref()
    }

    pub fn job_zip(&self) -> Option<&str> {
        self.download()?.job_zip.as_deref().filter(|l| !l.is_empty())
    }

    pub fn output_zip(&self) -> Option<&str> {
        self.download()?.output_zip.as_deref().filter(|l| !l.is_empty())
    }

    /// The pipeline ran but one of its stages failed.
    pub fn is_pipeline_error(&self) -> bool {
        self.response.status.eq_ignore_ascii_case("error")
    }

    pub fn pretty(&self) -> String {
        serde_json::to_string_pretty(&self.raw).unwrap_or_else(|_| self.raw.to_string())
    }
}
