//! Read-only view of a finished submission.

use crate::api::{ApiBase, PipelineResult};

use super::controller::SubmissionState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadLink {
    pub label: &'static str,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineFailure {
    pub stage: Option<String>,
    pub log_tail: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultView {
    pub status: String,
    /// Job name echoed by the service, if any.
    pub job_name: Option<String>,
    pub summary: String,
    pub pretty: String,
    pub downloads: Vec<DownloadLink>,
    pub pipeline_error: Option<PipelineFailure>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorView {
    pub line: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Presentation {
    Result(ResultView),
    Error(ErrorView),
}

/// Nothing to show while idle or pending.
pub fn present(state: &SubmissionState, base: &ApiBase) -> Option<Presentation> {
    match state {
        SubmissionState::Idle | SubmissionState::Pending { .. } => None,
        SubmissionState::Succeeded { result, .. } => {
            Some(Presentation::Result(result_view(result, base)))
        }
        SubmissionState::Failed { failure, .. } => Some(Presentation::Error(ErrorView {
            line: format!("Error: {}", failure.message),
        })),
    }
}

pub fn result_view(result: &PipelineResult, base: &ApiBase) -> ResultView {
    let job_name = result.job_name().map(str::to_string);
    let mut summary = format!("Status: {}", result.status());
    if let Some(name) = &job_name {
        summary.push_str(&format!(" · Job: {name}"));
    }

    let downloads = [("Job ZIP", result.job_zip()), ("Output ZIP", result.output_zip())]
        .into_iter()
        .filter_map(|(label, link)| {
            link.map(|link| DownloadLink {
                label,
                url: base.resolve_link(link),
            })
        })
        .collect();

    let pipeline_error = result.is_pipeline_error().then(|| PipelineFailure {
        stage: result.response.stage.clone(),
        log_tail: result.response.log_tail.clone(),
    });

    ResultView {
        status: result.status().to_string(),
        job_name,
        summary,
        pretty: result.pretty(),
        downloads,
        pipeline_error,
    }
}
