//! Single-flight submission state machine.
//!
//! The controller is the only writer of `SubmissionState`. A submit is accepted
//! only when the snapshot is complete and nothing is in flight; the check and
//! the move to `Pending` happen in one step on the watch channel, so a second
//! caller racing the first always sees `Pending`.

use tokio::sync::watch;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::api::{ApiError, PipelineClient, PipelineResult};
use crate::job::{build_payload, JobConfiguration, MissingField, PayloadError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The request never produced a response.
    Transport,
    /// Non-2xx response.
    Status,
    /// 2xx response that did not match the expected schema.
    Decode,
    /// The form could not be turned into a request body.
    Payload,
    /// The in-flight submission was dropped before it finished.
    Aborted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl SubmissionFailure {
    fn aborted() -> Self {
        Self {
            kind: FailureKind::Aborted,
            message: "Submission was interrupted before the service answered".to_string(),
        }
    }
}

impl From<ApiError> for SubmissionFailure {
    fn from(err: ApiError) -> Self {
        let kind = match &err {
            ApiError::Status { .. } => FailureKind::Status,
            ApiError::Decode { .. } => FailureKind::Decode,
            ApiError::Network(_)
            | ApiError::ClientBuild(_)
            | ApiError::InvalidBaseUrl(_)
            | ApiError::InvalidJobId(_) => FailureKind::Transport,
        };
        Self {
            kind,
            message: err.to_string(),
        }
    }
}

impl From<PayloadError> for SubmissionFailure {
    fn from(err: PayloadError) -> Self {
        Self {
            kind: FailureKind::Payload,
            message: err.to_string(),
        }
    }
}

/// Lifecycle of the session's submission. Every non-idle state carries the
/// job name captured when the submit was dispatched.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SubmissionState {
    #[default]
    Idle,
    Pending {
        job_name: String,
    },
    Succeeded {
        job_name: String,
        result: PipelineResult,
    },
    Failed {
        job_name: String,
        failure: SubmissionFailure,
    },
}

impl SubmissionState {
    pub fn is_pending(&self) -> bool {
        matches!(self, SubmissionState::Pending { .. })
    }

    #[cfg(test)]
    pub fn job_name(&self) -> Option<&str> {
        match self {
            SubmissionState::Idle => None,
            SubmissionState::Pending { job_name }
            | SubmissionState::Succeeded { job_name, .. }
            | SubmissionState::Failed { job_name, .. } => Some(job_name),
        }
    }
}

/// Why `submit` did nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    Incomplete(Vec<MissingField>),
    AlreadyPending,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The precondition failed; state is unchanged and nothing was sent.
    Rejected(Rejection),
    /// The attempt ran to completion; carries the terminal state.
    Completed(SubmissionState),
}

pub struct SubmissionController {
    client: PipelineClient,
    state: watch::Sender<SubmissionState>,
}

impl SubmissionController {
    pub fn new(client: PipelineClient) -> Self {
        let (state, _) = watch::channel(SubmissionState::Idle);
        Self { client, state }
    }

    pub fn client(&self) -> &PipelineClient {
        &self.client
    }

    pub fn state(&self) -> SubmissionState {
        self.state.borrow().clone()
    }

    pub fn is_pending(&self) -> bool {
        self.state.borrow().is_pending()
    }

    /// Submit a snapshot of the form.
    ///
    /// A no-op when the snapshot is incomplete or another submit is pending.
    /// Otherwise sends exactly one request and always leaves `Pending` before
    /// returning.
    pub async fn submit(&self, config: JobConfiguration) -> SubmitOutcome {
        let missing = config.missing_fields();
        if !missing.is_empty() {
            debug!(?missing, "submit ignored: configuration incomplete");
            return SubmitOutcome::Rejected(Rejection::Incomplete(missing));
        }

        let job_name = config.effective_job_name();
        let accepted = self.state.send_if_modified(|state| {
            if state.is_pending() {
                return false;
            }
            *state = SubmissionState::Pending {
                job_name: job_name.clone(),
            };
            true
        });
        if !accepted {
            debug!("submit ignored: a submission is already pending");
            return SubmitOutcome::Rejected(Rejection::AlreadyPending);
        }

        let guard = PendingGuard {
            state: &self.state,
            job_name: &job_name,
            armed: true,
        };

        let span = info_span!("submission", attempt = %Uuid::new_v4(), job_name = %job_name);
        let outcome = self.run(&config, &job_name).instrument(span).await;

        let terminal = match outcome {
            Ok(result) => SubmissionState::Succeeded {
                job_name: job_name.clone(),
                result,
            },
            Err(failure) => SubmissionState::Failed {
                job_name: job_name.clone(),
                failure,
            },
        };
        guard.finish(terminal.clone());
        SubmitOutcome::Completed(terminal)
    }

    async fn run(
        &self,
        config: &JobConfiguration,
        job_name: &str,
    ) -> Result<PipelineResult, SubmissionFailure> {
        let payload = build_payload(config, job_name).map_err(|err| {
            warn!(error = %err, "could not build request body");
            SubmissionFailure::from(err)
        })?;

        info!(endpoint = %self.client.base().pipeline_url(), "dispatching pipeline job");
        match self.client.submit_job(payload).await {
            Ok(result) => {
                info!(status = result.status(), job_id = ?result.job_id(), "pipeline accepted job");
                Ok(result)
            }
            Err(err) => {
                let failure = SubmissionFailure::from(err);
                warn!(kind = ?failure.kind, error = %failure.message, "pipeline submission failed");
                Err(failure)
            }
        }
    }
}

/// Moves the state out of `Pending` even if the submit future is dropped mid-flight.
struct PendingGuard<'a> {
    state: &'a watch::Sender<SubmissionState>,
    job_name: &'a str,
    armed: bool,
}

impl PendingGuard<'_> {
    fn finish(mut self, terminal: SubmissionState) {
        self.armed = false;
        self.state.send_replace(terminal);
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.state.send_replace(SubmissionState::Failed {
                job_name: self.job_name.to_string(),
                failure: SubmissionFailure::aborted(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiBase;
    use crate::job::{Attachment, JobForm};
    use axum::extract::Multipart;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::Router;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    async fn serve(router: Router) -> PipelineClient {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        let base = ApiBase::resolve(&format!("http://{addr}/api"), "http://unused").unwrap();
        PipelineClient::new(base, true).unwrap()
    }

    fn ready_form() -> JobForm {
        let mut form = JobForm::new();
        form.select_framework_file(Some(Attachment::new("fw.pdb", b"FW".to_vec())));
        form.select_target_file(Some(Attachment::new("target.pdb", b"TG".to_vec())));
        form
    }

    fn counting_router(hits: Arc<AtomicUsize>, status: StatusCode, body: &'static str) -> Router {
        Router::new().route(
            "/api/rfantibody_pipeline",
            post(move || {
                let hits = Arc::clone(&hits);
                async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    (status, body)
                }
            }),
        )
    }

    #[tokio::test]
    async fn starts_idle() {
        let base = ApiBase::resolve("/api", "http://localhost:1").unwrap();
        let controller = SubmissionController::new(PipelineClient::new(base, true).unwrap());
        assert_eq!(controller.state(), SubmissionState::Idle);
        assert!(!controller.is_pending());
    }

    #[tokio::test]
    async fn incomplete_form_is_rejected_without_request() {
        let hits = Arc::new(AtomicUsize::new(0));
        let client = serve(counting_router(Arc::clone(&hits), StatusCode::OK, "{}")).await;
        let controller = SubmissionController::new(client);

        let outcome = controller.submit(JobForm::new().snapshot()).await;
        assert_eq!(
            outcome,
            SubmitOutcome::Rejected(Rejection::Incomplete(vec![
                MissingField::FrameworkStructure,
                MissingField::TargetStructure,
            ]))
        );
        assert_eq!(controller.state(), SubmissionState::Idle);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn server_error_becomes_failed_state() {
        let hits = Arc::new(AtomicUsize::new(0));
        let client = serve(counting_router(
            Arc::clone(&hits),
            StatusCode::INTERNAL_SERVER_ERROR,
            "boom",
        ))
        .await;
        let controller = SubmissionController::new(client);

        controller.submit(ready_form().snapshot()).await;
        match controller.state() {
            SubmissionState::Failed { failure, .. } => {
                assert_eq!(failure.message, "HTTP 500 - boom");
                assert_eq!(failure.kind, FailureKind::Status);
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn success_stores_result_and_captured_name() {
        let hits = Arc::new(AtomicUsize::new(0));
        let client = serve(counting_router(
            Arc::clone(&hits),
            StatusCode::OK,
            r#"{"status":"queued","job":{"jobName":"X"}}"#,
        ))
        .await;
        let controller = SubmissionController::new(client);

        let mut form = ready_form();
        form.set_job_name("  X ");
        controller.submit(form.snapshot()).await;

        match controller.state() {
            SubmissionState::Succeeded { job_name, result } => {
                assert_eq!(job_name, "X");
                assert_eq!(result.status(), "queued");
            }
            other => panic!("expected Succeeded, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn concurrent_submits_send_one_request() {
        let hits = Arc::new(AtomicUsize::new(0));
        let client = serve(counting_router(
            Arc::clone(&hits),
            StatusCode::OK,
            r#"{"status":"queued"}"#,
        ))
        .await;
        let controller = SubmissionController::new(client);
        let form = ready_form();

        let (first, second) = tokio::join!(
            controller.submit(form.snapshot()),
            controller.submit(form.snapshot())
        );

        assert!(matches!(first, SubmitOutcome::Completed(SubmissionState::Succeeded { .. })));
        assert_eq!(second, SubmitOutcome::Rejected(Rejection::AlreadyPending));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(!controller.is_pending());
    }

    #[tokio::test]
    async fn resubmit_after_failure_is_allowed() {
        let hits = Arc::new(AtomicUsize::new(0));
        let client = serve(counting_router(
            Arc::clone(&hits),
            StatusCode::BAD_REQUEST,
            "bad loops",
        ))
        .await;
        let controller = SubmissionController::new(client);

        controller.submit(ready_form().snapshot()).await;
        controller.submit(ready_form().snapshot()).await;
        assert_eq!(hits.load(Ordering::SeqCst), 2);
        assert!(matches!(controller.state(), SubmissionState::Failed { .. }));
    }

    #[tokio::test]
    async fn malformed_integer_fails_without_request() {
        let hits = Arc::new(AtomicUsize::new(0));
        let client = serve(counting_router(Arc::clone(&hits), StatusCode::OK, "{}")).await;
        let controller = SubmissionController::new(client);

        let mut form = ready_form();
        form.set_protein_mpnn_designs("lots");
        controller.submit(form.snapshot()).await;

        match controller.state() {
            SubmissionState::Failed { failure, .. } => {
                assert_eq!(failure.kind, FailureKind::Payload);
                assert!(failure.message.contains("proteinMPNNDesigns"));
            }
            other => panic!("expected Failed, got {other:?}"),
        }
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    fn is_timestamp_name(name: &str) -> bool {
        let Some(stamp) = name.strip_prefix("RFantibody_") else {
            return false;
        };
        // YYYY-MM-DDTHH-MM-SS
        stamp.len() == 19
            && stamp.char_indices().all(|(i, c)| match i {
                4 | 7 | 13 | 16 => c == '-',
                10 => c == 'T',
                _ => c.is_ascii_digit(),
            })
    }

    #[tokio::test]
    async fn blank_job_name_is_captured_once() {
        let received = Arc::new(Mutex::new(None::<String>));
        let sink = Arc::clone(&received);
        let client = serve(Router::new().route(
            "/api/rfantibody_pipeline",
            post(move |mut multipart: Multipart| {
                let sink = Arc::clone(&sink);
                async move {
                    while let Some(field) = multipart.next_field().await.unwrap() {
                        if field.name() == Some("jobName") {
                            *sink.lock().unwrap() = Some(field.text().await.unwrap());
                        }
                    }
                    r#"{"status":"queued"}"#
                }
            }),
        ))
        .await;
        let controller = SubmissionController::new(client);

        controller.submit(ready_form().snapshot()).await;
        let name = controller.state().job_name().map(str::to_string).unwrap();
        assert!(is_timestamp_name(&name), "unexpected job name {name}");
        assert_eq!(received.lock().unwrap().as_deref(), Some(name.as_str()));
    }

    #[test]
    fn timestamp_name_shape() {
        assert!(is_timestamp_name("RFantibody_2025-01-01T00-00-00"));
        assert!(!is_timestamp_name("RFantibody_2025-01-01T00:00:00"));
        assert!(!is_timestamp_name("job_2025-01-01T00-00-00"));
    }

    #[tokio::test]
    async fn dropped_submit_does_not_stay_pending() {
        let hits = Arc::new(AtomicUsize::new(0));
        let client = serve(counting_router(
            Arc::clone(&hits),
            StatusCode::OK,
            r#"{"status":"queued"}"#,
        ))
        .await;
        let controller = SubmissionController::new(client);

        let attempt = controller.submit(ready_form().snapshot());
        let timed_out = tokio::time::timeout(Duration::from_millis(5), attempt).await;
        assert!(timed_out.is_err());

        match controller.state() {
            SubmissionState::Failed { failure, .. } => {
                assert_eq!(failure.kind, FailureKind::Aborted)
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }
}
