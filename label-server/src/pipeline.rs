//! Print job pipeline
//!
//! One job is fetch → render → print, strictly in that order. The
//! pipeline knows nothing about concurrency; admission is the gate's
//! business. Collaborators return explicit errors which the pipeline maps
//! onto [`FailureKind`]s.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use shared::{AppError, ErrorCode, PrintRequest, ProductRecord};
use tracing::{error, info, instrument, warn};

use crate::gate::GatePermit;
use crate::printing::{DispatchError, RenderError};
use crate::scraper::FetchError;

/// Product URL → product record
#[async_trait]
pub trait ProductFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<ProductRecord, FetchError>;
}

/// Product record → label image at `out`
#[async_trait]
pub trait LabelRenderer: Send + Sync {
    async fn render(&self, record: &ProductRecord, out: &Path) -> Result<(), RenderError>;
}

/// Label image → printer, optionally followed by a blank page
#[async_trait]
pub trait PrintDispatcher: Send + Sync {
    async fn dispatch(&self, document: &Path, trailing_blank: bool) -> Result<(), DispatchError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    InvalidRequest,
    FetchError,
    RenderError,
    PrintError,
    UnexpectedError,
}

impl FailureKind {
    /// Code reported when the failure carries nothing more specific
    pub fn error_code(self) -> ErrorCode {
        match self {
            FailureKind::InvalidRequest => ErrorCode::InvalidRequest,
            FailureKind::FetchError => ErrorCode::FetchFailed,
            FailureKind::RenderError => ErrorCode::RenderFailed,
            FailureKind::PrintError => ErrorCode::PrintFailed,
            FailureKind::UnexpectedError => ErrorCode::InternalError,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobFailure {
    pub kind: FailureKind,
    pub code: ErrorCode,
    pub detail: String,
}

impl JobFailure {
    pub fn new(kind: FailureKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            code: kind.error_code(),
            detail: detail.into(),
        }
    }

    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = code;
        self
    }
}

impl fmt::Display for JobFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.detail)
    }
}

impl From<JobFailure> for AppError {
    fn from(failure: JobFailure) -> Self {
        AppError::with_message(failure.code, failure.detail)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Success,
    Failure(JobFailure),
}

impl JobOutcome {
    pub fn failure(kind: FailureKind, detail: impl Into<String>) -> Self {
        Self::Failure(JobFailure::new(kind, detail))
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

impl From<JobFailure> for JobOutcome {
    fn from(failure: JobFailure) -> Self {
        Self::Failure(failure)
    }
}

/// Sequences the collaborators for one print job
pub struct JobPipeline {
    fetcher: Arc<dyn ProductFetcher>,
    renderer: Arc<dyn LabelRenderer>,
    dispatcher: Arc<dyn PrintDispatcher>,
    label_path: PathBuf,
    timeout: Option<Duration>,
}

impl JobPipeline {
    pub fn new(
        fetcher: Arc<dyn ProductFetcher>,
        renderer: Arc<dyn LabelRenderer>,
        dispatcher: Arc<dyn PrintDispatcher>,
        label_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            fetcher,
            renderer,
            dispatcher,
            label_path: label_path.into(),
            timeout: None,
        }
    }

    /// Give up on jobs running longer than `timeout`
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run one job to completion
    #[instrument(skip(self), fields(url = %request.url, trailing_blank = request.trailing_blank))]
    pub async fn run(&self, request: PrintRequest) -> JobOutcome {
        let url = request.url.trim();
        if url.is_empty() {
            return JobOutcome::failure(FailureKind::InvalidRequest, "url must not be empty");
        }

        let record = match self.fetcher.fetch(url).await {
            Ok(record) => record,
            Err(e) => {
                warn!(error = %e, upstream = e.is_upstream(), "Fetch failed");
                return JobFailure::new(FailureKind::FetchError, e.to_string())
                    .with_code(e.error_code())
                    .into();
            }
        };

        if let Err(e) = self.renderer.render(&record, &self.label_path).await {
            warn!(error = %e, "Render failed");
            return JobFailure::new(FailureKind::RenderError, e.to_string())
                .with_code(e.error_code())
                .into();
        }

        if let Err(e) = self
            .dispatcher
            .dispatch(&self.label_path, request.trailing_blank)
            .await
        {
            warn!(error = %e, "Print failed");
            return JobFailure::new(FailureKind::PrintError, e.to_string())
                .with_code(e.error_code())
                .into();
        }

        info!(product_id = record.product_id, "Label printed");
        JobOutcome::Success
    }

    /// Run a job on its own task, holding `permit` until the job ends
    ///
    /// The caller going away does not cut the job short or free the gate
    /// early. A panicking collaborator becomes an `UnexpectedError`.
    ///
    /// When the watchdog fires the caller gets a timeout failure right
    /// away, but the gate stays held until the job has actually stopped
    /// touching the label files.
    pub async fn run_guarded(
        self: &Arc<Self>,
        permit: GatePermit,
        request: PrintRequest,
    ) -> JobOutcome {
        let pipeline = Arc::clone(self);
        let limit = self.timeout;

        let job = tokio::spawn(async move {
            let mut work = tokio::spawn(async move { pipeline.run(request).await });

            let joined = match limit {
                Some(limit) => match tokio::time::timeout(limit, &mut work).await {
                    Ok(joined) => joined,
                    Err(_) => {
                        warn!(?limit, "Job timed out, gate held until it stops");
                        tokio::spawn(async move {
                            let _ = work.await;
                            permit.release();
                            info!("Timed out job finished, gate released");
                        });
                        let failure =
                            JobFailure::new(FailureKind::UnexpectedError, "job timed out")
                                .with_code(ErrorCode::TimeoutError);
                        return Ok(JobOutcome::Failure(failure));
                    }
                },
                None => work.await,
            };
            permit.release();
            joined
        });

        match job.await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(e)) | Err(e) => {
                error!(error = %e, "Print job aborted");
                JobOutcome::failure(FailureKind::UnexpectedError, format!("job aborted: {}", e))
            }
        }
    }
}
