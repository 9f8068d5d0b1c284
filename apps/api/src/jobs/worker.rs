//! Background worker: extract text, summarize, record the outcome.
//!
//! Flow: extract_text → update(text) → summarize → update(completed).
//! Any failure along the way marks the job `error`. Nothing is retried and
//! nothing propagates past `process_resume`.

use std::sync::Arc;

use bytes::Bytes;
use thiserror::Error;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::extraction::{extract_text, ExtractionError};
use crate::jobs::models::JobPatch;
use crate::jobs::store::{JobStore, StoreError};
use crate::models::resume::{MediaType, ResumeSummary};
use crate::summary::{SummaryError, SummaryGenerator};

/// Raw upload handed from the submission handler to the worker.
#[derive(Debug, Clone)]
pub struct ResumeFile {
    pub media_type: MediaType,
    pub bytes: Bytes,
}

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Summary(#[from] SummaryError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Spawns the pipeline for one job on the runtime. Callers that do not need
/// to wait may drop the handle; the task keeps running.
pub fn spawn_processing(
    jobs: JobStore,
    summarizer: Arc<dyn SummaryGenerator>,
    job_id: String,
    file: ResumeFile,
) -> JoinHandle<()> {
    tokio::spawn(async move { process_resume(&jobs, summarizer.as_ref(), &job_id, file).await })
}

/// Logs one line per job reaching a terminal state. Runs until every handle
/// to the store has been dropped.
pub fn spawn_finished_log(jobs: &JobStore) -> JoinHandle<()> {
    let mut finished = jobs.subscribe();
    tokio::spawn(async move {
        loop {
            match finished.recv().await {
                Ok(event) => info!(job_id = %event.id, status = %event.status, "Job finished"),
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "Finished-job log fell behind"),
                Err(RecvError::Closed) => break,
            }
        }
    })
}

#[tracing::instrument(skip(jobs, summarizer, file), fields(media_type = file.media_type.as_mime()))]
pub async fn process_resume(
    jobs: &JobStore,
    summarizer: &dyn SummaryGenerator,
    job_id: &str,
    file: ResumeFile,
) {
    match run_pipeline(jobs, summarizer, job_id, file).await {
        Ok(summary) => match jobs.update(job_id, JobPatch::completed(summary)) {
            Ok(_) => info!("Resume processing completed"),
            Err(e) => warn!(error = %e, "Could not record completed summary"),
        },
        Err(e) => {
            error!(error = %e, "Resume processing failed");
            if let Err(e) = jobs.update(job_id, JobPatch::failed()) {
                warn!(error = %e, "Could not mark job as failed");
            }
        }
    }
}

async fn run_pipeline(
    jobs: &JobStore,
    summarizer: &dyn SummaryGenerator,
    job_id: &str,
    file: ResumeFile,
) -> Result<ResumeSummary, WorkerError> {
    let text = extract_text(file.bytes, file.media_type).await?;
    jobs.update(job_id, JobPatch::text(text.as_str()))?;
    let summary = summarizer.summarize(&text, job_id).await?;
    Ok(summary)
}
