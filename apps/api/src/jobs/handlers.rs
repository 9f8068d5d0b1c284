//! Axum route handlers for the Resume API.

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, Path, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::jobs::models::{Job, JobMetadata, JobStatus};
use crate::jobs::worker::{spawn_processing, ResumeFile};
use crate::models::resume::MediaType;
use crate::state::AppState;

/// Multipart field carrying the resume file.
pub const RESUME_FIELD: &str = "resume";

#[derive(Debug, Serialize)]
pub struct ProcessingResponse {
    pub status: JobStatus,
    pub message: &'static str,
}

struct ResumeUpload {
    file_name: String,
    file: ResumeFile,
}

/// POST /api/resumes/upload
///
/// Registers a `processing` job, starts the background worker and returns
/// without waiting for it.
pub async fn handle_upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<JobMetadata>, AppError> {
    let multipart = multipart.map_err(|rejection| {
        warn!(reason = %rejection.body_text(), "Resume upload is not multipart");
        AppError::Validation(format!("Expected multipart form data: {}", rejection.body_text()))
    })?;
    let upload = read_resume_upload(multipart).await?;

    let job = Job::new(upload.file_name);
    let metadata = job.metadata();
    state
        .jobs
        .create(job)
        .map_err(|e| AppError::Internal(e.into()))?;

    info!(
        job_id = %metadata.id,
        file_name = %metadata.file_name,
        media_type = upload.file.media_type.as_mime(),
        "Resume accepted for processing"
    );

    // Detached: the response does not wait on the worker.
    drop(spawn_processing(
        state.jobs.clone(),
        state.summarizer.clone(),
        metadata.id.clone(),
        upload.file,
    ));

    Ok(Json(metadata))
}

/// GET /api/resumes/:id/summary
///
/// 202 while processing, 500 once failed, 200 with the summary once completed.
pub async fn handle_get_summary(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let job = state
        .jobs
        .get(&id)
        .ok_or_else(|| AppError::NotFound("Resume not found".to_string()))?;

    match job.status() {
        JobStatus::Processing => Ok((
            StatusCode::ACCEPTED,
            Json(ProcessingResponse {
                status: JobStatus::Processing,
                message: "Resume is still being processed",
            }),
        )
            .into_response()),
        JobStatus::Error => Err(AppError::ProcessingFailed),
        JobStatus::Completed => job
            .summary()
            .map(|summary| Json(summary).into_response())
            .ok_or_else(|| AppError::NotFound("Summary not available".to_string())),
    }
}

/// GET /api/resumes/:id
pub async fn handle_get_resume(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<JobMetadata>, AppError> {
    state
        .jobs
        .get(&id)
        .map(|job| Json(job.metadata()))
        .ok_or_else(|| AppError::NotFound("Resume not found".to_string()))
}

/// DELETE /api/resumes/:id
pub async fn handle_delete_resume(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state
        .jobs
        .delete(&id)
        .ok_or_else(|| AppError::NotFound("Resume not found".to_string()))?;
    info!(job_id = %id, "Resume deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Reads the `resume` field, skipping any others, and validates its type.
async fn read_resume_upload(mut multipart: Multipart) -> Result<ResumeUpload, AppError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(RESUME_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or("resume").to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        let media_type = MediaType::from_mime(&content_type).ok_or_else(|| {
            warn!(content_type = %content_type, "Rejected resume upload type");
            AppError::Validation(
                "Invalid file type. Only PDF and TXT files are allowed.".to_string(),
            )
        })?;

        let bytes = field.bytes().await.map_err(multipart_error)?;

        return Ok(ResumeUpload {
            file_name,
            file: ResumeFile { media_type, bytes },
        });
    }

    warn!("Resume upload without a file");
    Err(AppError::Validation("No file uploaded".to_string()))
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(e.body_text())
    } else {
        AppError::Validation(format!("Failed to read multipart: {}", e.body_text()))
    }
}
