use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::resume::ResumeSummary;

/// Wire-level status of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Processing,
    Completed,
    Error,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Error => "error",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle of a job. The summary lives inside `Completed`, so a summary
/// exists exactly when the job has completed.
#[derive(Debug, Clone, PartialEq)]
pub enum JobState {
    Processing,
    Completed(ResumeSummary),
    Error,
}

impl JobState {
    pub fn status(&self) -> JobStatus {
        match self {
            JobState::Processing => JobStatus::Processing,
            JobState::Completed(_) => JobStatus::Completed,
            JobState::Error => JobStatus::Error,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobState::Processing)
    }

    pub fn summary(&self) -> Option<&ResumeSummary> {
        match self {
            JobState::Completed(summary) => Some(summary),
            _ => None,
        }
    }

    /// Only `processing -> completed | error` is allowed.
    pub fn can_transition_to(&self, next: &JobState) -> bool {
        matches!(self, JobState::Processing) && next.is_terminal()
    }
}

/// One uploaded resume and its processing state.
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    pub id: String,
    pub file_name: String,
    pub upload_date: DateTime<Utc>,
    pub text: Option<String>,
    pub state: JobState,
}

impl Job {
    /// Creates a job in the `processing` state with a fresh identifier.
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            id: generate_job_id(),
            file_name: file_name.into(),
            upload_date: Utc::now(),
            text: None,
            state: JobState::Processing,
        }
    }

    pub fn status(&self) -> JobStatus {
        self.state.status()
    }

    pub fn summary(&self) -> Option<&ResumeSummary> {
        self.state.summary()
    }

    pub fn metadata(&self) -> JobMetadata {
        JobMetadata {
            id: self.id.clone(),
            file_name: self.file_name.clone(),
            upload_date: self
                .upload_date
                .to_rfc3339_opts(SecondsFormat::Millis, true),
            status: self.status(),
        }
    }
}

/// Public view of a job returned by the upload and lookup endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobMetadata {
    pub id: String,
    pub file_name: String,
    pub upload_date: String,
    pub status: JobStatus,
}

/// Named fields that may be merged into an existing job. Fields left as
/// `None` are not touched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobPatch {
    pub text: Option<String>,
    pub state: Option<JobState>,
}

impl JobPatch {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            state: None,
        }
    }

    pub fn completed(summary: ResumeSummary) -> Self {
        Self {
            text: None,
            state: Some(JobState::Completed(summary)),
        }
    }

    pub fn failed() -> Self {
        Self {
            text: None,
            state: Some(JobState::Error),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_none() && self.state.is_none()
    }
}

/// Event published when a job reaches a terminal state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobFinished {
    pub id: String,
    pub status: JobStatus,
}

/// `resume-<unix millis>-<9 lowercase alphanumerics>`
pub fn generate_job_id() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("resume-{}-{}", Utc::now().timestamp_millis(), &suffix[..9])
}
