//! In-process job registry.
//!
//! Every job lives here for the life of the process. Each entry is locked
//! independently, so workers updating different jobs never contend.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use thiserror::Error;
use tokio::sync::broadcast;

use crate::jobs::models::{Job, JobFinished, JobPatch, JobStatus};

const EVENT_CAPACITY: usize = 256;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Job {0} not found")]
    NotFound(String),

    #[error("Job {0} already exists")]
    DuplicateId(String),

    #[error("Job {id} is already {status}")]
    Terminal { id: String, status: JobStatus },

    #[error("Job {id} cannot move from {from} to {to}")]
    InvalidTransition {
        id: String,
        from: JobStatus,
        to: JobStatus,
    },
}

#[derive(Clone)]
pub struct JobStore {
    jobs: Arc<DashMap<String, Job>>,
    finished: broadcast::Sender<JobFinished>,
}

impl Default for JobStore {
    fn default() -> Self {
        Self::new()
    }
}

impl JobStore {
    pub fn new() -> Self {
        let (finished, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            jobs: Arc::new(DashMap::new()),
            finished,
        }
    }

    /// Inserts a new job. The identifier must not already be registered.
    pub fn create(&self, job: Job) -> Result<(), StoreError> {
        match self.jobs.entry(job.id.clone()) {
            Entry::Occupied(_) => Err(StoreError::DuplicateId(job.id)),
            Entry::Vacant(slot) => {
                slot.insert(job);
                Ok(())
            }
        }
    }

    /// Returns a snapshot of the job, if known.
    pub fn get(&self, id: &str) -> Option<Job> {
        self.jobs.get(id).map(|job| job.value().clone())
    }

    /// Merges `patch` into the job under the entry lock and returns the
    /// updated snapshot. Terminal jobs accept no further changes.
    pub fn update(&self, id: &str, patch: JobPatch) -> Result<Job, StoreError> {
        let mut entry = self
            .jobs
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        let job = entry.value_mut();

        if job.state.is_terminal() && !patch.is_empty() {
            return Err(StoreError::Terminal {
                id: id.to_string(),
                status: job.status(),
            });
        }
        if let Some(next) = &patch.state {
            if !job.state.can_transition_to(next) {
                return Err(StoreError::InvalidTransition {
                    id: id.to_string(),
                    from: job.status(),
                    to: next.status(),
                });
            }
        }

        if let Some(text) = patch.text {
            job.text = Some(text);
        }
        let finished = patch.state.is_some();
        if let Some(state) = patch.state {
            job.state = state;
        }

        let snapshot = job.clone();
        drop(entry);

        if finished {
            // Sending fails only when nobody is subscribed.
            let _ = self.finished.send(JobFinished {
                id: snapshot.id.clone(),
                status: snapshot.status(),
            });
        }
        Ok(snapshot)
    }

    pub fn delete(&self, id: &str) -> Option<Job> {
        self.jobs.remove(id).map(|(_, job)| job)
    }

    /// Subscribes to terminal transitions of any job.
    pub fn subscribe(&self) -> broadcast::Receiver<JobFinished> {
        self.finished.subscribe()
    }

    /// Number of jobs currently held, in any state.
    pub fn count(&self) -> usize {
        self.jobs.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::models::JobState;
    use crate::models::resume::ResumeSummary;

    fn summary() -> ResumeSummary {
        serde_json::from_str(r#"{"name": "Jane Doe", "experienceYears": 5}"#).unwrap()
    }

    fn store_with_job() -> (JobStore, String) {
        let store = JobStore::new();
        let job = Job::new("cv.txt");
        let id = job.id.clone();
        store.create(job).unwrap();
        (store, id)
    }

    #[test]
    fn test_create_then_get_returns_snapshot() {
        let (store, id) = store_with_job();
        let job = store.get(&id).unwrap();
        assert_eq!(job.id, id);
        assert_eq!(job.status(), JobStatus::Processing);
        assert_eq!(store.count(), 1);
    }

    #[test]
    fn test_get_unknown_is_none() {
        let store = JobStore::new();
        assert!(store.get("resume-0-missing").is_none());
        assert_eq!(store.count(), 0);
    }

    #[test]
    fn test_create_rejects_duplicate_id() {
        let (store, id) = store_with_job();
        let mut dup = Job::new("other.txt");
        dup.id = id.clone();
        assert_eq!(store.create(dup), Err(StoreError::DuplicateId(id.clone())));
        assert_eq!(store.get(&id).unwrap().file_name, "cv.txt");
    }

    #[test]
    fn test_update_text_leaves_other_fields() {
        let (store, id) = store_with_job();
        let before = store.get(&id).unwrap();
        let after = store.update(&id, JobPatch::text("hello")).unwrap();
        assert_eq!(after.text.as_deref(), Some("hello"));
        assert_eq!(after.state, JobState::Processing);
        assert_eq!(after.file_name, before.file_name);
        assert_eq!(after.upload_date, before.upload_date);
    }

    #[test]
    fn test_update_state_keeps_text() {
        let (store, id) = store_with_job();
        store.update(&id, JobPatch::text("hello")).unwrap();
        let job = store.update(&id, JobPatch::completed(summary())).unwrap();
        assert_eq!(job.text.as_deref(), Some("hello"));
        assert_eq!(job.summary(), Some(&summary()));
    }

    #[test]
    fn test_update_unknown_is_not_found() {
        let store = JobStore::new();
        assert_eq!(
            store.update("nope", JobPatch::failed()),
            Err(StoreError::NotFound("nope".to_string()))
        );
    }

    #[test]
    fn test_terminal_job_rejects_further_updates() {
        let (store, id) = store_with_job();
        store.update(&id, JobPatch::failed()).unwrap();

        let err = store.update(&id, JobPatch::completed(summary())).unwrap_err();
        assert!(matches!(err, StoreError::Terminal { status: JobStatus::Error, .. }));
        let err = store.update(&id, JobPatch::text("late")).unwrap_err();
        assert!(matches!(err, StoreError::Terminal { .. }));

        let job = store.get(&id).unwrap();
        assert_eq!(job.status(), JobStatus::Error);
        assert!(job.text.is_none());
    }

    #[test]
    fn test_processing_to_processing_is_invalid() {
        let (store, id) = store_with_job();
        let patch = JobPatch {
            text: Some("ignored".to_string()),
            state: Some(JobState::Processing),
        };
        let err = store.update(&id, patch).unwrap_err();
        assert!(matches!(err, StoreError::InvalidTransition { .. }));
        // Rejected patches leave the record untouched.
        assert!(store.get(&id).unwrap().text.is_none());
    }

    #[test]
    fn test_delete_removes_job() {
        let (store, id) = store_with_job();
        assert_eq!(store.delete(&id).map(|j| j.id), Some(id.clone()));
        assert!(store.get(&id).is_none());
        assert!(store.delete(&id).is_none());
    }

    /// Drives every short sequence of patches through the store and checks
    /// the summary/status invariant and status monotonicity after each step.
    #[test]
    fn test_summary_iff_completed_across_patch_sequences() {
        let patches = [
            JobPatch::text("text"),
            JobPatch::completed(summary()),
            JobPatch::failed(),
            JobPatch::default(),
        ];

        for a in &patches {
            for b in &patches {
                for c in &patches {
                    let (store, id) = store_with_job();
                    let mut seen_terminal: Option<JobStatus> = None;
                    for patch in [a, b, c] {
                        let _ = store.update(&id, patch.clone());
                        let job = store.get(&id).unwrap();
                        assert_eq!(
                            job.summary().is_some(),
                            job.status() == JobStatus::Completed
                        );
                        if let Some(terminal) = seen_terminal {
                            assert_eq!(job.status(), terminal);
                        } else if job.state.is_terminal() {
                            seen_terminal = Some(job.status());
                        }
                    }
                }
            }
        }
    }

    #[tokio::test]
    async fn test_subscribe_sees_terminal_transition() {
        let (store, id) = store_with_job();
        let mut finished = store.subscribe();

        store.update(&id, JobPatch::text("hello")).unwrap();
        store.update(&id, JobPatch::completed(summary())).unwrap();

        let event = finished.recv().await.unwrap();
        assert_eq!(event.id, id);
        assert_eq!(event.status, JobStatus::Completed);
        assert!(finished.try_recv().is_err());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_updates_do_not_cross_jobs() {
        let store = JobStore::new();
        let mut ids = Vec::new();
        for i in 0..32 {
            let job = Job::new(format!("cv-{i}.txt"));
            ids.push(job.id.clone());
            store.create(job).unwrap();
        }

        let mut handles = Vec::new();
        for (i, id) in ids.iter().cloned().enumerate() {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.update(&id, JobPatch::text(format!("text-{i}"))).unwrap();
                if i % 2 == 0 {
                    store.update(&id, JobPatch::failed()).unwrap();
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        for (i, id) in ids.iter().enumerate() {
            let job = store.get(id).unwrap();
            assert_eq!(job.text, Some(format!("text-{i}")));
            let expected = if i % 2 == 0 {
                JobStatus::Error
            } else {
                JobStatus::Processing
            };
            assert_eq!(job.status(), expected);
        }
    }
}
