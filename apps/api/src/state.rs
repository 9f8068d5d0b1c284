use std::sync::Arc;

use crate::config::Config;
use crate::jobs::store::JobStore;
use crate::summary::SummaryGenerator;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Every submitted job, for the life of the process.
    pub jobs: JobStore,
    /// Pluggable generator. Default: LlmSummaryGenerator; tests use stubs.
    pub summarizer: Arc<dyn SummaryGenerator>,
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config, summarizer: Arc<dyn SummaryGenerator>) -> Self {
        Self {
            jobs: JobStore::new(),
            summarizer,
            config,
        }
    }
}
