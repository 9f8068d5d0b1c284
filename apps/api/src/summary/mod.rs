//! Summary generation: turns extracted resume text into a `ResumeSummary`.
//!
//! `AppState` holds an `Arc<dyn SummaryGenerator>` so the LLM-backed
//! implementation can be swapped for a stub in tests.

pub mod prompts;

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::{LlmClient, LlmError};
use crate::models::resume::ResumeSummary;
use crate::summary::prompts::SUMMARY_PROMPT_TEMPLATE;

#[derive(Debug, Error)]
pub enum SummaryError {
    #[error("Failed to parse resume with AI: {0}")]
    Llm(#[from] LlmError),
}

#[async_trait]
pub trait SummaryGenerator: Send + Sync {
    /// Produces a summary of `resume_text` tagged with `job_id`.
    async fn summarize(&self, resume_text: &str, job_id: &str)
        -> Result<ResumeSummary, SummaryError>;
}

pub struct LlmSummaryGenerator {
    llm: LlmClient,
}

impl LlmSummaryGenerator {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

pub fn build_summary_prompt(resume_text: &str) -> String {
    SUMMARY_PROMPT_TEMPLATE.replace("{resume_text}", resume_text)
}

#[async_trait]
impl SummaryGenerator for LlmSummaryGenerator {
    async fn summarize(
        &self,
        resume_text: &str,
        job_id: &str,
    ) -> Result<ResumeSummary, SummaryError> {
        let prompt = build_summary_prompt(resume_text);
        let summary: ResumeSummary = self.llm.call_json(&prompt, JSON_ONLY_SYSTEM).await?;
        info!(
            job_id,
            model = self.llm.model(),
            skills = summary.skills.len(),
            "Resume summary generated"
        );
        Ok(summary.with_id(job_id))
    }
}
