//! Command-line client for the Resume API.
//!
//! Uploads one resume file, then polls its summary once a second until the
//! server reports a terminal state or the attempt budget runs out.
//!
//! Usage: `resume-poll <path/to/resume.pdf|.txt>`

use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use reqwest::{multipart, Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const DEFAULT_API_URL: &str = "http://localhost:8080";
const MAX_ATTEMPTS: u32 = 30;
const POLL_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadResponse {
    id: String,
    file_name: String,
    status: String,
}

#[derive(Debug, PartialEq)]
enum PollOutcome {
    Pending,
    Ready(Value),
    Failed(String),
}

/// Maps one status response onto what the poller should do next.
fn classify(status: StatusCode, body: &str) -> PollOutcome {
    match status {
        StatusCode::ACCEPTED => PollOutcome::Pending,
        StatusCode::OK => match serde_json::from_str(body) {
            Ok(summary) => PollOutcome::Ready(summary),
            Err(e) => PollOutcome::Failed(format!("Unreadable summary: {e}")),
        },
        _ => PollOutcome::Failed(error_message(body).unwrap_or_else(|| {
            format!("Failed to retrieve resume summary (HTTP {})", status.as_u16())
        })),
    }
}

fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<Value>(body)
        .ok()?
        .get("error")?
        .as_str()
        .map(String::from)
}

fn mime_for_path(path: &Path) -> Result<&'static str> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("pdf") => Ok("application/pdf"),
        Some("txt") => Ok("text/plain"),
        _ => bail!("Invalid file type. Only PDF and TXT files are allowed."),
    }
}

async fn upload(client: &Client, base_url: &str, path: &Path) -> Result<UploadResponse> {
    let mime = mime_for_path(path)?;
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("resume")
        .to_string();

    let part = multipart::Part::bytes(bytes)
        .file_name(file_name)
        .mime_str(mime)?;
    let form = multipart::Form::new().part("resume", part);

    let response = client
        .post(format!("{base_url}/api/resumes/upload"))
        .multipart(form)
        .send()
        .await?;

    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        bail!(error_message(&body).unwrap_or_else(|| format!("Upload failed (HTTP {status})")));
    }
    Ok(serde_json::from_str(&body)?)
}

async fn poll_summary(client: &Client, base_url: &str, id: &str) -> Result<Value> {
    let url = format!("{base_url}/api/resumes/{id}/summary");

    for attempt in 1..=MAX_ATTEMPTS {
        let response = client.get(&url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        match classify(status, &body) {
            PollOutcome::Pending => {
                debug!(attempt, "Resume still processing");
                tokio::time::sleep(POLL_INTERVAL).await;
            }
            PollOutcome::Ready(summary) => return Ok(summary),
            PollOutcome::Failed(message) => return Err(anyhow!(message)),
        }
    }

    bail!("Processing timeout. Please try again.")
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let path = std::env::args()
        .nth(1)
        .context("usage: resume-poll <resume.pdf|resume.txt>")?;
    let base_url = std::env::var("RESUME_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
    let base_url = base_url.trim_end_matches('/');

    let client = Client::new();
    let job = upload(&client, base_url, Path::new(&path)).await?;
    info!(id = %job.id, file_name = %job.file_name, status = %job.status, "Uploaded resume");

    let summary = poll_summary(&client, base_url, &job.id).await?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepted_keeps_polling() {
        let body = r#"{"status":"processing","message":"Resume is still being processed"}"#;
        assert_eq!(classify(StatusCode::ACCEPTED, body), PollOutcome::Pending);
    }

    #[test]
    fn test_ok_returns_summary() {
        let body = r#"{"id":"resume-1-abc","name":"Jane Doe"}"#;
        match classify(StatusCode::OK, body) {
            PollOutcome::Ready(summary) => assert_eq!(summary["name"], "Jane Doe"),
            other => panic!("expected Ready, got {other:?}"),
        }
    }

    #[test]
    fn test_server_error_stops_with_message() {
        let body = r#"{"error":"Resume processing failed","code":"PROCESSING_FAILED"}"#;
        assert_eq!(
            classify(StatusCode::INTERNAL_SERVER_ERROR, body),
            PollOutcome::Failed("Resume processing failed".to_string())
        );
    }

    #[test]
    fn test_error_without_json_body_uses_status() {
        assert_eq!(
            classify(StatusCode::BAD_GATEWAY, "upstream down"),
            PollOutcome::Failed("Failed to retrieve resume summary (HTTP 502)".to_string())
        );
    }

    #[test]
    fn test_mime_for_path() {
        assert_eq!(mime_for_path(Path::new("cv.PDF")).unwrap(), "application/pdf");
        assert_eq!(mime_for_path(Path::new("cv.txt")).unwrap(), "text/plain");
        assert!(mime_for_path(Path::new("cv.docx")).is_err());
        assert!(mime_for_path(Path::new("README")).is_err());
    }
}
