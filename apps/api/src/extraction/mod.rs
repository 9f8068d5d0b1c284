//! Text extraction from uploaded resume files.

use bytes::Bytes;
use thiserror::Error;
use tracing::debug;

use crate::models::resume::MediaType;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Failed to parse PDF file: {0}")]
    Pdf(String),

    #[error("PDF extraction task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Returns the plain text of an uploaded file, chosen by its declared media type.
///
/// PDF parsing is CPU-bound and runs on the blocking pool. A panic inside the
/// PDF parser surfaces as `ExtractionError::Task`.
pub async fn extract_text(bytes: Bytes, media_type: MediaType) -> Result<String, ExtractionError> {
    let text = match media_type {
        MediaType::PlainText => decode_plain_text(&bytes),
        MediaType::Pdf => tokio::task::spawn_blocking(move || {
            pdf_extract::extract_text_from_mem(&bytes)
        })
        .await?
        .map_err(|e| ExtractionError::Pdf(e.to_string()))?,
    };

    debug!(
        media_type = media_type.as_mime(),
        chars = text.len(),
        "Extracted resume text"
    );
    Ok(text)
}

/// Decodes bytes as UTF-8, replacing invalid sequences.
pub fn decode_plain_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// One page, one line of Helvetica text; xref offsets are exact.
    const SINGLE_PAGE_PDF: &str = concat!(
        "%PDF-1.4\n",
        "1 0 obj\n",
        "<< /Type /Catalog /Pages 2 0 R >>\n",
        "endobj\n",
        "2 0 obj\n",
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>\n",
        "endobj\n",
        "3 0 obj\n",
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Resources << /Font << /F1 5 0 R >> >> /Contents 4 0 R >>\n",
        "endobj\n",
        "4 0 obj\n",
        "<< /Length 46 >>\n",
        "stream\n",
        "BT /F1 12 Tf 72 720 Td (Jane Doe Resume) Tj ET\n",
        "endstream\n",
        "endobj\n",
        "5 0 obj\n",
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>\n",
        "endobj\n",
        "xref\n",
        "0 6\n",
        "0000000000 65535 f \n",
        "0000000009 00000 n \n",
        "0000000058 00000 n \n",
        "0000000115 00000 n \n",
        "0000000241 00000 n \n",
        "0000000337 00000 n \n",
        "trailer\n",
        "<< /Size 6 /Root 1 0 R >>\n",
        "startxref\n",
        "407\n",
        "%%EOF\n",
    );

    #[tokio::test]
    async fn test_plain_text_is_decoded_exactly() {
        let content = "Jane Doe\nSoftware Engineer — 5 years\n";
        let text = extract_text(Bytes::from(content), MediaType::PlainText)
            .await
            .unwrap();
        assert_eq!(text, content);
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let text = decode_plain_text(&[b'J', b'a', 0xff, b'n', b'e']);
        assert_eq!(text, "Ja\u{fffd}ne");
    }

    #[tokio::test]
    async fn test_malformed_pdf_is_an_error() {
        let result = extract_text(Bytes::from_static(b"definitely not a pdf"), MediaType::Pdf).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_valid_pdf_yields_its_text() {
        let text = extract_text(Bytes::from_static(SINGLE_PAGE_PDF.as_bytes()), MediaType::Pdf)
            .await
            .unwrap();
        let words: String = text.split_whitespace().collect();
        assert!(words.contains("JaneDoeResume"), "unexpected text: {text:?}");
    }
}
