use serde::{Deserialize, Deserializer, Serialize};

/// Upload media types the service knows how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Pdf,
    PlainText,
}

impl MediaType {
    /// Maps a declared MIME type onto a supported media type.
    /// Parameters such as `; charset=utf-8` are ignored.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or_default().trim();
        if essence.eq_ignore_ascii_case("application/pdf") {
            Some(MediaType::Pdf)
        } else if essence.eq_ignore_ascii_case("text/plain") {
            Some(MediaType::PlainText)
        } else {
            None
        }
    }

    pub fn as_mime(&self) -> &'static str {
        match self {
            MediaType::Pdf => "application/pdf",
            MediaType::PlainText => "text/plain",
        }
    }
}

fn not_specified() -> String {
    "Not specified".to_string()
}

// Model replies sometimes carry `null` where a value is unknown.

fn text_or_not_specified<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(not_specified))
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accepts integers, floats (rounded) and `null`; negatives clamp to 0.
fn whole_years<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let years = Option::<f64>::deserialize(deserializer)?.unwrap_or_default();
    if !years.is_finite() || years <= 0.0 {
        return Ok(0);
    }
    Ok(years.round().min(f64::from(u32::MAX)) as u32)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Education {
    #[serde(default = "not_specified", deserialize_with = "text_or_not_specified")]
    pub degree: String,
    #[serde(default = "not_specified", deserialize_with = "text_or_not_specified")]
    pub institution: String,
    #[serde(default, deserialize_with = "whole_years")]
    pub graduation_year: u32,
}

/// Structured summary of a resume as produced by the summary generator.
///
/// `id` is the job identifier; the model never supplies it, the generator
/// attaches it after parsing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeSummary {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default = "not_specified", deserialize_with = "text_or_not_specified")]
    pub name: String,
    #[serde(default = "not_specified", deserialize_with = "text_or_not_specified")]
    pub current_role: String,
    #[serde(default, deserialize_with = "whole_years")]
    pub experience_years: u32,
    /// Ordered by relevance as the model returned them.
    #[serde(default, deserialize_with = "null_as_default")]
    pub skills: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub education: Vec<Education>,
    #[serde(default = "not_specified", deserialize_with = "text_or_not_specified")]
    pub summary: String,
}

impl ResumeSummary {
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }
}
