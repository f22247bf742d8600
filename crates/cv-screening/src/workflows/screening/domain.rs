use std::path::Path;

use serde::{Deserialize, Serialize};

/// Identifier wrapper for job postings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JobId(pub String);

/// Criteria a recruiter declares for a posting. Read-only to the engine.
///
/// Empty skill or education lists mean "no requirement", never an automatic
/// failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRequirements {
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub min_experience_years: u32,
    #[serde(default)]
    pub education_levels: Vec<String>,
    #[serde(default)]
    pub location: String,
}

impl JobRequirements {
    /// Skills trimmed, lowercased, de-duplicated, first occurrence wins.
    pub fn normalized_skills(&self) -> Vec<String> {
        let mut skills: Vec<String> = Vec::with_capacity(self.skills.len());
        for skill in normalize_all(&self.skills) {
            if !skills.contains(&skill) {
                skills.push(skill);
            }
        }
        skills
    }

    pub fn normalized_education_levels(&self) -> Vec<String> {
        normalize_all(&self.education_levels)
    }

    /// `None` when no location is declared.
    pub fn normalized_location(&self) -> Option<String> {
        let location = normalize(&self.location);
        (!location.is_empty()).then_some(location)
    }
}

fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

fn normalize_all(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|value| normalize(value))
        .filter(|value| !value.is_empty())
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Open,
    Closed,
}

/// A posting as supplied by the job store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobPosting {
    pub id: JobId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub requirements: JobRequirements,
    pub status: JobStatus,
}

/// Declared document format used to pick a text decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentFormat {
    Pdf,
    Docx,
    /// Anything else, decoded as best-effort UTF-8.
    Other,
}

impl DocumentFormat {
    /// Resolves a format from a file name or bare extension, case-insensitively.
    pub fn from_file_name(name: &str) -> Self {
        let extension = Path::new(name)
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or(name)
            .trim_start_matches('.');

        match extension.to_ascii_lowercase().as_str() {
            "pdf" => Self::Pdf,
            "docx" => Self::Docx,
            _ => Self::Other,
        }
    }

    pub fn from_mime(mime: &str) -> Self {
        match mime.trim().to_ascii_lowercase().as_str() {
            "application/pdf" => Self::Pdf,
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => {
                Self::Docx
            }
            _ => Self::Other,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Docx => "docx",
            DocumentFormat::Other => "text",
        }
    }
}

/// Text pulled out of a document plus the format that produced it.
///
/// `text` is either the full decoded text or empty; extraction never hands
/// back a partial buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedDocument {
    pub text: String,
    pub format: DocumentFormat,
}

impl ExtractedDocument {
    pub fn empty(format: DocumentFormat) -> Self {
        Self {
            text: String::new(),
            format,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Raw upload handed over by the ingestion layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl DocumentUpload {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }

    pub fn format(&self) -> DocumentFormat {
        DocumentFormat::from_file_name(&self.file_name)
    }
}
