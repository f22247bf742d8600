//! Format-dispatched text extraction.
//!
//! Every failure mode (corrupt file, unsupported feature, oversized input,
//! parser panic, deadline) degrades to an empty document so the surrounding
//! workflow can still score the application at the floor.

mod docx;
mod pdf;

use std::fs::File;
use std::io::Read;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, warn};

use super::domain::{DocumentFormat, ExtractedDocument};

#[cfg(test)]
pub(crate) use docx::tests::docx_bytes;

/// Size and time bounds enforced at the extraction boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionLimits {
    pub max_bytes: usize,
    pub timeout: Duration,
}

impl Default for ExtractionLimits {
    fn default() -> Self {
        Self {
            max_bytes: 10 * 1024 * 1024,
            timeout: Duration::from_secs(15),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum ExtractionError {
    #[error("document is {size} bytes, limit is {limit}")]
    TooLarge { size: u64, limit: usize },
    #[error("pdf: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("docx archive: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("docx xml: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("parser panicked")]
    Panicked,
}

/// Stateless extractor; cheap to clone and share across threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextExtractor {
    limits: ExtractionLimits,
}

impl TextExtractor {
    pub fn new(limits: ExtractionLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> ExtractionLimits {
        self.limits
    }

    /// Decodes `bytes` according to `format`. Never fails: any error yields
    /// an empty text.
    pub fn extract(&self, bytes: &[u8], format: DocumentFormat) -> ExtractedDocument {
        match self.try_extract(bytes, format) {
            Ok(text) => {
                debug!(format = format.label(), chars = text.len(), "document extracted");
                ExtractedDocument { text, format }
            }
            Err(error) => {
                warn!(format = format.label(), %error, "text extraction failed; using empty text");
                ExtractedDocument::empty(format)
            }
        }
    }

    /// Reads at most the size bound from `path` and extracts it. A `format`
    /// of `None` is resolved from the file name.
    pub fn extract_path(&self, path: &Path, format: Option<DocumentFormat>) -> ExtractedDocument {
        let format = format.unwrap_or_else(|| {
            DocumentFormat::from_file_name(&path.to_string_lossy())
        });

        match self.read_bounded(path) {
            Ok(bytes) => self.extract(&bytes, format),
            Err(error) => {
                warn!(path = %path.display(), %error, "document unreadable; using empty text");
                ExtractedDocument::empty(format)
            }
        }
    }

    /// Runs extraction on the blocking pool under the configured deadline.
    ///
    /// On expiry the caller gets an empty document immediately; the parser
    /// thread itself cannot be interrupted and finishes in the background.
    pub async fn extract_with_deadline(
        &self,
        bytes: Vec<u8>,
        format: DocumentFormat,
    ) -> ExtractedDocument {
        let extractor = *self;
        self.with_deadline(format, move || extractor.extract(&bytes, format))
            .await
    }

    /// [`Self::extract_path`] under the configured deadline.
    pub async fn extract_path_with_deadline(
        &self,
        path: PathBuf,
        format: Option<DocumentFormat>,
    ) -> ExtractedDocument {
        let extractor = *self;
        let resolved =
            format.unwrap_or_else(|| DocumentFormat::from_file_name(&path.to_string_lossy()));
        self.with_deadline(resolved, move || {
            extractor.extract_path(&path, Some(resolved))
        })
        .await
    }

    async fn with_deadline<F>(&self, format: DocumentFormat, job: F) -> ExtractedDocument
    where
        F: FnOnce() -> ExtractedDocument + Send + 'static,
    {
        let task = tokio::task::spawn_blocking(job);

        match tokio::time::timeout(self.limits.timeout, task).await {
            Ok(Ok(document)) => document,
            Ok(Err(error)) => {
                warn!(format = format.label(), %error, "extraction task failed; using empty text");
                ExtractedDocument::empty(format)
            }
            Err(_) => {
                warn!(
                    format = format.label(),
                    timeout_ms = self.limits.timeout.as_millis() as u64,
                    "extraction deadline exceeded; using empty text"
                );
                ExtractedDocument::empty(format)
            }
        }
    }

    pub(crate) fn try_extract(
        &self,
        bytes: &[u8],
        format: DocumentFormat,
    ) -> Result<String, ExtractionError> {
        if bytes.len() > self.limits.max_bytes {
            return Err(ExtractionError::TooLarge {
                size: bytes.len() as u64,
                limit: self.limits.max_bytes,
            });
        }

        let max_bytes = self.limits.max_bytes;
        panic::catch_unwind(AssertUnwindSafe(|| match format {
            DocumentFormat::Pdf => pdf::extract(bytes),
            DocumentFormat::Docx => docx::extract(bytes, max_bytes),
            DocumentFormat::Other => Ok(decode_utf8_lossy(bytes)),
        }))
        .map_err(|_| ExtractionError::Panicked)?
    }

    fn read_bounded(&self, path: &Path) -> Result<Vec<u8>, ExtractionError> {
        let limit = self.limits.max_bytes;
        let size = std::fs::metadata(path)?.len();
        if size > limit as u64 {
            return Err(ExtractionError::TooLarge { size, limit });
        }

        // The file may grow between the metadata call and the read.
        let mut bytes = Vec::with_capacity(size as usize);
        File::open(path)?
            .take(limit as u64 + 1)
            .read_to_end(&mut bytes)?;
        if bytes.len() > limit {
            return Err(ExtractionError::TooLarge {
                size: bytes.len() as u64,
                limit,
            });
        }
        Ok(bytes)
    }
}

/// UTF-8 decode that drops undecodable sequences instead of replacing them.
fn decode_utf8_lossy(bytes: &[u8]) -> String {
    let mut text = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        text.push_str(chunk.valid());
    }
    text
}
