use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use rayon::prelude::*;
use tracing::{info, warn};

use crate::workflows::screening::analysis::{
    rejection_suggestions, AnalysisEngine, AnalysisResult, DEFAULT_REJECTION_REASON,
};
use crate::workflows::screening::domain::{DocumentUpload, ExtractedDocument, JobId, JobPosting};
use crate::workflows::screening::extraction::{ExtractionLimits, TextExtractor};
use crate::workflows::screening::token::{StatusToken, TokenError, TokenIssuer};

use super::domain::{
    ApplicationId, ApplicationRecord, ApplicationStatus, CandidateProfile, CandidateStatusView,
};
use super::repository::{ApplicationRepository, JobCatalog, RepositoryError};

/// Service composing extraction, the analysis engine, token issuance and the
/// storage collaborators.
///
/// The synchronous entry points hold extraction to the size bound only. The
/// `*_with_deadline` variants also apply the extraction timeout and need a
/// Tokio runtime.
pub struct ScreeningService<R, J> {
    repository: Arc<R>,
    jobs: Arc<J>,
    extractor: TextExtractor,
    engine: Arc<AnalysisEngine>,
    issuer: TokenIssuer,
}

static APPLICATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_application_id() -> ApplicationId {
    let id = APPLICATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ApplicationId(format!("app-{id:06}"))
}

impl<R, J> ScreeningService<R, J>
where
    R: ApplicationRepository + 'static,
    J: JobCatalog + 'static,
{
    pub fn new(repository: Arc<R>, jobs: Arc<J>) -> Self {
        Self {
            repository,
            jobs,
            extractor: TextExtractor::default(),
            engine: Arc::new(AnalysisEngine::default()),
            issuer: TokenIssuer::default(),
        }
    }

    pub fn with_extraction_limits(mut self, limits: ExtractionLimits) -> Self {
        self.extractor = TextExtractor::new(limits);
        self
    }

    pub fn with_token_issuer(mut self, issuer: TokenIssuer) -> Self {
        self.issuer = issuer;
        self
    }

    pub fn with_engine(mut self, engine: AnalysisEngine) -> Self {
        self.engine = Arc::new(engine);
        self
    }

    /// Recruiter bulk upload. Documents are extracted in parallel under the
    /// size bound only, analyzed in parallel, then stored one by one in
    /// upload order. Async callers should prefer
    /// [`Self::upload_batch_with_deadline`].
    pub fn upload_batch(
        &self,
        job_id: &JobId,
        uploads: Vec<DocumentUpload>,
    ) -> Result<Vec<ApplicationRecord>, ScreeningServiceError> {
        let job = self.job(job_id)?;
        let extractor = self.extractor;

        let documents: Vec<ExtractedDocument> = uploads
            .par_iter()
            .map(|upload| extractor.extract(&upload.bytes, upload.format()))
            .collect();
        let file_names = uploads.into_iter().map(|upload| upload.file_name).collect();

        self.store_batch(&job, file_names, documents)
    }

    /// [`Self::upload_batch`] with every extraction also held to the time
    /// bound.
    pub async fn upload_batch_with_deadline(
        &self,
        job_id: &JobId,
        uploads: Vec<DocumentUpload>,
    ) -> Result<Vec<ApplicationRecord>, ScreeningServiceError> {
        let job = self.job(job_id)?;

        let mut file_names = Vec::with_capacity(uploads.len());
        let mut documents = Vec::with_capacity(uploads.len());
        for upload in uploads {
            let format = upload.format();
            documents.push(self.extractor.extract_with_deadline(upload.bytes, format).await);
            file_names.push(upload.file_name);
        }

        self.store_batch(&job, file_names, documents)
    }

    /// Public application: analysis, status token and the one-time
    /// candidate message. Extraction is held to the size bound only; see
    /// [`Self::submit_candidate_with_deadline`].
    pub fn submit_candidate(
        &self,
        job_id: &JobId,
        candidate: CandidateProfile,
        upload: DocumentUpload,
    ) -> Result<ApplicationRecord, ScreeningServiceError> {
        let job = self.job(job_id)?;
        let document = self.extractor.extract(&upload.bytes, upload.format());
        self.store_submission(&job, candidate, upload.file_name, document)
    }

    /// [`Self::submit_candidate`] with extraction also held to the time
    /// bound.
    pub async fn submit_candidate_with_deadline(
        &self,
        job_id: &JobId,
        candidate: CandidateProfile,
        upload: DocumentUpload,
    ) -> Result<ApplicationRecord, ScreeningServiceError> {
        let job = self.job(job_id)?;
        let format = upload.format();
        let document = self.extractor.extract_with_deadline(upload.bytes, format).await;
        self.store_submission(&job, candidate, upload.file_name, document)
    }

    /// Recomputes the analysis from stored text against the job's current
    /// requirements. The candidate message is left untouched.
    pub fn reanalyze(
        &self,
        application_id: &ApplicationId,
    ) -> Result<AnalysisResult, ScreeningServiceError> {
        let mut record = self.get(application_id)?;
        let job = self.job(&record.job_id)?;

        let analysis = self.engine.analyze(&record.cv_text, &job.requirements);
        record.analysis = analysis.clone();
        self.repository.update(record)?;

        info!(application_id = %application_id.0, score = analysis.score, "application reanalyzed");
        Ok(analysis)
    }

    /// Replaces the stored document, then re-extracts and reanalyzes it.
    pub fn reprocess_document(
        &self,
        application_id: &ApplicationId,
        upload: DocumentUpload,
    ) -> Result<AnalysisResult, ScreeningServiceError> {
        let record = self.get(application_id)?;
        let job = self.job(&record.job_id)?;
        let document = self.extractor.extract(&upload.bytes, upload.format());
        self.store_reprocessed(record, &job, upload.file_name, document)
    }

    pub async fn reprocess_document_with_deadline(
        &self,
        application_id: &ApplicationId,
        upload: DocumentUpload,
    ) -> Result<AnalysisResult, ScreeningServiceError> {
        let record = self.get(application_id)?;
        let job = self.job(&record.job_id)?;
        let format = upload.format();
        let document = self.extractor.extract_with_deadline(upload.bytes, format).await;
        self.store_reprocessed(record, &job, upload.file_name, document)
    }

    pub fn toggle_shortlist(
        &self,
        application_id: &ApplicationId,
    ) -> Result<ApplicationRecord, ScreeningServiceError> {
        let mut record = self.get(application_id)?;
        record.is_shortlisted = !record.is_shortlisted;
        record.status = if record.is_shortlisted {
            ApplicationStatus::Shortlisted
        } else {
            ApplicationStatus::InReview
        };
        self.repository.update(record.clone())?;
        Ok(record)
    }

    /// Marks the application rejected. Suggestions are composed only when
    /// none exist yet, so a candidate message is never overwritten.
    pub fn reject(
        &self,
        application_id: &ApplicationId,
        reason: Option<String>,
    ) -> Result<ApplicationRecord, ScreeningServiceError> {
        let mut record = self.get(application_id)?;
        record.is_shortlisted = false;
        record.status = ApplicationStatus::Rejected;
        record.feedback_reason = reason.unwrap_or_else(|| DEFAULT_REJECTION_REASON.to_string());
        if record.feedback_suggestions.is_empty() {
            record.feedback_suggestions = rejection_suggestions(&record.analysis.missing_skills);
        }
        self.repository.update(record.clone())?;

        info!(application_id = %application_id.0, "application rejected");
        Ok(record)
    }

    /// Anonymous, read-only lookup by status token.
    pub fn status_by_token(&self, raw: &str) -> Result<CandidateStatusView, ScreeningServiceError> {
        let token = StatusToken::parse(raw).ok_or(ScreeningServiceError::UnknownToken)?;
        let record = self
            .repository
            .find_by_token(&token)?
            .ok_or(ScreeningServiceError::UnknownToken)?;
        Ok(record.status_view())
    }

    pub fn get(
        &self,
        application_id: &ApplicationId,
    ) -> Result<ApplicationRecord, ScreeningServiceError> {
        let record = self
            .repository
            .fetch(application_id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    fn job(&self, job_id: &JobId) -> Result<JobPosting, ScreeningServiceError> {
        self.jobs
            .fetch(job_id)?
            .ok_or_else(|| ScreeningServiceError::JobNotFound(job_id.0.clone()))
    }

    fn store_batch(
        &self,
        job: &JobPosting,
        file_names: Vec<String>,
        documents: Vec<ExtractedDocument>,
    ) -> Result<Vec<ApplicationRecord>, ScreeningServiceError> {
        let texts: Vec<&str> = documents.iter().map(|document| document.text.as_str()).collect();
        let analyses = self.engine.analyze_batch(&texts, &job.requirements);

        let mut stored = Vec::with_capacity(file_names.len());
        for ((cv_file, document), analysis) in file_names.into_iter().zip(documents).zip(analyses) {
            let record = self.new_record(
                &job.id,
                CandidateProfile::default(),
                cv_file,
                document.text,
                analysis,
                ApplicationStatus::Received,
            );
            stored.push(self.repository.insert(record)?);
        }

        info!(job_id = %job.id.0, count = stored.len(), "batch analyzed");
        Ok(stored)
    }

    fn store_submission(
        &self,
        job: &JobPosting,
        candidate: CandidateProfile,
        cv_file: String,
        document: ExtractedDocument,
    ) -> Result<ApplicationRecord, ScreeningServiceError> {
        let analysis = self.engine.analyze(&document.text, &job.requirements);
        let message = analysis.candidate_message(&job.requirements);

        let mut record = self.new_record(
            &job.id,
            candidate,
            cv_file,
            document.text,
            analysis,
            ApplicationStatus::InReview,
        );
        record.feedback_suggestions = message;

        let stored = self.insert_with_token(record)?;
        info!(
            application_id = %stored.id.0,
            job_id = %job.id.0,
            score = stored.analysis.score,
            "candidate application received"
        );
        Ok(stored)
    }

    fn store_reprocessed(
        &self,
        mut record: ApplicationRecord,
        job: &JobPosting,
        cv_file: String,
        document: ExtractedDocument,
    ) -> Result<AnalysisResult, ScreeningServiceError> {
        let analysis = self.engine.analyze(&document.text, &job.requirements);
        record.cv_file = cv_file;
        record.cv_text = document.text;
        record.analysis = analysis.clone();
        let application_id = record.id.clone();
        self.repository.update(record)?;

        info!(application_id = %application_id.0, score = analysis.score, "document reprocessed");
        Ok(analysis)
    }

    fn new_record(
        &self,
        job_id: &JobId,
        candidate: CandidateProfile,
        cv_file: String,
        cv_text: String,
        analysis: AnalysisResult,
        status: ApplicationStatus,
    ) -> ApplicationRecord {
        ApplicationRecord {
            id: next_application_id(),
            job_id: job_id.clone(),
            candidate,
            cv_file,
            cv_text,
            analysis,
            is_shortlisted: false,
            status,
            feedback_reason: String::new(),
            feedback_suggestions: String::new(),
            status_token: None,
            created_at: Utc::now(),
        }
    }

    /// Draws a token and inserts. Registry collisions and uniqueness
    /// conflicts reported by storage share one budget of draws.
    fn insert_with_token(
        &self,
        mut record: ApplicationRecord,
    ) -> Result<ApplicationRecord, ScreeningServiceError> {
        let budget = self.issuer.max_attempts();
        for attempt in 1..=budget {
            let Some(token) = self.issuer.draw(self.repository.as_ref())? else {
                continue;
            };
            record.status_token = Some(token);
            match self.repository.insert(record.clone()) {
                Err(RepositoryError::TokenConflict) => {
                    warn!(application_id = %record.id.0, attempt, "status token taken at insert");
                }
                result => return Ok(result?),
            }
        }

        Err(TokenError::Exhausted { attempts: budget }.into())
    }
}

/// Error raised by the screening service.
#[derive(Debug, thiserror::Error)]
pub enum ScreeningServiceError {
    #[error("job {0} not found")]
    JobNotFound(String),
    #[error("unknown status token")]
    UnknownToken,
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
