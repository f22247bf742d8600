use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use cv_screening::error::AppError;
use cv_screening::workflows::screening::{
    ApplicationId, ApplicationRecord, ApplicationRepository, DocumentFormat, JobCatalog, JobId,
    JobPosting, JobRequirements, RepositoryError, StatusToken, TokenRegistry, TokenRegistryError,
};

#[derive(Default, Clone)]
pub(crate) struct InMemoryJobCatalog {
    postings: Arc<Mutex<HashMap<JobId, JobPosting>>>,
}

impl InMemoryJobCatalog {
    pub(crate) fn publish(&self, posting: JobPosting) {
        let mut guard = self.postings.lock().expect("catalog mutex poisoned");
        guard.insert(posting.id.clone(), posting);
    }
}

impl JobCatalog for InMemoryJobCatalog {
    fn fetch(&self, id: &JobId) -> Result<Option<JobPosting>, RepositoryError> {
        let guard = self.postings.lock().expect("catalog mutex poisoned");
        Ok(guard.get(id).cloned())
    }
}

/// Keeps records keyed by id with a secondary token index, so token
/// uniqueness is checked under the same lock as the write.
#[derive(Default, Clone)]
pub(crate) struct InMemoryApplicationRepository {
    inner: Arc<Mutex<Records>>,
}

#[derive(Default)]
struct Records {
    by_id: HashMap<ApplicationId, ApplicationRecord>,
    by_token: HashMap<StatusToken, ApplicationId>,
}

impl TokenRegistry for InMemoryApplicationRepository {
    fn token_exists(&self, token: &StatusToken) -> Result<bool, TokenRegistryError> {
        let guard = self.inner.lock().expect("repository mutex poisoned");
        Ok(guard.by_token.contains_key(token))
    }
}

impl ApplicationRepository for InMemoryApplicationRepository {
    fn insert(&self, record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError> {
        let mut guard = self.inner.lock().expect("repository mutex poisoned");
        if guard.by_id.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        if let Some(token) = &record.status_token {
            if guard.by_token.contains_key(token) {
                return Err(RepositoryError::TokenConflict);
            }
            guard.by_token.insert(token.clone(), record.id.clone());
        }
        guard.by_id.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn update(&self, record: ApplicationRecord) -> Result<(), RepositoryError> {
        let mut guard = self.inner.lock().expect("repository mutex poisoned");
        if guard.by_id.contains_key(&record.id) {
            guard.by_id.insert(record.id.clone(), record);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError> {
        let guard = self.inner.lock().expect("repository mutex poisoned");
        Ok(guard.by_id.get(id).cloned())
    }

    fn find_by_token(
        &self,
        token: &StatusToken,
    ) -> Result<Option<ApplicationRecord>, RepositoryError> {
        let guard = self.inner.lock().expect("repository mutex poisoned");
        Ok(guard
            .by_token
            .get(token)
            .and_then(|id| guard.by_id.get(id))
            .cloned())
    }
}

pub(crate) fn parse_format(raw: &str) -> Result<DocumentFormat, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "pdf" => Ok(DocumentFormat::Pdf),
        "docx" => Ok(DocumentFormat::Docx),
        "text" | "txt" => Ok(DocumentFormat::Other),
        other => Err(format!("unsupported format '{other}' (expected pdf, docx or text)")),
    }
}

pub(crate) fn load_requirements(path: &Path) -> Result<JobRequirements, AppError> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}
