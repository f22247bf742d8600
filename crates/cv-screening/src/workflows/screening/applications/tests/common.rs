use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use crate::workflows::screening::applications::domain::{ApplicationId, ApplicationRecord};
use crate::workflows::screening::applications::repository::{
    ApplicationRepository, JobCatalog, RepositoryError,
};
use crate::workflows::screening::applications::ScreeningService;
use crate::workflows::screening::domain::{
    DocumentUpload, JobId, JobPosting, JobRequirements, JobStatus,
};
use crate::workflows::screening::token::{StatusToken, TokenRegistry, TokenRegistryError};

pub(super) const REFERENCE_CV: &str =
    "J'ai 5 ans d'expérience en python, master en informatique, basé à paris";

pub(super) fn job_id() -> JobId {
    JobId("job-data-engineer".to_string())
}

pub(super) fn posting(status: JobStatus) -> JobPosting {
    JobPosting {
        id: job_id(),
        title: "Data Engineer".to_string(),
        description: "Pipelines et entrepôt de données".to_string(),
        requirements: JobRequirements {
            skills: vec!["Python".to_string(), "SQL".to_string()],
            min_experience_years: 3,
            education_levels: vec!["master".to_string()],
            location: "Paris".to_string(),
        },
        status,
    }
}

pub(super) fn text_upload(name: &str, text: &str) -> DocumentUpload {
    DocumentUpload::new(name, text.as_bytes().to_vec())
}

pub(super) fn build_service() -> (
    ScreeningService<MemoryRepository, MemoryJobs>,
    Arc<MemoryRepository>,
    Arc<MemoryJobs>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let jobs = Arc::new(MemoryJobs::with(posting(JobStatus::Open)));
    let service = ScreeningService::new(repository.clone(), jobs.clone());
    (service, repository, jobs)
}

#[derive(Default, Clone)]
pub(super) struct MemoryJobs {
    postings: Arc<Mutex<HashMap<JobId, JobPosting>>>,
}

impl MemoryJobs {
    pub(super) fn with(posting: JobPosting) -> Self {
        let jobs = Self::default();
        jobs.put(posting);
        jobs
    }

    pub(super) fn put(&self, posting: JobPosting) {
        self.postings
            .lock()
            .expect("jobs mutex poisoned")
            .insert(posting.id.clone(), posting);
    }
}

impl JobCatalog for MemoryJobs {
    fn fetch(&self, id: &JobId) -> Result<Option<JobPosting>, RepositoryError> {
        Ok(self.postings.lock().expect("jobs mutex poisoned").get(id).cloned())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) records: Arc<Mutex<HashMap<ApplicationId, ApplicationRecord>>>,
}

impl MemoryRepository {
    pub(super) fn len(&self) -> usize {
        self.records.lock().expect("repository mutex poisoned").len()
    }
}

impl TokenRegistry for MemoryRepository {
    fn token_exists(&self, token: &StatusToken) -> Result<bool, TokenRegistryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .any(|record| record.status_token.as_ref() == Some(token)))
    }
}

impl ApplicationRepository for MemoryRepository {
    fn insert(&self, record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        if let Some(token) = &record.status_token {
            if guard
                .values()
                .any(|stored| stored.status_token.as_ref() == Some(token))
            {
                return Err(RepositoryError::TokenConflict);
            }
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn update(&self, record: ApplicationRecord) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        guard.insert(record.id.clone(), record);
        Ok(())
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn find_by_token(
        &self,
        token: &StatusToken,
    ) -> Result<Option<ApplicationRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .find(|record| record.status_token.as_ref() == Some(token))
            .cloned())
    }
}

/// Reports a token conflict on the first `conflicts` inserts, as a store
/// would when another request claimed the same token in between the
/// existence check and the write.
pub(super) struct RacingRepository {
    pub(super) inner: MemoryRepository,
    conflicts_left: AtomicU32,
    pub(super) inserts: AtomicU32,
}

impl RacingRepository {
    pub(super) fn new(conflicts: u32) -> Self {
        Self {
            inner: MemoryRepository::default(),
            conflicts_left: AtomicU32::new(conflicts),
            inserts: AtomicU32::new(0),
        }
    }
}

impl TokenRegistry for RacingRepository {
    fn token_exists(&self, token: &StatusToken) -> Result<bool, TokenRegistryError> {
        self.inner.token_exists(token)
    }
}

impl ApplicationRepository for RacingRepository {
    fn insert(&self, record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        let left = self.conflicts_left.load(Ordering::SeqCst);
        if left > 0 {
            self.conflicts_left.store(left - 1, Ordering::SeqCst);
            return Err(RepositoryError::TokenConflict);
        }
        self.inner.insert(record)
    }

    fn update(&self, record: ApplicationRecord) -> Result<(), RepositoryError> {
        self.inner.update(record)
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError> {
        self.inner.fetch(id)
    }

    fn find_by_token(
        &self,
        token: &StatusToken,
    ) -> Result<Option<ApplicationRecord>, RepositoryError> {
        self.inner.find_by_token(token)
    }
}

/// Registry that reports every drawn token as taken.
#[derive(Default)]
pub(super) struct CrowdedRepository {
    pub(super) inner: MemoryRepository,
    pub(super) checks: AtomicU32,
}

impl TokenRegistry for CrowdedRepository {
    fn token_exists(&self, _token: &StatusToken) -> Result<bool, TokenRegistryError> {
        self.checks.fetch_add(1, Ordering::SeqCst);
        Ok(true)
    }
}

impl ApplicationRepository for CrowdedRepository {
    fn insert(&self, record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError> {
        self.inner.insert(record)
    }

    fn update(&self, record: ApplicationRecord) -> Result<(), RepositoryError> {
        self.inner.update(record)
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError> {
        self.inner.fetch(id)
    }

    fn find_by_token(
        &self,
        token: &StatusToken,
    ) -> Result<Option<ApplicationRecord>, RepositoryError> {
        self.inner.find_by_token(token)
    }
}

pub(super) struct UnavailableRepository;

impl TokenRegistry for UnavailableRepository {
    fn token_exists(&self, _token: &StatusToken) -> Result<bool, TokenRegistryError> {
        Err(TokenRegistryError("database offline".to_string()))
    }
}

impl ApplicationRepository for UnavailableRepository {
    fn insert(&self, _record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _record: ApplicationRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn find_by_token(
        &self,
        _token: &StatusToken,
    ) -> Result<Option<ApplicationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}
