use crate::workflows::screening::domain::{JobId, JobPosting};
use crate::workflows::screening::token::{StatusToken, TokenRegistry};

use super::domain::{ApplicationId, ApplicationRecord};

/// Source of job postings (owned by the job store).
pub trait JobCatalog: Send + Sync {
    fn fetch(&self, id: &JobId) -> Result<Option<JobPosting>, RepositoryError>;
}

/// Storage abstraction so the service module can be exercised in isolation.
///
/// Implementations must enforce status token uniqueness on `insert` and
/// report a duplicate as [`RepositoryError::TokenConflict`]; the service
/// retries with a fresh token. A client-side existence check alone races
/// under concurrent submissions.
pub trait ApplicationRepository: TokenRegistry {
    fn insert(&self, record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError>;
    fn update(&self, record: ApplicationRecord) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError>;
    fn find_by_token(&self, token: &StatusToken)
        -> Result<Option<ApplicationRecord>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("status token already assigned")]
    TokenConflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
