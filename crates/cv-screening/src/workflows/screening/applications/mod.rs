//! Application workflow around the analysis engine: recruiter bulk uploads,
//! public submissions with status tokens, re-analysis, shortlisting and
//! rejection.

pub mod domain;
pub mod repository;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    ApplicationId, ApplicationRecord, ApplicationStatus, CandidateProfile, CandidateStatusView,
};
pub use repository::{ApplicationRepository, JobCatalog, RepositoryError};
pub use service::{ScreeningService, ScreeningServiceError};
