//! CV screening: document extraction, deterministic analysis and the
//! application workflow built on top of them.

pub mod analysis;
pub mod applications;
pub mod domain;
pub mod extraction;
pub mod token;

pub use analysis::{AnalysisEngine, AnalysisResult, Category, ScoreBreakdown};
pub use applications::{
    ApplicationId, ApplicationRecord, ApplicationRepository, ApplicationStatus, CandidateProfile,
    CandidateStatusView, JobCatalog, RepositoryError, ScreeningService, ScreeningServiceError,
};
pub use domain::{
    DocumentFormat, DocumentUpload, ExtractedDocument, JobId, JobPosting, JobRequirements,
    JobStatus,
};
pub use extraction::{ExtractionLimits, TextExtractor};
pub use token::{StatusToken, TokenError, TokenIssuer, TokenRegistry, TokenRegistryError};
