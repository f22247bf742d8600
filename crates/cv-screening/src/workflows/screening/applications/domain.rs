use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::workflows::screening::analysis::{AnalysisResult, Category};
use crate::workflows::screening::domain::JobId;
use crate::workflows::screening::token::StatusToken;

/// Identifier wrapper for stored applications. Internal only; the public
/// status page uses [`StatusToken`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

/// Contact details a candidate types into the public form. All optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateProfile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub linkedin_url: String,
}

/// High level status tracked throughout the screening workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Received,
    InReview,
    Shortlisted,
    Rejected,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Received => "received",
            ApplicationStatus::InReview => "in_review",
            ApplicationStatus::Shortlisted => "shortlisted",
            ApplicationStatus::Rejected => "rejected",
        }
    }
}

/// Stored application: document reference, extracted text, latest analysis
/// and recruiter-side state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub id: ApplicationId,
    pub job_id: JobId,
    pub candidate: CandidateProfile,
    pub cv_file: String,
    pub cv_text: String,
    pub analysis: AnalysisResult,
    pub is_shortlisted: bool,
    pub status: ApplicationStatus,
    pub feedback_reason: String,
    pub feedback_suggestions: String,
    pub status_token: Option<StatusToken>,
    pub created_at: DateTime<Utc>,
}

impl ApplicationRecord {
    pub fn status_view(&self) -> CandidateStatusView {
        let (status_label, status_description) = if self.is_shortlisted {
            (
                "Présélectionné",
                "Félicitations, votre candidature a été présélectionnée. Un recruteur vous contactera.",
            )
        } else if self.status == ApplicationStatus::Rejected {
            (
                "Non retenu pour l'instant",
                "Merci pour votre intérêt. Nous partageons ces éléments pour vous aider à progresser.",
            )
        } else {
            (
                "En cours d'analyse",
                "Votre candidature a bien été reçue et est en cours d'évaluation.",
            )
        };

        CandidateStatusView {
            status: self.status.label(),
            status_label,
            status_description,
            score: self.analysis.score,
            category: self.analysis.category,
            feedback_reason: non_empty(&self.feedback_reason),
            feedback_suggestions: non_empty(&self.feedback_suggestions),
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

/// Read-only view served to anonymous token holders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateStatusView {
    pub status: &'static str,
    pub status_label: &'static str,
    pub status_description: &'static str,
    pub score: u8,
    pub category: Category,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback_suggestions: Option<String>,
}
