pub mod experience;
pub mod feedback;
pub mod matching;
pub mod scoring;

pub use experience::{ExperienceEstimator, YearMentionEstimator, MAX_EXPERIENCE_YEARS};
pub use feedback::{
    candidate_message, rejection_suggestions, Feedback, CANDIDATE_PREAMBLE,
    DEFAULT_REJECTION_REASON,
};
pub use matching::{CriterionMatch, SkillMatch};
pub use scoring::{Category, ScoreBreakdown};

use std::sync::Arc;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::domain::JobRequirements;
use feedback::FeedbackInput;

/// Assessment of one document against one job. Never mutated once built;
/// re-analysis produces a replacement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub score: u8,
    pub category: Category,
    pub exp_years: u8,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub strengths: Vec<String>,
    pub gaps: Vec<String>,
    pub breakdown: ScoreBreakdown,
}

impl AnalysisResult {
    /// Candidate-facing message built from this result (see
    /// [`feedback::candidate_message`]).
    pub fn candidate_message(&self, job: &JobRequirements) -> String {
        candidate_message(
            &self.matched_skills,
            &self.missing_skills,
            self.exp_years,
            job.min_experience_years,
        )
    }
}

/// Pure scoring pipeline: estimate, match, score, categorize, compose.
///
/// Holds no mutable state, so one engine can serve any number of threads.
#[derive(Clone)]
pub struct AnalysisEngine {
    estimator: Arc<dyn ExperienceEstimator>,
}

impl Default for AnalysisEngine {
    fn default() -> Self {
        Self::new(Arc::new(YearMentionEstimator::default()))
    }
}

impl std::fmt::Debug for AnalysisEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisEngine").finish_non_exhaustive()
    }
}

impl AnalysisEngine {
    pub fn new(estimator: Arc<dyn ExperienceEstimator>) -> Self {
        Self { estimator }
    }

    pub fn analyze(&self, text: &str, job: &JobRequirements) -> AnalysisResult {
        let normalized = text.to_lowercase();

        let skills = matching::match_skills(&normalized, &job.normalized_skills());
        let exp_years = self
            .estimator
            .estimate_years(&normalized)
            .min(MAX_EXPERIENCE_YEARS);
        let education = matching::match_education(&normalized, &job.normalized_education_levels());
        let location =
            matching::match_location(&normalized, job.normalized_location().as_deref());

        let breakdown = ScoreBreakdown::compute(
            job.min_experience_years,
            exp_years,
            &skills,
            education,
            location,
        );
        let score = breakdown.score();

        let Feedback { strengths, gaps } = feedback::compose(FeedbackInput {
            skills: &skills,
            exp_years,
            min_experience_years: job.min_experience_years,
            education,
            location,
        });

        AnalysisResult {
            score,
            category: Category::from_score(score),
            exp_years,
            matched_skills: skills.matched,
            missing_skills: skills.missing,
            strengths,
            gaps,
            breakdown,
        }
    }

    /// Analyzes independent documents in parallel; output order matches input.
    pub fn analyze_batch<S>(&self, texts: &[S], job: &JobRequirements) -> Vec<AnalysisResult>
    where
        S: AsRef<str> + Sync,
    {
        texts
            .par_iter()
            .map(|text| self.analyze(text.as_ref(), job))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job() -> JobRequirements {
        JobRequirements {
            skills: vec!["python".to_string(), "sql".to_string()],
            min_experience_years: 3,
            education_levels: vec!["master".to_string()],
            location: "paris".to_string(),
        }
    }

    #[test]
    fn reference_scenario_scores_seventy() {
        let engine = AnalysisEngine::default();
        let text = "J'ai 5 ans d'expérience en python, master en informatique, basé à paris";

        let result = engine.analyze(text, &job());

        assert_eq!(result.matched_skills, vec!["python"]);
        assert_eq!(result.missing_skills, vec!["sql"]);
        assert_eq!(result.exp_years, 5);
        assert_eq!(result.breakdown.skills, 30.0);
        assert_eq!(result.breakdown.experience, 25.0);
        assert_eq!(result.breakdown.education, 10.0);
        assert_eq!(result.breakdown.location, 5.0);
        assert_eq!(result.score, 70);
        assert_eq!(result.category, Category::Pertinent);
        assert_eq!(
            result.strengths,
            vec![
                "Compétences correspondantes: python",
                "Expérience: 5 ans (≥ 3 ans)",
                "Niveau d'études: correspondance trouvée",
                "Localisation: correspondance trouvée",
            ]
        );
        assert_eq!(result.gaps, vec!["Compétences manquantes: sql"]);
    }

    #[test]
    fn empty_text_is_well_formed_floor_result() {
        let result = AnalysisEngine::default().analyze("", &job());

        assert_eq!(result.score, 0);
        assert_eq!(result.category, Category::PeuPertinent);
        assert!(result.matched_skills.is_empty());
        assert_eq!(result.missing_skills, vec!["python", "sql"]);
        assert!(result.strengths.is_empty());
        assert_eq!(result.gaps.len(), 3);
    }

    #[test]
    fn matching_ignores_case_on_both_sides() {
        let job = JobRequirements {
            skills: vec![" PostgreSQL ".to_string()],
            ..JobRequirements::default()
        };
        let result = AnalysisEngine::default().analyze("Expert POSTGRESQL", &job);
        assert_eq!(result.matched_skills, vec!["postgresql"]);
        assert_eq!(result.score, 60);
    }

    struct FixedEstimator(u8);

    impl ExperienceEstimator for FixedEstimator {
        fn estimate_years(&self, _normalized_text: &str) -> u8 {
            self.0
        }
    }

    #[test]
    fn estimator_is_pluggable_and_clamped() {
        let engine = AnalysisEngine::new(Arc::new(FixedEstimator(90)));
        let result = engine.analyze("no mention at all", &JobRequirements::default());
        assert_eq!(result.exp_years, MAX_EXPERIENCE_YEARS);
        assert_eq!(result.score, 25);
    }

    #[test]
    fn batch_preserves_input_order() {
        let engine = AnalysisEngine::default();
        let texts = vec![
            "python sql 4 years master paris".to_string(),
            String::new(),
            "python".to_string(),
        ];

        let results = engine.analyze_batch(&texts, &job());

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].score, 100);
        assert_eq!(results[1].score, 0);
        assert_eq!(results[2].matched_skills, vec!["python"]);
        assert_eq!(results[2], engine.analyze("python", &job()));
    }
}
