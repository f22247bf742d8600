//! Narrative feedback. Entry order is part of the exported contract.

use super::matching::{CriterionMatch, SkillMatch};

pub const CANDIDATE_PREAMBLE: &str =
    "Merci d'avoir postulé. Voici un retour préliminaire généré automatiquement:";

pub const DEFAULT_REJECTION_REASON: &str = "Merci pour votre candidature. Le profil ne correspond pas suffisamment aux critères du poste à ce stade.";

const GENERIC_ENCOURAGEMENT: &str =
    "Merci pour votre intérêt. Nous vous encourageons à continuer de postuler aux offres pertinentes.";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Feedback {
    pub strengths: Vec<String>,
    pub gaps: Vec<String>,
}

/// Facts the composer needs, borrowed from a finished analysis.
#[derive(Debug, Clone, Copy)]
pub struct FeedbackInput<'a> {
    pub skills: &'a SkillMatch,
    pub exp_years: u8,
    pub min_experience_years: u32,
    pub education: CriterionMatch,
    pub location: CriterionMatch,
}

/// Builds strengths and gaps in fixed order: skills, experience, education,
/// location. Location never produces a gap.
pub fn compose(input: FeedbackInput<'_>) -> Feedback {
    let mut feedback = Feedback::default();

    if !input.skills.matched.is_empty() {
        feedback.strengths.push(format!(
            "Compétences correspondantes: {}",
            input.skills.matched.join(", ")
        ));
    }
    if !input.skills.missing.is_empty() {
        feedback.gaps.push(format!(
            "Compétences manquantes: {}",
            input.skills.missing.join(", ")
        ));
    }

    let exp = input.exp_years;
    let min = input.min_experience_years;
    if min > 0 {
        if u32::from(exp) >= min {
            feedback
                .strengths
                .push(format!("Expérience: {exp} ans (≥ {min} ans)"));
        } else {
            feedback.gaps.push(format!("Expérience: {exp} ans (< {min} ans)"));
        }
    } else if exp > 0 {
        feedback.strengths.push(format!("Expérience: {exp} ans"));
    }

    match input.education {
        CriterionMatch::Matched => feedback
            .strengths
            .push("Niveau d'études: correspondance trouvée".to_string()),
        CriterionMatch::Unmatched => feedback
            .gaps
            .push("Niveau d'études: aucune correspondance explicite trouvée".to_string()),
        CriterionMatch::NotRequired => {}
    }

    if input.location.is_match() {
        feedback
            .strengths
            .push("Localisation: correspondance trouvée".to_string());
    }

    feedback
}

/// Message shown to a candidate right after submitting. Generated once.
pub fn candidate_message(
    matched_skills: &[String],
    missing_skills: &[String],
    exp_years: u8,
    min_experience_years: u32,
) -> String {
    let mut parts = vec![CANDIDATE_PREAMBLE.to_string()];
    if !matched_skills.is_empty() {
        parts.push(format!("Points forts: {}", matched_skills.join(", ")));
    }
    if !missing_skills.is_empty() {
        parts.push(format!(
            "Compétences à renforcer: {}",
            missing_skills.join(", ")
        ));
    }
    if min_experience_years > 0 && u32::from(exp_years) < min_experience_years {
        parts.push(format!(
            "Expérience indiquée: {exp_years} an(s) (min. souhaité: {min_experience_years})."
        ));
    }
    parts.join("\n")
}

/// Guidance attached on rejection when the candidate has none yet.
pub fn rejection_suggestions(missing_skills: &[String]) -> String {
    if missing_skills.is_empty() {
        GENERIC_ENCOURAGEMENT.to_string()
    } else {
        format!(
            "Pour augmenter vos chances, travaillez les compétences suivantes: {}",
            missing_skills.join(", ")
        )
    }
}
