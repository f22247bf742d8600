use serde::{Deserialize, Serialize};

use super::matching::{CriterionMatch, SkillMatch};

pub const SKILL_WEIGHT: f64 = 60.0;
pub const EXPERIENCE_WEIGHT: f64 = 25.0;
pub const EDUCATION_WEIGHT: f64 = 10.0;
pub const LOCATION_WEIGHT: f64 = 5.0;

/// Ordinal relevance bucket derived from the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    PeuPertinent,
    ARevoir,
    Pertinent,
    TresPertinent,
}

impl Category {
    /// Thresholds evaluated top-down, first match wins.
    pub const fn from_score(score: u8) -> Self {
        if score >= 80 {
            Category::TresPertinent
        } else if score >= 60 {
            Category::Pertinent
        } else if score >= 40 {
            Category::ARevoir
        } else {
            Category::PeuPertinent
        }
    }

    /// Stored identifier.
    pub const fn code(self) -> &'static str {
        match self {
            Category::TresPertinent => "tres_pertinent",
            Category::Pertinent => "pertinent",
            Category::ARevoir => "a_revoir",
            Category::PeuPertinent => "peu_pertinent",
        }
    }

    /// Display label shown to recruiters.
    pub const fn label(self) -> &'static str {
        match self {
            Category::TresPertinent => "Très pertinent",
            Category::Pertinent => "Pertinent",
            Category::ARevoir => "À revoir",
            Category::PeuPertinent => "Peu pertinent",
        }
    }
}

/// Per-criterion contributions before rounding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub skills: f64,
    pub experience: f64,
    pub education: f64,
    pub location: f64,
}

impl ScoreBreakdown {
    pub fn compute(
        min_experience_years: u32,
        exp_years: u8,
        skills: &SkillMatch,
        education: CriterionMatch,
        location: CriterionMatch,
    ) -> Self {
        let experience_ratio = if min_experience_years > 0 {
            (f64::from(exp_years) / f64::from(min_experience_years)).min(1.0)
        } else if exp_years > 0 {
            1.0
        } else {
            0.0
        };

        Self {
            skills: (skills.coverage() / 100.0 * SKILL_WEIGHT).min(SKILL_WEIGHT),
            experience: experience_ratio * EXPERIENCE_WEIGHT,
            education: if education.is_match() { EDUCATION_WEIGHT } else { 0.0 },
            location: if location.is_match() { LOCATION_WEIGHT } else { 0.0 },
        }
    }

    pub fn total(&self) -> f64 {
        self.skills + self.experience + self.education + self.location
    }

    /// Rounded total in `[0, 100]`; halves round to even.
    pub fn score(&self) -> u8 {
        let rounded = self.total().round_ties_even();
        debug_assert!((0.0..=100.0).contains(&rounded), "score out of range: {rounded}");
        rounded.clamp(0.0, 100.0) as u8
    }
}
