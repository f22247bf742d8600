//! Literal, case-insensitive substring checks of job criteria against
//! document text.
//!
//! Containment is the contract: "java" matches inside "javascript" and "r"
//! matches almost anything. Switching to word-boundary or fuzzy matching
//! would change observable scores.

use serde::{Deserialize, Serialize};

/// Skills split into found / not found, both in job order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillMatch {
    pub matched: Vec<String>,
    pub missing: Vec<String>,
}

impl SkillMatch {
    pub fn total(&self) -> usize {
        self.matched.len() + self.missing.len()
    }

    /// Percentage of required skills found; 0 when nothing is required.
    pub fn coverage(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        self.matched.len() as f64 / total as f64 * 100.0
    }
}

/// `skills` must already be normalized (trimmed, lowercased).
pub fn match_skills(normalized_text: &str, skills: &[String]) -> SkillMatch {
    let (matched, missing) = skills
        .iter()
        .cloned()
        .partition(|skill| normalized_text.contains(skill.as_str()));
    SkillMatch { matched, missing }
}

/// Outcome of a criterion that may not be configured on the job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CriterionMatch {
    NotRequired,
    Matched,
    Unmatched,
}

impl CriterionMatch {
    pub fn is_match(self) -> bool {
        matches!(self, CriterionMatch::Matched)
    }

    pub fn is_required(self) -> bool {
        !matches!(self, CriterionMatch::NotRequired)
    }

    fn from_hit(hit: bool) -> Self {
        if hit {
            CriterionMatch::Matched
        } else {
            CriterionMatch::Unmatched
        }
    }
}

/// Any configured education level present in the text.
pub fn match_education(normalized_text: &str, levels: &[String]) -> CriterionMatch {
    if levels.is_empty() {
        return CriterionMatch::NotRequired;
    }
    CriterionMatch::from_hit(
        levels
            .iter()
            .any(|level| normalized_text.contains(level.as_str())),
    )
}

pub fn match_location(normalized_text: &str, location: Option<&str>) -> CriterionMatch {
    match location {
        None => CriterionMatch::NotRequired,
        Some(location) => CriterionMatch::from_hit(normalized_text.contains(location)),
    }
}
