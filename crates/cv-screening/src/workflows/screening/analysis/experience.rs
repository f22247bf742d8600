use once_cell::sync::Lazy;
use regex::Regex;

/// Upper bound applied to any estimate.
pub const MAX_EXPERIENCE_YEARS: u8 = 40;

/// Unit tokens recognised by the default estimator (French and English).
pub const DEFAULT_YEAR_UNITS: &[&str] = &["ans", "year", "years"];

static DEFAULT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    year_mention_pattern(DEFAULT_YEAR_UNITS).expect("default year pattern compiles")
});

/// Strategy turning normalized (lowercased) document text into a number of
/// years of experience in `[0, MAX_EXPERIENCE_YEARS]`.
pub trait ExperienceEstimator: Send + Sync {
    fn estimate_years(&self, normalized_text: &str) -> u8;
}

/// Scans for one- or two-digit numbers directly followed by a year unit and
/// keeps the largest mention. Mentions are never summed.
///
/// Matching is purely lexical: "2020 years" reads as 20 and "3 answers"
/// reads as 3.
#[derive(Debug, Clone)]
pub struct YearMentionEstimator {
    pattern: Regex,
}

impl YearMentionEstimator {
    /// Builds an estimator for a custom set of unit tokens (e.g. "jahre").
    pub fn with_units<S: AsRef<str>>(units: &[S]) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: year_mention_pattern(units)?,
        })
    }
}

impl Default for YearMentionEstimator {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_PATTERN.clone(),
        }
    }
}

impl ExperienceEstimator for YearMentionEstimator {
    fn estimate_years(&self, normalized_text: &str) -> u8 {
        self.pattern
            .captures_iter(normalized_text)
            .filter_map(|captures| captures.get(1)?.as_str().parse::<u8>().ok())
            .max()
            .map(|years| years.min(MAX_EXPERIENCE_YEARS))
            .unwrap_or(0)
    }
}

fn year_mention_pattern<S: AsRef<str>>(units: &[S]) -> Result<Regex, regex::Error> {
    let alternation = units
        .iter()
        .map(|unit| regex::escape(&unit.as_ref().trim().to_lowercase()))
        .filter(|unit| !unit.is_empty())
        .collect::<Vec<_>>()
        .join("|");
    // An empty unit list must never match anything.
    let alternation = if alternation.is_empty() {
        "[^\\s\\S]".to_string()
    } else {
        alternation
    };
    Regex::new(&format!(r"([0-9]{{1,2}})\s*(?:{alternation})"))
}
