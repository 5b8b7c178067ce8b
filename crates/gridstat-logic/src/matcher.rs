//! Include/exclude name matching for unit display names.
//!
//! A rule has an include pattern (wildcard `*`, comma-separated
//! alternatives, case-insensitive substring) and an exclude list. Both the
//! single-pattern and the pattern-list entry points funnel into the same
//! [`MatchRule`], so exclude handling never depends on how the rule was
//! built.
//!
//! ```
//! use gridstat_logic::matcher::MatchRule;
//!
//! let rule = MatchRule::new("cargo,tank", &["hydrogen"]);
//! assert!(rule.matches("Large Cargo Container"));
//! assert!(rule.matches("Oxygen Tank"));
//! assert!(!rule.matches("Hydrogen Tank"));
//! ```

use serde::{Deserialize, Serialize};

/// Exclude tokens shorter than this are too broad to be useful and ignored.
pub const MIN_EXCLUDE_LEN: usize = 3;

const WILDCARD: &str = "*";

/// Normalized include/exclude rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRule {
    /// Lower-cased include alternatives. Empty means "match everything".
    include: Vec<String>,
    /// Lower-cased exclude tokens that survived filtering.
    exclude: Vec<String>,
}

impl MatchRule {
    /// Build from a single include pattern, which may itself contain commas.
    pub fn new<S: AsRef<str>>(include_pattern: &str, excludes: &[S]) -> Self {
        let include = if include_pattern.contains(',') {
            split_alternatives(include_pattern)
        } else {
            single_alternative(include_pattern)
        };
        Self::build(include, excludes)
    }

    /// Build from an explicit list of include patterns.
    pub fn from_patterns<P: AsRef<str>, S: AsRef<str>>(patterns: &[P], excludes: &[S]) -> Self {
        let include = patterns
            .iter()
            .flat_map(|p| split_alternatives(p.as_ref()))
            .collect();
        Self::build(include, excludes)
    }

    /// Rule that accepts every name.
    pub fn match_all() -> Self {
        Self::default()
    }

    fn build<S: AsRef<str>>(include: Vec<String>, excludes: &[S]) -> Self {
        // A wildcard alternative anywhere accepts every name.
        let include = if include.iter().any(|p| p == WILDCARD) {
            Vec::new()
        } else {
            include
        };
        let exclude = excludes
            .iter()
            .map(|e| e.as_ref().trim().to_lowercase())
            .filter(|e| e != WILDCARD && e.chars().count() >= MIN_EXCLUDE_LEN)
            .filter(|e| !include.contains(e))
            .collect();
        Self { include, exclude }
    }

    /// Whether the include side accepts every name.
    pub fn is_match_all(&self) -> bool {
        self.include.is_empty()
    }

    pub fn include_alternatives(&self) -> &[String] {
        &self.include
    }

    pub fn effective_excludes(&self) -> &[String] {
        &self.exclude
    }

    /// Evaluate the rule against a display name.
    pub fn matches(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        let included =
            self.is_match_all() || self.include.iter().any(|p| name.contains(p.as_str()));
        if !included {
            return false;
        }
        !self.exclude.iter().any(|e| name.contains(e.as_str()))
    }
}

/// Parse a comma-separated exclude list as stored in view configuration.
pub fn parse_exclude_list(csv: &str) -> Vec<String> {
    csv.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Single-pattern check.
pub fn matches<S: AsRef<str>>(name: &str, include_pattern: &str, excludes: &[S]) -> bool {
    MatchRule::new(include_pattern, excludes).matches(name)
}

/// Pattern-list check. Behaves identically to [`matches`] with the patterns
/// joined by commas.
pub fn matches_any<P: AsRef<str>, S: AsRef<str>>(
    name: &str,
    patterns: &[P],
    excludes: &[S],
) -> bool {
    MatchRule::from_patterns(patterns, excludes).matches(name)
}

fn single_alternative(pattern: &str) -> Vec<String> {
    let p = pattern.trim().to_lowercase();
    if p.is_empty() {
        Vec::new()
    } else {
        vec![p]
    }
}

// Empty alternatives ("a,,b" or a trailing comma) are dropped; they would
// otherwise match every name as an empty substring.
fn split_alternatives(pattern: &str) -> Vec<String> {
    pattern
        .split(',')
        .map(|p| p.trim().to_lowercase())
        .filter(|p| !p.is_empty())
        .collect()
}
