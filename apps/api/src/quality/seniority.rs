//! Seniority-fit heuristic, advisory only.
//!
//! Compares the scope's shape (must-have count, total minutes) and the
//! complexity vocabulary in its requirements against rough bands per tier.
//! The signal is approximate, so every finding is a warning, never an issue.

use crate::models::assignment::AssignmentScope;
use crate::models::request::SeniorityLevel;

/// Stems that signal design-heavy, senior-level work.
const ADVANCED_SIGNALS: &[&str] = &[
    "distributed",
    "concurren",
    "scalab",
    "architect",
    "fault toleran",
    "consisten",
    "idempoten",
    "sharding",
    "replicat",
    "throughput",
    "latency",
    "high availability",
    "multi-tenant",
    "observability",
    "trade-off",
    "tradeoff",
];

/// Requirements mentioning advanced topics before a junior scope is flagged.
const JUNIOR_ADVANCED_LIMIT: usize = 3;

struct TierBand {
    must_have: (usize, usize),
    minutes: (u64, u64),
}

fn band(level: SeniorityLevel) -> TierBand {
    match level {
        SeniorityLevel::Junior => TierBand {
            must_have: (3, 4),
            minutes: (120, 240),
        },
        SeniorityLevel::Mid => TierBand {
            must_have: (4, 5),
            minutes: (180, 300),
        },
        SeniorityLevel::Senior => TierBand {
            must_have: (5, 6),
            minutes: (240, 420),
        },
        SeniorityLevel::Staff => TierBand {
            must_have: (6, 7),
            minutes: (360, 540),
        },
    }
}

/// Number of requirements whose description uses advanced vocabulary.
pub fn advanced_requirement_count(scope: &AssignmentScope) -> usize {
    scope
        .all_requirements()
        .filter(|r| {
            let text = r.description.to_lowercase();
            ADVANCED_SIGNALS.iter().any(|s| text.contains(s))
        })
        .count()
}

/// Warnings describing where the scope looks mis-pitched for `level`.
pub fn check_seniority_fit(scope: &AssignmentScope, level: SeniorityLevel) -> Vec<String> {
    let mut warnings = Vec::new();
    let band = band(level);

    let must_have = scope.must_have.len();
    let total = scope.total_minutes();
    let count_fits = (band.must_have.0..=band.must_have.1).contains(&must_have);
    let time_fits = (band.minutes.0..=band.minutes.1).contains(&total);

    if !count_fits || !time_fits {
        warnings.push(format!(
            "Assignment complexity may not match {level} level ({must_have} must-haves, {total} minutes; \
            typical is {}-{} must-haves over {}-{} minutes). Consider adjusting number of requirements or time budget.",
            band.must_have.0, band.must_have.1, band.minutes.0, band.minutes.1
        ));
    }

    let advanced = advanced_requirement_count(scope);
    match level {
        SeniorityLevel::Junior if advanced >= JUNIOR_ADVANCED_LIMIT => {
            warnings.push(format!(
                "{advanced} requirements involve advanced topics (distributed systems, concurrency, scalability) \
                that are unusual for a junior assignment."
            ));
        }
        SeniorityLevel::Senior | SeniorityLevel::Staff if advanced == 0 => {
            warnings.push(format!(
                "No requirement exercises design trade-offs (scalability, consistency, fault tolerance) \
                expected at {level} level."
            ));
        }
        _ => {}
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{requirement, scope_with_minutes};

    #[test]
    fn test_senior_scope_in_band_with_design_signal_is_clean() {
        let mut scope = scope_with_minutes(&[45, 45, 40, 40, 40], &[30]);
        scope.must_have[0] = requirement("Design an idempotent ingestion endpoint", 45);
        assert!(check_seniority_fit(&scope, SeniorityLevel::Senior).is_empty());
    }

    #[test]
    fn test_out_of_band_count_warns() {
        let scope = scope_with_minutes(&[80, 80, 80], &[]);
        let warnings = check_seniority_fit(&scope, SeniorityLevel::Staff);
        assert!(warnings[0].contains("may not match staff level"));
    }

    #[test]
    fn test_senior_without_design_signal_warns() {
        let scope = scope_with_minutes(&[45, 45, 40, 40, 40], &[30]);
        let warnings = check_seniority_fit(&scope, SeniorityLevel::Senior);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("trade-offs"));
    }

    #[test]
    fn test_junior_with_advanced_topics_warns() {
        let mut scope = scope_with_minutes(&[60, 60, 60], &[]);
        scope.must_have = vec![
            requirement("Build a distributed job queue", 60),
            requirement("Handle concurrent writers safely", 60),
            requirement("Design for horizontal scalability", 60),
        ];
        let warnings = check_seniority_fit(&scope, SeniorityLevel::Junior);
        assert!(warnings.iter().any(|w| w.contains("unusual for a junior")));
    }

    #[test]
    fn test_mid_never_gets_keyword_warnings() {
        let scope = scope_with_minutes(&[60, 60, 60, 60], &[]);
        assert!(check_seniority_fit(&scope, SeniorityLevel::Mid).is_empty());
    }
}
