use std::ops::RangeInclusive;

use crate::models::assignment::AssignmentScope;
use crate::models::request::AssignmentRequest;
use crate::quality::ValidationResult;

/// Accepted band for Σ(requirement minutes) / budget minutes, inclusive.
pub const MIN_TIME_RATIO: f64 = 0.85;
pub const MAX_TIME_RATIO: f64 = 1.15;
pub const MIN_BUSINESS_CONTEXT_CHARS: usize = 200;
pub const MAX_BUSINESS_CONTEXT_CHARS: usize = 2000;
pub const MIN_MUST_HAVE: usize = 3;
pub const MAX_MUST_HAVE: usize = 7;
pub const MIN_CONSTRAINTS: usize = 2;
/// Must-haves below this share of the total time suggest a lopsided scope.
const MIN_MUST_HAVE_SHARE: f64 = 0.5;

const GENERIC_TERMS: &[&str] = &["bookstore", "todo", "to-do", "blog", "e-commerce store"];

/// Whether a time ratio sits inside [0.85, 1.15]. NaN and infinities fail.
pub fn time_ratio_within_tolerance(ratio: f64) -> bool {
    (MIN_TIME_RATIO..=MAX_TIME_RATIO).contains(&ratio)
}

/// Whole-minute totals the gate accepts for a budget, used to give the model
/// a concrete target when a draft is regenerated.
pub fn accepted_minutes(budget_minutes: f64) -> RangeInclusive<u32> {
    let accepted = |m: &u32| time_ratio_within_tolerance(f64::from(*m) / budget_minutes);
    let low = (budget_minutes * MIN_TIME_RATIO).floor().max(1.0) as u32;
    let high = (budget_minutes * MAX_TIME_RATIO).ceil() as u32;
    let min = (low.saturating_sub(1)..=low + 2)
        .find(accepted)
        .unwrap_or(low);
    let max = (high.saturating_sub(2)..=high + 1)
        .rev()
        .find(accepted)
        .unwrap_or(high);
    min..=max
}

/// Phase 3 gate: is the scope realistic for the requested time budget?
///
/// FAIL conditions:
/// - total requirement minutes outside 85%–115% of the budget
/// - business context shorter than 200 characters
/// - must-have count outside 3–7
/// - a requirement with 0 minutes or no rationale
/// - a single requirement longer than the whole budget
///
/// WARN conditions:
/// - no nice-to-have requirements, fewer than 2 constraints
/// - 7 must-haves, business context over 2000 characters
/// - generic exercise themes, must-haves under half of the total time
pub fn check_scope(scope: &AssignmentScope, request: &AssignmentRequest) -> ValidationResult {
    let mut issues = Vec::new();
    let mut warnings = Vec::new();

    let total = scope.total_minutes();
    let expected = request.budget_minutes();
    let ratio = if expected > 0.0 {
        total as f64 / expected
    } else {
        f64::INFINITY
    };
    if !time_ratio_within_tolerance(ratio) {
        issues.push(format!(
            "Time mismatch: requirements sum to {total} minutes but budget is {expected:.0} minutes \
            (ratio {ratio:.2}, must be between {MIN_TIME_RATIO:.2} and {MAX_TIME_RATIO:.2})"
        ));
    }

    let context_chars = scope.business_context.trim().chars().count();
    if context_chars < MIN_BUSINESS_CONTEXT_CHARS {
        issues.push(format!(
            "Business context too brief ({context_chars} chars, minimum {MIN_BUSINESS_CONTEXT_CHARS} required)"
        ));
    } else if context_chars > MAX_BUSINESS_CONTEXT_CHARS {
        warnings.push(format!(
            "Business context quite long ({context_chars} chars, recommended maximum {MAX_BUSINESS_CONTEXT_CHARS})"
        ));
    }

    let must_have = scope.must_have.len();
    if must_have < MIN_MUST_HAVE {
        issues.push(format!(
            "Too few must-have requirements ({must_have}, minimum {MIN_MUST_HAVE})"
        ));
    } else if must_have > MAX_MUST_HAVE {
        issues.push(format!(
            "Too many must-have requirements ({must_have}, maximum {MAX_MUST_HAVE})"
        ));
    } else if must_have == MAX_MUST_HAVE {
        warnings.push(format!(
            "Many must-have requirements ({must_have}). Candidates may struggle to complete all within the time budget."
        ));
    }

    for requirement in scope.all_requirements() {
        let minutes = requirement.estimated_time_minutes;
        if minutes == 0 {
            issues.push(format!(
                "Requirement '{}' has no time estimate",
                requirement.description
            ));
        } else if f64::from(minutes) > expected {
            issues.push(format!(
                "Requirement '{}' alone takes {minutes} minutes, more than the whole {expected:.0}-minute budget",
                requirement.description
            ));
        }
        if requirement.why_it_matters.trim().is_empty() {
            issues.push(format!(
                "Requirement '{}' does not explain why it matters",
                requirement.description
            ));
        }
    }

    if scope.nice_to_have.is_empty() {
        warnings.push(
            "No nice-to-have requirements. Consider adding optional features to differentiate exceptional candidates."
                .to_string(),
        );
    }

    if scope.constraints.len() < MIN_CONSTRAINTS {
        warnings.push(format!(
            "Few constraints specified ({}). Consider adding more realistic constraints.",
            scope.constraints.len()
        ));
    }

    let context_lower = scope.business_context.to_lowercase();
    if let Some(term) = GENERIC_TERMS.iter().find(|t| context_lower.contains(*t)) {
        warnings.push(format!(
            "Business context may be too generic (contains '{term}'). Ensure it reflects specific job responsibilities."
        ));
    }

    if total > 0 {
        let share = scope.must_have_minutes() as f64 / total as f64;
        if share < MIN_MUST_HAVE_SHARE {
            warnings.push(format!(
                "Must-have requirements only account for {:.0}% of time. Consider moving some nice-to-have items to must-have.",
                share * 100.0
            ));
        }
    }

    ValidationResult::from_findings(issues, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::request::SeniorityLevel;
    use crate::test_support::{requirement, sample_request, scope_with_minutes};

    fn four_hour_request() -> AssignmentRequest {
        sample_request(4.0, SeniorityLevel::Senior)
    }

    #[test]
    fn test_exact_budget_passes_without_warnings() {
        // 210 must-have + 30 nice-to-have = 240 = 1.0x of a 4h budget
        let scope = scope_with_minutes(&[45, 45, 40, 40, 40], &[30]);
        let result = check_scope(&scope, &four_hour_request());
        assert!(result.passed, "{:?}", result.issues);
        assert!(result.warnings.is_empty(), "{:?}", result.warnings);
    }

    #[test]
    fn test_far_under_budget_reports_time_mismatch() {
        let scope = scope_with_minutes(&[30, 30, 20], &[20]);
        let result = check_scope(&scope, &four_hour_request());
        assert!(!result.passed);
        assert!(result.issues[0].to_lowercase().contains("time mismatch"));
        assert!(result.issues[0].contains("100 minutes"));
        assert!(result.issues[0].contains("240 minutes"));
    }

    #[test]
    fn test_ratio_boundaries_are_inclusive() {
        // 204 / 240 = 0.85, 276 / 240 = 1.15
        let request = four_hour_request();
        assert!(check_scope(&scope_with_minutes(&[70, 70, 64], &[]), &request)
            .issues
            .is_empty());
        assert!(check_scope(&scope_with_minutes(&[92, 92, 92], &[]), &request)
            .issues
            .is_empty());
        assert!(!check_scope(&scope_with_minutes(&[70, 70, 63], &[]), &request).passed);
        assert!(!check_scope(&scope_with_minutes(&[92, 92, 93], &[]), &request).passed);
    }

    #[test]
    fn test_ratio_helper_at_thousandths() {
        assert!(time_ratio_within_tolerance(0.85));
        assert!(time_ratio_within_tolerance(1.15));
        assert!(time_ratio_within_tolerance(1.0));
        assert!(!time_ratio_within_tolerance(0.849));
        assert!(!time_ratio_within_tolerance(1.151));
        assert!(!time_ratio_within_tolerance(f64::INFINITY));
        assert!(!time_ratio_within_tolerance(f64::NAN));
    }

    #[test]
    fn test_ratio_just_outside_band_is_not_rounded_in() {
        assert!(!time_ratio_within_tolerance(0.84996));
        assert!(!time_ratio_within_tolerance(1.15004));

        // 170 minutes against a budget that puts the ratio at 0.84996
        let hours = 170.0 / 0.84996 / 60.0;
        let request = sample_request(hours, SeniorityLevel::Senior);
        let result = check_scope(&scope_with_minutes(&[60, 60, 50], &[]), &request);
        assert!(!result.passed);
        assert!(result.issues.iter().any(|i| i.contains("Time mismatch")));

        let range = accepted_minutes(request.budget_minutes());
        assert!(!range.contains(&170));
    }

    #[test]
    fn test_oversized_requirement_fails_without_overflow() {
        let scope = scope_with_minutes(&[u32::MAX, 1, 1], &[]);
        let result = check_scope(&scope, &four_hour_request());
        assert!(!result.passed);
        assert!(result.issues.iter().any(|i| i.contains("Time mismatch")));
        assert!(result
            .issues
            .iter()
            .any(|i| i.contains("more than the whole 240-minute budget")));

        let one_big = scope_with_minutes(&[241, 1, 1], &[]);
        assert!(check_scope(&one_big, &four_hour_request())
            .issues
            .iter()
            .any(|i| i.contains("alone takes 241 minutes")));
    }

    #[test]
    fn test_accepted_minutes_match_gate_bounds() {
        assert_eq!(accepted_minutes(240.0), 204..=276);
        assert_eq!(accepted_minutes(120.0), 102..=138);
        let range = accepted_minutes(150.0);
        assert!(time_ratio_within_tolerance(f64::from(*range.start()) / 150.0));
        assert!(!time_ratio_within_tolerance(f64::from(range.start() - 1) / 150.0));
        assert!(time_ratio_within_tolerance(f64::from(*range.end()) / 150.0));
        assert!(!time_ratio_within_tolerance(f64::from(range.end() + 1) / 150.0));
    }

    #[test]
    fn test_short_business_context_fails() {
        let mut scope = scope_with_minutes(&[80, 80, 80], &[]);
        scope.business_context = "A".repeat(199);
        let result = check_scope(&scope, &four_hour_request());
        assert!(result.issues.iter().any(|i| i.contains("too brief")));

        scope.business_context = "A".repeat(200);
        assert!(check_scope(&scope, &four_hour_request()).passed);
    }

    #[test]
    fn test_must_have_count_bounds() {
        let request = four_hour_request();
        let two = scope_with_minutes(&[120, 120], &[]);
        assert!(check_scope(&two, &request)
            .issues
            .iter()
            .any(|i| i.contains("Too few must-have")));

        let eight = scope_with_minutes(&[30; 8], &[]);
        assert!(check_scope(&eight, &request)
            .issues
            .iter()
            .any(|i| i.contains("Too many must-have")));

        let seven = scope_with_minutes(&[35, 35, 35, 35, 35, 35, 30], &[]);
        let result = check_scope(&seven, &request);
        assert!(result.passed);
        assert!(result.warnings.iter().any(|w| w.contains("Many must-have")));
    }

    #[test]
    fn test_soft_findings_only_warn() {
        let mut scope = scope_with_minutes(&[80, 80, 80], &[]);
        scope.constraints.truncate(1);
        let result = check_scope(&scope, &four_hour_request());
        assert!(result.passed);
        assert!(result.warnings.iter().any(|w| w.contains("nice-to-have")));
        assert!(result.warnings.iter().any(|w| w.contains("constraints")));
    }

    #[test]
    fn test_generic_theme_warns() {
        let mut scope = scope_with_minutes(&[80, 80, 80], &[20]);
        scope.business_context = format!("Build a todo service. {}", "x".repeat(220));
        let result = check_scope(&scope, &four_hour_request());
        assert!(result.warnings.iter().any(|w| w.contains("'todo'")));
    }

    #[test]
    fn test_lopsided_nice_to_have_warns() {
        let scope = scope_with_minutes(&[30, 30, 30], &[150]);
        let result = check_scope(&scope, &four_hour_request());
        assert!(result.passed);
        assert!(result.warnings.iter().any(|w| w.contains("38%")));
    }

    #[test]
    fn test_zero_minute_and_blank_rationale_fail() {
        let mut scope = scope_with_minutes(&[120, 120, 0], &[]);
        scope.must_have[1] = requirement("Blank why", 120);
        scope.must_have[1].why_it_matters = "  ".into();
        let result = check_scope(&scope, &four_hour_request());
        assert!(result.issues.iter().any(|i| i.contains("no time estimate")));
        assert!(result.issues.iter().any(|i| i.contains("why it matters")));
    }

    #[test]
    fn test_gate_is_deterministic() {
        let scope = scope_with_minutes(&[30, 30], &[]);
        let request = four_hour_request();
        let first = check_scope(&scope, &request);
        for _ in 0..10 {
            assert_eq!(check_scope(&scope, &request), first);
        }
    }
}
