use crate::models::assignment::RubricItem;
use crate::quality::{basis_points, ValidationResult};

pub const MIN_RUBRIC_ITEMS: usize = 3;
pub const MAX_RUBRIC_ITEMS: usize = 7;
/// Maximum deviation of Σ(weight) from 1.0. Compared in basis points; a
/// deviation that reaches the tolerance fails, so a sum of 1.01 is rejected.
pub const WEIGHT_SUM_TOLERANCE: f64 = 0.01;
const SMALL_WEIGHT: f64 = 0.05;

/// Phase 4 gate over the scoring rubric.
///
/// FAIL: item count outside 3–7, weights not summing to 1.0, a weight
/// outside (0, 1], a blank scoring guide.
/// WARN: weights under 5%, blank tier expectations.
pub fn check_rubric(rubric: &[RubricItem]) -> ValidationResult {
    let mut issues = Vec::new();
    let mut warnings = Vec::new();

    if rubric.len() < MIN_RUBRIC_ITEMS {
        issues.push(format!(
            "Too few rubric items ({}, minimum {MIN_RUBRIC_ITEMS})",
            rubric.len()
        ));
    } else if rubric.len() > MAX_RUBRIC_ITEMS {
        issues.push(format!(
            "Too many rubric items ({}, maximum {MAX_RUBRIC_ITEMS})",
            rubric.len()
        ));
    }

    let weight_sum: f64 = rubric.iter().map(|item| item.weight).sum();
    if !weights_sum_to_one(weight_sum) {
        issues.push(format!(
            "Rubric weights sum to {weight_sum:.3}, must be 1.0 (within {WEIGHT_SUM_TOLERANCE})"
        ));
    }

    for item in rubric {
        if !(item.weight > 0.0 && item.weight <= 1.0) {
            issues.push(format!(
                "Rubric item '{}' has invalid weight {} (must be > 0 and <= 1)",
                item.area, item.weight
            ));
        } else if item.weight < SMALL_WEIGHT {
            warnings.push(format!(
                "Rubric item '{}' has very small weight {} (< 5%). Consider removing or increasing weight.",
                item.area, item.weight
            ));
        }

        if item.scoring_guide.trim().is_empty() {
            issues.push(format!("Rubric item '{}' has empty scoring guide", item.area));
        }

        for (tier, expectation) in [
            ("junior", &item.junior_expectation),
            ("mid", &item.mid_expectation),
            ("senior", &item.senior_expectation),
        ] {
            if expectation.trim().is_empty() {
                warnings.push(format!(
                    "Rubric item '{}' has empty {tier} expectation",
                    item.area
                ));
            }
        }
    }

    ValidationResult::from_findings(issues, warnings)
}

pub fn weights_sum_to_one(sum: f64) -> bool {
    sum.is_finite() && basis_points((sum - 1.0).abs()) < basis_points(WEIGHT_SUM_TOLERANCE)
}
