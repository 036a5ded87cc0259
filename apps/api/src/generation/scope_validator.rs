//! Phase 3: gates a scope draft and, when it fails, turns the issues into
//! a correction for the one allowed regeneration.

use tracing::{info, warn};

use crate::generation::phases::Correction;
use crate::models::assignment::AssignmentScope;
use crate::models::request::AssignmentRequest;
use crate::quality::scope_gate::{accepted_minutes, MAX_MUST_HAVE, MIN_BUSINESS_CONTEXT_CHARS, MIN_MUST_HAVE};
use crate::quality::{check_scope, check_seniority_fit, ValidationResult};

/// Scope gate plus the advisory seniority-fit warnings.
pub fn validate_scope(scope: &AssignmentScope, request: &AssignmentRequest) -> ValidationResult {
    let result = check_scope(scope, request)
        .with_warnings(check_seniority_fit(scope, request.seniority_level));
    if result.passed {
        info!(
            "Scope '{}' passed validation with {} warning(s)",
            scope.title,
            result.warnings.len()
        );
    } else {
        warn!(
            "Scope '{}' failed validation: {}",
            scope.title,
            result.issues.join("; ")
        );
    }
    result
}

/// Builds the correction for a failed scope, naming concrete targets for
/// each kind of violation.
pub fn scope_correction(result: &ValidationResult, request: &AssignmentRequest) -> Correction {
    let mut directives = Vec::new();
    let has = |needle: &str| result.issues.iter().any(|i| i.contains(needle));

    if has("Time mismatch") {
        let budget = request.budget_minutes();
        let range = accepted_minutes(budget);
        directives.push(format!(
            "Total time must be closer to {budget:.0} minutes: the estimated_time_minutes of all \
            requirements must sum to between {} and {} minutes",
            range.start(),
            range.end()
        ));
    }
    if has("too brief") {
        directives.push(format!(
            "The business context must be at least {MIN_BUSINESS_CONTEXT_CHARS} characters and describe the specific business problem"
        ));
    }
    if has("must-have requirements") {
        directives.push(format!(
            "Include between {MIN_MUST_HAVE} and {MAX_MUST_HAVE} must-have requirements"
        ));
    }
    if has("no time estimate") || has("why it matters") {
        directives.push(
            "Every requirement needs a positive estimated_time_minutes and a non-empty why_it_matters"
                .to_string(),
        );
    }

    Correction {
        violations: result.issues.clone(),
        directives,
    }
}
