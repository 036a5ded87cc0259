use crate::models::assignment::JobContext;
use crate::quality::ValidationResult;

pub const MIN_RESPONSIBILITIES: usize = 3;

/// Phase 1 gate: is there enough job context to scope an assignment from?
///
/// FAIL: fewer than 3 responsibilities, blank business domain, no daily
/// technologies. WARN: no collaboration patterns.
pub fn check_context(context: &JobContext) -> ValidationResult {
    let mut issues = Vec::new();
    let mut warnings = Vec::new();

    let responsibilities = context
        .responsibilities
        .iter()
        .filter(|r| !r.trim().is_empty())
        .count();
    if responsibilities < MIN_RESPONSIBILITIES {
        issues.push(format!(
            "Insufficient responsibilities extracted ({responsibilities}, minimum {MIN_RESPONSIBILITIES} required)"
        ));
    }

    if context.business_domain.trim().is_empty() {
        issues.push("Business domain not identified".to_string());
    }

    if context.daily_technologies.iter().all(|t| t.trim().is_empty()) {
        issues.push("Daily technologies not specified".to_string());
    }

    if context
        .collaboration_patterns
        .as_deref()
        .map_or(true, |p| p.trim().is_empty())
    {
        warnings.push("Collaboration patterns not identified (optional)".to_string());
    }

    ValidationResult::from_findings(issues, warnings)
}
