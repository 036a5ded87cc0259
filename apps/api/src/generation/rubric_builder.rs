//! Phase 4: scoring rubric and evaluator notes for an accepted scope.

use tracing::{info, warn};

use crate::generation::phases::Correction;
use crate::generation::prompts::{
    build_prompt, inline_list, RUBRIC_PROMPT_TEMPLATE, RUBRIC_SCHEMA,
};
use crate::llm_client::{LlmError, ModelClient};
use crate::models::assignment::{AssignmentScope, EvaluatorGuide};
use crate::models::request::AssignmentRequest;
use crate::quality::rubric_gate::{MAX_RUBRIC_ITEMS, MIN_RUBRIC_ITEMS};
use crate::quality::{check_rubric, ValidationResult};

pub fn rubric_prompt(
    scope: &AssignmentScope,
    request: &AssignmentRequest,
    correction: Option<&Correction>,
) -> String {
    let requirements = scope
        .must_have
        .iter()
        .map(|r| format!("- {} ({} min)", r.description, r.estimated_time_minutes))
        .collect::<Vec<_>>()
        .join("\n");
    let instruction = RUBRIC_PROMPT_TEMPLATE
        .replace("{title}", &scope.title)
        .replace("{seniority}", request.seniority_level.as_str())
        .replace("{must_evaluate}", &inline_list(&request.must_evaluate))
        .replace("{requirements}", &requirements);
    build_prompt(&instruction, correction, &RUBRIC_SCHEMA)
}

pub async fn build_rubric(
    client: &ModelClient,
    scope: &AssignmentScope,
    request: &AssignmentRequest,
    correction: Option<&Correction>,
) -> Result<EvaluatorGuide, LlmError> {
    info!("Generating rubric for '{}'", scope.title);
    let guide: EvaluatorGuide = client
        .call_structured(&rubric_prompt(scope, request, correction), &RUBRIC_SCHEMA)
        .await?;
    info!(
        "Rubric drafted: {} areas, weights sum to {:.3}",
        guide.scoring_rubric.len(),
        guide.weight_sum()
    );
    Ok(guide)
}

/// Rubric gate over a drafted guide, with the outcome logged.
pub fn validate_rubric(guide: &EvaluatorGuide) -> ValidationResult {
    let result = check_rubric(&guide.scoring_rubric);
    if !result.passed {
        warn!("Rubric failed validation: {}", result.issues.join("; "));
    }
    result
}

pub fn rubric_correction(result: &ValidationResult) -> Correction {
    let mut directives = vec![format!(
        "Use between {MIN_RUBRIC_ITEMS} and {MAX_RUBRIC_ITEMS} evaluation areas"
    )];
    if result.issues.iter().any(|i| i.contains("weights sum")) {
        directives.push(
            "The weights of all areas must sum to exactly 1.0; recompute them before answering"
                .to_string(),
        );
    }
    if result.issues.iter().any(|i| i.contains("invalid weight")) {
        directives.push("Every weight must be greater than 0 and at most 1".to_string());
    }
    if result.issues.iter().any(|i| i.contains("scoring guide")) {
        directives.push("Every area needs a scoring guide explaining the 1-5 scale".to_string());
    }
    Correction {
        violations: result.issues.clone(),
        directives,
    }
}
