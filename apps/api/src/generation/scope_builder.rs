//! Phase 2: drafts the assignment scope from the job context and the
//! hiring manager's inputs.

use tracing::info;

use crate::generation::phases::Correction;
use crate::generation::prompts::{build_prompt, inline_list, SCOPE_PROMPT_TEMPLATE, SCOPE_SCHEMA};
use crate::llm_client::{LlmError, ModelClient};
use crate::models::assignment::{AssignmentScope, JobContext};
use crate::models::request::AssignmentRequest;
use crate::quality::scope_gate::accepted_minutes;

/// Share of the budget steered towards must-have requirements.
const MUST_HAVE_SHARE: f64 = 0.8;

/// "4" for whole hours, "2.5" otherwise.
pub fn format_hours(hours: f64) -> String {
    if hours.fract() == 0.0 {
        format!("{}", hours as u32)
    } else {
        format!("{hours:.1}")
    }
}

fn render_context(context: &JobContext) -> String {
    let mut out = String::from("Responsibilities:\n");
    for responsibility in &context.responsibilities {
        out.push_str(&format!("- {responsibility}\n"));
    }
    out.push_str(&format!("Business domain: {}\n", context.business_domain));
    out.push_str(&format!(
        "Daily technologies: {}",
        inline_list(&context.daily_technologies)
    ));
    if let Some(patterns) = &context.collaboration_patterns {
        out.push_str(&format!("\nCollaboration: {patterns}"));
    }
    out
}

pub fn scope_prompt(
    context: &JobContext,
    request: &AssignmentRequest,
    correction: Option<&Correction>,
) -> String {
    let budget = request.budget_minutes();
    let range = accepted_minutes(budget);
    let must_minutes = (budget * MUST_HAVE_SHARE).round() as u32;
    let nice_minutes = (budget.round() as u32).saturating_sub(must_minutes);

    let mut additional = String::new();
    if let Some(company) = &request.company_context {
        additional.push_str(&format!("\nCompany Context: {company}"));
    }
    if let Some(challenges) = &request.current_challenges {
        additional.push_str(&format!("\nCurrent Challenges: {challenges}"));
    }

    let instruction = SCOPE_PROMPT_TEMPLATE
        .replace("{seniority}", request.seniority_level.as_str())
        .replace("{hours}", &format_hours(request.time_budget_hours))
        .replace("{budget_minutes}", &format!("{budget:.0}"))
        .replace("{min_minutes}", &range.start().to_string())
        .replace("{max_minutes}", &range.end().to_string())
        .replace("{must_minutes}", &must_minutes.to_string())
        .replace("{nice_minutes}", &nice_minutes.to_string())
        .replace("{job_context}", &render_context(context))
        .replace("{must_evaluate}", &inline_list(&request.must_evaluate))
        .replace("{avoid_topics}", &inline_list(&request.avoid_topics))
        .replace("{additional_context}", &additional);
    build_prompt(&instruction, correction, &SCOPE_SCHEMA)
}

pub async fn draft_scope(
    client: &ModelClient,
    context: &JobContext,
    request: &AssignmentRequest,
    correction: Option<&Correction>,
) -> Result<AssignmentScope, LlmError> {
    if correction.is_some() {
        info!("Regenerating scope with corrections");
    } else {
        info!("Drafting scope for {} level", request.seniority_level);
    }
    let scope: AssignmentScope = client
        .call_structured(&scope_prompt(context, request, correction), &SCOPE_SCHEMA)
        .await?;
    info!(
        "Scope '{}' drafted: {} must-have, {} nice-to-have, {} minutes",
        scope.title,
        scope.must_have.len(),
        scope.nice_to_have.len(),
        scope.total_minutes()
    );
    Ok(scope)
}
