//! Phase 1: turns the raw job description into a `JobContext`.

use tracing::info;

use crate::generation::prompts::{
    build_prompt, inline_list, CONTEXT_PROMPT_TEMPLATE, CONTEXT_SCHEMA,
};
use crate::llm_client::{LlmError, ModelClient};
use crate::models::assignment::JobContext;
use crate::models::request::AssignmentRequest;

pub fn context_prompt(request: &AssignmentRequest) -> String {
    let instruction = CONTEXT_PROMPT_TEMPLATE
        .replace("{job_title}", request.job_title.trim())
        .replace("{tech_stack}", &inline_list(&request.tech_stack))
        .replace("{job_description}", request.job_description.trim());
    build_prompt(&instruction, None, &CONTEXT_SCHEMA)
}

pub async fn extract_context(
    client: &ModelClient,
    request: &AssignmentRequest,
) -> Result<JobContext, LlmError> {
    info!("Extracting job context for '{}'", request.job_title);
    let context: JobContext = client
        .call_structured(&context_prompt(request), &CONTEXT_SCHEMA)
        .await?;
    info!(
        "Extracted {} responsibilities in domain '{}'",
        context.responsibilities.len(),
        context.business_domain
    );
    Ok(context)
}
