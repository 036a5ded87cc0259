// All LLM prompt constants for the generation pipeline.
// Reuses cross-cutting fragments from llm_client::prompts.

use crate::generation::phases::Correction;
use crate::llm_client::prompts::JSON_REMINDER;
use crate::llm_client::ResponseSchema;

/// Framing prepended to every phase prompt.
pub const SYSTEM_CONTEXT: &str = "You are an expert technical hiring manager with 10+ years of \
experience creating take-home assignments. Your assignments reflect actual job \
responsibilities instead of generic coding challenges, respect candidate time with a \
realistic scope, provide clear evaluation criteria and test for seniority-appropriate skills.

Key principles:
- Be specific about business context (never \"build a bookstore API\")
- Define must-have vs nice-to-have clearly
- Create rubrics that prevent evaluator bias

Requirements must be OUTCOME-FOCUSED, not implementation-specific:
- Do NOT specify exact field names, data types, enum values or status codes
- Describe WHAT the system should accomplish, not HOW to implement it
- Leave room for candidates to demonstrate their own design decisions

BAD requirement: \"Implement endpoint accepting title (string, max 100 chars), status (enum: open, closed)\"
GOOD requirement: \"Implement an endpoint to create new requests with appropriate metadata.\"";

// ────────────────────────────────────────────────────────────────────────────
// Phase 1: context extraction
// ────────────────────────────────────────────────────────────────────────────

pub const CONTEXT_SCHEMA: ResponseSchema = ResponseSchema {
    name: "job context",
    contract: r#"{
  "responsibilities": ["string (3-5 items)"],
  "business_domain": "string",
  "daily_technologies": ["string"],
  "collaboration_patterns": "string or null"
}"#,
};

/// Replace: {job_title}, {job_description}, {tech_stack}
pub const CONTEXT_PROMPT_TEMPLATE: &str = r#"Analyze this job description and extract:
1. Primary technical responsibilities (3-5 items)
2. Business domain and product context
3. Technologies that will be used daily
4. Team collaboration patterns (if mentioned)

Job Title: {job_title}
Tech Stack: {tech_stack}

Job Description:
{job_description}"#;

// ────────────────────────────────────────────────────────────────────────────
// Phase 2: scope definition
// ────────────────────────────────────────────────────────────────────────────

pub const SCOPE_SCHEMA: ResponseSchema = ResponseSchema {
    name: "assignment scope",
    contract: r#"{
  "title": "string",
  "business_context": "string (200-400 words describing the business problem)",
  "must_have_requirements": [
    {"description": "string", "estimated_time_minutes": 45, "why_it_matters": "string"}
  ],
  "nice_to_have_requirements": [
    {"description": "string", "estimated_time_minutes": 30, "why_it_matters": "string"}
  ],
  "constraints": ["string"]
}"#,
};

/// Replace: {seniority}, {hours}, {budget_minutes}, {min_minutes},
///          {max_minutes}, {must_minutes}, {nice_minutes}, {job_context},
///          {must_evaluate}, {avoid_topics}, {additional_context}
pub const SCOPE_PROMPT_TEMPLATE: &str = r#"Create a take-home assignment for {seniority} level.
Time budget: {hours} hours ({budget_minutes} minutes)

TIME RULES:
1. The estimated_time_minutes of ALL requirements together must sum to between {min_minutes} and {max_minutes} minutes
2. Must-haves should take about {must_minutes} minutes in total
3. Nice-to-haves should take about {nice_minutes} minutes in total
4. Include 3 to 6 must-have requirements, each tied to an actual job responsibility
5. Include at least 2 realistic business constraints (rate limits, data volumes, no external database, ...)

JOB CONTEXT:
{job_context}

Focus areas: {must_evaluate}
Avoid: {avoid_topics}{additional_context}

Write requirements that are OUTCOME-FOCUSED:
- Describe capabilities ("track request status"), not specifics ("status must be enum: open, closed")
- Let candidates decide their own data models, validation rules and API contracts
- Allow creative interpretation so different candidates produce different valid solutions

Make the business context SPECIFIC to this company's domain and at least 200 characters long."#;

// ────────────────────────────────────────────────────────────────────────────
// Phase 4: rubric generation
// ────────────────────────────────────────────────────────────────────────────

pub const RUBRIC_SCHEMA: ResponseSchema = ResponseSchema {
    name: "evaluation rubric",
    contract: r#"{
  "scoring_rubric": [
    {
      "area": "string",
      "weight": 0.25,
      "junior_expectation": "string",
      "mid_expectation": "string",
      "senior_expectation": "string",
      "scoring_guide": "string (how to assign a 1-5 score)"
    }
  ],
  "common_pitfalls": ["string"],
  "red_flags": ["string"],
  "green_flags": ["string"],
  "calibration_notes": "string"
}"#,
};

/// Replace: {title}, {seniority}, {must_evaluate}, {requirements}
pub const RUBRIC_PROMPT_TEMPLATE: &str = r#"Generate the evaluation rubric for this take-home assignment.

Assignment: {title}
Seniority: {seniority}
Must evaluate: {must_evaluate}

Must-have requirements:
{requirements}

Create a rubric with 4-6 evaluation areas. For each area give:
1. A weight between 0 and 1; the weights of all areas MUST sum to exactly 1.0
2. Junior, mid-level and senior expectations
3. A scoring guide explaining how to assign a 1-5 score

Evaluation should focus on the quality of design DECISIONS and how well the
candidate justified them. Different valid approaches must score equally well;
never penalize different field names, data structures or API designs.

Also provide:
- Common pitfalls candidates make (3-5 items), about design and thinking mistakes
- Red flags that indicate poor understanding of fundamentals (3-5 items)
- Green flags that indicate strong design thinking (3-5 items)
- Calibration notes for consistent evaluation of diverse solutions (2-3 paragraphs)"#;

// ────────────────────────────────────────────────────────────────────────────
// Assembly
// ────────────────────────────────────────────────────────────────────────────

/// Wraps a phase instruction with the hiring-manager framing, an optional
/// correction from a rejected draft, and the JSON contract.
pub fn build_prompt(
    instruction: &str,
    correction: Option<&Correction>,
    schema: &ResponseSchema,
) -> String {
    let correction = correction
        .map(|c| format!("\n\n{}", c.render()))
        .unwrap_or_default();
    format!(
        "{SYSTEM_CONTEXT}\n\n{instruction}{correction}\n\n\
        Return a JSON object with this EXACT structure:\n{contract}\n\n{JSON_REMINDER}",
        contract = schema.contract,
    )
}

/// Renders a list inline for prompts, with a placeholder when empty.
pub fn inline_list<'a>(items: impl IntoIterator<Item = &'a String>) -> String {
    let joined = items
        .into_iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    if joined.is_empty() {
        "none specified".to_string()
    } else {
        joined
    }
}
