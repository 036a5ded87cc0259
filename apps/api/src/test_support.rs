//! Fixtures shared by unit tests across modules.

use crate::models::assignment::{AssignmentScope, JobContext, Requirement, RubricItem};
use crate::models::request::{AssignmentRequest, SeniorityLevel};
use crate::sample::BACKEND_SENIOR_JD;

pub const PAYROLL_CONTEXT: &str = "Our platform runs monthly payroll for 4,000 small \
    companies across Europe. Payroll administrators upload employee changes during the \
    month and expect gross-to-net results they can review before funds move. Today the \
    review step is manual and slow, and mistakes are caught only after payslips go out. \
    You will build the service that prepares a reviewable payroll run.";

pub fn sample_request(hours: f64, seniority: SeniorityLevel) -> AssignmentRequest {
    AssignmentRequest {
        job_title: "Senior Backend Engineer".to_string(),
        job_description: BACKEND_SENIOR_JD.to_string(),
        tech_stack: vec![
            "Python".to_string(),
            "FastAPI".to_string(),
            "PostgreSQL".to_string(),
        ],
        time_budget_hours: hours,
        seniority_level: seniority,
        company_context: Some("Fintech startup processing payroll for SMBs".to_string()),
        current_challenges: None,
        must_evaluate: ["API design", "error handling"]
            .into_iter()
            .map(String::from)
            .collect(),
        avoid_topics: Default::default(),
        candidate_can_use: None,
        submission_format: Default::default(),
    }
}

pub fn sample_context() -> JobContext {
    JobContext {
        responsibilities: vec![
            "Design and build APIs for payroll processing".to_string(),
            "Implement tax calculation engines".to_string(),
            "Integrate with banking APIs".to_string(),
        ],
        business_domain: "Fintech - SMB payroll processing".to_string(),
        daily_technologies: vec!["Python".to_string(), "PostgreSQL".to_string()],
        collaboration_patterns: Some("Small product squads with weekly demos".to_string()),
    }
}

pub fn requirement(description: &str, minutes: u32) -> Requirement {
    Requirement {
        description: description.to_string(),
        estimated_time_minutes: minutes,
        why_it_matters: "Mirrors the payroll review work the role owns".to_string(),
    }
}

/// A well-formed scope whose requirement minutes are exactly `must` and `nice`.
pub fn scope_with_minutes(must: &[u32], nice: &[u32]) -> AssignmentScope {
    AssignmentScope {
        title: "Payroll Run Review Service".to_string(),
        business_context: PAYROLL_CONTEXT.to_string(),
        must_have: must
            .iter()
            .enumerate()
            .map(|(i, m)| requirement(&format!("Payroll review capability {}", i + 1), *m))
            .collect(),
        nice_to_have: nice
            .iter()
            .enumerate()
            .map(|(i, m)| requirement(&format!("Optional reporting extra {}", i + 1), *m))
            .collect(),
        constraints: vec![
            "Use an in-memory store, no external database".to_string(),
            "Monetary amounts must not lose precision".to_string(),
        ],
    }
}

pub fn rubric_with_weights(weights: &[f64]) -> Vec<RubricItem> {
    weights
        .iter()
        .enumerate()
        .map(|(i, w)| RubricItem {
            area: format!("Area {}", i + 1),
            weight: *w,
            junior_expectation: "Working happy path".to_string(),
            mid_expectation: "Handles edge cases".to_string(),
            senior_expectation: "Explains trade-offs".to_string(),
            scoring_guide: "1 = missing, 3 = adequate, 5 = exemplary".to_string(),
        })
        .collect()
}
