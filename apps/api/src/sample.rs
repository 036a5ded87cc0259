//! Built-in sample request for `takehome generate --sample`.

use crate::models::request::{AssignmentRequest, SeniorityLevel, SubmissionFormat};

pub const BACKEND_SENIOR_JD: &str = r#"
Senior Backend Engineer - Payroll Platform

We run payroll infrastructure for small and medium businesses across Europe,
moving more than 50M EUR in salaries every month. Our backend calculates
gross-to-net pay under several tax regimes, talks to SEPA banking rails, and
gives HR teams real-time reporting on every run.

What you'll do:
- Design and build the APIs that drive payroll runs end to end
- Own the tax calculation engine and keep it auditable
- Integrate with banking partners for SEPA and instant payments
- Build internal tools that let HR teams review and approve runs
- Keep the system reliable and the numbers exactly right
- Mentor engineers on architecture and testing practice

Our stack: Python, FastAPI, PostgreSQL, Redis, Celery, Docker, Kubernetes, AWS.

You have 5+ years of backend experience, strong API design skills, exposure to
regulated or financial systems, and a habit of testing thoroughly.
"#;

pub fn sample_request() -> AssignmentRequest {
    AssignmentRequest {
        job_title: "Senior Backend Engineer".to_string(),
        job_description: BACKEND_SENIOR_JD.trim().to_string(),
        tech_stack: ["Python", "FastAPI", "PostgreSQL", "Redis"]
            .into_iter()
            .map(String::from)
            .collect(),
        time_budget_hours: 4.0,
        seniority_level: SeniorityLevel::Senior,
        company_context: Some("Fintech startup processing payroll for 10k+ companies".to_string()),
        current_challenges: None,
        must_evaluate: ["API design", "error handling", "data modeling"]
            .into_iter()
            .map(String::from)
            .collect(),
        avoid_topics: Default::default(),
        candidate_can_use: None,
        submission_format: SubmissionFormat::Github,
    }
}
