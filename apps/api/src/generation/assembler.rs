//! Assembly: merges the accepted phase outputs into the final artifact.
//!
//! Everything here is deterministic except the assignment id and timestamp.

use chrono::Utc;
use uuid::Uuid;

use crate::generation::scope_builder::format_hours;
use crate::models::assignment::{
    AssignmentScope, CandidateBrief, Difficulty, EvaluatorGuide, GeneratedAssignment, JobContext,
    Requirements, TimeBreakdown,
};
use crate::models::request::{AssignmentRequest, SubmissionFormat};

// Percent of the scope's estimated work spent per activity. Core
// implementation takes the rest; any budget the scope leaves unused is buffer.
const SETUP_PERCENT: u64 = 10;
const TESTING_PERCENT: u64 = 15;
const DOCUMENTATION_PERCENT: u64 = 10;

const README_NOTE: &str = "Include a comprehensive README with setup instructions, \
    architecture decisions, and any assumptions made.";

pub fn assemble(
    request: &AssignmentRequest,
    job_context: JobContext,
    scope: AssignmentScope,
    evaluator_guide: EvaluatorGuide,
    scope_warnings: Vec<String>,
) -> GeneratedAssignment {
    let breakdown = time_breakdown(
        request.budget_minutes().round() as u32,
        scope.total_minutes(),
    );
    let candidate_brief = CandidateBrief {
        title: scope.title,
        business_context: scope.business_context,
        requirements: Requirements {
            must_have: scope.must_have,
            nice_to_have: scope.nice_to_have,
            constraints: scope.constraints,
        },
        submission_guidelines: submission_guidelines(request),
        evaluation_criteria: evaluation_criteria(&evaluator_guide),
        time_estimate: time_estimate(request.time_budget_hours),
    };

    GeneratedAssignment {
        candidate_brief,
        evaluator_guide,
        time_breakdown: breakdown,
        job_context,
        assignment_id: Uuid::new_v4(),
        generated_at: Utc::now(),
        estimated_difficulty: estimate_difficulty(request),
        scope_warnings,
    }
}

pub fn submission_guidelines(request: &AssignmentRequest) -> String {
    let base = match request.submission_format {
        SubmissionFormat::Github => {
            format!("Please submit your solution as a GitHub repository. {README_NOTE}")
        }
        SubmissionFormat::Zip => format!("Please submit your solution as a ZIP file. {README_NOTE}"),
        SubmissionFormat::Codesandbox => "Please submit your solution as a CodeSandbox link. \
            Ensure all dependencies are properly configured and the sandbox is publicly accessible."
            .to_string(),
    };

    match &request.candidate_can_use {
        Some(libs) if !libs.is_empty() => format!(
            "{base}\n\nYou may use the following libraries/frameworks: {}",
            libs.join(", ")
        ),
        _ => base,
    }
}

pub fn time_estimate(hours: f64) -> String {
    format!("{} hours", format_hours(hours))
}

/// One criterion per rubric area, with its share of the score.
pub fn evaluation_criteria(guide: &EvaluatorGuide) -> Vec<String> {
    guide
        .scoring_rubric
        .iter()
        .map(|item| format!("{} ({:.0}%)", item.area, item.weight * 100.0))
        .collect()
}

/// Splits the scope's estimated work into activity buckets against the budget.
///
/// Parts sum to `max(budget, work)`, so the breakdown is only valid when the
/// scope fits the budget (within tolerance).
pub fn time_breakdown(budget_minutes: u32, work_minutes: u64) -> TimeBreakdown {
    let work = work_minutes.min(u64::from(u32::MAX));
    let share = |percent: u64| work * percent / 100;
    let setup = share(SETUP_PERCENT);
    let testing = share(TESTING_PERCENT);
    let documentation = share(DOCUMENTATION_PERCENT);
    let core = work - setup - testing - documentation;
    let buffer = u64::from(budget_minutes).saturating_sub(work);
    // every part is bounded by `work` or `budget_minutes`, both within u32
    let minutes = |m: u64| u32::try_from(m).unwrap_or(u32::MAX);
    TimeBreakdown::from_parts(
        budget_minutes,
        minutes(setup),
        minutes(core),
        minutes(testing),
        minutes(documentation),
        minutes(buffer),
    )
}

/// Difficulty rises with seniority rank and with the time budget.
pub fn estimate_difficulty(request: &AssignmentRequest) -> Difficulty {
    let hours = request.time_budget_hours;
    let budget_band = if hours < 3.0 {
        0
    } else if hours < 5.0 {
        1
    } else if hours < 6.5 {
        2
    } else {
        3
    };
    match request.seniority_level.rank() + budget_band {
        0..=1 => Difficulty::Easy,
        2..=3 => Difficulty::Medium,
        _ => Difficulty::Hard,
    }
}
