use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Allowed drift, in minutes, between the breakdown parts and the total.
pub const BREAKDOWN_TOLERANCE_MINUTES: u32 = 5;

// ────────────────────────────────────────────────────────────────────────────
// Phase outputs
// ────────────────────────────────────────────────────────────────────────────

/// Phase 1 output: what the role actually does day to day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobContext {
    pub responsibilities: Vec<String>,
    pub business_domain: String,
    #[serde(default)]
    pub daily_technologies: Vec<String>,
    #[serde(default)]
    pub collaboration_patterns: Option<String>,
}

/// One unit of work in the assignment, used for both must-have and
/// nice-to-have lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Requirement {
    pub description: String,
    pub estimated_time_minutes: u32,
    /// Ties the requirement back to a real job responsibility.
    pub why_it_matters: String,
}

/// Phase 2 output. The model answers with `*_requirements` keys, the
/// artifact uses the short names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentScope {
    pub title: String,
    pub business_context: String,
    #[serde(alias = "must_have_requirements")]
    pub must_have: Vec<Requirement>,
    #[serde(default, alias = "nice_to_have_requirements")]
    pub nice_to_have: Vec<Requirement>,
    #[serde(default)]
    pub constraints: Vec<String>,
}

impl AssignmentScope {
    pub fn all_requirements(&self) -> impl Iterator<Item = &Requirement> {
        self.must_have.iter().chain(self.nice_to_have.iter())
    }

    pub fn must_have_minutes(&self) -> u64 {
        self.must_have
            .iter()
            .map(|r| u64::from(r.estimated_time_minutes))
            .sum()
    }

    pub fn total_minutes(&self) -> u64 {
        self.all_requirements()
            .map(|r| u64::from(r.estimated_time_minutes))
            .sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RubricItem {
    pub area: String,
    /// Share of the final score, 0.0 – 1.0.
    pub weight: f64,
    #[serde(default)]
    pub junior_expectation: String,
    #[serde(default)]
    pub mid_expectation: String,
    #[serde(default)]
    pub senior_expectation: String,
    /// How to assign a 1–5 score for this area.
    pub scoring_guide: String,
}

/// Phase 4 output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluatorGuide {
    pub scoring_rubric: Vec<RubricItem>,
    #[serde(default)]
    pub common_pitfalls: Vec<String>,
    #[serde(default)]
    pub red_flags: Vec<String>,
    #[serde(default)]
    pub green_flags: Vec<String>,
    #[serde(default)]
    pub calibration_notes: String,
}

impl EvaluatorGuide {
    pub fn weight_sum(&self) -> f64 {
        self.scoring_rubric.iter().map(|item| item.weight).sum()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Final artifact
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeBreakdown {
    pub total_minutes: u32,
    pub setup_minutes: u32,
    pub core_implementation_minutes: u32,
    pub testing_minutes: u32,
    pub documentation_minutes: u32,
    pub buffer_minutes: u32,
    pub breakdown_valid: bool,
}

impl TimeBreakdown {
    /// Builds a breakdown and derives `breakdown_valid` from the parts.
    pub fn from_parts(
        total_minutes: u32,
        setup_minutes: u32,
        core_implementation_minutes: u32,
        testing_minutes: u32,
        documentation_minutes: u32,
        buffer_minutes: u32,
    ) -> Self {
        let parts: u64 = [
            setup_minutes,
            core_implementation_minutes,
            testing_minutes,
            documentation_minutes,
            buffer_minutes,
        ]
        .into_iter()
        .map(u64::from)
        .sum();
        Self {
            total_minutes,
            setup_minutes,
            core_implementation_minutes,
            testing_minutes,
            documentation_minutes,
            buffer_minutes,
            breakdown_valid: parts.abs_diff(u64::from(total_minutes))
                <= u64::from(BREAKDOWN_TOLERANCE_MINUTES),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Requirements {
    pub must_have: Vec<Requirement>,
    pub nice_to_have: Vec<Requirement>,
    pub constraints: Vec<String>,
}

/// The part of the artifact handed to candidates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateBrief {
    pub title: String,
    pub business_context: String,
    pub requirements: Requirements,
    pub submission_guidelines: String,
    pub evaluation_criteria: Vec<String>,
    pub time_estimate: String,
}

/// Everything produced by one successful pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedAssignment {
    pub candidate_brief: CandidateBrief,
    pub evaluator_guide: EvaluatorGuide,
    pub time_breakdown: TimeBreakdown,
    pub job_context: JobContext,
    pub assignment_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub estimated_difficulty: Difficulty,
    pub scope_warnings: Vec<String>,
}
