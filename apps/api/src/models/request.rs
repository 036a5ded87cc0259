use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::PipelineError;

pub const MIN_TIME_BUDGET_HOURS: f64 = 2.0;
pub const MAX_TIME_BUDGET_HOURS: f64 = 8.0;
pub const MAX_JOB_TITLE_CHARS: usize = 200;
pub const MIN_JOB_DESCRIPTION_CHARS: usize = 100;
pub const MAX_JOB_DESCRIPTION_CHARS: usize = 5000;

/// Ordinal seniority tier used to calibrate expected solution complexity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeniorityLevel {
    Junior,
    Mid,
    Senior,
    Staff,
}

impl SeniorityLevel {
    /// 0 for junior up to 3 for staff.
    pub fn rank(self) -> u8 {
        match self {
            SeniorityLevel::Junior => 0,
            SeniorityLevel::Mid => 1,
            SeniorityLevel::Senior => 2,
            SeniorityLevel::Staff => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SeniorityLevel::Junior => "junior",
            SeniorityLevel::Mid => "mid",
            SeniorityLevel::Senior => "senior",
            SeniorityLevel::Staff => "staff",
        }
    }
}

impl fmt::Display for SeniorityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the candidate hands in their solution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionFormat {
    #[default]
    Github,
    Zip,
    Codesandbox,
}

/// Caller-supplied input for one generation run. Immutable once accepted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentRequest {
    pub job_title: String,
    pub job_description: String,
    pub tech_stack: Vec<String>,
    pub time_budget_hours: f64,
    pub seniority_level: SeniorityLevel,
    #[serde(default)]
    pub company_context: Option<String>,
    #[serde(default)]
    pub current_challenges: Option<String>,
    #[serde(default)]
    pub must_evaluate: BTreeSet<String>,
    #[serde(default)]
    pub avoid_topics: BTreeSet<String>,
    /// Libraries and frameworks the candidate is explicitly allowed to use.
    #[serde(default)]
    pub candidate_can_use: Option<Vec<String>>,
    #[serde(default)]
    pub submission_format: SubmissionFormat,
}

impl AssignmentRequest {
    /// Parses a request document. Shape errors (bad JSON, a missing field,
    /// an unknown seniority level) surface as `InvalidRequest`.
    pub fn from_json(raw: &str) -> Result<Self, PipelineError> {
        serde_json::from_str(raw).map_err(|e| PipelineError::InvalidRequest {
            issues: vec![e.to_string()],
        })
    }

    pub fn budget_minutes(&self) -> f64 {
        self.time_budget_hours * 60.0
    }

    /// Structural checks run before any model call. Collects every problem
    /// instead of stopping at the first one.
    pub fn validate(&self) -> Result<(), PipelineError> {
        let mut issues = Vec::new();

        let title_len = self.job_title.trim().chars().count();
        if title_len == 0 {
            issues.push("job_title cannot be empty".to_string());
        } else if title_len > MAX_JOB_TITLE_CHARS {
            issues.push(format!(
                "job_title is {title_len} characters, maximum is {MAX_JOB_TITLE_CHARS}"
            ));
        }

        let description_len = self.job_description.trim().chars().count();
        if description_len < MIN_JOB_DESCRIPTION_CHARS {
            issues.push(format!(
                "job_description is {description_len} characters, minimum is {MIN_JOB_DESCRIPTION_CHARS}"
            ));
        } else if description_len > MAX_JOB_DESCRIPTION_CHARS {
            issues.push(format!(
                "job_description is {description_len} characters, maximum is {MAX_JOB_DESCRIPTION_CHARS}"
            ));
        }

        if self.tech_stack.is_empty() {
            issues.push("tech_stack must list at least one technology".to_string());
        } else if self.tech_stack.iter().any(|t| t.trim().is_empty()) {
            issues.push("tech_stack contains a blank entry".to_string());
        }

        if !self.time_budget_hours.is_finite()
            || self.time_budget_hours < MIN_TIME_BUDGET_HOURS
            || self.time_budget_hours > MAX_TIME_BUDGET_HOURS
        {
            issues.push(format!(
                "time_budget_hours must be between {MIN_TIME_BUDGET_HOURS} and {MAX_TIME_BUDGET_HOURS}, got {}",
                self.time_budget_hours
            ));
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(PipelineError::InvalidRequest { issues })
        }
    }
}
