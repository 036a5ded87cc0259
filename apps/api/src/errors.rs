use serde::Serialize;
use thiserror::Error;

/// Terminal failure of a generation run.
///
/// Transient provider conditions (rate limits, a single malformed response)
/// are absorbed inside the model client and the orchestrator; anything that
/// reaches this type is surfaced to the caller.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Invalid request: {}", .issues.join("; "))]
    InvalidRequest { issues: Vec<String> },

    #[error("Context extraction failed: {}", .issues.join("; "))]
    ContextExtraction { issues: Vec<String> },

    #[error("Scope generation failed: {0}")]
    ScopeGeneration(String),

    #[error("Scope validation failed: {}", .issues.join("; "))]
    ScopeValidation { issues: Vec<String> },

    #[error("Rubric generation failed: {}", .issues.join("; "))]
    RubricGeneration { issues: Vec<String> },

    #[error("Model provider unavailable: {0}")]
    Provider(String),

    #[error("Generation exceeded the {budget_secs}s time budget while {state}")]
    Timeout { budget_secs: u64, state: &'static str },

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Stable tag callers can branch on without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidRequest,
    ContextExtractionError,
    ScopeGenerationError,
    ScopeValidationError,
    RubricGenerationError,
    ProviderError,
    TimeoutError,
    InternalError,
}

/// Structured error handed back to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorReport {
    pub kind: ErrorKind,
    pub message: String,
    pub issues: Vec<String>,
    pub suggestions: Vec<String>,
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::InvalidRequest { .. } => ErrorKind::InvalidRequest,
            PipelineError::ContextExtraction { .. } => ErrorKind::ContextExtractionError,
            PipelineError::ScopeGeneration(_) => ErrorKind::ScopeGenerationError,
            PipelineError::ScopeValidation { .. } => ErrorKind::ScopeValidationError,
            PipelineError::RubricGeneration { .. } => ErrorKind::RubricGenerationError,
            PipelineError::Provider(_) => ErrorKind::ProviderError,
            PipelineError::Timeout { .. } => ErrorKind::TimeoutError,
            PipelineError::Internal(_) => ErrorKind::InternalError,
        }
    }

    /// The specific violated invariants, if the error carries any.
    pub fn issues(&self) -> &[String] {
        match self {
            PipelineError::InvalidRequest { issues }
            | PipelineError::ContextExtraction { issues }
            | PipelineError::ScopeValidation { issues }
            | PipelineError::RubricGeneration { issues } => issues,
            _ => &[],
        }
    }

    /// Actionable next steps for the caller, keyed by error kind and, for
    /// scope failures, by which invariant was violated.
    pub fn suggestions(&self) -> Vec<String> {
        let fixed: &[&str] = match self {
            PipelineError::InvalidRequest { .. } => &[
                "Correct the listed fields and submit again",
                "Keep the time budget between 2 and 8 hours",
            ],
            PipelineError::ContextExtraction { .. } => &[
                "Add more details about the role's responsibilities",
                "Include specific technical requirements or challenges",
                "Describe the team structure or project context",
            ],
            PipelineError::ScopeGeneration(_) => &[
                "Retry the generation, results vary between runs",
                "Simplify the must-evaluate list",
            ],
            PipelineError::ScopeValidation { .. } => &[
                "Retry the generation, results vary between runs",
                "Add more context in the job description to help scoping",
            ],
            PipelineError::RubricGeneration { .. } => &[
                "Retry the generation",
                "Reduce the number of must-evaluate items",
            ],
            PipelineError::Provider(_) => &[
                "Wait a moment and try again",
                "Check the model provider status and API credentials",
            ],
            PipelineError::Timeout { .. } => &[
                "Try again, the model provider may be slow right now",
                "Increase the pipeline timeout",
            ],
            PipelineError::Internal(_) => &[
                "Check that the request file exists and is readable",
                "Retry the request",
            ],
        };

        let mut suggestions: Vec<String> = Vec::new();
        if let PipelineError::ScopeValidation { issues } = self {
            if issues.iter().any(|i| i.starts_with("Time mismatch")) {
                suggestions.push("Adjust the time budget slightly (try +/- 30 minutes)".into());
            }
            if issues.iter().any(|i| i.contains("must-have")) {
                suggestions.push("Reduce the must-evaluate items".into());
            }
        }
        suggestions.extend(fixed.iter().map(|s| s.to_string()));
        suggestions
    }

    pub fn report(&self) -> ErrorReport {
        if let PipelineError::Internal(e) = self {
            tracing::error!("Internal error: {e:?}");
        }
        ErrorReport {
            kind: self.kind(),
            message: self.to_string(),
            issues: self.issues().to_vec(),
            suggestions: self.suggestions(),
        }
    }
}
