//! Quality gates: pure checks over each phase's typed output.
//!
//! Gates never repair or mutate what they inspect. They classify a draft as
//! pass / warn / fail and leave the retry-or-abort decision to the
//! orchestrator.

pub mod context_gate;
pub mod rubric_gate;
pub mod scope_gate;
pub mod seniority;

use serde::{Deserialize, Serialize};

pub use context_gate::check_context;
pub use rubric_gate::check_rubric;
pub use scope_gate::check_scope;
pub use seniority::check_seniority_fit;

/// Outcome of one gate call. `issues` are hard failures, `warnings` are
/// advisories that never block the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub passed: bool,
    pub issues: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    pub fn from_findings(issues: Vec<String>, warnings: Vec<String>) -> Self {
        Self {
            passed: issues.is_empty(),
            issues,
            warnings,
        }
    }

    /// Returns a new result with extra advisories appended.
    pub fn with_warnings(self, extra: impl IntoIterator<Item = String>) -> Self {
        let mut warnings = self.warnings;
        warnings.extend(extra);
        Self::from_findings(self.issues, warnings)
    }
}

/// Rounds a fraction to whole basis points so float noise from summing
/// decimal weights or dividing minutes cannot flip a boundary decision.
pub(crate) fn basis_points(value: f64) -> i64 {
    (value * 10_000.0).round() as i64
}
