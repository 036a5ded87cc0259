//! The model-backed steps of the pipeline, behind one trait so the
//! orchestrator can be driven by scripted phases in tests.
//!
//! Carried by `Orchestrator` as `Arc<dyn AssignmentPhases>`.

use async_trait::async_trait;

use crate::generation::{context_extractor, rubric_builder, scope_builder};
use crate::llm_client::{LlmError, ModelClient};
use crate::models::assignment::{AssignmentScope, EvaluatorGuide, JobContext};
use crate::models::request::AssignmentRequest;

/// What a rejected draft got wrong, fed into the single regeneration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Correction {
    /// Gate issues from the rejected draft, verbatim.
    pub violations: Vec<String>,
    /// Concrete targets the next draft must hit.
    pub directives: Vec<String>,
}

impl Correction {
    pub fn render(&self) -> String {
        let mut out = String::from("CORRECTION: your previous draft was rejected.\nViolations:\n");
        for violation in &self.violations {
            out.push_str(&format!("- {violation}\n"));
        }
        out.push_str("The new draft MUST satisfy:");
        for directive in &self.directives {
            out.push_str(&format!("\n- {directive}"));
        }
        out
    }
}

#[async_trait]
pub trait AssignmentPhases: Send + Sync {
    /// Phase 1: raw job text to structured context.
    async fn extract_context(&self, request: &AssignmentRequest) -> Result<JobContext, LlmError>;

    /// Phase 2: one scope draft, optionally correcting a rejected one.
    async fn draft_scope(
        &self,
        context: &JobContext,
        request: &AssignmentRequest,
        correction: Option<&Correction>,
    ) -> Result<AssignmentScope, LlmError>;

    /// Phase 4: rubric and evaluator notes for an accepted scope.
    async fn build_rubric(
        &self,
        scope: &AssignmentScope,
        request: &AssignmentRequest,
        correction: Option<&Correction>,
    ) -> Result<EvaluatorGuide, LlmError>;
}

/// Production phases: every step is one structured call on the shared client.
pub struct LlmPhases {
    client: ModelClient,
}

impl LlmPhases {
    pub fn new(client: ModelClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AssignmentPhases for LlmPhases {
    async fn extract_context(&self, request: &AssignmentRequest) -> Result<JobContext, LlmError> {
        context_extractor::extract_context(&self.client, request).await
    }

    async fn draft_scope(
        &self,
        context: &JobContext,
        request: &AssignmentRequest,
        correction: Option<&Correction>,
    ) -> Result<AssignmentScope, LlmError> {
        scope_builder::draft_scope(&self.client, context, request, correction).await
    }

    async fn build_rubric(
        &self,
        scope: &AssignmentScope,
        request: &AssignmentRequest,
        correction: Option<&Correction>,
    ) -> Result<EvaluatorGuide, LlmError> {
        rubric_builder::build_rubric(&self.client, scope, request, correction).await
    }
}
