//! Orchestrator: sequences the four phases for one run.
//!
//! Flow: validate request → Extracting → ScopingDraft ⇄ Validating →
//!       RubricBuilding → Assembling → Done.
//!
//! Each gate failure is recovered at most once with a fresh, corrected model
//! call. The whole run sits under a wall-clock budget; when it expires the
//! in-flight call is dropped and the error names the state the run was in.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::errors::{ErrorKind, PipelineError};
use crate::generation::assembler::assemble;
use crate::generation::phases::{AssignmentPhases, Correction};
use crate::generation::rubric_builder::{rubric_correction, validate_rubric};
use crate::generation::scope_validator::{scope_correction, validate_scope};
use crate::llm_client::LlmError;
use crate::models::assignment::{AssignmentScope, EvaluatorGuide, GeneratedAssignment, JobContext};
use crate::models::request::AssignmentRequest;
use crate::quality::{check_context, ValidationResult};

/// Drafts per gated phase: the first attempt plus one regeneration.
const MAX_DRAFTS_PER_PHASE: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Extracting,
    ScopingDraft,
    Validating,
    RubricBuilding,
    Assembling,
    Done,
    /// Terminal; carries the kind of error the run ended with.
    Failed(ErrorKind),
}

impl PipelineState {
    pub fn as_str(self) -> &'static str {
        match self {
            PipelineState::Extracting => "extracting",
            PipelineState::ScopingDraft => "scoping_draft",
            PipelineState::Validating => "validating",
            PipelineState::RubricBuilding => "rubric_building",
            PipelineState::Assembling => "assembling",
            PipelineState::Done => "done",
            PipelineState::Failed(_) => "failed",
        }
    }
}

/// Per-run bookkeeping. Never shared between runs.
#[derive(Debug)]
struct PipelineRun {
    state: PipelineState,
}

impl PipelineRun {
    fn new() -> Self {
        Self {
            state: PipelineState::Extracting,
        }
    }

    fn enter(&mut self, next: PipelineState) {
        match next {
            PipelineState::Failed(kind) => {
                warn!("Pipeline {} → failed ({kind:?})", self.state.as_str())
            }
            _ => info!("Pipeline {} → {}", self.state.as_str(), next.as_str()),
        }
        self.state = next;
    }
}

#[derive(Clone)]
pub struct Orchestrator {
    phases: Arc<dyn AssignmentPhases>,
    timeout: Duration,
}

impl Orchestrator {
    pub fn new(phases: Arc<dyn AssignmentPhases>, timeout: Duration) -> Self {
        Self { phases, timeout }
    }

    /// Runs the full pipeline and returns the assembled assignment.
    pub async fn run(
        &self,
        request: &AssignmentRequest,
    ) -> Result<GeneratedAssignment, PipelineError> {
        request.validate()?;
        info!(
            "Generating {} assignment for '{}' ({}h budget)",
            request.seniority_level, request.job_title, request.time_budget_hours
        );

        let mut run = PipelineRun::new();
        let outcome = tokio::time::timeout(self.timeout, self.execute(request, &mut run)).await;
        self.finish(&mut run, outcome)
    }

    /// Runs phases 1–3 once, without regeneration, and returns the scope
    /// gate's verdict so a caller can check an input before a full run.
    pub async fn preview_scope(
        &self,
        request: &AssignmentRequest,
    ) -> Result<ValidationResult, PipelineError> {
        request.validate()?;
        info!("Previewing scope for '{}'", request.job_title);

        let mut run = PipelineRun::new();
        let outcome = tokio::time::timeout(self.timeout, self.preview(request, &mut run)).await;
        self.finish(&mut run, outcome)
    }

    fn finish<T>(
        &self,
        run: &mut PipelineRun,
        outcome: Result<Result<T, PipelineError>, tokio::time::error::Elapsed>,
    ) -> Result<T, PipelineError> {
        match outcome {
            Ok(Ok(value)) => {
                run.enter(PipelineState::Done);
                Ok(value)
            }
            Ok(Err(e)) => {
                warn!("Pipeline failed while {}: {e}", run.state.as_str());
                run.enter(PipelineState::Failed(e.kind()));
                Err(e)
            }
            Err(_) => {
                let state = run.state.as_str();
                warn!(
                    "Pipeline exceeded {}s budget while {state}",
                    self.timeout.as_secs()
                );
                run.enter(PipelineState::Failed(ErrorKind::TimeoutError));
                Err(PipelineError::Timeout {
                    budget_secs: self.timeout.as_secs(),
                    state,
                })
            }
        }
    }

    async fn execute(
        &self,
        request: &AssignmentRequest,
        run: &mut PipelineRun,
    ) -> Result<GeneratedAssignment, PipelineError> {
        let context = self.extract(request, run).await?;
        let (scope, scope_result) = self.scope(&context, request, run).await?;
        let guide = self.rubric(&scope, request, run).await?;

        run.enter(PipelineState::Assembling);
        let assignment = assemble(request, context, scope, guide, scope_result.warnings);
        info!(
            "Assembled assignment {} ({:?}, {} warning(s))",
            assignment.assignment_id,
            assignment.estimated_difficulty,
            assignment.scope_warnings.len()
        );
        Ok(assignment)
    }

    async fn preview(
        &self,
        request: &AssignmentRequest,
        run: &mut PipelineRun,
    ) -> Result<ValidationResult, PipelineError> {
        let context = self.extract(request, run).await?;
        run.enter(PipelineState::ScopingDraft);
        let scope = self
            .phases
            .draft_scope(&context, request, None)
            .await
            .map_err(scope_generation_error)?;
        run.enter(PipelineState::Validating);
        Ok(validate_scope(&scope, request))
    }

    // ────────────────────────────────────────────────────────────────────────
    // Phases
    // ────────────────────────────────────────────────────────────────────────

    async fn extract(
        &self,
        request: &AssignmentRequest,
        run: &mut PipelineRun,
    ) -> Result<JobContext, PipelineError> {
        run.enter(PipelineState::Extracting);
        let context = self
            .phases
            .extract_context(request)
            .await
            .map_err(|e| match e {
                LlmError::Provider(message) => PipelineError::Provider(message),
                malformed => PipelineError::ContextExtraction {
                    issues: vec![malformed.to_string()],
                },
            })?;

        let result = check_context(&context);
        for warning in &result.warnings {
            warn!("Context: {warning}");
        }
        if !result.passed {
            return Err(PipelineError::ContextExtraction {
                issues: result.issues,
            });
        }
        Ok(context)
    }

    async fn scope(
        &self,
        context: &JobContext,
        request: &AssignmentRequest,
        run: &mut PipelineRun,
    ) -> Result<(AssignmentScope, ValidationResult), PipelineError> {
        let mut correction: Option<Correction> = None;
        let mut drafts = 0;
        loop {
            drafts += 1;
            run.enter(PipelineState::ScopingDraft);
            let scope = self
                .phases
                .draft_scope(context, request, correction.as_ref())
                .await
                .map_err(scope_generation_error)?;

            run.enter(PipelineState::Validating);
            let result = validate_scope(&scope, request);
            if result.passed {
                return Ok((scope, result));
            }
            if drafts >= MAX_DRAFTS_PER_PHASE {
                return Err(PipelineError::ScopeValidation {
                    issues: result.issues,
                });
            }
            warn!("Scope draft {drafts} rejected, regenerating once with corrections");
            correction = Some(scope_correction(&result, request));
        }
    }

    async fn rubric(
        &self,
        scope: &AssignmentScope,
        request: &AssignmentRequest,
        run: &mut PipelineRun,
    ) -> Result<EvaluatorGuide, PipelineError> {
        run.enter(PipelineState::RubricBuilding);
        let mut correction: Option<Correction> = None;
        let mut drafts = 0;
        loop {
            drafts += 1;
            let guide = self
                .phases
                .build_rubric(scope, request, correction.as_ref())
                .await
                .map_err(|e| match e {
                    LlmError::Provider(message) => PipelineError::Provider(message),
                    malformed => PipelineError::RubricGeneration {
                        issues: vec![malformed.to_string()],
                    },
                })?;

            let result = validate_rubric(&guide);
            if result.passed {
                return Ok(guide);
            }
            if drafts >= MAX_DRAFTS_PER_PHASE {
                return Err(PipelineError::RubricGeneration {
                    issues: result.issues,
                });
            }
            warn!("Rubric draft {drafts} rejected, regenerating once with corrections");
            correction = Some(rubric_correction(&result));
        }
    }
}

fn scope_generation_error(e: LlmError) -> PipelineError {
    match e {
        LlmError::Provider(message) => PipelineError::Provider(message),
        malformed => PipelineError::ScopeGeneration(malformed.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::generation::phases::LlmPhases;
    use crate::llm_client::backoff::BackoffPolicy;
    use crate::llm_client::testing::{client_with, ScriptedTransport};
    use crate::models::assignment::Difficulty;
    use crate::models::request::SeniorityLevel;
    use crate::test_support::{
        requirement, rubric_with_weights, sample_context, sample_request, scope_with_minutes,
    };

    /// Scripted phases. Scope and rubric scripts replay in order and repeat
    /// their last entry once exhausted.
    struct StubPhases {
        context: Result<JobContext, LlmError>,
        scopes: Vec<Result<AssignmentScope, LlmError>>,
        guides: Vec<EvaluatorGuide>,
        scope_delay: Duration,
        context_calls: AtomicUsize,
        scope_calls: AtomicUsize,
        rubric_calls: AtomicUsize,
        corrections: Mutex<Vec<Option<Correction>>>,
    }

    impl StubPhases {
        fn new(scopes: Vec<AssignmentScope>, guides: Vec<EvaluatorGuide>) -> Self {
            Self {
                context: Ok(sample_context()),
                scopes: scopes.into_iter().map(Ok).collect(),
                guides,
                scope_delay: Duration::ZERO,
                context_calls: AtomicUsize::new(0),
                scope_calls: AtomicUsize::new(0),
                rubric_calls: AtomicUsize::new(0),
                corrections: Mutex::new(Vec::new()),
            }
        }

        fn scope_calls(&self) -> usize {
            self.scope_calls.load(Ordering::SeqCst)
        }

        fn rubric_calls(&self) -> usize {
            self.rubric_calls.load(Ordering::SeqCst)
        }
    }

    fn nth<T: Clone>(script: &[T], n: usize) -> T {
        script[n.min(script.len() - 1)].clone()
    }

    #[async_trait]
    impl AssignmentPhases for StubPhases {
        async fn extract_context(&self, _: &AssignmentRequest) -> Result<JobContext, LlmError> {
            self.context_calls.fetch_add(1, Ordering::SeqCst);
            self.context.clone()
        }

        async fn draft_scope(
            &self,
            _: &JobContext,
            _: &AssignmentRequest,
            correction: Option<&Correction>,
        ) -> Result<AssignmentScope, LlmError> {
            let n = self.scope_calls.fetch_add(1, Ordering::SeqCst);
            self.corrections.lock().unwrap().push(correction.cloned());
            if !self.scope_delay.is_zero() {
                tokio::time::sleep(self.scope_delay).await;
            }
            nth(&self.scopes, n)
        }

        async fn build_rubric(
            &self,
            _: &AssignmentScope,
            _: &AssignmentRequest,
            _: Option<&Correction>,
        ) -> Result<EvaluatorGuide, LlmError> {
            let n = self.rubric_calls.fetch_add(1, Ordering::SeqCst);
            Ok(nth(&self.guides, n))
        }
    }

    fn guide(weights: &[f64]) -> EvaluatorGuide {
        EvaluatorGuide {
            scoring_rubric: rubric_with_weights(weights),
            common_pitfalls: vec!["Ignoring idempotency".into()],
            red_flags: vec!["No tests at all".into()],
            green_flags: vec!["Documents trade-offs".into()],
            calibration_notes: "Reward justified decisions.".into(),
        }
    }

    fn good_scope() -> AssignmentScope {
        let mut scope = scope_with_minutes(&[45, 45, 40, 40, 40], &[30]);
        scope.must_have[0] = requirement("Design an idempotent payroll ingestion endpoint", 45);
        scope
    }

    fn good_guide() -> EvaluatorGuide {
        guide(&[0.25, 0.20, 0.20, 0.15, 0.20])
    }

    fn orchestrator(phases: Arc<StubPhases>) -> Orchestrator {
        Orchestrator::new(phases, Duration::from_secs(120))
    }

    fn senior_request() -> AssignmentRequest {
        sample_request(4.0, SeniorityLevel::Senior)
    }

    #[tokio::test]
    async fn test_happy_path_assembles_assignment() {
        let phases = Arc::new(StubPhases::new(vec![good_scope()], vec![good_guide()]));
        let assignment = orchestrator(phases.clone())
            .run(&senior_request())
            .await
            .unwrap();

        assert_eq!(phases.scope_calls(), 1);
        assert_eq!(phases.rubric_calls(), 1);
        assert_eq!(assignment.candidate_brief.title, "Payroll Run Review Service");
        assert_eq!(assignment.candidate_brief.time_estimate, "4 hours");
        assert_eq!(assignment.candidate_brief.evaluation_criteria.len(), 5);
        assert!(assignment.time_breakdown.breakdown_valid);
        assert_eq!(assignment.estimated_difficulty, Difficulty::Medium);
        assert!(assignment.scope_warnings.is_empty());
        assert_eq!(assignment.job_context, sample_context());
    }

    #[tokio::test]
    async fn test_scope_warnings_are_carried_forward() {
        // Passes the gate, but no requirement exercises design trade-offs.
        let scope = scope_with_minutes(&[45, 45, 40, 40, 40], &[30]);
        let phases = Arc::new(StubPhases::new(vec![scope], vec![good_guide()]));
        let assignment = orchestrator(phases).run(&senior_request()).await.unwrap();
        assert_eq!(assignment.scope_warnings.len(), 1);
        assert!(assignment.scope_warnings[0].contains("trade-offs"));
    }

    #[tokio::test]
    async fn test_persistent_time_mismatch_fails_after_two_drafts() {
        let short = scope_with_minutes(&[30, 30, 20], &[20]);
        let phases = Arc::new(StubPhases::new(vec![short], vec![good_guide()]));
        let err = orchestrator(phases.clone())
            .run(&senior_request())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ScopeValidationError);
        assert!(err.issues()[0].to_lowercase().contains("time mismatch"));
        assert_eq!(phases.scope_calls(), 2);
        assert_eq!(phases.rubric_calls(), 0);

        let corrections = phases.corrections.lock().unwrap();
        assert!(corrections[0].is_none());
        let second = corrections[1].as_ref().unwrap();
        assert!(second.directives[0].contains("closer to 240 minutes"));
    }

    #[tokio::test]
    async fn test_scope_recovers_on_regeneration() {
        let short = scope_with_minutes(&[30, 30, 20], &[20]);
        let phases = Arc::new(StubPhases::new(vec![short, good_scope()], vec![good_guide()]));
        let assignment = orchestrator(phases.clone()).run(&senior_request()).await;
        assert!(assignment.is_ok());
        assert_eq!(phases.scope_calls(), 2);
    }

    #[tokio::test]
    async fn test_thin_context_fails_without_scope_call() {
        let mut phases = StubPhases::new(vec![good_scope()], vec![good_guide()]);
        let mut context = sample_context();
        context.responsibilities.truncate(2);
        phases.context = Ok(context);
        let phases = Arc::new(phases);

        let err = orchestrator(phases.clone())
            .run(&senior_request())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ContextExtractionError);
        assert!(err.issues()[0].contains("Insufficient responsibilities"));
        assert_eq!(phases.scope_calls(), 0);
    }

    #[tokio::test]
    async fn test_malformed_context_is_context_error() {
        let mut phases = StubPhases::new(vec![good_scope()], vec![good_guide()]);
        phases.context = Err(LlmError::MalformedOutput {
            schema: "job context",
            detail: "expected value".into(),
        });
        let err = orchestrator(Arc::new(phases))
            .run(&senior_request())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ContextExtractionError);
    }

    #[tokio::test]
    async fn test_malformed_scope_is_scope_generation_error() {
        let mut phases = StubPhases::new(vec![], vec![good_guide()]);
        phases.scopes = vec![Err(LlmError::MalformedOutput {
            schema: "assignment scope",
            detail: "missing field `title`".into(),
        })];
        let phases = Arc::new(phases);
        let err = orchestrator(phases.clone())
            .run(&senior_request())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ScopeGenerationError);
        assert_eq!(phases.scope_calls(), 1);
    }

    #[tokio::test]
    async fn test_provider_failure_surfaces_as_provider_error() {
        let mut phases = StubPhases::new(vec![good_scope()], vec![good_guide()]);
        phases.context = Err(LlmError::Provider("Rate limited after 3 attempts".into()));
        let err = orchestrator(Arc::new(phases))
            .run(&senior_request())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ProviderError);
    }

    #[tokio::test]
    async fn test_rubric_regenerated_once_then_accepted() {
        let phases = Arc::new(StubPhases::new(
            vec![good_scope()],
            vec![guide(&[0.25, 0.20, 0.20, 0.15, 0.21]), good_guide()],
        ));
        let assignment = orchestrator(phases.clone()).run(&senior_request()).await;
        assert!(assignment.is_ok());
        assert_eq!(phases.rubric_calls(), 2);
    }

    #[tokio::test]
    async fn test_persistent_bad_rubric_fails() {
        let phases = Arc::new(StubPhases::new(
            vec![good_scope()],
            vec![guide(&[0.25, 0.20, 0.20, 0.15, 0.21])],
        ));
        let err = orchestrator(phases.clone())
            .run(&senior_request())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RubricGenerationError);
        assert!(err.issues()[0].contains("1.010"));
        assert_eq!(phases.rubric_calls(), 2);
    }

    #[tokio::test]
    async fn test_invalid_request_makes_no_model_calls() {
        let phases = Arc::new(StubPhases::new(vec![good_scope()], vec![good_guide()]));
        let err = orchestrator(phases.clone())
            .run(&sample_request(1.5, SeniorityLevel::Senior))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRequest);
        assert_eq!(phases.context_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_names_the_stalled_state() {
        let mut phases = StubPhases::new(vec![good_scope()], vec![good_guide()]);
        phases.scope_delay = Duration::from_secs(300);
        let err = orchestrator(Arc::new(phases))
            .run(&senior_request())
            .await
            .unwrap_err();

        match err {
            PipelineError::Timeout { budget_secs, state } => {
                assert_eq!(budget_secs, 120);
                assert_eq!(state, PipelineState::ScopingDraft.as_str());
            }
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_state_records_error_kind() {
        let orch = orchestrator(Arc::new(StubPhases::new(vec![], vec![])));

        let mut run = PipelineRun::new();
        run.enter(PipelineState::RubricBuilding);
        let outcome: Result<Result<(), PipelineError>, _> =
            Ok(Err(PipelineError::Provider("503".into())));
        assert!(orch.finish(&mut run, outcome).is_err());
        assert_eq!(run.state, PipelineState::Failed(ErrorKind::ProviderError));
        assert_eq!(run.state.as_str(), "failed");

        let mut stalled = PipelineRun::new();
        let elapsed = tokio::time::timeout(Duration::from_millis(1), std::future::pending::<()>())
            .await
            .unwrap_err();
        let outcome: Result<Result<(), PipelineError>, _> = Err(elapsed);
        let err = orch.finish(&mut stalled, outcome).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TimeoutError);
        assert_eq!(stalled.state, PipelineState::Failed(ErrorKind::TimeoutError));

        let mut done = PipelineRun::new();
        assert!(orch.finish(&mut done, Ok(Ok(()))).is_ok());
        assert_eq!(done.state, PipelineState::Done);
    }

    #[tokio::test]
    async fn test_preview_returns_verdict_without_regenerating() {
        let short = scope_with_minutes(&[30, 30, 20], &[20]);
        let phases = Arc::new(StubPhases::new(vec![short], vec![good_guide()]));
        let result = orchestrator(phases.clone())
            .preview_scope(&senior_request())
            .await
            .unwrap();
        assert!(!result.passed);
        assert_eq!(phases.scope_calls(), 1);
        assert_eq!(phases.rubric_calls(), 0);
    }

    #[tokio::test]
    async fn test_end_to_end_through_model_client() {
        let context = serde_json::to_string(&sample_context()).unwrap();
        let scope = serde_json::to_string(&good_scope()).unwrap();
        let rubric = serde_json::to_string(&good_guide()).unwrap();
        let transport = ScriptedTransport::new(vec![
            Ok(context),
            Ok(format!("```json\n{scope}\n```")),
            Ok(format!("Here is the rubric:\n{rubric}")),
        ]);
        let client = client_with(transport.clone(), BackoffPolicy::immediate(3));
        let orchestrator =
            Orchestrator::new(Arc::new(LlmPhases::new(client)), Duration::from_secs(120));

        let assignment = orchestrator.run(&senior_request()).await.unwrap();
        assert_eq!(transport.calls(), 3);
        assert_eq!(assignment.evaluator_guide, good_guide());
        assert_eq!(
            assignment.candidate_brief.requirements.must_have,
            good_scope().must_have
        );
    }
}
