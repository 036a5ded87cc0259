// Assignment generation pipeline.
// Implements: context extraction, scope drafting, scope validation, rubric
// generation and assembly, sequenced by the orchestrator.
// All model calls go through llm_client; nothing here talks to the provider.

pub mod assembler;
pub mod context_extractor;
pub mod orchestrator;
pub mod phases;
pub mod prompts;
pub mod rubric_builder;
pub mod scope_builder;
pub mod scope_validator;
