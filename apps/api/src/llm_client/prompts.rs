// Shared prompt constants and prompt-building utilities.
// Each phase defines its own templates in generation/prompts.rs.
// This file contains cross-cutting prompt fragments.

use super::ResponseSchema;

/// System prompt that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Appended to every phase prompt.
pub const JSON_REMINDER: &str =
    "IMPORTANT: Return ONLY valid JSON, no markdown formatting, no explanation.";

/// Rebuilds a prompt after the model returned output that did not parse.
/// The original instructions stay first; the contract is restated verbatim.
pub fn reinforce_contract(prompt: &str, schema: &ResponseSchema, parse_error: &str) -> String {
    format!(
        "{prompt}\n\n\
        CORRECTION: your previous reply could not be parsed as {name} ({parse_error}).\n\
        Reply again with a single JSON object matching EXACTLY this structure, \
        with every key present and no extra text:\n{contract}",
        name = schema.name,
        contract = schema.contract,
    )
}
