// Shared prompt fragments. Each service that needs LLM calls defines its own
// prompts.rs alongside it and reuses these.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You MUST respond with a single valid JSON object only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Fallback contract for inputs the model cannot assess.
pub const REFUSAL_INSTRUCTION: &str = "If the input cannot be analyzed, return exactly \
    {\"error\": \"Unable to process the input.\"}";
