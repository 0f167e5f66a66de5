// Petition profile assessment: prompt building, LLM call, report extraction.
// All LLM calls go through llm_client.

pub mod assessor;
pub mod handlers;
pub mod prompts;
