//! Profile Assessor: turns an applicant profile into a typed `AssessmentReport`.
//!
//! The LLM backend sits behind the `ProfileAssessor` trait. `AppState` holds an
//! `Arc<dyn ProfileAssessor>` so the backend (or the lenient JSON extraction it
//! relies on) can be replaced without touching handlers.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use crate::assessment::prompts::{ASSESSMENT_PROMPT_TEMPLATE, ASSESSMENT_SYSTEM};
use crate::errors::AppError;
use crate::llm_client::prompts::{JSON_ONLY_SYSTEM, REFUSAL_INSTRUCTION};
use crate::llm_client::LlmClient;
use crate::models::assessment::{AssessmentReport, PublicationInput};

/// Request body for a profile assessment.
#[derive(Debug, Clone, Deserialize)]
pub struct AssessmentRequest {
    pub profile_text: String,
    #[serde(default)]
    pub publications: Vec<PublicationInput>,
}

#[async_trait]
pub trait ProfileAssessor: Send + Sync {
    async fn assess(&self, request: &AssessmentRequest) -> Result<AssessmentReport, AppError>;

    /// Backend label reported alongside results.
    fn backend(&self) -> &str;
}

pub struct LlmAssessor(pub LlmClient);

#[async_trait]
impl ProfileAssessor for LlmAssessor {
    async fn assess(&self, request: &AssessmentRequest) -> Result<AssessmentReport, AppError> {
        let prompt = build_user_prompt(request);
        let system = build_system_prompt();

        info!(
            "Requesting assessment ({} chars, {} publications)",
            request.profile_text.len(),
            request.publications.len()
        );

        let reply: Value = self
            .0
            .call_json(&prompt, &system)
            .await
            .map_err(|e| AppError::Llm(format!("Assessment failed: {e}")))?;

        interpret_reply(reply)
    }

    fn backend(&self) -> &str {
        crate::llm_client::MODEL
    }
}

pub fn build_system_prompt() -> String {
    ASSESSMENT_SYSTEM
        .replace("{json_only}", JSON_ONLY_SYSTEM)
        .replace("{refusal}", REFUSAL_INSTRUCTION)
}

pub fn build_user_prompt(request: &AssessmentRequest) -> String {
    let publications = render_publications(&request.publications);
    fill_template(
        ASSESSMENT_PROMPT_TEMPLATE,
        &[
            ("{profile_text}", request.profile_text.trim()),
            ("{publications}", publications.as_str()),
        ],
    )
}

/// Single left-to-right pass: substituted values are never rescanned, so
/// user text that looks like a placeholder is kept verbatim.
fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some((at, key, value)) = values
        .iter()
        .filter_map(|(key, value)| rest.find(key).map(|at| (at, *key, *value)))
        .min_by_key(|(at, _, _)| *at)
    {
        out.push_str(&rest[..at]);
        out.push_str(value);
        rest = &rest[at + key.len()..];
    }
    out.push_str(rest);
    out
}

fn render_publications(publications: &[PublicationInput]) -> String {
    if publications.is_empty() {
        return "(none listed separately)".to_string();
    }

    publications
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let mut line = format!("{}. {}", i + 1, p.title.trim());
            let venue_year = match (p.venue.as_deref(), p.year) {
                (Some(v), Some(y)) => Some(format!("{v}, {y}")),
                (Some(v), None) => Some(v.to_string()),
                (None, Some(y)) => Some(y.to_string()),
                (None, None) => None,
            };
            if let Some(vy) = venue_year {
                line.push_str(&format!(" ({vy})"));
            }
            if let Some(c) = p.citations {
                line.push_str(&format!("; citations: {c}"));
            }
            if let Some(f) = p.impact_factor {
                line.push_str(&format!("; impact factor: {f}"));
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// A reply carrying an `error` key is the model declining the input;
/// anything else must match the report schema.
pub fn interpret_reply(reply: Value) -> Result<AssessmentReport, AppError> {
    if let Some(err) = reply.get("error") {
        let message = err
            .as_str()
            .map(str::to_string)
            .unwrap_or_else(|| err.to_string());
        return Err(AppError::UnprocessableEntity(message));
    }

    serde_json::from_value(reply)
        .map_err(|e| AppError::Llm(format!("Assessment report did not match schema: {e}")))
}
