use std::sync::Arc;

use crate::assessment::assessor::ProfileAssessor;
use crate::config::Config;
use crate::impact::scoring::ImpactFactorTable;
use crate::openalex::{CitationSource, OpenAlexClient};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Pluggable assessor. Default: LlmAssessor over the shared LLM client.
    pub assessor: Arc<dyn ProfileAssessor>,
    /// Citation walks go through the trait so tests can script them.
    pub citations: Arc<dyn CitationSource>,
    /// Seed-work lookup by DOI or title.
    pub openalex: OpenAlexClient,
    /// Read-only after startup; empty when no table is configured.
    pub impact_factors: Arc<ImpactFactorTable>,
}
