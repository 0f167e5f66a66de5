mod assessment;
mod config;
mod errors;
mod impact;
mod llm_client;
mod models;
mod openalex;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::assessment::assessor::LlmAssessor;
use crate::config::Config;
use crate::impact::scoring::ImpactFactorTable;
use crate::llm_client::LlmClient;
use crate::openalex::OpenAlexClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Impact API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client
    let llm = LlmClient::new(config.llm_api_key.clone())?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    // Initialize OpenAlex client
    let openalex = OpenAlexClient::new(
        config.openalex_base_url.clone(),
        config.openalex_mailto.clone(),
    )?;
    info!(
        "OpenAlex client initialized ({}, polite pool: {})",
        config.openalex_base_url,
        config.openalex_mailto.is_some()
    );

    // Impact factor table is optional; the prestige-venue fallback covers its absence
    let impact_factors = match &config.impact_factor_csv {
        Some(path) => {
            let table = ImpactFactorTable::from_csv_path(path)?;
            info!("Loaded {} impact factors from {}", table.len(), path.display());
            table
        }
        None => {
            info!("No impact factor table configured");
            ImpactFactorTable::default()
        }
    };

    info!("Citation policy: {:?}", config.policy);

    // Build app state
    let state = AppState {
        config: config.clone(),
        assessor: Arc::new(LlmAssessor(llm)),
        citations: Arc::new(openalex.clone()),
        openalex,
        impact_factors: Arc::new(impact_factors),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict CORS to the form's origin once it is deployed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
