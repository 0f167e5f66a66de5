use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Context, Result};

use crate::impact::CitationPolicy;
use crate::openalex::MAX_PAGE_SIZE;

const DEFAULT_OPENALEX_BASE_URL: &str = "https://api.openalex.org";

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub llm_api_key: String,
    pub openalex_base_url: String,
    pub openalex_mailto: Option<String>,
    pub impact_factor_csv: Option<PathBuf>,
    pub policy: CitationPolicy,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key → value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = CitationPolicy::default();
        let optional = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Config {
            llm_api_key: optional("LLM_API_KEY")
                .context("Required environment variable 'LLM_API_KEY' is not set")?,
            openalex_base_url: optional("OPENALEX_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OPENALEX_BASE_URL.to_string()),
            openalex_mailto: optional("OPENALEX_MAILTO"),
            impact_factor_csv: optional("IMPACT_FACTOR_CSV").map(PathBuf::from),
            policy: CitationPolicy {
                aggregate_page_size: page_size(&lookup, "AGGREGATE_PAGE_SIZE", defaults.aggregate_page_size)?,
                aggregate_max_pages: max_pages(&lookup, "AGGREGATE_MAX_PAGES", defaults.aggregate_max_pages)?,
                first_hop_page_size: page_size(&lookup, "FIRST_HOP_PAGE_SIZE", defaults.first_hop_page_size)?,
                first_hop_max_pages: max_pages(&lookup, "FIRST_HOP_MAX_PAGES", defaults.first_hop_max_pages)?,
                second_hop_page_size: page_size(&lookup, "SECOND_HOP_PAGE_SIZE", defaults.second_hop_page_size)?,
                second_hop_max_pages: max_pages(&lookup, "SECOND_HOP_MAX_PAGES", defaults.second_hop_max_pages)?,
            },
            port: parse_or(&lookup, "PORT", 8080)?,
            rust_log: optional("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

/// OpenAlex rejects `per-page` outside 1..=200.
fn page_size<F>(lookup: &F, key: &str, default: u32) -> Result<u32>
where
    F: Fn(&str) -> Option<String>,
{
    let value = parse_or(lookup, key, default)?;
    if value == 0 || value > MAX_PAGE_SIZE {
        bail!("Environment variable '{key}' must be between 1 and {MAX_PAGE_SIZE}, got {value}");
    }
    Ok(value)
}

fn max_pages<F>(lookup: &F, key: &str, default: u32) -> Result<u32>
where
    F: Fn(&str) -> Option<String>,
{
    let value = parse_or(lookup, key, default)?;
    if value == 0 {
        bail!("Environment variable '{key}' must be at least 1");
    }
    Ok(value)
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key).filter(|v| !v.trim().is_empty()) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has invalid value '{raw}'")),
        None => Ok(default),
    }
}
