//! Bibliographic data access.
//!
//! Everything that talks to OpenAlex goes through [`CitationSource`] so the
//! impact pipelines can be driven by a scripted source in tests.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::work::Work;

pub mod client;
#[cfg(test)]
pub mod fake;

pub use client::OpenAlexClient;

/// Cursor value that starts a fresh cursor-paginated walk.
pub const INITIAL_CURSOR: &str = "*";

/// Upper bound OpenAlex accepts for `per-page`.
pub const MAX_PAGE_SIZE: u32 = 200;

#[derive(Debug, Error)]
pub enum CitationError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("OpenAlex API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid citation request: {0}")]
    InvalidRequest(String),
}

/// One page of works citing a given work.
#[derive(Debug, Clone, Default)]
pub struct CitingPage {
    pub works: Vec<Work>,
    /// Absent or empty when there are no more results.
    pub next_cursor: Option<String>,
}

#[async_trait]
pub trait CitationSource: Send + Sync {
    /// Fetches a single page of works whose reference list includes `work_id`.
    async fn fetch_citing_page(
        &self,
        work_id: &str,
        per_page: u32,
        cursor: &str,
    ) -> Result<CitingPage, CitationError>;
}
