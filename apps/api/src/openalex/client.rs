//! OpenAlex REST client.
//!
//! Transport-level retry lives here and only here: a page is retried on 429,
//! 5xx and connection failures, and the last error is surfaced once the
//! attempts are exhausted. Callers see a single success or failure per page.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::models::work::{Authorship, Institution, Work};
use crate::openalex::{CitationError, CitationSource, CitingPage};

const REQUEST_TIMEOUT_SECS: u64 = 30;
const MAX_ATTEMPTS: u32 = 3;
const RETRY_BASE_DELAY_MS: u64 = 500;
const OPENALEX_ID_PREFIX: &str = "https://openalex.org/";
const WORK_SELECT_FIELDS: &str =
    "id,display_name,title,publication_year,cited_by_count,primary_location,host_venue,authorships";

// ────────────────────────────────────────────────────────────────────────────
// Wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct WorksResponse {
    #[serde(default)]
    meta: Option<WorksMeta>,
    #[serde(default)]
    results: Vec<OpenAlexWork>,
}

#[derive(Debug, Deserialize)]
struct WorksMeta {
    next_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAlexWork {
    id: Option<String>,
    display_name: Option<String>,
    title: Option<String>,
    publication_year: Option<i32>,
    cited_by_count: Option<i64>,
    primary_location: Option<OpenAlexLocation>,
    /// Older API responses carry the venue here instead of `primary_location`.
    host_venue: Option<OpenAlexSource>,
    authorships: Option<Vec<OpenAlexAuthorship>>,
}

#[derive(Debug, Deserialize)]
struct OpenAlexLocation {
    source: Option<OpenAlexSource>,
}

#[derive(Debug, Deserialize)]
struct OpenAlexSource {
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAlexAuthorship {
    institutions: Option<Vec<OpenAlexInstitution>>,
}

#[derive(Debug, Deserialize)]
struct OpenAlexInstitution {
    display_name: Option<String>,
    country_code: Option<String>,
}

impl OpenAlexWork {
    fn into_work(self) -> Work {
        let venue = self
            .primary_location
            .and_then(|l| l.source)
            .and_then(|s| s.display_name)
            .or_else(|| self.host_venue.and_then(|s| s.display_name))
            .unwrap_or_default();

        let authorships = self
            .authorships
            .unwrap_or_default()
            .into_iter()
            .map(|a| Authorship {
                institutions: a
                    .institutions
                    .unwrap_or_default()
                    .into_iter()
                    .map(|i| Institution {
                        name: i.display_name.unwrap_or_default(),
                        country_code: i
                            .country_code
                            .map(|c| c.trim().to_string())
                            .filter(|c| !c.is_empty()),
                    })
                    .collect(),
            })
            .collect();

        Work {
            id: self.id.unwrap_or_default(),
            title: self.display_name.or(self.title).unwrap_or_default(),
            venue,
            year: self.publication_year,
            cited_by_count: self.cited_by_count.unwrap_or(0).max(0) as u64,
            authorships,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct OpenAlexClient {
    client: Client,
    base_url: String,
    mailto: Option<String>,
}

impl OpenAlexClient {
    /// `mailto` opts into OpenAlex's polite pool.
    pub fn new(base_url: String, mailto: Option<String>) -> Result<Self, CitationError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            mailto,
        })
    }

    /// Looks up a single work by DOI. Returns `None` when OpenAlex has no record.
    pub async fn find_work_by_doi(&self, doi: &str) -> Result<Option<Work>, CitationError> {
        let doi = normalize_doi(doi);
        if doi.is_empty() {
            return Err(CitationError::InvalidRequest("DOI cannot be empty".to_string()));
        }

        let url = doi_lookup_url(&self.base_url, doi);
        let response = self.get_with_retry(&url, &[]).await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = ensure_success(response).await?;
        let work: OpenAlexWork = response.json().await?;
        Ok(Some(work.into_work()))
    }

    /// Returns the best title match, if any.
    pub async fn find_work_by_title(&self, title: &str) -> Result<Option<Work>, CitationError> {
        let title = sanitize_filter_value(title);
        if title.is_empty() {
            return Err(CitationError::InvalidRequest("title cannot be empty".to_string()));
        }

        let url = format!("{}/works", self.base_url);
        let query = [
            ("filter", format!("title.search:{title}")),
            ("per-page", "1".to_string()),
        ];
        let response = ensure_success(self.get_with_retry(&url, &query).await?).await?;
        let body: WorksResponse = response.json().await?;
        Ok(body.results.into_iter().next().map(OpenAlexWork::into_work))
    }

    async fn get_with_retry(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<Response, CitationError> {
        let mut last_error: Option<CitationError> = None;

        for attempt in 0..MAX_ATTEMPTS {
            if attempt > 0 {
                let delay = Duration::from_millis(RETRY_BASE_DELAY_MS * (1 << (attempt - 1)));
                warn!(
                    "OpenAlex request attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let mut request = self.client.get(url).query(query);
            if let Some(mailto) = &self.mailto {
                request = request.query(&[("mailto", mailto)]);
            }

            let response = match request.send().await {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(CitationError::Http(e));
                    continue;
                }
            };

            let status = response.status();
            if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("OpenAlex returned {}: {}", status, body);
                last_error = Some(CitationError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            return Ok(response);
        }

        Err(last_error.unwrap_or(CitationError::Api {
            status: StatusCode::SERVICE_UNAVAILABLE.as_u16(),
            message: format!("no response after {MAX_ATTEMPTS} attempts"),
        }))
    }
}

#[async_trait]
impl CitationSource for OpenAlexClient {
    async fn fetch_citing_page(
        &self,
        work_id: &str,
        per_page: u32,
        cursor: &str,
    ) -> Result<CitingPage, CitationError> {
        let url = format!("{}/works", self.base_url);
        let query = [
            ("filter", format!("cites:{}", openalex_key(work_id))),
            ("per-page", per_page.to_string()),
            ("cursor", cursor.to_string()),
            ("select", WORK_SELECT_FIELDS.to_string()),
        ];

        let response = ensure_success(self.get_with_retry(&url, &query).await?).await?;
        let body: WorksResponse = response.json().await?;
        debug!(
            "OpenAlex cites:{} returned {} works",
            work_id,
            body.results.len()
        );

        Ok(CitingPage {
            works: body.results.into_iter().map(OpenAlexWork::into_work).collect(),
            next_cursor: body.meta.and_then(|m| m.next_cursor),
        })
    }
}

async fn ensure_success(response: Response) -> Result<Response, CitationError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(CitationError::Api {
        status: status.as_u16(),
        message,
    })
}

/// Reduces `https://openalex.org/W123` to `W123`, the form filters expect.
pub fn openalex_key(id: &str) -> &str {
    let id = id.trim();
    id.strip_prefix(OPENALEX_ID_PREFIX).unwrap_or(id)
}

fn normalize_doi(doi: &str) -> &str {
    let doi = doi.trim();
    ["https://doi.org/", "http://doi.org/", "https://dx.doi.org/", "http://dx.doi.org/", "doi:"]
        .iter()
        .find_map(|prefix| doi.strip_prefix(prefix))
        .unwrap_or(doi)
        .trim()
}

/// The DOI travels in the path, so characters like `#` or `;` from SICI-style
/// DOIs must be percent-encoded.
fn doi_lookup_url(base_url: &str, doi: &str) -> String {
    format!("{}/works/https://doi.org/{}", base_url, urlencoding::encode(doi))
}

/// Commas separate filters in OpenAlex query syntax, so they cannot appear in a value.
fn sanitize_filter_value(value: &str) -> String {
    value
        .replace(',', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
