//! Axum route handlers for the citation impact API.

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::impact::citations::{aggregate_citing_countries, CountryCount};
use crate::impact::export::{country_counts_to_csv, second_order_rows_to_csv};
use crate::impact::ranking::{second_order_ranking, SecondOrderRow};
use crate::models::work::Work;
use crate::state::AppState;

const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
}

#[derive(Debug, Deserialize)]
pub struct LookupQuery {
    pub title: Option<String>,
    pub doi: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CountriesQuery {
    #[serde(default)]
    pub format: ExportFormat,
}

#[derive(Debug, Deserialize)]
pub struct SecondOrderQuery {
    /// Truncate the ranked list to the first `top` rows.
    pub top: Option<usize>,
    #[serde(default)]
    pub format: ExportFormat,
}

#[derive(Debug, Serialize)]
pub struct CountriesResponse {
    pub work_id: String,
    pub citing_works: usize,
    pub countries: Vec<CountryCount>,
}

#[derive(Debug, Serialize)]
pub struct SecondOrderResponse {
    pub work_id: String,
    pub total: usize,
    pub rows: Vec<SecondOrderRow>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/works/lookup?doi=… | ?title=…
///
/// Resolves a seed work. DOI wins when both are given.
pub async fn handle_lookup(
    State(state): State<AppState>,
    Query(query): Query<LookupQuery>,
) -> Result<Json<Work>, AppError> {
    let doi = query.doi.filter(|d| !d.trim().is_empty());
    let title = query.title.filter(|t| !t.trim().is_empty());

    let found = match (doi, title) {
        (Some(doi), _) => state.openalex.find_work_by_doi(&doi).await?,
        (None, Some(title)) => state.openalex.find_work_by_title(&title).await?,
        (None, None) => {
            return Err(AppError::Validation(
                "either doi or title must be provided".to_string(),
            ))
        }
    };

    found
        .map(Json)
        .ok_or_else(|| AppError::NotFound("No matching work found".to_string()))
}

/// GET /api/v1/works/:work_id/citing-countries
pub async fn handle_citing_countries(
    State(state): State<AppState>,
    Path(work_id): Path<String>,
    Query(query): Query<CountriesQuery>,
) -> Result<Response, AppError> {
    let (table, citing) =
        aggregate_citing_countries(state.citations.as_ref(), &work_id, &state.config.policy)
            .await?;

    match query.format {
        ExportFormat::Csv => {
            let body = country_counts_to_csv(&table)?;
            Ok(([(header::CONTENT_TYPE, CSV_CONTENT_TYPE)], body).into_response())
        }
        ExportFormat::Json => Ok(Json(CountriesResponse {
            work_id,
            citing_works: citing.len(),
            countries: table.sorted(),
        })
        .into_response()),
    }
}

/// GET /api/v1/works/:work_id/second-order
pub async fn handle_second_order(
    State(state): State<AppState>,
    Path(work_id): Path<String>,
    Query(query): Query<SecondOrderQuery>,
) -> Result<Response, AppError> {
    let mut rows = second_order_ranking(
        state.citations.as_ref(),
        &work_id,
        &state.impact_factors,
        &state.config.policy.hop_budget(),
    )
    .await?;

    let total = rows.len();
    if let Some(top) = query.top {
        rows.truncate(top);
    }

    match query.format {
        ExportFormat::Csv => {
            let body = second_order_rows_to_csv(&rows)?;
            Ok(([(header::CONTENT_TYPE, CSV_CONTENT_TYPE)], body).into_response())
        }
        ExportFormat::Json => Ok(Json(SecondOrderResponse {
            work_id,
            total,
            rows,
        })
        .into_response()),
    }
}
