//! Second-Order Impact Ranker: ranks the works that cite a work's citers.
//!
//! Flow: first-hop fetch (must succeed) → per citer, second-hop fetch
//! (best-effort) → dedup by id → score → sort.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::Serialize;
use tracing::{info, warn};

use crate::impact::citations::fetch_citing_works;
use crate::impact::scoring::{notability_score, ImpactFactorTable};
use crate::models::work::Work;
use crate::openalex::{CitationError, CitationSource};

/// Page budget for each hop of the second-order walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HopBudget {
    pub first_hop_page_size: u32,
    pub first_hop_max_pages: u32,
    pub second_hop_page_size: u32,
    pub second_hop_max_pages: u32,
}

/// One ranked second-order work.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SecondOrderRow {
    pub title: String,
    pub venue: String,
    pub impact_factor: f64,
    pub year: Option<i32>,
    pub cited_by_count: u64,
    pub source_id: String,
    pub score: f64,
}

impl SecondOrderRow {
    pub fn from_work(work: &Work, impact_factors: &ImpactFactorTable) -> Self {
        Self {
            title: work.title.clone(),
            venue: work.venue.clone(),
            impact_factor: impact_factors.resolve(&work.venue),
            year: work.year,
            cited_by_count: work.cited_by_count,
            source_id: work.id.clone(),
            score: notability_score(work, impact_factors),
        }
    }
}

/// Works keyed by id. On a repeated id the strictly higher `cited_by_count`
/// replaces the stored work wholesale; ties keep the first seen. First-seen
/// order is preserved so ranking ties stay deterministic.
#[derive(Debug, Default)]
pub struct SecondOrderTable {
    works: Vec<Work>,
    index: HashMap<String, usize>,
}

impl SecondOrderTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert(&mut self, work: Work) {
        match self.index.get(&work.id) {
            Some(&slot) => {
                if work.cited_by_count > self.works[slot].cited_by_count {
                    self.works[slot] = work;
                }
            }
            None => {
                self.index.insert(work.id.clone(), self.works.len());
                self.works.push(work);
            }
        }
    }

    pub fn into_works(self) -> Vec<Work> {
        self.works
    }
}

/// Descending by score, then citations, then impact factor.
pub fn compare_rows(a: &SecondOrderRow, b: &SecondOrderRow) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| b.cited_by_count.cmp(&a.cited_by_count))
        .then_with(|| b.impact_factor.total_cmp(&a.impact_factor))
}

pub fn sort_rows(rows: &mut [SecondOrderRow]) {
    rows.sort_by(compare_rows);
}

/// Expands already-fetched first-hop works one more hop and ranks the result.
///
/// Second-hop failures are logged and skipped: that citer simply contributes
/// nothing.
pub async fn expand_second_order(
    source: &dyn CitationSource,
    first_hop: &[Work],
    impact_factors: &ImpactFactorTable,
    second_hop_page_size: u32,
    second_hop_max_pages: u32,
) -> Vec<SecondOrderRow> {
    let mut table = SecondOrderTable::new();
    let mut skipped = 0usize;

    for citer in first_hop.iter().filter(|w| !w.id.trim().is_empty()) {
        match fetch_citing_works(source, &citer.id, second_hop_page_size, second_hop_max_pages)
            .await
        {
            Ok(works) => {
                for work in works.into_iter().filter(|w| !w.id.is_empty()) {
                    table.upsert(work);
                }
            }
            Err(e) => {
                skipped += 1;
                warn!("Skipping second-hop expansion of {}: {}", citer.id, e);
            }
        }
    }

    let mut rows: Vec<SecondOrderRow> = table
        .into_works()
        .iter()
        .map(|w| SecondOrderRow::from_work(w, impact_factors))
        .collect();
    sort_rows(&mut rows);

    info!(
        "Ranked {} second-order works from {} citers ({} skipped)",
        rows.len(),
        first_hop.len(),
        skipped
    );
    rows
}

/// Full second-order pipeline for `work_id`. Only a first-hop failure is an error.
pub async fn second_order_ranking(
    source: &dyn CitationSource,
    work_id: &str,
    impact_factors: &ImpactFactorTable,
    budget: &HopBudget,
) -> Result<Vec<SecondOrderRow>, CitationError> {
    let first_hop = fetch_citing_works(
        source,
        work_id,
        budget.first_hop_page_size,
        budget.first_hop_max_pages,
    )
    .await?;

    Ok(expand_second_order(
        source,
        &first_hop,
        impact_factors,
        budget.second_hop_page_size,
        budget.second_hop_max_pages,
    )
    .await)
}
