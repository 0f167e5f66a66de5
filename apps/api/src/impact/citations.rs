//! Citation Aggregator: walks the full citing-work set of a work and tallies
//! the countries of the citing institutions.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, info};

use crate::impact::CitationPolicy;
use crate::models::work::Work;
use crate::openalex::{CitationError, CitationSource, INITIAL_CURSOR, MAX_PAGE_SIZE};

/// Uppercase country code → number of (citing work, authorship, institution) hits.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CountryCountTable(HashMap<String, u64>);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryCount {
    pub country_code: String,
    pub count: u64,
}

impl CountryCountTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, country_code: &str) {
        *self.0.entry(country_code.to_uppercase()).or_insert(0) += 1;
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Count descending, then country code ascending.
    pub fn sorted(&self) -> Vec<CountryCount> {
        let mut rows: Vec<CountryCount> = self
            .0
            .iter()
            .map(|(code, count)| CountryCount {
                country_code: code.clone(),
                count: *count,
            })
            .collect();
        rows.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.country_code.cmp(&b.country_code))
        });
        rows
    }
}

/// Walks the cursor-paginated citing-work set of `work_id`.
///
/// Stops on an absent/empty next cursor, an empty page, or after `max_pages`.
/// An error on any page aborts the walk; partial results are discarded.
pub async fn fetch_citing_works(
    source: &dyn CitationSource,
    work_id: &str,
    page_size: u32,
    max_pages: u32,
) -> Result<Vec<Work>, CitationError> {
    if work_id.trim().is_empty() {
        return Err(CitationError::InvalidRequest(
            "work id cannot be empty".to_string(),
        ));
    }
    if page_size == 0 || page_size > MAX_PAGE_SIZE {
        return Err(CitationError::InvalidRequest(format!(
            "page size must be between 1 and {MAX_PAGE_SIZE}, got {page_size}"
        )));
    }
    if max_pages == 0 {
        return Err(CitationError::InvalidRequest(
            "max pages must be at least 1".to_string(),
        ));
    }

    let mut works = Vec::new();
    let mut cursor = INITIAL_CURSOR.to_string();

    for page_number in 1..=max_pages {
        let page = source
            .fetch_citing_page(work_id, page_size, &cursor)
            .await?;
        debug!(
            "cites:{} page {} returned {} works",
            work_id,
            page_number,
            page.works.len()
        );

        if page.works.is_empty() {
            break;
        }
        works.extend(page.works);

        match page.next_cursor {
            Some(next) if !next.is_empty() => cursor = next,
            _ => break,
        }
    }

    Ok(works)
}

/// Tallies one increment per institution with a country code, across every
/// authorship of every citing work. A work listing the same country on two
/// authors counts twice.
pub fn count_citing_countries(citing: &[Work]) -> CountryCountTable {
    let mut table = CountryCountTable::new();
    for work in citing {
        for institution in work.institutions() {
            if let Some(code) = institution.country_code.as_deref() {
                table.increment(code);
            }
        }
    }
    table
}

/// Fetches the citing works of `work_id` under the aggregate policy and
/// counts their countries. The raw list is returned for reuse by the
/// second-order ranker.
pub async fn aggregate_citing_countries(
    source: &dyn CitationSource,
    work_id: &str,
    policy: &CitationPolicy,
) -> Result<(CountryCountTable, Vec<Work>), CitationError> {
    let citing = fetch_citing_works(
        source,
        work_id,
        policy.aggregate_page_size,
        policy.aggregate_max_pages,
    )
    .await?;

    let table = count_citing_countries(&citing);
    info!(
        "Aggregated {} citing works of {} into {} countries",
        citing.len(),
        work_id,
        table.len()
    );

    Ok((table, citing))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::openalex::fake::{work, work_with_countries, works, ScriptedPage, ScriptedSource};

    impl CountryCountTable {
        fn get(&self, country_code: &str) -> u64 {
            self.0.get(country_code).copied().unwrap_or(0)
        }

        fn total(&self) -> u64 {
            self.0.values().sum()
        }
    }

    #[tokio::test]
    async fn test_no_citers_gives_empty_table_and_list() {
        let source = ScriptedSource::new();
        let (table, citing) = aggregate_citing_countries(&source, "W0", &CitationPolicy::default())
            .await
            .unwrap();
        assert_eq!(table, CountryCountTable::new());
        assert!(citing.is_empty());
    }

    #[tokio::test]
    async fn test_works_without_country_codes_still_returned() {
        let source = ScriptedSource::new().with_citers("W1", vec![work("A", 1), work("B", 2)]);
        let (table, citing) = aggregate_citing_countries(&source, "W1", &CitationPolicy::default())
            .await
            .unwrap();
        assert_eq!(table, CountryCountTable::new());
        assert_eq!(citing.len(), 2);
    }

    #[tokio::test]
    async fn test_page_cap_bounds_the_walk() {
        let source = ScriptedSource::new().with_pages(
            "W1",
            vec![
                ScriptedPage::Works(works("a", 5)),
                ScriptedPage::Works(works("b", 5)),
                ScriptedPage::Works(works("c", 5)),
                ScriptedPage::Works(works("d", 5)),
            ],
        );

        let citing = fetch_citing_works(&source, "W1", 5, 3).await.unwrap();
        assert_eq!(citing.len(), 15);
        assert_eq!(source.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_walk_follows_cursors_in_order() {
        let source = ScriptedSource::new().with_pages(
            "W1",
            vec![
                ScriptedPage::Works(works("a", 2)),
                ScriptedPage::Works(works("b", 1)),
            ],
        );

        let citing = fetch_citing_works(&source, "W1", 2, 10).await.unwrap();
        let ids: Vec<&str> = citing.iter().map(|w| w.id.as_str()).collect();
        assert_eq!(ids, vec!["a0", "a1", "b0"]);

        let cursors: Vec<String> = source.calls().into_iter().map(|(_, c)| c).collect();
        assert_eq!(cursors, vec!["*".to_string(), "page-1".to_string()]);
    }

    #[tokio::test]
    async fn test_empty_page_stops_walk_even_with_cursor() {
        let source = ScriptedSource::new()
            .with_pages("W1", vec![ScriptedPage::Works(works("a", 3))])
            .with_dangling_cursor();

        let citing = fetch_citing_works(&source, "W1", 3, 10).await.unwrap();
        assert_eq!(citing.len(), 3);
        assert_eq!(source.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_error_on_second_page_aborts() {
        let source = ScriptedSource::new().with_pages(
            "W1",
            vec![
                ScriptedPage::Works(vec![work_with_countries("A", &[&["US"]])]),
                ScriptedPage::Fail,
            ],
        );

        let result = aggregate_citing_countries(&source, "W1", &CitationPolicy::default()).await;
        assert!(matches!(result, Err(CitationError::Api { status: 503, .. })));
    }

    #[tokio::test]
    async fn test_end_to_end_country_counts() {
        let source = ScriptedSource::new().with_citers(
            "W1",
            vec![
                work_with_countries("A", &[&["US"]]),
                work_with_countries("B", &[&["us"]]),
                work_with_countries("C", &[&["US"], &["DE"]]),
            ],
        );

        let (table, citing) = aggregate_citing_countries(&source, "W1", &CitationPolicy::default())
            .await
            .unwrap();
        assert_eq!(citing.len(), 3);
        assert_eq!(table.get("US"), 3);
        assert_eq!(table.get("DE"), 1);
        assert_eq!(table.len(), 2);
        assert_eq!(table.total(), 4);
    }

    #[tokio::test]
    async fn test_invalid_arguments_make_no_requests() {
        let source = ScriptedSource::new();
        assert!(fetch_citing_works(&source, "  ", 10, 1).await.is_err());
        assert!(fetch_citing_works(&source, "W1", 0, 1).await.is_err());
        assert!(fetch_citing_works(&source, "W1", 201, 1).await.is_err());
        assert!(fetch_citing_works(&source, "W1", 10, 0).await.is_err());
        assert!(source.calls().is_empty());
    }

    #[test]
    fn test_same_country_twice_on_one_work_counts_twice() {
        let table = count_citing_countries(&[work_with_countries("A", &[&["FR", "FR"]])]);
        assert_eq!(table.get("FR"), 2);
    }

    #[test]
    fn test_sorted_by_count_then_code() {
        let mut table = CountryCountTable::new();
        for code in ["de", "US", "US", "CN", "CN", "AT"] {
            table.increment(code);
        }
        let sorted: Vec<(String, u64)> = table
            .sorted()
            .into_iter()
            .map(|c| (c.country_code, c.count))
            .collect();
        assert_eq!(
            sorted,
            vec![
                ("CN".to_string(), 2),
                ("US".to_string(), 2),
                ("AT".to_string(), 1),
                ("DE".to_string(), 1),
            ]
        );
    }
}
