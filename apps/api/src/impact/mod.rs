// Citation impact engine: country aggregation over a work's citers and
// second-order ranking over the citers' citers.
// All bibliographic access goes through openalex::CitationSource.

pub mod citations;
pub mod export;
pub mod handlers;
pub mod ranking;
pub mod scoring;

use crate::impact::ranking::HopBudget;

/// Page budgets for every citation walk the service performs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CitationPolicy {
    pub aggregate_page_size: u32,
    pub aggregate_max_pages: u32,
    pub first_hop_page_size: u32,
    pub first_hop_max_pages: u32,
    pub second_hop_page_size: u32,
    pub second_hop_max_pages: u32,
}

impl Default for CitationPolicy {
    fn default() -> Self {
        Self {
            aggregate_page_size: 200,
            aggregate_max_pages: 10,
            first_hop_page_size: 50,
            first_hop_max_pages: 2,
            second_hop_page_size: 25,
            second_hop_max_pages: 1,
        }
    }
}

impl CitationPolicy {
    pub fn hop_budget(&self) -> HopBudget {
        HopBudget {
            first_hop_page_size: self.first_hop_page_size,
            first_hop_max_pages: self.first_hop_max_pages,
            second_hop_page_size: self.second_hop_page_size,
            second_hop_max_pages: self.second_hop_max_pages,
        }
    }
}
