//! Scripted in-memory citation source for pipeline tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::models::work::{Authorship, Institution, Work};
use crate::openalex::{CitationError, CitationSource, CitingPage, INITIAL_CURSOR};

pub enum ScriptedPage {
    Works(Vec<Work>),
    Fail,
}

/// Serves pre-scripted pages per cited work. Page `n` is reached with the
/// cursor `page-n`; the initial cursor maps to page 0.
#[derive(Default)]
pub struct ScriptedSource {
    pages: HashMap<String, Vec<ScriptedPage>>,
    dangling_cursor: bool,
    calls: Mutex<Vec<(String, String)>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pages(mut self, work_id: &str, pages: Vec<ScriptedPage>) -> Self {
        self.pages.insert(work_id.to_string(), pages);
        self
    }

    /// Single successful page.
    pub fn with_citers(self, work_id: &str, works: Vec<Work>) -> Self {
        self.with_pages(work_id, vec![ScriptedPage::Works(works)])
    }

    pub fn failing(self, work_id: &str) -> Self {
        self.with_pages(work_id, vec![ScriptedPage::Fail])
    }

    /// Keep handing out a next cursor after the last scripted page.
    pub fn with_dangling_cursor(mut self) -> Self {
        self.dangling_cursor = true;
        self
    }

    /// `(work_id, cursor)` for every request made, in order.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CitationSource for ScriptedSource {
    async fn fetch_citing_page(
        &self,
        work_id: &str,
        _per_page: u32,
        cursor: &str,
    ) -> Result<CitingPage, CitationError> {
        self.calls
            .lock()
            .unwrap()
            .push((work_id.to_string(), cursor.to_string()));

        let index = if cursor == INITIAL_CURSOR {
            0
        } else {
            cursor
                .strip_prefix("page-")
                .and_then(|n| n.parse::<usize>().ok())
                .unwrap_or(usize::MAX)
        };

        let Some(pages) = self.pages.get(work_id) else {
            return Ok(CitingPage::default());
        };

        let next_cursor = if index + 1 < pages.len() || self.dangling_cursor {
            Some(format!("page-{}", index + 1))
        } else {
            None
        };

        match pages.get(index) {
            Some(ScriptedPage::Works(works)) => Ok(CitingPage {
                works: works.clone(),
                next_cursor,
            }),
            Some(ScriptedPage::Fail) => Err(CitationError::Api {
                status: 503,
                message: format!("scripted failure for {work_id} at {cursor}"),
            }),
            None => Ok(CitingPage {
                works: vec![],
                next_cursor,
            }),
        }
    }
}

pub fn work(id: &str, cited_by_count: u64) -> Work {
    Work {
        id: id.to_string(),
        title: format!("Title {id}"),
        cited_by_count,
        ..Default::default()
    }
}

/// A work whose authorships carry the given country codes, one inner slice per author.
pub fn work_with_countries(id: &str, authors: &[&[&str]]) -> Work {
    Work {
        authorships: authors
            .iter()
            .map(|codes| Authorship {
                institutions: codes
                    .iter()
                    .map(|c| Institution {
                        name: format!("Institute {c}"),
                        country_code: Some(c.to_string()),
                    })
                    .collect(),
            })
            .collect(),
        ..work(id, 0)
    }
}

pub fn works(prefix: &str, n: usize) -> Vec<Work> {
    (0..n).map(|i| work(&format!("{prefix}{i}"), i as u64)).collect()
}
