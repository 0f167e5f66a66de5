use serde::{Deserialize, Serialize};

/// A scholarly publication snapshot as returned by the bibliographic API.
///
/// Missing upstream fields are normalized at the client boundary: empty
/// strings for text, `None` for the year, zero for the citation count.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Work {
    pub id: String,
    pub title: String,
    pub venue: String,
    pub year: Option<i32>,
    pub cited_by_count: u64,
    pub authorships: Vec<Authorship>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Authorship {
    pub institutions: Vec<Institution>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Institution {
    pub name: String,
    /// Two-letter ISO code as reported upstream; casing is not guaranteed.
    pub country_code: Option<String>,
}

impl Work {
    /// Iterates over every institution on every authorship, in order.
    /// The same institution may appear more than once.
    pub fn institutions(&self) -> impl Iterator<Item = &Institution> {
        self.authorships.iter().flat_map(|a| a.institutions.iter())
    }
}
