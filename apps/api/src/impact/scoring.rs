//! Notability heuristic for second-order works.
//!
//! score = log10(citations + 1)
//!       + 1.0 if the venue matches a prestige venue
//!       + 1.0 if any author institution matches a prestige institution
//!       + log10(impact_factor + 1)
//!
//! This is a ranking signal, not a calibrated metric.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::models::work::Work;

/// Impact factor assumed for a prestige venue that has no table entry.
pub const FALLBACK_IMPACT_FACTOR: f64 = 25.0;

const PRESTIGE_BONUS: f64 = 1.0;

/// Lowercase substrings identifying high-prestige venues.
pub const PRESTIGE_VENUES: &[&str] = &[
    "nature",
    "science",
    "cell",
    "lancet",
    "new england journal of medicine",
    "jama",
    "proceedings of the national academy of sciences",
    "physical review letters",
    "journal of the american chemical society",
    "neural information processing systems",
    "international conference on machine learning",
    "computer vision and pattern recognition",
];

/// Lowercase substrings identifying high-prestige institutions.
pub const PRESTIGE_INSTITUTIONS: &[&str] = &[
    "harvard",
    "stanford",
    "massachusetts institute of technology",
    "california institute of technology",
    "princeton",
    "yale",
    "university of california, berkeley",
    "university of oxford",
    "university of cambridge",
    "eth zurich",
    "max planck",
    "tsinghua",
    "peking university",
    "university of tokyo",
    "columbia university",
    "university of chicago",
];

/// Venue name (lowercase) → impact factor.
#[derive(Debug, Clone, Default)]
pub struct ImpactFactorTable {
    factors: HashMap<String, f64>,
}

#[derive(Debug, Deserialize)]
struct ImpactFactorRecord {
    venue: String,
    impact_factor: f64,
}

impl ImpactFactorTable {
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: AsRef<str>,
    {
        let factors = pairs
            .into_iter()
            .map(|(venue, factor)| (venue.as_ref().to_lowercase(), factor))
            .collect();
        Self { factors }
    }

    /// Reads a `venue,impact_factor` CSV with a header row.
    pub fn from_csv_reader<R: std::io::Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut pairs = Vec::new();
        for (line, record) in rdr.deserialize::<ImpactFactorRecord>().enumerate() {
            let record =
                record.with_context(|| format!("Invalid impact factor row {}", line + 1))?;
            pairs.push((record.venue, record.impact_factor));
        }
        Ok(Self::from_pairs(pairs))
    }

    pub fn from_csv_path(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("Cannot open impact factor table '{}'", path.display()))?;
        Self::from_csv_reader(file)
    }

    /// Exact lowercase venue match.
    pub fn get(&self, venue: &str) -> Option<f64> {
        self.factors.get(&venue.to_lowercase()).copied()
    }

    /// Table entry, else the fallback for prestige venues, else 0.
    pub fn resolve(&self, venue: &str) -> f64 {
        match self.get(venue) {
            Some(factor) => factor,
            None if is_prestige_venue(venue) => FALLBACK_IMPACT_FACTOR,
            None => 0.0,
        }
    }

    pub fn len(&self) -> usize {
        self.factors.len()
    }
}

pub fn is_prestige_venue(venue: &str) -> bool {
    contains_any(venue, PRESTIGE_VENUES)
}

pub fn has_prestige_institution(work: &Work) -> bool {
    work.institutions()
        .any(|i| contains_any(&i.name, PRESTIGE_INSTITUTIONS))
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    if haystack.is_empty() {
        return false;
    }
    let haystack = haystack.to_lowercase();
    needles.iter().any(|n| haystack.contains(n))
}

pub fn notability_score(work: &Work, impact_factors: &ImpactFactorTable) -> f64 {
    let mut score = (work.cited_by_count as f64 + 1.0).log10();
    if is_prestige_venue(&work.venue) {
        score += PRESTIGE_BONUS;
    }
    if has_prestige_institution(work) {
        score += PRESTIGE_BONUS;
    }
    score + (impact_factors.resolve(&work.venue).max(0.0) + 1.0).log10()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::work::{Authorship, Institution};

    fn make_work(cited: u64, venue: &str, institution: &str) -> Work {
        Work {
            id: "W1".to_string(),
            title: "T".to_string(),
            venue: venue.to_string(),
            cited_by_count: cited,
            authorships: vec![Authorship {
                institutions: vec![Institution {
                    name: institution.to_string(),
                    country_code: None,
                }],
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_plain_work_is_log_citations() {
        let work = make_work(99, "Journal of Obscure Results", "Small College");
        let score = notability_score(&work, &ImpactFactorTable::default());
        assert!((score - 2.0).abs() < 1e-12, "Score was {score}");
    }

    #[test]
    fn test_zero_citations_scores_zero() {
        let work = make_work(0, "", "");
        assert_eq!(notability_score(&work, &ImpactFactorTable::default()), 0.0);
    }

    #[test]
    fn test_prestige_venue_without_entry_uses_fallback() {
        let work = make_work(9, "Nature Communications", "Small College");
        let score = notability_score(&work, &ImpactFactorTable::default());
        // 1 + 1 + log10(26)
        let expected = 1.0 + 1.0 + 26f64.log10();
        assert!((score - expected).abs() < 1e-12, "Score was {score}");
    }

    #[test]
    fn test_table_entry_overrides_fallback() {
        let table = ImpactFactorTable::from_pairs([("Nature Communications", 16.6)]);
        let work = make_work(9, "nature communications", "Small College");
        let expected = 1.0 + 1.0 + 17.6f64.log10();
        assert!((notability_score(&work, &table) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_table_entry_for_non_prestige_venue() {
        let table = ImpactFactorTable::from_pairs([("ACS Nano", 17.1)]);
        let work = make_work(0, "ACS Nano", "");
        assert!((notability_score(&work, &table) - 18.1f64.log10()).abs() < 1e-12);
    }

    #[test]
    fn test_prestige_institution_bonus() {
        let work = make_work(0, "", "Stanford University");
        assert!((notability_score(&work, &ImpactFactorTable::default()) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_institution_bonus_counted_once() {
        let mut work = make_work(0, "", "Harvard University");
        work.authorships.push(Authorship {
            institutions: vec![Institution {
                name: "Yale University".to_string(),
                country_code: Some("US".to_string()),
            }],
        });
        assert!((notability_score(&work, &ImpactFactorTable::default()) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_score_is_deterministic() {
        let table = ImpactFactorTable::from_pairs([("cell", 45.5)]);
        let work = make_work(1234, "Cell", "Max Planck Institute");
        let a = notability_score(&work, &table);
        let b = notability_score(&work, &table);
        assert_eq!(a.to_bits(), b.to_bits());
    }

    #[test]
    fn test_resolve_unknown_venue_is_zero() {
        assert_eq!(ImpactFactorTable::default().resolve("Unknown Letters"), 0.0);
        assert_eq!(ImpactFactorTable::default().resolve(""), 0.0);
    }

    #[test]
    fn test_from_csv_reader_lowercases_and_trims() {
        let csv = "venue,impact_factor\n  The Lancet , 98.4\nIEEE Access,3.9\n";
        let table = ImpactFactorTable::from_csv_reader(csv.as_bytes()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("the lancet"), Some(98.4));
        assert_eq!(table.get("IEEE ACCESS"), Some(3.9));
    }

    #[test]
    fn test_from_csv_reader_rejects_bad_factor() {
        let csv = "venue,impact_factor\nIEEE Access,high\n";
        assert!(ImpactFactorTable::from_csv_reader(csv.as_bytes()).is_err());
    }

    #[test]
    fn test_from_csv_path() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "venue,impact_factor").unwrap();
        writeln!(file, "Science,44.7").unwrap();
        let table = ImpactFactorTable::from_csv_path(file.path()).unwrap();
        assert_eq!(table.resolve("SCIENCE"), 44.7);
    }

    #[test]
    fn test_from_csv_path_missing_file() {
        let result = ImpactFactorTable::from_csv_path(Path::new("/nonexistent/impact.csv"));
        assert!(result.is_err());
    }
}
