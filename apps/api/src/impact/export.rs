//! Delimited-text export of the impact tables.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::impact::citations::CountryCountTable;
use crate::impact::ranking::SecondOrderRow;

const COUNTRY_HEADER: &[&str] = &["country_code", "count"];
const SECOND_ORDER_HEADER: &[&str] = &[
    "title",
    "venue",
    "impact_factor",
    "year",
    "cited_by_count",
    "source_id",
    "score",
];

/// `country_code,count`, sorted by count descending.
pub fn country_counts_to_csv(table: &CountryCountTable) -> Result<String> {
    write_csv(COUNTRY_HEADER, table.sorted())
}

/// Ranked rows in their given order.
pub fn second_order_rows_to_csv(rows: &[SecondOrderRow]) -> Result<String> {
    write_csv(SECOND_ORDER_HEADER, rows.iter())
}

/// The header is written up front so an empty table still exports one line.
fn write_csv<I, T>(header: &[&str], records: I) -> Result<String>
where
    I: IntoIterator<Item = T>,
    T: Serialize,
{
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    wtr.write_record(header)
        .context("Failed to write CSV header")?;
    for record in records {
        wtr.serialize(record).context("Failed to serialize CSV row")?;
    }
    let bytes = wtr
        .into_inner()
        .map_err(|e| e.into_error())
        .context("Failed to flush CSV writer")?;
    String::from_utf8(bytes).context("CSV output was not valid UTF-8")
}
