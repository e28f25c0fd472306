// src/extractors/sectors.rs

// --- Imports ---
use once_cell::sync::Lazy;
use regex::Regex;

use crate::extractors::values::parse_numeric;
use crate::pdf::tables::{normalize_cell, Table};
use crate::pdf::FactsheetDocument;

// --- Regex Patterns (Lazy Static) ---
// Heading that introduces the sector block when no structured table region
// was detected around it.
static SECTOR_HEADING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)sector\s*(?:representation|breakdown|weight)")
        .expect("Failed to compile SECTOR_HEADING_RE")
});

// Summary rows that are not sectors.
const EXCLUDED_LABELS: &[&str] = &["total", "others"];

// --- Data Structures ---
/// One (index, sector) data point destined for the sparse sector matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct SectorRow {
    pub index_name: String,
    pub source_filename: String,
    pub sector_name: String,
    pub weight_percent: f64,
}

// --- Extraction ---

/// Locates the sector-weight breakdown of one factsheet and returns its
/// (sector, weight) pairs in document order.
///
/// `None` means the document has no sector table at all — the expected
/// shape for single-sector indices — and is not an error. An empty result
/// never occurs: a located table with zero usable rows also reports `None`.
pub fn extract_sector_weights(doc: &FactsheetDocument) -> Option<Vec<(String, f64)>> {
    if let Some(weights) = sector_weights_from_tables(&doc.tables) {
        return Some(weights);
    }
    sector_weights_from_text(&doc.text)
}

// Fuzzy header match: wording varies across template versions
// ("Sector", "Sector Representation", "Weightage (%)", "Weight(%)", ...).
fn is_sector_header(header: &[String]) -> bool {
    let joined = header.join(" ").to_lowercase();
    joined.contains("sector") && (joined.contains("weight") || joined.contains('%'))
}

fn sector_weights_from_tables(tables: &[Table]) -> Option<Vec<(String, f64)>> {
    // Among multiple candidates the largest wins: the sector breakdown is
    // typically the biggest table on a factsheet. First-seen order breaks
    // ties so repeated runs stay stable.
    let mut candidate: Option<&Table> = None;
    for table in tables {
        if table.row_count() < 2 {
            continue;
        }
        if !table.header().map(is_sector_header).unwrap_or(false) {
            continue;
        }
        if candidate.map(|c| table.row_count() > c.row_count()).unwrap_or(true) {
            candidate = Some(table);
        }
    }
    let candidate = candidate?;
    let header = candidate.header()?;

    let mut sector_col: Option<usize> = None;
    let mut weight_col: Option<usize> = None;
    for (idx, cell) in header.iter().enumerate() {
        let h = cell.to_lowercase();
        if h.contains("sector") {
            sector_col.get_or_insert(idx);
        } else if h.contains("weight") || h.contains('%') {
            weight_col.get_or_insert(idx);
        }
    }
    // Default layout: label first, weight second.
    let sector_col = sector_col.unwrap_or(0);
    let weight_col = weight_col.unwrap_or(1);

    let mut weights: Vec<(String, f64)> = Vec::new();
    for row in candidate.body() {
        if row.len() <= sector_col.max(weight_col) {
            continue;
        }
        let sector_name = normalize_cell(&row[sector_col]);
        if sector_name.is_empty()
            || EXCLUDED_LABELS.contains(&sector_name.to_lowercase().as_str())
        {
            continue;
        }
        let Some(weight) = parse_numeric(&row[weight_col]) else {
            tracing::trace!("Skipping sector row with unparseable weight: {:?}", row);
            continue;
        };
        upsert(&mut weights, sector_name, weight);
    }

    if weights.is_empty() {
        None
    } else {
        Some(weights)
    }
}

/// Line-based fallback: after a sector heading, accept lines whose last
/// token is a percentage and whose remaining text reads as a category
/// label. Stops at the first non-qualifying line once data has begun.
fn sector_weights_from_text(text: &str) -> Option<Vec<(String, f64)>> {
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.iter().position(|l| SECTOR_HEADING_RE.is_match(l))?;

    let mut weights: Vec<(String, f64)> = Vec::new();
    for line in lines.iter().skip(start + 1) {
        match parse_sector_line(line.trim()) {
            Some((name, weight)) => upsert(&mut weights, name, weight),
            None if weights.is_empty() => continue, // still before the data
            None => break,
        }
    }

    if weights.is_empty() {
        None
    } else {
        Some(weights)
    }
}

fn parse_sector_line(line: &str) -> Option<(String, f64)> {
    let mut tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 2 {
        return None;
    }
    let last = tokens.pop()?;
    let weight = parse_percent_token(last)?;

    let label = normalize_cell(&tokens.join(" "));
    if label.is_empty() || !label.chars().any(|c| c.is_alphabetic()) {
        return None;
    }
    // The rest of the line must be a category label, not another metric.
    if parse_numeric(&label).is_some() {
        return None;
    }
    if EXCLUDED_LABELS.contains(&label.to_lowercase().as_str()) {
        return None;
    }
    Some((label, weight))
}

fn parse_percent_token(token: &str) -> Option<f64> {
    let value = parse_numeric(token)?;
    if token.contains('%') || (0.0..=100.0).contains(&value) {
        Some(value)
    } else {
        None
    }
}

// Last write wins when a sector name repeats within one document.
fn upsert(weights: &mut Vec<(String, f64)>, name: String, weight: f64) {
    if let Some(entry) = weights.iter_mut().find(|(n, _)| *n == name) {
        entry.1 = weight;
    } else {
        weights.push((name, weight));
    }
}

// --- Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: &[&[&str]]) -> Table {
        Table::new(
            rows.iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
    }

    fn doc_with_tables(tables: Vec<Table>) -> FactsheetDocument {
        let mut doc = FactsheetDocument::from_text("ind_test.pdf", "irrelevant");
        doc.tables = tables;
        doc
    }

    #[test]
    fn test_sector_table_yields_exactly_its_rows() {
        let doc = doc_with_tables(vec![table(&[
            &["Sector", "Weightage (%)"],
            &["Financial Services", "35.20"],
            &["Information Technology", "18.4"],
        ])]);

        let weights = extract_sector_weights(&doc).unwrap();
        assert_eq!(
            weights,
            vec![
                ("Financial Services".to_string(), 35.20),
                ("Information Technology".to_string(), 18.4),
            ]
        );
    }

    #[test]
    fn test_no_sector_table_is_none_not_error() {
        let doc = FactsheetDocument::from_text(
            "ind_nifty_bank.pdf",
            "Nifty Bank factsheet.\nP/E: 15.2\nNo breakdown table here.",
        );
        assert_eq!(extract_sector_weights(&doc), None);
    }

    #[test]
    fn test_largest_candidate_wins() {
        let doc = doc_with_tables(vec![
            table(&[
                &["Sector", "Weight (%)"],
                &["Automobiles", "12.0"],
            ]),
            table(&[
                &["Sector", "Weight (%)"],
                &["Financial Services", "33.0"],
                &["Energy", "11.5"],
                &["Automobiles", "8.2"],
            ]),
        ]);

        let weights = extract_sector_weights(&doc).unwrap();
        assert_eq!(weights.len(), 3);
        assert_eq!(weights[0], ("Financial Services".to_string(), 33.0));
    }

    #[test]
    fn test_summary_rows_and_garbled_weights_are_skipped() {
        let doc = doc_with_tables(vec![table(&[
            &["Sector", "Weightage (%)"],
            &["Financial Services", "35.20"],
            &["Total", "100.00"],
            &["Others", "3.1"],
            &["Telecom", "n/a"],
            &["", "5.0"],
            &["Metals & Mining", "0.00"],
        ])]);

        let weights = extract_sector_weights(&doc).unwrap();
        // Explicit zero survives; it is data, unlike the skipped rows.
        assert_eq!(
            weights,
            vec![
                ("Financial Services".to_string(), 35.20),
                ("Metals & Mining".to_string(), 0.0),
            ]
        );
    }

    #[test]
    fn test_weight_column_found_by_header_not_position() {
        let doc = doc_with_tables(vec![table(&[
            &["Sector", "No. of Companies", "Weight (%)"],
            &["Healthcare", "12", "9.8"],
        ])]);

        let weights = extract_sector_weights(&doc).unwrap();
        assert_eq!(weights, vec![("Healthcare".to_string(), 9.8)]);
    }

    #[test]
    fn test_text_fallback_after_heading() {
        let text = "Sector Representation\n\
                    Financial Services 35.20%\n\
                    Information Technology 18.4%\n\
                    Launch Date: 01 Jan 1996";
        let doc = FactsheetDocument::from_text("ind_test.pdf", text);

        let weights = extract_sector_weights(&doc).unwrap();
        assert_eq!(
            weights,
            vec![
                ("Financial Services".to_string(), 35.20),
                ("Information Technology".to_string(), 18.4),
            ]
        );
    }
}
