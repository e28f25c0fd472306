// src/extractors/fields.rs

// --- Imports ---
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::extractors::values::{parse_count, parse_date, parse_numeric};
use crate::pdf::tables::{normalize_cell, Table};
use crate::pdf::FactsheetDocument;

// --- Regex Patterns (Lazy Static) ---
// "Label: value" / "Label = value" on one line.
static LABEL_VALUE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[:=]\s*(.+)").expect("Failed to compile LABEL_VALUE_RE")
});

// Dedicated fundamentals patterns so plain text lines resolve even when no
// table region was detected around them.
static PE_TEXT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bP\s*/\s*E\b(?:\s+Ratio)?\s*[:=]?\s*([0-9(),.%-]+)")
        .expect("Failed to compile PE_TEXT_RE")
});
static PB_TEXT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bP\s*/\s*B\b(?:\s+Ratio)?\s*[:=]?\s*([0-9(),.%-]+)")
        .expect("Failed to compile PB_TEXT_RE")
});
static DIVIDEND_YIELD_TEXT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bDividend\s+Yield\b\s*(?:\(%\))?\s*[:=]?\s*([0-9(),.%-]+)")
        .expect("Failed to compile DIVIDEND_YIELD_TEXT_RE")
});

// Header keywords that identify the performance and statistics grids.
const RETURNS_HEADER_KEYWORDS: &[&str] = &["qtd", "ytd", "1 year", "5 years", "since"];
const STATISTICS_HEADER_KEYWORDS: &[&str] = &["statistics", "1 year", "5 years", "since"];
const FUNDAMENTALS_HEADER_KEYWORDS: &[&str] = &["p/e", "p/b", "dividend yield"];

// --- Data Structures ---
/// One flat record per factsheet. Every field except the name and filename
/// is independently optional: a missing pattern match leaves its field
/// `None` and touches nothing else.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexRecord {
    pub index_name: String,
    pub source_filename: String,
    pub methodology: Option<String>,
    pub constituents_count: Option<u32>,
    pub launch_date: Option<NaiveDate>,
    pub base_date: Option<NaiveDate>,
    pub base_value: Option<f64>,
    pub calc_frequency: Option<String>,
    pub rebalancing_frequency: Option<String>,
    pub price_return_qtd: Option<f64>,
    pub price_return_ytd: Option<f64>,
    pub price_return_1y: Option<f64>,
    pub price_return_5y: Option<f64>,
    pub price_return_inception: Option<f64>,
    pub total_return_qtd: Option<f64>,
    pub total_return_ytd: Option<f64>,
    pub total_return_1y: Option<f64>,
    pub total_return_5y: Option<f64>,
    pub total_return_inception: Option<f64>,
    pub std_dev_1y: Option<f64>,
    pub std_dev_5y: Option<f64>,
    pub std_dev_inception: Option<f64>,
    pub beta_1y: Option<f64>,
    pub beta_5y: Option<f64>,
    pub beta_inception: Option<f64>,
    pub pe_ratio: Option<f64>,
    pub pb_ratio: Option<f64>,
    pub dividend_yield: Option<f64>,
}

/// Values pulled from one row of a period-columned grid (QTD / YTD /
/// 1 Year / 5 Years / Since Inception).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PeriodValues {
    pub qtd: Option<f64>,
    pub ytd: Option<f64>,
    pub one_year: Option<f64>,
    pub five_years: Option<f64>,
    pub since_inception: Option<f64>,
}

#[derive(Debug, Default)]
struct PeriodColumns {
    qtd: Option<usize>,
    ytd: Option<usize>,
    one_year: Option<usize>,
    five_years: Option<usize>,
    since_inception: Option<usize>,
}

// --- Record Assembly ---

/// Assembles the full record for one document. Field extractions are
/// independent pure functions; none can fail the record.
pub fn extract_record(doc: &FactsheetDocument, index_name: &str) -> IndexRecord {
    let price = price_returns(doc);
    let total = total_returns(doc);
    let std_dev = std_deviation(doc);
    let beta = beta(doc);

    IndexRecord {
        index_name: index_name.to_string(),
        source_filename: doc.filename.clone(),
        methodology: methodology(doc),
        constituents_count: constituents_count(doc),
        launch_date: launch_date(doc),
        base_date: base_date(doc),
        base_value: base_value(doc),
        calc_frequency: calc_frequency(doc),
        rebalancing_frequency: rebalancing_frequency(doc),
        price_return_qtd: price.qtd,
        price_return_ytd: price.ytd,
        price_return_1y: price.one_year,
        price_return_5y: price.five_years,
        price_return_inception: price.since_inception,
        total_return_qtd: total.qtd,
        total_return_ytd: total.ytd,
        total_return_1y: total.one_year,
        total_return_5y: total.five_years,
        total_return_inception: total.since_inception,
        std_dev_1y: std_dev.one_year,
        std_dev_5y: std_dev.five_years,
        std_dev_inception: std_dev.since_inception,
        beta_1y: beta.one_year,
        beta_5y: beta.five_years,
        beta_inception: beta.since_inception,
        pe_ratio: pe_ratio(doc),
        pb_ratio: pb_ratio(doc),
        dividend_yield: dividend_yield(doc),
    }
}

// --- Labelled Scalar Fields ---

pub fn methodology(doc: &FactsheetDocument) -> Option<String> {
    find_labelled_value(doc, &["methodology", "index methodology"])
}

pub fn constituents_count(doc: &FactsheetDocument) -> Option<u32> {
    find_labelled_value(
        doc,
        &["constituents", "number of constituents", "no. of constituents"],
    )
    .and_then(|v| parse_count(&v))
}

pub fn launch_date(doc: &FactsheetDocument) -> Option<NaiveDate> {
    find_labelled_value(doc, &["launch date", "launched on"]).and_then(|v| parse_date(&v))
}

pub fn base_date(doc: &FactsheetDocument) -> Option<NaiveDate> {
    find_labelled_value(doc, &["base date", "base value date"]).and_then(|v| parse_date(&v))
}

pub fn base_value(doc: &FactsheetDocument) -> Option<f64> {
    find_labelled_value(doc, &["base value", "base index value"]).and_then(|v| parse_numeric(&v))
}

pub fn calc_frequency(doc: &FactsheetDocument) -> Option<String> {
    find_labelled_value(doc, &["calculation frequency", "frequency"])
}

pub fn rebalancing_frequency(doc: &FactsheetDocument) -> Option<String> {
    find_labelled_value(
        doc,
        &["rebalancing", "index rebalancing", "rebalancing frequency"],
    )
}

// --- Performance / Statistics Grids ---

pub fn price_returns(doc: &FactsheetDocument) -> PeriodValues {
    extract_period_row(&doc.tables, RETURNS_HEADER_KEYWORDS, |row| {
        row.len() > 1 && row[0].to_lowercase().contains("price return")
    })
}

pub fn total_returns(doc: &FactsheetDocument) -> PeriodValues {
    extract_period_row(&doc.tables, RETURNS_HEADER_KEYWORDS, |row| {
        row.len() > 1 && row[0].to_lowercase().contains("total return")
    })
}

pub fn std_deviation(doc: &FactsheetDocument) -> PeriodValues {
    extract_period_row(&doc.tables, STATISTICS_HEADER_KEYWORDS, |row| {
        !row.is_empty() && {
            let first = row[0].to_lowercase();
            first.contains("std") && first.contains("deviation")
        }
    })
}

pub fn beta(doc: &FactsheetDocument) -> PeriodValues {
    extract_period_row(&doc.tables, STATISTICS_HEADER_KEYWORDS, |row| {
        !row.is_empty()
            && row[0].to_lowercase().contains("beta")
            && row[..row.len().min(3)]
                .join(" ")
                .to_lowercase()
                .contains("nifty")
    })
}

// --- Fundamentals ---

pub fn pe_ratio(doc: &FactsheetDocument) -> Option<f64> {
    fundamental_from_tables(&doc.tables, &["p/e", "pe"])
        .or_else(|| first_numeric_capture(&doc.text, &PE_TEXT_RE))
}

pub fn pb_ratio(doc: &FactsheetDocument) -> Option<f64> {
    fundamental_from_tables(&doc.tables, &["p/b", "pb"])
        .or_else(|| first_numeric_capture(&doc.text, &PB_TEXT_RE))
}

pub fn dividend_yield(doc: &FactsheetDocument) -> Option<f64> {
    fundamental_from_tables(&doc.tables, &["dividend yield", "div yield"])
        .or_else(|| first_numeric_capture(&doc.text, &DIVIDEND_YIELD_TEXT_RE))
}

// --- Search Helpers ---

/// Searches every key against the tables first (labels and values usually
/// land in adjacent cells), then against the raw text lines.
fn find_labelled_value(doc: &FactsheetDocument, search_keys: &[&str]) -> Option<String> {
    for key in search_keys {
        if let Some(value) = find_value_in_tables(&doc.tables, key) {
            return Some(value);
        }
    }
    for key in search_keys {
        if let Some(value) = find_value_in_text(&doc.text, key) {
            return Some(value);
        }
    }
    None
}

/// Looks for a key in any cell and returns the nearest sibling cell that
/// is not just an echo of the label. Most factsheets keep the key in the
/// first column and the value in the second, but some templates swap or
/// pad the columns.
fn find_value_in_tables(tables: &[Table], search_key: &str) -> Option<String> {
    let key = search_key.to_lowercase();

    for table in tables {
        for row in &table.rows {
            for (i, cell) in row.iter().enumerate() {
                let cell_value = normalize_cell(cell);
                if !cell_value.to_lowercase().contains(&key) {
                    continue;
                }

                if let Some(next) = row.get(i + 1) {
                    let next_value = normalize_cell(next);
                    if !next_value.is_empty() && !key.contains(&next_value.to_lowercase()) {
                        return Some(next_value);
                    }
                }
                if i == 1 {
                    let first_value = normalize_cell(&row[0]);
                    if !first_value.is_empty() && !key.contains(&first_value.to_lowercase()) {
                        return Some(first_value);
                    }
                }
                if let Some(third) = row.get(i + 2) {
                    let third_value = normalize_cell(third);
                    if !third_value.is_empty() && !key.contains(&third_value.to_lowercase()) {
                        return Some(third_value);
                    }
                }
            }
        }
    }
    None
}

/// Line-based text search: "key: value" on the same line, else the
/// following line (labels and values get split by PDF reflow).
fn find_value_in_text(text: &str, search_key: &str) -> Option<String> {
    let key = search_key.to_lowercase();
    let lines: Vec<&str> = text.lines().collect();

    for (i, line) in lines.iter().enumerate() {
        if !line.to_lowercase().contains(&key) {
            continue;
        }

        if let Some(caps) = LABEL_VALUE_RE.captures(line) {
            let value = normalize_cell(&caps[1]);
            if !value.is_empty() {
                return Some(value);
            }
        }

        if let Some(next_line) = lines.get(i + 1) {
            let next = next_line.trim();
            if !next.is_empty() && !next.to_lowercase().starts_with(&key) {
                return Some(normalize_cell(next));
            }
        }
    }
    None
}

fn map_period_columns(header: &[String]) -> PeriodColumns {
    let mut cols = PeriodColumns::default();
    for (idx, cell) in header.iter().enumerate() {
        let h = cell.to_lowercase();
        if h.contains("qtd") {
            cols.qtd.get_or_insert(idx);
        } else if h.contains("ytd") {
            cols.ytd.get_or_insert(idx);
        } else if (h.contains("1 year") || h.contains("1year")) && !h.contains('5') {
            cols.one_year.get_or_insert(idx);
        } else if h.contains("5 year") || h.contains("5year") {
            cols.five_years.get_or_insert(idx);
        } else if h.contains("since") && h.contains("inception") {
            cols.since_inception.get_or_insert(idx);
        }
    }
    cols
}

/// Finds the first table whose header mentions the grid keywords and whose
/// body contains a row matching `row_matches`, then pulls that row's cells
/// through the header's column mapping.
fn extract_period_row(
    tables: &[Table],
    header_keywords: &[&str],
    row_matches: impl Fn(&[String]) -> bool,
) -> PeriodValues {
    for table in tables {
        if table.row_count() < 2 {
            continue;
        }
        let header = match table.header() {
            Some(h) => h,
            None => continue,
        };
        let headers_text = header.join(" ").to_lowercase();
        if !header_keywords.iter().any(|k| headers_text.contains(k)) {
            continue;
        }

        let cols = map_period_columns(header);
        for row in table.body() {
            if row_matches(row) {
                let cell = |col: Option<usize>| {
                    col.and_then(|c| row.get(c)).and_then(|v| parse_numeric(v))
                };
                return PeriodValues {
                    qtd: cell(cols.qtd),
                    ytd: cell(cols.ytd),
                    one_year: cell(cols.one_year),
                    five_years: cell(cols.five_years),
                    since_inception: cell(cols.since_inception),
                };
            }
        }
    }
    PeriodValues::default()
}

/// Fundamentals tables keep the metric names in the header and the values
/// in the row below it.
fn fundamental_from_tables(tables: &[Table], cell_keys: &[&str]) -> Option<f64> {
    for table in tables {
        if table.row_count() < 2 {
            continue;
        }
        let header = match table.header() {
            Some(h) => h,
            None => continue,
        };
        let joined = header.join(" ").to_lowercase();
        if !FUNDAMENTALS_HEADER_KEYWORDS.iter().any(|k| joined.contains(k)) {
            continue;
        }

        let value_row = &table.rows[1];
        for (idx, cell) in header.iter().enumerate() {
            let h = cell.to_lowercase();
            if cell_keys.iter().any(|k| h.contains(k)) {
                if let Some(value) = value_row.get(idx).and_then(|v| parse_numeric(v)) {
                    return Some(value);
                }
            }
        }
    }
    None
}

fn first_numeric_capture(text: &str, re: &Regex) -> Option<f64> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| parse_numeric(m.as_str()))
}

// --- Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    fn doc(text: &str) -> FactsheetDocument {
        FactsheetDocument::from_text("ind_test.pdf", text)
    }

    #[test]
    fn test_labelled_fields_from_text_lines() {
        let d = doc("Launch Date: 01 Jan 1996\n\
                     Base Value: 1,000\n\
                     No. of Constituents: 50\n\
                     Calculation Frequency: Real-Time\n\
                     Index Rebalancing: Semi-Annually");

        assert_eq!(
            launch_date(&d),
            NaiveDate::from_ymd_opt(1996, 1, 1)
        );
        assert_eq!(base_value(&d), Some(1000.0));
        assert_eq!(constituents_count(&d), Some(50));
        assert_eq!(calc_frequency(&d).as_deref(), Some("Real-Time"));
        assert_eq!(rebalancing_frequency(&d).as_deref(), Some("Semi-Annually"));
    }

    #[test]
    fn test_label_value_split_across_reflow_lines() {
        let d = doc("Index Methodology\nPeriodic Capped Free Float\nOther text");
        assert_eq!(methodology(&d).as_deref(), Some("Periodic Capped Free Float"));
    }

    #[test]
    fn test_labelled_fields_from_table_cells() {
        let d = doc("Launch Date    01 Apr 2005\n\
                     Base Date    01 Apr 2005\n\
                     Base Value    1000");
        // Key and value live in sibling cells of the same detected table.
        assert_eq!(launch_date(&d), NaiveDate::from_ymd_opt(2005, 4, 1));
        assert_eq!(base_date(&d), NaiveDate::from_ymd_opt(2005, 4, 1));
        assert_eq!(base_value(&d), Some(1000.0));
    }

    #[test]
    fn test_returns_grid_by_header_columns() {
        let d = doc("Returns (%)    QTD    YTD    1 Year    5 Years    Since Inception\n\
                     Price Return    2.1    (4.50)    12.8    14.2    11.9\n\
                     Total Return    2.4    NA    13.6    15.1    12.7");

        let price = price_returns(&d);
        assert_eq!(price.qtd, Some(2.1));
        assert_eq!(price.ytd, Some(-4.5));
        assert_eq!(price.one_year, Some(12.8));
        assert_eq!(price.five_years, Some(14.2));
        assert_eq!(price.since_inception, Some(11.9));

        let total = total_returns(&d);
        assert_eq!(total.qtd, Some(2.4));
        assert_eq!(total.ytd, None); // NA is absent, not zero
        assert_eq!(total.since_inception, Some(12.7));
    }

    #[test]
    fn test_statistics_grid() {
        let d = doc("Statistics    1 Year    5 Years    Since Inception\n\
                     Std. Deviation    14.52    16.01    21.30\n\
                     Beta (Nifty 50)    0.95    0.97    0.92");

        let sd = std_deviation(&d);
        assert_eq!(sd.one_year, Some(14.52));
        assert_eq!(sd.five_years, Some(16.01));
        assert_eq!(sd.since_inception, Some(21.30));

        let b = beta(&d);
        assert_eq!(b.one_year, Some(0.95));
        assert_eq!(b.five_years, Some(0.97));
        assert_eq!(b.since_inception, Some(0.92));
    }

    #[test]
    fn test_fundamentals_from_header_value_table() {
        let d = doc("P/E    P/B    Dividend Yield\n\
                     24.56    7.12    1.02");
        assert_eq!(pe_ratio(&d), Some(24.56));
        assert_eq!(pb_ratio(&d), Some(7.12));
        assert_eq!(dividend_yield(&d), Some(1.02));
    }

    #[test]
    fn test_fundamentals_from_plain_text_lines() {
        let d = doc("P/E: 24.56\nP/B: 7.12\nDividend Yield: 1.02%");
        assert_eq!(pe_ratio(&d), Some(24.56));
        assert_eq!(pb_ratio(&d), Some(7.12));
        assert_eq!(dividend_yield(&d), Some(1.02));
    }

    #[test]
    fn test_missing_fields_never_block_siblings() {
        let d = doc("Launch Date: 01 Jan 1996\nP/E: garbled");
        let record = extract_record(&d, "Nifty 50");

        assert_eq!(record.launch_date, NaiveDate::from_ymd_opt(1996, 1, 1));
        assert_eq!(record.pe_ratio, None); // malformed value is absent
        assert_eq!(record.total_return_ytd, None);
        assert_eq!(record.index_name, "Nifty 50");
        assert_eq!(record.source_filename, "ind_test.pdf");
    }

    #[test]
    fn test_empty_document_still_yields_record() {
        let d = doc("nothing relevant at all");
        let record = extract_record(&d, "Some Index");
        assert_eq!(record.methodology, None);
        assert_eq!(record.constituents_count, None);
        assert_eq!(record.pe_ratio, None);
        assert_eq!(record.index_name, "Some Index");
    }
}
