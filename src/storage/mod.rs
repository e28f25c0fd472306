// src/storage/mod.rs
use std::collections::BTreeSet;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::batch::BatchSummary;
use crate::extractors::{IndexRecord, SectorRow};
use crate::utils::error::StorageError;

/// Column order of the index table. Fixed and documented: downstream
/// consumers cross-reference these positions.
pub const INDEX_TABLE_COLUMNS: [&str; 28] = [
    "Indices Name",
    "Filename",
    "Methodology",
    "No. of Constituents",
    "Launch Date",
    "Base Date",
    "Base Value",
    "Calculation Frequency",
    "Index Rebalancing",
    "Price Returns QTD",
    "Price Returns YTD",
    "Price Returns 1 year",
    "Price Returns 5 years",
    "Price Returns Since Inception",
    "Total Returns QTD",
    "Total Returns YTD",
    "Total Returns 1 year",
    "Total Returns 5 years",
    "Total Returns Since Inception",
    "Standard Deviation 1 year",
    "Standard Deviation 5 year",
    "Standard Deviation Since Inception",
    "Beta (Nifty 50) 1 year",
    "Beta (Nifty 50) 5 years",
    "Beta (Nifty 50) Since Inception",
    "P/E",
    "P/B",
    "Dividend Yield",
];

pub const INDEX_TABLE_FILENAME: &str = "Indices-Table 1.csv";
pub const SECTOR_TABLE_FILENAME: &str = "Sector-Table 1.csv";
pub const RUN_SUMMARY_FILENAME: &str = "run_summary.json";

pub struct StorageManager {
    base_dir: PathBuf,
}

impl StorageManager {
    /// Creates a new StorageManager with the specified base directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self, StorageError> {
        let base_path = base_dir.as_ref().to_path_buf();

        // Create the base directory if it doesn't exist
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(StorageError::IoError)?;
        }

        Ok(Self { base_dir: base_path })
    }

    /// Writes the index table: one row per processed factsheet, columns in
    /// the fixed `INDEX_TABLE_COLUMNS` order. Re-runs overwrite wholesale.
    pub fn write_index_table(&self, records: &[IndexRecord]) -> Result<PathBuf, StorageError> {
        let file_path = self.base_dir.join(INDEX_TABLE_FILENAME);
        let mut file = fs::File::create(&file_path).map_err(StorageError::IoError)?;

        write_csv_row(&mut file, &INDEX_TABLE_COLUMNS)?;
        for record in records {
            write_csv_row(&mut file, &index_record_cells(record))?;
        }

        tracing::info!("Saved {} record(s) to {}", records.len(), file_path.display());
        Ok(file_path)
    }

    /// Writes the sector table as a sparse matrix: `Indices` and `Filename`
    /// leading, then one column per discovered sector, sorted
    /// alphabetically. Cells with no data stay empty; an explicit zero is
    /// written out, the two are never conflated.
    pub fn write_sector_table(&self, rows: &[SectorRow]) -> Result<PathBuf, StorageError> {
        let file_path = self.base_dir.join(SECTOR_TABLE_FILENAME);
        let mut file = fs::File::create(&file_path).map_err(StorageError::IoError)?;

        let sectors: BTreeSet<&str> = rows.iter().map(|r| r.sector_name.as_str()).collect();

        // One output row per source document, in first-seen order.
        let mut groups: Vec<(&str, &str)> = Vec::new();
        for row in rows {
            let key = (row.index_name.as_str(), row.source_filename.as_str());
            if !groups.contains(&key) {
                groups.push(key);
            }
        }

        let mut header: Vec<&str> = vec!["Indices", "Filename"];
        header.extend(sectors.iter().copied());
        write_csv_row(&mut file, &header)?;

        for (index_name, filename) in groups {
            let mut cells: Vec<String> = vec![index_name.to_string(), filename.to_string()];
            for sector in &sectors {
                let weight = rows
                    .iter()
                    .rev()
                    .find(|r| {
                        r.index_name == index_name
                            && r.source_filename == filename
                            && r.sector_name == *sector
                    })
                    .map(|r| format_f64(r.weight_percent))
                    .unwrap_or_default();
                cells.push(weight);
            }
            write_csv_row(&mut file, &cells)?;
        }

        tracing::info!(
            "Saved sector matrix ({} sector column(s)) to {}",
            sectors.len(),
            file_path.display()
        );
        Ok(file_path)
    }

    /// Saves the run summary in JSON format next to the tables.
    pub fn save_run_summary(&self, summary: &BatchSummary) -> Result<PathBuf, StorageError> {
        let file_path = self.base_dir.join(RUN_SUMMARY_FILENAME);

        let metadata = serde_json::json!({
            "processed": summary.processed,
            "skipped": summary.skipped,
            "without_sector_table": summary.without_sector_table,
            "skip_reasons": summary.skip_reasons,
            "completed_at": chrono::Utc::now().to_rfc3339(),
        });

        let metadata_str = serde_json::to_string_pretty(&metadata)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;

        fs::write(&file_path, metadata_str).map_err(StorageError::IoError)?;

        tracing::info!("Saved run summary to {}", file_path.display());
        Ok(file_path)
    }
}

// --- Cell Formatting ---

fn index_record_cells(record: &IndexRecord) -> Vec<String> {
    vec![
        record.index_name.clone(),
        record.source_filename.clone(),
        format_opt_str(&record.methodology),
        record.constituents_count.map(|c| c.to_string()).unwrap_or_default(),
        format_opt_date(record.launch_date),
        format_opt_date(record.base_date),
        format_opt_f64(record.base_value),
        format_opt_str(&record.calc_frequency),
        format_opt_str(&record.rebalancing_frequency),
        format_opt_f64(record.price_return_qtd),
        format_opt_f64(record.price_return_ytd),
        format_opt_f64(record.price_return_1y),
        format_opt_f64(record.price_return_5y),
        format_opt_f64(record.price_return_inception),
        format_opt_f64(record.total_return_qtd),
        format_opt_f64(record.total_return_ytd),
        format_opt_f64(record.total_return_1y),
        format_opt_f64(record.total_return_5y),
        format_opt_f64(record.total_return_inception),
        format_opt_f64(record.std_dev_1y),
        format_opt_f64(record.std_dev_5y),
        format_opt_f64(record.std_dev_inception),
        format_opt_f64(record.beta_1y),
        format_opt_f64(record.beta_5y),
        format_opt_f64(record.beta_inception),
        format_opt_f64(record.pe_ratio),
        format_opt_f64(record.pb_ratio),
        format_opt_f64(record.dividend_yield),
    ]
}

fn format_f64(value: f64) -> String {
    format!("{}", value)
}

fn format_opt_f64(value: Option<f64>) -> String {
    value.map(format_f64).unwrap_or_default()
}

fn format_opt_date(value: Option<NaiveDate>) -> String {
    value.map(|d| d.format("%d %b %Y").to_string()).unwrap_or_default()
}

fn format_opt_str(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

// --- CSV Row Writer ---

fn needs_quotes(field: &str) -> bool {
    field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r')
}

/// Writes a single CSV row, quoting only the cells that need it.
fn write_csv_row<W: Write, S: AsRef<str>>(w: &mut W, row: &[S]) -> io::Result<()> {
    let mut first = true;
    for cell in row {
        let cell = cell.as_ref();
        if !first {
            write!(w, ",")?;
        } else {
            first = false;
        }
        if needs_quotes(cell) {
            let escaped = cell.replace('"', "\"\"");
            write!(w, "\"{}\"", escaped)?;
        } else {
            write!(w, "{}", cell)?;
        }
    }
    writeln!(w)?;
    Ok(())
}
