// src/batch.rs

// --- Imports ---
use serde::Serialize;

use crate::extractors::{self, AbbreviationTable, IndexRecord, SectorRow};
use crate::pdf::FactsheetDocument;

// --- Data Structures ---
/// End-of-run accounting, also serialized alongside the output tables.
#[derive(Debug, Default, Serialize)]
pub struct BatchSummary {
    pub processed: usize,
    pub skipped: usize,
    pub without_sector_table: usize,
    pub skip_reasons: Vec<SkippedFile>,
}

#[derive(Debug, Serialize)]
pub struct SkippedFile {
    pub filename: String,
    pub reason: String,
}

/// Accumulates the outputs of a directory scan. Passed explicitly through
/// the driver loop; there is no global mutable state, so processing stays
/// parallelizable by file if that is ever wanted.
#[derive(Debug, Default)]
pub struct BatchContext {
    pub records: Vec<IndexRecord>,
    pub sector_rows: Vec<SectorRow>,
    pub summary: BatchSummary,
}

#[derive(Debug, Clone, Copy)]
pub struct ProcessOptions {
    pub records: bool,
    pub sectors: bool,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self { records: true, sectors: true }
    }
}

impl BatchContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs both extraction pipelines over one acquired document and
    /// appends the results. Exactly one record is emitted per document;
    /// field-level misses never surface here. The only per-file fatal
    /// condition is upstream, in acquisition.
    pub fn process_document(
        &mut self,
        doc: &FactsheetDocument,
        abbrevs: &AbbreviationTable,
        options: ProcessOptions,
    ) {
        let index_name = extractors::resolve_index_name(&doc.text, &doc.filename, abbrevs);

        if options.records {
            self.records.push(extractors::extract_record(doc, &index_name));
            tracing::info!("Extracted record for {}", index_name);
        }

        if options.sectors {
            match extractors::extract_sector_weights(doc) {
                Some(weights) => {
                    tracing::info!("Extracted {} sector(s) for {}", weights.len(), index_name);
                    for (sector_name, weight_percent) in weights {
                        self.sector_rows.push(SectorRow {
                            index_name: index_name.clone(),
                            source_filename: doc.filename.clone(),
                            sector_name,
                            weight_percent,
                        });
                    }
                }
                None => {
                    tracing::info!("No sector table in {}", doc.filename);
                    self.summary.without_sector_table += 1;
                }
            }
        }

        self.summary.processed += 1;
    }

    /// Records a file-level failure and moves on; one bad file never
    /// aborts the batch.
    pub fn record_skip(&mut self, filename: &str, reason: String) {
        tracing::warn!("Skipping {}: {}", filename, reason);
        self.summary.skipped += 1;
        self.summary.skip_reasons.push(SkippedFile {
            filename: filename.to_string(),
            reason,
        });
    }
}
