// src/main.rs
mod batch;
mod extractors;
mod pdf;
mod storage;
mod utils;

use std::path::{Path, PathBuf};

use clap::Parser;

use batch::{BatchContext, ProcessOptions};
use extractors::AbbreviationTable;
use pdf::FactsheetDocument;
use storage::StorageManager;
use utils::AppError;

/// Command Line Interface for the factsheet extraction pipeline
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory containing downloaded factsheet PDFs
    #[arg(short, long, default_value = "./Factsheets")]
    factsheets_dir: PathBuf,

    /// Output directory for the extracted tables
    #[arg(short, long, default_value = "./parsed_data")]
    output_dir: PathBuf,

    /// Process a single factsheet by file stem (without .pdf)
    #[arg(long)]
    index: Option<String>,

    /// Skip the per-index record table
    #[arg(long)]
    no_records: bool,

    /// Skip the sector-weight table
    #[arg(long)]
    no_sectors: bool,

    /// JSON file of abbreviation expansions used during name normalization
    #[arg(long)]
    abbreviations: Option<PathBuf>,

    /// Debug mode - save raw and annotated text for each factsheet
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<(), AppError> {
    // 1. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging();

    // 2. Parse CLI Arguments
    let args = Args::parse();
    tracing::info!("Starting processing for args: {:?}", args);

    // 3. Load the abbreviation table (built-in defaults unless overridden)
    let abbrevs = match &args.abbreviations {
        Some(path) => AbbreviationTable::from_json_file(path)?,
        None => AbbreviationTable::with_defaults(),
    };

    // 4. Initialize storage
    let storage = StorageManager::new(&args.output_dir)?;

    // 5. Enumerate factsheets
    let pdf_files = list_factsheets(&args.factsheets_dir, args.index.as_deref())?;
    if pdf_files.is_empty() {
        return Err(AppError::Config(format!(
            "No PDF files found in {}",
            args.factsheets_dir.display()
        )));
    }
    tracing::info!("Found {} factsheet(s) to process", pdf_files.len());

    let options = ProcessOptions {
        records: !args.no_records,
        sectors: !args.no_sectors,
    };
    let mut ctx = BatchContext::new();

    // 6. Process each factsheet; one file's failure never aborts the batch
    for path in &pdf_files {
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        tracing::info!("Processing: {}", filename);

        match pdf::read_factsheet(path) {
            Ok(doc) => {
                if args.debug {
                    if let Err(e) = save_debug_artifacts(&args.output_dir, &doc) {
                        tracing::warn!("Failed to save debug artifacts for {}: {}", filename, e);
                    }
                }
                ctx.process_document(&doc, &abbrevs, options);
            }
            Err(e) => ctx.record_skip(&filename, e.to_string()),
        }
    }

    // 7. Write aggregate outputs
    if options.records {
        let path = storage.write_index_table(&ctx.records)?;
        tracing::info!("Saved index table to: {}", path.display());
    }
    if options.sectors {
        let path = storage.write_sector_table(&ctx.sector_rows)?;
        tracing::info!("Saved sector table to: {}", path.display());
    }
    let summary_path = storage.save_run_summary(&ctx.summary)?;
    tracing::info!("Saved run summary to: {}", summary_path.display());

    tracing::info!(
        "Processing finished. Processed: {}, Skipped: {}, Without sector table: {}",
        ctx.summary.processed,
        ctx.summary.skipped,
        ctx.summary.without_sector_table
    );

    Ok(())
}

/// Lists the PDFs to process, sorted by filename so output ordering is
/// stable across runs. With `--index` only that one stem is considered.
fn list_factsheets(dir: &Path, stem: Option<&str>) -> Result<Vec<PathBuf>, AppError> {
    if let Some(stem) = stem {
        let path = dir.join(format!("{stem}.pdf"));
        return Ok(if path.is_file() { vec![path] } else { Vec::new() });
    }

    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .map(|ext| ext.eq_ignore_ascii_case("pdf"))
                    .unwrap_or(false)
        })
        .collect();
    files.sort();
    Ok(files)
}

/// Saves the raw extracted text plus a copy annotated with the positions
/// the name and sector patterns fire at, for diagnosing mis-extractions.
fn save_debug_artifacts(output_dir: &Path, doc: &FactsheetDocument) -> Result<(), AppError> {
    let stem = doc.filename.trim_end_matches(".pdf");
    let debug_dir = format!("{}/debug/{}", output_dir.display(), stem);
    std::fs::create_dir_all(&debug_dir)?;

    let raw_path = format!("{}/raw_text.txt", debug_dir);
    std::fs::write(&raw_path, &doc.text)?;
    tracing::info!("Saved raw text to: {}", raw_path);

    let debug_patterns = [
        (r"(?i)Index\s+Variant:[^\n]*", "label"),
        (r"(?i)The\s+Nifty[^\n]{0,80}?\s+[Ii]ndex", "descriptive"),
        (r"(?i)sector\s*(?:representation|breakdown|weight)[^\n]*", "sector"),
    ];
    let annotated_path = format!("{}/text_annotated.txt", debug_dir);
    utils::text_debug::create_debug_text(&doc.text, &annotated_path, &debug_patterns)?;
    tracing::info!("Saved annotated text to: {}", annotated_path);

    Ok(())
}
