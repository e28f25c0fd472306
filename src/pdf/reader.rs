// src/pdf/reader.rs

// --- Imports ---
use std::path::Path;

use crate::pdf::tables::{self, Table};
use crate::utils::error::PdfError;

// --- Data Structures ---
/// Everything the extractors need from one factsheet PDF: the full
/// page-ordered text and the table regions detected in it.
#[derive(Debug, Clone)]
pub struct FactsheetDocument {
    pub filename: String,
    pub text: String,
    pub tables: Vec<Table>,
}

impl FactsheetDocument {
    /// Builds a document from already-extracted text. Extraction logic is
    /// exercised through this in tests, without PDF fixtures.
    pub fn from_text(filename: &str, text: &str) -> Self {
        Self {
            filename: filename.to_string(),
            text: text.to_string(),
            tables: tables::detect_tables(text),
        }
    }
}

/// Opens one PDF and acquires its text and tables.
///
/// Any failure here is the per-file fatal class: the caller skips the file
/// and moves on. An extraction that succeeds but yields no text at all is
/// treated the same way.
pub fn read_factsheet(path: &Path) -> Result<FactsheetDocument, PdfError> {
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();

    tracing::debug!("Extracting text from {}", path.display());
    let text = pdf_extract::extract_text(path)?;

    if text.trim().is_empty() {
        return Err(PdfError::EmptyDocument(filename));
    }

    let doc = FactsheetDocument::from_text(&filename, &text);
    tracing::debug!(
        "Extracted {} bytes of text and {} candidate table(s) from {}",
        doc.text.len(),
        doc.tables.len(),
        doc.filename
    );
    Ok(doc)
}
