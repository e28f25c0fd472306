// src/utils/error.rs
#![allow(dead_code)]
use thiserror::Error;

// Define specific error types for different parts of the application.
// Field-level conditions (a pattern not matching, a garbled number, a
// factsheet with no sector table) are deliberately NOT errors: they are
// modeled as `None` at the extraction site and never propagate.

#[derive(Error, Debug)]
pub enum PdfError {
    #[error("Could not extract text from PDF: {0}")]
    Extraction(#[from] pdf_extract::OutputError),

    #[error("No text content in {0}")]
    EmptyDocument(String),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error), // Automatically convert IO errors

    #[error("PDF reading failed: {0}")]
    Pdf(#[from] PdfError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}
