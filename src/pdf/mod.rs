// src/pdf/mod.rs
pub mod reader;
pub mod tables;

// Re-export the acquisition types for convenience
pub use reader::{read_factsheet, FactsheetDocument};
pub use tables::Table;
