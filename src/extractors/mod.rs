// src/extractors/mod.rs
pub mod fields;
pub mod index_name;
pub mod sectors;
pub mod values;

// Re-export key extraction types for convenience
pub use fields::{extract_record, IndexRecord};
pub use index_name::{resolve_index_name, AbbreviationTable};
pub use sectors::{extract_sector_weights, SectorRow};
