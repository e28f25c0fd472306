// src/pdf/tables.rs

// --- Imports ---
use once_cell::sync::Lazy;
use regex::Regex;

// --- Regex Patterns (Lazy Static) ---
// Columns in reflowed PDF text are separated by runs of spaces; single
// spaces belong to multi-word cell content ("Financial Services").
static CELL_SPLIT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\t|\s{2,}").expect("Failed to compile CELL_SPLIT_RE")
});

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s+").expect("Failed to compile WHITESPACE_RE")
});

// --- Data Structures ---
/// One table recovered from the extracted text: a run of consecutive lines
/// that each broke into two or more cells. The first row is the candidate
/// header.
#[derive(Debug, Clone)]
pub struct Table {
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    pub fn header(&self) -> Option<&[String]> {
        self.rows.first().map(|r| r.as_slice())
    }

    pub fn body(&self) -> &[Vec<String>] {
        if self.rows.len() > 1 {
            &self.rows[1..]
        } else {
            &[]
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Collapses runs of whitespace (including line-break artifacts from PDF
/// reflow) into single spaces and trims the result.
pub fn normalize_cell(raw: &str) -> String {
    WHITESPACE_RE.replace_all(raw.trim(), " ").into_owned()
}

fn split_cells(line: &str) -> Vec<String> {
    CELL_SPLIT_RE
        .split(line.trim())
        .map(normalize_cell)
        .filter(|c| !c.is_empty())
        .collect()
}

/// Scans extracted text for table regions.
///
/// A table is a maximal run of at least two consecutive lines that each
/// split into two or more cells on multi-space/tab boundaries. Anything
/// else (prose, single key: value lines) is left to the line-based text
/// search paths.
pub fn detect_tables(text: &str) -> Vec<Table> {
    let mut tables = Vec::new();
    let mut current: Vec<Vec<String>> = Vec::new();

    for line in text.lines() {
        let cells = split_cells(line);
        if cells.len() >= 2 {
            current.push(cells);
        } else {
            flush_table(&mut current, &mut tables);
        }
    }
    flush_table(&mut current, &mut tables);

    tracing::trace!("Detected {} table region(s)", tables.len());
    tables
}

fn flush_table(current: &mut Vec<Vec<String>>, tables: &mut Vec<Table>) {
    if current.len() >= 2 {
        tables.push(Table::new(std::mem::take(current)));
    } else {
        current.clear();
    }
}

// --- Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_aligned_region_as_table() {
        let text = "Some intro prose about the index.\n\
                    Sector          Weightage (%)\n\
                    Financial Services    35.20\n\
                    Information Technology   18.4\n\
                    \n\
                    Closing remarks.";

        let tables = detect_tables(text);
        assert_eq!(tables.len(), 1);
        let table = &tables[0];
        assert_eq!(table.rows[0], vec!["Sector", "Weightage (%)"]);
        assert_eq!(table.body().len(), 2);
        assert_eq!(table.body()[0], vec!["Financial Services", "35.20"]);
    }

    #[test]
    fn test_single_aligned_line_is_not_a_table() {
        let text = "prose\nKey    Value\nmore prose";
        assert!(detect_tables(text).is_empty());
    }

    #[test]
    fn test_separate_regions_become_separate_tables() {
        let text = "A    B\nC    D\n\nE    F\nG    H\nI    J";
        let tables = detect_tables(text);
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].row_count(), 2);
        assert_eq!(tables[1].row_count(), 3);
    }

    #[test]
    fn test_cells_are_whitespace_normalized() {
        assert_eq!(normalize_cell("  Financial \n Services  "), "Financial Services");
    }
}
