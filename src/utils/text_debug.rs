// src/utils/text_debug.rs
use std::fs::File;
use std::io::Write;
use std::path::Path;
use crate::utils::error::AppError;

/// Saves extracted text to a file with match ranges marked inline.
/// Each highlight is `(start, end, tag)` in byte offsets into `text`.
pub fn save_debug_text(text: &str, filename: &str, highlights: &[(usize, usize, &str)]) -> Result<(), AppError> {
    let path = Path::new(filename);
    let mut file = File::create(path)?;

    let mut annotated = String::with_capacity(text.len() + highlights.len() * 16);
    let mut sorted_highlights = highlights.to_vec();
    sorted_highlights.sort_by_key(|h| h.0); // Sort by position

    let mut last_pos = 0;
    for (start, end, tag) in sorted_highlights {
        // Overlapping matches would produce out-of-order slices; keep the first.
        if start < last_pos || end > text.len() {
            continue;
        }
        if start > last_pos {
            annotated.push_str(&text[last_pos..start]);
        }
        annotated.push_str(&format!("<<{}:", tag));
        annotated.push_str(&text[start..end]);
        annotated.push_str(">>");
        last_pos = end;
    }
    if last_pos < text.len() {
        annotated.push_str(&text[last_pos..]);
    }

    file.write_all(annotated.as_bytes())?;

    tracing::info!("Saved debug text to {}", path.display());
    Ok(())
}

/// Creates a debug copy of extracted text with locations of the given regex
/// patterns marked, one tag per pattern.
pub fn create_debug_text(text: &str, filename: &str, patterns: &[(&str, &str)]) -> Result<(), AppError> {
    use regex::Regex;

    let mut highlights = Vec::new();

    for (pattern, tag) in patterns {
        let re = Regex::new(pattern).map_err(|e| {
            AppError::Config(format!("Invalid regex pattern '{}': {}", pattern, e))
        })?;

        for mat in re.find_iter(text) {
            highlights.push((mat.start(), mat.end(), *tag));
        }
    }

    save_debug_text(text, filename, &highlights)
}
