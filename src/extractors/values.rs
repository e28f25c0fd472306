// src/extractors/values.rs

// --- Imports ---
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

// --- Regex Patterns (Lazy Static) ---
static FIRST_INT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\d+").expect("Failed to compile FIRST_INT_RE")
});

// Date formats seen across factsheet template versions. Tried in order;
// the first that parses wins.
const DATE_FORMATS: &[&str] = &[
    "%d %b %Y",  // 01 Jan 1996
    "%d %B %Y",  // 1 April 2005
    "%d-%b-%Y",  // 01-Jan-1996
    "%b %d, %Y", // Jan 1, 1996
    "%B %d, %Y", // April 1, 1996
    "%d-%m-%Y",  // 01-04-1996
    "%d/%m/%Y",  // 01/04/1996
];

/// Markers the documents use for "not reported". Distinct from zero:
/// a field carrying one of these is absent, never 0.
pub fn is_explicit_absent(raw: &str) -> bool {
    matches!(
        raw.trim().to_lowercase().as_str(),
        "na" | "n/a" | "-" | "–" | "—" | "nil"
    )
}

/// Parses a numeric cell or text fragment from reflowed PDF content.
///
/// Tolerates thousands separators, percent signs, stray whitespace from
/// line-break artifacts, and accounting-style parenthesized negatives
/// ("(2.50)" is -2.50). Explicit absence markers and anything that still
/// fails to parse yield `None`.
pub fn parse_numeric(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || is_explicit_absent(trimmed) {
        return None;
    }

    let cleaned: String = trimmed
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',' && *c != '%')
        .collect();
    if cleaned.is_empty() {
        return None;
    }

    let negative = cleaned.starts_with('(') && cleaned.ends_with(')') && cleaned.len() > 2;
    let core = if negative {
        &cleaned[1..cleaned.len() - 1]
    } else {
        cleaned.as_str()
    };

    core.parse::<f64>().ok().map(|v| if negative { -v } else { v })
}

/// Parses a constituent count: the first integer token in the value,
/// thousands separators removed.
pub fn parse_count(raw: &str) -> Option<u32> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || is_explicit_absent(trimmed) {
        return None;
    }
    let cleaned = trimmed.replace(',', "");
    FIRST_INT_RE
        .find(&cleaned)
        .and_then(|m| m.as_str().parse::<u32>().ok())
}

/// Parses the textual and numeric day-month-year formats the factsheets
/// use. An unrecognized format is absent, not an error.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim().trim_end_matches('.').trim();
    if trimmed.is_empty() || is_explicit_absent(trimmed) {
        return None;
    }

    let collapsed = crate::pdf::tables::normalize_cell(trimmed);
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(&collapsed, format) {
            return Some(date);
        }
    }
    None
}

// --- Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_numbers() {
        assert_eq!(parse_numeric("24.56"), Some(24.56));
        assert_eq!(parse_numeric(" 1000 "), Some(1000.0));
        assert_eq!(parse_numeric("-2.3"), Some(-2.3));
        assert_eq!(parse_numeric("+5.2"), Some(5.2));
    }

    #[test]
    fn test_parenthesized_negative() {
        assert_eq!(parse_numeric("(2.50)"), Some(-2.50));
        assert_eq!(parse_numeric("(2.3%)"), Some(-2.3));
    }

    #[test]
    fn test_explicit_absence_is_not_zero() {
        assert_eq!(parse_numeric("NA"), None);
        assert_eq!(parse_numeric("N/A"), None);
        assert_eq!(parse_numeric("-"), None);
        assert_eq!(parse_numeric("–"), None);
        assert_eq!(parse_numeric(""), None);
    }

    #[test]
    fn test_separators_and_percent_signs() {
        assert_eq!(parse_numeric("1,234.5"), Some(1234.5));
        assert_eq!(parse_numeric("12.3%"), Some(12.3));
        assert_eq!(parse_numeric("1, 234"), Some(1234.0));
    }

    #[test]
    fn test_garbled_value_is_absent() {
        assert_eq!(parse_numeric("abc"), None);
        assert_eq!(parse_numeric("12.3.4"), None);
    }

    #[test]
    fn test_count_takes_first_integer() {
        assert_eq!(parse_count("50"), Some(50));
        assert_eq!(parse_count("1,000"), Some(1000));
        assert_eq!(parse_count("50 companies"), Some(50));
        assert_eq!(parse_count("N/A"), None);
        assert_eq!(parse_count("many"), None);
    }

    #[test]
    fn test_date_formats() {
        let expected = NaiveDate::from_ymd_opt(1996, 4, 1).unwrap();
        assert_eq!(parse_date("01 Apr 1996"), Some(expected));
        assert_eq!(parse_date("1 April 1996"), Some(expected));
        assert_eq!(parse_date("April 1, 1996"), Some(expected));
        assert_eq!(parse_date("01-04-1996"), Some(expected));
        assert_eq!(parse_date("01/04/1996"), Some(expected));
        assert_eq!(parse_date("01 Apr 1996."), Some(expected));
    }

    #[test]
    fn test_unparseable_date_is_absent() {
        assert_eq!(parse_date("sometime in 1996"), None);
        assert_eq!(parse_date("NA"), None);
        assert_eq!(parse_date(""), None);
    }
}
