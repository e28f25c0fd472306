// src/extractors/index_name.rs

// --- Imports ---
use std::collections::BTreeMap;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::pdf::tables::normalize_cell;
use crate::utils::error::AppError;

// --- Regex Patterns for Name Strategies (Lazy Static) ---
// Ordered by confidence. Each group is attempted independently against the
// full document text; the first group that yields a plausible name wins.

// Strategy 1: explicit "Index Variant:" label. Highest confidence.
// e.g. "Index Variant: Nifty500 Multicap Momentum Quality 50 Total Returns Index."
static LABELLED_NAME_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)Index\s+Variant:\s*(Nifty[^\n]{0,100}?)(?:\s+Total\s+Returns\s+Index|\s+Total\s+Returns|\s+Index)",
        r"(?im)Index\s+Variant:\s*(Nifty[^\n]{0,100}?)\s*(?:\.|$)",
    ]
    .iter()
    .filter_map(|pat| Regex::new(pat).ok())
    .collect()
});

// Strategy 2: a quoted name immediately followed by "Index". Factsheets use
// both straight and curly quotes depending on template vintage.
static QUOTED_NAME_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [r#"(?i)['‘’“”"](Nifty[^'‘’“”"]{0,60}?)['‘’“”"]\s+Index"#]
        .iter()
        .filter_map(|pat| Regex::new(pat).ok())
        .collect()
});

// Strategy 3: descriptive sentences ("The <name> index includes...").
static DESCRIPTIVE_NAME_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)The\s+(Nifty\S+(?:\s+[A-Za-z0-9\-]+){0,10})\s+index\s+(?:includes|which|is|aims|represents)",
        r"(?i)(Nifty\S+(?:\s+[A-Za-z0-9\-]+){0,10})\s+index\s+aims",
        r"(?i)The\s+(Nifty\s+(?:LargeMidcap|Midcap|Microcap|Smallcap|Alpha|Healthcare|High\s+Beta|Low\s+Volatility|Quality|50\s+Arbitrage)[^\n]{0,50}?)(?:\s+Index|\s+Total\s+Returns|\s+reflects)",
        r"(?i)The\s+(Nifty[^\n]{0,80}?)(?:\s+Index|\s+Total\s+Returns|\s+reflects)",
    ]
    .iter()
    .filter_map(|pat| Regex::new(pat).ok())
    .collect()
});

// Strategy 4: variant-suffix names whose punctuation defeats the generic
// sentence patterns, plus the bare fallbacks.
static VARIANT_NAME_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)(Nifty\s+(?:Alpha\s+)?(?:Quality\s+)?(?:Value\s+)?Low-Volatility\s+30)\s+Index\s+(?:is|which|aims)",
        r"(?i)(Nifty\s+[A-Za-z0-9\s\-]{0,50}?)\s+Index",
        r"(?i)(Nifty\s+Next\s+50)",
        r"(?i)(Nifty\s+50)",
    ]
    .iter()
    .filter_map(|pat| Regex::new(pat).ok())
    .collect()
});

// Trailing suffixes stripped during normalization, longest first.
static TRAILING_SUFFIX_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)\s+Total\s+Returns\s+Index\.?\s*$",
        r"(?i)\s+Total\s+Returns\.?\s*$",
        r"(?i)\s+Index\.?\s*$",
    ]
    .iter()
    .filter_map(|pat| Regex::new(pat).ok())
    .collect()
});

// Filename-derivation helpers.
static FILENAME_IND_PREFIX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^ind[_\s]+").expect("Failed to compile FILENAME_IND_PREFIX_RE")
});
static FILENAME_FACTSHEET_PREFIX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^factsheet[_\s]+").expect("Failed to compile FILENAME_FACTSHEET_PREFIX_RE")
});
static CAMEL_BOUNDARY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([a-z0-9])([A-Z])").expect("Failed to compile CAMEL_BOUNDARY_RE")
});
static DIGIT_RUN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([A-Za-z])(\d)").expect("Failed to compile DIGIT_RUN_RE")
});

// --- Abbreviation Table ---
/// Known abbreviation expansions applied during name normalization.
///
/// The set is configuration data, not hardwired logic: new index families
/// keep introducing new shorthand, so defaults can be replaced with a JSON
/// map (`{"Div Opp": "Dividend Opportunities", ...}`).
pub struct AbbreviationTable {
    expansions: Vec<(Regex, String)>,
}

const DEFAULT_ABBREVIATIONS: &[(&str, &str)] = &[
    ("Div Opps", "Dividend Opportunities"),
    ("Div Opp", "Dividend Opportunities"),
    ("Fin Srv", "Financial Services"),
    ("Pvt", "Private"),
];

impl AbbreviationTable {
    pub fn with_defaults() -> Self {
        Self::from_pairs(
            DEFAULT_ABBREVIATIONS
                .iter()
                .map(|(abbr, full)| (abbr.to_string(), full.to_string())),
        )
    }

    /// Loads an expansion map from a JSON object file. Entries are applied
    /// longest-abbreviation-first so overlapping keys behave predictably.
    pub fn from_json_file(path: &Path) -> Result<Self, AppError> {
        let raw = std::fs::read_to_string(path)?;
        let map: BTreeMap<String, String> = serde_json::from_str(&raw).map_err(|e| {
            AppError::Config(format!(
                "Invalid abbreviation table {}: {}",
                path.display(),
                e
            ))
        })?;
        let mut pairs: Vec<(String, String)> = map.into_iter().collect();
        pairs.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then(a.0.cmp(&b.0)));
        Ok(Self::from_pairs(pairs.into_iter()))
    }

    fn from_pairs(pairs: impl Iterator<Item = (String, String)>) -> Self {
        let expansions = pairs
            .filter_map(|(abbr, full)| {
                let pattern = format!(r"(?i)\b{}\b", regex::escape(&abbr));
                Regex::new(&pattern).ok().map(|re| (re, full))
            })
            .collect();
        Self { expansions }
    }

    pub fn expand(&self, name: &str) -> String {
        let mut out = name.to_string();
        for (re, full) in &self.expansions {
            out = re.replace_all(&out, full.as_str()).into_owned();
        }
        out
    }
}

// --- Resolution ---

/// Resolves the display name of the index described by one factsheet.
///
/// Strategies are tried in confidence order against the full text; whichever
/// fires, the match goes through the same normalization. The filename
/// fallback practically always succeeds, so callers can rely on a non-empty
/// name whenever a filename is available.
pub fn resolve_index_name(text: &str, filename: &str, abbrevs: &AbbreviationTable) -> String {
    let strategies: [(&str, &Lazy<Vec<Regex>>); 4] = [
        ("labelled", &LABELLED_NAME_RES),
        ("quoted", &QUOTED_NAME_RES),
        ("descriptive", &DESCRIPTIVE_NAME_RES),
        ("variant", &VARIANT_NAME_RES),
    ];

    for (strategy, patterns) in strategies {
        if let Some(name) = first_plausible_match(text, patterns, abbrevs) {
            tracing::debug!("Resolved index name via {} pattern: '{}'", strategy, name);
            return name;
        }
    }

    let name = name_from_filename(filename, abbrevs);
    tracing::debug!("Resolved index name from filename: '{}'", name);
    name
}

fn first_plausible_match(
    text: &str,
    patterns: &[Regex],
    abbrevs: &AbbreviationTable,
) -> Option<String> {
    for re in patterns {
        if let Some(caps) = re.captures(text) {
            if let Some(m) = caps.get(1) {
                let name = normalize_name(m.as_str(), abbrevs);
                if is_plausible(&name) {
                    return Some(name);
                }
                tracing::trace!("Rejected implausible name candidate: '{}'", name);
            }
        }
    }
    None
}

/// Uniform cleanup applied to every strategy's output: collapse whitespace,
/// strip the "Total Returns Index" family of trailing suffixes and trailing
/// punctuation, expand known abbreviations.
fn normalize_name(raw: &str, abbrevs: &AbbreviationTable) -> String {
    let mut name = normalize_cell(raw);
    for re in TRAILING_SUFFIX_RES.iter() {
        name = re.replace(&name, "").into_owned();
    }
    let name = name
        .trim_end_matches(|c| matches!(c, '.' | ',' | ':' | ';'))
        .trim();
    abbrevs.expand(name).trim().to_string()
}

// Mid-sentence enumerations ("the Nifty 100 and the Nifty Midcap 150") and
// bare fragments are not names.
fn is_plausible(name: &str) -> bool {
    name.len() > 5 && !name.to_lowercase().contains("and the")
}

/// Last-resort name derived from the filename alone: strip known prefixes,
/// turn separators into spaces, split camel-case runs, space out digit
/// groups, then normalize like any other candidate.
fn name_from_filename(filename: &str, abbrevs: &AbbreviationTable) -> String {
    let stem = Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(filename);

    let without_factsheet = FILENAME_FACTSHEET_PREFIX_RE.replace(stem, "");
    let had_ind_prefix = FILENAME_IND_PREFIX_RE.is_match(&without_factsheet);
    let stripped = FILENAME_IND_PREFIX_RE.replace(&without_factsheet, "");

    let mut name = stripped.replace(['_', '-'], " ");
    name = CAMEL_BOUNDARY_RE.replace_all(&name, "$1 $2").into_owned();
    name = DIGIT_RUN_RE.replace_all(&name, "$1 $2").into_owned();

    if had_ind_prefix && !name.to_lowercase().starts_with("nifty") {
        name = format!("Nifty {}", name);
    }

    normalize_name(&name, abbrevs)
}

// --- Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(text: &str, filename: &str) -> String {
        resolve_index_name(text, filename, &AbbreviationTable::with_defaults())
    }

    #[test]
    fn test_labelled_name_is_returned_verbatim_normalized() {
        let text = "About the index\n\
                    Index Variant: Nifty200 Momentum 30\n\
                    The Nifty 50 index is the benchmark.";
        // The label wins even though a descriptive pattern would also match.
        assert_eq!(resolve(text, "x.pdf"), "Nifty200 Momentum 30");
    }

    #[test]
    fn test_labelled_name_with_total_returns_suffix() {
        let text = "Index Variant: Nifty500 Multicap Momentum Quality 50 Total Returns Index.";
        assert_eq!(resolve(text, "x.pdf"), "Nifty500 Multicap Momentum Quality 50");
    }

    #[test]
    fn test_quoted_name() {
        let text = "the ‘Nifty Dividend Opportunities 50’ Index was launched in 2011";
        assert_eq!(resolve(text, "x.pdf"), "Nifty Dividend Opportunities 50");
    }

    #[test]
    fn test_descriptive_sentence() {
        let text = "The Nifty Midcap 150 index includes the next 150 companies.";
        assert_eq!(resolve(text, "x.pdf"), "Nifty Midcap 150");
    }

    #[test]
    fn test_low_volatility_variant() {
        let text = "Nifty Alpha Quality Value Low-Volatility 30 Index is a well diversified portfolio.";
        assert_eq!(
            resolve(text, "x.pdf"),
            "Nifty Alpha Quality Value Low-Volatility 30"
        );
    }

    #[test]
    fn test_enumeration_is_rejected_in_favor_of_filename() {
        let text = "compared against the Nifty 100 and the Nifty Pharma 150 Index over time";
        assert_eq!(
            resolve(text, "ind_nifty_largemidcap_250.pdf"),
            "nifty largemidcap 250"
        );
    }

    #[test]
    fn test_filename_fallback_is_never_empty() {
        assert_eq!(resolve("no names here", "ind_next50.pdf"), "Nifty next 50");
        assert_eq!(
            resolve("no names here", "Factsheet_NiftyTotalMarket.pdf"),
            "Nifty Total Market"
        );
        assert!(!resolve("", "something.pdf").is_empty());
    }

    #[test]
    fn test_abbreviation_expansion_from_config() {
        let text = "Index Variant: Nifty Div Opps 50 Index.";
        assert_eq!(resolve(text, "x.pdf"), "Nifty Dividend Opportunities 50");
    }

    #[test]
    fn test_custom_abbreviation_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("abbrevs.json");
        std::fs::write(&path, r#"{"Cons Dur": "Consumer Durables"}"#).unwrap();
        let table = AbbreviationTable::from_json_file(&path).unwrap();
        assert_eq!(table.expand("Nifty Cons Dur 15"), "Nifty Consumer Durables 15");
    }
}
