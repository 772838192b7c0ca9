//! Serial and work identifier normalization
//!
//! Every identifier comparison in the pipeline goes through these helpers
//! first, so that `"1234-5678"`, `"1234 5678 "` and `"1234x567"` style
//! variants all land on the same canonical form.

/// OpenAlex entity URL prefix stripped from work identifiers.
const OPENALEX_PREFIX: &str = "https://openalex.org/";

/// Normalize a raw ISSN-like value into canonical comparable form.
///
/// Uppercases and removes hyphens and all whitespace (including interior
/// whitespace). Idempotent: normalizing an already-normalized value is a
/// no-op. Never fails; an empty or garbage input just yields a short
/// string that [`is_valid_issn`] rejects.
pub fn normalize_issn(raw: &str) -> String {
    raw.chars()
        .filter(|c| *c != '-' && !c.is_whitespace())
        .flat_map(|c| c.to_uppercase())
        .collect()
}

/// A normalized ISSN is valid only when exactly 8 characters long.
pub fn is_valid_issn(normalized: &str) -> bool {
    normalized.len() == 8
}

/// Split a possibly multi-valued identifier cell into normalized parts.
///
/// Reference tables pack several ISSNs into one field separated by commas;
/// this flattens and normalizes in one step, dropping empty pieces.
pub fn split_issn_field(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(normalize_issn)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Reduce an OpenAlex work identifier to its bare form (e.g. `W12345`).
pub fn normalize_work_id(raw: &str) -> String {
    raw.trim().replace(OPENALEX_PREFIX, "")
}
