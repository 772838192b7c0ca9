//! Work record and dataset row models
//!
//! Three table shapes flow through the pipeline:
//! - [`WorkRecord`]: one row of the processed raw table (`works_all.csv`),
//!   built from a collection snapshot before any enrichment.
//! - [`EnrichedWork`]: one row of the enhanced dataset, the merge of a raw
//!   record with externally fetched metadata plus derived fields.
//! - [`Quartile`] / [`QuartileThreshold`]: SCImago ranking tiers and the
//!   strict-filter policy levels built on them.

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::Error;

// ============================================================================
// Ranking tiers
// ============================================================================

/// SCImago journal ranking tier, best first.
///
/// Parsing accepts only the exact labels `Q1`..`Q4`; anything else (lowercase,
/// padded, `Q5`, a numeric SJR score) is rejected so that garbage cells in
/// ranking files never masquerade as a tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Quartile {
    Q1,
    Q2,
    Q3,
    Q4,
}

impl Quartile {
    /// All tiers, best first.
    pub const ALL: [Quartile; 4] = [Quartile::Q1, Quartile::Q2, Quartile::Q3, Quartile::Q4];

    pub fn as_str(&self) -> &'static str {
        match self {
            Quartile::Q1 => "Q1",
            Quartile::Q2 => "Q2",
            Quartile::Q3 => "Q3",
            Quartile::Q4 => "Q4",
        }
    }
}

impl fmt::Display for Quartile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Quartile {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Q1" => Ok(Quartile::Q1),
            "Q2" => Ok(Quartile::Q2),
            "Q3" => Ok(Quartile::Q3),
            "Q4" => Ok(Quartile::Q4),
            other => Err(Error::InvalidInput(format!(
                "unrecognized quartile label: {:?}",
                other
            ))),
        }
    }
}

/// Strict-filter policy level: which tiers survive the quartile gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum QuartileThreshold {
    /// Keep Q1 and Q2 only.
    Q2,
    /// Keep Q1 through Q3.
    Q3,
}

impl QuartileThreshold {
    /// Tiers accepted by this policy level, best first.
    pub fn accepted(&self) -> &'static [Quartile] {
        match self {
            QuartileThreshold::Q2 => &[Quartile::Q1, Quartile::Q2],
            QuartileThreshold::Q3 => &[Quartile::Q1, Quartile::Q2, Quartile::Q3],
        }
    }

    pub fn allows(&self, tier: Quartile) -> bool {
        self.accepted().contains(&tier)
    }
}

impl Default for QuartileThreshold {
    fn default() -> Self {
        QuartileThreshold::Q3
    }
}

impl fmt::Display for QuartileThreshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuartileThreshold::Q2 => f.write_str("Q2"),
            QuartileThreshold::Q3 => f.write_str("Q3"),
        }
    }
}

// ============================================================================
// Raw work records
// ============================================================================

/// One author entry flattened out of an authorship.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Author {
    pub author_id: Option<String>,
    pub author_name: Option<String>,
    pub orcid: Option<String>,
}

/// One institution entry flattened out of an authorship.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstitutionRef {
    pub institution_id: Option<String>,
    pub institution_name: Option<String>,
    pub country_code: Option<String>,
    pub institution_type: Option<String>,
}

/// One row of the processed raw table (`works_all.csv` / `works_all.json`).
///
/// Field order is the table's column order. Collaboration fields
/// (`multi_institution`, `multi_country`, the counts) are derived once by the
/// snapshot processor and carried through enrichment untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkRecord {
    pub work_id: String,
    pub doi: Option<String>,
    pub title: Option<String>,
    pub publication_year: Option<i32>,
    pub publication_date: Option<String>,
    #[serde(rename = "type")]
    pub work_type: Option<String>,
    pub language: Option<String>,
    pub cited_by_count: u32,
    pub open_access_is_oa: bool,
    pub open_access_oa_status: String,
    pub authors: Vec<Author>,
    pub institutions: Vec<InstitutionRef>,
    pub countries: Vec<String>,
    pub institution_ids: Vec<String>,
    pub multi_institution: bool,
    pub multi_country: bool,
    pub authors_count: u32,
    pub institutions_count: u32,
}

impl WorkRecord {
    /// Column headers of the tabular output, in order.
    pub const COLUMNS: [&'static str; 18] = [
        "work_id",
        "doi",
        "title",
        "publication_year",
        "publication_date",
        "type",
        "language",
        "cited_by_count",
        "open_access_is_oa",
        "open_access_oa_status",
        "authors",
        "institutions",
        "countries",
        "institution_ids",
        "multi_institution",
        "multi_country",
        "authors_count",
        "institutions_count",
    ];
}

// ============================================================================
// Enriched dataset rows
// ============================================================================

/// One row of the enhanced dataset.
///
/// Every column has a fixed default (the `Default` impl) so that downstream
/// consumers never see a missing column: options default to absent, flags to
/// `false`, counts to `0`, list/joined columns to empty. Field order is the
/// CSV column order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichedWork {
    pub work_id: String,
    pub doi: Option<String>,
    pub title: Option<String>,
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
    pub publication_year: Option<i32>,
    pub publication_date: Option<String>,
    #[serde(rename = "type")]
    pub work_type: Option<String>,
    pub language: Option<String>,
    /// Citation count; 0 when the source reports none.
    pub cited_by_count: u32,
    pub open_access_is_oa: bool,
    pub open_access_oa_status: String,
    /// Primary venue display name.
    pub source_name: Option<String>,
    pub source_type: Option<String>,
    pub source_issn_l: Option<String>,
    /// Normalized venue identifiers, ISSN-L first, discovery order, deduplicated.
    pub source_issn: Vec<String>,
    pub multi_institution: bool,
    pub multi_country: bool,
    pub authors_count: u32,
    pub institutions_count: u32,
    /// Concept and topic names, semicolon-joined.
    pub concepts_list: String,
    /// `source_issn` semicolon-joined, for the tabular output.
    pub venue_issn_list: String,
    pub is_scopus_indexed: bool,
    pub scimago_quartile: Option<Quartile>,
}

impl EnrichedWork {
    /// Column headers of the tabular output, in order.
    pub const COLUMNS: [&'static str; 23] = [
        "work_id",
        "doi",
        "title",
        "abstract",
        "publication_year",
        "publication_date",
        "type",
        "language",
        "cited_by_count",
        "open_access_is_oa",
        "open_access_oa_status",
        "source_name",
        "source_type",
        "source_issn_l",
        "source_issn",
        "multi_institution",
        "multi_country",
        "authors_count",
        "institutions_count",
        "concepts_list",
        "venue_issn_list",
        "is_scopus_indexed",
        "scimago_quartile",
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quartile_parses_exact_labels_only() {
        assert_eq!("Q1".parse::<Quartile>().ok(), Some(Quartile::Q1));
        assert_eq!("Q4".parse::<Quartile>().ok(), Some(Quartile::Q4));
        assert!("q1".parse::<Quartile>().is_err());
        assert!(" Q1".parse::<Quartile>().is_err());
        assert!("Q5".parse::<Quartile>().is_err());
        assert!("".parse::<Quartile>().is_err());
        assert!("1.24".parse::<Quartile>().is_err());
    }

    #[test]
    fn test_quartile_display_round_trip() {
        for tier in Quartile::ALL {
            assert_eq!(tier.to_string().parse::<Quartile>().ok(), Some(tier));
        }
    }

    #[test]
    fn test_quartile_ordering_best_first() {
        assert!(Quartile::Q1 < Quartile::Q2);
        assert!(Quartile::Q3 < Quartile::Q4);
    }

    #[test]
    fn test_threshold_accepted_sets() {
        assert_eq!(
            QuartileThreshold::Q3.accepted(),
            &[Quartile::Q1, Quartile::Q2, Quartile::Q3]
        );
        assert_eq!(QuartileThreshold::Q2.accepted(), &[Quartile::Q1, Quartile::Q2]);
        assert!(QuartileThreshold::Q3.allows(Quartile::Q3));
        assert!(!QuartileThreshold::Q2.allows(Quartile::Q3));
        assert!(!QuartileThreshold::Q3.allows(Quartile::Q4));
    }

    #[test]
    fn test_threshold_display_matches_output_naming() {
        // Strict dataset files are named dataset_strict_q{threshold}.
        assert_eq!(QuartileThreshold::Q3.to_string(), "Q3");
        assert_eq!(QuartileThreshold::Q2.to_string(), "Q2");
    }

    #[test]
    fn test_enriched_defaults_cover_every_column() {
        let work = EnrichedWork::default();
        assert_eq!(work.work_id, "");
        assert_eq!(work.cited_by_count, 0);
        assert!(!work.is_scopus_indexed);
        assert!(work.scimago_quartile.is_none());
        assert!(work.source_issn.is_empty());
        assert_eq!(work.concepts_list, "");
        assert_eq!(work.venue_issn_list, "");
        assert!(!work.multi_institution);
        assert_eq!(work.authors_count, 0);
    }

    #[test]
    fn test_quartile_serializes_as_bare_label() {
        let json = serde_json::to_string(&Quartile::Q2).unwrap();
        assert_eq!(json, "\"Q2\"");
        let parsed: Quartile = serde_json::from_str("\"Q3\"").unwrap();
        assert_eq!(parsed, Quartile::Q3);
    }
}
