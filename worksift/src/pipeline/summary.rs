//! Final dataset summary
//!
//! Structured log of the headline numbers after a build: totals, year
//! distribution, collaboration and open-access shares, citation mean, and
//! for the enhanced dataset the indexing coverage and quartile histogram.

use std::collections::BTreeMap;

use tracing::info;

use worksift_common::models::{EnrichedWork, Quartile, QuartileThreshold};

pub fn log_final_summary(
    all: &[EnrichedWork],
    strict: &[EnrichedWork],
    threshold: QuartileThreshold,
) {
    log_dataset_block("all_enhanced", all);

    let indexed = all.iter().filter(|w| w.is_scopus_indexed).count();
    info!(
        indexed,
        indexed_pct = pct(indexed, all.len()),
        quartiles = ?quartile_histogram(all),
        "Indexing coverage"
    );

    log_dataset_block(&format!("strict_q{threshold}"), strict);
}

fn log_dataset_block(label: &str, works: &[EnrichedWork]) {
    let total = works.len();
    let multi_institution = works.iter().filter(|w| w.multi_institution).count();
    let multi_country = works.iter().filter(|w| w.multi_country).count();
    let open_access = works.iter().filter(|w| w.open_access_is_oa).count();

    info!(
        dataset = label,
        total,
        publication_years = ?year_histogram(works),
        multi_institution,
        multi_institution_pct = pct(multi_institution, total),
        multi_country,
        multi_country_pct = pct(multi_country, total),
        open_access,
        open_access_pct = pct(open_access, total),
        mean_citations = mean_citations(works),
        "Dataset summary"
    );
}

fn year_histogram(works: &[EnrichedWork]) -> BTreeMap<i32, usize> {
    let mut counts = BTreeMap::new();
    for work in works {
        if let Some(year) = work.publication_year {
            *counts.entry(year).or_insert(0) += 1;
        }
    }
    counts
}

fn quartile_histogram(works: &[EnrichedWork]) -> BTreeMap<Quartile, usize> {
    let mut counts = BTreeMap::new();
    for work in works {
        if let Some(tier) = work.scimago_quartile {
            *counts.entry(tier).or_insert(0) += 1;
        }
    }
    counts
}

fn mean_citations(works: &[EnrichedWork]) -> f64 {
    if works.is_empty() {
        return 0.0;
    }
    works.iter().map(|w| w.cited_by_count as f64).sum::<f64>() / works.len() as f64
}

fn pct(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    part as f64 / total as f64 * 100.0
}
