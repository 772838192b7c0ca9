//! Record enrichment
//!
//! Merges each raw work record with its fetched OpenAlex document and the
//! two reference tables. External fields win where both sides have a value;
//! raw fields are the fallback, and a failed fetch degrades the record to
//! its raw fields rather than dropping it.

pub mod strict;

pub use strict::strict_subset;

use std::time::Duration;

use tracing::info;

use worksift_common::ids::{normalize_issn, normalize_work_id};
use worksift_common::models::{EnrichedWork, WorkRecord};

use crate::openalex::fetcher::WorkFetcher;
use crate::openalex::types::{OpenAlexWork, Source};
use crate::reference::{IndexingRegistry, QuartileTables};

/// Counters for one enrichment pass.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnrichStats {
    pub total: usize,
    pub fetched: usize,
    pub fetch_failed: usize,
    pub indexed: usize,
    pub with_quartile: usize,
}

/// Merges raw work records with external metadata and reference tables.
pub struct Enricher<'a> {
    fetcher: &'a WorkFetcher,
    registry: &'a IndexingRegistry,
    quartiles: &'a QuartileTables,
    work_delay: Duration,
}

impl<'a> Enricher<'a> {
    pub fn new(
        fetcher: &'a WorkFetcher,
        registry: &'a IndexingRegistry,
        quartiles: &'a QuartileTables,
        work_delay: Duration,
    ) -> Self {
        Self {
            fetcher,
            registry,
            quartiles,
            work_delay,
        }
    }

    /// Enrich every record, one at a time, in input order.
    ///
    /// Sleeps `work_delay` after each record to respect the API's usage
    /// policy; cache hits sleep too, keeping the pass rate predictable.
    /// Total over its input: fetch failures degrade, never drop.
    pub async fn enrich_all(&self, records: &[WorkRecord]) -> (Vec<EnrichedWork>, EnrichStats) {
        let mut stats = EnrichStats {
            total: records.len(),
            ..Default::default()
        };
        let mut enriched = Vec::with_capacity(records.len());

        for record in records {
            let work_id = normalize_work_id(&record.work_id);
            let row = match self.fetcher.fetch(&work_id).await {
                Some(work) => {
                    stats.fetched += 1;
                    self.merge(record, &work)
                }
                None => {
                    stats.fetch_failed += 1;
                    raw_only(record)
                }
            };

            if row.is_scopus_indexed {
                stats.indexed += 1;
            }
            if row.scimago_quartile.is_some() {
                stats.with_quartile += 1;
            }
            enriched.push(row);

            if !self.work_delay.is_zero() {
                tokio::time::sleep(self.work_delay).await;
            }
        }

        info!(
            total = stats.total,
            fetched = stats.fetched,
            failed = stats.fetch_failed,
            indexed = stats.indexed,
            with_quartile = stats.with_quartile,
            "Enrichment pass complete"
        );
        (enriched, stats)
    }

    /// Merge one raw record with its fetched document.
    fn merge(&self, record: &WorkRecord, work: &OpenAlexWork) -> EnrichedWork {
        let source = work.primary_source();
        let source_issn = venue_issns(source);
        let publication_year = work.publication_year.or(record.publication_year);

        let venue_issn_list = source_issn.join(";");
        let is_scopus_indexed = self.registry.contains_any(&source_issn);
        // First venue identifier that yields a tier for the merged year wins.
        let scimago_quartile = publication_year.and_then(|year| {
            source_issn
                .iter()
                .find_map(|issn| self.quartiles.resolve(issn, year))
        });

        EnrichedWork {
            work_id: record.work_id.clone(),
            doi: work.doi.clone(),
            title: work.title.clone(),
            abstract_text: work.abstract_text.clone(),
            publication_year,
            publication_date: work
                .publication_date
                .clone()
                .or_else(|| record.publication_date.clone()),
            work_type: work.work_type.clone().or_else(|| record.work_type.clone()),
            language: work.language.clone().or_else(|| record.language.clone()),
            cited_by_count: work.cited_by_count.unwrap_or(0).max(0) as u32,
            open_access_is_oa: work.open_access.as_ref().map(|oa| oa.is_oa).unwrap_or(false),
            open_access_oa_status: work
                .open_access
                .as_ref()
                .and_then(|oa| oa.oa_status.clone())
                .unwrap_or_default(),
            source_name: source.and_then(|s| s.display_name.clone()),
            source_type: source.and_then(|s| s.source_type.clone()),
            source_issn_l: source.and_then(|s| s.issn_l.clone()),
            source_issn,
            multi_institution: record.multi_institution,
            multi_country: record.multi_country,
            authors_count: record.authors_count,
            institutions_count: record.institutions_count,
            concepts_list: concept_names(work),
            venue_issn_list,
            is_scopus_indexed,
            scimago_quartile,
        }
    }
}

/// Enriched row for a record whose fetch came back absent: raw fields only,
/// external-only columns at their defaults.
fn raw_only(record: &WorkRecord) -> EnrichedWork {
    EnrichedWork {
        work_id: record.work_id.clone(),
        publication_year: record.publication_year,
        publication_date: record.publication_date.clone(),
        work_type: record.work_type.clone(),
        language: record.language.clone(),
        cited_by_count: record.cited_by_count,
        open_access_is_oa: record.open_access_is_oa,
        open_access_oa_status: record.open_access_oa_status.clone(),
        multi_institution: record.multi_institution,
        multi_country: record.multi_country,
        authors_count: record.authors_count,
        institutions_count: record.institutions_count,
        ..Default::default()
    }
}

/// Venue identifiers in discovery order: ISSN-L first, then the general
/// ISSN field flattened; normalized, empties dropped, first occurrence kept.
fn venue_issns(source: Option<&Source>) -> Vec<String> {
    let Some(source) = source else {
        return Vec::new();
    };

    let mut issns = Vec::new();
    if let Some(issn_l) = source.issn_l.as_deref() {
        push_unique(&mut issns, normalize_issn(issn_l));
    }
    if let Some(field) = &source.issn {
        for issn in field.normalized() {
            push_unique(&mut issns, issn);
        }
    }
    issns
}

fn push_unique(issns: &mut Vec<String>, issn: String) {
    if !issn.is_empty() && !issns.contains(&issn) {
        issns.push(issn);
    }
}

/// Concept and topic display names, in discovery order, deduplicated, the
/// case-insensitive "other" placeholder removed, semicolon-joined.
fn concept_names(work: &OpenAlexWork) -> String {
    let mut names: Vec<&str> = Vec::new();
    for concept in work.concepts.iter().chain(work.topics.iter()) {
        if let Some(name) = concept.display_name.as_deref() {
            if !name.is_empty() && !name.eq_ignore_ascii_case("other") && !names.contains(&name) {
                names.push(name);
            }
        }
    }
    names.join(";")
}
