//! Publication collection stage
//!
//! Pages through the works search endpoint until the API stops returning
//! results, the page cap is hit, or a request fails. Collection never
//! retries: a failed page ends the run and whatever was gathered so far is
//! snapshotted, so a flaky network yields a smaller snapshot rather than
//! none.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use chrono::Utc;
use tokio::time::sleep;
use tracing::{info, warn};

use worksift_common::config::Settings;
use worksift_common::Result;

use crate::openalex::{OpenAlexClient, OpenAlexWork, WorksQuery};
use crate::store::{self, WorksSnapshot};

/// Fields requested from the search endpoint; the full documents come later
/// from the per-work fetch during enrichment.
const SELECT_FIELDS: &str = "id,doi,title,publication_year,publication_date,authorships";

/// Run one collection pass and write the snapshot to the raw directory.
pub async fn collect_works(settings: &Settings, client: &OpenAlexClient) -> Result<PathBuf> {
    info!(
        keywords = settings.keywords.len(),
        countries = settings.eu_countries.len(),
        start_year = settings.start_year,
        end_year = settings.end_year,
        "Collecting publications"
    );

    let query = works_query(settings);
    let mut all_works: Vec<OpenAlexWork> = Vec::new();

    for page in 1..=settings.max_pages {
        match client.search_works(&query, page).await {
            Ok(batch) => {
                if batch.results.is_empty() {
                    break;
                }
                let fetched = batch.results.len();
                all_works.extend(batch.results);
                info!(page, fetched, total = all_works.len(), "Fetched works page");
            }
            Err(e) => {
                warn!(page, error = %e, "Works search failed, stopping collection");
                break;
            }
        }
        sleep(settings.page_delay()).await;
    }

    let eu_works: Vec<OpenAlexWork> = all_works
        .iter()
        .filter(|w| has_eu_affiliation(w, &settings.eu_countries))
        .cloned()
        .collect();
    info!(
        total = all_works.len(),
        eu_works = eu_works.len(),
        "Collection finished"
    );

    if !eu_works.is_empty() {
        log_snapshot_stats(&eu_works, &settings.eu_countries);
    }

    let snapshot = WorksSnapshot {
        all_works,
        eu_works,
        collected_at: Some(Utc::now()),
    };
    store::save_snapshot(
        &settings.raw_dir(),
        &snapshot,
        settings.start_year,
        settings.end_year,
    )
}

fn works_query(settings: &Settings) -> WorksQuery {
    WorksQuery {
        filter: format!(
            "publication_year:{}-{},type:article",
            settings.start_year, settings.end_year
        ),
        search: search_expression(&settings.keywords),
        per_page: settings.per_page,
        select: SELECT_FIELDS.to_string(),
    }
}

/// Full-text search expression: every keyword quoted, OR-joined.
fn search_expression(keywords: &[String]) -> String {
    keywords
        .iter()
        .map(|keyword| format!("\"{keyword}\""))
        .collect::<Vec<_>>()
        .join(" OR ")
}

/// Whether any authorship lists an institution in a tracked country.
fn has_eu_affiliation(work: &OpenAlexWork, eu_countries: &[String]) -> bool {
    work.authorships.iter().any(|authorship| {
        authorship.institutions.iter().any(|inst| {
            inst.country_code
                .as_deref()
                .map(|code| eu_countries.iter().any(|c| c == code))
                .unwrap_or(false)
        })
    })
}

fn log_snapshot_stats(works: &[OpenAlexWork], eu_countries: &[String]) {
    let mut per_year: BTreeMap<i32, usize> = BTreeMap::new();
    for work in works {
        if let Some(year) = work.publication_year {
            *per_year.entry(year).or_insert(0) += 1;
        }
    }

    let mut countries: BTreeSet<&str> = BTreeSet::new();
    for work in works {
        for authorship in &work.authorships {
            for inst in &authorship.institutions {
                if let Some(code) = inst.country_code.as_deref() {
                    if eu_countries.iter().any(|c| c == code) {
                        countries.insert(code);
                    }
                }
            }
        }
    }

    info!(
        publication_years = ?per_year,
        countries = ?countries,
        "Snapshot statistics"
    );
}
