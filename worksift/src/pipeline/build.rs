//! Dataset building stage

use std::sync::Arc;

use tracing::info;

use worksift_common::config::Settings;
use worksift_common::models::QuartileThreshold;
use worksift_common::{Error, Result};

use crate::enrich::{strict_subset, Enricher};
use crate::openalex::{OpenAlexClient, WorkFetcher};
use crate::pipeline::summary;
use crate::reference::{IndexingRegistry, QuartileTables};
use crate::store;

/// Enrich the raw work table and write the enhanced and strict datasets.
///
/// Reference tables load in degraded form when their files are missing; the
/// raw table is a hard requirement.
pub async fn build_datasets(settings: &Settings, threshold: QuartileThreshold) -> Result<()> {
    let works_csv = settings
        .processed_dir()
        .join(format!("{}.csv", store::WORKS_STEM));
    let records = store::load_work_records(&works_csv)?;

    let registry = IndexingRegistry::load(&settings.scopus_path());
    let tables = QuartileTables::load(
        &settings.scimago_dir(),
        settings.scimago_years(),
        &settings.scimago_category,
        &settings.scimago_regions,
    );
    info!(
        registry_issns = registry.len(),
        ranking_years = tables.year_count(),
        "Reference tables loaded"
    );

    let client = OpenAlexClient::with_base_url(
        &settings.openalex_base_url,
        settings.request_timeout(),
        settings.mailto.clone(),
    )
    .map_err(|e| Error::Internal(format!("OpenAlex client: {e}")))?;
    let fetcher = WorkFetcher::new(Arc::new(client));

    let enricher = Enricher::new(&fetcher, &registry, &tables, settings.work_delay());
    let (enriched, _stats) = enricher.enrich_all(&records).await;

    let strict = strict_subset(&enriched, &registry, threshold);

    let processed = settings.processed_dir();
    store::save_enriched(&processed, store::ENHANCED_STEM, &enriched)?;
    store::save_enriched(&processed, &store::strict_stem(threshold), &strict)?;

    summary::log_final_summary(&enriched, &strict, threshold);
    Ok(())
}

/// Re-filter an existing enhanced dataset at a threshold, without refetching.
///
/// Reads the enhanced JSON back; the rows already carry their indexing flag
/// and quartile, so only the registry's emptiness matters here (it decides
/// whether the indexing gate applies at all).
pub fn rebuild_strict(settings: &Settings, threshold: QuartileThreshold) -> Result<()> {
    let processed = settings.processed_dir();
    let enhanced_json = processed.join(format!("{}.json", store::ENHANCED_STEM));
    let enriched = store::load_enriched(&enhanced_json)?;
    info!(rows = enriched.len(), "Loaded enhanced dataset");

    let registry = IndexingRegistry::load(&settings.scopus_path());
    let strict = strict_subset(&enriched, &registry, threshold);
    store::save_enriched(&processed, &store::strict_stem(threshold), &strict)?;

    summary::log_final_summary(&enriched, &strict, threshold);
    Ok(())
}
