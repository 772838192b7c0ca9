//! Dataset and snapshot persistence
//!
//! Every dataset is written twice: a CSV for tabular consumers and a JSON
//! records file that round-trips losslessly. List-valued CSV cells (authors,
//! institutions, identifier lists) hold the JSON encoding of the list; the
//! JSON file is the authoritative carrier and is what loaders prefer.
//!
//! Collection snapshots live in the raw data directory under names of the
//! form `eu_works_on_AI_IN_Education_between_{start}_and_{end}_N_{n}.json`;
//! "latest" means lexicographically last among matching names.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::info;

use worksift_common::models::{EnrichedWork, QuartileThreshold, WorkRecord};
use worksift_common::{Error, Result};

use crate::openalex::OpenAlexWork;

/// File stem of the processed raw table (`works_all.csv` / `works_all.json`).
pub const WORKS_STEM: &str = "works_all";

/// File stem of the enhanced dataset.
pub const ENHANCED_STEM: &str = "dataset_all_enhanced";

/// Substring identifying collection snapshot files in the raw directory.
const SNAPSHOT_MARKER: &str = "eu_works_on_AI";

/// File stem of the strict dataset at a given policy level
/// (`dataset_strict_qQ3` for the default threshold).
pub fn strict_stem(threshold: QuartileThreshold) -> String {
    format!("dataset_strict_q{threshold}")
}

// ============================================================================
// Collection snapshots
// ============================================================================

/// Raw output of one collection run: everything fetched plus the subset that
/// passed the country filter. Only `eu_works` feeds the processing stage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorksSnapshot {
    pub all_works: Vec<OpenAlexWork>,
    pub eu_works: Vec<OpenAlexWork>,
    pub collected_at: Option<DateTime<Utc>>,
}

pub fn snapshot_filename(start_year: i32, end_year: i32, eu_count: usize) -> String {
    format!("eu_works_on_AI_IN_Education_between_{start_year}_and_{end_year}_N_{eu_count}.json")
}

pub fn save_snapshot(
    dir: &Path,
    snapshot: &WorksSnapshot,
    start_year: i32,
    end_year: i32,
) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(snapshot_filename(start_year, end_year, snapshot.eu_works.len()));
    fs::write(&path, serde_json::to_string_pretty(snapshot)?)?;
    info!(
        path = %path.display(),
        total = snapshot.all_works.len(),
        eu_works = snapshot.eu_works.len(),
        "Saved collection snapshot"
    );
    Ok(path)
}

/// Load the lexicographically latest snapshot in `dir`.
pub fn load_latest_snapshot(dir: &Path) -> Result<WorksSnapshot> {
    let mut names = Vec::new();
    if dir.is_dir() {
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.ends_with(".json") && name.contains(SNAPSHOT_MARKER) {
                names.push(name);
            }
        }
    }
    names.sort();
    let Some(latest) = names.pop() else {
        return Err(Error::NotFound(format!(
            "no collection snapshots under {}",
            dir.display()
        )));
    };
    info!(file = %latest, "Loading collection snapshot");
    let contents = fs::read_to_string(dir.join(&latest))?;
    Ok(serde_json::from_str(&contents)?)
}

// ============================================================================
// Raw work records
// ============================================================================

pub fn save_work_records(dir: &Path, records: &[WorkRecord]) -> Result<(PathBuf, PathBuf)> {
    fs::create_dir_all(dir)?;
    let csv_path = dir.join(format!("{WORKS_STEM}.csv"));
    let json_path = dir.join(format!("{WORKS_STEM}.json"));

    let mut writer = csv::Writer::from_path(&csv_path)?;
    writer.write_record(WorkRecord::COLUMNS)?;
    for record in records {
        writer.write_record([
            record.work_id.clone(),
            opt_cell(&record.doi),
            opt_cell(&record.title),
            year_cell(record.publication_year),
            opt_cell(&record.publication_date),
            opt_cell(&record.work_type),
            opt_cell(&record.language),
            record.cited_by_count.to_string(),
            record.open_access_is_oa.to_string(),
            record.open_access_oa_status.clone(),
            serde_json::to_string(&record.authors)?,
            serde_json::to_string(&record.institutions)?,
            serde_json::to_string(&record.countries)?,
            serde_json::to_string(&record.institution_ids)?,
            record.multi_institution.to_string(),
            record.multi_country.to_string(),
            record.authors_count.to_string(),
            record.institutions_count.to_string(),
        ])?;
    }
    writer.flush()?;

    fs::write(&json_path, serde_json::to_string_pretty(records)?)?;
    info!(
        rows = records.len(),
        csv = %csv_path.display(),
        json = %json_path.display(),
        "Saved raw work table"
    );
    Ok((csv_path, json_path))
}

/// Load the processed raw table from its CSV.
///
/// Header positions are resolved once up front; a table without a `work_id`
/// column is rejected outright. Cell parsing is lenient the way dataframe
/// output demands: years may arrive as float text, booleans capitalized,
/// list cells in a foreign encoding (treated as empty).
pub fn load_work_records(path: &Path) -> Result<Vec<WorkRecord>> {
    if !path.exists() {
        return Err(Error::NotFound(format!(
            "raw dataset not found at {}",
            path.display()
        )));
    }

    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();
    let columns = HeaderIndex::new(&headers);
    if columns.index_of("work_id").is_none() {
        return Err(Error::MissingColumn("work_id".into()));
    }

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let cell =
            |name: &str| -> &str { columns.index_of(name).and_then(|i| row.get(i)).unwrap_or("") };
        records.push(WorkRecord {
            work_id: cell("work_id").trim().to_string(),
            doi: opt_str(cell("doi")),
            title: opt_str(cell("title")),
            publication_year: parse_year(cell("publication_year")),
            publication_date: opt_str(cell("publication_date")),
            work_type: opt_str(cell("type")),
            language: opt_str(cell("language")),
            cited_by_count: parse_count(cell("cited_by_count")),
            open_access_is_oa: parse_bool(cell("open_access_is_oa")),
            open_access_oa_status: cell("open_access_oa_status").trim().to_string(),
            authors: parse_list(cell("authors")),
            institutions: parse_list(cell("institutions")),
            countries: parse_list(cell("countries")),
            institution_ids: parse_list(cell("institution_ids")),
            multi_institution: parse_bool(cell("multi_institution")),
            multi_country: parse_bool(cell("multi_country")),
            authors_count: parse_count(cell("authors_count")),
            institutions_count: parse_count(cell("institutions_count")),
        });
    }

    info!(rows = records.len(), path = %path.display(), "Loaded raw work table");
    Ok(records)
}

// ============================================================================
// Enriched datasets
// ============================================================================

pub fn save_enriched(dir: &Path, stem: &str, works: &[EnrichedWork]) -> Result<(PathBuf, PathBuf)> {
    fs::create_dir_all(dir)?;
    let csv_path = dir.join(format!("{stem}.csv"));
    let json_path = dir.join(format!("{stem}.json"));

    let mut writer = csv::Writer::from_path(&csv_path)?;
    writer.write_record(EnrichedWork::COLUMNS)?;
    for work in works {
        writer.write_record([
            work.work_id.clone(),
            opt_cell(&work.doi),
            opt_cell(&work.title),
            opt_cell(&work.abstract_text),
            year_cell(work.publication_year),
            opt_cell(&work.publication_date),
            opt_cell(&work.work_type),
            opt_cell(&work.language),
            work.cited_by_count.to_string(),
            work.open_access_is_oa.to_string(),
            work.open_access_oa_status.clone(),
            opt_cell(&work.source_name),
            opt_cell(&work.source_type),
            opt_cell(&work.source_issn_l),
            serde_json::to_string(&work.source_issn)?,
            work.multi_institution.to_string(),
            work.multi_country.to_string(),
            work.authors_count.to_string(),
            work.institutions_count.to_string(),
            work.concepts_list.clone(),
            work.venue_issn_list.clone(),
            work.is_scopus_indexed.to_string(),
            work.scimago_quartile.map(|q| q.to_string()).unwrap_or_default(),
        ])?;
    }
    writer.flush()?;

    fs::write(&json_path, serde_json::to_string_pretty(works)?)?;
    info!(
        rows = works.len(),
        csv = %csv_path.display(),
        json = %json_path.display(),
        "Saved dataset"
    );
    Ok((csv_path, json_path))
}

/// Load an enriched dataset from its JSON records file.
pub fn load_enriched(path: &Path) -> Result<Vec<EnrichedWork>> {
    if !path.exists() {
        return Err(Error::NotFound(format!(
            "enhanced dataset not found at {}",
            path.display()
        )));
    }
    let contents = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

// ============================================================================
// Cell encoding
// ============================================================================

struct HeaderIndex {
    index: HashMap<String, usize>,
}

impl HeaderIndex {
    fn new(headers: &csv::StringRecord) -> HeaderIndex {
        let index = headers
            .iter()
            .enumerate()
            .map(|(i, name)| (name.trim().to_string(), i))
            .collect();
        HeaderIndex { index }
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }
}

fn opt_cell(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn year_cell(value: Option<i32>) -> String {
    value.map(|y| y.to_string()).unwrap_or_default()
}

fn opt_str(cell: &str) -> Option<String> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

// Years arrive as float text ("2022.0") when the table passed through a
// dataframe round trip.
fn parse_year(cell: &str) -> Option<i32> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(year) = trimmed.parse::<i32>() {
        return Some(year);
    }
    trimmed.parse::<f64>().ok().map(|y| y as i32)
}

fn parse_count(cell: &str) -> u32 {
    let trimmed = cell.trim();
    if let Ok(n) = trimmed.parse::<i64>() {
        return n.clamp(0, u32::MAX as i64) as u32;
    }
    trimmed
        .parse::<f64>()
        .ok()
        .map(|n| n.max(0.0) as u32)
        .unwrap_or(0)
}

fn parse_bool(cell: &str) -> bool {
    matches!(cell.trim(), "true" | "True" | "TRUE" | "1")
}

fn parse_list<T: DeserializeOwned>(cell: &str) -> Vec<T> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }
    serde_json::from_str(trimmed).unwrap_or_default()
}
