//! Snapshot processing stage
//!
//! Flattens the latest collection snapshot into the raw work table. Each
//! document's authorships unfold into author and institution lists;
//! countries and institution identifiers are deduplicated in discovery
//! order, and the collaboration flags and counts derive from those lists
//! here, once, and ride along unchanged through enrichment.

use std::path::PathBuf;

use tracing::info;

use worksift_common::config::Settings;
use worksift_common::models::{Author, InstitutionRef, WorkRecord};
use worksift_common::Result;

use crate::openalex::OpenAlexWork;
use crate::store;

/// Process the latest snapshot into `works_all.csv` / `works_all.json`.
pub fn process_latest_snapshot(settings: &Settings) -> Result<(PathBuf, PathBuf)> {
    let snapshot = store::load_latest_snapshot(&settings.raw_dir())?;
    info!(eu_works = snapshot.eu_works.len(), "Processing snapshot");

    let records: Vec<WorkRecord> = snapshot.eu_works.iter().map(flatten_work).collect();

    let multi_institution = records.iter().filter(|r| r.multi_institution).count();
    let multi_country = records.iter().filter(|r| r.multi_country).count();
    info!(
        rows = records.len(),
        multi_institution, multi_country, "Raw work table built"
    );

    store::save_work_records(&settings.processed_dir(), &records)
}

/// Flatten one raw work document into a table row.
fn flatten_work(work: &OpenAlexWork) -> WorkRecord {
    let mut record = WorkRecord {
        work_id: work.id.clone().unwrap_or_default(),
        doi: work.doi.clone(),
        title: work.title.clone(),
        publication_year: work.publication_year,
        publication_date: work.publication_date.clone(),
        work_type: work.work_type.clone(),
        language: work.language.clone(),
        cited_by_count: work.cited_by_count.unwrap_or(0).max(0) as u32,
        open_access_is_oa: work.open_access.as_ref().map(|oa| oa.is_oa).unwrap_or(false),
        open_access_oa_status: work
            .open_access
            .as_ref()
            .and_then(|oa| oa.oa_status.clone())
            .unwrap_or_default(),
        ..Default::default()
    };

    for authorship in &work.authorships {
        if let Some(author) = &authorship.author {
            record.authors.push(Author {
                author_id: author.id.clone(),
                author_name: author.display_name.clone(),
                orcid: author.orcid.clone(),
            });
        }
        for inst in &authorship.institutions {
            record.institutions.push(InstitutionRef {
                institution_id: inst.id.clone(),
                institution_name: inst.display_name.clone(),
                country_code: inst.country_code.clone(),
                institution_type: inst.institution_type.clone(),
            });
            if let Some(id) = &inst.id {
                if !record.institution_ids.contains(id) {
                    record.institution_ids.push(id.clone());
                }
            }
            if let Some(code) = &inst.country_code {
                if !code.is_empty() && !record.countries.contains(code) {
                    record.countries.push(code.clone());
                }
            }
        }
    }

    record.multi_institution = record.institution_ids.len() > 1;
    record.multi_country = record.countries.len() > 1;
    record.authors_count = record.authors.len() as u32;
    record.institutions_count = record.institutions.len() as u32;
    record
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_author_work() -> OpenAlexWork {
        serde_json::from_str(
            r#"{
                "id": "https://openalex.org/W1",
                "title": "Learning analytics in practice",
                "publication_year": 2021,
                "cited_by_count": 4,
                "open_access": {"is_oa": true, "oa_status": "gold"},
                "authorships": [
                    {
                        "author": {"id": "https://openalex.org/A1", "display_name": "First Author"},
                        "institutions": [
                            {"id": "https://openalex.org/I1", "display_name": "Uni One", "country_code": "EE", "type": "education"},
                            {"id": "https://openalex.org/I2", "display_name": "Uni Two", "country_code": "FI", "type": "education"}
                        ]
                    },
                    {
                        "author": {"id": "https://openalex.org/A2", "display_name": "Second Author"},
                        "institutions": [
                            {"id": "https://openalex.org/I1", "display_name": "Uni One", "country_code": "EE", "type": "education"}
                        ]
                    }
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_flatten_builds_lists_and_counts() {
        let record = flatten_work(&two_author_work());

        assert_eq!(record.work_id, "https://openalex.org/W1");
        assert_eq!(record.publication_year, Some(2021));
        assert_eq!(record.cited_by_count, 4);
        assert!(record.open_access_is_oa);
        assert_eq!(record.open_access_oa_status, "gold");

        assert_eq!(record.authors_count, 2);
        // Every institution entry counts, even repeats across authorships.
        assert_eq!(record.institutions_count, 3);
        assert_eq!(
            record.institution_ids,
            vec!["https://openalex.org/I1", "https://openalex.org/I2"]
        );
        assert_eq!(record.countries, vec!["EE", "FI"]);
        assert!(record.multi_institution);
        assert!(record.multi_country);
    }

    #[test]
    fn test_flatten_single_institution_flags() {
        let work: OpenAlexWork = serde_json::from_str(
            r#"{
                "id": "https://openalex.org/W2",
                "authorships": [
                    {
                        "author": {"id": "https://openalex.org/A1", "display_name": "Solo"},
                        "institutions": [
                            {"id": "https://openalex.org/I1", "country_code": "DE"}
                        ]
                    }
                ]
            }"#,
        )
        .unwrap();

        let record = flatten_work(&work);
        assert!(!record.multi_institution);
        assert!(!record.multi_country);
        assert_eq!(record.authors_count, 1);
        assert_eq!(record.institutions_count, 1);
    }

    #[test]
    fn test_flatten_empty_document() {
        let record = flatten_work(&OpenAlexWork::default());
        assert_eq!(record.work_id, "");
        assert_eq!(record.cited_by_count, 0);
        assert!(!record.open_access_is_oa);
        assert!(record.authors.is_empty());
        assert!(record.countries.is_empty());
        assert_eq!(record.authors_count, 0);
    }

    #[test]
    fn test_flatten_skips_missing_institution_ids() {
        let work: OpenAlexWork = serde_json::from_str(
            r#"{
                "id": "https://openalex.org/W3",
                "authorships": [
                    {
                        "author": {"display_name": "Author"},
                        "institutions": [
                            {"display_name": "Unregistered Lab", "country_code": "SE"},
                            {"display_name": "Another Lab", "country_code": "SE"}
                        ]
                    }
                ]
            }"#,
        )
        .unwrap();

        let record = flatten_work(&work);
        assert!(record.institution_ids.is_empty());
        assert!(!record.multi_institution);
        assert_eq!(record.countries, vec!["SE"]);
        assert_eq!(record.institutions_count, 2);
    }
}
