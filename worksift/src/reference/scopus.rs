//! Scopus source registry loader

use std::collections::HashSet;
use std::path::Path;

use tracing::{info, warn};

use worksift_common::ids::{is_valid_issn, normalize_issn};

/// Set of normalized serial identifiers considered Scopus-indexed.
///
/// Built once at startup and read-only afterwards. An empty registry is a
/// documented degraded mode: the strict filter bypasses its indexing step
/// rather than rejecting everything.
#[derive(Debug, Default, Clone)]
pub struct IndexingRegistry {
    issns: HashSet<String>,
}

impl IndexingRegistry {
    /// Load the registry from a CSV export of the Scopus source list.
    ///
    /// The export is Latin-1 in the wild, so the bytes are read lossily
    /// rather than assuming UTF-8. Identifier columns are resolved once
    /// from the header row: every header whose name contains "issn" in any
    /// case. A missing or unparseable file yields an empty registry with a
    /// warning, never an error.
    pub fn load(path: &Path) -> IndexingRegistry {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Scopus file not readable, registry empty");
                return IndexingRegistry::default();
            }
        };

        let content = String::from_utf8_lossy(&bytes);
        match Self::parse(content.as_ref()) {
            Ok(registry) => {
                info!(issns = registry.len(), "Loaded Scopus sources");
                registry
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Scopus file unparseable, registry empty");
                IndexingRegistry::default()
            }
        }
    }

    fn parse(content: &str) -> csv::Result<IndexingRegistry> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::Headers)
            .from_reader(content.as_bytes());

        let headers = reader.headers()?.clone();
        let issn_columns: Vec<usize> = headers
            .iter()
            .enumerate()
            .filter(|(_, name)| name.to_lowercase().contains("issn"))
            .map(|(idx, _)| idx)
            .collect();

        let mut issns = HashSet::new();
        for record in reader.records() {
            let record = record?;
            for &idx in &issn_columns {
                if let Some(value) = record.get(idx) {
                    let clean = normalize_issn(value);
                    if is_valid_issn(&clean) {
                        issns.insert(clean);
                    }
                }
            }
        }

        Ok(IndexingRegistry { issns })
    }

    /// Registry built directly from identifier strings (fixtures, tests).
    pub fn from_raw<I, S>(values: I) -> IndexingRegistry
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let issns = values
            .into_iter()
            .map(|v| normalize_issn(v.as_ref()))
            .filter(|v| is_valid_issn(v))
            .collect();
        IndexingRegistry { issns }
    }

    /// Whether this (possibly raw) identifier is indexed.
    pub fn contains(&self, issn: &str) -> bool {
        self.issns.contains(&normalize_issn(issn))
    }

    /// Whether any of the given identifiers is indexed.
    pub fn contains_any<S: AsRef<str>>(&self, issns: &[S]) -> bool {
        issns.iter().any(|issn| self.contains(issn.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.issns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issns.is_empty()
    }
}
