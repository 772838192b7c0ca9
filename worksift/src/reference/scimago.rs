//! SCImago ranking table loader and quartile resolver

use std::collections::HashMap;
use std::ops::Range;
use std::path::Path;

use tracing::{debug, info, warn};

use worksift_common::ids::{normalize_issn, split_issn_field};
use worksift_common::models::Quartile;

/// Tier-column names probed per row, most specific first.
const TIER_COLUMNS: [&str; 5] = [
    "SJR Quartile",
    "SJR quartile",
    "Quartile",
    "sjr quartile",
    "SJR",
];

/// Per-year quartile lookup built from the SCImago ranking files.
///
/// Lookups are pre-indexed at load time: rows are scanned in
/// file-concatenation order and each normalized identifier maps to the tier
/// of the first row that both carries it and holds a valid tier label. A
/// row whose tier cell is missing or invalid claims nothing, so a later row
/// can still supply the tier for the same identifier. This reproduces a
/// linear first-accepted-match scan without paying for one per lookup.
#[derive(Debug, Default)]
pub struct QuartileTables {
    by_year: HashMap<i32, HashMap<String, Quartile>>,
}

impl QuartileTables {
    /// Load ranking files for every year in `years` (end-exclusive).
    ///
    /// Per year, file-name candidates are probed in order: one per region,
    /// then one per region with a stray trailing space before the extension
    /// (some SCImago exports carry it). Every candidate that exists is
    /// parsed and appended. A file that fails to parse is skipped whole; a
    /// year with no files contributes no table, and lookups for it resolve
    /// to nothing.
    pub fn load(dir: &Path, years: Range<i32>, category: &str, regions: &[String]) -> QuartileTables {
        let mut by_year = HashMap::new();

        for year in years {
            let mut index: HashMap<String, Quartile> = HashMap::new();
            let mut journals = 0usize;

            for (filename, region) in candidate_files(year, category, regions) {
                let path = dir.join(&filename);
                if !path.exists() {
                    continue;
                }
                match parse_file(&path) {
                    Ok((rows, pairs)) => {
                        journals += rows;
                        for (issn, tier) in pairs {
                            index.entry(issn).or_insert(tier);
                        }
                        debug!(year, region = %region, rows, file = %filename, "Loaded SCImago table");
                    }
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "Failed reading SCImago file, skipping");
                    }
                }
            }

            if journals > 0 {
                info!(year, journals, "SCImago tables loaded");
                by_year.insert(year, index);
            } else {
                warn!(year, dir = %dir.display(), "No SCImago files found");
            }
        }

        QuartileTables { by_year }
    }

    /// First-match quartile for one identifier in one year.
    ///
    /// Absent when the identifier is empty, the year has no table, or no
    /// row with a valid tier carries the identifier.
    pub fn resolve(&self, issn: &str, year: i32) -> Option<Quartile> {
        let index = self.by_year.get(&year)?;
        let clean = normalize_issn(issn);
        if clean.is_empty() {
            return None;
        }
        index.get(&clean).copied()
    }

    /// Years that actually loaded a table.
    pub fn year_count(&self) -> usize {
        self.by_year.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_year.is_empty()
    }
}

/// File-name candidates for one year, in probe order.
///
/// The canonical SCImago export name has two spaces after the year; the
/// trailing-space variants cover files renamed by hand.
fn candidate_files(year: i32, category: &str, regions: &[String]) -> Vec<(String, String)> {
    let mut files = Vec::with_capacity(regions.len() * 2);
    for region in regions {
        files.push((
            format!("scimagojr {year}  Subject Category - {category}_{region}.csv"),
            region.clone(),
        ));
    }
    for region in regions {
        files.push((
            format!("scimagojr {year}  Subject Category - {category}_{region} .csv"),
            region.clone(),
        ));
    }
    files
}

/// Parse one semicolon-delimited ranking file into `(issn, tier)` pairs in
/// row order, plus the row count. Parsing is atomic: any error discards the
/// whole file so a half-read table never pollutes the index.
fn parse_file(path: &Path) -> csv::Result<(usize, Vec<(String, Quartile)>)> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_path(path)?;

    let headers = reader.headers()?.clone();
    // Column resolution happens once per file: identifier columns by name
    // pattern, tier columns by the fixed candidate list.
    let issn_columns: Vec<usize> = headers
        .iter()
        .enumerate()
        .filter(|(_, name)| name.to_lowercase().contains("issn"))
        .map(|(idx, _)| idx)
        .collect();
    let tier_columns: Vec<usize> = TIER_COLUMNS
        .iter()
        .filter_map(|name| headers.iter().position(|h| h == *name))
        .collect();

    let mut rows = 0usize;
    let mut pairs = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows += 1;

        let tier = match row_tier(&record, &tier_columns) {
            Some(tier) => tier,
            None => continue,
        };
        for &idx in &issn_columns {
            if let Some(value) = record.get(idx) {
                for issn in split_issn_field(value) {
                    pairs.push((issn, tier));
                }
            }
        }
    }

    Ok((rows, pairs))
}

/// Probe the resolved tier columns in candidate order; first cell holding a
/// valid `Q1`..`Q4` label wins. An unparseable cell falls through to the
/// next candidate.
fn row_tier(record: &csv::StringRecord, tier_columns: &[usize]) -> Option<Quartile> {
    tier_columns
        .iter()
        .find_map(|&idx| record.get(idx).and_then(|cell| cell.trim().parse::<Quartile>().ok()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn region_strings() -> Vec<String> {
        vec!["Eastern Europe".to_string(), "Western Europe".to_string()]
    }

    fn eastern_name(year: i32) -> String {
        format!("scimagojr {year}  Subject Category - Artificial Intelligence_Eastern Europe.csv")
    }

    fn western_name(year: i32) -> String {
        format!("scimagojr {year}  Subject Category - Artificial Intelligence_Western Europe.csv")
    }

    fn load_dir(dir: &Path, years: Range<i32>) -> QuartileTables {
        QuartileTables::load(dir, years, "Artificial Intelligence", &region_strings())
    }

    #[test]
    fn test_first_matching_row_with_valid_tier_wins() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(eastern_name(2022)),
            "Title;Issn;SJR Quartile\nJournal A;1234-5678;Q2\nJournal B;1234-5678;Q1\n",
        )
        .unwrap();

        let tables = load_dir(dir.path(), 2022..2023);
        assert_eq!(tables.resolve("1234-5678", 2022), Some(Quartile::Q2));
    }

    #[test]
    fn test_invalid_tier_row_falls_through_to_later_row() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(eastern_name(2022)),
            "Title;Issn;SJR Quartile\nJournal A;1234-5678;-\nJournal B;1234-5678;Q3\n",
        )
        .unwrap();

        let tables = load_dir(dir.path(), 2022..2023);
        assert_eq!(tables.resolve("1234-5678", 2022), Some(Quartile::Q3));
    }

    #[test]
    fn test_region_order_decides_across_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(eastern_name(2022)),
            "Title;Issn;SJR Quartile\nShared Journal;1234-5678;Q4\n",
        )
        .unwrap();
        fs::write(
            dir.path().join(western_name(2022)),
            "Title;Issn;SJR Quartile\nShared Journal;1234-5678;Q1\n",
        )
        .unwrap();

        let tables = load_dir(dir.path(), 2022..2023);
        // Eastern Europe is probed first, so its row is first in concat order.
        assert_eq!(tables.resolve("1234-5678", 2022), Some(Quartile::Q4));
    }

    #[test]
    fn test_trailing_space_filename_variant_is_found() {
        let dir = tempfile::tempdir().unwrap();
        let name =
            "scimagojr 2021  Subject Category - Artificial Intelligence_Western Europe .csv";
        fs::write(
            dir.path().join(name),
            "Title;Issn;SJR Quartile\nRenamed Export;8765-432X;Q1\n",
        )
        .unwrap();

        let tables = load_dir(dir.path(), 2021..2022);
        assert_eq!(tables.resolve("8765432X", 2021), Some(Quartile::Q1));
    }

    #[test]
    fn test_comma_separated_identifier_cell() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(eastern_name(2020)),
            "Title;Issn;SJR Quartile\nDouble Issn;1234-5678, 8765-432X;Q2\n",
        )
        .unwrap();

        let tables = load_dir(dir.path(), 2020..2021);
        assert_eq!(tables.resolve("1234-5678", 2020), Some(Quartile::Q2));
        assert_eq!(tables.resolve("8765-432x", 2020), Some(Quartile::Q2));
    }

    #[test]
    fn test_tier_column_candidate_order() {
        let dir = tempfile::tempdir().unwrap();
        // "SJR" holds the score, not a tier; "SJR Quartile" must win.
        fs::write(
            dir.path().join(eastern_name(2022)),
            "Title;Issn;SJR;SJR Quartile\nJournal A;1234-5678;1,24;Q1\n",
        )
        .unwrap();

        let tables = load_dir(dir.path(), 2022..2023);
        assert_eq!(tables.resolve("1234-5678", 2022), Some(Quartile::Q1));
    }

    #[test]
    fn test_tier_falls_back_to_later_candidate_column() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(eastern_name(2022)),
            "Title;Issn;SJR Quartile;Quartile\nJournal A;1234-5678;-;Q2\n",
        )
        .unwrap();

        let tables = load_dir(dir.path(), 2022..2023);
        assert_eq!(tables.resolve("1234-5678", 2022), Some(Quartile::Q2));
    }

    #[test]
    fn test_header_whitespace_trimmed() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(eastern_name(2022)),
            "Title; Issn ; SJR Quartile \nJournal A;1234-5678;Q3\n",
        )
        .unwrap();

        let tables = load_dir(dir.path(), 2022..2023);
        assert_eq!(tables.resolve("1234-5678", 2022), Some(Quartile::Q3));
    }

    #[test]
    fn test_unparseable_file_skipped_whole() {
        let dir = tempfile::tempdir().unwrap();
        // Invalid UTF-8 partway through the eastern file.
        fs::write(
            dir.path().join(eastern_name(2022)),
            b"Title;Issn;SJR Quartile\nJournal A;1234-5678;Q1\nJournal\xff B;0000-0000;Q1\n".as_slice(),
        )
        .unwrap();
        fs::write(
            dir.path().join(western_name(2022)),
            "Title;Issn;SJR Quartile\nJournal C;8765-432X;Q2\n",
        )
        .unwrap();

        let tables = load_dir(dir.path(), 2022..2023);
        // Nothing from the bad file survives, including its valid first row.
        assert_eq!(tables.resolve("1234-5678", 2022), None);
        assert_eq!(tables.resolve("8765-432X", 2022), Some(Quartile::Q2));
    }

    #[test]
    fn test_missing_year_resolves_to_nothing() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(eastern_name(2022)),
            "Title;Issn;SJR Quartile\nJournal A;1234-5678;Q1\n",
        )
        .unwrap();

        let tables = load_dir(dir.path(), 2021..2023);
        assert_eq!(tables.resolve("1234-5678", 2021), None);
        assert_eq!(tables.resolve("1234-5678", 2022), Some(Quartile::Q1));
        assert_eq!(tables.year_count(), 1);
    }

    #[test]
    fn test_empty_identifier_resolves_to_nothing() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(eastern_name(2022)),
            "Title;Issn;SJR Quartile\nJournal A;1234-5678;Q1\n",
        )
        .unwrap();

        let tables = load_dir(dir.path(), 2022..2023);
        assert_eq!(tables.resolve("", 2022), None);
        assert_eq!(tables.resolve("  - ", 2022), None);
    }
}
