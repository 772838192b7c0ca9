//! Strict corpus filter

use tracing::info;

use worksift_common::models::{EnrichedWork, QuartileThreshold};

use crate::reference::IndexingRegistry;

/// Apply the inclusion policy to an enriched table.
///
/// Step 1 keeps Scopus-indexed records; when the registry is empty the step
/// is skipped entirely (degraded mode, logged) rather than rejecting
/// everything. Step 2 keeps records whose quartile falls inside the
/// threshold's accepted set; records without a quartile are excluded. Row
/// order is preserved and nothing is deduplicated.
pub fn strict_subset(
    enriched: &[EnrichedWork],
    registry: &IndexingRegistry,
    threshold: QuartileThreshold,
) -> Vec<EnrichedWork> {
    let scopus_filtered: Vec<&EnrichedWork> = if registry.is_empty() {
        info!("Scopus registry empty: skipping the indexing filter");
        enriched.iter().collect()
    } else {
        let kept: Vec<&EnrichedWork> = enriched.iter().filter(|w| w.is_scopus_indexed).collect();
        info!(kept = kept.len(), total = enriched.len(), "Scopus-indexed works");
        kept
    };

    let strict: Vec<EnrichedWork> = scopus_filtered
        .into_iter()
        .filter(|w| w.scimago_quartile.map(|q| threshold.allows(q)).unwrap_or(false))
        .cloned()
        .collect();

    if enriched.is_empty() {
        info!(kept = strict.len(), threshold = %threshold, "Strict dataset");
    } else {
        let retained_pct = strict.len() as f64 / enriched.len() as f64 * 100.0;
        info!(
            kept = strict.len(),
            total = enriched.len(),
            retained_pct,
            threshold = %threshold,
            "Strict dataset"
        );
    }

    strict
}

#[cfg(test)]
mod tests {
    use super::*;
    use worksift_common::models::Quartile;

    fn row(id: &str, indexed: bool, quartile: Option<Quartile>) -> EnrichedWork {
        EnrichedWork {
            work_id: id.to_string(),
            is_scopus_indexed: indexed,
            scimago_quartile: quartile,
            ..Default::default()
        }
    }

    #[test]
    fn test_both_gates_applied() {
        let registry = IndexingRegistry::from_raw(["1234-5678"]);
        let enriched = vec![
            row("W1", true, Some(Quartile::Q1)),
            row("W2", false, Some(Quartile::Q1)),
            row("W3", true, Some(Quartile::Q4)),
            row("W4", true, None),
        ];

        let strict = strict_subset(&enriched, &registry, QuartileThreshold::Q3);
        let ids: Vec<&str> = strict.iter().map(|w| w.work_id.as_str()).collect();
        assert_eq!(ids, vec!["W1"]);
    }

    #[test]
    fn test_threshold_levels() {
        let registry = IndexingRegistry::from_raw(["1234-5678"]);
        let enriched = vec![
            row("W1", true, Some(Quartile::Q2)),
            row("W2", true, Some(Quartile::Q3)),
        ];

        let top_three = strict_subset(&enriched, &registry, QuartileThreshold::Q3);
        assert_eq!(top_three.len(), 2);

        let top_two = strict_subset(&enriched, &registry, QuartileThreshold::Q2);
        let ids: Vec<&str> = top_two.iter().map(|w| w.work_id.as_str()).collect();
        assert_eq!(ids, vec!["W1"]);
    }

    #[test]
    fn test_empty_registry_bypasses_indexing_gate() {
        let registry = IndexingRegistry::default();
        let enriched = vec![
            row("W1", false, Some(Quartile::Q2)),
            row("W2", false, None),
        ];

        let strict = strict_subset(&enriched, &registry, QuartileThreshold::Q3);
        let ids: Vec<&str> = strict.iter().map(|w| w.work_id.as_str()).collect();
        // W1 survives despite no registry match; W2 still fails the tier gate.
        assert_eq!(ids, vec!["W1"]);
    }

    #[test]
    fn test_filter_idempotent() {
        let registry = IndexingRegistry::from_raw(["1234-5678"]);
        let enriched = vec![
            row("W1", true, Some(Quartile::Q1)),
            row("W2", true, Some(Quartile::Q3)),
            row("W3", false, Some(Quartile::Q1)),
        ];

        let once = strict_subset(&enriched, &registry, QuartileThreshold::Q3);
        let twice = strict_subset(&once, &registry, QuartileThreshold::Q3);

        let once_ids: Vec<&str> = once.iter().map(|w| w.work_id.as_str()).collect();
        let twice_ids: Vec<&str> = twice.iter().map(|w| w.work_id.as_str()).collect();
        assert_eq!(once_ids, twice_ids);
        assert_eq!(once.len(), twice.len());
    }

    #[test]
    fn test_order_preserved_no_dedup() {
        let registry = IndexingRegistry::from_raw(["1234-5678"]);
        let enriched = vec![
            row("W2", true, Some(Quartile::Q2)),
            row("W1", true, Some(Quartile::Q1)),
            row("W2", true, Some(Quartile::Q2)),
        ];

        let strict = strict_subset(&enriched, &registry, QuartileThreshold::Q3);
        let ids: Vec<&str> = strict.iter().map(|w| w.work_id.as_str()).collect();
        assert_eq!(ids, vec!["W2", "W1", "W2"]);
    }
}
