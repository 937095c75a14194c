//! Pure list transformations used by the retrieval stages
//!
//! Each function consumes a ranked list and returns a new one with the
//! surviving items in their original relative order.

use ragscope_core::RankedResultList;
use std::collections::HashSet;

/// Default over-fetch multiplier for source deduplication
pub const DEFAULT_OVERFETCH_FACTOR: usize = 3;

/// Keep the first chunk of each distinct source, stopping at `k` sources
///
/// Greedy and order-preserving: a later chunk of an already-seen source is
/// skipped even if a different source would have ranked lower. Fewer than
/// `k` items are returned when the input runs out of distinct sources.
pub fn dedup_by_source(results: RankedResultList, k: usize) -> RankedResultList {
    let mut seen: HashSet<String> = HashSet::new();
    let mut kept = Vec::with_capacity(k.min(results.len()));

    for item in results {
        if kept.len() >= k {
            break;
        }
        if seen.insert(item.source.clone()) {
            kept.push(item);
        }
    }

    RankedResultList::new(kept)
}

/// Drop items whose similarity is strictly below `min_similarity`
///
/// A threshold of `0.0` or less disables the filter so that negative
/// similarities (distances above 1.0) survive the default configuration.
pub fn filter_by_similarity(results: RankedResultList, min_similarity: f64) -> RankedResultList {
    if min_similarity <= 0.0 {
        return results;
    }
    results
        .into_iter()
        .filter(|item| item.similarity >= min_similarity)
        .collect()
}

/// Truncate to `max_results` when set; a cap of 0 means no cap
pub fn limit(results: RankedResultList, max_results: Option<usize>) -> RankedResultList {
    match max_results {
        Some(max) if max > 0 => results.truncated(max),
        _ => results,
    }
}

/// Number of items to request from the store before deduplicating to `k`
pub fn overfetch(k: usize, factor: usize) -> usize {
    k.saturating_mul(factor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use ragscope_core::SearchHit;

    fn list(entries: &[(&str, usize, f64)]) -> RankedResultList {
        RankedResultList::from_hits(
            entries
                .iter()
                .map(|(source, chunk, distance)| SearchHit {
                    text: format!("{source}#{chunk}"),
                    source: source.to_string(),
                    chunk_index: *chunk,
                    distance: *distance,
                })
                .collect(),
        )
    }

    #[test]
    fn test_dedup_keeps_first_occurrence_in_order() {
        let results = list(&[("A", 0, 0.1), ("B", 0, 0.2), ("A", 1, 0.3), ("C", 0, 0.4)]);
        let deduped = dedup_by_source(results, 2);

        assert_eq!(deduped.sources(), vec!["A", "B"]);
        assert_eq!(deduped.as_slice()[0].chunk_index, 0);
    }

    #[test]
    fn test_dedup_skips_repeats_to_reach_k() {
        let results = list(&[("A", 0, 0.1), ("A", 1, 0.2), ("B", 0, 0.3), ("A", 2, 0.4), ("C", 0, 0.5)]);
        let deduped = dedup_by_source(results, 3);
        assert_eq!(deduped.sources(), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_dedup_exhausted_input_returns_fewer() {
        let results = list(&[("A", 0, 0.1), ("A", 1, 0.2), ("B", 0, 0.3)]);
        let deduped = dedup_by_source(results, 5);
        assert_eq!(deduped.sources(), vec!["A", "B"]);
    }

    #[test]
    fn test_dedup_zero_k_is_empty() {
        let results = list(&[("A", 0, 0.1)]);
        assert!(dedup_by_source(results, 0).is_empty());
    }

    #[test]
    fn test_threshold_uses_strict_less_than_exclusion() {
        // similarities: 0.9, 0.5, 0.3
        let results = list(&[("A", 0, 0.1), ("B", 0, 0.5), ("C", 0, 0.7)]);
        let filtered = filter_by_similarity(results, 0.5);
        assert_eq!(filtered.sources(), vec!["A", "B"]);
    }

    #[test]
    fn test_threshold_does_not_reorder() {
        // Store order deliberately not sorted by similarity
        let results = list(&[("A", 0, 0.4), ("B", 0, 0.1), ("C", 0, 0.9), ("D", 0, 0.2)]);
        let filtered = filter_by_similarity(results, 0.5);
        assert_eq!(filtered.sources(), vec!["A", "B", "D"]);
    }

    #[test]
    fn test_threshold_zero_keeps_negative_similarity() {
        let results = list(&[("A", 0, 1.4)]);
        assert_eq!(filter_by_similarity(results, 0.0).len(), 1);
    }

    #[test]
    fn test_threshold_one_drops_imperfect_matches() {
        let results = list(&[("A", 0, 0.05), ("B", 0, 0.2)]);
        assert!(filter_by_similarity(results, 1.0).is_empty());
    }

    #[test]
    fn test_limit() {
        let results = list(&[("A", 0, 0.1), ("B", 0, 0.2), ("C", 0, 0.3)]);
        assert_eq!(limit(results.clone(), None).len(), 3);
        assert_eq!(limit(results.clone(), Some(2)).sources(), vec!["A", "B"]);
        assert_eq!(limit(results.clone(), Some(10)).len(), 3);
        assert_eq!(limit(results, Some(0)).len(), 3);
    }

    #[test]
    fn test_overfetch_saturates() {
        assert_eq!(overfetch(5, 3), 15);
        assert_eq!(overfetch(usize::MAX, 3), usize::MAX);
    }
}
