//! Ranking metrics for retrieval evaluation
//!
//! All functions take the ranked list of retrieved source identifiers, the
//! ground-truth relevant set and a cutoff `k`. They are pure and return a
//! finite value; every reported metric lies in `[0, 1]`.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Metrics for a single query, keyed by cutoff K
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerQueryMetrics {
    pub precision_at_k: BTreeMap<usize, f64>,
    pub recall_at_k: BTreeMap<usize, f64>,
    pub mrr: f64,
    pub ndcg_at_k: BTreeMap<usize, f64>,
}

/// Mean of [`PerQueryMetrics`] over a batch; same shape
pub type AggregateMetrics = PerQueryMetrics;

impl PerQueryMetrics {
    /// All-zero metrics for the given cutoffs
    pub fn zeroed(k_values: &[usize]) -> Self {
        let zeros: BTreeMap<usize, f64> = k_values.iter().map(|&k| (k, 0.0)).collect();
        Self {
            precision_at_k: zeros.clone(),
            recall_at_k: zeros.clone(),
            mrr: 0.0,
            ndcg_at_k: zeros,
        }
    }

    /// Cutoffs present in this metric set
    pub fn k_values(&self) -> Vec<usize> {
        self.precision_at_k.keys().copied().collect()
    }

    pub fn precision(&self, k: usize) -> f64 {
        self.precision_at_k.get(&k).copied().unwrap_or(0.0)
    }

    pub fn recall(&self, k: usize) -> f64 {
        self.recall_at_k.get(&k).copied().unwrap_or(0.0)
    }

    pub fn ndcg(&self, k: usize) -> f64 {
        self.ndcg_at_k.get(&k).copied().unwrap_or(0.0)
    }
}

/// Fraction of the top-`k` positions holding a relevant source
///
/// The denominator is always `k`, so lists shorter than `k` are penalized.
pub fn precision_at_k(retrieved: &[String], relevant: &HashSet<String>, k: usize) -> f64 {
    if k == 0 || retrieved.is_empty() {
        return 0.0;
    }
    let hits = retrieved
        .iter()
        .take(k)
        .filter(|doc| relevant.contains(*doc))
        .count();
    finite_or_zero(hits as f64 / k as f64)
}

/// Share of relevant sources found in the top `k`
///
/// Distinct sources are counted so repeated chunks of one relevant document
/// cannot push recall above 1.
pub fn recall_at_k(retrieved: &[String], relevant: &HashSet<String>, k: usize) -> f64 {
    if relevant.is_empty() || k == 0 || retrieved.is_empty() {
        return 0.0;
    }
    let found: HashSet<&String> = retrieved
        .iter()
        .take(k)
        .filter(|doc| relevant.contains(*doc))
        .collect();
    finite_or_zero(found.len() as f64 / relevant.len() as f64)
}

/// Reciprocal of the 1-based rank of the first relevant source
pub fn mean_reciprocal_rank(retrieved: &[String], relevant: &HashSet<String>) -> f64 {
    retrieved
        .iter()
        .position(|doc| relevant.contains(doc))
        .map(|index| 1.0 / (index + 1) as f64)
        .unwrap_or(0.0)
}

/// Discounted cumulative gain over the top `k`
///
/// Uses the graded score of an item when `relevance_scores` has one, binary
/// membership in `relevant` otherwise. Unlike the other functions this is
/// not normalized and may exceed 1.
pub fn dcg_at_k(
    retrieved: &[String],
    relevant: &HashSet<String>,
    k: usize,
    relevance_scores: Option<&HashMap<String, f64>>,
) -> f64 {
    let dcg: f64 = retrieved
        .iter()
        .take(k)
        .enumerate()
        .map(|(i, doc)| {
            let rel = relevance_scores
                .and_then(|scores| scores.get(doc))
                .copied()
                .unwrap_or(if relevant.contains(doc) { 1.0 } else { 0.0 });
            rel * discount(i)
        })
        .sum();
    finite_or_zero(dcg)
}

/// DCG normalized by the DCG of the ideal ranking
///
/// With graded scores the ideal ranking is every scored item by descending
/// score; otherwise it is the relevant set. Both are truncated to `k`.
pub fn ndcg_at_k(
    retrieved: &[String],
    relevant: &HashSet<String>,
    k: usize,
    relevance_scores: Option<&HashMap<String, f64>>,
) -> f64 {
    if k == 0 || retrieved.is_empty() || relevant.is_empty() {
        return 0.0;
    }

    let dcg = dcg_at_k(retrieved, relevant, k, relevance_scores);
    let idcg = ideal_dcg_at_k(relevant, k, relevance_scores);
    if idcg <= 0.0 {
        return 0.0;
    }

    finite_or_zero(dcg / idcg).clamp(0.0, 1.0)
}

fn ideal_dcg_at_k(
    relevant: &HashSet<String>,
    k: usize,
    relevance_scores: Option<&HashMap<String, f64>>,
) -> f64 {
    let ideal: Vec<f64> = match relevance_scores {
        Some(scores) if !scores.is_empty() => {
            let mut values: Vec<f64> = scores.values().copied().collect();
            values.sort_by(|a, b| descending_nan_last(*a, *b));
            values.into_iter().take(k).collect()
        }
        _ => vec![1.0; relevant.len().min(k)],
    };

    let idcg: f64 = ideal
        .iter()
        .enumerate()
        .map(|(i, rel)| rel * discount(i))
        .sum();
    finite_or_zero(idcg)
}

/// Compute every metric family at each cutoff in `k_values` not above `k_max`
pub fn compute_metrics(
    retrieved: &[String],
    relevant: &HashSet<String>,
    relevance_scores: Option<&HashMap<String, f64>>,
    k_values: &[usize],
    k_max: usize,
) -> PerQueryMetrics {
    let mut metrics = PerQueryMetrics {
        mrr: mean_reciprocal_rank(retrieved, relevant),
        ..PerQueryMetrics::default()
    };

    for &k in k_values.iter().filter(|&&k| k <= k_max) {
        metrics
            .precision_at_k
            .insert(k, precision_at_k(retrieved, relevant, k));
        metrics
            .recall_at_k
            .insert(k, recall_at_k(retrieved, relevant, k));
        metrics
            .ndcg_at_k
            .insert(k, ndcg_at_k(retrieved, relevant, k, relevance_scores));
    }

    metrics
}

/// Arithmetic mean per cutoff and of MRR
///
/// A cutoff missing from one query's metrics counts as 0.0 for that query.
/// An empty batch yields empty maps and an MRR of 0.0.
pub fn aggregate<'a, I>(metrics: I, k_values: &[usize]) -> AggregateMetrics
where
    I: IntoIterator<Item = &'a PerQueryMetrics>,
{
    let all: Vec<&PerQueryMetrics> = metrics.into_iter().collect();
    if all.is_empty() {
        return AggregateMetrics::default();
    }

    let mut aggregate = AggregateMetrics {
        mrr: mean_of(&all, |m| m.mrr),
        ..AggregateMetrics::default()
    };
    for &k in k_values {
        aggregate
            .precision_at_k
            .insert(k, mean_of(&all, |m| m.precision(k)));
        aggregate
            .recall_at_k
            .insert(k, mean_of(&all, |m| m.recall(k)));
        aggregate
            .ndcg_at_k
            .insert(k, mean_of(&all, |m| m.ndcg(k)));
    }
    aggregate
}

fn mean_of(all: &[&PerQueryMetrics], value: impl Fn(&PerQueryMetrics) -> f64) -> f64 {
    let total: f64 = all.iter().map(|&m| value(m)).sum();
    finite_or_zero(total / all.len() as f64)
}

/// Position discount for 0-based index `i`: `1 / log2(i + 2)`
fn discount(i: usize) -> f64 {
    1.0 / ((i + 2) as f64).log2()
}

fn descending_nan_last(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}
