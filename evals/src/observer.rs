//! Progress reporting hooks for batch evaluation

use crate::evaluator::{EvaluationResults, QueryResult};
use ragscope_core::Error;
use tracing::{info, warn};

/// Receives progress events from the evaluator
///
/// Every method has an empty default so observers only implement what they
/// care about. Called from the evaluating task; implementations must not
/// block for long.
pub trait EvaluationObserver: Send + Sync {
    fn on_batch_start(&self, _total: usize, _pipeline: &str) {}

    fn on_query_complete(&self, _index: usize, _total: usize, _result: &QueryResult) {}

    fn on_query_failed(&self, _index: usize, _total: usize, _query: &str, _error: &Error) {}

    fn on_batch_complete(&self, _results: &EvaluationResults) {}
}

/// Observer that ignores every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl EvaluationObserver for NoopObserver {}

/// Observer that emits `tracing` events
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl EvaluationObserver for TracingObserver {
    fn on_batch_start(&self, total: usize, pipeline: &str) {
        info!("Evaluating {total} queries ({pipeline})");
    }

    fn on_query_complete(&self, index: usize, total: usize, result: &QueryResult) {
        info!(
            "[{}/{total}] '{}': MRR={:.3}, {} retrieved",
            index + 1,
            result.query,
            result.metrics.mrr,
            result.retrieved_docs.len()
        );
    }

    fn on_query_failed(&self, index: usize, total: usize, query: &str, error: &Error) {
        warn!("[{}/{total}] '{query}' failed: {error}", index + 1);
    }

    fn on_batch_complete(&self, results: &EvaluationResults) {
        info!(
            "Evaluated {} queries ({} failed), aggregate MRR={:.4}",
            results.num_queries, results.num_failed, results.aggregate_metrics.mrr
        );
    }
}
