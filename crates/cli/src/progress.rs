//! Terminal progress bar for batch evaluation

use indicatif::{ProgressBar, ProgressStyle};
use ragscope_core::Error;
use ragscope_evals::{EvaluationObserver, EvaluationResults, QueryResult};
use tracing::error;

/// Evaluation observer that drives an indicatif progress bar
pub struct ProgressObserver {
    bar: ProgressBar,
}

impl ProgressObserver {
    pub fn new() -> Self {
        Self {
            bar: create_progress_bar(0),
        }
    }
}

impl Default for ProgressObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl EvaluationObserver for ProgressObserver {
    fn on_batch_start(&self, total: usize, pipeline: &str) {
        self.bar.reset();
        self.bar.set_length(total as u64);
        self.bar.set_message(pipeline.to_string());
    }

    fn on_query_complete(&self, _index: usize, _total: usize, _result: &QueryResult) {
        self.bar.inc(1);
    }

    fn on_query_failed(&self, index: usize, _total: usize, query: &str, error: &Error) {
        self.bar
            .println(format!("query {} ('{query}') failed: {error}", index + 1));
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, results: &EvaluationResults) {
        self.bar.finish_with_message(format!(
            "{} queries, MRR {:.4}",
            results.num_queries, results.aggregate_metrics.mrr
        ));
    }
}

fn create_progress_bar(total: usize) -> ProgressBar {
    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
            .map_err(|e| error!("Failed to set progress bar style: {}", e))
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("##-"),
    );
    pb
}
