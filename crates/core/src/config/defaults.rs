//! Default values and functions for configuration

use super::OnQueryError;

// Default constants
pub(crate) const DEFAULT_STORAGE_PROVIDER: &str = "fixture";
pub(crate) const DEFAULT_COLLECTION: &str = "documents";
pub(crate) const DEFAULT_OUTPUT_DIRECTORY: &str = "evaluation_results";
pub(crate) const DEFAULT_RESULTS_FILE: &str = "results.json";
pub(crate) const DEFAULT_REPORT_FILE: &str = "report.md";

pub(crate) fn default_k_values() -> Vec<usize> {
    vec![1, 3, 5, 10]
}

pub(crate) fn default_on_query_error() -> OnQueryError {
    OnQueryError::Abort
}

pub(crate) fn default_max_concurrent_queries() -> usize {
    1 // Sequential, matching the reference evaluation order
}

pub(crate) fn default_deduplicate() -> bool {
    false
}

pub(crate) fn default_min_similarity() -> f64 {
    0.0
}

pub(crate) fn default_dedup_overfetch_factor() -> usize {
    3
}

pub(crate) fn default_storage_provider() -> String {
    DEFAULT_STORAGE_PROVIDER.to_string()
}

pub(crate) fn default_collection() -> String {
    DEFAULT_COLLECTION.to_string()
}

pub(crate) fn default_timeout_secs() -> u64 {
    30
}

pub(crate) fn default_output_directory() -> String {
    DEFAULT_OUTPUT_DIRECTORY.to_string()
}

pub(crate) fn default_results_file() -> String {
    DEFAULT_RESULTS_FILE.to_string()
}

pub(crate) fn default_report_file() -> String {
    DEFAULT_REPORT_FILE.to_string()
}

pub(crate) fn default_top_sources_shown() -> usize {
    5
}
