//! Retrieval quality evaluation for ragscope.
//!
//! This crate provides:
//! - Metrics computation for ranked retrieval (Precision@K, Recall@K, MRR, NDCG@K)
//! - A batch evaluator that runs test queries through a retrieval pipeline
//! - Test-query dataset loading
//! - Console, JSON and Markdown reports, plus multi-profile comparisons

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

pub mod comparison;
pub mod dataset;
pub mod eval_metrics;
pub mod evaluator;
pub mod observer;
pub mod report;

pub use comparison::{ComparisonReport, EvaluationProfile};
pub use dataset::{load_test_cases, parse_test_cases, TestCase};
pub use eval_metrics::{AggregateMetrics, PerQueryMetrics};
pub use evaluator::{EvaluationResults, Evaluator, QueryResult};
pub use observer::{EvaluationObserver, NoopObserver, TracingObserver};
pub use report::Reporter;
