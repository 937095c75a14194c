//! Batch evaluation of a retrieval pipeline against ground truth

use crate::dataset::TestCase;
use crate::eval_metrics::{self, AggregateMetrics, PerQueryMetrics};
use crate::observer::{EvaluationObserver, TracingObserver};
use futures::stream::{self, StreamExt, TryStreamExt};
use ragscope_core::{Config, Error, EvaluationConfig, OnQueryError, RetrievalConfig};
use ragscope_retrieval::{RetrievalPipeline, Retrieve};
use ragscope_storage::VectorStore;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

/// Outcome of evaluating one query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub query: String,
    /// Sources of the retrieved items, in rank order
    pub retrieved_docs: Vec<String>,
    /// Ground-truth sources, duplicates removed
    pub relevant_docs: Vec<String>,
    pub metrics: PerQueryMetrics,
    /// Failure message when the query could not be evaluated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl QueryResult {
    /// Zero-scored result for a query whose retrieval failed
    pub fn failed(
        query: impl Into<String>,
        relevant_docs: &[String],
        k_values: &[usize],
        error: &Error,
    ) -> Self {
        Self {
            query: query.into(),
            retrieved_docs: Vec::new(),
            relevant_docs: unique_in_order(relevant_docs),
            metrics: PerQueryMetrics::zeroed(k_values),
            error: Some(error.to_string()),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }

    pub fn is_relevant(&self, source: &str) -> bool {
        self.relevant_docs.iter().any(|doc| doc == source)
    }
}

/// Per-query results of a batch plus their aggregate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResults {
    pub query_results: Vec<QueryResult>,
    pub aggregate_metrics: AggregateMetrics,
    pub num_queries: usize,
    #[serde(default)]
    pub num_failed: usize,
    pub k_values: Vec<usize>,
}

impl EvaluationResults {
    /// Aggregate collected per-query results over `k_values`
    pub fn from_query_results(query_results: Vec<QueryResult>, k_values: &[usize]) -> Self {
        let aggregate_metrics =
            eval_metrics::aggregate(query_results.iter().map(|qr| &qr.metrics), k_values);
        let num_failed = query_results.iter().filter(|qr| qr.is_failed()).count();
        Self {
            num_queries: query_results.len(),
            num_failed,
            aggregate_metrics,
            query_results,
            k_values: k_values.to_vec(),
        }
    }
}

/// Runs test queries through a retriever and scores the rankings
pub struct Evaluator {
    retriever: Arc<dyn Retrieve>,
    pipeline: String,
    k_values: Vec<usize>,
    on_query_error: OnQueryError,
    max_concurrent_queries: usize,
    observer: Arc<dyn EvaluationObserver>,
}

impl Evaluator {
    /// Evaluator over a pipeline built from the retrieval settings
    pub fn new(
        store: Arc<dyn VectorStore>,
        evaluation: &EvaluationConfig,
        retrieval: &RetrievalConfig,
    ) -> Self {
        let pipeline = RetrievalPipeline::from_config(store, retrieval);
        let label = pipeline.to_string();
        let mut evaluator = Self::with_retriever(Arc::new(pipeline), evaluation);
        evaluator.pipeline = label;
        evaluator
    }

    pub fn from_config(store: Arc<dyn VectorStore>, config: &Config) -> Self {
        Self::new(store, &config.evaluation, &config.retrieval)
    }

    /// Evaluator over an already assembled retriever
    pub fn with_retriever(retriever: Arc<dyn Retrieve>, evaluation: &EvaluationConfig) -> Self {
        let mut k_values = evaluation.k_values.clone();
        k_values.sort_unstable();
        k_values.dedup();

        Self {
            retriever,
            pipeline: "custom".to_string(),
            k_values,
            on_query_error: evaluation.on_query_error,
            max_concurrent_queries: evaluation.max_concurrent_queries.max(1),
            observer: Arc::new(TracingObserver),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn EvaluationObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Configured cutoffs, ascending and without duplicates
    pub fn k_values(&self) -> &[usize] {
        &self.k_values
    }

    /// Largest configured cutoff, used as the retrieval depth for batches
    pub fn k_max(&self) -> usize {
        self.k_values.last().copied().unwrap_or(0)
    }

    /// Human-readable description of the retrieval stages
    pub fn pipeline(&self) -> &str {
        &self.pipeline
    }

    /// Retrieve `k_max` items for `query` and score them
    ///
    /// Metrics are computed at every configured cutoff not above `k_max`.
    /// A retrieval failure is returned as an error; no partial result is
    /// produced.
    pub async fn evaluate_query(
        &self,
        query: &str,
        relevant_docs: &[String],
        k_max: usize,
        relevance_scores: Option<&HashMap<String, f64>>,
    ) -> Result<QueryResult, Error> {
        let retrieved = self.retriever.retrieve(query, k_max).await?;
        let retrieved_docs = retrieved.sources();
        let relevant: HashSet<String> = relevant_docs.iter().cloned().collect();

        let metrics = eval_metrics::compute_metrics(
            &retrieved_docs,
            &relevant,
            relevance_scores,
            &self.k_values,
            k_max,
        );
        debug!(
            "Scored '{query}': {} retrieved, {} relevant",
            retrieved_docs.len(),
            relevant.len()
        );

        Ok(QueryResult {
            query: query.to_string(),
            retrieved_docs,
            relevant_docs: unique_in_order(relevant_docs),
            metrics,
            error: None,
        })
    }

    pub async fn evaluate_test_case(
        &self,
        case: &TestCase,
        k_max: usize,
    ) -> Result<QueryResult, Error> {
        self.evaluate_query(
            &case.query,
            &case.relevant_docs,
            k_max,
            case.relevance_scores.as_ref(),
        )
        .await
    }

    /// Evaluate every test case at the largest cutoff and aggregate
    ///
    /// Results keep input order even when queries run concurrently. A failed
    /// query either aborts the batch or is recorded with zero metrics,
    /// depending on the configured policy.
    pub async fn evaluate_batch(&self, cases: &[TestCase]) -> Result<EvaluationResults, Error> {
        let total = cases.len();
        let k_max = self.k_max();
        self.observer.on_batch_start(total, &self.pipeline);

        let query_results: Vec<QueryResult> = stream::iter(cases.iter().enumerate())
            .map(|(index, case)| self.evaluate_indexed(index, total, case, k_max))
            .buffered(self.max_concurrent_queries)
            .try_collect()
            .await?;

        let results = EvaluationResults::from_query_results(query_results, &self.k_values);
        self.observer.on_batch_complete(&results);
        Ok(results)
    }

    async fn evaluate_indexed(
        &self,
        index: usize,
        total: usize,
        case: &TestCase,
        k_max: usize,
    ) -> Result<QueryResult, Error> {
        match self.evaluate_test_case(case, k_max).await {
            Ok(result) => {
                self.observer.on_query_complete(index, total, &result);
                Ok(result)
            }
            Err(error) => {
                self.observer
                    .on_query_failed(index, total, &case.query, &error);
                match self.on_query_error {
                    OnQueryError::Abort => Err(Error::with_context(
                        format!("Query {} of {total} ('{}') failed", index + 1, case.query),
                        error,
                    )),
                    OnQueryError::Record => {
                        let in_range: Vec<usize> = self
                            .k_values
                            .iter()
                            .copied()
                            .filter(|&k| k <= k_max)
                            .collect();
                        Ok(QueryResult::failed(
                            &case.query,
                            &case.relevant_docs,
                            &in_range,
                            &error,
                        ))
                    }
                }
            }
        }
    }
}

fn unique_in_order(docs: &[String]) -> Vec<String> {
    let mut seen: HashSet<&String> = HashSet::new();
    docs.iter()
        .filter(|doc| seen.insert(*doc))
        .cloned()
        .collect()
}
