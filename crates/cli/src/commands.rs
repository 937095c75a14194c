//! Command implementations shared by the binary and integration tests

use crate::progress::ProgressObserver;
use anyhow::{Context, Result};
use ragscope_core::{Config, RankedResultList, RetrievalConfig};
use ragscope_evals::{
    load_test_cases, ComparisonReport, EvaluationObserver, EvaluationResults, Evaluator,
    Reporter, TracingObserver,
};
use ragscope_retrieval::{RetrievalPipeline, Retrieve, Retriever};
use ragscope_storage::{create_vector_store, VectorStore};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Flags of the `search` command
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    pub min_similarity: f64,
    pub max_results: Option<usize>,
    pub unique_sources: bool,
}

async fn open_store(config: &Config) -> Result<Arc<dyn VectorStore>> {
    create_vector_store(&config.storage)
        .await
        .with_context(|| format!("Failed to open '{}' vector store", config.storage.provider))
}

fn observer(show_progress: bool) -> Arc<dyn EvaluationObserver> {
    if show_progress {
        Arc::new(ProgressObserver::new())
    } else {
        Arc::new(TracingObserver)
    }
}

/// Evaluate a test-query file and write the JSON and Markdown reports
pub async fn run_evaluate(
    config: &Config,
    queries: &Path,
    show_progress: bool,
) -> Result<EvaluationResults> {
    let cases = load_test_cases(queries)?;
    let store = open_store(config).await?;

    let evaluator = Evaluator::from_config(store, config).with_observer(observer(show_progress));
    info!(
        "Evaluating {} queries with pipeline {}",
        cases.len(),
        evaluator.pipeline()
    );
    let results = evaluator
        .evaluate_batch(&cases)
        .await
        .context("Evaluation failed")?;

    let reporter = Reporter::from_config(&config.output);
    reporter.print_summary(&results);
    reporter
        .save_json(&results, &config.output.results_path())
        .context("Failed to save evaluation results")?;
    reporter
        .save_markdown(&results, &config.output.report_path())
        .context("Failed to save evaluation report")?;

    Ok(results)
}

/// Evaluate the four retrieval profiles and write the comparison files
pub async fn run_compare(
    config: &Config,
    queries: &Path,
    min_similarity: f64,
    show_progress: bool,
) -> Result<ComparisonReport> {
    let cases = load_test_cases(queries)?;
    let store = open_store(config).await?;

    let report = ComparisonReport::run(
        store,
        config,
        &cases,
        min_similarity,
        observer(show_progress),
    )
    .await
    .context("Comparison failed")?;

    println!("{}", report.summary());
    let (json_path, md_path) = report
        .save(Path::new(&config.output.directory))
        .context("Failed to save comparison report")?;
    println!("\nResults saved to:");
    println!("  - {}", json_path.display());
    println!("  - {}", md_path.display());

    Ok(report)
}

/// Ranked retrieval for a single query
pub async fn run_search(
    config: &Config,
    query: &str,
    k: usize,
    options: &SearchOptions,
) -> Result<RankedResultList> {
    let store = open_store(config).await?;

    let results = if options.unique_sources {
        let retrieval = RetrievalConfig {
            deduplicate: true,
            min_similarity: options.min_similarity,
            max_results: options.max_results,
            ..config.retrieval.clone()
        };
        RetrievalPipeline::from_config(store, &retrieval)
            .retrieve(query, k)
            .await?
    } else {
        Retriever::new(store)
            .retrieve_ranked(query, k, options.min_similarity, options.max_results)
            .await?
    };

    Ok(results)
}
