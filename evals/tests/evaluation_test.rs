//! End-to-end evaluation against in-memory and recorded vector stores.

use async_trait::async_trait;
use ragscope_core::{Config, Error, EvaluationConfig, RetrievalConfig, SearchHit};
use ragscope_evals::{
    load_test_cases, EvaluationObserver, EvaluationResults, Evaluator, NoopObserver, QueryResult,
    Reporter, TestCase,
};
use ragscope_storage::{FixtureVectorStore, RecordedQuery, RecordedResults, VectorStore};
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn hit(source: &str, distance: f64) -> SearchHit {
    SearchHit {
        text: format!("chunk from {source}"),
        source: source.to_string(),
        chunk_index: 0,
        distance,
    }
}

/// Store whose latency decreases with the query number, so later queries
/// finish first when run concurrently
struct SlowStore {
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl SlowStore {
    fn new() -> Self {
        Self {
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl VectorStore for SlowStore {
    async fn search(&self, query: &str, k: usize) -> Result<Vec<SearchHit>, Error> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let n: u64 = query.trim_start_matches('q').parse().unwrap_or(0);
        tokio::time::sleep(Duration::from_millis(50 - n * 10)).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(vec![hit(&format!("doc{n}"), 0.1)].into_iter().take(k).collect())
    }

    fn name(&self) -> &str {
        "slow"
    }
}

#[derive(Default)]
struct CountingObserver {
    completed: Mutex<Vec<usize>>,
}

impl EvaluationObserver for CountingObserver {
    fn on_query_complete(&self, index: usize, _total: usize, _result: &QueryResult) {
        self.completed.lock().unwrap().push(index);
    }
}

#[tokio::test]
async fn test_concurrent_batch_preserves_input_order() {
    let store = Arc::new(SlowStore::new());
    let observer = Arc::new(CountingObserver::default());
    let evaluation = EvaluationConfig {
        k_values: vec![1],
        max_concurrent_queries: 4,
        ..EvaluationConfig::default()
    };
    let evaluator = Evaluator::new(store.clone(), &evaluation, &RetrievalConfig::default())
        .with_observer(observer.clone());

    let cases: Vec<TestCase> = (0..4)
        .map(|n| TestCase::new(format!("q{n}"), vec![format!("doc{n}")]))
        .collect();
    let results = evaluator.evaluate_batch(&cases).await.unwrap();

    let queries: Vec<&str> = results
        .query_results
        .iter()
        .map(|qr| qr.query.as_str())
        .collect();
    assert_eq!(queries, vec!["q0", "q1", "q2", "q3"]);
    assert!(results.query_results.iter().all(|qr| qr.metrics.mrr == 1.0));
    assert!(store.max_in_flight.load(Ordering::SeqCst) > 1);

    // completion order differs from input order, output order does not
    let completed = observer.completed.lock().unwrap().clone();
    assert_eq!(completed.len(), 4);
    assert_ne!(completed, vec![0, 1, 2, 3]);
}

#[tokio::test]
async fn test_sequential_by_default() {
    let store = Arc::new(SlowStore::new());
    let evaluator = Evaluator::new(
        store.clone(),
        &EvaluationConfig::default(),
        &RetrievalConfig::default(),
    )
    .with_observer(Arc::new(NoopObserver));

    let cases: Vec<TestCase> = (0..3)
        .map(|n| TestCase::new(format!("q{n}"), vec![]))
        .collect();
    evaluator.evaluate_batch(&cases).await.unwrap();

    assert_eq!(store.max_in_flight.load(Ordering::SeqCst), 1);
}

fn recorded_store() -> Arc<dyn VectorStore> {
    let recorded = RecordedResults {
        collection: Some("arxiv".to_string()),
        results: vec![
            RecordedQuery {
                query: "transformer attention".to_string(),
                hits: vec![
                    hit("1706.03762.pdf", 0.10),
                    hit("1706.03762.pdf", 0.14),
                    hit("1810.04805.pdf", 0.31),
                    hit("2005.14165.pdf", 0.52),
                    hit("1512.03385.pdf", 0.74),
                ],
            },
            RecordedQuery {
                query: "residual networks".to_string(),
                hits: vec![
                    hit("1608.06993.pdf", 0.22),
                    hit("1512.03385.pdf", 0.25),
                    hit("1512.03385.pdf", 0.29),
                ],
            },
        ],
    };
    Arc::new(FixtureVectorStore::new(recorded))
}

fn write_dataset() -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(
        br#"{
            "test_queries": [
                {
                    "query": "transformer attention",
                    "relevant_docs": ["1706.03762.pdf", "1810.04805.pdf"],
                    "relevance_scores": {"1706.03762.pdf": 2.0, "1810.04805.pdf": 1.0}
                },
                {"query": "residual networks", "relevant_docs": ["1512.03385.pdf"]}
            ]
        }"#,
    )
    .unwrap();
    file
}

async fn evaluate(config: &Config) -> EvaluationResults {
    let dataset = write_dataset();
    let cases = load_test_cases(dataset.path()).unwrap();
    Evaluator::from_config(recorded_store(), config)
        .with_observer(Arc::new(NoopObserver))
        .evaluate_batch(&cases)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_dataset_to_report() {
    let mut config = Config::default();
    config.evaluation.k_values = vec![1, 3, 5];

    let results = evaluate(&config).await;

    assert_eq!(results.num_queries, 2);
    let residual = &results.query_results[1];
    assert!((residual.metrics.mrr - 0.5).abs() < 1e-9);
    assert!((residual.metrics.precision(5) - 0.4).abs() < 1e-9);
    for qr in &results.query_results {
        for k in [1, 3, 5] {
            for value in [qr.metrics.precision(k), qr.metrics.recall(k), qr.metrics.ndcg(k)] {
                assert!((0.0..=1.0).contains(&value));
            }
        }
    }

    let dir = tempfile::tempdir().unwrap();
    let reporter = Reporter::from_config(&config.output);
    reporter
        .save_json(&results, &dir.path().join("results.json"))
        .unwrap();
    reporter
        .save_markdown(&results, &dir.path().join("report.md"))
        .unwrap();

    let md = std::fs::read_to_string(dir.path().join("report.md")).unwrap();
    assert!(md.contains("### Query 2: \"residual networks\""));
    assert!(md.contains("2. 1512.03385.pdf ✓"));
}

#[tokio::test]
async fn test_deduplication_changes_recorded_rankings() {
    let mut config = Config::default();
    config.evaluation.k_values = vec![3];
    config.retrieval.deduplicate = true;

    let results = evaluate(&config).await;

    assert_eq!(
        results.query_results[0].retrieved_docs,
        vec!["1706.03762.pdf", "1810.04805.pdf", "2005.14165.pdf"]
    );
    assert!((results.query_results[0].metrics.recall(3) - 1.0).abs() < 1e-9);
    assert_eq!(
        results.query_results[1].retrieved_docs,
        vec!["1608.06993.pdf", "1512.03385.pdf"]
    );
}
