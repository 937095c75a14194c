//! Evaluation report generation

use crate::eval_metrics::{AggregateMetrics, PerQueryMetrics};
use crate::evaluator::{EvaluationResults, QueryResult};
use chrono::{DateTime, Local};
use ragscope_core::{Error, OutputConfig, ResultExt};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Persisted form of an evaluation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationRecord {
    pub num_queries: usize,
    pub num_failed: usize,
    pub k_values: Vec<usize>,
    pub aggregate_metrics: AggregateMetrics,
    pub query_results: Vec<QueryResult>,
    pub timestamp: DateTime<Local>,
}

impl EvaluationRecord {
    pub fn new(results: &EvaluationResults, timestamp: DateTime<Local>) -> Self {
        Self {
            num_queries: results.num_queries,
            num_failed: results.num_failed,
            k_values: results.k_values.clone(),
            aggregate_metrics: results.aggregate_metrics.clone(),
            query_results: results.query_results.clone(),
            timestamp,
        }
    }
}

/// One labelled value of a metric table, e.g. `P@5`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricRow {
    pub label: String,
    pub value: f64,
}

/// Flatten metrics into rows: MRR, then P@K, R@K and NDCG@K for each K
pub fn metric_rows(metrics: &PerQueryMetrics) -> Vec<MetricRow> {
    let mut rows = vec![MetricRow {
        label: "MRR".to_string(),
        value: metrics.mrr,
    }];
    let families = [
        ("P", &metrics.precision_at_k),
        ("R", &metrics.recall_at_k),
        ("NDCG", &metrics.ndcg_at_k),
    ];
    for (prefix, values) in families {
        rows.extend(values.iter().map(|(k, value)| MetricRow {
            label: format!("{prefix}@{k}"),
            value: *value,
        }));
    }
    rows
}

/// Renders evaluation results for the console and for files
#[derive(Debug, Clone)]
pub struct Reporter {
    top_sources_shown: usize,
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new(5)
    }
}

impl Reporter {
    /// Create a reporter listing `top_sources_shown` retrieved sources per query
    pub fn new(top_sources_shown: usize) -> Self {
        Self { top_sources_shown }
    }

    pub fn from_config(config: &OutputConfig) -> Self {
        Self::new(config.top_sources_shown)
    }

    /// Print a summary of the results to stdout
    pub fn print_summary(&self, results: &EvaluationResults) {
        println!("{}", self.summary(results));
    }

    /// Console summary: aggregate block, then one block per query
    pub fn summary(&self, results: &EvaluationResults) -> String {
        let rule = "=".repeat(80);
        let mut lines = vec![
            String::new(),
            rule.clone(),
            "EVALUATION RESULTS".to_string(),
            rule.clone(),
            format!("Number of queries: {}", results.num_queries),
            format!("K values: {:?}", results.k_values),
        ];
        if results.num_failed > 0 {
            lines.push(format!("Failed queries: {}", results.num_failed));
        }

        lines.push(String::new());
        lines.push("AGGREGATE METRICS".to_string());
        lines.push("-".repeat(80));
        lines.extend(k_lines(&results.aggregate_metrics, ""));
        lines.push(format!("MRR: {:.4}", results.aggregate_metrics.mrr));

        lines.push(String::new());
        lines.push("INDIVIDUAL QUERY RESULTS".to_string());
        lines.push("-".repeat(80));
        for (i, qr) in results.query_results.iter().enumerate() {
            lines.push(String::new());
            lines.push(format!("[{}] Query: '{}'", i + 1, qr.query));
            if let Some(error) = &qr.error {
                lines.push(format!("    FAILED: {error}"));
            }
            lines.push(format!("    Relevant docs: {}", qr.relevant_docs.len()));
            lines.push(format!(
                "    Retrieved: {:?}",
                qr.retrieved_docs
                    .iter()
                    .take(self.top_sources_shown)
                    .collect::<Vec<_>>()
            ));
            lines.push("    Metrics:".to_string());
            lines.extend(k_lines(&qr.metrics, "      "));
            lines.push(format!("      MRR: {:.3}", qr.metrics.mrr));
        }

        lines.push(String::new());
        lines.push(rule);
        lines.join("\n")
    }

    /// Serialize the results with the current time
    pub fn to_json(&self, results: &EvaluationResults) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&EvaluationRecord::new(results, Local::now()))
    }

    /// Write the JSON record, creating parent directories
    pub fn save_json(&self, results: &EvaluationResults, path: &Path) -> Result<(), Error> {
        let json = self.to_json(results)?;
        write_file(path, &json)?;
        info!("Evaluation results saved to {}", path.display());
        Ok(())
    }

    /// Markdown report stamped with the current time
    pub fn markdown(&self, results: &EvaluationResults) -> String {
        self.markdown_at(results, Local::now())
    }

    /// Markdown report stamped with `generated`
    pub fn markdown_at(&self, results: &EvaluationResults, generated: DateTime<Local>) -> String {
        let agg = &results.aggregate_metrics;
        let mut lines = vec![
            "# Retrieval Evaluation Report".to_string(),
            format!("\n**Generated:** {}", generated.format("%Y-%m-%d %H:%M:%S")),
            format!("\n**Number of Queries:** {}", results.num_queries),
            format!("\n**K Values:** {:?}", results.k_values),
        ];
        if results.num_failed > 0 {
            lines.push(format!("\n**Failed Queries:** {}", results.num_failed));
        }
        lines.push("\n---\n".to_string());

        lines.push("## Aggregate Metrics\n".to_string());
        lines.push("### Mean Reciprocal Rank (MRR)".to_string());
        lines.push(format!("\n**MRR:** {:.4}\n", agg.mrr));

        let families = [
            ("Precision@K", &agg.precision_at_k),
            ("Recall@K", &agg.recall_at_k),
            ("NDCG@K", &agg.ndcg_at_k),
        ];
        for (i, (title, values)) in families.into_iter().enumerate() {
            let heading = if i == 0 {
                format!("### {title}\n")
            } else {
                format!("\n### {title}\n")
            };
            lines.push(heading);
            lines.push(format!("| K | {title} |"));
            lines.push(format!("|---|{}|", "-".repeat(title.len() + 2)));
            for (k, value) in values {
                lines.push(format!("| {k} | {value:.4} |"));
            }
        }

        lines.push("\n---\n".to_string());
        lines.push("## Individual Query Results\n".to_string());

        for (i, qr) in results.query_results.iter().enumerate() {
            lines.push(format!("\n### Query {}: \"{}\"\n", i + 1, qr.query));
            if let Some(error) = &qr.error {
                lines.push(format!("- **Error:** {error}"));
            }
            lines.push(format!("- **Relevant Documents:** {}", qr.relevant_docs.len()));
            lines.push(format!("- **MRR:** {:.4}\n", qr.metrics.mrr));

            lines.push("**Top Retrieved Documents:**".to_string());
            for (j, doc) in qr
                .retrieved_docs
                .iter()
                .take(self.top_sources_shown)
                .enumerate()
            {
                let mark = if qr.is_relevant(doc) { "✓" } else { "✗" };
                lines.push(format!("{}. {doc} {mark}", j + 1));
            }

            lines.push("\n**Metrics:**\n".to_string());
            lines.push("| K | Precision | Recall | NDCG |".to_string());
            lines.push("|---|-----------|--------|------|".to_string());
            for k in qr.metrics.k_values() {
                lines.push(format!(
                    "| {k} | {:.4} | {:.4} | {:.4} |",
                    qr.metrics.precision(k),
                    qr.metrics.recall(k),
                    qr.metrics.ndcg(k)
                ));
            }
        }

        lines.join("\n")
    }

    /// Write the Markdown report, creating parent directories
    pub fn save_markdown(&self, results: &EvaluationResults, path: &Path) -> Result<(), Error> {
        write_file(path, &self.markdown(results))?;
        info!("Markdown report saved to {}", path.display());
        Ok(())
    }
}

fn k_lines(metrics: &PerQueryMetrics, indent: &str) -> Vec<String> {
    metrics
        .k_values()
        .into_iter()
        .map(|k| {
            format!(
                "{indent}@{k}: P={:.3}, R={:.3}, NDCG={:.3}",
                metrics.precision(k),
                metrics.recall(k),
                metrics.ndcg(k)
            )
        })
        .collect()
}

pub(crate) fn write_file(path: &Path, content: &str) -> Result<(), Error> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .context(format!("Failed to create directory {}", parent.display()))?;
    }
    std::fs::write(path, content).context(format!("Failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval_metrics::compute_metrics;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;

    fn results() -> EvaluationResults {
        let retrieved: Vec<String> = ["a.pdf", "x.pdf", "b.pdf"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let relevant: HashSet<String> = ["a.pdf", "b.pdf"].iter().map(|s| s.to_string()).collect();
        let metrics = compute_metrics(&retrieved, &relevant, None, &[1, 3], 3);

        let ok = QueryResult {
            query: "attention".to_string(),
            retrieved_docs: retrieved,
            relevant_docs: vec!["a.pdf".to_string(), "b.pdf".to_string()],
            metrics,
            error: None,
        };
        let failed = QueryResult::failed(
            "broken",
            &["c.pdf".to_string()],
            &[1, 3],
            &Error::storage("unavailable"),
        );
        EvaluationResults::from_query_results(vec![ok, failed], &[1, 3])
    }

    #[test]
    fn test_metric_rows_order() {
        let rows = metric_rows(&results().aggregate_metrics);
        let labels: Vec<&str> = rows.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["MRR", "P@1", "P@3", "R@1", "R@3", "NDCG@1", "NDCG@3"]);
    }

    #[test]
    fn test_json_shape() {
        let json = Reporter::default().to_json(&results()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["num_queries"], 2);
        assert_eq!(value["num_failed"], 1);
        assert_eq!(value["k_values"], serde_json::json!([1, 3]));
        assert!(value["timestamp"].is_string());
        assert!(value["aggregate_metrics"]["precision_at_k"]["3"].is_number());

        let first = &value["query_results"][0];
        assert_eq!(first["retrieved_docs"][0], "a.pdf");
        assert!(first.get("error").is_none());
        assert_eq!(value["query_results"][1]["error"], "Storage error: unavailable");
    }

    #[test]
    fn test_save_json_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out/results.json");

        Reporter::default().save_json(&results(), &path).unwrap();

        let record: EvaluationRecord =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(record.query_results.len(), 2);
        assert_eq!(record.aggregate_metrics, results().aggregate_metrics);
    }

    #[test]
    fn test_markdown_tables_and_marks() {
        let generated = Local.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap();
        let md = Reporter::new(2).markdown_at(&results(), generated);

        assert!(md.starts_with("# Retrieval Evaluation Report"));
        assert!(md.contains("**Generated:** 2026-03-01 09:30:00"));
        assert!(md.contains("**Failed Queries:** 1"));
        assert!(md.contains("| K | Precision@K |"));
        assert!(md.contains("| K | NDCG@K |"));
        assert!(md.contains("1. a.pdf ✓"));
        assert!(md.contains("2. x.pdf ✗"));
        // only the top two sources are listed
        assert!(!md.contains("3. b.pdf"));
        assert!(md.contains("- **Error:** Storage error: unavailable"));
        assert!(md.contains("| 3 | 0.6667 | 1.0000 |"));
    }

    #[test]
    fn test_summary_lists_queries() {
        let summary = Reporter::default().summary(&results());
        assert!(summary.contains("Number of queries: 2"));
        assert!(summary.contains("[1] Query: 'attention'"));
        assert!(summary.contains("@1: P=1.000, R=0.500"));
        assert!(summary.contains("FAILED: Storage error: unavailable"));
    }
}
