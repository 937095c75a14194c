//! Side-by-side evaluation of retrieval profiles
//!
//! The same dataset is evaluated four times: plain retrieval, source
//! deduplication, a similarity threshold, and both combined. Each profile is
//! compared to the baseline as a percent change per metric.

use crate::dataset::TestCase;
use crate::evaluator::{EvaluationResults, Evaluator};
use crate::observer::EvaluationObserver;
use crate::report::{metric_rows, write_file};
use chrono::{DateTime, Local};
use ragscope_core::{Config, Error, RetrievalConfig};
use ragscope_storage::VectorStore;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Similarity threshold used by the threshold and combined profiles
pub const DEFAULT_PROFILE_MIN_SIMILARITY: f64 = 0.3;

pub const COMPARISON_JSON_FILE: &str = "improvement_comparison.json";
pub const COMPARISON_MARKDOWN_FILE: &str = "improvement_comparison.md";

/// Retrieval variant evaluated in a comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationProfile {
    Baseline,
    Deduplication,
    Threshold,
    Combined,
}

impl EvaluationProfile {
    pub const ALL: [EvaluationProfile; 4] = [
        EvaluationProfile::Baseline,
        EvaluationProfile::Deduplication,
        EvaluationProfile::Threshold,
        EvaluationProfile::Combined,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            EvaluationProfile::Baseline => "baseline",
            EvaluationProfile::Deduplication => "deduplication",
            EvaluationProfile::Threshold => "threshold",
            EvaluationProfile::Combined => "combined",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            EvaluationProfile::Baseline => "Baseline",
            EvaluationProfile::Deduplication => "Deduplication",
            EvaluationProfile::Threshold => "Threshold",
            EvaluationProfile::Combined => "Combined",
        }
    }

    pub fn description(&self, min_similarity: f64) -> String {
        match self {
            EvaluationProfile::Baseline => "Plain retrieval (allows duplicate chunks)".to_string(),
            EvaluationProfile::Deduplication => {
                "Source-level deduplication (unique documents only)".to_string()
            }
            EvaluationProfile::Threshold => {
                format!("Minimum similarity threshold (min_similarity={min_similarity})")
            }
            EvaluationProfile::Combined => {
                format!("Deduplication + threshold (min_similarity={min_similarity})")
            }
        }
    }

    /// Retrieval settings for this profile
    ///
    /// Only `deduplicate` and `min_similarity` are overridden; the over-fetch
    /// factor and result cap come from `base`.
    pub fn retrieval_config(&self, base: &RetrievalConfig, min_similarity: f64) -> RetrievalConfig {
        let (deduplicate, min_similarity) = match self {
            EvaluationProfile::Baseline => (false, 0.0),
            EvaluationProfile::Deduplication => (true, 0.0),
            EvaluationProfile::Threshold => (false, min_similarity),
            EvaluationProfile::Combined => (true, min_similarity),
        };
        RetrievalConfig {
            deduplicate,
            min_similarity,
            ..base.clone()
        }
    }
}

/// Relative change in percent, 0 when the baseline is not positive
pub fn percent_change(baseline: f64, improved: f64) -> f64 {
    if baseline > 0.0 {
        (improved - baseline) / baseline * 100.0
    } else {
        0.0
    }
}

/// One metric of a profile next to the baseline
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricChange {
    pub label: String,
    pub baseline: f64,
    pub value: f64,
    pub change_pct: f64,
}

/// Results of every profile over the same dataset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub min_similarity: f64,
    pub baseline: EvaluationResults,
    pub deduplication: EvaluationResults,
    pub threshold: EvaluationResults,
    pub combined: EvaluationResults,
}

impl ComparisonReport {
    /// Evaluate `cases` under each profile
    pub async fn run(
        store: Arc<dyn VectorStore>,
        config: &Config,
        cases: &[TestCase],
        min_similarity: f64,
        observer: Arc<dyn EvaluationObserver>,
    ) -> Result<Self, Error> {
        let mut runs = Vec::with_capacity(EvaluationProfile::ALL.len());
        for profile in EvaluationProfile::ALL {
            info!("Running {} profile", profile.name());
            let retrieval = profile.retrieval_config(&config.retrieval, min_similarity);
            let evaluator = Evaluator::new(store.clone(), &config.evaluation, &retrieval)
                .with_observer(observer.clone());
            runs.push(evaluator.evaluate_batch(cases).await?);
        }

        let mut runs = runs.into_iter();
        match (runs.next(), runs.next(), runs.next(), runs.next()) {
            (Some(baseline), Some(deduplication), Some(threshold), Some(combined)) => Ok(Self {
                min_similarity,
                baseline,
                deduplication,
                threshold,
                combined,
            }),
            _ => Err(Error::invalid_input("Comparison requires all four profiles")),
        }
    }

    pub fn get(&self, profile: EvaluationProfile) -> &EvaluationResults {
        match profile {
            EvaluationProfile::Baseline => &self.baseline,
            EvaluationProfile::Deduplication => &self.deduplication,
            EvaluationProfile::Threshold => &self.threshold,
            EvaluationProfile::Combined => &self.combined,
        }
    }

    /// Every metric of `profile` with its change against the baseline
    pub fn changes(&self, profile: EvaluationProfile) -> Vec<MetricChange> {
        let baseline = metric_rows(&self.baseline.aggregate_metrics);
        metric_rows(&self.get(profile).aggregate_metrics)
            .into_iter()
            .map(|row| {
                let base = baseline
                    .iter()
                    .find(|b| b.label == row.label)
                    .map(|b| b.value)
                    .unwrap_or(0.0);
                MetricChange {
                    change_pct: percent_change(base, row.value),
                    label: row.label,
                    baseline: base,
                    value: row.value,
                }
            })
            .collect()
    }

    /// Cutoff highlighted in findings: 5 when evaluated, else the largest
    fn headline_k(&self) -> Option<usize> {
        let ks = &self.baseline.k_values;
        if ks.contains(&5) {
            Some(5)
        } else {
            ks.iter().copied().max()
        }
    }

    /// Console rendering: one analysis block per non-baseline profile
    pub fn summary(&self) -> String {
        let rule = "=".repeat(60);
        let mut lines = Vec::new();

        for profile in &EvaluationProfile::ALL[1..] {
            lines.push(String::new());
            lines.push(rule.clone());
            lines.push(format!(
                "IMPROVEMENT ANALYSIS: {}",
                profile.description(self.min_similarity)
            ));
            lines.push(rule.clone());
            for change in self.changes(*profile) {
                lines.push(format!(
                    "  {:<8} baseline {:.4}  improved {:.4}  change {:+.2}%",
                    change.label, change.baseline, change.value, change.change_pct
                ));
            }
        }
        lines.join("\n")
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn markdown(&self) -> String {
        self.markdown_at(Local::now())
    }

    pub fn markdown_at(&self, generated: DateTime<Local>) -> String {
        let mut lines = vec![
            "# Retrieval Improvement Comparison\n".to_string(),
            format!("**Date:** {}\n", generated.format("%Y-%m-%d %H:%M:%S")),
            "## Summary\n".to_string(),
            "This report compares retrieval quality across profiles:\n".to_string(),
        ];
        for (i, profile) in EvaluationProfile::ALL.iter().enumerate() {
            lines.push(format!(
                "{}. **{}**: {}",
                i + 1,
                profile.title(),
                profile.description(self.min_similarity)
            ));
        }

        lines.push("\n## Aggregate Metrics Comparison\n".to_string());
        lines.push("| Metric | Baseline | Deduplication | Threshold | Combined |".to_string());
        lines.push("|--------|----------|---------------|-----------|----------|".to_string());

        let columns: Vec<Vec<MetricChange>> = EvaluationProfile::ALL
            .iter()
            .map(|p| self.changes(*p))
            .collect();
        for (row, baseline) in columns[0].iter().enumerate() {
            let cells: Vec<String> = columns
                .iter()
                .map(|col| {
                    col.get(row)
                        .map(|c| format!("{:.4}", c.value))
                        .unwrap_or_else(|| "-".to_string())
                })
                .collect();
            lines.push(format!("| **{}** | {} |", baseline.label, cells.join(" | ")));
        }

        if let Some(k) = self.headline_k() {
            let label = format!("P@{k}");
            lines.push("\n## Key Findings\n".to_string());
            for profile in &EvaluationProfile::ALL[1..] {
                if let Some(change) = self.changes(*profile).into_iter().find(|c| c.label == label)
                {
                    lines.push(format!("### {}\n", profile.title()));
                    lines.push(format!(
                        "- {label}: {:.4} → {:.4} ({:+.1}%)\n",
                        change.baseline, change.value, change.change_pct
                    ));
                }
            }
        }

        lines.join("\n")
    }

    /// Write the JSON and Markdown comparison files into `directory`
    pub fn save(&self, directory: &Path) -> Result<(PathBuf, PathBuf), Error> {
        let json_path = directory.join(COMPARISON_JSON_FILE);
        let md_path = directory.join(COMPARISON_MARKDOWN_FILE);

        write_file(&json_path, &self.to_json()?)?;
        info!("Saved comparison data to {}", json_path.display());
        write_file(&md_path, &self.markdown())?;
        info!("Saved comparison report to {}", md_path.display());

        Ok((json_path, md_path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::NoopObserver;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use ragscope_core::SearchHit;
    use ragscope_storage::MockVectorStore;

    fn hit(source: &str, distance: f64) -> SearchHit {
        SearchHit {
            text: String::new(),
            source: source.to_string(),
            chunk_index: 0,
            distance,
        }
    }

    async fn report() -> ComparisonReport {
        // similarities: 0.9, 0.85, 0.6, 0.2, 0.1
        let store = MockVectorStore::builder()
            .with_default_hits(vec![
                hit("a", 0.1),
                hit("a", 0.15),
                hit("b", 0.4),
                hit("x", 0.8),
                hit("y", 0.9),
            ])
            .build();
        let mut config = Config::default();
        config.evaluation.k_values = vec![1, 3, 5];
        let cases = vec![TestCase::new("q", vec!["a".to_string(), "b".to_string()])];

        ComparisonReport::run(
            Arc::new(store),
            &config,
            &cases,
            DEFAULT_PROFILE_MIN_SIMILARITY,
            Arc::new(NoopObserver),
        )
        .await
        .unwrap()
    }

    #[test]
    fn test_percent_change() {
        assert!((percent_change(0.5, 0.75) - 50.0).abs() < 1e-9);
        assert!((percent_change(0.4, 0.2) + 50.0).abs() < 1e-9);
        assert_eq!(percent_change(0.0, 0.8), 0.0);
    }

    #[test]
    fn test_profile_retrieval_config() {
        let base = RetrievalConfig {
            dedup_overfetch_factor: 4,
            ..RetrievalConfig::default()
        };
        let combined = EvaluationProfile::Combined.retrieval_config(&base, 0.3);
        assert!(combined.deduplicate);
        assert_eq!(combined.min_similarity, 0.3);
        assert_eq!(combined.dedup_overfetch_factor, 4);

        let baseline = EvaluationProfile::Baseline.retrieval_config(&combined, 0.3);
        assert!(!baseline.deduplicate);
        assert_eq!(baseline.min_similarity, 0.0);
    }

    #[tokio::test]
    async fn test_profiles_differ_as_expected() {
        let report = report().await;

        assert_eq!(
            report.baseline.query_results[0].retrieved_docs,
            vec!["a", "a", "b", "x", "y"]
        );
        assert_eq!(
            report.deduplication.query_results[0].retrieved_docs,
            vec!["a", "b", "x", "y"]
        );
        assert_eq!(
            report.threshold.query_results[0].retrieved_docs,
            vec!["a", "a", "b"]
        );
        assert_eq!(
            report.combined.query_results[0].retrieved_docs,
            vec!["a", "b"]
        );
    }

    #[tokio::test]
    async fn test_changes_against_baseline() {
        let report = report().await;

        let baseline_changes = report.changes(EvaluationProfile::Baseline);
        assert!(baseline_changes.iter().all(|c| c.change_pct == 0.0));

        // baseline P@3 = 3/3 counting the repeated chunk, dedup P@3 = 2/3
        let dedup = report.changes(EvaluationProfile::Deduplication);
        let p3 = dedup.iter().find(|c| c.label == "P@3").unwrap();
        assert!((p3.change_pct + 100.0 / 3.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_markdown_and_save() {
        let report = report().await;
        let generated = Local.with_ymd_and_hms(2026, 5, 2, 12, 0, 0).unwrap();
        let md = report.markdown_at(generated);

        assert!(md.contains("| Metric | Baseline | Deduplication | Threshold | Combined |"));
        assert!(md.contains("| **MRR** | 1.0000 | 1.0000 | 1.0000 | 1.0000 |"));
        assert!(md.contains("- P@5:"));

        let dir = tempfile::tempdir().unwrap();
        let (json_path, md_path) = report.save(&dir.path().join("out")).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(json_path).unwrap()).unwrap();
        assert_eq!(value["combined"]["num_queries"], 1);
        assert!(md_path.exists());
    }
}
