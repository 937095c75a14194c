//! Test-query dataset loading

use ragscope_core::{Error, ResultExt};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

/// One evaluation query with its ground truth
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    pub query: String,
    /// Sources judged relevant for the query
    pub relevant_docs: Vec<String>,
    /// Graded relevance per source, higher is more relevant
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relevance_scores: Option<HashMap<String, f64>>,
}

impl TestCase {
    pub fn new(query: impl Into<String>, relevant_docs: Vec<String>) -> Self {
        Self {
            query: query.into(),
            relevant_docs,
            relevance_scores: None,
        }
    }
}

/// Accepted file layouts: a bare array or `{"test_queries": [...]}`
#[derive(Deserialize)]
#[serde(untagged)]
enum DatasetFile {
    Bare(Vec<TestCase>),
    Wrapped { test_queries: Vec<TestCase> },
}

/// Parse test cases from JSON text
pub fn parse_test_cases(json: &str) -> Result<Vec<TestCase>, Error> {
    let file: DatasetFile = serde_json::from_str(json).map_err(|e| {
        Error::dataset(format!(
            "Expected an array of test queries or an object with a 'test_queries' array: {e}"
        ))
    })?;

    let cases = match file {
        DatasetFile::Bare(cases) => cases,
        DatasetFile::Wrapped { test_queries } => test_queries,
    };

    for (index, case) in cases.iter().enumerate() {
        if case.query.trim().is_empty() {
            return Err(Error::dataset(format!(
                "Test query {} has an empty query string",
                index + 1
            )));
        }
    }

    Ok(cases)
}

/// Load test cases from a JSON file
pub fn load_test_cases(path: &Path) -> Result<Vec<TestCase>, Error> {
    let content = std::fs::read_to_string(path)
        .context(format!("Failed to read test queries from {}", path.display()))?;
    let cases = parse_test_cases(&content)
        .context(format!("Invalid test query file {}", path.display()))?;
    info!("Loaded {} test queries from {}", cases.len(), path.display());
    Ok(cases)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_parse_bare_array() {
        let json = r#"[
            {"query": "graph neural networks", "relevant_docs": ["a.pdf", "b.pdf"]},
            {"query": "diffusion models", "relevant_docs": []}
        ]"#;
        let cases = parse_test_cases(json).unwrap();

        assert_eq!(cases.len(), 2);
        assert_eq!(cases[0].relevant_docs, vec!["a.pdf", "b.pdf"]);
        assert!(cases[1].relevant_docs.is_empty());
        assert!(cases[0].relevance_scores.is_none());
    }

    #[test]
    fn test_parse_wrapped_with_scores_and_extra_fields() {
        let json = r#"{
            "description": "curated queries",
            "test_queries": [
                {
                    "id": "q1",
                    "query": "contrastive learning",
                    "relevant_docs": ["c.pdf"],
                    "relevance_scores": {"c.pdf": 2.0, "d.pdf": 1.0}
                }
            ]
        }"#;
        let cases = parse_test_cases(json).unwrap();

        assert_eq!(cases.len(), 1);
        let scores = cases[0].relevance_scores.as_ref().unwrap();
        assert_eq!(scores.get("d.pdf"), Some(&1.0));
    }

    #[test]
    fn test_parse_rejects_empty_query() {
        let json = r#"[{"query": "  ", "relevant_docs": ["a.pdf"]}]"#;
        let err = parse_test_cases(json).unwrap_err();
        assert!(err.to_string().contains("Test query 1"));
    }

    #[test]
    fn test_parse_rejects_wrong_shape() {
        assert!(parse_test_cases(r#"{"queries": []}"#).is_err());
        assert!(parse_test_cases(r#"[{"query": "missing docs"}]"#).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"test_queries": [{{"query": "q", "relevant_docs": ["x"]}}]}}"#
        )
        .unwrap();

        let cases = load_test_cases(file.path()).unwrap();
        assert_eq!(cases, vec![TestCase::new("q", vec!["x".to_string()])]);
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_test_cases(Path::new("/nonexistent/queries.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read test queries"));
    }
}
