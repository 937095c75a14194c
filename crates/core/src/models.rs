//! Shared retrieval models
//!
//! `SearchHit` is the raw record a vector store returns. `RetrievedItem` adds
//! the derived similarity score, and `RankedResultList` keeps the store's order,
//! which is the ranking signal for every downstream metric.

use serde::{Deserialize, Serialize};

/// Source recorded for hits whose metadata carries none
pub const UNKNOWN_SOURCE: &str = "unknown";

fn default_source() -> String {
    UNKNOWN_SOURCE.to_string()
}

/// A single hit as returned by a vector store query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Chunk text
    pub text: String,
    /// Identifier of the document the chunk came from
    #[serde(default = "default_source")]
    pub source: String,
    /// Position of the chunk inside its source document
    #[serde(default)]
    pub chunk_index: usize,
    /// Dissimilarity between query and chunk embeddings
    pub distance: f64,
}

/// A retrieved chunk with its similarity score
///
/// `similarity` is always `1 - distance` and is not clamped, so stores using
/// distances above `1.0` yield negative similarities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedItem {
    pub text: String,
    pub source: String,
    pub chunk_index: usize,
    pub distance: f64,
    pub similarity: f64,
}

impl From<SearchHit> for RetrievedItem {
    fn from(hit: SearchHit) -> Self {
        Self {
            similarity: 1.0 - hit.distance,
            text: hit.text,
            source: hit.source,
            chunk_index: hit.chunk_index,
            distance: hit.distance,
        }
    }
}

/// Ordered retrieval results, ascending distance as returned by the store
///
/// The list is never re-sorted once built. Filtering stages consume a list and
/// collect a new one, preserving relative order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RankedResultList {
    items: Vec<RetrievedItem>,
}

impl RankedResultList {
    pub fn new(items: Vec<RetrievedItem>) -> Self {
        Self { items }
    }

    /// Build a ranked list from raw store hits, keeping store order
    pub fn from_hits(hits: Vec<SearchHit>) -> Self {
        hits.into_iter().map(RetrievedItem::from).collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RetrievedItem> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[RetrievedItem] {
        &self.items
    }

    /// Source identifiers in rank order (duplicates preserved)
    pub fn sources(&self) -> Vec<String> {
        self.items.iter().map(|item| item.source.clone()).collect()
    }

    /// Keep at most `n` leading items
    pub fn truncated(self, n: usize) -> Self {
        self.items.into_iter().take(n).collect()
    }
}

impl FromIterator<RetrievedItem> for RankedResultList {
    fn from_iter<I: IntoIterator<Item = RetrievedItem>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for RankedResultList {
    type Item = RetrievedItem;
    type IntoIter = std::vec::IntoIter<RetrievedItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a RankedResultList {
    type Item = &'a RetrievedItem;
    type IntoIter = std::slice::Iter<'a, RetrievedItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(source: &str, distance: f64) -> SearchHit {
        SearchHit {
            text: format!("chunk from {source}"),
            source: source.to_string(),
            chunk_index: 0,
            distance,
        }
    }

    #[test]
    fn test_similarity_is_one_minus_distance() {
        let item = RetrievedItem::from(hit("a.pdf", 0.25));
        assert!((item.similarity - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_similarity_is_not_clamped() {
        let item = RetrievedItem::from(hit("a.pdf", 1.6));
        assert!(item.similarity < 0.0);
        assert!((item.similarity + 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_from_hits_preserves_order() {
        let list = RankedResultList::from_hits(vec![
            hit("b.pdf", 0.1),
            hit("a.pdf", 0.2),
            hit("b.pdf", 0.3),
        ]);
        assert_eq!(list.sources(), vec!["b.pdf", "a.pdf", "b.pdf"]);
    }

    #[test]
    fn test_missing_source_defaults_to_unknown() {
        let hit: SearchHit =
            serde_json::from_str(r#"{"text": "orphan chunk", "distance": 0.4}"#).unwrap();
        assert_eq!(hit.source, UNKNOWN_SOURCE);
        assert_eq!(hit.chunk_index, 0);
    }

    #[test]
    fn test_truncated_shorter_list_is_unchanged() {
        let list = RankedResultList::from_hits(vec![hit("a.pdf", 0.1)]);
        assert_eq!(list.clone().truncated(5), list);
        assert!(list.truncated(0).is_empty());
    }
}
