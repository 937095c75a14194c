//! Retrieval pipeline assembled from configuration

use crate::retriever::{Deduplicate, Retrieve, SimilarityThreshold, StoreRetriever};
use async_trait::async_trait;
use ragscope_core::{Error, RankedResultList, RetrievalConfig};
use ragscope_storage::VectorStore;
use std::fmt;
use std::sync::Arc;
use tracing::info;

/// Store retrieval followed by the stages enabled in [`RetrievalConfig`]
///
/// Stage order is fixed: deduplication, then the similarity threshold and
/// result cap. Stages that are disabled are left out of the chain.
pub struct RetrievalPipeline {
    head: Arc<dyn Retrieve>,
    stages: Vec<String>,
}

impl RetrievalPipeline {
    /// Plain store retrieval with no stages
    pub fn plain(store: Arc<dyn VectorStore>) -> Self {
        let name = store.name().to_string();
        Self {
            head: Arc::new(StoreRetriever::new(store)),
            stages: vec![format!("store({name})")],
        }
    }

    pub fn from_config(store: Arc<dyn VectorStore>, config: &RetrievalConfig) -> Self {
        let mut pipeline = Self::plain(store);

        if config.deduplicate {
            pipeline.head = Arc::new(Deduplicate::with_overfetch_factor(
                pipeline.head,
                config.dedup_overfetch_factor,
            ));
            pipeline
                .stages
                .push(format!("dedup(x{})", config.dedup_overfetch_factor.max(1)));
        }

        let thresholding = config.min_similarity > 0.0;
        let max_results = config.max_results.filter(|&max| max > 0);
        if thresholding || max_results.is_some() {
            pipeline.head = Arc::new(SimilarityThreshold::new(
                pipeline.head,
                config.min_similarity,
                max_results,
            ));
            if thresholding {
                pipeline
                    .stages
                    .push(format!("threshold({:.2})", config.min_similarity));
            }
            if let Some(max) = max_results {
                pipeline.stages.push(format!("limit({max})"));
            }
        }

        info!("Retrieval pipeline: {pipeline}");
        pipeline
    }

    /// Stage labels in execution order, starting with the store
    pub fn stages(&self) -> &[String] {
        &self.stages
    }
}

impl fmt::Display for RetrievalPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.stages.join(" -> "))
    }
}

#[async_trait]
impl Retrieve for RetrievalPipeline {
    async fn retrieve(&self, query: &str, k: usize) -> Result<RankedResultList, Error> {
        self.head.retrieve(query, k).await
    }
}
