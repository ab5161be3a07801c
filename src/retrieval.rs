//! Passage retrieval over a pre-built embedding snapshot.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use agent_core::{Passage, PassageRetriever};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use supplychain_core_types::CollaboratorError;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("failed to read index {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse index: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("chunk {index} has dimension {found}, expected {expected}")]
    Dimension {
        index: usize,
        found: usize,
        expected: usize,
    },
}

/// Turns query text into a vector comparable with the indexed chunks.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, CollaboratorError>;
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IndexedChunk {
    pub content: String,
    #[serde(default)]
    pub source: String,
    pub embedding: Vec<f32>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct VectorIndex {
    pub chunks: Vec<IndexedChunk>,
}

impl VectorIndex {
    /// Accepts either `{"chunks": [...]}` or a bare chunk array.
    pub fn from_json(raw: &str) -> Result<Self, IndexError> {
        let index = match serde_json::from_str::<VectorIndex>(raw) {
            Ok(index) => index,
            Err(_) => VectorIndex {
                chunks: serde_json::from_str(raw)?,
            },
        };
        index.check_dimensions()?;
        Ok(index)
    }

    pub fn load(path: &Path) -> Result<Self, IndexError> {
        let raw = fs::read_to_string(path).map_err(|source| IndexError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let index = Self::from_json(&raw)?;
        info!(path = %path.display(), chunks = index.chunks.len(), "loaded vector index");
        Ok(index)
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    fn check_dimensions(&self) -> Result<(), IndexError> {
        let Some(expected) = self.chunks.first().map(|chunk| chunk.embedding.len()) else {
            return Ok(());
        };
        for (index, chunk) in self.chunks.iter().enumerate() {
            if chunk.embedding.len() != expected {
                return Err(IndexError::Dimension {
                    index,
                    found: chunk.embedding.len(),
                    expected,
                });
            }
        }
        Ok(())
    }

    /// Most similar chunks first; ties keep index order.
    pub fn search(&self, query: &[f32], top_k: usize) -> Vec<(f32, &IndexedChunk)> {
        let mut scored: Vec<(f32, &IndexedChunk)> = self
            .chunks
            .iter()
            .map(|chunk| (cosine(query, &chunk.embedding), chunk))
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));
        scored.truncate(top_k);
        scored
    }
}

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let (mut dot, mut norm_a, mut norm_b) = (0.0f32, 0.0f32, 0.0f32);
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

pub const DEFAULT_TOP_K: usize = 4;

pub struct VectorRetriever {
    index: Arc<VectorIndex>,
    embedder: Arc<dyn Embedder>,
    top_k: usize,
}

impl VectorRetriever {
    pub fn new(index: Arc<VectorIndex>, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            index,
            embedder,
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }
}

#[async_trait]
impl PassageRetriever for VectorRetriever {
    async fn similarity_search(&self, query: &str) -> Result<Vec<Passage>, CollaboratorError> {
        if self.index.is_empty() {
            return Err(CollaboratorError::retrieval("vector index is empty"));
        }
        let vector = self.embedder.embed(query).await?;
        let hits = self.index.search(&vector, self.top_k);
        debug!(
            hits = hits.len(),
            best = ?hits.first().map(|(score, _)| *score),
            "similarity search"
        );
        Ok(hits
            .into_iter()
            .map(|(_, chunk)| Passage::new(chunk.content.clone(), chunk.source.clone()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedEmbedder(Vec<f32>);

    #[async_trait]
    impl Embedder for FixedEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>, CollaboratorError> {
            Ok(self.0.clone())
        }
    }

    fn chunk(content: &str, embedding: Vec<f32>) -> IndexedChunk {
        IndexedChunk {
            content: content.into(),
            source: "policy.pdf".into(),
            embedding,
        }
    }

    #[tokio::test]
    async fn ranks_by_cosine_similarity() {
        let index = Arc::new(VectorIndex {
            chunks: vec![
                chunk("orthogonal", vec![0.0, 1.0]),
                chunk("aligned", vec![2.0, 0.0]),
                chunk("diagonal", vec![1.0, 1.0]),
            ],
        });
        let retriever =
            VectorRetriever::new(index, Arc::new(FixedEmbedder(vec![1.0, 0.0]))).with_top_k(2);
        let passages = retriever.similarity_search("anything").await.unwrap();
        let contents: Vec<_> = passages.iter().map(|p| p.content.as_str()).collect();
        assert_eq!(contents, vec!["aligned", "diagonal"]);
    }

    #[test]
    fn parses_both_snapshot_shapes() {
        let wrapped = r#"{"chunks":[{"content":"a","source":"x.pdf","embedding":[1.0,0.0]}]}"#;
        let bare = r#"[{"content":"a","embedding":[1.0,0.0]}]"#;
        assert_eq!(VectorIndex::from_json(wrapped).unwrap().len(), 1);
        assert_eq!(VectorIndex::from_json(bare).unwrap().chunks[0].source, "");
    }

    #[test]
    fn rejects_mixed_dimensions() {
        let raw = r#"[{"content":"a","embedding":[1.0]},{"content":"b","embedding":[1.0,2.0]}]"#;
        assert!(matches!(
            VectorIndex::from_json(raw),
            Err(IndexError::Dimension { index: 1, .. })
        ));
    }

    #[tokio::test]
    async fn empty_index_is_a_retrieval_failure() {
        let retriever = VectorRetriever::new(
            Arc::new(VectorIndex::default()),
            Arc::new(FixedEmbedder(vec![1.0])),
        );
        let err = retriever.similarity_search("q").await.unwrap_err();
        assert_eq!(err, CollaboratorError::retrieval("vector index is empty"));
    }
}
