

pub mod collection;
pub mod similarity;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::llm::embeddings::EmbeddingError;

pub use collection::LocalCollection;
pub use similarity::{cosine_distance, cosine_similarity};


#[derive(Error, Debug)]
pub enum IndexError {
    #[error("Index unavailable: {0}")]
    Unavailable(String),

    #[error("Embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Collection '{collection}' uses metric '{found}', expected '{expected}'")]
    MetricMismatch {
        collection: String,
        expected: String,
        found: String,
    },
}


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredOwner {
    pub owner_key: String,
    pub distance: f32,
}

impl ScoredOwner {
    pub fn new(owner_key: impl Into<String>, distance: f32) -> Self {
        Self {
            owner_key: owner_key.into(),
            distance,
        }
    }
}


/// Sentence store keyed by owner. Query results are ordered by ascending
/// cosine distance with ties kept in insertion order.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Appends one entry per text; existing entries are never overwritten.
    async fn upsert(&self, texts: &[String], owner_key: &str) -> Result<usize, IndexError>;

    async fn delete_by_owner(&self, owner_key: &str) -> Result<usize, IndexError>;

    /// Removes every entry of `owner_key`, then appends `texts`. Returns
    /// `(removed, added)`; an empty `texts` only deletes.
    async fn replace_owner(&self, owner_key: &str, texts: &[String]) -> Result<(usize, usize), IndexError> {
        let removed = self.delete_by_owner(owner_key).await?;
        let added = if texts.is_empty() {
            0
        } else {
            self.upsert(texts, owner_key).await?
        };
        Ok((removed, added))
    }

    /// Stored texts of `owner_key` in insertion order.
    async fn documents_for_owner(&self, owner_key: &str) -> Result<Vec<String>, IndexError>;

    /// One ranked list per query text, each at most `n_results` long.
    async fn query(
        &self,
        query_texts: &[String],
        n_results: usize,
    ) -> Result<Vec<Vec<ScoredOwner>>, IndexError>;

    async fn count(&self) -> Result<usize, IndexError>;

    fn collection_name(&self) -> &str;
}
