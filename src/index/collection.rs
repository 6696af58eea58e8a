

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::similarity::cosine_distance;
use super::{IndexError, ScoredOwner, VectorIndex};
use crate::llm::embeddings::Embedder;

const COSINE_SPACE: &str = "cosine";
const FORMAT_VERSION: u32 = 1;


#[derive(Debug, Clone, Serialize, Deserialize)]
struct CollectionMetadata {
    name: String,
    space: String,
    version: u32,
    embedding_model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredEntry {
    id: Uuid,
    owner_key: String,
    text: String,
    embedding: Vec<f32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct CollectionFile {
    metadata: CollectionMetadata,
    entries: Vec<StoredEntry>,
}


/// Cosine collection persisted as a single JSON file. Every mutation is
/// written to disk before the in-memory view changes.
pub struct LocalCollection {
    metadata: CollectionMetadata,
    path: PathBuf,
    embedder: Arc<dyn Embedder>,
    entries: RwLock<Vec<StoredEntry>>,
}

impl LocalCollection {
    /// Opens `<persist_directory>/<name>.json`, creating it when missing.
    pub async fn open(
        persist_directory: impl AsRef<Path>,
        name: &str,
        embedder: Arc<dyn Embedder>,
    ) -> Result<Self, IndexError> {
        let dir = persist_directory.as_ref();
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(format!("{name}.json"));

        let (metadata, entries) = if tokio::fs::try_exists(&path).await? {
            let bytes = tokio::fs::read(&path).await?;
            let file: CollectionFile = serde_json::from_slice(&bytes)?;
            if file.metadata.space != COSINE_SPACE {
                return Err(IndexError::MetricMismatch {
                    collection: name.to_string(),
                    expected: COSINE_SPACE.to_string(),
                    found: file.metadata.space,
                });
            }
            let mut metadata = file.metadata;
            let mut entries = file.entries;
            if metadata.embedding_model != embedder.model_name() {
                warn!(
                    "Collection '{}' was embedded with '{}', re-embedding {} entries with '{}'",
                    name,
                    metadata.embedding_model,
                    entries.len(),
                    embedder.model_name()
                );
                reembed(embedder.as_ref(), &mut entries).await?;
                metadata.embedding_model = embedder.model_name().to_string();
                persist(&path, &metadata, &entries).await?;
            }
            info!(
                "Opened collection '{}' with {} entries ({})",
                name,
                entries.len(),
                path.display()
            );
            (metadata, entries)
        } else {
            let metadata = CollectionMetadata {
                name: name.to_string(),
                space: COSINE_SPACE.to_string(),
                version: FORMAT_VERSION,
                embedding_model: embedder.model_name().to_string(),
            };
            persist(&path, &metadata, &[]).await?;
            info!("Created collection '{}' at {}", name, path.display());
            (metadata, Vec::new())
        };

        Ok(Self {
            metadata,
            path,
            embedder,
            entries: RwLock::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Distinct owners in first-insertion order.
    pub async fn owners(&self) -> Vec<String> {
        let entries = self.entries.read().await;
        let mut owners: Vec<String> = Vec::new();
        for entry in entries.iter() {
            if !owners.contains(&entry.owner_key) {
                owners.push(entry.owner_key.clone());
            }
        }
        owners
    }
}


/// Vectors from another model are not comparable with new queries, so every
/// stored text is embedded again before the collection is served.
async fn reembed(embedder: &dyn Embedder, entries: &mut [StoredEntry]) -> Result<(), IndexError> {
    let texts: Vec<String> = entries.iter().map(|e| e.text.clone()).collect();
    let embeddings = embedder.embed_batch(&texts).await?;
    for (entry, embedding) in entries.iter_mut().zip(embeddings) {
        entry.embedding = embedding;
    }
    Ok(())
}

async fn persist(
    path: &Path,
    metadata: &CollectionMetadata,
    entries: &[StoredEntry],
) -> Result<(), IndexError> {
    #[derive(Serialize)]
    struct Borrowed<'a> {
        metadata: &'a CollectionMetadata,
        entries: &'a [StoredEntry],
    }

    let bytes = serde_json::to_vec(&Borrowed { metadata, entries })?;
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, bytes).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

#[async_trait]
impl VectorIndex for LocalCollection {
    async fn upsert(&self, texts: &[String], owner_key: &str) -> Result<usize, IndexError> {
        if texts.is_empty() {
            return Ok(0);
        }

        let embeddings = self.embedder.embed_batch(texts).await?;

        let mut entries = self.entries.write().await;
        let mut next = entries.clone();
        next.extend(texts.iter().zip(embeddings).map(|(text, embedding)| StoredEntry {
            id: Uuid::new_v4(),
            owner_key: owner_key.to_string(),
            text: text.clone(),
            embedding,
        }));

        persist(&self.path, &self.metadata, &next).await?;
        *entries = next;

        debug!("Upserted {} sentence(s) for {}", texts.len(), owner_key);
        Ok(texts.len())
    }

    async fn delete_by_owner(&self, owner_key: &str) -> Result<usize, IndexError> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        let next: Vec<StoredEntry> = entries
            .iter()
            .filter(|e| e.owner_key != owner_key)
            .cloned()
            .collect();
        let removed = before - next.len();

        if removed == 0 {
            return Ok(0);
        }

        persist(&self.path, &self.metadata, &next).await?;
        *entries = next;

        debug!("Deleted {} sentence(s) for {}", removed, owner_key);
        Ok(removed)
    }

    /// Embeds first, then swaps the owner's entries in one write, so a failed
    /// embedding leaves the previous entries in place.
    async fn replace_owner(&self, owner_key: &str, texts: &[String]) -> Result<(usize, usize), IndexError> {
        let embeddings = if texts.is_empty() {
            Vec::new()
        } else {
            self.embedder.embed_batch(texts).await?
        };

        let mut entries = self.entries.write().await;
        let mut next: Vec<StoredEntry> = entries
            .iter()
            .filter(|e| e.owner_key != owner_key)
            .cloned()
            .collect();
        let removed = entries.len() - next.len();
        if removed == 0 && texts.is_empty() {
            return Ok((0, 0));
        }

        next.extend(texts.iter().zip(embeddings).map(|(text, embedding)| StoredEntry {
            id: Uuid::new_v4(),
            owner_key: owner_key.to_string(),
            text: text.clone(),
            embedding,
        }));

        persist(&self.path, &self.metadata, &next).await?;
        *entries = next;

        debug!("Replaced sentences of {}: -{} +{}", owner_key, removed, texts.len());
        Ok((removed, texts.len()))
    }

    async fn documents_for_owner(&self, owner_key: &str) -> Result<Vec<String>, IndexError> {
        let entries = self.entries.read().await;
        Ok(entries
            .iter()
            .filter(|e| e.owner_key == owner_key)
            .map(|e| e.text.clone())
            .collect())
    }

    async fn query(
        &self,
        query_texts: &[String],
        n_results: usize,
    ) -> Result<Vec<Vec<ScoredOwner>>, IndexError> {
        if query_texts.is_empty() {
            return Ok(Vec::new());
        }

        let query_embeddings = self.embedder.embed_batch(query_texts).await?;
        let entries = self.entries.read().await;

        let results = query_embeddings
            .iter()
            .map(|query| {
                let mut scored: Vec<ScoredOwner> = entries
                    .iter()
                    .map(|e| ScoredOwner::new(e.owner_key.clone(), cosine_distance(query, &e.embedding)))
                    .collect();
                // stable: equal distances keep insertion order
                scored.sort_by(|a, b| a.distance.total_cmp(&b.distance));
                scored.truncate(n_results);
                scored
            })
            .collect();

        Ok(results)
    }

    async fn count(&self) -> Result<usize, IndexError> {
        Ok(self.entries.read().await.len())
    }

    fn collection_name(&self) -> &str {
        &self.metadata.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ConceptEmbedder, VariantEmbedder};
    use tempfile::TempDir;

    fn texts(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    async fn open(dir: &TempDir) -> LocalCollection {
        LocalCollection::open(dir.path(), "experts", Arc::new(ConceptEmbedder::default()))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_upsert_appends_and_persists() {
        let dir = TempDir::new().unwrap();
        let collection = open(&dir).await;

        collection
            .upsert(&texts(&["I do deep learning.", "I read radiology images."]), "alice@x")
            .await
            .unwrap();
        collection.upsert(&texts(&["I do deep learning."]), "alice@x").await.unwrap();
        assert_eq!(collection.count().await.unwrap(), 3);

        let reopened = open(&dir).await;
        assert_eq!(reopened.count().await.unwrap(), 3);
        assert_eq!(
            reopened.documents_for_owner("alice@x").await.unwrap(),
            texts(&["I do deep learning.", "I read radiology images.", "I do deep learning."])
        );
        assert_eq!(reopened.collection_name(), "experts");
    }

    #[tokio::test]
    async fn test_delete_by_owner() {
        let dir = TempDir::new().unwrap();
        let collection = open(&dir).await;
        collection.upsert(&texts(&["cloud infrastructure"]), "a@x").await.unwrap();
        collection.upsert(&texts(&["data security", "privacy"]), "b@x").await.unwrap();

        assert_eq!(collection.delete_by_owner("b@x").await.unwrap(), 2);
        assert_eq!(collection.delete_by_owner("b@x").await.unwrap(), 0);
        assert_eq!(collection.delete_by_owner("nobody@x").await.unwrap(), 0);
        assert_eq!(collection.owners().await, vec!["a@x".to_string()]);
        assert_eq!(open(&dir).await.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_query_orders_by_distance_then_insertion() {
        let dir = TempDir::new().unwrap();
        let collection = open(&dir).await;
        collection.upsert(&texts(&["cloud"]), "far@x").await.unwrap();
        collection.upsert(&texts(&["machine learning"]), "first@x").await.unwrap();
        collection.upsert(&texts(&["deep learning"]), "second@x").await.unwrap();

        let results = collection.query(&texts(&["learning", "cloud"]), 2).await.unwrap();
        assert_eq!(results.len(), 2);

        let owners: Vec<&str> = results[0].iter().map(|s| s.owner_key.as_str()).collect();
        assert_eq!(owners, vec!["first@x", "second@x"]);
        assert_eq!(results[0][0].distance, 0.0);
        assert_eq!(results[1][0].owner_key, "far@x");
    }

    #[tokio::test]
    async fn test_empty_inputs_do_not_write() {
        let dir = TempDir::new().unwrap();
        let collection = open(&dir).await;
        assert_eq!(collection.upsert(&[], "a@x").await.unwrap(), 0);
        assert!(collection.query(&[], 5).await.unwrap().is_empty());
        assert_eq!(collection.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_model_change_reembeds_on_open() {
        let dir = TempDir::new().unwrap();
        open(&dir).await.upsert(&texts(&["data security"]), "bob@x").await.unwrap();

        let wide = Arc::new(VariantEmbedder {
            model: "concept-wide",
            extra: 3,
            fail_on: None,
        });
        let reopened = LocalCollection::open(dir.path(), "experts", wide.clone()).await.unwrap();

        let results = reopened.query(&texts(&["data security"]), 5).await.unwrap();
        assert_eq!(results[0].len(), 1);
        assert_eq!(results[0][0].owner_key, "bob@x");
        assert!(results[0][0].distance < 1e-6);

        let stored: serde_json::Value =
            serde_json::from_slice(&std::fs::read(reopened.path()).unwrap()).unwrap();
        assert_eq!(stored["metadata"]["embedding_model"], "concept-wide");
        assert_eq!(stored["entries"][0]["embedding"].as_array().unwrap().len(), 9);
    }

    #[tokio::test]
    async fn test_model_change_fails_open_when_reembedding_fails() {
        let dir = TempDir::new().unwrap();
        open(&dir).await.upsert(&texts(&["data security"]), "bob@x").await.unwrap();

        let broken = Arc::new(VariantEmbedder {
            model: "concept-wide",
            extra: 3,
            fail_on: Some("security"),
        });
        let err = LocalCollection::open(dir.path(), "experts", broken).await.err().unwrap();
        assert!(matches!(err, IndexError::Embedding(_)));

        // the stored file still belongs to the old model
        let reopened = open(&dir).await;
        let results = reopened.query(&texts(&["data security"]), 5).await.unwrap();
        assert!(results[0][0].distance < 1e-6);
    }

    #[tokio::test]
    async fn test_replace_owner_keeps_entries_when_embedding_fails() {
        let dir = TempDir::new().unwrap();
        let embedder = Arc::new(VariantEmbedder {
            model: "concept",
            extra: 0,
            fail_on: Some("unreachable"),
        });
        let collection = LocalCollection::open(dir.path(), "experts", embedder).await.unwrap();
        collection.upsert(&texts(&["data security"]), "bob@x").await.unwrap();
        collection.upsert(&texts(&["cloud"]), "carol@x").await.unwrap();

        let err = collection
            .replace_owner("bob@x", &texts(&["unreachable skills"]))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, IndexError::Embedding(_)));
        assert_eq!(collection.documents_for_owner("bob@x").await.unwrap(), texts(&["data security"]));

        assert_eq!(
            collection.replace_owner("bob@x", &texts(&["privacy", "mri"])).await.unwrap(),
            (1, 2)
        );
        assert_eq!(collection.replace_owner("nobody@x", &[]).await.unwrap(), (0, 0));
        assert_eq!(collection.owners().await, vec!["carol@x".to_string(), "bob@x".to_string()]);
        assert_eq!(open(&dir).await.documents_for_owner("bob@x").await.unwrap(), texts(&["privacy", "mri"]));
    }

    #[tokio::test]
    async fn test_rejects_non_cosine_collection() {
        let dir = TempDir::new().unwrap();
        let body = serde_json::json!({
            "metadata": {"name": "experts", "space": "l2", "version": 1, "embedding_model": "m"},
            "entries": []
        });
        std::fs::write(dir.path().join("experts.json"), body.to_string()).unwrap();

        let err = LocalCollection::open(dir.path(), "experts", Arc::new(ConceptEmbedder::default()))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, IndexError::MetricMismatch { .. }));
    }
}
