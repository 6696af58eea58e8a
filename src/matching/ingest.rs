

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::models::{IngestOutcome, IngestReport};
use super::sentences::segment_sentences;
use crate::core::error::{ExpertError, Result};
use crate::core::locks::KeyedLocks;
use crate::directory::ExpertRecord;
use crate::index::VectorIndex;
use crate::translate::{translate_long, Translator};
use crate::utils::normalize_expert_key;


/// Keeps each expert's skill sentences in the index in step with their raw
/// skill text. Writers for the same expert key are serialised.
pub struct SkillIngestor {
    index: Arc<dyn VectorIndex>,
    translator: Arc<dyn Translator>,
    working_language: String,
    locks: KeyedLocks,
}

impl SkillIngestor {
    pub fn new(
        index: Arc<dyn VectorIndex>,
        translator: Arc<dyn Translator>,
        working_language: impl Into<String>,
    ) -> Self {
        Self {
            index,
            translator,
            working_language: working_language.into(),
            locks: KeyedLocks::new(),
        }
    }

    pub async fn ingest_or_update(&self, expert_key: &str, raw_skill_text: &str) -> Result<IngestOutcome> {
        let key = normalize_expert_key(expert_key)
            .ok_or_else(|| ExpertError::InvalidInput("expert key is empty".into()))?;
        let _guard = self.locks.lock(&key).await;

        let translated = translate_long(self.translator.as_ref(), raw_skill_text, &self.working_language)
            .await
            .map_err(|e| ExpertError::translation(format!("skills of {key}"), e))?;
        let sentences = segment_sentences(&translated);

        let stored = self.index.documents_for_owner(&key).await?;
        if stored == sentences {
            debug!("Skills of {} unchanged ({} sentence(s))", key, sentences.len());
            return Ok(IngestOutcome::Unchanged);
        }

        let (removed, added) = match self.index.replace_owner(&key, &sentences).await {
            Ok(counts) => counts,
            Err(e) => {
                warn!("Replacing skills of {} failed, re-ingest this expert: {}", key, e);
                return Err(e.into());
            }
        };

        info!("Replaced skills of {}: -{} +{}", key, removed, added);
        Ok(IngestOutcome::Replaced { removed, added })
    }

    pub async fn delete(&self, expert_key: &str) -> Result<usize> {
        let key = normalize_expert_key(expert_key)
            .ok_or_else(|| ExpertError::InvalidInput("expert key is empty".into()))?;
        let _guard = self.locks.lock(&key).await;

        let removed = self.index.delete_by_owner(&key).await?;
        info!("Deleted {} sentence(s) of {}", removed, key);
        Ok(removed)
    }

    /// Ingests records one after another. A failing expert is logged and
    /// skipped; the run always completes.
    pub async fn bulk_load(&self, records: &[ExpertRecord]) -> IngestReport {
        let mut report = IngestReport::default();

        for (row, record) in records.iter().enumerate() {
            let label = if record.email.trim().is_empty() {
                format!("row {}", row + 1)
            } else {
                record.email.trim().to_string()
            };

            match self.ingest_or_update(&record.email, &record.skills).await {
                Ok(IngestOutcome::Unchanged) => report.unchanged.push(label),
                Ok(IngestOutcome::Replaced { .. }) => report.replaced.push(label),
                Err(e) => {
                    warn!("Skipping expert {}: {}", label, e);
                    report.skipped.push((label, e.to_string()));
                }
            }
        }

        info!(
            "Bulk load finished: {} replaced, {} unchanged, {} skipped",
            report.replaced.len(),
            report.unchanged.len(),
            report.skipped.len()
        );
        report
    }
}
