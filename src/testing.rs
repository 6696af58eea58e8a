//! In-process fakes for the collaborator traits.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::index::{IndexError, ScoredOwner, VectorIndex};
use crate::llm::embeddings::{Embedder, EmbeddingError};
use crate::llm::providers::base::{LlmMetadata, LlmProvider, LlmProviderError};
use crate::translate::{TranslateError, Translator};

const CONCEPTS: &[&[&str]] = &[
    &["learning", "scientist", "machine"],
    &["imaging", "image", "radiology", "mri"],
    &["security", "privacy"],
    &["cloud", "infrastructure"],
    &["data"],
    &["cardiologist", "cardiac", "heart"],
];


/// One dimension per concept, 1.0 when any of its words occurs in the text.
#[derive(Debug, Default)]
pub(crate) struct ConceptEmbedder;

#[async_trait]
impl Embedder for ConceptEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let text = text.to_lowercase();
        Ok(CONCEPTS
            .iter()
            .map(|words| if words.iter().any(|w| text.contains(w)) { 1.0 } else { 0.0 })
            .collect())
    }

    fn model_name(&self) -> &str {
        "concept"
    }
}


/// `ConceptEmbedder` under another model name, padded with `extra` trailing
/// dimensions. Texts containing `fail_on` are rejected.
pub(crate) struct VariantEmbedder {
    pub(crate) model: &'static str,
    pub(crate) extra: usize,
    pub(crate) fail_on: Option<&'static str>,
}

#[async_trait]
impl Embedder for VariantEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        if self.fail_on.is_some_and(|marker| text.contains(marker)) {
            return Err(EmbeddingError::InvalidResponse("embedding backend refused".into()));
        }
        let mut embedding = ConceptEmbedder.embed(text).await?;
        embedding.extend(std::iter::repeat_n(0.25, self.extra));
        Ok(embedding)
    }

    fn model_name(&self) -> &str {
        self.model
    }
}


/// Replays scripted completions in order; `Err` entries become provider errors.
pub(crate) struct ScriptedLlm {
    script: Mutex<VecDeque<Result<String, String>>>,
    prompts: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl ScriptedLlm {
    pub(crate) fn new(script: Vec<Result<String, String>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            prompts: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }
}

#[async_trait]
impl LlmProvider for ScriptedLlm {
    async fn generate(
        &self,
        _system_prompt: &str,
        user_prompt: &str,
        _response_format: Option<&str>,
    ) -> Result<(String, LlmMetadata), LlmProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().push(user_prompt.to_string());

        let next = self.script.lock().pop_front();
        match next {
            Some(Ok(output)) => Ok((
                output,
                LlmMetadata {
                    provider: "scripted".into(),
                    model: "script".into(),
                    ..LlmMetadata::default()
                },
            )),
            Some(Err(e)) => Err(LlmProviderError::Provider(e)),
            None => Err(LlmProviderError::Provider("script exhausted".into())),
        }
    }

    fn provider_name(&self) -> &str {
        "scripted"
    }

    fn model_name(&self) -> &str {
        "script"
    }
}


/// Sleeps before failing; for timeout paths.
pub(crate) struct SlowLlm(pub(crate) std::time::Duration);

#[async_trait]
impl LlmProvider for SlowLlm {
    async fn generate(
        &self,
        _system_prompt: &str,
        _user_prompt: &str,
        _response_format: Option<&str>,
    ) -> Result<(String, LlmMetadata), LlmProviderError> {
        tokio::time::sleep(self.0).await;
        Err(LlmProviderError::Provider("too slow".into()))
    }

    fn provider_name(&self) -> &str {
        "slow"
    }

    fn model_name(&self) -> &str {
        "slow"
    }
}


/// Tags text with the target language and records every call.
#[derive(Default)]
pub(crate) struct RecordingTranslator {
    calls: Mutex<Vec<(String, String)>>,
}

impl RecordingTranslator {
    pub(crate) fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl Translator for RecordingTranslator {
    async fn translate(&self, text: &str, target: &str) -> Result<String, TranslateError> {
        self.calls.lock().push((text.to_string(), target.to_string()));
        Ok(format!("[{target}] {text}"))
    }

    fn name(&self) -> &str {
        "recording"
    }
}


pub(crate) struct FailingTranslator;

#[async_trait]
impl Translator for FailingTranslator {
    async fn translate(&self, _text: &str, _target: &str) -> Result<String, TranslateError> {
        Err(TranslateError::Backend("translator offline".into()))
    }

    fn name(&self) -> &str {
        "failing"
    }
}


/// Answers every query with the same canned lists.
pub(crate) struct StaticIndex {
    lists: Vec<Vec<ScoredOwner>>,
    fail: bool,
    queries: Mutex<Vec<(Vec<String>, usize)>>,
}

impl StaticIndex {
    pub(crate) fn new(lists: Vec<Vec<ScoredOwner>>) -> Self {
        Self {
            lists,
            fail: false,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(Vec::new())
        }
    }

    pub(crate) fn queries(&self) -> Vec<(Vec<String>, usize)> {
        self.queries.lock().clone()
    }
}

#[async_trait]
impl VectorIndex for StaticIndex {
    async fn upsert(&self, texts: &[String], _owner_key: &str) -> Result<usize, IndexError> {
        Ok(texts.len())
    }

    async fn delete_by_owner(&self, _owner_key: &str) -> Result<usize, IndexError> {
        Ok(0)
    }

    async fn documents_for_owner(&self, _owner_key: &str) -> Result<Vec<String>, IndexError> {
        Ok(Vec::new())
    }

    async fn query(
        &self,
        query_texts: &[String],
        n_results: usize,
    ) -> Result<Vec<Vec<ScoredOwner>>, IndexError> {
        if self.fail {
            return Err(IndexError::Unavailable("static index is down".into()));
        }
        self.queries.lock().push((query_texts.to_vec(), n_results));
        Ok(self.lists.clone())
    }

    async fn count(&self) -> Result<usize, IndexError> {
        Ok(self.lists.iter().map(Vec::len).sum())
    }

    fn collection_name(&self) -> &str {
        "static"
    }
}


#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum IndexCall {
    Upsert(String, Vec<String>),
    DeleteByOwner(String),
}


/// In-memory index that logs every write.
#[derive(Default)]
pub(crate) struct RecordingIndex {
    entries: Mutex<Vec<(String, String)>>,
    calls: Mutex<Vec<IndexCall>>,
    failing_owner: Mutex<Option<String>>,
}

impl RecordingIndex {
    pub(crate) fn write_calls(&self) -> Vec<IndexCall> {
        self.calls.lock().clone()
    }

    pub(crate) fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    pub(crate) fn fail_upserts_for(&self, owner_key: &str) {
        *self.failing_owner.lock() = Some(owner_key.to_string());
    }
}

#[async_trait]
impl VectorIndex for RecordingIndex {
    async fn upsert(&self, texts: &[String], owner_key: &str) -> Result<usize, IndexError> {
        self.calls
            .lock()
            .push(IndexCall::Upsert(owner_key.to_string(), texts.to_vec()));
        if self.failing_owner.lock().as_deref() == Some(owner_key) {
            return Err(IndexError::Unavailable("upsert rejected".into()));
        }
        let mut entries = self.entries.lock();
        entries.extend(texts.iter().map(|t| (owner_key.to_string(), t.clone())));
        Ok(texts.len())
    }

    async fn delete_by_owner(&self, owner_key: &str) -> Result<usize, IndexError> {
        self.calls.lock().push(IndexCall::DeleteByOwner(owner_key.to_string()));
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|(owner, _)| owner != owner_key);
        Ok(before - entries.len())
    }

    async fn documents_for_owner(&self, owner_key: &str) -> Result<Vec<String>, IndexError> {
        Ok(self
            .entries
            .lock()
            .iter()
            .filter(|(owner, _)| owner == owner_key)
            .map(|(_, text)| text.clone())
            .collect())
    }

    async fn query(
        &self,
        query_texts: &[String],
        _n_results: usize,
    ) -> Result<Vec<Vec<ScoredOwner>>, IndexError> {
        Ok(vec![Vec::new(); query_texts.len()])
    }

    async fn count(&self) -> Result<usize, IndexError> {
        Ok(self.entries.lock().len())
    }

    fn collection_name(&self) -> &str {
        "recording"
    }
}
