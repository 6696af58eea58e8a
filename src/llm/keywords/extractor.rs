

use std::collections::BTreeSet;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use super::prompt::{build_keywords_prompt, SYSTEM_PROMPT};
use super::stopwords::strip_stop_words;
use crate::core::error::{ExpertError, Result};
use crate::core::retry::{retry_with, RetryPolicy};
use crate::index::similarity::cosine_similarity;
use crate::llm::embeddings::Embedder;
use crate::llm::providers::base::{LlmProvider, LlmProviderError};
use crate::matching::sentences::segment_sentences;
use crate::translate::{translate_long, Translator};

pub const PARAGRAPH_SENTENCES: usize = 8;
pub const KEYWORDS_PER_PARAGRAPH: usize = 2;
const MAX_KEYWORD_WORDS: usize = 6;


#[derive(Error, Debug)]
enum AttemptError {
    #[error("LLM call failed: {0}")]
    Llm(#[from] LlmProviderError),
    #[error("no keywords in model output")]
    Empty,
}


/// Splits a comma separated answer into lower-cased candidates, first
/// occurrence order, duplicates removed.
pub fn parse_keyword_list(output: &str) -> Vec<String> {
    let mut seen = BTreeSet::new();
    output
        .split([',', '\n', ';'])
        .map(|k| {
            k.trim()
                .trim_matches(|c: char| c == '"' || c == '\'' || c == '.' || c == '`' || c == '-' || c == '*')
                .trim()
                .to_lowercase()
        })
        .filter(|k| !k.is_empty() && !k.ends_with(':'))
        .filter(|k| k.split_whitespace().count() <= MAX_KEYWORD_WORDS)
        .filter(|k| seen.insert(k.clone()))
        .collect()
}


pub struct KeywordExtractor {
    llm: Arc<dyn LlmProvider>,
    embedder: Arc<dyn Embedder>,
    translator: Arc<dyn Translator>,
    language: String,
    retry: RetryPolicy,
}

impl KeywordExtractor {
    pub fn new(
        llm: Arc<dyn LlmProvider>,
        embedder: Arc<dyn Embedder>,
        translator: Arc<dyn Translator>,
        language: impl Into<String>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            llm,
            embedder,
            translator,
            language: language.into(),
            retry,
        }
    }

    pub async fn extract(&self, text: &str) -> Result<Vec<String>> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        let translated = translate_long(self.translator.as_ref(), text, &self.language)
            .await
            .map_err(|e| ExpertError::translation("keyword extraction", e))?;

        let sentences = segment_sentences(&translated);
        let mut keywords = BTreeSet::new();

        for (i, chunk) in sentences.chunks(PARAGRAPH_SENTENCES).enumerate() {
            let paragraph = chunk.join("\n");
            let candidates = match self.candidates_for(&paragraph).await {
                Ok(candidates) => candidates,
                Err(e) => {
                    warn!("Skipping paragraph {} for keywords: {}", i, e);
                    continue;
                }
            };

            for keyword in self.rank(&paragraph, candidates).await {
                keywords.insert(keyword.to_uppercase());
            }
        }

        info!("Extracted {} keyword(s) from {} sentence(s)", keywords.len(), sentences.len());
        Ok(keywords.into_iter().collect())
    }

    async fn candidates_for(&self, paragraph: &str) -> std::result::Result<Vec<String>, String> {
        let prompt = build_keywords_prompt(paragraph);
        retry_with(&self.retry, "keyword extraction", |_| {
            let prompt = prompt.as_str();
            async move {
                let (output, _) = self.llm.generate(SYSTEM_PROMPT, prompt, None).await?;
                let candidates = parse_keyword_list(&output);
                if candidates.is_empty() {
                    Err(AttemptError::Empty)
                } else {
                    Ok(candidates)
                }
            }
        })
        .await
        .map_err(|e| e.to_string())
    }

    /// Keeps the candidates closest to the paragraph in embedding space.
    /// Candidates are compared without stop words but returned as the model
    /// wrote them; a candidate made only of stop words is dropped.
    async fn rank(&self, paragraph: &str, candidates: Vec<String>) -> Vec<String> {
        let (candidates, stripped): (Vec<String>, Vec<String>) = candidates
            .into_iter()
            .map(|c| {
                let s = strip_stop_words(&c);
                (c, s)
            })
            .filter(|(_, s)| !s.is_empty())
            .unzip();

        if candidates.len() <= KEYWORDS_PER_PARAGRAPH {
            return candidates;
        }

        let paragraph_embedding = match self.embedder.embed(paragraph).await {
            Ok(e) => e,
            Err(e) => {
                warn!("Keyword ranking unavailable, keeping model order: {}", e);
                return candidates.into_iter().take(KEYWORDS_PER_PARAGRAPH).collect();
            }
        };
        let candidate_embeddings = match self.embedder.embed_batch(&stripped).await {
            Ok(e) => e,
            Err(e) => {
                warn!("Keyword ranking unavailable, keeping model order: {}", e);
                return candidates.into_iter().take(KEYWORDS_PER_PARAGRAPH).collect();
            }
        };

        let mut scored: Vec<(f64, String)> = candidate_embeddings
            .iter()
            .map(|e| cosine_similarity(&paragraph_embedding, e))
            .zip(candidates)
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));

        debug!("Keyword scores: {:?}", scored);
        scored
            .into_iter()
            .take(KEYWORDS_PER_PARAGRAPH)
            .map(|(_, k)| k)
            .collect()
    }
}
