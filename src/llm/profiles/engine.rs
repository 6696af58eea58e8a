

use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::models::{parse_profiles, ProfileParseError};
use super::prompt::{build_profiles_prompt, SYSTEM_PROMPT};
use crate::core::error::{ExpertError, Result};
use crate::core::retry::{retry_with, RetryPolicy};
use crate::llm::providers::base::{LlmProvider, LlmProviderError};
use crate::translate::{translate_long, Translator};


#[derive(Error, Debug)]
enum AttemptError {
    #[error("LLM call failed: {0}")]
    Llm(#[from] LlmProviderError),
    #[error("unparseable output: {0}")]
    Parse(#[from] ProfileParseError),
}


pub struct ProfileDecomposer {
    llm: Arc<dyn LlmProvider>,
    translator: Arc<dyn Translator>,
    working_language: String,
    retry: RetryPolicy,
}

impl ProfileDecomposer {
    pub fn new(
        llm: Arc<dyn LlmProvider>,
        translator: Arc<dyn Translator>,
        working_language: impl Into<String>,
        retry: RetryPolicy,
    ) -> Self {
        info!(
            "ProfileDecomposer initialized: provider={}, model={}, attempts={}",
            llm.provider_name(),
            llm.model_name(),
            retry.max_attempts
        );

        Self {
            llm,
            translator,
            working_language: working_language.into(),
            retry,
        }
    }

    pub async fn decompose(&self, question: &str) -> Result<Vec<String>> {
        let translated = translate_long(self.translator.as_ref(), question, &self.working_language)
            .await
            .map_err(|e| ExpertError::ProfileDecompositionFailed {
                attempts: 0,
                reason: format!("question translation failed: {e}"),
            })?;

        debug!("Decomposing question: '{}...'", crate::safe_truncate(&translated, 80));

        let prompt = build_profiles_prompt(&translated);

        let profiles = retry_with(&self.retry, "profile decomposition", |attempt| {
            let prompt = prompt.as_str();
            async move {
                let (output, metadata) = self
                    .llm
                    .generate(SYSTEM_PROMPT, prompt, Some("json_object"))
                    .await?;
                debug!(
                    "Decomposition attempt {} answered by {}/{}",
                    attempt, metadata.provider, metadata.model
                );
                parse_profiles(&output).map_err(|e| {
                    warn!(
                        "Attempt {}: could not parse profiles ({}): {}",
                        attempt,
                        e,
                        crate::safe_truncate(&output, 200)
                    );
                    AttemptError::from(e)
                })
            }
        })
        .await
        .map_err(|e| ExpertError::ProfileDecompositionFailed {
            attempts: e.attempts,
            reason: e.last.to_string(),
        })?;

        info!("Question decomposed into {} profile(s)", profiles.len());
        Ok(profiles)
    }
}
