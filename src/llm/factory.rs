

use std::sync::Arc;
use std::time::Duration;

use super::embeddings::{EmbeddingError, EmbeddingGenerator};
use super::providers::base::{LlmProvider, LlmProviderError};
use super::providers::ollama::OllamaProvider;
use super::providers::openai::OpenAiCompatProvider;
use crate::core::config::ExpertConfig;


pub struct LlmProviderFactory;

impl LlmProviderFactory {
    pub fn create(
        provider: &str,
        model: &str,
        api_key: Option<&str>,
        base_url: &str,
        temperature: f64,
        timeout: Duration,
    ) -> Result<Arc<dyn LlmProvider>, LlmProviderError> {
        match provider {
            "ollama" => Ok(Arc::new(OllamaProvider::new(base_url, model, temperature, timeout)?)),
            "openai" => Ok(Arc::new(OpenAiCompatProvider::new(
                base_url,
                api_key.map(String::from),
                model,
                temperature,
                timeout,
            )?)),
            other => Err(LlmProviderError::Unsupported(other.to_string())),
        }
    }

    pub fn from_config(config: &ExpertConfig) -> Result<Arc<dyn LlmProvider>, LlmProviderError> {
        Self::create(
            &config.llm_provider,
            &config.llm_model,
            config.llm_api_key.as_deref(),
            &config.llm_base_url,
            config.llm_temperature,
            config.request_timeout(),
        )
    }
}


pub struct EmbeddingProviderFactory;

impl EmbeddingProviderFactory {
    pub fn from_config(config: &ExpertConfig) -> Result<EmbeddingGenerator, EmbeddingError> {
        EmbeddingGenerator::new(
            config.embedding_provider.clone(),
            config.embedding_url.clone(),
            config.embedding_model.clone(),
            config.embedding_api_key.clone(),
            config.request_timeout(),
            config.embedding_cache_size,
            config.embedding_cache_ttl_secs,
        )
    }
}
