

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use url::Url;

use super::error::{ExpertError, Result};
use super::retry::RetryPolicy;
use crate::matching::MatchPolicy;
use crate::pipeline::StageTimeouts;
use crate::{
    DEFAULT_COLLECTION_NAME, DEFAULT_EMBEDDING_MODEL, DEFAULT_LLM_MODEL, DEFAULT_OLLAMA_URL,
    DEFAULT_TRANSLATOR_URL,
};

pub const ENV_PREFIX: &str = "EXPERTS";
pub const CONFIG_PATH_ENV: &str = "EXPERTS_CONFIG";
const MAX_TRANSLATION_BACKOFF: Duration = Duration::from_secs(4);


#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpertConfig {
    pub llm_provider: String,
    pub llm_model: String,
    pub llm_base_url: String,
    pub llm_api_key: Option<String>,
    pub llm_temperature: f64,

    pub embedding_provider: String,
    pub embedding_model: String,
    pub embedding_url: String,
    pub embedding_api_key: Option<String>,
    pub embedding_cache_size: usize,
    pub embedding_cache_ttl_secs: u64,

    pub request_timeout_secs: u64,

    pub translation_enabled: bool,
    pub translator_url: String,
    pub working_language: String,
    pub display_language: String,
    pub keyword_language: String,

    pub persist_directory: PathBuf,
    pub collection_name: String,

    pub over_fetch: usize,
    pub max_experts_per_profile: usize,
    pub distance_threshold: f32,

    pub decomposition_max_attempts: u32,
    pub decomposition_retry_delay_ms: u64,

    pub translation_max_attempts: u32,
    pub translation_retry_delay_ms: u64,

    pub directory_csv: Option<PathBuf>,
    pub linkedin_json: Option<PathBuf>,
}

impl ExpertConfig {
    pub fn new(persist_directory: impl Into<PathBuf>) -> Self {
        Self {
            llm_provider: "ollama".to_string(),
            llm_model: DEFAULT_LLM_MODEL.to_string(),
            llm_base_url: DEFAULT_OLLAMA_URL.to_string(),
            llm_api_key: None,
            llm_temperature: 0.0,

            embedding_provider: "ollama".to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            embedding_url: DEFAULT_OLLAMA_URL.to_string(),
            embedding_api_key: None,
            embedding_cache_size: crate::DEFAULT_CACHE_SIZE,
            embedding_cache_ttl_secs: crate::DEFAULT_CACHE_TTL,

            request_timeout_secs: 120,

            translation_enabled: true,
            translator_url: DEFAULT_TRANSLATOR_URL.to_string(),
            working_language: "en".to_string(),
            display_language: "fr".to_string(),
            keyword_language: "fr".to_string(),

            persist_directory: persist_directory.into(),
            collection_name: DEFAULT_COLLECTION_NAME.to_string(),

            over_fetch: 20,
            max_experts_per_profile: 5,
            distance_threshold: 0.5,

            decomposition_max_attempts: 4,
            decomposition_retry_delay_ms: 1000,

            translation_max_attempts: 3,
            translation_retry_delay_ms: 500,

            directory_csv: None,
            linkedin_json: None,
        }
    }

    /// Defaults, then the optional file, then `EXPERTS_*` environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }

        let config: Self = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    pub fn from_env() -> Result<Self> {
        let path = std::env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from);
        Self::load(path.as_deref())
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("llm_base_url", &self.llm_base_url),
            ("embedding_url", &self.embedding_url),
            ("translator_url", &self.translator_url),
        ] {
            Url::parse(value)
                .map_err(|e| ExpertError::Config(format!("{name} is not a valid URL ({value}): {e}")))?;
        }

        if self.max_experts_per_profile == 0 {
            return Err(ExpertError::Config("max_experts_per_profile must be at least 1".into()));
        }
        if self.over_fetch < self.max_experts_per_profile {
            return Err(ExpertError::Config(format!(
                "over_fetch ({}) must not be smaller than max_experts_per_profile ({})",
                self.over_fetch, self.max_experts_per_profile
            )));
        }
        if !(0.0..=2.0).contains(&self.distance_threshold) {
            return Err(ExpertError::Config(format!(
                "distance_threshold must lie in [0, 2] for cosine distance, got {}",
                self.distance_threshold
            )));
        }
        if self.decomposition_max_attempts == 0 {
            return Err(ExpertError::Config("decomposition_max_attempts must be at least 1".into()));
        }
        if self.translation_max_attempts == 0 {
            return Err(ExpertError::Config("translation_max_attempts must be at least 1".into()));
        }
        if self.collection_name.is_empty()
            || !self
                .collection_name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ExpertError::Config(format!(
                "collection_name must be non-empty and use [A-Za-z0-9_-], got '{}'",
                self.collection_name
            )));
        }
        Ok(())
    }

    pub fn match_policy(&self) -> MatchPolicy {
        MatchPolicy {
            over_fetch: self.over_fetch,
            max_experts: self.max_experts_per_profile,
            distance_threshold: self.distance_threshold,
        }
    }

    pub fn decomposition_retry(&self) -> RetryPolicy {
        RetryPolicy::fixed(
            self.decomposition_max_attempts,
            Duration::from_millis(self.decomposition_retry_delay_ms),
        )
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn translation_retry(&self) -> RetryPolicy {
        RetryPolicy::exponential(
            self.translation_max_attempts,
            Duration::from_millis(self.translation_retry_delay_ms),
            MAX_TRANSLATION_BACKOFF,
        )
    }

    /// Worst case for one translation call that exhausts its retries.
    pub fn translation_budget(&self) -> Duration {
        let retry = self.translation_retry();
        self.request_timeout() * retry.max_attempts + retry.total_delay()
    }

    /// Each recommendation stage is bounded by the worst case of its own
    /// retries, so a stage that gives up still reports its own error.
    pub fn stage_timeouts(&self) -> StageTimeouts {
        let decomposition = self.decomposition_retry();
        StageTimeouts {
            decomposition: self.translation_budget()
                + self.request_timeout() * decomposition.max_attempts
                + decomposition.total_delay(),
            aggregation_base: self.request_timeout(),
            per_profile: self.request_timeout() + self.translation_budget(),
        }
    }

    pub fn collection_path(&self) -> PathBuf {
        self.persist_directory.join(format!("{}.json", self.collection_name))
    }
}

impl Default for ExpertConfig {
    fn default() -> Self {
        Self::new("vector_database")
    }
}
