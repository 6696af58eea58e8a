

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;
use tracing::{error, info};

use crate::core::config::ExpertConfig;
use crate::core::error::{ExpertError, Result};
use crate::directory::{load_experts_csv, load_linkedin_export, merge_linkedin, ExpertRecord};
use crate::index::{LocalCollection, VectorIndex};
use crate::llm::embeddings::Embedder;
use crate::llm::factory::{EmbeddingProviderFactory, LlmProviderFactory};
use crate::llm::keywords::KeywordExtractor;
use crate::llm::profiles::ProfileDecomposer;
use crate::llm::providers::base::LlmProvider;
use crate::matching::{ExpertAggregator, IngestOutcome, IngestReport, Recommendation, SkillIngestor};
use crate::pipeline::RecommendationPipeline;
use crate::translate::{GoogleTranslator, IdentityTranslator, Translator};


/// Every long-lived collaborator, built once and never mutated.
pub struct ExpertContext {
    pub config: ExpertConfig,
    pub index: Arc<dyn VectorIndex>,
    pub pipeline: RecommendationPipeline,
    pub ingestor: SkillIngestor,
    pub keywords: KeywordExtractor,
    pub startup_report: Option<IngestReport>,
}

impl ExpertContext {
    pub fn from_parts(
        config: ExpertConfig,
        llm: Arc<dyn LlmProvider>,
        embedder: Arc<dyn Embedder>,
        translator: Arc<dyn Translator>,
        index: Arc<dyn VectorIndex>,
    ) -> Self {
        let decomposer = ProfileDecomposer::new(
            llm.clone(),
            translator.clone(),
            config.working_language.clone(),
            config.decomposition_retry(),
        );
        let aggregator = ExpertAggregator::new(
            index.clone(),
            translator.clone(),
            config.match_policy(),
            config.display_language.clone(),
        );
        let ingestor = SkillIngestor::new(index.clone(), translator.clone(), config.working_language.clone());
        let keywords = KeywordExtractor::new(
            llm,
            embedder,
            translator,
            config.keyword_language.clone(),
            config.decomposition_retry(),
        );

        Self {
            pipeline: RecommendationPipeline::new(Arc::new(decomposer), Arc::new(aggregator))
                .with_timeouts(config.stage_timeouts()),
            ingestor,
            keywords,
            index,
            config,
            startup_report: None,
        }
    }

    /// Connects the configured clients, opens the collection and loads the
    /// member directory when one is configured.
    pub async fn build(config: ExpertConfig) -> Result<Self> {
        config.validate()?;

        let llm = LlmProviderFactory::from_config(&config).map_err(|e| ExpertError::Config(e.to_string()))?;
        let embedder: Arc<dyn Embedder> = Arc::new(
            EmbeddingProviderFactory::from_config(&config).map_err(|e| ExpertError::Config(e.to_string()))?,
        );
        let translator: Arc<dyn Translator> = if config.translation_enabled {
            Arc::new(
                GoogleTranslator::new(&config.translator_url, config.request_timeout())
                    .map_err(|e| ExpertError::Config(e.to_string()))?
                    .with_retry(config.translation_retry()),
            )
        } else {
            Arc::new(IdentityTranslator)
        };

        let collection =
            LocalCollection::open(&config.persist_directory, &config.collection_name, embedder.clone()).await?;

        let mut context = Self::from_parts(config, llm, embedder, translator, Arc::new(collection));
        context.startup_report = context.populate().await?;
        Ok(context)
    }

    /// Bulk-ingests the configured directory; `None` when no directory is set.
    pub async fn populate(&self) -> Result<Option<IngestReport>> {
        let Some(csv_path) = self.config.directory_csv.clone() else {
            return Ok(None);
        };
        let linkedin_path = self.config.linkedin_json.clone();

        let records = tokio::task::spawn_blocking(move || -> Result<Vec<ExpertRecord>> {
            let mut records = load_experts_csv(&csv_path)?;
            if let Some(path) = linkedin_path {
                let export = load_linkedin_export(&path)?;
                merge_linkedin(&mut records, &export);
            }
            Ok(records)
        })
        .await
        .map_err(|e| ExpertError::Internal(format!("directory loader panicked: {e}")))??;

        Ok(Some(self.ingestor.bulk_load(&records).await))
    }
}


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entries: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub startup_report: Option<IngestReport>,
}


/// Front door for callers. Operations fail fast with `Unavailable` until the
/// context is built, and keep failing with the reason if building failed.
pub struct ExpertService {
    config: ExpertConfig,
    context: OnceCell<std::result::Result<Arc<ExpertContext>, String>>,
}

impl ExpertService {
    /// Not started; call [`ExpertService::wait_ready`] or use [`ExpertService::start`].
    pub fn new(config: ExpertConfig) -> Self {
        Self {
            config,
            context: OnceCell::new(),
        }
    }

    /// Builds the context on a background task and returns immediately.
    pub fn start(config: ExpertConfig) -> Arc<Self> {
        let service = Arc::new(Self::new(config));
        let background = service.clone();
        tokio::spawn(async move {
            let _ = background.wait_ready().await;
        });
        service
    }

    pub fn with_context(context: ExpertContext) -> Self {
        let service = Self::new(context.config.clone());
        // a fresh cell accepts its first value
        let _ = service.context.set(Ok(Arc::new(context)));
        service
    }

    /// Builds the context once; concurrent and later callers share the outcome.
    pub async fn wait_ready(&self) -> Result<Arc<ExpertContext>> {
        let outcome = self
            .context
            .get_or_init(|| async {
                info!("Starting expert service (collection '{}')", self.config.collection_name);
                match ExpertContext::build(self.config.clone()).await {
                    Ok(context) => {
                        info!("Expert service ready");
                        Ok(Arc::new(context))
                    }
                    Err(e) => {
                        error!("Expert service failed to start: {}", e);
                        Err(e.to_string())
                    }
                }
            })
            .await;

        match outcome {
            Ok(context) => Ok(context.clone()),
            Err(reason) => Err(ExpertError::Unavailable(reason.clone())),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.context.get(), Some(Ok(_)))
    }

    pub fn config(&self) -> &ExpertConfig {
        &self.config
    }

    fn context(&self) -> Result<Arc<ExpertContext>> {
        match self.context.get() {
            None => Err(ExpertError::Unavailable("service is still starting".into())),
            Some(Err(reason)) => Err(ExpertError::Unavailable(reason.clone())),
            Some(Ok(context)) => Ok(context.clone()),
        }
    }

    /// Each pipeline stage runs under `ExpertConfig::stage_timeouts`.
    pub async fn get_experts_recommendation(&self, question: &str) -> Result<Recommendation> {
        self.context()?.pipeline.get_experts_recommendation(question).await
    }

    pub async fn ingest_or_update(&self, expert_key: &str, raw_skill_text: &str) -> Result<IngestOutcome> {
        self.context()?.ingestor.ingest_or_update(expert_key, raw_skill_text).await
    }

    pub async fn delete(&self, expert_key: &str) -> Result<usize> {
        self.context()?.ingestor.delete(expert_key).await
    }

    pub async fn extract_keywords(&self, text: &str) -> Result<Vec<String>> {
        self.context()?.keywords.extract(text).await
    }

    pub async fn status(&self) -> ServiceStatus {
        match self.context.get() {
            None => ServiceStatus {
                state: "starting".into(),
                reason: None,
                collection: None,
                entries: None,
                startup_report: None,
            },
            Some(Err(reason)) => ServiceStatus {
                state: "failed".into(),
                reason: Some(reason.clone()),
                collection: None,
                entries: None,
                startup_report: None,
            },
            Some(Ok(context)) => ServiceStatus {
                state: "ready".into(),
                reason: None,
                collection: Some(context.index.collection_name().to_string()),
                entries: context.index.count().await.ok(),
                startup_report: context.startup_report.clone(),
            },
        }
    }
}
