

pub mod core;
pub mod directory;
pub mod index;
pub mod llm;
pub mod matching;
pub mod mcp;
pub mod pipeline;
pub mod service;
pub mod translate;
pub mod utils;

#[cfg(test)]
pub(crate) mod testing;

pub use utils::safe_truncate;


pub use crate::core::config::ExpertConfig;
pub use crate::core::error::{ExpertError, Result};
pub use index::{LocalCollection, VectorIndex};
pub use llm::embeddings::EmbeddingGenerator;
pub use matching::{IngestOutcome, IngestReport, Recommendation};
pub use pipeline::{PipelineState, RecommendationPipeline};
pub use service::{ExpertContext, ExpertService};


pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";


pub const DEFAULT_EMBEDDING_MODEL: &str = "nomic-embed-text";


pub const DEFAULT_LLM_MODEL: &str = "mistral:instruct";


pub const DEFAULT_TRANSLATOR_URL: &str = "https://translate.googleapis.com";


pub const DEFAULT_COLLECTION_NAME: &str = "experts";


pub const DEFAULT_CACHE_SIZE: usize = 1000;


pub const DEFAULT_CACHE_TTL: u64 = 300;
