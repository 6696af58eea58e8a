

pub mod embeddings;
pub mod factory;
pub mod keywords;
pub mod profiles;
pub mod providers;

pub use embeddings::{Embedder, EmbeddingError, EmbeddingGenerator};
pub use factory::{EmbeddingProviderFactory, LlmProviderFactory};
pub use keywords::KeywordExtractor;
pub use profiles::ProfileDecomposer;
pub use providers::{LlmMetadata, LlmProvider, LlmProviderError};
