

pub mod cache;
pub mod config;
pub mod error;
pub mod locks;
pub mod retry;

pub use cache::{CacheStats, EmbeddingCache};
pub use config::ExpertConfig;
pub use error::{ExpertError, Result};
pub use locks::KeyedLocks;
pub use retry::{retry_with, Backoff, RetryError, RetryPolicy};
