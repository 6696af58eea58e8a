

pub mod chunking;
pub mod google;

use async_trait::async_trait;
use thiserror::Error;

pub use chunking::{split_for_translation, translate_long, CHUNK_TARGET_CHARS, MAX_TRANSLATION_CHARS};
pub use google::GoogleTranslator;


#[derive(Error, Debug)]
pub enum TranslateError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unexpected response: {0}")]
    InvalidResponse(String),

    #[error("Text of {0} characters exceeds the per-request limit")]
    TooLong(usize),

    #[error("Translation backend error: {0}")]
    Backend(String),
}


#[async_trait]
pub trait Translator: Send + Sync {
    /// Translates `text` into `target` (an ISO 639-1 code). The source
    /// language is auto-detected.
    async fn translate(&self, text: &str, target: &str) -> Result<String, TranslateError>;

    fn name(&self) -> &str;
}


/// Returns text unchanged. Used when translation is disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityTranslator;

#[async_trait]
impl Translator for IdentityTranslator {
    async fn translate(&self, text: &str, _target: &str) -> Result<String, TranslateError> {
        Ok(text.to_string())
    }

    fn name(&self) -> &str {
        "identity"
    }
}
