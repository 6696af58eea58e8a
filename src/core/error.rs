

use thiserror::Error;

use crate::directory::DirectoryError;
use crate::index::IndexError;
use crate::translate::TranslateError;


#[derive(Error, Debug)]
pub enum ExpertError {
    #[error("Query is empty")]
    EmptyQuery,

    #[error("Profile decomposition failed after {attempts} attempt(s): {reason}")]
    ProfileDecompositionFailed { attempts: u32, reason: String },

    #[error("Vector index unavailable: {0}")]
    IndexUnavailable(String),

    #[error("Translation failed for {context}: {reason}")]
    TranslationFailed { context: String, reason: String },

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Directory error: {0}")]
    Directory(#[from] DirectoryError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ExpertError {
    pub fn translation(context: impl Into<String>, err: TranslateError) -> Self {
        Self::TranslationFailed {
            context: context.into(),
            reason: err.to_string(),
        }
    }

    /// Transient failures the caller may retry later; everything else is a
    /// caller or deployment error.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ProfileDecompositionFailed { .. }
                | Self::IndexUnavailable(_)
                | Self::TranslationFailed { .. }
                | Self::Unavailable(_)
                | Self::Timeout(_)
        )
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::EmptyQuery => "empty_query",
            Self::ProfileDecompositionFailed { .. } => "profile_decomposition_failed",
            Self::IndexUnavailable(_) => "index_unavailable",
            Self::TranslationFailed { .. } => "translation_failed",
            Self::Unavailable(_) => "unavailable",
            Self::Timeout(_) => "timeout",
            Self::InvalidInput(_) => "invalid_input",
            Self::Config(_) => "config",
            Self::Directory(_) => "directory",
            Self::Internal(_) => "internal",
        }
    }
}

impl From<IndexError> for ExpertError {
    fn from(err: IndexError) -> Self {
        Self::IndexUnavailable(err.to_string())
    }
}

impl From<config::ConfigError> for ExpertError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}


pub type Result<T> = std::result::Result<T, ExpertError>;
