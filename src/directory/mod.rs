

pub mod linkedin;
pub mod roster;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::utils::normalize_expert_key;

pub use linkedin::{load_linkedin_export, merge_linkedin, LinkedInExport};
pub use roster::{load_experts_csv, read_experts, ColumnSpec, Field, ValueKind, COLUMNS};


#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Column {index}: expected header '{expected}', found '{found}'")]
    SchemaMismatch {
        index: usize,
        expected: String,
        found: String,
    },
}


/// One member of the directory as exported by the registration form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpertRecord {
    pub registered_on: Option<NaiveDate>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub membership_category: String,
    pub job_title: String,
    pub affiliation: String,
    pub skills: String,
    pub years_ai_experience: Option<f64>,
    pub years_health_experience: Option<f64>,
    pub community_involvement: String,
    pub suggestions: String,
    pub consent: String,
    pub profile_photo: String,
    pub linkedin: String,
}

impl ExpertRecord {
    pub fn key(&self) -> Option<String> {
        normalize_expert_key(&self.email)
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }
}
