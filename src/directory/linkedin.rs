

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{DirectoryError, ExpertRecord};


#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinkedInExport {
    #[serde(default)]
    pub profiles: BTreeMap<String, LinkedInProfile>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinkedInProfile {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub experiences: Vec<LinkedInExperience>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinkedInExperience {
    #[serde(default)]
    pub description: Option<String>,
}

impl LinkedInExport {
    /// Non-empty experience descriptions per lower-cased e-mail, newline joined.
    pub fn experience_by_email(&self) -> HashMap<String, String> {
        let mut by_email: HashMap<String, Vec<&str>> = HashMap::new();
        for profile in self.profiles.values() {
            let Some(email) = profile.email.as_deref().map(str::trim).filter(|e| !e.is_empty()) else {
                continue;
            };
            let descriptions = profile
                .experiences
                .iter()
                .filter_map(|e| e.description.as_deref())
                .map(str::trim)
                .filter(|d| !d.is_empty());
            by_email.entry(email.to_lowercase()).or_default().extend(descriptions);
        }

        by_email
            .into_iter()
            .filter(|(_, d)| !d.is_empty())
            .map(|(email, d)| (email, d.join("\n")))
            .collect()
    }
}


pub fn load_linkedin_export(path: impl AsRef<Path>) -> Result<LinkedInExport, DirectoryError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    let export: LinkedInExport = serde_json::from_slice(&bytes)?;
    info!("Loaded {} LinkedIn profile(s) from {}", export.profiles.len(), path.display());
    Ok(export)
}


/// Appends LinkedIn experience descriptions to matching records' skills.
/// Returns how many records were enriched.
pub fn merge_linkedin(records: &mut [ExpertRecord], export: &LinkedInExport) -> usize {
    let experience = export.experience_by_email();
    let mut merged = 0;

    for record in records.iter_mut() {
        match experience.get(&record.email.trim().to_lowercase()) {
            Some(text) => {
                if record.skills.trim().is_empty() {
                    record.skills = text.clone();
                } else {
                    record.skills = format!("{}\n{}", record.skills, text);
                }
                merged += 1;
            }
            None => debug!("No LinkedIn experience for {}", record.email),
        }
    }

    info!("Merged LinkedIn experience into {} record(s)", merged);
    merged
}
