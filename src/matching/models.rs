

use serde::{Deserialize, Serialize};


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpertMatch {
    pub expert_key: String,
    pub distance: f32,
}


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileRecommendation {
    /// Label in the working language, as produced by decomposition.
    pub profile: String,
    /// Label translated into the display language.
    pub display_profile: String,
    pub experts: Vec<ExpertMatch>,
}

impl ProfileRecommendation {
    pub fn expert_keys(&self) -> Vec<&str> {
        self.experts.iter().map(|e| e.expert_key.as_str()).collect()
    }
}


/// Ordered per-profile results. A list rather than a map so repeated labels
/// each keep their own entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Recommendation(pub Vec<ProfileRecommendation>);

impl Recommendation {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ProfileRecommendation> {
        self.0.iter()
    }

    pub fn profiles(&self) -> Vec<&str> {
        self.0.iter().map(|p| p.profile.as_str()).collect()
    }

    /// `(display label, expert keys)` pairs in profile order.
    pub fn display_pairs(&self) -> Vec<(String, Vec<String>)> {
        self.0
            .iter()
            .map(|p| {
                (
                    p.display_profile.clone(),
                    p.experts.iter().map(|e| e.expert_key.clone()).collect(),
                )
            })
            .collect()
    }
}

impl IntoIterator for Recommendation {
    type Item = ProfileRecommendation;
    type IntoIter = std::vec::IntoIter<ProfileRecommendation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}


#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum IngestOutcome {
    Unchanged,
    Replaced { removed: usize, added: usize },
}


#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IngestReport {
    pub unchanged: Vec<String>,
    pub replaced: Vec<String>,
    /// `(expert key or row label, reason)`
    pub skipped: Vec<(String, String)>,
}

impl IngestReport {
    pub fn total(&self) -> usize {
        self.unchanged.len() + self.replaced.len() + self.skipped.len()
    }
}
