

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::models::{ExpertMatch, ProfileRecommendation, Recommendation};
use crate::core::error::{ExpertError, Result};
use crate::index::{ScoredOwner, VectorIndex};
use crate::translate::{translate_long, Translator};


#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchPolicy {
    /// Candidates requested from the index per profile.
    pub over_fetch: usize,
    pub max_experts: usize,
    /// Inclusive upper bound on cosine distance.
    pub distance_threshold: f32,
}

impl Default for MatchPolicy {
    fn default() -> Self {
        Self {
            over_fetch: 20,
            max_experts: 5,
            distance_threshold: 0.5,
        }
    }
}


/// Walks an ascending ranked stream and keeps the first occurrence of each
/// owner within the threshold, up to `max_experts`.
pub fn select_top_k<I>(ranked: I, policy: &MatchPolicy) -> Vec<ExpertMatch>
where
    I: IntoIterator<Item = ScoredOwner>,
{
    let mut seen = HashSet::new();
    let mut selected = Vec::with_capacity(policy.max_experts);

    for candidate in ranked {
        if selected.len() >= policy.max_experts {
            break;
        }
        if seen.contains(&candidate.owner_key) {
            continue;
        }
        // NaN never passes
        if !(candidate.distance <= policy.distance_threshold) {
            continue;
        }
        seen.insert(candidate.owner_key.clone());
        selected.push(ExpertMatch {
            expert_key: candidate.owner_key,
            distance: candidate.distance,
        });
    }

    selected
}


pub struct ExpertAggregator {
    index: Arc<dyn VectorIndex>,
    translator: Arc<dyn Translator>,
    policy: MatchPolicy,
    display_language: String,
}

impl ExpertAggregator {
    pub fn new(
        index: Arc<dyn VectorIndex>,
        translator: Arc<dyn Translator>,
        policy: MatchPolicy,
        display_language: impl Into<String>,
    ) -> Self {
        Self {
            index,
            translator,
            policy,
            display_language: display_language.into(),
        }
    }

    pub fn policy(&self) -> &MatchPolicy {
        &self.policy
    }

    pub async fn aggregate(&self, labels: &[String]) -> Result<Recommendation> {
        if labels.is_empty() {
            return Ok(Recommendation::default());
        }

        let ranked = self.index.query(labels, self.policy.over_fetch).await?;
        if ranked.len() != labels.len() {
            return Err(ExpertError::IndexUnavailable(format!(
                "index returned {} result list(s) for {} profile(s)",
                ranked.len(),
                labels.len()
            )));
        }

        let mut profiles = Vec::with_capacity(labels.len());
        for (label, candidates) in labels.iter().zip(ranked) {
            let experts = select_top_k(candidates, &self.policy);
            debug!("Profile '{}' matched {} expert(s)", label, experts.len());

            profiles.push(ProfileRecommendation {
                profile: label.clone(),
                display_profile: self.display_label(label).await,
                experts,
            });
        }

        info!(
            "Aggregated {} profile(s) against collection '{}'",
            profiles.len(),
            self.index.collection_name()
        );
        Ok(Recommendation(profiles))
    }

    async fn display_label(&self, label: &str) -> String {
        match translate_long(self.translator.as_ref(), label, &self.display_language).await {
            Ok(translated) if !translated.trim().is_empty() => translated.trim().to_string(),
            Ok(_) => label.to_string(),
            Err(e) => {
                warn!("Keeping untranslated label '{}': {}", label, e);
                label.to_string()
            }
        }
    }
}
