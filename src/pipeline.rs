

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use strum::{EnumString, IntoStaticStr};
use tracing::{debug, info, warn};

use crate::core::error::{ExpertError, Result};
use crate::llm::profiles::ProfileDecomposer;
use crate::matching::{ExpertAggregator, Recommendation};


#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum PipelineState {
    Idle,
    Decomposing,
    Aggregating,
    Done,
    Failed,
}

impl PipelineState {
    pub fn can_transition_to(self, next: PipelineState) -> bool {
        use PipelineState::*;
        matches!(
            (self, next),
            (Idle, Decomposing)
                | (Decomposing, Aggregating)
                | (Decomposing, Failed)
                | (Aggregating, Done)
                | (Aggregating, Failed)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, PipelineState::Done | PipelineState::Failed)
    }
}


/// States visited by one query, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineTrace {
    states: Vec<PipelineState>,
}

impl PipelineTrace {
    fn new() -> Self {
        Self {
            states: vec![PipelineState::Idle],
        }
    }

    pub fn current(&self) -> PipelineState {
        self.states.last().copied().unwrap_or(PipelineState::Idle)
    }

    pub fn states(&self) -> &[PipelineState] {
        &self.states
    }

    fn advance(&mut self, next: PipelineState) {
        let from = self.current();
        if !from.can_transition_to(next) {
            warn!("Unexpected pipeline transition {:?} -> {:?}", from, next);
        }
        debug!(
            "Pipeline {} -> {}",
            <&'static str>::from(from),
            <&'static str>::from(next)
        );
        self.states.push(next);
    }
}


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageTimeouts {
    pub decomposition: Duration,
    pub aggregation_base: Duration,
    pub per_profile: Duration,
}

impl StageTimeouts {
    pub fn aggregation(&self, profiles: usize) -> Duration {
        let profiles = u32::try_from(profiles).unwrap_or(u32::MAX);
        self.aggregation_base
            .saturating_add(self.per_profile.saturating_mul(profiles))
    }
}


async fn within<T>(stage: &str, limit: Option<Duration>, work: impl Future<Output = Result<T>>) -> Result<T> {
    let Some(limit) = limit else {
        return work.await;
    };
    match tokio::time::timeout(limit, work).await {
        Ok(result) => result,
        Err(_) => {
            warn!("{} timed out after {:?}", stage, limit);
            Err(ExpertError::Timeout(limit))
        }
    }
}


/// Question → generic profiles → ranked experts per profile.
pub struct RecommendationPipeline {
    decomposer: Arc<ProfileDecomposer>,
    aggregator: Arc<ExpertAggregator>,
    timeouts: Option<StageTimeouts>,
}

impl RecommendationPipeline {
    pub fn new(decomposer: Arc<ProfileDecomposer>, aggregator: Arc<ExpertAggregator>) -> Self {
        Self {
            decomposer,
            aggregator,
            timeouts: None,
        }
    }

    pub fn with_timeouts(mut self, timeouts: StageTimeouts) -> Self {
        self.timeouts = Some(timeouts);
        self
    }

    pub async fn get_experts_recommendation(&self, question: &str) -> Result<Recommendation> {
        self.run(question).await.0
    }

    pub async fn run(&self, question: &str) -> (Result<Recommendation>, PipelineTrace) {
        let mut trace = PipelineTrace::new();

        if question.trim().is_empty() {
            return (Err(ExpertError::EmptyQuery), trace);
        }

        info!("Recommending experts for: '{}'", crate::safe_truncate(question.trim(), 80));

        trace.advance(PipelineState::Decomposing);
        let limit = self.timeouts.map(|t| t.decomposition);
        let profiles = match within("Decomposition", limit, self.decomposer.decompose(question)).await {
            Ok(profiles) => profiles,
            Err(e) => {
                trace.advance(PipelineState::Failed);
                return (Err(e), trace);
            }
        };

        trace.advance(PipelineState::Aggregating);
        let limit = self.timeouts.map(|t| t.aggregation(profiles.len()));
        match within("Aggregation", limit, self.aggregator.aggregate(&profiles)).await {
            Ok(recommendation) => {
                trace.advance(PipelineState::Done);
                (Ok(recommendation), trace)
            }
            Err(e) => {
                trace.advance(PipelineState::Failed);
                (Err(e), trace)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::retry::RetryPolicy;
    use crate::index::{LocalCollection, ScoredOwner, VectorIndex};
    use crate::matching::MatchPolicy;
    use crate::testing::{ConceptEmbedder, ScriptedLlm, SlowLlm, StaticIndex};
    use crate::translate::IdentityTranslator;
    use std::str::FromStr;
    use std::time::Duration;
    use tempfile::TempDir;
    use PipelineState::*;

    const PROFILES: &str = r#"{"profiles": ["Cardiologist", "Data Scientist", "Data security expert"]}"#;

    fn pipeline(llm: Arc<ScriptedLlm>, index: Arc<dyn VectorIndex>) -> RecommendationPipeline {
        let decomposer = ProfileDecomposer::new(
            llm,
            Arc::new(IdentityTranslator),
            "en",
            RetryPolicy::fixed(4, Duration::ZERO),
        );
        let aggregator = ExpertAggregator::new(index, Arc::new(IdentityTranslator), MatchPolicy::default(), "fr");
        RecommendationPipeline::new(Arc::new(decomposer), Arc::new(aggregator))
    }

    #[test]
    fn test_transitions() {
        assert!(Idle.can_transition_to(Decomposing));
        assert!(Decomposing.can_transition_to(Failed));
        assert!(Aggregating.can_transition_to(Done));
        assert!(!Idle.can_transition_to(Aggregating));
        assert!(!Done.can_transition_to(Failed));
        assert!(Failed.is_terminal());
        assert_eq!(PipelineState::from_str("aggregating").unwrap(), Aggregating);
    }

    #[tokio::test]
    async fn test_blank_question_has_no_side_effects() {
        let llm = Arc::new(ScriptedLlm::new(vec![]));
        let index = Arc::new(StaticIndex::new(vec![]));
        let (result, trace) = pipeline(llm.clone(), index.clone()).run("  \t ").await;

        assert!(matches!(result, Err(ExpertError::EmptyQuery)));
        assert_eq!(trace.states(), &[Idle]);
        assert_eq!(llm.calls(), 0);
        assert!(index.queries().is_empty());
    }

    #[tokio::test]
    async fn test_decomposition_failure_skips_index() {
        let llm = Arc::new(ScriptedLlm::new(vec![Ok("no json".into()); 4]));
        let index = Arc::new(StaticIndex::new(vec![]));
        let (result, trace) = pipeline(llm, index.clone()).run("cardiac AI").await;

        assert!(matches!(
            result,
            Err(ExpertError::ProfileDecompositionFailed { attempts: 4, .. })
        ));
        assert_eq!(trace.states(), &[Idle, Decomposing, Failed]);
        assert!(index.queries().is_empty());
    }

    #[tokio::test]
    async fn test_index_failure_fails_aggregation() {
        let llm = Arc::new(ScriptedLlm::new(vec![Ok(PROFILES.into())]));
        let (result, trace) = pipeline(llm, Arc::new(StaticIndex::failing())).run("cardiac AI").await;

        assert!(matches!(result, Err(ExpertError::IndexUnavailable(_))));
        assert_eq!(trace.states(), &[Idle, Decomposing, Aggregating, Failed]);
        assert_eq!(trace.current(), Failed);
    }

    fn slow_pipeline(delay: Duration, timeouts: StageTimeouts) -> RecommendationPipeline {
        let decomposer = ProfileDecomposer::new(
            Arc::new(SlowLlm(delay)),
            Arc::new(IdentityTranslator),
            "en",
            RetryPolicy::fixed(2, Duration::ZERO),
        );
        let aggregator = ExpertAggregator::new(
            Arc::new(StaticIndex::new(vec![])),
            Arc::new(IdentityTranslator),
            MatchPolicy::default(),
            "fr",
        );
        RecommendationPipeline::new(Arc::new(decomposer), Arc::new(aggregator)).with_timeouts(timeouts)
    }

    #[tokio::test]
    async fn test_stage_within_budget_keeps_its_error() {
        let timeouts = StageTimeouts {
            decomposition: Duration::from_secs(5),
            aggregation_base: Duration::from_secs(5),
            per_profile: Duration::ZERO,
        };
        let (result, trace) = slow_pipeline(Duration::from_millis(20), timeouts).run("cardiac AI").await;

        assert!(matches!(
            result,
            Err(ExpertError::ProfileDecompositionFailed { attempts: 2, .. })
        ));
        assert_eq!(trace.states(), &[Idle, Decomposing, Failed]);
    }

    #[tokio::test]
    async fn test_stage_over_budget_times_out() {
        let timeouts = StageTimeouts {
            decomposition: Duration::from_millis(50),
            aggregation_base: Duration::from_secs(5),
            per_profile: Duration::ZERO,
        };
        let (result, trace) = slow_pipeline(Duration::from_secs(5), timeouts).run("cardiac AI").await;

        assert!(matches!(result, Err(ExpertError::Timeout(limit)) if limit == Duration::from_millis(50)));
        assert_eq!(trace.states(), &[Idle, Decomposing, Failed]);
    }

    #[test]
    fn test_aggregation_budget_grows_with_profiles() {
        let timeouts = StageTimeouts {
            decomposition: Duration::ZERO,
            aggregation_base: Duration::from_secs(2),
            per_profile: Duration::from_secs(3),
        };
        assert_eq!(timeouts.aggregation(0), Duration::from_secs(2));
        assert_eq!(timeouts.aggregation(4), Duration::from_secs(14));
    }

    #[tokio::test]
    async fn test_success_keeps_profile_order() {
        let llm = Arc::new(ScriptedLlm::new(vec![Ok(PROFILES.into())]));
        let index = Arc::new(StaticIndex::new(vec![
            vec![],
            vec![ScoredOwner::new("alice@x", 0.2)],
            vec![ScoredOwner::new("bob@x", 0.0)],
        ]));
        let (result, trace) = pipeline(llm, index).run("cardiac AI").await;

        let recommendation = result.unwrap();
        assert_eq!(
            recommendation.profiles(),
            vec!["Cardiologist", "Data Scientist", "Data security expert"]
        );
        assert_eq!(trace.states(), &[Idle, Decomposing, Aggregating, Done]);
    }

    #[tokio::test]
    async fn test_end_to_end_with_collection() {
        let dir = TempDir::new().unwrap();
        let collection = Arc::new(
            LocalCollection::open(dir.path(), "experts", Arc::new(ConceptEmbedder::default()))
                .await
                .unwrap(),
        );
        collection
            .upsert(&["deep learning".to_string(), "medical imaging".to_string()], "alice@x")
            .await
            .unwrap();
        collection
            .upsert(&["data security".to_string(), "cloud infrastructure".to_string()], "bob@x")
            .await
            .unwrap();

        let llm = Arc::new(ScriptedLlm::new(vec![Ok(PROFILES.into())]));
        let recommendation = pipeline(llm, collection)
            .get_experts_recommendation("Je veux quantifier la fibrose cardiaque en IRM")
            .await
            .unwrap();

        let pairs = recommendation.display_pairs();
        assert_eq!(pairs[0], ("Cardiologist".to_string(), vec![]));
        assert_eq!(pairs[1].1.first().map(String::as_str), Some("alice@x"));
        assert_eq!(pairs[2], ("Data security expert".to_string(), vec!["bob@x".to_string()]));
    }
}
